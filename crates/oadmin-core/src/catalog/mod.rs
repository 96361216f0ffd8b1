pub mod fields;
pub mod operations;
pub mod types;

pub use fields::{FieldDescriptor, ResourceSchema, SchemaProperty};
pub use operations::{ApiOperation, HttpMethod};
pub use types::{Catalog, ResourceDescriptor};
