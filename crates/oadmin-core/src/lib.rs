pub mod catalog;
pub mod config;
pub mod error;
pub mod infer;
pub mod parse;
pub mod transform;
pub mod verb;

pub use catalog::{
    ApiOperation, Catalog, FieldDescriptor, HttpMethod, ResourceDescriptor, ResourceSchema,
    SchemaProperty,
};
pub use infer::{FieldKind, infer};
pub use verb::{Verb, VerbSet};

/// Literal tag used for operations that declare no tag.
pub const DEFAULT_TAG: &str = "Other";

/// Prefix under which resource schemas are conventionally defined (`models.books`).
pub const DEFAULT_SCHEMA_PREFIX: &str = "models.";
