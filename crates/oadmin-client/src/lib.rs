pub mod capabilities;
pub mod client;
pub mod error;
pub mod normalizer;
pub mod registry;

pub use capabilities::{AuditRow, Binding, ResourceClientCapabilities};
pub use client::{ListQuery, ListSource, ResourceClient};
pub use error::{CallError, CapabilityError, ClientError};
pub use normalizer::CapabilityNormalizer;
pub use registry::ClientRegistry;
