pub mod doc_to_catalog;
pub mod name_normalizer;
pub mod schema_resolver;

pub use doc_to_catalog::{BuildOptions, build_catalog, build_catalog_with_options};
