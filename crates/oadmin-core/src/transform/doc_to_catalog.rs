use indexmap::IndexMap;
use serde_json::Value;

use crate::catalog::{ApiOperation, Catalog, HttpMethod, ResourceDescriptor};
use crate::config::CatalogConfig;
use crate::parse::document::ApiDocument;
use crate::parse::operation::Operation;
use crate::{DEFAULT_SCHEMA_PREFIX, DEFAULT_TAG};

use super::schema_resolver::SchemaResolver;

/// Options controlling how operations are grouped and schemas located.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Prefix of the conventional schema name for a tag.
    pub schema_prefix: String,
    /// Tag for operations that declare none.
    pub default_tag: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            schema_prefix: DEFAULT_SCHEMA_PREFIX.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl From<&CatalogConfig> for BuildOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            schema_prefix: config.schema_prefix.clone(),
            default_tag: config.default_tag.clone(),
        }
    }
}

/// Build the resource catalog of a parsed description.
pub fn build_catalog(doc: &ApiDocument) -> Catalog {
    build_catalog_with_options(doc, &BuildOptions::default())
}

/// Build with explicit grouping options.
///
/// Resources come out in the order their tags are first seen while
/// walking paths, then verbs, in document order. A resource's schema is
/// looked up once, when its tag is first seen.
pub fn build_catalog_with_options(doc: &ApiDocument, options: &BuildOptions) -> Catalog {
    let resolver = SchemaResolver::new(doc);
    let mut resources: IndexMap<String, ResourceDescriptor> = IndexMap::new();

    for (path, item) in &doc.paths {
        for (key, raw) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let op = Operation::from_value(raw);
            let tag = owning_tag(&op, &options.default_tag);

            let resource = resources.entry(tag.clone()).or_insert_with(|| {
                ResourceDescriptor::new(
                    tag.clone(),
                    resolver.schema_for_tag(&tag, &options.schema_prefix),
                )
            });
            resource.endpoints.push(to_api_operation(path, method, tag, op));
        }
    }

    let catalog = Catalog::new(resources.into_values().collect());
    log::debug!(
        "catalog built: {} resources, {} endpoints",
        catalog.len(),
        catalog.endpoint_count()
    );
    catalog
}

/// First declared tag; blank tags count as absent.
fn owning_tag(op: &Operation, default_tag: &str) -> String {
    op.tags
        .first()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(default_tag)
        .to_string()
}

fn to_api_operation(path: &str, method: HttpMethod, tag: String, op: Operation) -> ApiOperation {
    ApiOperation {
        path: path.to_string(),
        method,
        tag,
        summary: op.summary.unwrap_or_default(),
        description: op.description.unwrap_or_default(),
        operation_id: op.operation_id,
        parameters: op.parameters,
        request_body: op
            .request_body
            .unwrap_or_else(|| Value::Object(Default::default())),
        responses: op.responses,
        deprecated: op.deprecated.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_owning_tag() {
        let mut op = Operation::default();
        assert_eq!(owning_tag(&op, "Other"), "Other");
        op.tags = vec!["  ".to_string(), "books".to_string()];
        assert_eq!(owning_tag(&op, "Other"), "Other");
        op.tags = vec!["users".to_string(), "books".to_string()];
        assert_eq!(owning_tag(&op, "Other"), "users");
    }

    #[test]
    fn test_custom_options() {
        let doc = parse::from_json(
            r#"{
                "paths": {"/x": {"get": {}}, "/books": {"get": {"tags": ["books"]}}},
                "definitions": {"schemas.books": {"properties": {"t": {"type": "string"}}}}
            }"#,
        )
        .unwrap();
        let options = BuildOptions {
            schema_prefix: "schemas.".to_string(),
            default_tag: "misc".to_string(),
        };
        let catalog = build_catalog_with_options(&doc, &options);
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["misc", "books"]);
        let books = catalog.get("books").unwrap();
        assert_eq!(books.schema.as_ref().unwrap().name, "schemas.books");
    }

    #[test]
    fn test_request_body_defaults_to_empty_object() {
        let doc = parse::from_json(r#"{"paths": {"/a": {"post": {"tags": ["a"]}}}}"#).unwrap();
        let catalog = build_catalog(&doc);
        let op = &catalog.resources()[0].endpoints[0];
        assert_eq!(op.request_body, serde_json::json!({}));
        assert_eq!(op.summary, "");
        assert_eq!(op.description, "");
        assert!(op.parameters.is_empty());
    }
}
