use serde::Serialize;

use super::fields::{FieldDescriptor, ResourceSchema};
use super::operations::{ApiOperation, HttpMethod};
use crate::error::ParseError;
use crate::parse;
use crate::transform::build_catalog;

/// One logical resource: a tag, its operations, and its schema if one
/// was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub endpoints: Vec<ApiOperation>,
    pub schema: Option<ResourceSchema>,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, schema: Option<ResourceSchema>) -> Self {
        Self {
            name: name.into(),
            endpoints: Vec::new(),
            schema,
        }
    }

    /// Field descriptors inferred from the schema; empty without one.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.schema
            .as_ref()
            .map(ResourceSchema::fields)
            .unwrap_or_default()
    }

    /// Fields a user can fill in: read-only properties are left out.
    pub fn editable_fields(&self) -> Vec<FieldDescriptor> {
        self.fields().into_iter().filter(|f| !f.read_only).collect()
    }

    pub fn endpoint(&self, method: HttpMethod, path: &str) -> Option<&ApiOperation> {
        self.endpoints
            .iter()
            .find(|op| op.method == method && op.path == path)
    }

    pub fn has_method(&self, method: HttpMethod) -> bool {
        self.endpoints.iter().any(|op| op.method == method)
    }
}

/// The resources derived from one API description snapshot, in the
/// order their tags were first seen. Read-only once built.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Catalog {
    resources: Vec<ResourceDescriptor>,
}

impl Catalog {
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self { resources }
    }

    /// Parse a JSON description and build its catalog.
    pub fn from_json(input: &str) -> Result<Self, ParseError> {
        Ok(build_catalog(&parse::from_json(input)?))
    }

    /// Parse a YAML description and build its catalog.
    pub fn from_yaml(input: &str) -> Result<Self, ParseError> {
        Ok(build_catalog(&parse::from_yaml(input)?))
    }

    pub fn resources(&self) -> &[ResourceDescriptor] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Exact lookup by resource name.
    pub fn get(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Exact lookup first, then case-insensitive.
    pub fn find(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.get(name).or_else(|| {
            let wanted = name.to_lowercase();
            self.resources
                .iter()
                .find(|r| r.name.to_lowercase() == wanted)
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.name.as_str())
    }

    pub fn endpoint_count(&self) -> usize {
        self.resources.iter().map(|r| r.endpoints.len()).sum()
    }
}
