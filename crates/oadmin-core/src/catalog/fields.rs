use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::infer::{FieldKind, infer, infer_item};
use crate::parse::schema::SchemaType;
use crate::transform::name_normalizer::field_label;

/// One property of a resource schema, reduced to what inference reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemaProperty {
    pub kind: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
}

/// The schema attached to a resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResourceSchema {
    /// Definition name the schema was found under, e.g. `models.books`.
    pub name: String,
    pub properties: IndexMap<String, SchemaProperty>,
    pub required: Vec<String>,
}

impl ResourceSchema {
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Field descriptors for every property, in schema order.
    pub fn fields(&self) -> Vec<FieldDescriptor> {
        self.properties
            .iter()
            .map(|(name, prop)| FieldDescriptor::from_property(name, prop, self.is_required(name)))
            .collect()
    }
}

/// Everything the form layer needs to render one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_kind: Option<FieldKind>,
    #[serde(default)]
    pub read_only: bool,
}

impl FieldDescriptor {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: field_label(name),
            kind,
            required: false,
            description: String::new(),
            enum_values: Vec::new(),
            item_kind: None,
            read_only: false,
        }
    }

    pub fn from_property(name: &str, property: &SchemaProperty, required: bool) -> Self {
        Self {
            kind: infer(property),
            required,
            description: property.description.clone().unwrap_or_default(),
            enum_values: property.enum_values.clone(),
            item_kind: infer_item(property),
            read_only: property.read_only,
            ..Self::new(name, FieldKind::Text)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = options.into_iter().map(Into::into).collect();
        self
    }
}
