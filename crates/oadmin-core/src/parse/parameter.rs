use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameter location. Swagger 2 adds `body` and `formData`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
    #[default]
    #[serde(other)]
    Other,
}

/// An operation parameter. Every field has a default so partial
/// parameters still make it into the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    /// Swagger 2 inline primitive type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
}
