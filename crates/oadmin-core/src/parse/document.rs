use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::json_kind;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Info {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,
}

impl Info {
    fn salvage(value: &Value) -> Option<Self> {
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                log::warn!("`info` is {}, ignoring it", json_kind(value));
            }
            return None;
        };
        Some(Self {
            title: obj.get("title").and_then(scalar_text).unwrap_or_default(),
            description: obj.get("description").and_then(scalar_text),
            version: obj.get("version").and_then(scalar_text).unwrap_or_default(),
        })
    }
}

/// OpenAPI 3 components. Only schemas matter for resource lookup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Value>,
}

/// A path item: verb (or other key) to raw operation details.
///
/// Operations are kept as raw JSON here so one badly shaped operation
/// cannot reject the whole document.
pub type PathItem = IndexMap<String, Value>;

/// A Swagger 2 or OpenAPI 3 description, as far as the catalog needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,

    pub paths: IndexMap<String, PathItem>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl ApiDocument {
    /// Decode a document whose `paths` is already known to be a mapping.
    ///
    /// Metadata and schema tables that do not fit are dropped one section
    /// at a time, so a quirk in `info` or `definitions` never costs the
    /// paths.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value::<ApiDocument>(value.clone()) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("document does not match the expected shape ({e}); salvaging sections");
                Self::salvage(&value)
            }
        }
    }

    fn salvage(value: &Value) -> Self {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);

        let paths = obj
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .filter_map(|(path, item)| match item.as_object() {
                        Some(ops) => Some((
                            path.clone(),
                            ops.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                        )),
                        None => {
                            log::warn!("path `{path}` is {}, skipping it", json_kind(item));
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let components = match obj.get("components") {
            None | Some(Value::Null) => None,
            Some(Value::Object(c)) => Some(Components {
                schemas: schema_table("components.schemas", c.get("schemas")),
            }),
            Some(other) => {
                log::warn!("`components` is {}, ignoring it", json_kind(other));
                None
            }
        };

        Self {
            swagger: obj.get("swagger").and_then(scalar_text),
            openapi: obj.get("openapi").and_then(scalar_text),
            info: obj.get("info").and_then(Info::salvage),
            paths,
            definitions: schema_table("definitions", obj.get("definitions")),
            components,
        }
    }

    /// Look up a named schema, Swagger 2 `definitions` first, then
    /// OpenAPI 3 `components.schemas`.
    pub fn schema(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name).or_else(|| {
            self.components
                .as_ref()
                .and_then(|c| c.schemas.get(name))
        })
    }

    pub fn schema_count(&self) -> usize {
        self.definitions.len()
            + self
                .components
                .as_ref()
                .map(|c| c.schemas.len())
                .unwrap_or(0)
    }

    /// Description version string, whichever dialect declared it.
    pub fn version(&self) -> Option<&str> {
        self.openapi.as_deref().or(self.swagger.as_deref())
    }
}

/// Text of a scalar. YAML reads an unquoted `2.0` as a number, so numbers
/// and booleans are kept in their written form.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn schema_table(section: &str, value: Option<&Value>) -> IndexMap<String, Value> {
    match value {
        None | Some(Value::Null) => IndexMap::new(),
        Some(Value::Object(schemas)) => schemas
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        Some(other) => {
            log::warn!("`{section}` is {}, ignoring it", json_kind(other));
            IndexMap::new()
        }
    }
}
