use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_kind;

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    #[serde(other)]
    Unknown,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    /// The type a form field should be built for: the first non-null member.
    pub fn primary(&self) -> Option<SchemaType> {
        match self {
            TypeSet::Single(t) => Some(*t),
            TypeSet::Multiple(types) => types
                .iter()
                .copied()
                .find(|t| *t != SchemaType::Null)
                .or_else(|| types.first().copied()),
        }
    }
}

/// The subset of a JSON Schema object the catalog reads.
///
/// Nested `properties` and `items` stay raw so each one is decoded on
/// its own and an odd property never poisons its siblings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Value>,

    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,

    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,
}

impl Schema {
    /// Decode a schema. When the object as a whole does not fit, each
    /// keyword is decoded on its own so a bad keyword only loses itself.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value::<Schema>(value.clone()) {
            Ok(schema) => schema,
            Err(e) => {
                log::warn!("schema does not match the expected shape ({e}); salvaging keywords");
                Self::salvage(value)
            }
        }
    }

    fn salvage(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            log::warn!("schema is {}, treating it as untyped", json_kind(value));
            return Self::default();
        };

        let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            schema_type: obj
                .get("type")
                .and_then(|t| serde_json::from_value::<TypeSet>(t.clone()).ok()),
            format: string("format"),
            title: string("title"),
            description: string("description"),
            properties: obj
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
            required: obj
                .get("required")
                .and_then(Value::as_array)
                .map(|names| {
                    names
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            items: obj.get("items").filter(|v| !v.is_null()).cloned(),
            enum_values: obj
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            read_only: obj.get("readOnly").and_then(Value::as_bool),
            ref_path: string("$ref"),
        }
    }

    pub fn primary_type(&self) -> Option<SchemaType> {
        self.schema_type.as_ref().and_then(TypeSet::primary)
    }

    /// Enumeration members as display strings. Nulls and structured
    /// members are dropped.
    pub fn enum_strings(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }

    /// Target name of a local `$ref` (`#/definitions/User` → `User`).
    pub fn ref_name(&self) -> Option<&str> {
        self.ref_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}
