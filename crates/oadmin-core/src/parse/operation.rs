use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_kind;
use super::parameter::Parameter;

/// An API operation as declared in the description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Operation {
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,

    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl Operation {
    /// Decode an operation, falling back field by field when the whole
    /// object does not fit the expected shape.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value::<Operation>(value.clone()) {
            Ok(op) => op,
            Err(e) => {
                log::warn!("operation does not match the expected shape ({e}); salvaging fields");
                Self::salvage(value)
            }
        }
    }

    fn salvage(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            log::warn!("operation is {}, using defaults", json_kind(value));
            return Self::default();
        };

        let string = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        let tags = obj
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let parameters = obj
            .get("parameters")
            .and_then(Value::as_array)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|p| serde_json::from_value::<Parameter>(p.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();

        let responses = obj
            .get("responses")
            .and_then(Value::as_object)
            .map(|r| r.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        Self {
            operation_id: string("operationId"),
            summary: string("summary"),
            description: string("description"),
            tags,
            parameters,
            request_body: obj.get("requestBody").filter(|v| !v.is_null()).cloned(),
            responses,
            deprecated: obj.get("deprecated").and_then(Value::as_bool),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_fields_default() {
        let op = Operation::from_value(&json!({}));
        assert!(op.tags.is_empty());
        assert!(op.summary.is_none());
        assert!(op.parameters.is_empty());
        assert!(op.responses.is_empty());
    }

    #[test]
    fn test_salvage_keeps_well_formed_fields() {
        // `summary` has the wrong type; tags and parameters survive.
        let op = Operation::from_value(&json!({
            "tags": ["books", 7],
            "summary": 42,
            "description": "Create a book",
            "parameters": [{"name": "limit", "in": "query"}, "junk"]
        }));
        assert_eq!(op.tags, vec!["books".to_string()]);
        assert!(op.summary.is_none());
        assert_eq!(op.description.as_deref(), Some("Create a book"));
        assert_eq!(op.parameters.len(), 1);
        assert_eq!(op.parameters[0].name, "limit");
    }

    #[test]
    fn test_non_object_operation() {
        let op = Operation::from_value(&json!("not an operation"));
        assert_eq!(op, Operation::default());
    }
}
