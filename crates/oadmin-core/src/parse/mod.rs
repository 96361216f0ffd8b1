pub mod document;
pub mod operation;
pub mod parameter;
pub mod schema;

use serde_json::Value;

use crate::error::ParseError;
use document::ApiDocument;

/// Parse an API description from JSON.
pub fn from_json(input: &str) -> Result<ApiDocument, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    from_value(value)
}

/// Parse an API description from YAML.
pub fn from_yaml(input: &str) -> Result<ApiDocument, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    from_value(value)
}

/// Build a document from an already-decoded JSON value.
///
/// The only hard requirement is a `paths` mapping. Misshapen metadata,
/// path items and schema tables are skipped with a warning, and anything
/// below the operation level is tolerated later, when the catalog is built.
pub fn from_value(value: Value) -> Result<ApiDocument, ParseError> {
    match value.get("paths") {
        Some(Value::Object(_)) => {}
        Some(other) => {
            return Err(ParseError::SpecMalformed(format!(
                "`paths` must be a mapping, found {}",
                json_kind(other)
            )));
        }
        None => {
            return Err(ParseError::SpecMalformed(
                "document has no `paths` mapping".to_string(),
            ));
        }
    }

    let doc = ApiDocument::from_value(value);
    log::debug!(
        "parsed API description with {} paths and {} schemas",
        doc.paths.len(),
        doc.schema_count()
    );
    Ok(doc)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
