use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::SchemaProperty;
use crate::parse::schema::SchemaType;

/// UI control category for one schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Checkbox,
    Select,
    Datetime,
    Email,
    Array,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
            FieldKind::Datetime => "datetime",
            FieldKind::Email => "email",
            FieldKind::Array => "array",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Infer the field kind for a property. Total: anything unrecognised is `Text`.
///
/// Specific string hints win over the plain primitive kind, in this order:
/// `date-time` format, `email` format, enumeration.
pub fn infer(property: &SchemaProperty) -> FieldKind {
    match property.kind {
        Some(SchemaType::String) => match property.format.as_deref() {
            Some("date-time") => FieldKind::Datetime,
            Some("email") => FieldKind::Email,
            _ if !property.enum_values.is_empty() => FieldKind::Select,
            _ => FieldKind::Text,
        },
        Some(SchemaType::Integer | SchemaType::Number) => FieldKind::Number,
        Some(SchemaType::Boolean) => FieldKind::Checkbox,
        Some(SchemaType::Array) => FieldKind::Array,
        Some(SchemaType::Object | SchemaType::Null | SchemaType::Unknown) | None => {
            FieldKind::Text
        }
    }
}

/// Kind of an array property's items, if it is an array with typed items.
pub fn infer_item(property: &SchemaProperty) -> Option<FieldKind> {
    match property.kind {
        Some(SchemaType::Array) => property.items.as_deref().map(infer),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(kind: Option<SchemaType>) -> SchemaProperty {
        SchemaProperty {
            kind,
            ..Default::default()
        }
    }

    fn string_with(format: Option<&str>, enum_values: &[&str]) -> SchemaProperty {
        SchemaProperty {
            kind: Some(SchemaType::String),
            format: format.map(str::to_string),
            enum_values: enum_values.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_string_hints() {
        assert_eq!(infer(&string_with(Some("date-time"), &[])), FieldKind::Datetime);
        assert_eq!(infer(&string_with(Some("email"), &[])), FieldKind::Email);
        assert_eq!(infer(&string_with(None, &["a", "b"])), FieldKind::Select);
        assert_eq!(infer(&string_with(None, &[])), FieldKind::Text);
        assert_eq!(infer(&string_with(Some("uri"), &[])), FieldKind::Text);
    }

    #[test]
    fn test_format_beats_enum() {
        let p = string_with(Some("date-time"), &["2024-01-01T00:00:00Z"]);
        assert_eq!(infer(&p), FieldKind::Datetime);
        let p = string_with(Some("email"), &["a@example.com"]);
        assert_eq!(infer(&p), FieldKind::Email);
    }

    #[test]
    fn test_primitive_kinds() {
        assert_eq!(infer(&prop(Some(SchemaType::Integer))), FieldKind::Number);
        assert_eq!(infer(&prop(Some(SchemaType::Number))), FieldKind::Number);
        assert_eq!(infer(&prop(Some(SchemaType::Boolean))), FieldKind::Checkbox);
        assert_eq!(infer(&prop(Some(SchemaType::Array))), FieldKind::Array);
    }

    #[test]
    fn test_safe_default() {
        assert_eq!(infer(&prop(None)), FieldKind::Text);
        assert_eq!(infer(&prop(Some(SchemaType::Object))), FieldKind::Text);
        assert_eq!(infer(&prop(Some(SchemaType::Unknown))), FieldKind::Text);
        assert_eq!(infer(&prop(Some(SchemaType::Null))), FieldKind::Text);
    }

    #[test]
    fn test_enum_only_applies_to_strings() {
        let p = SchemaProperty {
            kind: Some(SchemaType::Integer),
            enum_values: vec!["1".into(), "2".into()],
            ..Default::default()
        };
        assert_eq!(infer(&p), FieldKind::Number);
        let p = SchemaProperty {
            kind: None,
            enum_values: vec!["a".into()],
            ..Default::default()
        };
        assert_eq!(infer(&p), FieldKind::Text);
    }

    #[test]
    fn test_infer_item() {
        let p = SchemaProperty {
            kind: Some(SchemaType::Array),
            items: Some(Box::new(string_with(None, &["x", "y"]))),
            ..Default::default()
        };
        assert_eq!(infer_item(&p), Some(FieldKind::Select));
        assert_eq!(infer_item(&prop(Some(SchemaType::Array))), None);
        assert_eq!(infer_item(&prop(Some(SchemaType::String))), None);
    }
}
