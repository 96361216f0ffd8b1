use std::fmt;

use indexmap::IndexMap;
use oadmin_core::{FieldDescriptor, FieldKind};
use serde::Serialize;
use serde_json::{Map, Number, Value};

/// What a control currently holds, exactly as the user entered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    Toggle(bool),
}

impl RawInput {
    /// Initial input for a field: checkboxes start unchecked, everything
    /// else empty.
    pub fn initial(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => RawInput::Toggle(false),
            _ => RawInput::Text(String::new()),
        }
    }

    /// Input that displays an existing record value.
    pub fn from_json(kind: FieldKind, value: &Value) -> Self {
        match (kind, value) {
            (FieldKind::Checkbox, Value::Bool(b)) => RawInput::Toggle(*b),
            (FieldKind::Checkbox, _) => RawInput::Toggle(false),
            (_, Value::Null) => RawInput::Text(String::new()),
            (_, Value::String(s)) => RawInput::Text(s.clone()),
            (_, Value::Array(items)) => RawInput::Text(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            (_, other) => RawInput::Text(other.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RawInput::Text(s) => s,
            RawInput::Toggle(true) => "true",
            RawInput::Toggle(false) => "false",
        }
    }
}

/// A submitted field value, shaped by the field kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Unset,
    Text(String),
    Number(Number),
    Bool(bool),
    List(Vec<String>),
}

impl FormValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, FormValue::Unset)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FormValue::Unset => Value::Null,
            FormValue::Text(s) => Value::String(s.clone()),
            FormValue::Number(n) => Value::Number(n.clone()),
            FormValue::Bool(b) => Value::Bool(*b),
            FormValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }
}

/// Why a field's input cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldProblem {
    Required,
    NotANumber(String),
    NotAnOption(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub label: String,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Required => write!(f, "{} is required", self.label),
            FieldProblem::NotANumber(input) => write!(f, "{}: `{input}` is not a number", self.label),
            FieldProblem::NotAnOption(input) => {
                write!(f, "{}: `{input}` is not one of the allowed values", self.label)
            }
        }
    }
}

/// Convert one field's raw input to its submitted value.
///
/// Numbers are coerced from text (integers stay integers); `email` and
/// `datetime` are submitted as plain strings; arrays split on commas and
/// newlines. Empty input is `Unset`, except checkboxes which are always
/// a boolean.
pub fn coerce(field: &FieldDescriptor, input: &RawInput) -> Result<FormValue, FieldError> {
    let fail = |problem| FieldError {
        field: field.name.clone(),
        label: field.label.clone(),
        problem,
    };

    let value = match (field.kind, input) {
        (FieldKind::Checkbox, RawInput::Toggle(b)) => FormValue::Bool(*b),
        (FieldKind::Checkbox, RawInput::Text(s)) => FormValue::Bool(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "yes" | "1"
        )),
        (_, input) if input.text().trim().is_empty() => FormValue::Unset,
        (FieldKind::Number, input) => {
            let text = input.text().trim();
            FormValue::Number(
                parse_number(text).ok_or_else(|| fail(FieldProblem::NotANumber(text.to_string())))?,
            )
        }
        (FieldKind::Select, input) => {
            let text = input.text();
            if !field.enum_values.is_empty() && !field.enum_values.iter().any(|v| v == text) {
                return Err(fail(FieldProblem::NotAnOption(text.to_string())));
            }
            FormValue::Text(text.to_string())
        }
        (FieldKind::Array, input) => FormValue::List(
            input
                .text()
                .split([',', '\n'])
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        (FieldKind::Text | FieldKind::Email | FieldKind::Datetime, input) => {
            FormValue::Text(input.text().to_string())
        }
    };

    if field.required && value.is_unset() {
        return Err(fail(FieldProblem::Required));
    }
    Ok(value)
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(Number::from(u));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// The structured record a form submits: field name to typed value, in
/// field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormRecord(IndexMap<String, FormValue>);

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object payload; unset fields are omitted.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .filter(|(_, v)| !v.is_unset())
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}
