use oadmin_core::{FieldDescriptor, FieldKind};
use serde::Serialize;

use crate::value::RawInput;

/// Input affordance for free-text fields. Values are submitted as strings
/// whatever the affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputAffordance {
    Text,
    Email,
    DateTime,
}

impl InputAffordance {
    pub fn html_type(&self) -> &'static str {
        match self {
            InputAffordance::Text => "text",
            InputAffordance::Email => "email",
            InputAffordance::DateTime => "datetime-local",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    /// The "nothing selected" entry every select starts with.
    pub fn sentinel() -> Self {
        Self {
            value: String::new(),
            label: "(none)".to_string(),
        }
    }
}

/// The control a field renders as, with its current input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    Input {
        affordance: InputAffordance,
        value: String,
    },
    Number {
        value: String,
    },
    Checkbox {
        checked: bool,
    },
    Select {
        options: Vec<SelectOption>,
        selected: String,
    },
    List {
        value: String,
        item_kind: Option<FieldKind>,
    },
}

impl Control {
    pub fn for_field(field: &FieldDescriptor, input: &RawInput) -> Self {
        let value = input.text().to_string();
        match field.kind {
            FieldKind::Text => Control::Input {
                affordance: InputAffordance::Text,
                value,
            },
            FieldKind::Email => Control::Input {
                affordance: InputAffordance::Email,
                value,
            },
            FieldKind::Datetime => Control::Input {
                affordance: InputAffordance::DateTime,
                value,
            },
            FieldKind::Number => Control::Number { value },
            FieldKind::Checkbox => Control::Checkbox {
                checked: matches!(input, RawInput::Toggle(true)),
            },
            FieldKind::Select => Control::Select {
                options: std::iter::once(SelectOption::sentinel())
                    .chain(field.enum_values.iter().map(|v| SelectOption {
                        value: v.clone(),
                        label: v.clone(),
                    }))
                    .collect(),
                selected: value,
            },
            FieldKind::Array => Control::List {
                value,
                item_kind: field.item_kind,
            },
        }
    }
}

/// Everything a renderer needs for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub description: &'a str,
    pub required: bool,
    pub disabled: bool,
    pub control: Control,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitControl {
    pub label: String,
    pub disabled: bool,
}

/// A component library the form draws itself with.
pub trait WidgetRenderer {
    fn field(&mut self, widget: &Widget<'_>);

    /// Form-level error banner, drawn after the fields.
    fn error(&mut self, message: &str);

    fn submit(&mut self, control: &SubmitControl);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_has_sentinel_first() {
        let genre = FieldDescriptor::new("genre", FieldKind::Select).with_options(["fiction", "poetry"]);
        let Control::Select { options, selected } = Control::for_field(&genre, &RawInput::initial(FieldKind::Select))
        else {
            panic!("expected a select");
        };
        assert_eq!(selected, "");
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["", "fiction", "poetry"]);
    }

    #[test]
    fn test_affordances() {
        let email = FieldDescriptor::new("contact", FieldKind::Email);
        let control = Control::for_field(&email, &RawInput::Text("a@b.org".into()));
        assert_eq!(
            control,
            Control::Input {
                affordance: InputAffordance::Email,
                value: "a@b.org".into()
            }
        );
        assert_eq!(InputAffordance::DateTime.html_type(), "datetime-local");
    }

    #[test]
    fn test_checkbox_defaults_unchecked() {
        let published = FieldDescriptor::new("published", FieldKind::Checkbox);
        assert_eq!(
            Control::for_field(&published, &RawInput::initial(FieldKind::Checkbox)),
            Control::Checkbox { checked: false }
        );
    }
}
