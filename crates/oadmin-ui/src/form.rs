use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use indexmap::IndexMap;
use log::debug;
use oadmin_core::FieldDescriptor;
use serde_json::Value;

use crate::error::{FormError, SubmitError};
use crate::value::{FieldError, FormRecord, RawInput, coerce};
use crate::widget::{Control, SubmitControl, Widget, WidgetRenderer};

/// Shown when a submission fails without a message of its own.
pub const GENERIC_FAILURE: &str = "Submission failed";

/// Receives the record a form submits.
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, record: FormRecord) -> Result<(), SubmitError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The handler accepted the record; the form was cleared.
    Submitted,
    /// A submission was already in flight; nothing happened.
    Ignored,
    /// Local validation failed; the handler was not called.
    Invalid(Vec<FieldError>),
    /// The handler rejected the record; values were kept.
    Failed(String),
}

struct FormInner {
    state: FormState,
    inputs: IndexMap<String, RawInput>,
    error: Option<String>,
    field_errors: Vec<FieldError>,
}

/// A form over an ordered list of fields.
///
/// At most one submission is in flight at a time. The lock is never held
/// across the handler call.
pub struct Form {
    fields: Vec<FieldDescriptor>,
    submit_label: String,
    inner: Mutex<FormInner>,
}

fn initial_inputs(fields: &[FieldDescriptor]) -> IndexMap<String, RawInput> {
    fields
        .iter()
        .map(|f| (f.name.clone(), RawInput::initial(f.kind)))
        .collect()
}

/// Resets the form to `Idle` if a submission is dropped before it completes.
struct InFlight<'a> {
    form: &'a Form,
    done: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            debug!("submission dropped before completing");
            self.form.lock().state = FormState::Idle;
        }
    }
}

impl Form {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        let inputs = initial_inputs(&fields);
        Self {
            fields,
            submit_label: "Save".to_string(),
            inner: Mutex::new(FormInner {
                state: FormState::Idle,
                inputs,
                error: None,
                field_errors: Vec::new(),
            }),
        }
    }

    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, FormInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn state(&self) -> FormState {
        self.lock().state
    }

    /// Form-level error currently displayed.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        self.lock().field_errors.clone()
    }

    pub fn input(&self, name: &str) -> Option<RawInput> {
        self.lock().inputs.get(name).cloned()
    }

    fn set_input(&self, name: &str, input: RawInput) -> Result<(), FormError> {
        let mut inner = self.lock();
        if inner.state == FormState::Submitting {
            return Err(FormError::Submitting);
        }
        let slot = inner
            .inputs
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        *slot = input;
        Ok(())
    }

    /// Set a text-like field's input as typed.
    pub fn set_text(&self, name: &str, text: impl Into<String>) -> Result<(), FormError> {
        self.set_input(name, RawInput::Text(text.into()))
    }

    pub fn set_checked(&self, name: &str, checked: bool) -> Result<(), FormError> {
        self.set_input(name, RawInput::Toggle(checked))
    }

    /// Replace every input with the values of an existing record. Fields
    /// missing from the record are reset.
    pub fn load(&self, record: &Value) -> Result<(), FormError> {
        let mut inner = self.lock();
        if inner.state == FormState::Submitting {
            return Err(FormError::Submitting);
        }
        inner.inputs = self
            .fields
            .iter()
            .map(|f| {
                let input = record
                    .get(&f.name)
                    .map(|v| RawInput::from_json(f.kind, v))
                    .unwrap_or_else(|| RawInput::initial(f.kind));
                (f.name.clone(), input)
            })
            .collect();
        inner.error = None;
        inner.field_errors.clear();
        Ok(())
    }

    /// Reset inputs and errors. Ignored while submitting.
    pub fn clear(&self) {
        let mut inner = self.lock();
        if inner.state == FormState::Submitting {
            return;
        }
        inner.inputs = initial_inputs(&self.fields);
        inner.error = None;
        inner.field_errors.clear();
    }

    /// Build the typed record from the current inputs.
    pub fn record(&self) -> Result<FormRecord, Vec<FieldError>> {
        build_record(&self.fields, &self.lock().inputs)
    }

    /// Validate, then hand the record to `handler`.
    ///
    /// Success clears the form. Failure keeps every value and displays the
    /// handler's message, or [`GENERIC_FAILURE`] when it has none.
    pub async fn submit<H>(&self, handler: &H) -> SubmitOutcome
    where
        H: SubmitHandler + ?Sized,
    {
        let record = {
            let mut inner = self.lock();
            if inner.state == FormState::Submitting {
                debug!("submit ignored: a submission is already in flight");
                return SubmitOutcome::Ignored;
            }
            match build_record(&self.fields, &inner.inputs) {
                Ok(record) => {
                    inner.state = FormState::Submitting;
                    inner.error = None;
                    inner.field_errors.clear();
                    record
                }
                Err(errors) => {
                    inner.error = Some(
                        errors
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; "),
                    );
                    inner.field_errors = errors.clone();
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };

        let mut flight = InFlight {
            form: self,
            done: false,
        };
        let result = handler.submit(record).await;
        flight.done = true;

        let mut inner = self.lock();
        inner.state = FormState::Idle;
        match result {
            Ok(()) => {
                inner.inputs = initial_inputs(&self.fields);
                SubmitOutcome::Submitted
            }
            Err(err) => {
                let message = err
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                inner.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// Draw every field, the error banner if any, and the submit control.
    pub fn render(&self, renderer: &mut dyn WidgetRenderer) {
        let inner = self.lock();
        let disabled = inner.state == FormState::Submitting;
        for field in &self.fields {
            let initial;
            let input = match inner.inputs.get(&field.name) {
                Some(input) => input,
                None => {
                    initial = RawInput::initial(field.kind);
                    &initial
                }
            };
            let widget = Widget {
                name: &field.name,
                label: &field.label,
                description: &field.description,
                required: field.required,
                disabled,
                control: Control::for_field(field, input),
                error: inner
                    .field_errors
                    .iter()
                    .find(|e| e.field == field.name)
                    .map(ToString::to_string),
            };
            renderer.field(&widget);
        }
        if let Some(message) = &inner.error {
            renderer.error(message);
        }
        renderer.submit(&SubmitControl {
            label: self.submit_label.clone(),
            disabled,
        });
    }
}

fn build_record(
    fields: &[FieldDescriptor],
    inputs: &IndexMap<String, RawInput>,
) -> Result<FormRecord, Vec<FieldError>> {
    let mut record = FormRecord::new();
    let mut errors = Vec::new();
    for field in fields {
        let input = inputs
            .get(&field.name)
            .cloned()
            .unwrap_or_else(|| RawInput::initial(field.kind));
        match coerce(field, &input) {
            Ok(value) => record.insert(field.name.clone(), value),
            Err(err) => errors.push(err),
        }
    }
    if errors.is_empty() {
        Ok(record)
    } else {
        Err(errors)
    }
}
