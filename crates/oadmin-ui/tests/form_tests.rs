use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use oadmin_core::{FieldDescriptor, FieldKind};
use oadmin_ui::form::GENERIC_FAILURE;
use oadmin_ui::{
    Form, FormError, FormRecord, FormState, RawInput, SubmitControl, SubmitError, SubmitHandler,
    SubmitOutcome, Widget, WidgetRenderer,
};
use serde_json::{Value, json};
use tokio::sync::Notify;

/// Counts calls, remembers the last payload, and fails on request.
#[derive(Default)]
struct RecordingHandler {
    calls: AtomicUsize,
    last: Mutex<Option<Value>>,
    reject: Option<SubmitError>,
    gate: Option<Notify>,
}

impl RecordingHandler {
    fn rejecting(err: SubmitError) -> Self {
        Self {
            reject: Some(err),
            ..Default::default()
        }
    }

    fn gated() -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubmitHandler for RecordingHandler {
    async fn submit(&self, record: FormRecord) -> Result<(), SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(record.to_json());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.reject {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
struct Recorder {
    fields: Vec<(String, bool, bool)>,
    error: Option<String>,
    submit: Option<SubmitControl>,
}

impl WidgetRenderer for Recorder {
    fn field(&mut self, widget: &Widget<'_>) {
        self.fields
            .push((widget.name.to_string(), widget.required, widget.disabled));
    }

    fn error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn submit(&mut self, control: &SubmitControl) {
        self.submit = Some(control.clone());
    }
}

fn book_form() -> Form {
    Form::new(vec![
        FieldDescriptor::new("title", FieldKind::Text).required(),
        FieldDescriptor::new("price", FieldKind::Number),
        FieldDescriptor::new("published", FieldKind::Checkbox),
        FieldDescriptor::new("genre", FieldKind::Select).with_options(["fiction", "poetry"]),
        FieldDescriptor::new("keywords", FieldKind::Array),
    ])
}

#[tokio::test]
async fn double_click_makes_one_call() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    let handler = RecordingHandler::gated();
    let gate = handler.gate.as_ref().unwrap();

    let (first, second) = tokio::join!(form.submit(&handler), async {
        let outcome = form.submit(&handler).await;
        gate.notify_one();
        outcome
    });

    assert_eq!(first, SubmitOutcome::Submitted);
    assert_eq!(second, SubmitOutcome::Ignored);
    assert_eq!(handler.calls(), 1);
    assert_eq!(form.state(), FormState::Idle);
}

#[tokio::test]
async fn controls_are_disabled_while_submitting() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    let handler = RecordingHandler::gated();
    let gate = handler.gate.as_ref().unwrap();

    let (_, (recorder, edit)) = tokio::join!(form.submit(&handler), async {
        let mut recorder = Recorder::default();
        form.render(&mut recorder);
        let edit = form.set_text("title", "Emma");
        gate.notify_one();
        (recorder, edit)
    });

    assert_eq!(edit, Err(FormError::Submitting));
    assert!(recorder.submit.unwrap().disabled);
    assert!(recorder.fields.iter().all(|(_, _, disabled)| *disabled));

    let mut after = Recorder::default();
    form.render(&mut after);
    assert!(!after.submit.unwrap().disabled);
}

#[tokio::test]
async fn failed_submit_keeps_values_and_shows_message() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    form.set_text("price", "12").unwrap();
    form.set_checked("published", true).unwrap();
    let handler = RecordingHandler::rejecting(SubmitError::new("duplicate title"));

    let outcome = form.submit(&handler).await;

    assert_eq!(outcome, SubmitOutcome::Failed("duplicate title".to_string()));
    assert_eq!(form.error().as_deref(), Some("duplicate title"));
    assert_eq!(form.input("title"), Some(RawInput::Text("Dune".into())));
    assert_eq!(form.input("price"), Some(RawInput::Text("12".into())));
    assert_eq!(form.input("published"), Some(RawInput::Toggle(true)));

    let mut recorder = Recorder::default();
    form.render(&mut recorder);
    assert_eq!(recorder.error.as_deref(), Some("duplicate title"));
}

#[tokio::test]
async fn failure_without_message_uses_generic_text() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    let handler = RecordingHandler::rejecting(SubmitError::silent());

    let outcome = form.submit(&handler).await;

    assert_eq!(outcome, SubmitOutcome::Failed(GENERIC_FAILURE.to_string()));
    assert_eq!(form.error().as_deref(), Some("Submission failed"));
}

#[tokio::test]
async fn success_submits_typed_record_and_clears() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    form.set_text("price", "12").unwrap();
    form.set_checked("published", true).unwrap();
    form.set_text("genre", "fiction").unwrap();
    form.set_text("keywords", "space, sand").unwrap();
    let handler = RecordingHandler::default();

    assert_eq!(form.submit(&handler).await, SubmitOutcome::Submitted);
    assert_eq!(
        handler.last.lock().unwrap().clone().unwrap(),
        json!({
            "title": "Dune",
            "price": 12,
            "published": true,
            "genre": "fiction",
            "keywords": ["space", "sand"],
        })
    );
    assert_eq!(form.input("title"), Some(RawInput::Text(String::new())));
    assert_eq!(form.input("published"), Some(RawInput::Toggle(false)));
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn empty_optional_fields_are_omitted() {
    let form = book_form();
    form.set_text("title", "Dune").unwrap();
    let handler = RecordingHandler::default();

    form.submit(&handler).await;

    assert_eq!(
        handler.last.lock().unwrap().clone().unwrap(),
        json!({"title": "Dune", "published": false})
    );
}

#[tokio::test]
async fn invalid_input_blocks_submission() {
    let form = book_form();
    form.set_text("price", "12abc").unwrap();
    let handler = RecordingHandler::default();

    let outcome = form.submit(&handler).await;

    let errors = match outcome {
        SubmitOutcome::Invalid(errors) => errors,
        other => panic!("expected local validation to fail, got {other:?}"),
    };
    let messages: Vec<_> = errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        vec!["Title is required", "Price: `12abc` is not a number"]
    );
    assert_eq!(handler.calls(), 0);
    assert_eq!(form.input("price"), Some(RawInput::Text("12abc".into())));
    assert_eq!(form.state(), FormState::Idle);
}

#[test]
fn rendered_controls_carry_required_marker() {
    let form = book_form();
    let mut recorder = Recorder::default();
    form.render(&mut recorder);

    let required: Vec<_> = recorder
        .fields
        .iter()
        .map(|(name, required, _)| (name.as_str(), *required))
        .collect();
    assert_eq!(
        required,
        vec![
            ("title", true),
            ("price", false),
            ("published", false),
            ("genre", false),
            ("keywords", false),
        ]
    );
    assert_eq!(recorder.submit.unwrap().label, "Save");
}

#[test]
fn unknown_field_is_rejected() {
    let form = book_form();
    assert_eq!(
        form.set_text("isbn", "x"),
        Err(FormError::UnknownField("isbn".to_string()))
    );
}

#[test]
fn load_fills_inputs_from_record() {
    let form = book_form();
    form.load(&json!({"title": "Dune", "price": 9.5, "keywords": ["a", "b"]}))
        .unwrap();
    assert_eq!(form.input("title"), Some(RawInput::Text("Dune".into())));
    assert_eq!(form.input("price"), Some(RawInput::Text("9.5".into())));
    assert_eq!(form.input("keywords"), Some(RawInput::Text("a, b".into())));
    assert_eq!(form.input("published"), Some(RawInput::Toggle(false)));
}
