use oadmin_client::CallError;
use thiserror::Error;

/// Rejection returned by a submit handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or("submission failed"))]
pub struct SubmitError {
    pub message: Option<String>,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self { message: None }
    }
}

impl From<CallError> for SubmitError {
    fn from(err: CallError) -> Self {
        Self {
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form has no field named `{0}`")]
    UnknownField(String),

    #[error("form is submitting; inputs are locked")]
    Submitting,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error(transparent)]
    Call(#[from] CallError),

    #[error(transparent)]
    Form(#[from] FormError),
}
