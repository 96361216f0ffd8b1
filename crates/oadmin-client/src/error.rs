use oadmin_core::Verb;
use thiserror::Error;

/// Failure reported by the transport layer for one call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or("request failed"))]
pub struct ClientError {
    /// User-facing message, when the backend provided one.
    pub message: Option<String>,
    pub status: Option<u16>,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            status: None,
        }
    }

    /// A failure that carries no message of its own.
    pub fn silent() -> Self {
        Self {
            message: None,
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn not_implemented(verb: Verb) -> Self {
        Self::new(format!("`{verb}` is not implemented by this client")).with_status(501)
    }
}

/// Failure of a call made through the capability surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("`{verb}` is not supported for resource `{resource}`")]
    Unsupported { resource: String, verb: Verb },

    #[error(transparent)]
    Failed(#[from] ClientError),
}

impl CallError {
    /// Message to show the user for this failure, if any.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CallError::Unsupported { .. } => Some(self.to_string()),
            CallError::Failed(e) => e.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("capability policy does not match the registered clients:\n  {}", .0.join("\n  "))]
    ConfigInvalid(Vec<String>),
}
