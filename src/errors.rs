use serde::Deserialize;

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    /// Local validation failure, surfaced inline next to the offending field.
    /// Never reaches the network layer.
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Draft state-machine misuse (duplicate submit, editing a closed draft).
    #[error("conflict: {0}")]
    Conflict(String),
    /// A collaborator service call failed remotely. Carries the backend's
    /// human-readable message for the notification sink.
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("transport error")]
    Transport(#[from] reqwest::Error),
    #[error("response decode error: {0}")]
    Decode(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for errors raised before any service call was attempted.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ConsoleError::Validation { .. }
                | ConsoleError::PermissionDenied(_)
                | ConsoleError::Conflict(_)
                | ConsoleError::Configuration(_)
        )
    }
}

/// Error payload the admin backend attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message available, falling back to the error code.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
