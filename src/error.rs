use thiserror::Error;

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Invalid parameter '{field}': {reason}")]
    InvalidParameter { field: String, reason: String },
    #[error("Prompt must not be empty")]
    EmptyPrompt,
    #[error("Backend failure: {0}")]
    BackendFailure(String),
    #[error("Request was cancelled")]
    Cancelled,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
}

impl StudioError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        StudioError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Errors the UI shows to the user as-is. Cancellation is silent.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, StudioError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
