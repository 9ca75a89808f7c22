use control_room_core::ValidationError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any request went out.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} (HTTP {status})")]
    Status { status: StatusCode, message: String },
}

impl ApiError {
    /// Short text for inline `Failed: …` messages.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => error.to_string(),
            Self::Http(error) if error.is_connect() => "backend unreachable".to_string(),
            Self::Http(error) if error.is_timeout() => "backend timed out".to_string(),
            Self::Http(error) => error.to_string(),
            Self::Status { message, .. } => message.clone(),
        }
    }

    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
