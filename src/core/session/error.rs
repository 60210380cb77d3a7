//! Client-facing session errors

use serde::{Deserialize, Serialize};

/// Error categories surfaced to the dashboard
///
/// Mapped from HTTP status: 401 is `Authentication`, 403 is `Authorization`,
/// 400/409/422 are `Validation`; transport failures and any other status
/// are `Network`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Network(String),
}

impl SessionError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => SessionError::Authentication(message),
            403 => SessionError::Authorization(message),
            400 | 409 | 422 => SessionError::Validation(message),
            _ => SessionError::Network(message),
        }
    }

    pub fn session_expired() -> Self {
        SessionError::Authentication("Your session has expired, please sign in again".to_string())
    }
}
