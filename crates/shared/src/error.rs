use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Unavailable,
    Internal,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ErrorCode::NotFound,
            400 | 422 => ErrorCode::Validation,
            503 => ErrorCode::Unavailable,
            _ => ErrorCode::Internal,
        }
    }

    pub fn status(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::Validation => 400,
            ErrorCode::Unavailable => 503,
            ErrorCode::Internal => 500,
        }
    }
}

/// Rejection of a bill store operation. Displays as the bare message so the
/// view can show it exactly as the store worded it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiException {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiException {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_status(status: u16) -> Self {
        Self::new(ErrorCode::from_status(status), format!("Erreur {status}"))
    }
}
