use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::BillStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Forbidden,
    /// Any code this client does not act on.
    #[serde(other)]
    Other,
}

/// JSON error body a bill API may send alongside a failing status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unrecognized bill status code '{0}'")]
    UnknownStatus(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("bill status cannot move from {from} to {to}")]
    InvalidTransition { from: BillStatus, to: BillStatus },
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
