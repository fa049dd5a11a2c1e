//! User-facing notices.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Recoverable problem (rejected input).
    Warning,
    /// Failure that reverted a change or indicates corrupt data.
    Error,
}

/// A message to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Error category, when the notice reports an error.
    pub kind: Option<ErrorKind>,
    /// Text to display.
    pub message: String,
}

impl From<&AppError> for Notice {
    fn from(err: &AppError) -> Self {
        let level = if err.is_local_rejection() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        };
        Self {
            level,
            kind: Some(err.kind),
            message: err.message.clone(),
        }
    }
}
