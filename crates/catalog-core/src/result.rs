//! Outcome wrapper returned by every catalog operation.

use serde::{Deserialize, Serialize};

const DEFAULT_FAILURE: &str = "Operation failed";

/// Success with a payload, or failure with one or more messages.
///
/// Exactly one side is populated: a success carries `data` and no errors, a
/// failure carries at least one error and no data. `error` repeats the
/// messages joined with `", "` for callers that want a single string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult<T> {
    pub is_success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl<T> CommandResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::failures(vec![message.into()])
    }

    /// An empty list still yields a failure with a generic message.
    pub fn failures(mut errors: Vec<String>) -> Self {
        if errors.is_empty() {
            errors.push(DEFAULT_FAILURE.to_string());
        }
        Self {
            is_success: false,
            data: None,
            error: Some(errors.join(", ")),
            errors,
        }
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success
    }
}
