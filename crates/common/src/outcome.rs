//! The uniform result record returned by every client operation.

use serde::{Deserialize, Serialize};

use crate::SotError;

/// Result of a show, store, update, or destroy call.
///
/// Callers branch on `success`. A `status_code` of `0` means the failure was
/// local (configuration, crypto, transport) and no HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status_code: u16,
    pub success: bool,
    /// Empty on success.
    pub error: String,
    /// Plaintext value; only populated by a successful show.
    pub value: String,
}

impl Outcome {
    /// A successful outcome with no value.
    pub fn ok(status_code: u16) -> Self {
        Self::ok_with_value(status_code, String::new())
    }

    /// A successful outcome carrying a plaintext value.
    pub fn ok_with_value(status_code: u16, value: impl Into<String>) -> Self {
        Self {
            status_code,
            success: true,
            error: String::new(),
            value: value.into(),
        }
    }

    /// A failed outcome.
    pub fn failure(status_code: u16, error: impl Into<String>) -> Self {
        Self {
            status_code,
            success: false,
            error: error.into(),
            value: String::new(),
        }
    }
}

impl From<SotError> for Outcome {
    fn from(err: SotError) -> Self {
        Outcome::failure(err.status_code(), err.to_string())
    }
}
