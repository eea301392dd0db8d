//! Request and response bodies exchanged with the source-of-truth service.
//!
//! Every `value` that crosses the wire is an envelope string produced by the
//! client's codec, never plaintext.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Write endpoints
// ---------------------------------------------------------------------------

/// Body for `POST /store` and for a full-value `PUT /update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRequest {
    pub key: String,
    /// Base64 envelope of the plaintext value.
    pub value: String,
}

/// Body for a partial `PUT /update` and for `DELETE /destroy`.
///
/// `attributes` is omitted entirely when absent, so a plain destroy sends
/// `{"key": ...}` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributesRequest {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Successful response body for `GET /show/{key}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowResponse {
    /// Base64 envelope, or absent/empty when the service holds no value.
    #[serde(default)]
    pub value: Option<String>,
}

/// Error body returned by the service on any non-200 status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Message used when the service supplies no usable `error` field.
    pub const FALLBACK_MESSAGE: &'static str = "API request failed";

    /// Extract the `error` message from a raw response body, falling back to
    /// [`Self::FALLBACK_MESSAGE`] when the body is not JSON or lacks the field.
    pub fn message_from(body: &[u8]) -> String {
        serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| Self::FALLBACK_MESSAGE.to_owned())
    }
}
