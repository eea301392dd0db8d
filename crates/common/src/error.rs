//! Common error types shared across crates.

use thiserror::Error;

/// Top-level client error type.
///
/// Variants map to the `status_code` carried by an [`Outcome`](crate::Outcome):
/// - [`SotError::Remote`] → the HTTP status returned by the service
/// - every other variant → `0`, meaning no HTTP exchange produced the failure
#[derive(Debug, Error)]
pub enum SotError {
    /// A credential or the symmetric key is missing or malformed. The network
    /// is never contacted when this is returned.
    #[error("{0}")]
    Configuration(String),

    /// An envelope could not be decoded: bad base64, truncated, or an opened
    /// value that is not text.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The AEAD tag did not verify (tampered envelope or wrong key).
    #[error("decryption failed or data was tampered with")]
    Authentication,

    /// The encryption primitive itself failed.
    #[error("{0}")]
    Crypto(String),

    /// The HTTP exchange could not be completed.
    #[error("{0}")]
    Network(String),

    /// The service answered with a non-200 status.
    #[error("{message}")]
    Remote { status: u16, message: String },
}

impl SotError {
    /// Returns the status code that should be reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            SotError::Remote { status, .. } => *status,
            SotError::Configuration(_)
            | SotError::InvalidPayload(_)
            | SotError::Authentication
            | SotError::Crypto(_)
            | SotError::Network(_) => 0,
        }
    }
}
