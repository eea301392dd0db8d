//! The seal/open capability injected into the operations.

use crate::key::SecretKey;

use super::cipher::{self, CipherError, Envelope};

/// Turns plaintext into an envelope string and back.
///
/// Implementations must draw a fresh nonce per `seal` and must be safe to
/// share across threads.
pub trait EnvelopeCodec: Send + Sync {
    /// Encrypt `plaintext` into a wire envelope.
    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError>;

    /// Decode and authenticate a wire envelope.
    fn open(&self, envelope: &str) -> Result<Vec<u8>, CipherError>;
}

/// AES-256-GCM codec bound to one key for its whole lifetime.
#[derive(Debug, Clone)]
pub struct AesGcmCodec {
    key: SecretKey,
}

impl AesGcmCodec {
    pub fn new(key: SecretKey) -> Self {
        Self { key }
    }
}

impl EnvelopeCodec for AesGcmCodec {
    fn seal(&self, plaintext: &[u8]) -> Result<String, CipherError> {
        Ok(cipher::seal(plaintext, &self.key)?.to_base64())
    }

    fn open(&self, envelope: &str) -> Result<Vec<u8>, CipherError> {
        let parsed = Envelope::from_base64(envelope)?;
        cipher::open(&parsed, &self.key)
    }
}
