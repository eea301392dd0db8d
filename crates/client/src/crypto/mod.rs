//! AES-256-GCM envelope encryption of single values.
//!
//! This module is intentionally free of HTTP dependencies. It provides the
//! seal/open primitives the operations wrap around each network call.
//!
//! # Envelope format
//!
//! ```text
//! base64( nonce[12] || tag[16] || ciphertext[len(plaintext)] )
//! ```
//!
//! Standard alphabet, padded. No associated data is bound, so the format
//! carries no metadata beyond its own segments.

pub mod cipher;
pub mod codec;

pub use cipher::{open, seal, CipherError, Envelope, KEY_LEN, MIN_ENVELOPE_LEN, NONCE_LEN, TAG_LEN};
pub use codec::{AesGcmCodec, EnvelopeCodec};

use sot_common::SotError;

impl From<CipherError> for SotError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidPayload(reason) => SotError::InvalidPayload(reason),
            CipherError::Authentication => SotError::Authentication,
            CipherError::Aead => SotError::Crypto(CipherError::Aead.to_string()),
        }
    }
}
