//! Symmetric key resolution and generation.
//!
//! # Security invariants
//!
//! - The decoded key is **never** written to disk, logged, or included in traces.
//! - A missing or malformed key is always an error; there is no default key.

pub mod secret;

pub use secret::SecretKey;

use aes_gcm::{
    aead::{KeyInit, OsRng},
    Aes256Gcm,
};
use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};
use sot_common::SotError;

use crate::config::{Settings, CRYPT_KEY_VAR};
use crate::crypto::KEY_LEN;

/// Standard alphabet; trailing `=` padding may be present or omitted.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode and validate the configured symmetric key.
///
/// Checks, in order: the key is set, it is standard-alphabet base64 (padding
/// optional), and it decodes to exactly [`KEY_LEN`] bytes. Nothing is cached
/// here.
///
/// # Errors
///
/// Returns [`SotError::Configuration`] naming the first check that failed.
pub fn resolve_key(settings: &Settings) -> Result<SecretKey, SotError> {
    let encoded = settings.crypt_key().ok_or_else(|| {
        SotError::Configuration(format!("{CRYPT_KEY_VAR} environment variable not set"))
    })?;

    let mut decoded = KEY_ENGINE
        .decode(encoded.trim())
        .map_err(|_| SotError::Configuration(format!("{CRYPT_KEY_VAR} is not valid base64")))?;

    let key = SecretKey::from_slice(&decoded);
    let len = decoded.len();
    decoded.iter_mut().for_each(|b| *b = 0);

    key.ok_or_else(|| {
        SotError::Configuration(format!(
            "{CRYPT_KEY_VAR} must decode to {KEY_LEN} bytes, got {len}"
        ))
    })
}

/// Generate a fresh base64-encoded key for provisioning.
///
/// Returns `None` when a key is already configured: there is nothing to do.
/// The new key is only returned; storing it is up to the caller.
pub fn generate_key(settings: &Settings) -> Option<String> {
    if settings.crypt_key().is_some() {
        return None;
    }
    let key = Aes256Gcm::generate_key(OsRng);
    Some(STANDARD.encode(key))
}
