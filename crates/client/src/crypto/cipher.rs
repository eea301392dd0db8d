//! AES-256-GCM sealing and opening of envelope values.
//!
//! **Nonce freshness is mandatory.** Every [`seal`] draws a new 96-bit nonce
//! from the OS CSPRNG. Reusing a GCM nonce under the same key breaks both
//! confidentiality and authentication.

use aes_gcm::{
    aead::{AeadCore, AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::key::SecretKey;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Smallest decodable envelope: a nonce and a tag around an empty ciphertext.
pub const MIN_ENVELOPE_LEN: usize = NONCE_LEN + TAG_LEN;

/// A parsed envelope.
///
/// The string representation is `base64(nonce || tag || ciphertext)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext, same length as the plaintext.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode this envelope to its wire string.
    pub fn to_base64(&self) -> String {
        let mut raw = Vec::with_capacity(MIN_ENVELOPE_LEN + self.ciphertext.len());
        raw.extend_from_slice(&self.nonce);
        raw.extend_from_slice(&self.tag);
        raw.extend_from_slice(&self.ciphertext);
        STANDARD.encode(raw)
    }

    /// Parse a wire string back into an [`Envelope`].
    ///
    /// The length check happens before any slicing, so a truncated payload is
    /// rejected without reaching the cipher.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidPayload`] if the string is not standard
    /// base64 or decodes to fewer than [`MIN_ENVELOPE_LEN`] bytes.
    pub fn from_base64(s: &str) -> Result<Self, CipherError> {
        let raw = STANDARD
            .decode(s)
            .map_err(|_| CipherError::InvalidPayload("envelope is not valid base64".into()))?;
        if raw.len() < MIN_ENVELOPE_LEN {
            return Err(CipherError::InvalidPayload(format!(
                "envelope is {} bytes, need at least {MIN_ENVELOPE_LEN}",
                raw.len()
            )));
        }

        let (nonce, rest) = raw.split_at(NONCE_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut env = Self {
            nonce: [0u8; NONCE_LEN],
            tag: [0u8; TAG_LEN],
            ciphertext: ciphertext.to_vec(),
        };
        env.nonce.copy_from_slice(nonce);
        env.tag.copy_from_slice(tag);
        Ok(env)
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The envelope string is malformed or too short to contain a nonce and tag.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The tag did not verify: the envelope was tampered with or the key is wrong.
    #[error("decryption failed or data was tampered with")]
    Authentication,

    /// AES-GCM encryption failed. Unreachable for inputs below the GCM
    /// message size limit.
    #[error("aead operation failed")]
    Aead,
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CipherError::Aead`] if the AEAD primitive rejects the input.
pub fn seal(plaintext: &[u8], key: &SecretKey) -> Result<Envelope, CipherError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&nonce);
    seal_with_nonce(plaintext, key, nonce_bytes)
}

fn seal_with_nonce(
    plaintext: &[u8],
    key: &SecretKey,
    nonce: [u8; NONCE_LEN],
) -> Result<Envelope, CipherError> {
    let cipher = build_cipher(key);
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|_| CipherError::Aead)?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);
    Ok(Envelope {
        nonce,
        tag: tag_bytes,
        ciphertext: buffer,
    })
}

/// Decrypt an [`Envelope`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::Authentication`] if the tag does not verify. No
/// partial plaintext is ever returned.
pub fn open(envelope: &Envelope, key: &SecretKey) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key);
    let mut buffer = envelope.ciphertext.clone();
    cipher
        .decrypt_in_place_detached(
            Nonce::from_slice(&envelope.nonce),
            b"",
            &mut buffer,
            Tag::from_slice(&envelope.tag),
        )
        .map_err(|_| CipherError::Authentication)?;
    Ok(buffer)
}

fn build_cipher(key: &SecretKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}
