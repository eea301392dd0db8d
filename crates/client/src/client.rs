//! [`Client`]: the public façade over the four operations.
//!
//! Every operation returns an [`Outcome`] and never an error: configuration,
//! crypto, transport, and remote failures are all folded into the record.

use std::sync::OnceLock;

use anyhow::Result;
use sot_common::{Outcome, SotError};

use crate::config::Settings;
use crate::crypto::EnvelopeCodec;
use crate::key;
use crate::ops::{self, update::Update, Context};
use crate::transport::{HttpTransport, Transport};

/// Client for the source-of-truth service.
///
/// Settings are fixed at construction. The symmetric key is resolved on the
/// first operation that needs it and kept for the life of the client.
pub struct Client<T = HttpTransport> {
    settings: Settings,
    transport: T,
    codec: OnceLock<Box<dyn EnvelopeCodec>>,
}

impl Client<HttpTransport> {
    /// Build a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL or timeout is invalid, or the HTTP
    /// client cannot be built. Missing credentials are reported later, per
    /// operation.
    pub fn from_env() -> Result<Self> {
        Self::from_settings(Settings::from_env()?)
    }

    /// Build a client over HTTPS from already loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let transport = HttpTransport::new(&settings)?;
        Ok(Self::with_transport(settings, transport))
    }
}

impl<T: Transport> Client<T> {
    /// Build a client over any [`Transport`].
    pub fn with_transport(settings: Settings, transport: T) -> Self {
        Self {
            settings,
            transport,
            codec: OnceLock::new(),
        }
    }

    /// Use `codec` instead of resolving `SOT_CRYPT_KEY`.
    pub fn with_codec(mut self, codec: impl EnvelopeCodec + 'static) -> Self {
        self.codec = OnceLock::from(Box::new(codec) as Box<dyn EnvelopeCodec>);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate a base64 key for provisioning, or `None` if one is already
    /// configured.
    pub fn crypt_key_generate(&self) -> Option<String> {
        key::generate_key(&self.settings)
    }

    /// Fetch and decrypt the value stored under `key`.
    pub async fn show(&self, key: &str) -> Outcome {
        finish(ops::show::execute(&self.context(), key, None).await)
    }

    /// Fetch and decrypt a single `attribute` of `key`.
    pub async fn show_attribute(&self, key: &str, attribute: &str) -> Outcome {
        finish(ops::show::execute(&self.context(), key, Some(attribute)).await)
    }

    /// Encrypt `value` and store it under `key`.
    pub async fn store(&self, key: &str, value: &str) -> Outcome {
        finish(ops::store::execute(&self.context(), key, value).await)
    }

    /// Encrypt `value` and replace the value stored under `key`.
    pub async fn update(&self, key: &str, value: &str) -> Outcome {
        finish(ops::update::execute(&self.context(), key, Update::Value(value)).await)
    }

    /// Patch attributes of `key`. The attributes are sent as given, without
    /// encryption.
    pub async fn update_attributes(&self, key: &str, attributes: serde_json::Value) -> Outcome {
        finish(ops::update::execute(&self.context(), key, Update::Attributes(attributes)).await)
    }

    /// Delete `key`.
    pub async fn destroy(&self, key: &str) -> Outcome {
        finish(ops::destroy::execute(&self.context(), key, None).await)
    }

    /// Delete `key`, passing extra attributes to the service.
    pub async fn destroy_with_attributes(
        &self,
        key: &str,
        attributes: serde_json::Value,
    ) -> Outcome {
        finish(ops::destroy::execute(&self.context(), key, Some(attributes)).await)
    }

    fn context(&self) -> Context<'_> {
        Context {
            settings: &self.settings,
            transport: &self.transport,
            codec: &self.codec,
        }
    }
}

fn finish(result: std::result::Result<Outcome, SotError>) -> Outcome {
    result.unwrap_or_else(Outcome::from)
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("settings", &self.settings)
            .field("key_resolved", &self.codec.get().is_some())
            .finish_non_exhaustive()
    }
}
