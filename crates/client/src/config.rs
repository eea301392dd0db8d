//! Configuration loading and validation for the client.
//!
//! All values are read from environment variables once, when the client is
//! constructed. Credentials are optional at load time: an operation that needs
//! a missing credential reports it in its [`Outcome`](sot_common::Outcome)
//! instead of failing construction.

use std::{fmt, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use sot_common::SotError;

/// Environment variable holding the base64-encoded 32-byte symmetric key.
pub const CRYPT_KEY_VAR: &str = "SOT_CRYPT_KEY";
/// Environment variable holding the read-scope bearer token.
pub const READ_TOKEN_VAR: &str = "SOT_INT_TOKEN";
/// Environment variable holding the write-scope bearer token.
pub const WRITE_TOKEN_VAR: &str = "VESSOT_INT_TOKEN";

/// Validated client configuration.
///
/// Only produced by [`Settings::from_env`] or [`Settings::from_map`], so every
/// instance has passed normalisation and validation:
///
/// ```compile_fail
/// let settings = sot_client::Settings {
///     crypt_key: None,
///     read_token: None,
///     write_token: None,
///     api_url: "https://example.com/api/".into(),
///     http_timeout_secs: 0,
/// };
/// ```
#[derive(Clone, Deserialize)]
pub struct Settings {
    /// Base64 symmetric key. Decoded and length-checked by [`crate::key`].
    #[serde(default, rename = "sot_crypt_key")]
    pub(crate) crypt_key: Option<String>,

    /// Bearer token for show.
    #[serde(default, rename = "sot_int_token")]
    pub(crate) read_token: Option<String>,

    /// Bearer token for store, update and destroy.
    #[serde(default, rename = "vessot_int_token")]
    pub(crate) write_token: Option<String>,

    /// Base URL of the service, without a trailing slash.
    #[serde(default = "default_api_url", rename = "sot_api_url")]
    pub(crate) api_url: String,

    /// Per-request timeout handed to the HTTP transport.
    #[serde(default = "default_http_timeout", rename = "sot_http_timeout_secs")]
    pub(crate) http_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://sourceoftruth.tech/api".into()
}
fn default_http_timeout() -> u64 {
    30
}

impl Settings {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL or timeout is invalid. Missing
    /// credentials are not an error here.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    /// Load configuration from an explicit variable map instead of the process
    /// environment. Keys use the same names as the environment variables.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::from_env`].
    pub fn from_map<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(config::Environment::default().source(Some(map)))
    }

    fn load(source: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(source)
            .build()
            .context("failed to build configuration from environment")?;

        let s: Settings = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        let s = s.normalise();
        s.validate()?;
        Ok(s)
    }

    /// Treat blank credentials as unset and strip trailing slashes from the URL.
    fn normalise(mut self) -> Self {
        self.crypt_key = non_blank(self.crypt_key);
        self.read_token = non_blank(self.read_token);
        self.write_token = non_blank(self.write_token);
        self.api_url = self.api_url.trim().trim_end_matches('/').to_owned();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            anyhow::bail!("SOT_API_URL must not be empty");
        }
        let url = reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("SOT_API_URL is not a valid URL: {}", self.api_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("SOT_API_URL must use http or https");
        }
        if self.http_timeout_secs == 0 {
            anyhow::bail!("SOT_HTTP_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }

    /// The base64 key as configured. Decoding happens in [`crate::key`].
    pub(crate) fn crypt_key(&self) -> Option<&str> {
        self.crypt_key.as_deref()
    }

    /// Whether `SOT_CRYPT_KEY` is set.
    pub fn has_crypt_key(&self) -> bool {
        self.crypt_key.is_some()
    }

    /// Base URL of the service, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Per-request timeout, always non-zero.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// The read-scope token used by show.
    ///
    /// # Errors
    ///
    /// Returns [`SotError::Configuration`] if `SOT_INT_TOKEN` is unset.
    pub fn read_token(&self) -> Result<&str, SotError> {
        required(self.read_token.as_deref(), READ_TOKEN_VAR)
    }

    /// The write-scope token shared by store, update and destroy.
    ///
    /// # Errors
    ///
    /// Returns [`SotError::Configuration`] if `VESSOT_INT_TOKEN` is unset.
    pub fn write_token(&self) -> Result<&str, SotError> {
        required(self.write_token.as_deref(), WRITE_TOKEN_VAR)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, SotError> {
    value.ok_or_else(|| SotError::Configuration(format!("{name} environment variable not set")))
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credentials never appear in logs, only whether they are present.
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Settings")
            .field("crypt_key", &redact(&self.crypt_key))
            .field("read_token", &redact(&self.read_token))
            .field("write_token", &redact(&self.write_token))
            .field("api_url", &self.api_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
