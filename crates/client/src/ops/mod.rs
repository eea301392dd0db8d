//! The four remote operations and the response handling they share.
//!
//! Each operation runs: check credential → resolve key and seal (writes) →
//! one network call → interpret status → open (show). Internally every step
//! returns `Result<_, SotError>`; the client façade turns errors into
//! [`Outcome`]s.

pub mod destroy;
pub mod show;
pub mod store;
pub mod update;

use std::sync::OnceLock;

use sot_common::{protocol::ErrorBody, Outcome, SotError};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::crypto::{AesGcmCodec, EnvelopeCodec};
use crate::key::resolve_key;
use crate::transport::{ApiRequest, ApiResponse, Transport};

/// The only status the service uses for success.
pub const SUCCESS_STATUS: u16 = 200;

/// Everything an operation needs from the client that owns it.
pub(crate) struct Context<'a> {
    pub settings: &'a Settings,
    pub transport: &'a dyn Transport,
    pub codec: &'a OnceLock<Box<dyn EnvelopeCodec>>,
}

impl<'a> Context<'a> {
    /// The codec for this client, resolving the key on first use.
    ///
    /// A failed resolution is not cached; settings are immutable so a retry
    /// fails the same way.
    pub fn codec(&self) -> Result<&'a dyn EnvelopeCodec, SotError> {
        if let Some(codec) = self.codec.get() {
            return Ok(codec.as_ref());
        }
        let key = resolve_key(self.settings)?;
        Ok(self
            .codec
            .get_or_init(|| Box::new(AesGcmCodec::new(key)) as Box<dyn EnvelopeCodec>)
            .as_ref())
    }

    /// Perform the single network call for `op`.
    pub async fn send(
        &self,
        op: &'static str,
        request: ApiRequest,
    ) -> Result<ApiResponse, SotError> {
        let response = self.transport.send(request).await.map_err(|e| {
            warn!(op, error = %e, "request failed");
            SotError::from(e)
        })?;
        debug!(op, status = response.status, "response received");
        Ok(response)
    }
}

/// Seal a plaintext value for a write request.
pub(crate) fn seal_value(codec: &dyn EnvelopeCodec, value: &str) -> Result<String, SotError> {
    codec
        .seal(value.as_bytes())
        .map_err(|e| SotError::Crypto(format!("Encryption failed: {e}")))
}

/// Map a non-success response to [`SotError::Remote`].
pub(crate) fn remote_error(op: &'static str, response: &ApiResponse) -> SotError {
    let message = ErrorBody::message_from(&response.body);
    warn!(op, status = response.status, "service returned an error");
    SotError::Remote {
        status: response.status,
        message,
    }
}

/// Interpret the response to a write: only the status code matters.
pub(crate) fn write_outcome(op: &'static str, response: &ApiResponse) -> Result<Outcome, SotError> {
    if response.status == SUCCESS_STATUS {
        Ok(Outcome::ok(response.status))
    } else {
        Err(remote_error(op, response))
    }
}
