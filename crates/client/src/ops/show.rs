//! `GET /show/{key}`: fetch and open a stored envelope.

use sot_common::{protocol::ShowResponse, Outcome, SotError};
use tracing::warn;

use super::{remote_error, Context, SUCCESS_STATUS};
use crate::crypto::EnvelopeCodec;
use crate::transport::{is_dot_segment, ApiRequest, Method};

const OP: &str = "show";

/// Read `key`, optionally narrowed to one `attribute`, and decrypt the value.
///
/// A value that fails to open still yields an [`Outcome`] (not an error) so
/// the HTTP status of the successful fetch is preserved.
pub(crate) async fn execute(
    ctx: &Context<'_>,
    key: &str,
    attribute: Option<&str>,
) -> Result<Outcome, SotError> {
    let token = ctx.settings.read_token()?;
    if is_dot_segment(key) {
        // URL normalisation would drop the segment and hit another route.
        return Err(SotError::InvalidPayload(format!(
            "key {key:?} cannot be used as a URL path segment"
        )));
    }
    let codec = ctx.codec()?;

    let mut request = ApiRequest::new(Method::Get, ["show", key], token);
    if let Some(attribute) = attribute {
        request = request.with_query("attribute", attribute);
    }

    let response = ctx.send(OP, request).await?;
    if response.status != SUCCESS_STATUS {
        return Err(remote_error(OP, &response));
    }

    let envelope = match serde_json::from_slice::<ShowResponse>(&response.body) {
        Ok(body) => body.value.unwrap_or_default(),
        Err(e) => {
            warn!(op = OP, error = %e, "unexpected show body; treating value as empty");
            String::new()
        }
    };
    if envelope.is_empty() {
        return Ok(Outcome::ok(response.status));
    }

    match decrypt(codec, &envelope) {
        Ok(value) => Ok(Outcome::ok_with_value(response.status, value)),
        Err(err) => {
            warn!(op = OP, error = %err, "stored value could not be opened");
            Ok(Outcome::failure(
                response.status,
                format!("Decryption failed: {err}"),
            ))
        }
    }
}

fn decrypt(codec: &dyn EnvelopeCodec, envelope: &str) -> Result<String, SotError> {
    let plaintext = codec.open(envelope)?;
    String::from_utf8(plaintext)
        .map_err(|_| SotError::InvalidPayload("decrypted value is not valid UTF-8".into()))
}
