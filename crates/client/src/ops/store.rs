//! `POST /store`: seal a value and create it under a key.

use sot_common::{protocol::ValueRequest, Outcome, SotError};

use super::{seal_value, write_outcome, Context};
use crate::transport::{ApiRequest, Method};

const OP: &str = "store";

/// Seal `value` and store it under `key`.
///
/// Nothing is sent if the write token or the key is missing, or if sealing
/// fails.
pub(crate) async fn execute(
    ctx: &Context<'_>,
    key: &str,
    value: &str,
) -> Result<Outcome, SotError> {
    let token = ctx.settings.write_token()?;
    let envelope = seal_value(ctx.codec()?, value)?;

    let body = ValueRequest {
        key: key.to_owned(),
        value: envelope,
    };
    let request = ApiRequest::new(Method::Post, ["store"], token).with_json(&body)?;
    let response = ctx.send(OP, request).await?;
    write_outcome(OP, &response)
}
