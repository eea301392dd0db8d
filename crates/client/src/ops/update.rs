//! `PUT /update`: replace a value or patch attributes.

use sot_common::{
    protocol::{AttributesRequest, ValueRequest},
    Outcome, SotError,
};

use super::{seal_value, write_outcome, Context};
use crate::transport::{ApiRequest, Method};

const OP: &str = "update";

/// What an update replaces.
#[derive(Debug, Clone)]
pub enum Update<'a> {
    /// Replace the whole value; sealed before sending.
    Value(&'a str),
    /// Patch structured attributes prepared by the caller; sent as given.
    Attributes(serde_json::Value),
}

pub(crate) async fn execute(
    ctx: &Context<'_>,
    key: &str,
    update: Update<'_>,
) -> Result<Outcome, SotError> {
    let token = ctx.settings.write_token()?;

    let request = ApiRequest::new(Method::Put, ["update"], token);
    let request = match update {
        Update::Value(value) => {
            let body = ValueRequest {
                key: key.to_owned(),
                value: seal_value(ctx.codec()?, value)?,
            };
            request.with_json(&body)?
        }
        Update::Attributes(attributes) => {
            let body = AttributesRequest {
                key: key.to_owned(),
                attributes: Some(attributes),
            };
            request.with_json(&body)?
        }
    };

    let response = ctx.send(OP, request).await?;
    write_outcome(OP, &response)
}
