//! `DELETE /destroy`: remove a key. No encryption is involved.

use sot_common::{protocol::AttributesRequest, Outcome, SotError};

use super::{write_outcome, Context};
use crate::transport::{ApiRequest, Method};

const OP: &str = "destroy";

pub(crate) async fn execute(
    ctx: &Context<'_>,
    key: &str,
    attributes: Option<serde_json::Value>,
) -> Result<Outcome, SotError> {
    let token = ctx.settings.write_token()?;

    let body = AttributesRequest {
        key: key.to_owned(),
        attributes,
    };
    let request = ApiRequest::new(Method::Delete, ["destroy"], token).with_json(&body)?;
    let response = ctx.send(OP, request).await?;
    write_outcome(OP, &response)
}
