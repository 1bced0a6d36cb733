/*
[INPUT]:  Raw WebSocket text frames and outbound requests
[OUTPUT]: Decoded envelopes (or the pong marker) and encoded request frames
[POS]:    WebSocket layer - wire envelope framing
[UPDATE]: When envelope fields or keep-alive literals change
*/

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OkxError, Result};
use crate::types::{RawChannel, RawPayload, Request};

/// Keep-alive probe sent by the client
pub const PING: &str = "ping";
/// Keep-alive reply sent by the server; not JSON
pub const PONG: &str = "pong";

const RAW_LOG_MAX_BYTES: usize = 1024;

/// Wire-level envelope of one inbound frame
///
/// `data` is only populated for push data (no `event`); `code`, `msg` and
/// `connId` only on operation responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Echoed request id
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    /// Echoed operation
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub op: String,
    /// Empty for push data
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub event: String,
    #[serde(default, skip_serializing_if = "RawChannel::is_empty")]
    pub arg: RawChannel,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub data: Vec<RawPayload>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub code: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub msg: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub conn_id: String,
}

/// `null` decodes as the field's empty value
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One decoded inbound text frame
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Keep-alive reply, never dispatched
    Pong,
    Envelope(Envelope),
}

/// Decode a text frame, recognising the `pong` literal before JSON
pub fn decode(text: &str) -> Result<Inbound> {
    if text == PONG {
        return Ok(Inbound::Pong);
    }
    serde_json::from_str(text)
        .map(Inbound::Envelope)
        .map_err(OkxError::MalformedMessage)
}

/// Encode a request as one text frame
pub fn encode<T: Serialize>(request: &Request<T>) -> Result<String> {
    serde_json::to_string(request).map_err(OkxError::Encoding)
}

pub(crate) fn truncate_for_log(value: &str) -> &str {
    if value.len() <= RAW_LOG_MAX_BYTES {
        return value;
    }
    let mut end = RAW_LOG_MAX_BYTES;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
