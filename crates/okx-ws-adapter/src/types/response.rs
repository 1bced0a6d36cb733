/*
[INPUT]:  Decoded non-push envelopes (subscribe, unsubscribe, login, error)
[OUTPUT]: Typed operation responses with derived server errors
[POS]:    Data layer - operation results
[UPDATE]: When response fields or success codes change
*/

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::channel::RawChannel;
use crate::error::OkxError;

/// Operation result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    /// Echoed request id
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// login, subscribe, unsubscribe or error
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<T>,
    pub code: String,
    pub msg: String,
    pub conn_id: String,

    #[serde(skip)]
    pub(crate) raw: Arc<str>,
}

impl<T> Response<T> {
    /// A non-empty code other than "0" means failure
    pub fn is_error(&self) -> bool {
        !matches!(self.code.as_str(), "" | "0")
    }

    /// Server error derived from `code`/`msg`, if the operation failed
    pub fn error(&self) -> Option<OkxError> {
        if !self.is_error() {
            return None;
        }
        Some(OkxError::Operation {
            event: self.event.clone(),
            code: self.code.clone(),
            msg: self.msg.clone(),
            conn_id: self.conn_id.clone(),
        })
    }

    /// The frame this response was decoded from
    pub fn raw_message(&self) -> &str {
        &self.raw
    }
}

impl Response<RawChannel> {
    /// Project the raw channel argument into `T`
    pub fn project<T: DeserializeOwned>(&self) -> Result<Response<T>, OkxError> {
        let arg = self.arg.as_ref().map(RawChannel::decode).transpose()?;
        Ok(Response {
            id: self.id.clone(),
            event: self.event.clone(),
            arg,
            code: self.code.clone(),
            msg: self.msg.clone(),
            conn_id: self.conn_id.clone(),
            raw: Arc::clone(&self.raw),
        })
    }
}
