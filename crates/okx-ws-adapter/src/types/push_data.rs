/*
[INPUT]:  Decoded push envelopes (no event)
[OUTPUT]: Push data generic over channel and payload types
[POS]:    Data layer - subscribed data delivery
[UPDATE]: When push envelope fields change
*/

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use super::channel::{Channel, RawChannel};
use super::projection::{ProjectionError, decode_each, decode_raw};
use crate::error::Result;

/// One undecoded payload block
pub type RawPayload = Box<RawValue>;

/// Push data as delivered by the read loop
pub type RawPushData = PushData<RawChannel, RawPayload>;

/// Push data parameters
#[derive(Debug, Clone, Serialize)]
pub struct PushData<A, D> {
    /// Subscribed channel
    pub arg: A,
    /// Subscribed data
    pub data: Vec<D>,

    #[serde(skip)]
    pub(crate) raw: Arc<str>,
}

impl<A, D> PushData<A, D> {
    /// The frame this push was decoded from
    pub fn raw_message(&self) -> &str {
        &self.raw
    }
}

impl<A: Channel, D> PushData<A, D> {
    pub fn channel_name(&self) -> Result<String> {
        self.arg.channel_name()
    }
}

impl RawPushData {
    /// Project into concrete channel and payload types
    ///
    /// Each data element is decoded independently; the first failure stops
    /// the projection and the error carries what was decoded so far.
    pub fn project<A, D>(&self) -> std::result::Result<PushData<A, D>, ProjectionError<D>>
    where
        A: DeserializeOwned,
        D: DeserializeOwned,
    {
        let arg = decode_raw::<A>(self.arg.as_raw()).map_err(ProjectionError::<D>::arg)?;
        let data = decode_each::<D>(&self.data)?;
        Ok(PushData {
            arg,
            data,
            raw: Arc::clone(&self.raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TickersChannel, TickersData};

    fn raw_push(arg: &str, data: &[&str]) -> RawPushData {
        PushData {
            arg: RawChannel::from_json(arg).unwrap(),
            data: data
                .iter()
                .map(|item| RawValue::from_string((*item).to_string()).unwrap())
                .collect(),
            raw: Arc::from("raw"),
        }
    }

    #[test]
    fn test_project_tickers() {
        let push = raw_push(
            r#"{"channel":"tickers","instId":"BTC-USDT"}"#,
            &[r#"{"instType":"SPOT","instId":"BTC-USDT","last":"9999.99","ts":"1597026383085"}"#],
        );
        assert_eq!(push.channel_name().unwrap(), "tickers");

        let typed = push.project::<TickersChannel, TickersData>().unwrap();
        assert_eq!(typed.arg.inst_id, "BTC-USDT");
        assert_eq!(typed.data.len(), 1);
        assert_eq!(typed.data[0].last, "9999.99");
        assert_eq!(typed.raw_message(), "raw");
    }

    #[test]
    fn test_project_keeps_partial_data() {
        let push = raw_push(
            r#"{"channel":"tickers","instId":"BTC-USDT"}"#,
            &[r#"{"instId":"BTC-USDT"}"#, r#"[1,2]"#, r#"{"instId":"ETH-USDT"}"#],
        );
        let err = push.project::<TickersChannel, TickersData>().unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.decoded.len(), 1);
        assert_eq!(err.decoded[0].inst_id, "BTC-USDT");
    }

    #[test]
    fn test_project_arg_failure() {
        let push = raw_push(r#"[]"#, &[r#"{"instId":"BTC-USDT"}"#]);
        let err = push.project::<TickersChannel, TickersData>().unwrap_err();
        assert_eq!(err.index, None);
        assert!(err.decoded.is_empty());
    }
}
