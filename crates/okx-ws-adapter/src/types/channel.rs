/*
[INPUT]:  Channel argument JSON from requests and envelopes
[OUTPUT]: Channel trait, raw channel carrier and typed/raw sum type
[POS]:    Data layer - polymorphic channel identity
[UPDATE]: When channel identity rules or validation capability change
*/

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::projection::decode_raw;
use crate::error::{OkxError, Result};

/// Self-validation of an outbound request argument.
///
/// The default accepts everything; argument types with structural rules
/// override it.
pub trait Validate {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// A subscription target
pub trait Channel: Validate + Serialize {
    /// Channel name, e.g. `tickers`
    fn channel_name(&self) -> Result<String>;
}

/// Channel argument kept as undecoded JSON
///
/// An absent or `null` argument is represented as an empty carrier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawChannel(Option<Box<RawValue>>);

impl RawChannel {
    /// Wrap a JSON object text without re-encoding it
    pub fn from_json(json: impl Into<String>) -> Result<Self> {
        RawValue::from_string(json.into())
            .map(|raw| Self(Some(raw)))
            .map_err(OkxError::MalformedMessage)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn as_raw(&self) -> Option<&RawValue> {
        self.0.as_deref()
    }

    /// Raw JSON text, `null` when empty
    pub fn get(&self) -> &str {
        self.0.as_deref().map_or("null", RawValue::get)
    }

    /// Decode into a concrete channel type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_raw(self.as_raw()).map_err(OkxError::MalformedMessage)
    }
}

impl Validate for RawChannel {}

impl Channel for RawChannel {
    fn channel_name(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Named {
            #[serde(default)]
            channel: String,
        }
        self.decode::<Named>().map(|named| named.channel)
    }
}

impl Validate for serde_json::Value {}

impl Channel for serde_json::Value {
    fn channel_name(&self) -> Result<String> {
        Ok(self
            .get("channel")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}

/// A channel that is either already typed or still raw
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChannelArg<T> {
    Typed(T),
    Raw(RawChannel),
}

impl<T: DeserializeOwned> ChannelArg<T> {
    /// Explicit projection of the raw variant into `T`
    pub fn into_typed(self) -> Result<T> {
        match self {
            ChannelArg::Typed(value) => Ok(value),
            ChannelArg::Raw(raw) => raw.decode(),
        }
    }
}

impl<T: Validate> Validate for ChannelArg<T> {
    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            ChannelArg::Typed(value) => value.validate(),
            ChannelArg::Raw(raw) => raw.validate(),
        }
    }
}

impl<T: Channel> Channel for ChannelArg<T> {
    fn channel_name(&self) -> Result<String> {
        match self {
            ChannelArg::Typed(value) => value.channel_name(),
            ChannelArg::Raw(raw) => raw.channel_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TickersChannel;

    #[test]
    fn test_raw_channel_name() {
        let raw = RawChannel::from_json(r#"{"channel":"tickers","instId":"BTC-USDT"}"#).unwrap();
        assert_eq!(raw.channel_name().unwrap(), "tickers");
    }

    #[test]
    fn test_raw_channel_preserves_bytes() {
        let text = r#"{"instId":"BTC-USDT",  "channel":"tickers"}"#;
        let raw = RawChannel::from_json(text).unwrap();
        assert_eq!(raw.get(), text);
        assert_eq!(serde_json::to_string(&raw).unwrap(), text);
    }

    #[test]
    fn test_empty_raw_channel() {
        let raw = RawChannel::default();
        assert!(raw.is_empty());
        assert_eq!(raw.get(), "null");
        assert!(raw.decode::<TickersChannel>().is_err());
    }

    #[test]
    fn test_channel_arg_into_typed() {
        let raw = RawChannel::from_json(r#"{"channel":"tickers","instId":"ETH-USDT"}"#).unwrap();
        let typed = ChannelArg::<TickersChannel>::Raw(raw).into_typed().unwrap();
        assert_eq!(typed, TickersChannel::new("ETH-USDT"));
    }

    #[test]
    fn test_channel_arg_validates_typed_variant() {
        let arg = ChannelArg::Typed(TickersChannel::new(""));
        assert!(arg.validate().is_err());
        let arg: ChannelArg<TickersChannel> = ChannelArg::Raw(RawChannel::default());
        assert!(arg.validate().is_ok());
    }

    #[test]
    fn test_json_value_channel() {
        let value = serde_json::json!({"channel": "account", "ccy": "BTC"});
        assert_eq!(value.channel_name().unwrap(), "account");
        assert!(value.validate().is_ok());
    }
}
