/*
[INPUT]:  Tickers channel subscription and push payloads
[OUTPUT]: Typed tickers channel argument and ticker data
[POS]:    Data layer - market data channel schema
[UPDATE]: When the tickers channel schema changes
*/

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::channel::{Channel, Validate};
use crate::error::Result;

pub const TICKERS_CHANNEL: &str = "tickers";

/// Tickers channel
///
/// https://www.okx.com/docs-v5/en/#order-book-trading-market-data-ws-tickers-channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickersChannel {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,
    /// Instrument ID, e.g. BTC-USDT
    pub inst_id: String,
}

impl TickersChannel {
    pub fn new(inst_id: impl Into<String>) -> Self {
        Self {
            channel: TICKERS_CHANNEL.to_string(),
            inst_id: inst_id.into(),
        }
    }
}

impl Validate for TickersChannel {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.channel.is_empty() {
            return Err("channel can't be empty".to_string());
        }
        if self.inst_id.is_empty() {
            return Err("instId can't be empty".to_string());
        }
        Ok(())
    }
}

impl Channel for TickersChannel {
    fn channel_name(&self) -> Result<String> {
        Ok(self.channel.clone())
    }
}

/// Ticker snapshot
///
/// Numeric fields arrive as strings and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TickersData {
    pub inst_type: String,
    pub inst_id: String,
    /// Last traded price
    pub last: String,
    pub last_sz: String,
    pub ask_px: String,
    pub ask_sz: String,
    pub bid_px: String,
    pub bid_sz: String,
    pub open24h: String,
    pub high24h: String,
    pub low24h: String,
    pub sod_utc0: String,
    pub sod_utc8: String,
    /// 24h volume in currency units
    pub vol_ccy24h: String,
    /// 24h volume in contracts (derivatives) or base currency (spot)
    pub vol24h: String,
    /// Unix timestamp in milliseconds
    pub ts: String,
}

impl TickersData {
    pub fn last_price(&self) -> Option<Decimal> {
        parse_decimal(&self.last)
    }

    pub fn best_bid(&self) -> Option<Decimal> {
        parse_decimal(&self.bid_px)
    }

    pub fn best_ask(&self) -> Option<Decimal> {
        parse_decimal(&self.ask_px)
    }

    /// Ask minus bid, when both sides are quoted
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()? - self.best_bid()?)
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.ts.parse().ok()
    }
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    if value.is_empty() {
        return None;
    }
    Decimal::from_str(value).ok()
}
