/*
[INPUT]:  OKX WebSocket schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

pub mod channel;
pub mod enums;
pub mod projection;
pub mod push_data;
pub mod request;
pub mod response;
pub mod tickers;

pub use channel::{Channel, ChannelArg, RawChannel, Validate};
pub use enums::{ChannelType, Operation};
pub use projection::ProjectionError;
pub use push_data::{PushData, RawPayload, RawPushData};
pub use request::{LoginArg, Request, new_request_id, validate_args};
pub use response::Response;
pub use tickers::{TICKERS_CHANNEL, TickersChannel, TickersData};
