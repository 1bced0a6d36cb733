/*
[INPUT]:  Decoded envelopes and the frame text they came from
[OUTPUT]: Exactly one handler callback per envelope
[POS]:    WebSocket layer - envelope classification and routing
[UPDATE]: When the server adds events that need their own route
*/

use std::sync::Arc;

use super::codec::Envelope;
use super::handler::MessageHandler;
use crate::types::{ChannelType, PushData, RawChannel, RawPushData, Response};

/// Route chosen for an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    PushData,
    Response,
    Unknown,
}

/// Classify by `event` alone
pub fn classify(event: &str) -> MessageKind {
    match event {
        "" => MessageKind::PushData,
        "subscribe" | "unsubscribe" | "error" | "login" => MessageKind::Response,
        _ => MessageKind::Unknown,
    }
}

/// Hand one envelope to the matching callback
pub(crate) async fn dispatch(
    handler: &dyn MessageHandler,
    channel_type: ChannelType,
    envelope: Envelope,
    raw: &str,
) -> MessageKind {
    let kind = classify(&envelope.event);
    match kind {
        MessageKind::PushData => {
            handler
                .handle_push_data(channel_type, into_push_data(envelope, raw))
                .await
        }
        MessageKind::Response => {
            handler
                .handle_response(channel_type, into_response(envelope, raw))
                .await
        }
        MessageKind::Unknown => handler.handle_unknown_message(channel_type, raw).await,
    }
    kind
}

fn into_push_data(envelope: Envelope, raw: &str) -> RawPushData {
    PushData {
        arg: envelope.arg,
        data: envelope.data,
        raw: Arc::from(raw),
    }
}

fn into_response(envelope: Envelope, raw: &str) -> Response<RawChannel> {
    let arg = (!envelope.arg.is_empty()).then_some(envelope.arg);
    Response {
        id: envelope.id,
        event: envelope.event,
        arg,
        code: envelope.code,
        msg: envelope.msg,
        conn_id: envelope.conn_id,
        raw: Arc::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TickersChannel, TickersData};
    use crate::ws::codec::{Inbound, decode};
    use crate::ws::handler::{ChannelMessageHandler, WebSocketMessage};
    use rstest::rstest;

    fn envelope(text: &str) -> Envelope {
        match decode(text).unwrap() {
            Inbound::Envelope(envelope) => envelope,
            Inbound::Pong => panic!("Expected envelope"),
        }
    }

    #[rstest]
    #[case("", MessageKind::PushData)]
    #[case("subscribe", MessageKind::Response)]
    #[case("unsubscribe", MessageKind::Response)]
    #[case("error", MessageKind::Response)]
    #[case("login", MessageKind::Response)]
    #[case("notice", MessageKind::Unknown)]
    #[case("channel-conn-count", MessageKind::Unknown)]
    #[case("Subscribe", MessageKind::Unknown)]
    fn test_classify(#[case] event: &str, #[case] expected: MessageKind) {
        assert_eq!(classify(event), expected);
    }

    #[tokio::test]
    async fn test_dispatch_push_data() {
        let text = r#"{"arg":{"channel":"tickers","instId":"BTC-USDT"},"data":[{"instId":"BTC-USDT","last":"42"}]}"#;
        let (handler, mut receiver) = ChannelMessageHandler::new(1);

        let kind = dispatch(&handler, ChannelType::Public, envelope(text), text).await;
        assert_eq!(kind, MessageKind::PushData);

        let Some(WebSocketMessage::PushData { channel_type, data }) = receiver.recv().await else {
            panic!("Expected push data");
        };
        assert_eq!(channel_type, ChannelType::Public);
        assert_eq!(data.raw_message(), text);
        assert_eq!(data.channel_name().unwrap(), "tickers");

        let typed = data.project::<TickersChannel, TickersData>().unwrap();
        assert_eq!(typed.data[0].last, "42");
    }

    #[tokio::test]
    async fn test_dispatch_error_response() {
        let text = r#"{"event":"error","code":"60012","msg":"bad"}"#;
        let (handler, mut receiver) = ChannelMessageHandler::new(1);

        let kind = dispatch(&handler, ChannelType::Private, envelope(text), text).await;
        assert_eq!(kind, MessageKind::Response);

        let Some(WebSocketMessage::Response { response, .. }) = receiver.recv().await else {
            panic!("Expected response");
        };
        assert!(response.arg.is_none());
        let err = response.error().unwrap();
        assert!(err.to_string().contains("60012"));
    }

    #[tokio::test]
    async fn test_dispatch_login_response() {
        let text = r#"{"event":"login","code":"0","msg":"","connId":"a4d3ae55"}"#;
        let (handler, mut receiver) = ChannelMessageHandler::new(1);

        dispatch(&handler, ChannelType::Private, envelope(text), text).await;
        let Some(WebSocketMessage::Response { response, .. }) = receiver.recv().await else {
            panic!("Expected response");
        };
        assert_eq!(response.event, "login");
        assert!(response.error().is_none());
        assert_eq!(response.conn_id, "a4d3ae55");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_keeps_raw_text() {
        let text = r#"{"event":"notice","code":"64008","msg":"service upgrade"}"#;
        let (handler, mut receiver) = ChannelMessageHandler::new(1);

        let kind = dispatch(&handler, ChannelType::Business, envelope(text), text).await;
        assert_eq!(kind, MessageKind::Unknown);

        let Some(WebSocketMessage::Unknown { message, .. }) = receiver.recv().await else {
            panic!("Expected unknown message");
        };
        assert_eq!(message, text);
    }
}
