//! LINE webhook payload types.
//!
//! The wire format is parsed into [`WebhookBody`] and then narrowed into
//! [`InboundEvent`], the only shape the dispatcher deals with. Events are
//! decoded one by one so a single odd event never costs the rest of the batch.
//! Reference: https://developers.line.biz/en/reference/messaging-api/#webhook-event-objects

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

// =============================================================================
// Wire Types
// =============================================================================

/// Top-level webhook request body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Bot user ID that should receive the events
    #[serde(default)]
    pub destination: Option<String>,
    /// May be empty (console verification request)
    #[serde(default)]
    pub events: Vec<Value>,
}

impl WebhookBody {
    /// Decode and narrow every event, skipping those that fail to decode or
    /// that the relay cannot act on.
    pub fn into_inbound_events(self) -> Vec<InboundEvent> {
        self.events
            .into_iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let event = match serde_json::from_value::<WebhookEvent>(raw) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(index = index, error = %e, "webhook_event_parse_failed");
                        return None;
                    }
                };

                let inbound = event.into_inbound();
                if inbound.is_none() {
                    debug!(index = index, "webhook_event_skipped");
                }
                inbound
            })
            .collect()
    }
}

/// A single webhook event, tagged by its `type` field.
///
/// `replyToken` is absent in standby mode and on events that cannot be replied to.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message {
        #[serde(default, rename = "replyToken")]
        reply_token: Option<String>,
        source: EventSource,
        message: MessageContent,
    },
    Postback {
        #[serde(default, rename = "replyToken")]
        reply_token: Option<String>,
        source: EventSource,
        postback: PostbackContent,
    },
    MemberJoined {
        #[serde(default, rename = "replyToken")]
        reply_token: Option<String>,
        source: EventSource,
        joined: JoinedMembers,
    },
    /// follow, unfollow, join, leave, beacon, ...
    #[serde(other)]
    Unsupported,
}

/// Where an event originated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventSource {
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
}

/// Message payload of a `message` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        id: String,
        text: String,
    },
    /// image, video, audio, file, location, sticker
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostbackContent {
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinedMembers {
    #[serde(default)]
    pub members: Vec<EventSource>,
}

// =============================================================================
// Domain Events
// =============================================================================

/// An inbound event the relay knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    TextMessage {
        reply_token: String,
        text: String,
        source: EventSource,
    },
    Postback {
        reply_token: String,
        data: String,
        source: EventSource,
    },
    MemberJoined {
        reply_token: String,
        source: EventSource,
        member_ids: Vec<String>,
    },
}

impl InboundEvent {
    pub fn reply_token(&self) -> &str {
        match self {
            InboundEvent::TextMessage { reply_token, .. }
            | InboundEvent::Postback { reply_token, .. }
            | InboundEvent::MemberJoined { reply_token, .. } => reply_token,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::TextMessage { .. } => "text_message",
            InboundEvent::Postback { .. } => "postback",
            InboundEvent::MemberJoined { .. } => "member_joined",
        }
    }
}

impl EventSource {
    /// The user behind the source, when LINE includes one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            EventSource::User { user_id } => Some(user_id),
            EventSource::Group { user_id, .. } | EventSource::Room { user_id, .. } => {
                user_id.as_deref()
            }
        }
    }
}

impl WebhookEvent {
    /// Narrow a wire event into an [`InboundEvent`].
    ///
    /// Returns `None` for events the relay ignores, including any without a reply token.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        match self {
            WebhookEvent::Message {
                reply_token: Some(reply_token),
                source,
                message: MessageContent::Text { text, .. },
            } => Some(InboundEvent::TextMessage {
                reply_token,
                text,
                source,
            }),
            WebhookEvent::Postback {
                reply_token: Some(reply_token),
                source,
                postback,
            } => Some(InboundEvent::Postback {
                reply_token,
                data: postback.data,
                source,
            }),
            WebhookEvent::MemberJoined {
                reply_token: Some(reply_token),
                source,
                joined,
            } => Some(InboundEvent::MemberJoined {
                reply_token,
                source,
                member_ids: joined
                    .members
                    .iter()
                    .filter_map(|m| m.user_id().map(str::to_string))
                    .collect(),
            }),
            WebhookEvent::Message { .. }
            | WebhookEvent::Postback { .. }
            | WebhookEvent::MemberJoined { .. }
            | WebhookEvent::Unsupported => None,
        }
    }
}

// =============================================================================
// Messaging API Types
// =============================================================================

/// Body of `POST /v2/bot/message/reply`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<OutboundMessage<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage<'a> {
    Text { text: &'a str },
}

/// Group or room member profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub picture_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<InboundEvent> {
        let body: WebhookBody = serde_json::from_str(json).unwrap();
        body.into_inbound_events()
    }

    #[test]
    fn test_text_message_event() {
        let events = parse(
            r#"{
                "destination": "Uxxxxxxxx",
                "events": [{
                    "type": "message",
                    "mode": "active",
                    "timestamp": 1462629479859,
                    "webhookEventId": "01FZ74A0TDDPYRVKNK77XKC3ZR",
                    "deliveryContext": {"isRedelivery": false},
                    "replyToken": "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA",
                    "source": {"type": "user", "userId": "U4af4980629"},
                    "message": {"id": "444573844083572737", "type": "text", "text": "Hello"}
                }]
            }"#,
        );

        assert_eq!(
            events,
            vec![InboundEvent::TextMessage {
                reply_token: "nHuyWiB7yP5Zw52FIkcQobQuGDXCTA".to_string(),
                text: "Hello".to_string(),
                source: EventSource::User {
                    user_id: "U4af4980629".to_string()
                },
            }]
        );
    }

    #[test]
    fn test_sticker_message_is_skipped() {
        let events = parse(
            r#"{"events": [{
                "type": "message",
                "replyToken": "r",
                "source": {"type": "user", "userId": "U1"},
                "message": {"id": "1", "type": "sticker", "packageId": "1", "stickerId": "1"}
            }]}"#,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn test_postback_event() {
        let events = parse(
            r#"{"events": [{
                "type": "postback",
                "replyToken": "r",
                "source": {"type": "group", "groupId": "C1", "userId": "U1"},
                "postback": {"data": "action=buy&itemid=111"}
            }]}"#,
        );

        match &events[0] {
            InboundEvent::Postback { data, .. } => assert_eq!(data, "action=buy&itemid=111"),
            other => panic!("Expected Postback, got {:?}", other),
        }
    }

    #[test]
    fn test_member_joined_event() {
        let events = parse(
            r#"{"events": [{
                "type": "memberJoined",
                "replyToken": "r",
                "source": {"type": "group", "groupId": "C4af4980629"},
                "joined": {"members": [
                    {"type": "user", "userId": "U4af4980629"},
                    {"type": "user", "userId": "U91eeaf62d9"}
                ]}
            }]}"#,
        );

        assert_eq!(
            events,
            vec![InboundEvent::MemberJoined {
                reply_token: "r".to_string(),
                source: EventSource::Group {
                    group_id: "C4af4980629".to_string(),
                    user_id: None
                },
                member_ids: vec!["U4af4980629".to_string(), "U91eeaf62d9".to_string()],
            }]
        );
    }

    #[test]
    fn test_unsupported_event_type() {
        let events = parse(
            r#"{"events": [{
                "type": "follow",
                "replyToken": "r",
                "source": {"type": "user", "userId": "U1"}
            }]}"#,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn test_standby_event_without_reply_token_is_skipped() {
        let events = parse(
            r#"{"events": [
                {
                    "type": "message",
                    "mode": "standby",
                    "source": {"type": "user", "userId": "U1"},
                    "message": {"id": "1", "type": "text", "text": "ignored"}
                },
                {
                    "type": "message",
                    "mode": "active",
                    "replyToken": "r",
                    "source": {"type": "user", "userId": "U1"},
                    "message": {"id": "2", "type": "text", "text": "hello"}
                }
            ]}"#,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reply_token(), "r");
    }

    #[test]
    fn test_undecodable_event_does_not_drop_batch() {
        let events = parse(
            r#"{"events": [
                {"type": "postback", "replyToken": "r1", "source": {"type": "user", "userId": "U1"}},
                "not an event",
                {
                    "type": "postback",
                    "replyToken": "r2",
                    "source": {"type": "user", "userId": "U1"},
                    "postback": {"data": "ok"}
                }
            ]}"#,
        );

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reply_token(), "r2");
    }

    #[test]
    fn test_empty_events() {
        assert!(parse(r#"{"destination": "U1", "events": []}"#).is_empty());
    }

    #[test]
    fn test_reply_request_serialization() {
        let request = ReplyRequest {
            reply_token: "token",
            messages: vec![OutboundMessage::Text { text: "hi" }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "replyToken": "token",
                "messages": [{"type": "text", "text": "hi"}]
            })
        );
    }
}
