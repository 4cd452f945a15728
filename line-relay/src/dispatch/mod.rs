//! Event dispatch module.
//!
//! Routes each verified [`InboundEvent`] to its handler, one at a time and in
//! the order LINE delivered them.
//!
//! ## Dispatch Flow
//!
//! ```text
//! TextMessage  → completion → shape → reply (guarded fallback reply)
//! MemberJoined → profile lookup → greeting reply
//! Postback     → log
//! ```

pub mod member;
pub mod message;

use tracing::info;

use crate::line::InboundEvent;
use crate::web::AppState;

pub use member::{greeting_for, welcome_member};
pub use message::{generate_reply, handle_text_message, reply_with_fallback};

/// Sent instead of generated text whenever the completion call fails.
pub const COMPLETION_FALLBACK_TEXT: &str = "Error in processing your request.";

/// Sent when the first reply attempt fails.
pub const REPLY_ERROR_TEXT: &str = "系統錯誤，請稍後再試";

/// Appended to the new member's display name.
pub const GREETING_SUFFIX: &str = "歡迎加入";

/// Dispatch every event sequentially.
pub async fn dispatch_events(state: &AppState, events: Vec<InboundEvent>) {
    for event in events {
        dispatch_event(state, event).await;
    }
}

/// Dispatch a single event to its handler.
pub async fn dispatch_event(state: &AppState, event: InboundEvent) {
    info!(event_kind = event.kind(), "event_dispatch_start");

    match event {
        InboundEvent::TextMessage {
            reply_token, text, ..
        } => handle_text_message(state, &reply_token, &text).await,
        InboundEvent::MemberJoined {
            reply_token,
            source,
            member_ids,
        } => welcome_member(state, &reply_token, &source, &member_ids).await,
        InboundEvent::Postback { data, source, .. } => {
            info!(
                data = %data,
                user_id = ?source.user_id(),
                "postback_received"
            );
        }
    }
}
