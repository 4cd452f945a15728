//! Text message handling: completion, shaping and reply.

use tracing::{error, info, warn};

use super::{COMPLETION_FALLBACK_TEXT, REPLY_ERROR_TEXT};
use crate::completion::CompletionError;
use crate::line::LineClient;
use crate::util::text::shape_reply;
use crate::web::AppState;

/// Answer a text message with generated text.
pub async fn handle_text_message(state: &AppState, reply_token: &str, text: &str) {
    info!(text_chars = text.chars().count(), "text_message_received");

    let answer = generate_reply(state, text).await;
    reply_with_fallback(&state.line, reply_token, &answer).await;
}

/// Turn user text into reply text.
///
/// Never fails: every completion error is logged and replaced by
/// [`COMPLETION_FALLBACK_TEXT`].
pub async fn generate_reply(state: &AppState, text: &str) -> String {
    let result = state
        .completion
        .complete(text)
        .await
        .map(|raw| {
            shape_reply(
                &raw,
                &state.config.reply_strip_chars,
                state.config.reply_max_chars,
            )
        })
        .and_then(|shaped| {
            // LINE rejects empty text messages
            if shaped.trim().is_empty() {
                Err(CompletionError::MissingText)
            } else {
                Ok(shaped)
            }
        });

    match result {
        Ok(answer) => answer,
        Err(e) => {
            error!(error = %e, error_kind = e.kind(), "completion_failed");
            COMPLETION_FALLBACK_TEXT.to_string()
        }
    }
}

/// Reply once, then try a single fallback reply if the first call failed.
///
/// Reply tokens are single-use, so the fallback only goes out when the first
/// failure leaves the token plausibly unconsumed.
pub async fn reply_with_fallback(line: &LineClient, reply_token: &str, text: &str) {
    let err = match line.reply_text(reply_token, text).await {
        Ok(()) => return,
        Err(e) => e,
    };

    error!(error = %err, "line_reply_failed");

    if !err.reply_token_may_be_unused() {
        warn!(reason = "reply_token_rejected", "line_fallback_reply_skipped");
        return;
    }

    match line.reply_text(reply_token, REPLY_ERROR_TEXT).await {
        Ok(()) => info!("line_fallback_reply_sent"),
        Err(e) => error!(error = %e, "line_fallback_reply_failed"),
    }
}
