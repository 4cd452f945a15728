//! Greeting for members joining a group or room.

use tracing::{error, info, warn};

use super::GREETING_SUFFIX;
use crate::line::EventSource;
use crate::web::AppState;

/// Greeting text for a display name.
pub fn greeting_for(display_name: &str) -> String {
    format!("{}{}", display_name, GREETING_SUFFIX)
}

/// Greet the first joined member by display name.
pub async fn welcome_member(
    state: &AppState,
    reply_token: &str,
    source: &EventSource,
    member_ids: &[String],
) {
    let Some(user_id) = member_ids.first() else {
        warn!("member_joined_without_members");
        return;
    };

    let profile = match source {
        EventSource::Group { group_id, .. } => {
            state.line.group_member_profile(group_id, user_id).await
        }
        EventSource::Room { room_id, .. } => state.line.room_member_profile(room_id, user_id).await,
        EventSource::User { .. } => {
            warn!(user_id = %user_id, "member_joined_outside_group");
            return;
        }
    };

    let profile = match profile {
        Ok(p) => p,
        Err(e) => {
            error!(user_id = %user_id, error = %e, "member_profile_lookup_failed");
            return;
        }
    };

    info!(
        user_id = %user_id,
        display_name = %profile.display_name,
        joined_count = member_ids.len(),
        "member_greeting"
    );

    if let Err(e) = state
        .line
        .reply_text(reply_token, &greeting_for(&profile.display_name))
        .await
    {
        error!(user_id = %user_id, error = %e, "member_greeting_failed");
    }
}
