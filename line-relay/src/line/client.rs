//! Messaging API client for replies and member profile lookups.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::info;
use url::Url;

use super::types::{OutboundMessage, Profile, ReplyRequest};
use crate::Config;

/// Errors from a Messaging API call.
#[derive(Debug, Error)]
pub enum LineApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("LINE API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("base URL cannot take a path: {0}")]
    Endpoint(String),
}

impl LineApiError {
    /// Whether the reply token may still be unused after this failure.
    ///
    /// A 4xx means LINE looked at the token and refused it (expired, already
    /// used, bad credentials), so replying again with it cannot succeed.
    pub fn reply_token_may_be_unused(&self) -> bool {
        match self {
            LineApiError::Transport(_) => true,
            LineApiError::Status { status, .. } => status.is_server_error(),
            LineApiError::Endpoint(_) => false,
        }
    }
}

/// Thin client over the LINE Messaging API.
#[derive(Clone)]
pub struct LineClient {
    http: Client,
    base_url: Url,
    access_token: String,
    timeout: Duration,
}

impl LineClient {
    pub fn new(http: Client, base_url: Url, access_token: String, timeout: Duration) -> Self {
        Self {
            http,
            base_url,
            access_token,
            timeout,
        }
    }

    pub fn from_config(http: Client, config: &Config) -> Self {
        Self::new(
            http,
            config.line_api_base_url.clone(),
            config.channel_access_token.clone(),
            config.line_timeout,
        )
    }

    /// Send a single text message in reply to an event.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), LineApiError> {
        let url = self.endpoint(&["v2", "bot", "message", "reply"])?;
        let body = ReplyRequest {
            reply_token,
            messages: vec![OutboundMessage::Text { text }],
        };

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LineApiError::Status { status, body });
        }

        info!(
            status = status.as_u16(),
            text_chars = text.chars().count(),
            "line_reply_sent"
        );

        Ok(())
    }

    /// Fetch the profile of a member of a group chat.
    pub async fn group_member_profile(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Profile, LineApiError> {
        let url = self.endpoint(&["v2", "bot", "group", group_id, "member", user_id])?;
        self.get_profile(url).await
    }

    /// Fetch the profile of a member of a multi-person chat.
    pub async fn room_member_profile(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Profile, LineApiError> {
        let url = self.endpoint(&["v2", "bot", "room", room_id, "member", user_id])?;
        self.get_profile(url).await
    }

    /// Append escaped path segments to the base URL, keeping any path prefix it has.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LineApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LineApiError::Endpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_profile(&self, url: Url) -> Result<Profile, LineApiError> {
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LineApiError::Status { status, body });
        }

        Ok(resp.json::<Profile>().await?)
    }
}
