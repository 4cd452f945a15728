//! LINE Messaging API module.
//!
//! This module provides:
//! - Webhook event types and their narrowing into [`InboundEvent`]
//! - An async client for the reply and member profile endpoints

pub mod client;
pub mod types;

pub use client::{LineApiError, LineClient};
pub use types::{EventSource, InboundEvent, Profile, WebhookBody, WebhookEvent};
