//! LineRelay - LINE chat bot backed by a remote completion API.
//!
//! This library provides the modules behind the `line-relay` binary:
//! - `web`: webhook endpoint and signature verification
//! - `dispatch`: per-event handling
//! - `completion`: completion endpoint client
//! - `line`: Messaging API types and client
//!
//! ## Architecture
//!
//! ```text
//! LINE → /callback → verify → dispatch → completion API → reply API → LINE
//! ```

pub mod completion;
pub mod config;
pub mod dispatch;
pub mod line;
pub mod util;
pub mod web;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use completion::{CompletionClient, CompletionError};
pub use config::{Config, ConfigError};
pub use line::{InboundEvent, LineApiError, LineClient};
pub use web::{router, AppState};
