//! Remote completion endpoint module.
//!
//! ```text
//! user text → CompletionRequest → POST COMPLETION_URL → CompletionResponse → text
//! ```

pub mod client;
pub mod types;

pub use client::{CompletionClient, CompletionError};
pub use types::{CompletionRequest, CompletionResponse};
