//! TikTok resource/operation dispatcher.
//!
//! Turns per-item field values into TikTok API calls and normalized output records:
//! - A handler per `(resource, operation)` pair builds the request and shapes the response
//! - The dispatcher runs a batch in order, with optional continue-on-failure
//! - The client signs calls with the bearer token from `tiktok-auth` token data
//!
//! The `Transport` trait is the seam between handlers and HTTP, so handlers can be
//! exercised without a server.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use client::TikTokClient;
pub use dispatcher::Dispatcher;
pub use error::Error;
pub use types::item::{BinaryData, Item};
pub use types::output::{ExecutionMode, Outcome, OutputRecord};
pub use types::selector::{Operation, Resource};
