//! Transport seam between handlers and the TikTok API.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::item::BinaryData;
use crate::types::request::RequestDescriptor;
use crate::Error;

/// Issues authenticated TikTok API calls.
///
/// Implementations sign every request, surface non-2xx responses and TikTok error
/// envelopes as errors, and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one API call and return the parsed response body.
    async fn send(&self, request: RequestDescriptor) -> Result<Value, Error>;

    /// Upload `binary` as a single chunk to a pre-signed upload URL.
    async fn upload(&self, upload_url: &str, binary: &BinaryData) -> Result<(), Error>;
}
