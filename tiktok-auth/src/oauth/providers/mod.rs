//! OAuth provider implementations.

pub mod tiktok;
