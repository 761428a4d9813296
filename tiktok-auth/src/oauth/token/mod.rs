//! OAuth token data, storage and encryption at rest.

pub mod encryption;
mod data;
mod storage;

pub use data::{TokenData, TokenResponse, UserInfo};
pub use storage::{MemoryStorage, Storage};
