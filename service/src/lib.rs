pub mod config;
pub mod connector;
pub mod error;
pub mod items;
pub mod logging;
pub mod token_store;

pub use connector::Connector;
pub use error::Error;
