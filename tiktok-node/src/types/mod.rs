pub mod item;
pub mod output;
pub mod request;
pub mod selector;
