pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

#[cfg(test)]
mod cache_tests;

pub use error::{ConfigError, NormalizeError};
pub use types::{ChannelDescriptor, FetchKey, Programme};
