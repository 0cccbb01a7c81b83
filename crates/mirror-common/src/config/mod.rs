//! Configuration structs

mod cache_config;

pub use cache_config::{CacheConfig, ConfigError};
