//! Tracing subscriber setup
//!
//! Output format and verbosity come from [`TracingConfig`], which can be
//! derived from a [`crate::CacheConfig`].

mod tracing_setup;

pub use tracing_setup::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
