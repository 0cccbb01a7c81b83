//! Client-wide cache container

mod channel_ref;
mod client_cache;

pub use channel_ref::ChannelRef;
pub use client_cache::Cache;
