//! # mirror-cache
//!
//! The client-side cache: a [`Cache`] holding every guild, user, and private
//! channel the client knows about, and a [`PermissionResolver`] that computes
//! effective permissions from it.
//!
//! ## Example
//!
//! ```ignore
//! use mirror_cache::{Cache, Target};
//! use mirror_common::CacheConfig;
//!
//! let mut cache = Cache::new(CacheConfig::from_env()?);
//! cache.upsert_guild(guild_payload)?;
//!
//! let permissions = cache
//!     .resolver()
//!     .permissions_of(Target::Channel(channel_id), user_id.into())?;
//! if permissions.has(Permissions::SEND_MESSAGES) {
//!     // ...
//! }
//! ```

pub mod cache;
pub mod limits;
pub mod resolver;

// Re-export cache types
pub use cache::{Cache, ChannelRef};

// Re-export limit policies
pub use limits::MemberLimitPolicy;

// Re-export resolver types
pub use resolver::{PermissionResolver, Subject, Target};
