//! Bounded, insertion-ordered entity collections
//!
//! Every cached entity kind (guilds, channels, roles, members, messages,
//! overwrites, users) lives in a [`TypedCollection`]. The collection owns its
//! entities, builds new ones from payloads, and evicts the oldest insertions
//! once its limit is exceeded.

mod entity;
mod typed_collection;

pub use entity::Entity;
pub use typed_collection::{TypedCollection, Upserted};
