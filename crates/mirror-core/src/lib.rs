//! # mirror-core
//!
//! Domain layer of the guild mirror: snowflake IDs, the permission bit algebra,
//! the bounded [`TypedCollection`] every cached entity kind lives in, and the
//! entity types themselves together with the payloads they are built from.
//! This crate performs no I/O.

pub mod collection;
pub mod entities;
pub mod error;
pub mod payloads;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use collection::{Entity, TypedCollection, Upserted};
pub use entities::{
    Channel, ChannelContext, ChannelType, Guild, GuildChannel, GuildContext, Member, Message,
    OverwriteKind, PermissionOverwrite, PrivateChannel, Role, ThreadChannel, User,
};
pub use error::{DomainError, DomainResult};
pub use payloads::{
    ChannelPayload, GuildPayload, MemberPayload, MessagePayload, OverwritePayload, RolePayload,
    UserPayload,
};
pub use value_objects::{
    Lookup, PermissionSet, Permissions, Snowflake, SnowflakeParseError,
};
