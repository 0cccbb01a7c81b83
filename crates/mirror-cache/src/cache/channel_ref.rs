//! Borrowed view of any cached channel

use mirror_core::{ChannelType, GuildChannel, Message, PrivateChannel, Snowflake, ThreadChannel, TypedCollection};

/// A cached channel of any kind, borrowed from its owning collection
#[derive(Debug, Clone, Copy)]
pub enum ChannelRef<'a> {
    Guild(&'a GuildChannel),
    Thread(&'a ThreadChannel),
    Private(&'a PrivateChannel),
}

impl<'a> ChannelRef<'a> {
    pub fn id(self) -> Snowflake {
        match self {
            Self::Guild(c) => c.id,
            Self::Thread(c) => c.id,
            Self::Private(c) => c.id,
        }
    }

    pub fn kind(self) -> ChannelType {
        match self {
            Self::Guild(c) => c.kind,
            Self::Thread(c) => c.kind,
            Self::Private(c) => c.kind,
        }
    }

    /// Owning guild, `None` for private channels
    pub fn guild_id(self) -> Option<Snowflake> {
        match self {
            Self::Guild(c) => Some(c.guild_id),
            Self::Thread(c) => Some(c.guild_id),
            Self::Private(_) => None,
        }
    }

    pub fn messages(self) -> &'a TypedCollection<Message> {
        match self {
            Self::Guild(c) => &c.messages,
            Self::Thread(c) => &c.messages,
            Self::Private(c) => &c.messages,
        }
    }
}
