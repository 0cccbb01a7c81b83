//! Channel entities - guild channels, threads, and private channels
//!
//! The full set of channel kinds is closed. [`Channel::from_payload`] is the one
//! place a payload is turned into the right variant.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Guild, Member, Message, PermissionOverwrite};
use crate::collection::{Entity, TypedCollection};
use crate::error::{DomainError, DomainResult};
use crate::payloads::{ChannelPayload, OverwritePayload};
use crate::value_objects::{PermissionSet, Permissions, Snowflake};

/// Channel type as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelType {
    /// Guild text channel
    #[default]
    GuildText,
    /// Direct message between two users
    Dm,
    GuildVoice,
    /// Direct message between several users
    GroupDm,
    /// Guild category for organizing channels
    GuildCategory,
    GuildAnnouncement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    GuildStageVoice,
    GuildDirectory,
    GuildForum,
    GuildMedia,
    /// A type this client does not know; handled like a guild channel
    Unknown(u8),
}

impl ChannelType {
    /// Check if this is one of the thread kinds
    #[inline]
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            Self::AnnouncementThread | Self::PublicThread | Self::PrivateThread
        )
    }

    /// Check if this is a DM or group DM
    #[inline]
    pub fn is_private(self) -> bool {
        matches!(self, Self::Dm | Self::GroupDm)
    }

    /// Check if this kind lives in a guild's channel list
    #[inline]
    pub fn is_guild_channel(self) -> bool {
        !self.is_thread() && !self.is_private()
    }

    /// Check if messages can be posted directly in this kind
    #[inline]
    pub fn is_text_based(self) -> bool {
        !matches!(
            self,
            Self::GuildCategory
                | Self::GuildDirectory
                | Self::GuildForum
                | Self::GuildMedia
                | Self::Unknown(_)
        )
    }
}

impl From<u8> for ChannelType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::GuildText,
            1 => Self::Dm,
            2 => Self::GuildVoice,
            3 => Self::GroupDm,
            4 => Self::GuildCategory,
            5 => Self::GuildAnnouncement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::GuildStageVoice,
            14 => Self::GuildDirectory,
            15 => Self::GuildForum,
            16 => Self::GuildMedia,
            other => Self::Unknown(other),
        }
    }
}

impl From<ChannelType> for u8 {
    fn from(ct: ChannelType) -> Self {
        match ct {
            ChannelType::GuildText => 0,
            ChannelType::Dm => 1,
            ChannelType::GuildVoice => 2,
            ChannelType::GroupDm => 3,
            ChannelType::GuildCategory => 4,
            ChannelType::GuildAnnouncement => 5,
            ChannelType::AnnouncementThread => 10,
            ChannelType::PublicThread => 11,
            ChannelType::PrivateThread => 12,
            ChannelType::GuildStageVoice => 13,
            ChannelType::GuildDirectory => 14,
            ChannelType::GuildForum => 15,
            ChannelType::GuildMedia => 16,
            ChannelType::Unknown(other) => other,
        }
    }
}

/// Extra construction arguments for every channel kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelContext {
    /// Owning guild when the payload itself does not carry `guild_id`
    pub guild_id: Option<Snowflake>,
    /// Limit for the channel's message collection
    pub message_limit: Option<usize>,
}

impl ChannelContext {
    pub fn new(guild_id: Option<Snowflake>, message_limit: Option<usize>) -> Self {
        Self {
            guild_id,
            message_limit,
        }
    }
}

fn channel_kind(payload: &ChannelPayload) -> DomainResult<ChannelType> {
    payload
        .kind
        .ok_or(DomainError::missing("Channel", "type"))
}

/// Message limit for a channel of `kind`; kinds without messages store none
fn message_limit(kind: ChannelType, configured: Option<usize>) -> Option<usize> {
    if kind.is_text_based() {
        configured
    } else {
        Some(0)
    }
}

fn message_store(kind: ChannelType, context: &ChannelContext) -> TypedCollection<Message> {
    TypedCollection::new(message_limit(kind, context.message_limit))
}

/// Any cached channel
#[derive(Debug, Clone)]
pub enum Channel {
    Guild(GuildChannel),
    Thread(ThreadChannel),
    Private(PrivateChannel),
}

impl Channel {
    /// Build the right channel variant for the payload's type
    pub fn from_payload(payload: ChannelPayload, context: &ChannelContext) -> DomainResult<Self> {
        let kind = channel_kind(&payload)?;
        if kind.is_thread() {
            ThreadChannel::from_payload(payload, context).map(Self::Thread)
        } else if kind.is_private() {
            PrivateChannel::from_payload(payload, context).map(Self::Private)
        } else {
            GuildChannel::from_payload(payload, context).map(Self::Guild)
        }
    }

    pub fn id(&self) -> Snowflake {
        match self {
            Self::Guild(c) => c.id,
            Self::Thread(c) => c.id,
            Self::Private(c) => c.id,
        }
    }

    pub fn kind(&self) -> ChannelType {
        match self {
            Self::Guild(c) => c.kind,
            Self::Thread(c) => c.kind,
            Self::Private(c) => c.kind,
        }
    }

    /// Owning guild, `None` for private channels
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::Guild(c) => Some(c.guild_id),
            Self::Thread(c) => Some(c.guild_id),
            Self::Private(_) => None,
        }
    }
}

// =============================================================================
// Guild channels
// =============================================================================

/// Text, voice, category, announcement, stage, forum, or media channel
#[derive(Debug, Clone)]
pub struct GuildChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub kind: ChannelType,
    pub name: String,
    pub position: i32,
    /// Category this channel sits in
    pub parent_id: Option<Snowflake>,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub permission_overwrites: TypedCollection<PermissionOverwrite>,
    pub messages: TypedCollection<Message>,
    /// Message limit for text-based kinds, reapplied when the kind changes
    configured_message_limit: Option<usize>,
}

impl GuildChannel {
    /// Check if this is a category
    #[inline]
    pub fn is_category(&self) -> bool {
        self.kind == ChannelType::GuildCategory
    }

    /// Resynchronise the overwrite store with a full overwrite list
    ///
    /// IDs missing from `overwrites` are deleted first, then every entry is
    /// upserted.
    pub fn sync_overwrites(&mut self, overwrites: Vec<OverwritePayload>) -> DomainResult<()> {
        let stale: Vec<Snowflake> = self
            .permission_overwrites
            .keys()
            .filter(|id| !overwrites.iter().any(|o| o.id == *id))
            .collect();
        for id in &stale {
            self.permission_overwrites.delete(id);
        }
        for overwrite in overwrites {
            self.permission_overwrites.update(overwrite)?;
        }
        trace!(
            channel_id = %self.id,
            removed = stale.len(),
            count = self.permission_overwrites.len(),
            "Synced permission overwrites"
        );
        Ok(())
    }

    /// Effective permissions of `member` in this channel
    ///
    /// `guild` must be the guild owning this channel. Guild-level permissions
    /// come first; an administrator skips all overwrites. Then the `@everyone`
    /// overwrite, the combined role overwrites, and the member overwrite are
    /// applied in that order, each able to undo the previous step.
    pub fn permissions_of(&self, guild: &Guild, member: &Member) -> DomainResult<PermissionSet> {
        let mut base = guild.permissions_of(member)?.allow();
        if base.contains(Permissions::ADMINISTRATOR) {
            return Ok(PermissionSet::all());
        }

        if let Some(everyone) = self.permission_overwrites.get(&guild.id) {
            base = everyone.apply(base);
        }

        let mut role_allow = Permissions::empty();
        let mut role_deny = Permissions::empty();
        for role_id in &member.roles {
            if let Some(overwrite) = self.permission_overwrites.get(role_id) {
                role_allow |= overwrite.allow();
                role_deny |= overwrite.deny();
            }
        }
        base = base.overwrite(role_allow, role_deny);

        if let Some(own) = self.permission_overwrites.get(&member.id) {
            base = own.apply(base);
        }

        Ok(PermissionSet::from_allow(base))
    }
}

impl Entity for GuildChannel {
    type Id = Snowflake;
    type Payload = ChannelPayload;
    type Context = ChannelContext;

    const KIND: &'static str = "GuildChannel";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &ChannelPayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: ChannelPayload, context: &ChannelContext) -> DomainResult<Self> {
        let kind = channel_kind(&payload)?;
        if !kind.is_guild_channel() {
            return Err(DomainError::UnexpectedChannelType {
                id: payload.id,
                channel_type: kind,
                expected: "a guild channel",
            });
        }
        let guild_id = payload
            .guild_id
            .or(context.guild_id)
            .ok_or(DomainError::missing(Self::KIND, "guild_id"))?;

        let mut channel = Self {
            id: payload.id,
            guild_id,
            kind,
            name: payload.name.flatten().unwrap_or_default(),
            position: payload.position.unwrap_or_default(),
            parent_id: payload.parent_id.flatten(),
            topic: payload.topic.flatten(),
            nsfw: payload.nsfw.unwrap_or_default(),
            permission_overwrites: TypedCollection::new(None),
            messages: message_store(kind, context),
            configured_message_limit: context.message_limit,
        };
        if let Some(overwrites) = payload.permission_overwrites {
            channel.sync_overwrites(overwrites)?;
        }
        Ok(channel)
    }

    fn merge(&mut self, payload: ChannelPayload) -> DomainResult<()> {
        if let Some(kind) = payload.kind {
            if !kind.is_guild_channel() {
                return Err(DomainError::UnexpectedChannelType {
                    id: self.id,
                    channel_type: kind,
                    expected: "a guild channel",
                });
            }
            if kind != self.kind {
                self.kind = kind;
                self.messages
                    .set_limit(message_limit(kind, self.configured_message_limit));
            }
        }
        if let Some(name) = payload.name {
            self.name = name.unwrap_or_default();
        }
        if let Some(position) = payload.position {
            self.position = position;
        }
        if let Some(parent_id) = payload.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(topic) = payload.topic {
            self.topic = topic;
        }
        if let Some(nsfw) = payload.nsfw {
            self.nsfw = nsfw;
        }
        if let Some(overwrites) = payload.permission_overwrites {
            self.sync_overwrites(overwrites)?;
        }
        Ok(())
    }
}

// =============================================================================
// Threads
// =============================================================================

/// Thread inside a guild text, announcement, or forum channel
///
/// Threads carry no overwrites; their permissions are the parent channel's.
#[derive(Debug, Clone)]
pub struct ThreadChannel {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub parent_id: Snowflake,
    pub kind: ChannelType,
    pub name: String,
    pub owner_id: Option<Snowflake>,
    pub archived: bool,
    pub locked: bool,
    pub message_count: u32,
    pub member_count: u32,
    pub messages: TypedCollection<Message>,
}

impl Entity for ThreadChannel {
    type Id = Snowflake;
    type Payload = ChannelPayload;
    type Context = ChannelContext;

    const KIND: &'static str = "ThreadChannel";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &ChannelPayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: ChannelPayload, context: &ChannelContext) -> DomainResult<Self> {
        let kind = channel_kind(&payload)?;
        if !kind.is_thread() {
            return Err(DomainError::UnexpectedChannelType {
                id: payload.id,
                channel_type: kind,
                expected: "a thread",
            });
        }
        let guild_id = payload
            .guild_id
            .or(context.guild_id)
            .ok_or(DomainError::missing(Self::KIND, "guild_id"))?;
        let parent_id = payload
            .parent_id
            .flatten()
            .ok_or(DomainError::missing(Self::KIND, "parent_id"))?;
        let metadata = payload.thread_metadata.unwrap_or_default();

        Ok(Self {
            id: payload.id,
            guild_id,
            parent_id,
            kind,
            name: payload.name.flatten().unwrap_or_default(),
            owner_id: payload.owner_id,
            archived: metadata.archived.unwrap_or_default(),
            locked: metadata.locked.unwrap_or_default(),
            message_count: payload.message_count.unwrap_or_default(),
            member_count: payload.member_count.unwrap_or_default(),
            messages: message_store(kind, context),
        })
    }

    fn merge(&mut self, payload: ChannelPayload) -> DomainResult<()> {
        if let Some(kind) = payload.kind {
            if !kind.is_thread() {
                return Err(DomainError::UnexpectedChannelType {
                    id: self.id,
                    channel_type: kind,
                    expected: "a thread",
                });
            }
            self.kind = kind;
        }
        if let Some(name) = payload.name {
            self.name = name.unwrap_or_default();
        }
        if let Some(Some(parent_id)) = payload.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(metadata) = payload.thread_metadata {
            if let Some(archived) = metadata.archived {
                self.archived = archived;
            }
            if let Some(locked) = metadata.locked {
                self.locked = locked;
            }
        }
        if let Some(count) = payload.message_count {
            self.message_count = count;
        }
        if let Some(count) = payload.member_count {
            self.member_count = count;
        }
        Ok(())
    }
}

// =============================================================================
// Private channels
// =============================================================================

/// DM or group DM
#[derive(Debug, Clone)]
pub struct PrivateChannel {
    pub id: Snowflake,
    pub kind: ChannelType,
    pub name: Option<String>,
    pub owner_id: Option<Snowflake>,
    pub recipients: Vec<Snowflake>,
    pub messages: TypedCollection<Message>,
}

impl PrivateChannel {
    /// Check if this is a group DM
    #[inline]
    pub fn is_group(&self) -> bool {
        self.kind == ChannelType::GroupDm
    }

    /// Get display name (channel name or fallback for DMs)
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Direct Message")
    }
}

impl Entity for PrivateChannel {
    type Id = Snowflake;
    type Payload = ChannelPayload;
    type Context = ChannelContext;

    const KIND: &'static str = "PrivateChannel";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &ChannelPayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: ChannelPayload, context: &ChannelContext) -> DomainResult<Self> {
        let kind = channel_kind(&payload)?;
        if !kind.is_private() {
            return Err(DomainError::UnexpectedChannelType {
                id: payload.id,
                channel_type: kind,
                expected: "a private channel",
            });
        }
        Ok(Self {
            id: payload.id,
            kind,
            name: payload.name.flatten(),
            owner_id: payload.owner_id,
            recipients: payload
                .recipients
                .unwrap_or_default()
                .iter()
                .map(|user| user.id)
                .collect(),
            messages: message_store(kind, context),
        })
    }

    fn merge(&mut self, payload: ChannelPayload) -> DomainResult<()> {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(owner_id) = payload.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(recipients) = payload.recipients {
            self.recipients = recipients.iter().map(|user| user.id).collect();
        }
        Ok(())
    }
}
