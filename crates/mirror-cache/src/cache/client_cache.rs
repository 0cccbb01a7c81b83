//! Client-wide cache
//!
//! Owns every guild (and through it roles, members, channels, threads, and
//! their messages), the user collection shared by all guilds, and private
//! channels. Channel IDs are mapped to their owning guild so a channel can be
//! found without knowing its guild.
//!
//! Guilds are only handed out by shared reference. Every write goes through a
//! `Cache` method so the channel maps stay in step with the guilds.

use std::collections::{HashMap, HashSet};

use mirror_common::CacheConfig;
use mirror_core::{
    Channel, ChannelContext, ChannelPayload, ChannelType, DomainError, DomainResult, Guild,
    GuildContext, GuildPayload, Member, MemberPayload, Message, MessagePayload, PrivateChannel,
    Role, RolePayload, Snowflake, TypedCollection, Upserted, User, UserPayload,
};
use tracing::{debug, trace};

use super::ChannelRef;
use crate::limits::MemberLimitPolicy;
use crate::resolver::PermissionResolver;

/// Top-level cache container
#[derive(Debug)]
pub struct Cache {
    config: CacheConfig,
    member_policy: MemberLimitPolicy,
    guilds: TypedCollection<Guild>,
    users: TypedCollection<User>,
    private_channels: TypedCollection<PrivateChannel>,
    channel_guilds: HashMap<Snowflake, Snowflake>,
    thread_guilds: HashMap<Snowflake, Snowflake>,
}

impl Cache {
    /// Create an empty cache with the limits from `config`
    pub fn new(config: CacheConfig) -> Self {
        let guild_context = GuildContext {
            member_limit: config.member_limit,
            message_limit: config.message_limit,
        };
        Self {
            member_policy: MemberLimitPolicy::new(config.member_limit_step),
            guilds: TypedCollection::with_context(guild_context, config.guild_limit),
            users: TypedCollection::new(config.user_limit),
            private_channels: TypedCollection::with_context(
                ChannelContext::new(None, config.message_limit),
                config.private_channel_limit,
            ),
            channel_guilds: HashMap::new(),
            thread_guilds: HashMap::new(),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Permission resolver reading this cache
    pub fn resolver(&self) -> PermissionResolver<'_> {
        PermissionResolver::new(self)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn guilds(&self) -> &TypedCollection<Guild> {
        &self.guilds
    }

    pub fn guild(&self, guild_id: Snowflake) -> Option<&Guild> {
        self.guilds.get(&guild_id)
    }

    pub fn users(&self) -> &TypedCollection<User> {
        &self.users
    }

    pub fn user(&self, user_id: Snowflake) -> Option<&User> {
        self.users.get(&user_id)
    }

    pub fn private_channels(&self) -> &TypedCollection<PrivateChannel> {
        &self.private_channels
    }

    /// Guild owning a cached channel or thread
    pub fn guild_id_of(&self, channel_id: Snowflake) -> Option<Snowflake> {
        self.channel_guilds
            .get(&channel_id)
            .or_else(|| self.thread_guilds.get(&channel_id))
            .copied()
    }

    /// Any cached channel, thread, or private channel
    pub fn channel(&self, channel_id: Snowflake) -> Option<ChannelRef<'_>> {
        if let Some(channel) = self.private_channels.get(&channel_id) {
            return Some(ChannelRef::Private(channel));
        }
        let guild = self.guilds.get(&self.guild_id_of(channel_id)?)?;
        guild
            .channels
            .get(&channel_id)
            .map(ChannelRef::Guild)
            .or_else(|| guild.threads.get(&channel_id).map(ChannelRef::Thread))
    }

    pub fn message(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<&Message> {
        self.channel(channel_id)?.messages().get(&message_id)
    }

    /// Guild of a cached message, resolved through its channel once and memoised
    ///
    /// `Ok(None)` means the message is known to belong to no guild.
    pub fn message_guild_id(
        &mut self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> DomainResult<Option<Snowflake>> {
        let guild_id = self.guild_id_of(channel_id);
        let messages = self
            .messages_mut(channel_id)
            .ok_or(DomainError::ChannelNotCached(channel_id))?;
        let message = messages
            .get_mut(&message_id)
            .ok_or(DomainError::MessageNotCached {
                channel_id,
                message_id,
            })?;
        Ok(message.guild_id.get_or_resolve(|| guild_id).copied())
    }

    fn messages_mut(&mut self, channel_id: Snowflake) -> Option<&mut TypedCollection<Message>> {
        if self.private_channels.has(&channel_id) {
            return self
                .private_channels
                .get_mut(&channel_id)
                .map(|channel| &mut channel.messages);
        }
        let guild_id = self.guild_id_of(channel_id)?;
        let guild = self.guilds.get_mut(&guild_id)?;
        if guild.channels.has(&channel_id) {
            return guild
                .channels
                .get_mut(&channel_id)
                .map(|channel| &mut channel.messages);
        }
        guild
            .threads
            .get_mut(&channel_id)
            .map(|thread| &mut thread.messages)
    }

    fn guild_entry(&mut self, guild_id: Snowflake) -> DomainResult<&mut Guild> {
        self.guilds
            .get_mut(&guild_id)
            .ok_or(DomainError::GuildNotCached(guild_id))
    }

    // =========================================================================
    // Guilds
    // =========================================================================

    /// Upsert a guild together with its nested roles, channels, threads, and
    /// members
    ///
    /// Members go through [`upsert_members`](Self::upsert_members) so a large
    /// member list grows the member limit instead of evicting itself.
    pub fn upsert_guild(&mut self, mut payload: GuildPayload) -> DomainResult<Upserted<'_, Guild>> {
        let guild_id = payload.id;
        let members = payload.members.take().unwrap_or_default();
        let is_new = !self.guilds.has(&guild_id);

        if let Upserted::Uncached(mut guild) = self.guilds.update(payload)? {
            for member in members {
                self.users.update(member.user.clone())?;
                guild.members.update(member)?;
            }
            return Ok(Upserted::Uncached(guild));
        }

        if is_new {
            self.forget_evicted_channels();
        }
        self.register_channels(guild_id);
        if !members.is_empty() {
            self.upsert_members(guild_id, members)?;
        }

        let guild = self.guild_entry(guild_id)?;
        debug!(
            guild_id = %guild_id,
            roles = guild.roles.len(),
            channels = guild.channels.len(),
            threads = guild.threads.len(),
            members = guild.members.len(),
            "Guild upserted"
        );
        Ok(Upserted::Cached(guild))
    }

    /// Remove a guild and forget which channels belonged to it
    pub fn remove_guild(&mut self, guild_id: Snowflake) -> Option<Guild> {
        let guild = self.guilds.delete(&guild_id)?;
        self.channel_guilds.retain(|_, owner| *owner != guild_id);
        self.thread_guilds.retain(|_, owner| *owner != guild_id);
        debug!(guild_id = %guild_id, "Guild removed");
        Some(guild)
    }

    /// Drop channel map entries whose guild is no longer cached
    fn forget_evicted_channels(&mut self) {
        let guilds = &self.guilds;
        let before = self.channel_guilds.len() + self.thread_guilds.len();
        self.channel_guilds.retain(|_, owner| guilds.has(owner));
        self.thread_guilds.retain(|_, owner| guilds.has(owner));
        let forgotten = before - self.channel_guilds.len() - self.thread_guilds.len();
        if forgotten > 0 {
            trace!(forgotten, "Forgot channels of evicted guilds");
        }
    }

    fn register_channels(&mut self, guild_id: Snowflake) {
        let Some(guild) = self.guilds.get(&guild_id) else {
            return;
        };
        for channel_id in guild.channels.keys() {
            self.channel_guilds.insert(channel_id, guild_id);
        }
        for thread_id in guild.threads.keys() {
            self.thread_guilds.insert(thread_id, guild_id);
        }
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Upsert a channel of any kind and route it into its owning collection
    ///
    /// The owning guild comes from the payload or, for a cached channel, from
    /// the channel-to-guild maps. A payload with no guild is a private channel.
    pub fn upsert_channel(&mut self, payload: ChannelPayload) -> DomainResult<ChannelType> {
        let channel_id = payload.id;
        if self.private_channels.has(&channel_id) {
            return Ok(self.private_channels.update(payload)?.kind);
        }

        let Some(guild_id) = payload.guild_id.or_else(|| self.guild_id_of(channel_id)) else {
            return self.insert_private_channel(payload);
        };

        let guild = self
            .guilds
            .get_mut(&guild_id)
            .ok_or(DomainError::GuildNotCached(guild_id))?;
        let kind = guild.upsert_channel(payload)?;
        if kind.is_thread() {
            self.thread_guilds.insert(channel_id, guild_id);
        } else {
            self.channel_guilds.insert(channel_id, guild_id);
        }
        trace!(channel_id = %channel_id, guild_id = %guild_id, kind = ?kind, "Channel upserted");
        Ok(kind)
    }

    fn insert_private_channel(&mut self, payload: ChannelPayload) -> DomainResult<ChannelType> {
        let channel_id = payload.id;
        for recipient in payload.recipients.iter().flatten() {
            self.users.update(recipient.clone())?;
        }
        match Channel::from_payload(payload, self.private_channels.context())? {
            Channel::Private(channel) => {
                let kind = self.private_channels.add(channel).kind;
                trace!(channel_id = %channel_id, kind = ?kind, "Private channel cached");
                Ok(kind)
            }
            Channel::Guild(_) | Channel::Thread(_) => {
                Err(DomainError::missing("Channel", "guild_id"))
            }
        }
    }

    /// Remove a channel, thread, or private channel
    pub fn remove_channel(&mut self, channel_id: Snowflake) -> Option<Channel> {
        if let Some(channel) = self.private_channels.delete(&channel_id) {
            return Some(Channel::Private(channel));
        }
        let guild_id = self
            .channel_guilds
            .remove(&channel_id)
            .or_else(|| self.thread_guilds.remove(&channel_id))?;
        self.guilds.get_mut(&guild_id)?.remove_channel(channel_id)
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub fn upsert_role(
        &mut self,
        guild_id: Snowflake,
        payload: RolePayload,
    ) -> DomainResult<Upserted<'_, Role>> {
        self.guild_entry(guild_id)?.roles.update(payload)
    }

    pub fn remove_role(&mut self, guild_id: Snowflake, role_id: Snowflake) -> DomainResult<Option<Role>> {
        Ok(self.guild_entry(guild_id)?.roles.delete(&role_id))
    }

    // =========================================================================
    // Members and users
    // =========================================================================

    pub fn upsert_user(&mut self, payload: UserPayload) -> DomainResult<Upserted<'_, User>> {
        self.users.update(payload)
    }

    /// Upsert one member and its user
    pub fn upsert_member(
        &mut self,
        guild_id: Snowflake,
        payload: MemberPayload,
    ) -> DomainResult<Upserted<'_, Member>> {
        let guild = self
            .guilds
            .get_mut(&guild_id)
            .ok_or(DomainError::GuildNotCached(guild_id))?;
        self.users.update(payload.user.clone())?;
        guild.members.update(payload)
    }

    /// Upsert a batch of members, growing a bounded member collection first if
    /// the new members would not fit. Returns the batch size.
    pub fn upsert_members(
        &mut self,
        guild_id: Snowflake,
        members: Vec<MemberPayload>,
    ) -> DomainResult<usize> {
        let guild = self
            .guilds
            .get_mut(&guild_id)
            .ok_or(DomainError::GuildNotCached(guild_id))?;

        let incoming = members
            .iter()
            .map(|member| member.user.id)
            .filter(|id| !guild.members.has(id))
            .collect::<HashSet<_>>()
            .len();
        self.member_policy.apply(&mut guild.members, incoming);

        let count = members.len();
        for member in members {
            self.users.update(member.user.clone())?;
            guild.members.update(member)?;
        }
        debug!(
            guild_id = %guild_id,
            count,
            incoming,
            cached = guild.members.len(),
            "Member batch upserted"
        );
        Ok(count)
    }

    pub fn remove_member(
        &mut self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> DomainResult<Option<Member>> {
        Ok(self.guild_entry(guild_id)?.members.delete(&user_id))
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Upsert a message into its channel's message collection
    pub fn upsert_message(&mut self, payload: MessagePayload) -> DomainResult<Upserted<'_, Message>> {
        let channel_id = payload.channel_id;
        if let Some(author) = &payload.author {
            self.users.update(author.clone())?;
        }
        self.messages_mut(channel_id)
            .ok_or(DomainError::ChannelNotCached(channel_id))?
            .update(payload)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
