//! Guild entity - a server and every collection it owns

use tracing::{debug, trace};

use super::{Channel, ChannelContext, ChannelType, GuildChannel, Member, Role, ThreadChannel};
use crate::collection::{Entity, TypedCollection};
use crate::error::{DomainError, DomainResult};
use crate::payloads::{ChannelPayload, GuildPayload, MemberPayload, RolePayload};
use crate::value_objects::{PermissionSet, Permissions, Snowflake};

/// Limits handed to the collections a new guild creates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuildContext {
    pub member_limit: Option<usize>,
    pub message_limit: Option<usize>,
}

/// Guild (server) entity
///
/// The `@everyone` role is the role whose ID equals the guild ID.
#[derive(Debug, Clone)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Option<Snowflake>,
    pub member_count: Option<u64>,
    /// Outage stub: nothing but the ID is known
    pub unavailable: bool,
    pub roles: TypedCollection<Role>,
    pub members: TypedCollection<Member>,
    pub channels: TypedCollection<GuildChannel>,
    pub threads: TypedCollection<ThreadChannel>,
}

impl Guild {
    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == Some(user_id)
    }

    /// The `@everyone` role, if cached
    pub fn everyone_role(&self) -> Option<&Role> {
        self.roles.get(&self.id)
    }

    /// Upsert a channel or thread payload into the right collection
    ///
    /// A payload for a cached ID is merged into the collection already holding
    /// it. A new one goes through [`Channel::from_payload`]. Returns the kind of
    /// the stored channel.
    pub fn upsert_channel(&mut self, payload: ChannelPayload) -> DomainResult<ChannelType> {
        let id = payload.id;
        if self.channels.has(&id) {
            return Ok(self.channels.update(payload)?.kind);
        }
        if self.threads.has(&id) {
            return Ok(self.threads.update(payload)?.kind);
        }

        match Channel::from_payload(payload, self.channels.context())? {
            Channel::Guild(channel) => Ok(self.channels.add(channel).kind),
            Channel::Thread(thread) => Ok(self.threads.add(thread).kind),
            Channel::Private(private) => Err(DomainError::NotGuildChannel(private.id)),
        }
    }

    /// Remove a channel or thread by ID
    pub fn remove_channel(&mut self, channel_id: Snowflake) -> Option<Channel> {
        self.channels
            .delete(&channel_id)
            .map(Channel::Guild)
            .or_else(|| self.threads.delete(&channel_id).map(Channel::Thread))
    }

    /// Guild-level permissions of `member`
    ///
    /// The owner has everything. Otherwise the `@everyone` grant is combined
    /// with the grants of every cached role the member holds; roles that are
    /// not cached are skipped. Any administrator grant yields everything.
    pub fn permissions_of(&self, member: &Member) -> DomainResult<PermissionSet> {
        if self.is_owner(member.id) {
            return Ok(PermissionSet::all());
        }

        let everyone = self
            .everyone_role()
            .ok_or(DomainError::RoleNotCached(self.id))?;
        let mut permissions = everyone.permissions.allow();
        if permissions.contains(Permissions::ADMINISTRATOR) {
            return Ok(PermissionSet::all());
        }

        for role_id in &member.roles {
            let Some(role) = self.roles.get(role_id) else {
                trace!(guild_id = %self.id, role_id = %role_id, "Skipping uncached role");
                continue;
            };
            let allow = role.permissions.allow();
            if allow.contains(Permissions::ADMINISTRATOR) {
                return Ok(PermissionSet::all());
            }
            permissions |= allow;
        }

        Ok(PermissionSet::from_allow(permissions))
    }

    /// Guild-level permissions of a cached member
    pub fn member_permissions(&self, user_id: Snowflake) -> DomainResult<PermissionSet> {
        let member = self.member(user_id)?;
        self.permissions_of(member)
    }

    /// Permissions of `member` in a thread: those of its parent channel
    pub fn thread_permissions_of(
        &self,
        thread: &ThreadChannel,
        member: &Member,
    ) -> DomainResult<PermissionSet> {
        let parent = self
            .channels
            .get(&thread.parent_id)
            .ok_or(DomainError::ThreadParentNotCached {
                thread_id: thread.id,
                parent_id: thread.parent_id,
            })?;
        parent.permissions_of(self, member)
    }

    /// Permissions of `member` in any channel or thread of this guild
    pub fn channel_permissions_of(
        &self,
        channel_id: Snowflake,
        member: &Member,
    ) -> DomainResult<PermissionSet> {
        if let Some(channel) = self.channels.get(&channel_id) {
            return channel.permissions_of(self, member);
        }
        if let Some(thread) = self.threads.get(&channel_id) {
            return self.thread_permissions_of(thread, member);
        }
        Err(DomainError::ChannelNotCached(channel_id))
    }

    /// Look up a cached guild channel
    pub fn channel(&self, channel_id: Snowflake) -> DomainResult<&GuildChannel> {
        self.channels
            .get(&channel_id)
            .ok_or(DomainError::ChannelNotCached(channel_id))
    }

    /// Look up a cached thread
    pub fn thread(&self, thread_id: Snowflake) -> DomainResult<&ThreadChannel> {
        self.threads
            .get(&thread_id)
            .ok_or(DomainError::ThreadNotCached(thread_id))
    }

    /// Look up a cached member
    pub fn member(&self, user_id: Snowflake) -> DomainResult<&Member> {
        self.members.get(&user_id).ok_or(DomainError::MemberNotCached {
            guild_id: self.id,
            user_id,
        })
    }

    fn sync_roles(&mut self, roles: Vec<RolePayload>) -> DomainResult<()> {
        for role in roles {
            self.roles.update(role)?;
        }
        Ok(())
    }

    fn sync_members(&mut self, members: Vec<MemberPayload>) -> DomainResult<()> {
        for member in members {
            self.members.update(member)?;
        }
        Ok(())
    }

    fn sync_channels(&mut self, channels: Vec<ChannelPayload>) -> DomainResult<()> {
        for channel in channels {
            self.upsert_channel(channel)?;
        }
        Ok(())
    }

    fn apply_collections(&mut self, payload: GuildPayload) -> DomainResult<()> {
        if let Some(roles) = payload.roles {
            self.sync_roles(roles)?;
        }
        if let Some(channels) = payload.channels {
            self.sync_channels(channels)?;
        }
        if let Some(threads) = payload.threads {
            self.sync_channels(threads)?;
        }
        if let Some(members) = payload.members {
            self.sync_members(members)?;
        }
        Ok(())
    }
}

impl Entity for Guild {
    type Id = Snowflake;
    type Payload = GuildPayload;
    type Context = GuildContext;

    const KIND: &'static str = "Guild";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &GuildPayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: GuildPayload, context: &GuildContext) -> DomainResult<Self> {
        let id = payload.id;
        let unavailable = payload.unavailable.unwrap_or_default();

        let (name, owner_id) = if unavailable {
            (payload.name.clone().unwrap_or_default(), payload.owner_id)
        } else {
            let name = payload
                .name
                .clone()
                .ok_or(DomainError::missing(Self::KIND, "name"))?;
            let owner_id = payload
                .owner_id
                .ok_or(DomainError::missing(Self::KIND, "owner_id"))?;
            (name, Some(owner_id))
        };

        let channel_context = ChannelContext::new(Some(id), context.message_limit);
        let mut guild = Self {
            id,
            name,
            owner_id,
            member_count: payload.member_count,
            unavailable,
            roles: TypedCollection::with_context(id, None),
            members: TypedCollection::with_context(id, context.member_limit),
            channels: TypedCollection::with_context(channel_context, None),
            threads: TypedCollection::with_context(channel_context, None),
        };
        guild.apply_collections(payload)?;

        debug!(
            guild_id = %guild.id,
            unavailable = guild.unavailable,
            roles = guild.roles.len(),
            channels = guild.channels.len(),
            members = guild.members.len(),
            "Guild constructed"
        );
        Ok(guild)
    }

    fn merge(&mut self, mut payload: GuildPayload) -> DomainResult<()> {
        if let Some(name) = payload.name.take() {
            self.name = name;
        }
        if let Some(owner_id) = payload.owner_id {
            self.owner_id = Some(owner_id);
        }
        if let Some(count) = payload.member_count {
            self.member_count = Some(count);
        }
        if let Some(unavailable) = payload.unavailable {
            self.unavailable = unavailable;
        }
        self.apply_collections(payload)
    }
}
