//! Permission resolver
//!
//! Computes effective permissions from the current cache state. Nothing is
//! memoised: every call reads roles, members, channels, and overwrites afresh,
//! and anything missing from the cache is an error rather than a default.

use mirror_core::{DomainError, DomainResult, Guild, Member, PermissionSet, Permissions, Snowflake};
use tracing::{debug, instrument};

use crate::cache::Cache;

/// What permissions are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Guild-level permissions
    Guild(Snowflake),
    /// A guild channel, category, or thread
    Channel(Snowflake),
}

/// Whose permissions are computed
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Member(&'a Member),
    /// A member looked up in the target's guild
    Id(Snowflake),
}

impl<'a> From<&'a Member> for Subject<'a> {
    fn from(member: &'a Member) -> Self {
        Self::Member(member)
    }
}

impl From<Snowflake> for Subject<'_> {
    fn from(user_id: Snowflake) -> Self {
        Self::Id(user_id)
    }
}

/// Permission resolver over a borrowed cache
#[derive(Debug, Clone, Copy)]
pub struct PermissionResolver<'a> {
    cache: &'a Cache,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(cache: &'a Cache) -> Self {
        Self { cache }
    }

    /// Effective permissions of `subject` on `target`
    #[instrument(skip(self))]
    pub fn permissions_of(
        &self,
        target: Target,
        subject: Subject<'_>,
    ) -> DomainResult<PermissionSet> {
        let guild = self.guild_for(target)?;
        let member = match subject {
            Subject::Member(member) => member,
            Subject::Id(user_id) => guild.member(user_id)?,
        };

        let permissions = match target {
            Target::Guild(_) => guild.permissions_of(member)?,
            Target::Channel(channel_id) => guild.channel_permissions_of(channel_id, member)?,
        };

        debug!(
            guild_id = %guild.id,
            user_id = %member.id,
            permissions = %permissions,
            "Resolved permissions"
        );
        Ok(permissions)
    }

    /// Check if `subject` holds every bit of `permission` on `target`
    #[instrument(skip(self))]
    pub fn check_permission(
        &self,
        target: Target,
        subject: Subject<'_>,
        permission: Permissions,
    ) -> DomainResult<bool> {
        Ok(self.permissions_of(target, subject)?.has(permission))
    }

    /// Check if `subject` is the owner of the target's guild
    pub fn is_guild_owner(&self, target: Target, user_id: Snowflake) -> DomainResult<bool> {
        Ok(self.guild_for(target)?.is_owner(user_id))
    }

    /// Guild a target belongs to
    ///
    /// Private channels belong to no guild and have no guild permissions.
    fn guild_for(&self, target: Target) -> DomainResult<&'a Guild> {
        let guild_id = match target {
            Target::Guild(guild_id) => guild_id,
            Target::Channel(channel_id) => {
                if self.cache.private_channels().has(&channel_id) {
                    return Err(DomainError::NotGuildChannel(channel_id));
                }
                self.cache
                    .guild_id_of(channel_id)
                    .ok_or(DomainError::ChannelNotCached(channel_id))?
            }
        };
        self.cache
            .guild(guild_id)
            .ok_or(DomainError::GuildNotCached(guild_id))
    }
}
