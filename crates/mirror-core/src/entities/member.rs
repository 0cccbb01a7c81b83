//! Member entity - a user's membership in a guild

use chrono::{DateTime, Utc};

use crate::collection::Entity;
use crate::error::DomainResult;
use crate::payloads::MemberPayload;
use crate::value_objects::Snowflake;

/// Guild member (junction between User and Guild)
///
/// Keyed by the user's ID. The user itself lives in the client-wide user
/// collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub nick: Option<String>,
    /// Role IDs, excluding `@everyone`
    pub roles: Vec<Snowflake>,
    pub joined_at: Option<DateTime<Utc>>,
    pub pending: bool,
}

impl Member {
    /// Get display name (nickname if set, otherwise fallback)
    pub fn display_name<'a>(&'a self, username: &'a str) -> &'a str {
        self.nick.as_deref().unwrap_or(username)
    }

    /// Check if member has a specific role
    #[inline]
    pub fn has_role(&self, role_id: Snowflake) -> bool {
        self.roles.contains(&role_id)
    }
}

impl Entity for Member {
    type Id = Snowflake;
    type Payload = MemberPayload;
    /// Owning guild ID
    type Context = Snowflake;

    const KIND: &'static str = "Member";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &MemberPayload) -> Snowflake {
        payload.user.id
    }

    fn from_payload(payload: MemberPayload, guild_id: &Snowflake) -> DomainResult<Self> {
        Ok(Self {
            id: payload.user.id,
            guild_id: *guild_id,
            nick: payload.nick.flatten(),
            roles: payload.roles.unwrap_or_default(),
            joined_at: payload.joined_at,
            pending: payload.pending.unwrap_or_default(),
        })
    }

    fn merge(&mut self, payload: MemberPayload) -> DomainResult<()> {
        if let Some(nick) = payload.nick {
            self.nick = nick;
        }
        if let Some(roles) = payload.roles {
            self.roles = roles;
        }
        if let Some(joined_at) = payload.joined_at {
            self.joined_at = Some(joined_at);
        }
        if let Some(pending) = payload.pending {
            self.pending = pending;
        }
        Ok(())
    }
}
