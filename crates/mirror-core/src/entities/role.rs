//! Role entity - a guild role and the permissions it grants

use crate::collection::Entity;
use crate::error::{DomainError, DomainResult};
use crate::payloads::RolePayload;
use crate::value_objects::{PermissionSet, Permissions, Snowflake};

/// Role entity
///
/// Role permissions are allow-only; `deny` is always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub name: String,
    pub position: i32,
    pub permissions: PermissionSet,
    pub color: u32,
    pub hoist: bool,
    pub managed: bool,
    pub mentionable: bool,
}

impl Role {
    /// The `@everyone` role shares its ID with the guild
    #[inline]
    pub fn is_everyone(&self) -> bool {
        self.id == self.guild_id
    }

    /// Check if this role grants a specific permission
    #[inline]
    pub fn has_permission(&self, permission: Permissions) -> bool {
        self.permissions.has(permission)
    }
}

impl Entity for Role {
    type Id = Snowflake;
    type Payload = RolePayload;
    /// Owning guild ID
    type Context = Snowflake;

    const KIND: &'static str = "Role";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &RolePayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: RolePayload, guild_id: &Snowflake) -> DomainResult<Self> {
        let name = payload
            .name
            .ok_or(DomainError::missing(Self::KIND, "name"))?;
        let permissions = payload
            .permissions
            .ok_or(DomainError::missing(Self::KIND, "permissions"))?;

        Ok(Self {
            id: payload.id,
            guild_id: *guild_id,
            name,
            position: payload.position.unwrap_or_default(),
            permissions: PermissionSet::from_allow(permissions),
            color: payload.color.unwrap_or_default(),
            hoist: payload.hoist.unwrap_or_default(),
            managed: payload.managed.unwrap_or_default(),
            mentionable: payload.mentionable.unwrap_or_default(),
        })
    }

    fn merge(&mut self, payload: RolePayload) -> DomainResult<()> {
        if let Some(name) = payload.name {
            self.name = name;
        }
        if let Some(permissions) = payload.permissions {
            self.permissions = PermissionSet::from_allow(permissions);
        }
        if let Some(position) = payload.position {
            self.position = position;
        }
        if let Some(color) = payload.color {
            self.color = color;
        }
        if let Some(hoist) = payload.hoist {
            self.hoist = hoist;
        }
        if let Some(managed) = payload.managed {
            self.managed = managed;
        }
        if let Some(mentionable) = payload.mentionable {
            self.mentionable = mentionable;
        }
        Ok(())
    }
}
