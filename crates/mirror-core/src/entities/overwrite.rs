//! Permission overwrite - per-channel allow/deny for a role or member

use serde::{Deserialize, Serialize};

use crate::collection::Entity;
use crate::error::DomainResult;
use crate::payloads::OverwritePayload;
use crate::value_objects::{PermissionSet, Permissions, Snowflake};

/// What an overwrite's ID refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OverwriteKind {
    Role,
    Member,
}

impl TryFrom<u8> for OverwriteKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Role),
            1 => Ok(Self::Member),
            other => Err(format!("invalid overwrite type: {other}")),
        }
    }
}

impl From<OverwriteKind> for u8 {
    fn from(kind: OverwriteKind) -> Self {
        match kind {
            OverwriteKind::Role => 0,
            OverwriteKind::Member => 1,
        }
    }
}

/// Channel-specific permission overwrite
///
/// The ID is a role ID or a user ID depending on `kind`. An overwrite whose ID
/// equals the guild ID targets `@everyone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionOverwrite {
    pub id: Snowflake,
    pub kind: OverwriteKind,
    pub permission: PermissionSet,
}

impl PermissionOverwrite {
    #[inline]
    pub fn allow(&self) -> Permissions {
        self.permission.allow()
    }

    #[inline]
    pub fn deny(&self) -> Permissions {
        self.permission.deny()
    }

    /// Apply this overwrite on top of `base`
    #[inline]
    #[must_use]
    pub fn apply(&self, base: Permissions) -> Permissions {
        base.overwrite(self.allow(), self.deny())
    }
}

impl Entity for PermissionOverwrite {
    type Id = Snowflake;
    type Payload = OverwritePayload;
    type Context = ();

    const KIND: &'static str = "PermissionOverwrite";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &OverwritePayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: OverwritePayload, _context: &()) -> DomainResult<Self> {
        Ok(Self {
            id: payload.id,
            kind: payload.kind,
            permission: PermissionSet::new(payload.allow, payload.deny),
        })
    }

    fn merge(&mut self, payload: OverwritePayload) -> DomainResult<()> {
        self.kind = payload.kind;
        self.permission = PermissionSet::new(payload.allow, payload.deny);
        Ok(())
    }
}
