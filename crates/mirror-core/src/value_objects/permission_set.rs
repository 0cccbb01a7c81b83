//! Allow/deny permission pair
//!
//! A resolved permission set only consults `allow`. `deny` is kept for
//! inspection and serialization of overwrites and role grants.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Permissions;
use crate::error::{DomainError, DomainResult};

/// Immutable pair of allow/deny permission vectors
///
/// Both vectors are fixed at construction, so the lazily computed
/// [`json`](Self::json) view can never go stale.
pub struct PermissionSet {
    allow: Permissions,
    deny: Permissions,
    json: OnceLock<BTreeMap<&'static str, bool>>,
}

impl PermissionSet {
    /// Create a set from allow and deny vectors
    pub fn new(allow: Permissions, deny: Permissions) -> Self {
        Self {
            allow,
            deny,
            json: OnceLock::new(),
        }
    }

    /// Create a set with nothing denied
    pub fn from_allow(allow: Permissions) -> Self {
        Self::new(allow, Permissions::empty())
    }

    /// Every permission allowed
    pub fn all() -> Self {
        Self::from_allow(Permissions::ALL)
    }

    /// Parse from decimal-string encoded vectors
    pub fn parse(allow: &str, deny: &str) -> DomainResult<Self> {
        let parse = |s: &str| {
            Permissions::parse(s).map_err(|_| DomainError::InvalidPermissionBits(s.to_string()))
        };
        Ok(Self::new(parse(allow)?, parse(deny)?))
    }

    /// Allowed bits
    #[inline]
    pub fn allow(&self) -> Permissions {
        self.allow
    }

    /// Denied bits
    #[inline]
    pub fn deny(&self) -> Permissions {
        self.deny
    }

    /// True if every bit of `permissions` is allowed
    #[inline]
    pub fn has(&self, permissions: Permissions) -> bool {
        self.allow.contains(permissions)
    }

    /// True if every flag in `flags` is allowed. Stops at the first missing one.
    pub fn has_all(&self, flags: &[Permissions]) -> bool {
        flags.iter().all(|flag| self.has(*flag))
    }

    /// Like [`has_all`](Self::has_all) but with flags given by name
    ///
    /// Names are checked in order; an unknown name met before any missing flag
    /// is an error.
    pub fn has_named(&self, names: &[&str]) -> DomainResult<bool> {
        for name in names {
            let flag = Permissions::by_name(name)
                .ok_or_else(|| DomainError::UnknownPermission((*name).to_string()))?;
            if !self.has(flag) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Map of every named flag to `true` (allowed) or `false` (denied).
    /// Flags in neither vector are absent.
    pub fn json(&self) -> &BTreeMap<&'static str, bool> {
        self.json.get_or_init(|| {
            Permissions::ALL
                .iter_names()
                .filter_map(|(name, flag)| {
                    if self.allow.contains(flag) {
                        Some((name, true))
                    } else if self.deny.contains(flag) {
                        Some((name, false))
                    } else {
                        None
                    }
                })
                .collect()
        })
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::from_allow(Permissions::empty())
    }
}

impl Clone for PermissionSet {
    fn clone(&self) -> Self {
        Self::new(self.allow, self.deny)
    }
}

impl PartialEq for PermissionSet {
    fn eq(&self, other: &Self) -> bool {
        self.allow == other.allow && self.deny == other.deny
    }
}

impl Eq for PermissionSet {}

impl fmt::Debug for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionSet")
            .field("allow", &self.allow.bits())
            .field("deny", &self.deny.bits())
            .finish()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PermissionSet +{} -{}]", self.allow, self.deny)
    }
}

#[derive(Serialize, Deserialize)]
struct PermissionSetRepr {
    allow: Permissions,
    #[serde(default)]
    deny: Permissions,
}

impl Serialize for PermissionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        PermissionSetRepr {
            allow: self.allow,
            deny: self.deny,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = PermissionSetRepr::deserialize(deserializer)?;
        Ok(Self::new(repr.allow, repr.deny))
    }
}
