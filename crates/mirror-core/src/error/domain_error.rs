//! Domain errors - error types for the cache and permission layer

use thiserror::Error;

use crate::entities::ChannelType;
use crate::value_objects::Snowflake;

/// Result alias used throughout the domain layer
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Cached Errors
    // =========================================================================
    #[error("Guild not cached: {0}")]
    GuildNotCached(Snowflake),

    #[error("Channel not cached: {0}")]
    ChannelNotCached(Snowflake),

    #[error("Thread not cached: {0}")]
    ThreadNotCached(Snowflake),

    #[error("Parent channel {parent_id} of thread {thread_id} not cached")]
    ThreadParentNotCached {
        thread_id: Snowflake,
        parent_id: Snowflake,
    },

    #[error("Member {user_id} not cached in guild {guild_id}")]
    MemberNotCached {
        guild_id: Snowflake,
        user_id: Snowflake,
    },

    #[error("Role not cached: {0}")]
    RoleNotCached(Snowflake),

    #[error("Message {message_id} not cached in channel {channel_id}")]
    MessageNotCached {
        channel_id: Snowflake,
        message_id: Snowflake,
    },

    // =========================================================================
    // Construction Errors
    // =========================================================================
    #[error("Missing field `{field}` while constructing {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Channel {id} has type {channel_type:?}, expected {expected}")]
    UnexpectedChannelType {
        id: Snowflake,
        channel_type: ChannelType,
        expected: &'static str,
    },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid permission bits: {0}")]
    InvalidPermissionBits(String),

    // =========================================================================
    // Lookup Errors
    // =========================================================================
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),

    #[error("Channel {0} is not a guild channel")]
    NotGuildChannel(Snowflake),
}

impl DomainError {
    /// Get an error code string for callers that report errors by code
    pub fn code(&self) -> &'static str {
        match self {
            // Not cached
            Self::GuildNotCached(_) => "GUILD_NOT_CACHED",
            Self::ChannelNotCached(_) => "CHANNEL_NOT_CACHED",
            Self::ThreadNotCached(_) => "THREAD_NOT_CACHED",
            Self::ThreadParentNotCached { .. } => "THREAD_PARENT_NOT_CACHED",
            Self::MemberNotCached { .. } => "MEMBER_NOT_CACHED",
            Self::RoleNotCached(_) => "ROLE_NOT_CACHED",
            Self::MessageNotCached { .. } => "MESSAGE_NOT_CACHED",

            // Construction
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::UnexpectedChannelType { .. } => "UNEXPECTED_CHANNEL_TYPE",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::InvalidPermissionBits(_) => "INVALID_PERMISSION_BITS",

            // Lookup
            Self::UnknownPermission(_) => "UNKNOWN_PERMISSION",
            Self::NotGuildChannel(_) => "NOT_GUILD_CHANNEL",
        }
    }

    /// Check if this is a "not cached" error
    pub fn is_not_cached(&self) -> bool {
        matches!(
            self,
            Self::GuildNotCached(_)
                | Self::ChannelNotCached(_)
                | Self::ThreadNotCached(_)
                | Self::ThreadParentNotCached { .. }
                | Self::MemberNotCached { .. }
                | Self::RoleNotCached(_)
                | Self::MessageNotCached { .. }
        )
    }

    /// Check if this error came out of building an entity from a payload
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::UnexpectedChannelType { .. }
                | Self::MalformedPayload(_)
                | Self::InvalidPermissionBits(_)
        )
    }

    /// Shorthand for [`DomainError::MissingField`]
    pub fn missing(entity: &'static str, field: &'static str) -> Self {
        Self::MissingField { entity, field }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}
