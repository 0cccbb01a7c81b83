//! Decoded remote payloads
//!
//! Entities are built from and merged with these. Fields that construction
//! needs but partial updates may omit are `Option`s; nullable fields that an
//! update can explicitly clear are `Option<Option<_>>` (absent vs `null`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::entities::{ChannelType, OverwriteKind};
use crate::value_objects::{Permissions, Snowflake};

/// Keeps an explicit `null` distinct from an absent field
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub id: Snowflake,
    pub username: Option<String>,
    pub discriminator: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub global_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub avatar: Option<Option<String>>,
    pub bot: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePayload {
    pub id: Snowflake,
    pub name: Option<String>,
    pub permissions: Option<Permissions>,
    pub position: Option<i32>,
    pub color: Option<u32>,
    pub hoist: Option<bool>,
    pub managed: Option<bool>,
    pub mentionable: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberPayload {
    pub user: UserPayload,
    #[serde(default, deserialize_with = "nullable")]
    pub nick: Option<Option<String>>,
    pub roles: Option<Vec<Snowflake>>,
    pub joined_at: Option<DateTime<Utc>>,
    pub pending: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverwritePayload {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    #[serde(default)]
    pub allow: Permissions,
    #[serde(default)]
    pub deny: Permissions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadMetadataPayload {
    pub archived: Option<bool>,
    pub locked: Option<bool>,
    pub auto_archive_duration: Option<u32>,
    pub archive_timestamp: Option<DateTime<Utc>>,
}

/// Any channel kind: guild channel, thread, or private channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelPayload {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: Option<ChannelType>,
    pub guild_id: Option<Snowflake>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,
    pub position: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_id: Option<Option<Snowflake>>,
    #[serde(default, deserialize_with = "nullable")]
    pub topic: Option<Option<String>>,
    pub nsfw: Option<bool>,
    pub permission_overwrites: Option<Vec<OverwritePayload>>,
    pub owner_id: Option<Snowflake>,
    pub recipients: Option<Vec<UserPayload>>,
    pub thread_metadata: Option<ThreadMetadataPayload>,
    pub message_count: Option<u32>,
    pub member_count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagePayload {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub guild_id: Option<Snowflake>,
    pub author: Option<UserPayload>,
    pub content: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub edited_timestamp: Option<Option<DateTime<Utc>>>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuildPayload {
    pub id: Snowflake,
    pub name: Option<String>,
    pub owner_id: Option<Snowflake>,
    pub member_count: Option<u64>,
    pub unavailable: Option<bool>,
    pub roles: Option<Vec<RolePayload>>,
    pub channels: Option<Vec<ChannelPayload>>,
    pub threads: Option<Vec<ChannelPayload>>,
    pub members: Option<Vec<MemberPayload>>,
}
