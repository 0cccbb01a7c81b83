//! Test fixtures and payload generators
//!
//! Provides reusable gateway-shaped JSON for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};

use mirror_core::{Permissions, Snowflake};
use serde_json::{json, Value};

/// Counter for unique snowflakes
static COUNTER: AtomicI64 = AtomicI64::new(1_000);

/// Get a unique snowflake for test data
pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Permission bits as the wire's decimal string
pub fn bits(permissions: Permissions) -> String {
    permissions.bits().to_string()
}

pub fn user_json(id: Snowflake) -> Value {
    json!({
        "id": id.to_string(),
        "username": format!("user{id}"),
        "discriminator": "0",
        "avatar": null,
        "bot": false
    })
}

pub fn role_json(id: Snowflake, name: &str, permissions: Permissions, position: i32) -> Value {
    json!({
        "id": id.to_string(),
        "name": name,
        "permissions": bits(permissions),
        "position": position,
        "color": 0,
        "hoist": false,
        "managed": false,
        "mentionable": false
    })
}

pub fn member_json(user_id: Snowflake, roles: &[Snowflake]) -> Value {
    json!({
        "user": user_json(user_id),
        "nick": null,
        "roles": roles.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "joined_at": "2024-01-01T00:00:00Z"
    })
}

/// Role (`type: 0`) permission overwrite
pub fn role_overwrite(role_id: Snowflake, allow: Permissions, deny: Permissions) -> Value {
    json!({ "id": role_id.to_string(), "type": 0, "allow": bits(allow), "deny": bits(deny) })
}

/// Member (`type: 1`) permission overwrite
pub fn member_overwrite(user_id: Snowflake, allow: Permissions, deny: Permissions) -> Value {
    json!({ "id": user_id.to_string(), "type": 1, "allow": bits(allow), "deny": bits(deny) })
}

pub fn text_channel_json(id: Snowflake, parent_id: Option<Snowflake>, overwrites: Vec<Value>) -> Value {
    json!({
        "id": id.to_string(),
        "type": 0,
        "name": format!("channel-{id}"),
        "position": 0,
        "parent_id": parent_id.map(|p| p.to_string()),
        "nsfw": false,
        "permission_overwrites": overwrites
    })
}

pub fn category_json(id: Snowflake, overwrites: Vec<Value>) -> Value {
    json!({
        "id": id.to_string(),
        "type": 4,
        "name": format!("category-{id}"),
        "position": 0,
        "permission_overwrites": overwrites
    })
}

pub fn thread_json(id: Snowflake, guild_id: Snowflake, parent_id: Snowflake) -> Value {
    json!({
        "id": id.to_string(),
        "type": 11,
        "guild_id": guild_id.to_string(),
        "parent_id": parent_id.to_string(),
        "name": format!("thread-{id}"),
        "thread_metadata": { "archived": false, "locked": false, "auto_archive_duration": 1440 },
        "message_count": 0,
        "member_count": 1
    })
}

pub fn dm_json(id: Snowflake, recipient: Snowflake) -> Value {
    json!({
        "id": id.to_string(),
        "type": 1,
        "recipients": [user_json(recipient)]
    })
}

pub fn message_json(id: Snowflake, channel_id: Snowflake, author_id: Snowflake, content: &str) -> Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel_id.to_string(),
        "author": user_json(author_id),
        "content": content,
        "timestamp": "2024-01-01T00:00:00Z",
        "edited_timestamp": null,
        "pinned": false
    })
}

/// Builder for a full guild create payload
///
/// The `@everyone` role is always present and shares the guild's ID.
#[derive(Debug, Clone)]
pub struct GuildFixture {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    everyone: Permissions,
    roles: Vec<Value>,
    channels: Vec<Value>,
    threads: Vec<Value>,
    members: Vec<Value>,
}

impl GuildFixture {
    pub fn new(everyone: Permissions) -> Self {
        let owner_id = unique_id();
        Self {
            id: unique_id(),
            owner_id,
            everyone,
            roles: Vec::new(),
            channels: Vec::new(),
            threads: Vec::new(),
            members: vec![member_json(owner_id, &[])],
        }
    }

    /// Add a role, returning its ID
    pub fn role(&mut self, name: &str, permissions: Permissions) -> Snowflake {
        let id = unique_id();
        let position = self.roles.len() as i32 + 1;
        self.roles.push(role_json(id, name, permissions, position));
        id
    }

    /// Add a member holding `roles`, returning its user ID
    pub fn member(&mut self, roles: &[Snowflake]) -> Snowflake {
        let id = unique_id();
        self.members.push(member_json(id, roles));
        id
    }

    /// Add a text channel, returning its ID
    pub fn text_channel(&mut self, parent_id: Option<Snowflake>, overwrites: Vec<Value>) -> Snowflake {
        let id = unique_id();
        self.channels.push(text_channel_json(id, parent_id, overwrites));
        id
    }

    /// Add a category, returning its ID
    pub fn category(&mut self, overwrites: Vec<Value>) -> Snowflake {
        let id = unique_id();
        self.channels.push(category_json(id, overwrites));
        id
    }

    /// Add a thread under `parent_id`, returning its ID
    pub fn thread(&mut self, parent_id: Snowflake) -> Snowflake {
        let id = unique_id();
        self.threads.push(thread_json(id, self.id, parent_id));
        id
    }

    /// Overwrite targeting `@everyone`
    pub fn everyone_overwrite(&self, allow: Permissions, deny: Permissions) -> Value {
        role_overwrite(self.id, allow, deny)
    }

    pub fn to_json(&self) -> Value {
        let mut roles = vec![role_json(self.id, "@everyone", self.everyone, 0)];
        roles.extend(self.roles.iter().cloned());
        json!({
            "id": self.id.to_string(),
            "name": format!("guild-{}", self.id),
            "owner_id": self.owner_id.to_string(),
            "member_count": self.members.len(),
            "unavailable": false,
            "roles": roles,
            "channels": self.channels,
            "threads": self.threads,
            "members": self.members
        })
    }
}
