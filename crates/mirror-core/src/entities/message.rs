//! Message entity - a message cached in a channel's message collection

use chrono::{DateTime, Utc};

use crate::collection::Entity;
use crate::error::{DomainError, DomainResult};
use crate::payloads::MessagePayload;
use crate::value_objects::{Lookup, Snowflake};

/// Message entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub pinned: bool,
    /// Owning guild; only known up front when the payload carries it
    pub guild_id: Lookup<Snowflake>,
}

impl Message {
    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_timestamp.is_some()
    }

    /// Creation time derived from the message ID
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.id.created_at()
    }
}

impl Entity for Message {
    type Id = Snowflake;
    type Payload = MessagePayload;
    type Context = ();

    const KIND: &'static str = "Message";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &MessagePayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: MessagePayload, _context: &()) -> DomainResult<Self> {
        let author = payload
            .author
            .ok_or(DomainError::missing(Self::KIND, "author"))?;

        Ok(Self {
            id: payload.id,
            channel_id: payload.channel_id,
            author_id: author.id,
            content: payload.content.unwrap_or_default(),
            timestamp: payload.timestamp,
            edited_timestamp: payload.edited_timestamp.flatten(),
            pinned: payload.pinned.unwrap_or_default(),
            guild_id: payload
                .guild_id
                .map_or(Lookup::Unresolved, Lookup::Resolved),
        })
    }

    fn merge(&mut self, payload: MessagePayload) -> DomainResult<()> {
        if let Some(content) = payload.content {
            self.content = content;
        }
        if let Some(edited) = payload.edited_timestamp {
            self.edited_timestamp = edited;
        }
        if let Some(pinned) = payload.pinned {
            self.pinned = pinned;
        }
        if let Some(guild_id) = payload.guild_id {
            self.guild_id = Lookup::Resolved(guild_id);
        }
        Ok(())
    }
}
