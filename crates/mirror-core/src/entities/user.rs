//! User entity - a platform account, shared by every guild it appears in

use crate::collection::Entity;
use crate::error::{DomainError, DomainResult};
use crate::payloads::UserPayload;
use crate::value_objects::Snowflake;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub discriminator: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
    pub bot: bool,
}

impl User {
    /// Get the full tag: username#discriminator, or the bare username for
    /// accounts without a discriminator
    pub fn tag(&self) -> String {
        if self.discriminator.is_empty() || self.discriminator == "0" {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }

    /// Name shown in clients
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Get avatar URL or default avatar URL
    pub fn avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => format!("/avatars/{}/{}.png", self.id, hash),
            None => format!("/embed/avatars/{}.png", self.default_avatar_index()),
        }
    }

    /// Default avatar index (0-5)
    fn default_avatar_index(&self) -> i64 {
        match self.discriminator.parse::<i64>() {
            Ok(d) if d != 0 => d % 5,
            _ => (self.id.into_inner() >> 22) % 6,
        }
    }
}

impl Entity for User {
    type Id = Snowflake;
    type Payload = UserPayload;
    type Context = ();

    const KIND: &'static str = "User";

    fn id(&self) -> Snowflake {
        self.id
    }

    fn payload_id(payload: &UserPayload) -> Snowflake {
        payload.id
    }

    fn from_payload(payload: UserPayload, _context: &()) -> DomainResult<Self> {
        let username = payload
            .username
            .ok_or(DomainError::missing(Self::KIND, "username"))?;

        Ok(Self {
            id: payload.id,
            username,
            discriminator: payload.discriminator.unwrap_or_else(|| "0".to_string()),
            global_name: payload.global_name.flatten(),
            avatar: payload.avatar.flatten(),
            bot: payload.bot.unwrap_or_default(),
        })
    }

    fn merge(&mut self, payload: UserPayload) -> DomainResult<()> {
        if let Some(username) = payload.username {
            self.username = username;
        }
        if let Some(discriminator) = payload.discriminator {
            self.discriminator = discriminator;
        }
        if let Some(global_name) = payload.global_name {
            self.global_name = global_name;
        }
        if let Some(avatar) = payload.avatar {
            self.avatar = avatar;
        }
        if let Some(bot) = payload.bot {
            self.bot = bot;
        }
        Ok(())
    }
}
