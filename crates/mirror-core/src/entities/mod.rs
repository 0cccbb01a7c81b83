//! Domain entities - everything the cache mirrors

mod channel;
mod guild;
mod member;
mod message;
mod overwrite;
mod role;
mod user;

pub use channel::{Channel, ChannelContext, ChannelType, GuildChannel, PrivateChannel, ThreadChannel};
pub use guild::{Guild, GuildContext};
pub use member::Member;
pub use message::Message;
pub use overwrite::{OverwriteKind, PermissionOverwrite};
pub use role::Role;
pub use user::User;
