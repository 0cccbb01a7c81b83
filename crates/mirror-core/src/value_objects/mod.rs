//! Value objects - immutable types that represent domain concepts

mod lookup;
mod permission_set;
mod permissions;
mod snowflake;

pub use lookup::Lookup;
pub use permission_set::PermissionSet;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
