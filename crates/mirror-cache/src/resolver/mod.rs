//! Permission resolution over the cache

mod permission_resolver;

pub use permission_resolver::{PermissionResolver, Subject, Target};
