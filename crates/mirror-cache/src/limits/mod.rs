//! Collection limit policies

mod member_limit;

pub use member_limit::MemberLimitPolicy;
