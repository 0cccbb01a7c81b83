//! Integration test utilities for the guild mirror
//!
//! This crate provides JSON payload fixtures and helpers for driving the
//! cache and permission resolver end to end.

pub mod fixtures;

pub use fixtures::*;
pub use helpers::*;
