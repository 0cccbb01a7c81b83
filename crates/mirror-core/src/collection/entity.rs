//! Entity trait implemented by every cacheable kind

use std::fmt;
use std::hash::Hash;

use crate::error::DomainResult;

/// A cacheable object addressed by a stable ID
///
/// An entity is built once from a payload plus the construction context its
/// collection carries (for example the owning guild's ID), and afterwards only
/// ever mutated in place through [`merge`](Entity::merge).
pub trait Entity: Sized {
    /// Key type
    type Id: Copy + Eq + Hash + fmt::Debug + fmt::Display;
    /// Decoded remote payload this entity is built from and updated with
    type Payload;
    /// Extra construction arguments supplied by the owning collection
    type Context;

    /// Name used in logs and errors
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    /// ID carried by a payload
    fn payload_id(payload: &Self::Payload) -> Self::Id;

    /// Build a new entity. Fails on payloads missing fields needed to construct.
    fn from_payload(payload: Self::Payload, context: &Self::Context) -> DomainResult<Self>;

    /// Copy the fields present in `payload` onto this entity
    fn merge(&mut self, payload: Self::Payload) -> DomainResult<()>;
}
