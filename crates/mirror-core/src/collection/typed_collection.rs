//! Generic bounded collection keyed by entity ID

use std::fmt;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::Entity;
use crate::error::DomainResult;

/// Outcome of inserting into a collection
///
/// A collection with a limit of zero stores nothing; the entity it built is
/// handed back by value instead of as a reference into the collection.
#[derive(Debug)]
pub enum Upserted<'a, T> {
    /// The entity lives in the collection
    Cached(&'a mut T),
    /// The collection cannot hold any entity
    Uncached(T),
}

impl<T> Upserted<'_, T> {
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }
}

impl<T> Deref for Upserted<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Cached(entity) => entity,
            Self::Uncached(entity) => entity,
        }
    }
}

impl<T> DerefMut for Upserted<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self {
            Self::Cached(entity) => entity,
            Self::Uncached(entity) => entity,
        }
    }
}

/// Bounded map from entity ID to entity
///
/// Entries keep their insertion order; merging into an existing entry does not
/// move it. When an insertion pushes the size past the limit, the earliest
/// inserted entries are evicted first (FIFO, not LRU). A limit of `None` means
/// unbounded and `Some(0)` means nothing is ever stored.
pub struct TypedCollection<T: Entity> {
    items: IndexMap<T::Id, T>,
    limit: Option<usize>,
    context: T::Context,
}

impl<T: Entity> TypedCollection<T>
where
    T::Context: Default,
{
    /// Create an empty collection with a default construction context
    pub fn new(limit: Option<usize>) -> Self {
        Self::with_context(T::Context::default(), limit)
    }
}

impl<T: Entity> TypedCollection<T> {
    /// Create an empty collection that builds entities with `context`
    pub fn with_context(context: T::Context, limit: Option<usize>) -> Self {
        Self {
            items: IndexMap::new(),
            limit,
            context,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    #[inline]
    pub fn context(&self) -> &T::Context {
        &self.context
    }

    #[inline]
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.items.get_mut(id)
    }

    #[inline]
    pub fn has(&self, id: &T::Id) -> bool {
        self.items.contains_key(id)
    }

    /// Insert `entity` unless its ID is already cached
    ///
    /// An existing entry is returned untouched and `entity` is dropped.
    pub fn add(&mut self, entity: T) -> Upserted<'_, T> {
        let id = entity.id();
        if let Some(index) = self.items.get_index_of(&id) {
            return Upserted::Cached(&mut self.items[index]);
        }
        self.insert_new(id, entity)
    }

    /// Insert `entity`, overwriting an existing entry in place
    pub fn replace(&mut self, entity: T) -> Upserted<'_, T> {
        let id = entity.id();
        if let Some(index) = self.items.get_index_of(&id) {
            self.items[index] = entity;
            return Upserted::Cached(&mut self.items[index]);
        }
        self.insert_new(id, entity)
    }

    /// Merge `payload` into the cached entity with the same ID, or build and
    /// insert a new one
    ///
    /// Calling this twice with the same payload leaves one entry and returns the
    /// same instance both times. Construction errors propagate unchanged.
    pub fn update(&mut self, payload: T::Payload) -> DomainResult<Upserted<'_, T>> {
        let id = T::payload_id(&payload);
        if let Some(index) = self.items.get_index_of(&id) {
            let existing = &mut self.items[index];
            existing.merge(payload)?;
            return Ok(Upserted::Cached(existing));
        }

        let entity = T::from_payload(payload, &self.context)?;
        Ok(self.insert_new(id, entity))
    }

    /// Decode a JSON payload and [`update`](Self::update) with it
    pub fn update_json(&mut self, value: serde_json::Value) -> DomainResult<Upserted<'_, T>>
    where
        T::Payload: DeserializeOwned,
    {
        let payload = serde_json::from_value(value)?;
        self.update(payload)
    }

    /// Remove and return the entry for `id`
    pub fn delete(&mut self, id: &T::Id) -> Option<T> {
        self.items.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Change the limit and evict down to it straight away
    pub fn set_limit(&mut self, limit: Option<usize>) {
        debug!(kind = T::KIND, from = ?self.limit, to = ?limit, "Collection limit set");
        self.limit = limit;
        self.enforce_limit();
    }

    /// Raise a bounded limit to `limit`. Never lowers it and never bounds an
    /// unbounded collection. Returns whether the limit changed.
    pub fn grow_limit(&mut self, limit: usize) -> bool {
        match self.limit {
            Some(current) if limit > current => {
                debug!(kind = T::KIND, from = current, to = limit, "Collection limit grown");
                self.limit = Some(limit);
                true
            }
            _ => false,
        }
    }

    /// IDs in insertion order
    pub fn keys(&self) -> impl Iterator<Item = T::Id> + '_ {
        self.items.keys().copied()
    }

    /// Entities in insertion order
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T::Id, &T)> + '_ {
        self.items.iter()
    }

    /// Apply `f` to every entity, in insertion order
    pub fn map<R, F>(&self, f: F) -> Vec<R>
    where
        F: FnMut(&T) -> R,
    {
        self.items.values().map(f).collect()
    }

    /// First entity (in insertion order) matching `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items.values().find(|entity| predicate(entity))
    }

    /// All entities matching `predicate`, in insertion order
    pub fn filter<P>(&self, mut predicate: P) -> Vec<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.items
            .values()
            .filter(|entity| predicate(entity))
            .collect()
    }

    fn insert_new(&mut self, id: T::Id, entity: T) -> Upserted<'_, T> {
        if self.limit == Some(0) {
            trace!(kind = T::KIND, id = %id, "Collection limit is zero, not caching");
            return Upserted::Uncached(entity);
        }

        self.items.insert(id, entity);
        self.enforce_limit();

        // The newest entry is last and survives eviction since the limit is >= 1
        let last = self.items.len() - 1;
        Upserted::Cached(&mut self.items[last])
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.limit else {
            return;
        };
        while self.items.len() > limit {
            match self.items.shift_remove_index(0) {
                Some((id, _)) => trace!(kind = T::KIND, id = %id, "Evicted oldest entry"),
                None => break,
            }
        }
    }
}

impl<T: Entity> Default for TypedCollection<T>
where
    T::Context: Default,
{
    fn default() -> Self {
        Self::new(None)
    }
}

impl<T> Clone for TypedCollection<T>
where
    T: Entity + Clone,
    T::Context: Clone,
{
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            limit: self.limit,
            context: self.context.clone(),
        }
    }
}

impl<T> fmt::Debug for TypedCollection<T>
where
    T: Entity + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCollection")
            .field("kind", &T::KIND)
            .field("limit", &self.limit)
            .field("items", &self.items)
            .finish()
    }
}
