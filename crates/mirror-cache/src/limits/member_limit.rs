//! Adaptive growth of bounded member collections
//!
//! Member chunks for large guilds arrive in batches. Evicting members that were
//! just requested would make the batch useless, so a bounded member collection
//! grows ahead of a batch that would overflow it.

use mirror_core::{Entity, TypedCollection};
use tracing::debug;

/// Grows a bounded collection to fit an incoming batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberLimitPolicy {
    step: usize,
}

impl MemberLimitPolicy {
    /// `step` is the granularity limits are rounded up to; 0 is treated as 1
    pub fn new(step: usize) -> Self {
        Self { step: step.max(1) }
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    /// Limit needed for `incoming` new entries on top of `len` cached ones
    ///
    /// `None` when no growth applies: the collection is unbounded, caches
    /// nothing (limit 0), or the batch already fits.
    pub fn target_limit(&self, limit: Option<usize>, len: usize, incoming: usize) -> Option<usize> {
        let limit = limit.filter(|&limit| limit > 0)?;
        let needed = len.saturating_add(incoming);
        if needed <= limit {
            return None;
        }
        Some(needed.div_ceil(self.step).saturating_mul(self.step))
    }

    /// Grow `collection` so `incoming` new entries fit. Returns whether it grew.
    pub fn apply<T: Entity>(&self, collection: &mut TypedCollection<T>, incoming: usize) -> bool {
        let Some(target) = self.target_limit(collection.limit(), collection.len(), incoming) else {
            return false;
        };
        debug!(
            kind = T::KIND,
            len = collection.len(),
            incoming,
            target,
            "Growing collection limit for incoming batch"
        );
        collection.grow_limit(target)
    }
}

impl Default for MemberLimitPolicy {
    fn default() -> Self {
        Self::new(1000)
    }
}
