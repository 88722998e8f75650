//! # Priority index - sorted mapping from priority to bucket.
//!
//! [`PriorityIndex`] owns the buckets of one namespace (a flat registry, or
//! one partition of a keyed registry). Buckets are created lazily on first
//! registration at a priority and shared as [`SharedBucket`] handles, so a
//! dispatch round can hold bucket references after the structural lock is
//! released.
//!
//! The structural lock only guards the map itself (create / snapshot / take);
//! bucket contents are guarded by each bucket's own async lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::registry::bucket::Bucket;

/// A bucket shared between the index, the global owner map, and in-flight
/// dispatch rounds. The async lock is held across inline reactions.
pub(crate) type SharedBucket<T> = Arc<tokio::sync::Mutex<Bucket<T>>>;

/// Sorted priority → bucket mapping for one namespace.
pub(crate) struct PriorityIndex<T> {
    buckets: Mutex<BTreeMap<i32, SharedBucket<T>>>,
}

impl<T> PriorityIndex<T> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the bucket for `priority`, creating it lazily.
    pub(crate) fn bucket(&self, priority: i32) -> SharedBucket<T> {
        self.buckets
            .lock()
            .entry(priority)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Bucket::new())))
            .clone()
    }

    /// Point-in-time snapshot of the existing buckets, priority ascending.
    ///
    /// The snapshot fixes *which* buckets a dispatch round sees; their
    /// contents may still mutate concurrently under the per-bucket locks.
    pub(crate) fn snapshot(&self) -> Vec<SharedBucket<T>> {
        self.buckets.lock().values().cloned().collect()
    }

    /// Empties the index and returns the removed buckets, priority ascending.
    ///
    /// Used by the cancel paths: clearing first guarantees no new dispatch
    /// round can find these buckets while their callbacks are cancelled.
    pub(crate) fn take_all(&self) -> Vec<SharedBucket<T>> {
        let mut buckets = self.buckets.lock();
        std::mem::take(&mut *buckets).into_values().collect()
    }
}
