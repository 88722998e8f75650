//! # Keyed registry - independent priority spaces per logical key.
//!
//! [`KeyedRelay`] adds a key dimension above the flat registry's mechanics:
//! each key owns its own priority index, so invoking key `K` only reaches
//! callbacks registered under `K`. A reserved "no key" partition backs the
//! unkeyed operations, coexisting with the keyed ones under a single shared
//! id counter and owner map, so removal by id works uniformly no matter
//! which partition a registration lives in.
//!
//! ## Rules
//! - Unknown keys on `invoke`/`cancel` are silent no-ops, not errors.
//! - `cancel(key)` detaches the whole partition before cancelling, so no
//!   concurrent invoke can reach a callback that is being cancelled; the
//!   partition entry is pruned and recreated lazily on the next `add`.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::callbacks::CallbackSpec;
use crate::config::RelayConfig;
use crate::registry::core::RelayCore;
use crate::registry::index::PriorityIndex;

/// Callback registry partitioned by key, with an extra unkeyed partition.
///
/// Cloning is cheap and every clone operates on the same underlying state.
///
/// # Example
/// ```
/// use relay::{CallbackFn, CallbackSpec, Delivery, KeyedRelay, RelayConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let relay: KeyedRelay<&'static str, u32> = KeyedRelay::new(RelayConfig::default());
///
///     let cb = CallbackFn::arc("orders", |d: &mut Delivery<u32>| {
///         println!("order update: {}", d.payload());
///         Ok(())
///     });
///     relay.add("orders", CallbackSpec::new(cb)).await;
///
///     relay.invoke(&"orders", 7).await;   // reacts
///     relay.invoke(&"billing", 7).await;  // different partition: no-op
/// }
/// ```
pub struct KeyedRelay<K, T> {
    core: Arc<RelayCore<T>>,
    /// `None` is the reserved unkeyed partition.
    partitions: Arc<DashMap<Option<K>, Arc<PriorityIndex<T>>>>,
    config: RelayConfig,
}

impl<K, T> KeyedRelay<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Creates an empty keyed registry with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            core: RelayCore::new(config.dispatch),
            partitions: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Returns the registry configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Registers a callback under `key` and returns its id.
    ///
    /// Ids come from the counter shared with the unkeyed partition, so
    /// [`KeyedRelay::remove`] works on any id regardless of how it was added.
    pub async fn add(&self, key: K, spec: CallbackSpec<T>) -> u64 {
        self.add_to(Some(key), spec).await
    }

    /// Registers a callback in the reserved unkeyed partition.
    pub async fn add_unkeyed(&self, spec: CallbackSpec<T>) -> u64 {
        self.add_to(None, spec).await
    }

    async fn add_to(&self, key: Option<K>, spec: CallbackSpec<T>) -> u64 {
        let id = self.core.allocate_id();
        debug!(
            callback = spec.name(),
            id,
            priority = spec.priority(),
            keyed = key.is_some(),
            "callback registered"
        );
        let index = {
            let entry = self
                .partitions
                .entry(key)
                .or_insert_with(|| Arc::new(PriorityIndex::new()));
            Arc::clone(&entry)
        };

        let bucket = index.bucket(spec.priority());
        bucket.lock().await.push(id, spec.callback().clone());
        self.core.register(id, bucket, spec.timeout());
        id
    }

    /// Delivers `payload` to the partition for `key` only.
    ///
    /// Unknown keys are a silent no-op.
    pub async fn invoke(&self, key: &K, payload: T) {
        if let Some(index) = self.lookup(Some(key)) {
            self.core.dispatch(index.snapshot(), Arc::new(payload)).await;
        }
    }

    /// Delivers `payload` to the unkeyed partition only. Callbacks
    /// registered under an explicit key never react here.
    pub async fn invoke_unkeyed(&self, payload: T) {
        if let Some(index) = self.lookup(None) {
            self.core.dispatch(index.snapshot(), Arc::new(payload)).await;
        }
    }

    /// Cancels every registration under `key` and prunes the partition.
    ///
    /// Unknown keys are a silent no-op.
    pub async fn cancel(&self, key: &K) {
        if let Some((_, index)) = self.partitions.remove(&Some(key.clone())) {
            self.core.cancel_buckets(index.take_all()).await;
        }
    }

    /// Cancels every registration in the unkeyed partition.
    pub async fn cancel_unkeyed(&self) {
        if let Some((_, index)) = self.partitions.remove(&None) {
            self.core.cancel_buckets(index.take_all()).await;
        }
    }

    /// Removes a registration by id and runs its callback's `cancel`,
    /// whichever partition it lives in. Unknown ids are a silent no-op.
    pub async fn remove(&self, id: u64) {
        self.core.remove(id).await;
    }

    /// Number of live registrations across all partitions.
    pub fn len(&self) -> usize {
        self.core.live()
    }

    /// True if no registrations are live in any partition.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: Option<&K>) -> Option<Arc<PriorityIndex<T>>> {
        let key = key.cloned();
        self.partitions.get(&key).map(|entry| Arc::clone(&entry))
    }
}

impl<K, T> Clone for KeyedRelay<K, T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            partitions: self.partitions.clone(),
            config: self.config.clone(),
        }
    }
}

impl<K, T> Default for KeyedRelay<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
