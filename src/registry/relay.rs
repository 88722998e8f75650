//! # Flat registry - a single priority namespace.
//!
//! [`Relay`] is the single-namespace registry: one priority index, one id
//! counter, one owner map. Producers register callbacks with a priority and
//! an optional eviction timeout; a dispatcher later delivers one payload to
//! every registered callback in ascending priority order.
//!
//! ## Rules
//! - Registration, removal, invocation, and cancellation may run concurrently
//!   from arbitrary tasks; the registry owns no task of its own apart from
//!   one-shot eviction timers.
//! - An `invoke` only sees buckets that existed when it took its snapshot;
//!   callbacks registered at a *new* priority mid-dispatch become visible on
//!   the next invoke.

use std::sync::Arc;

use tracing::debug;

use crate::callbacks::CallbackSpec;
use crate::config::RelayConfig;
use crate::registry::core::RelayCore;
use crate::registry::index::PriorityIndex;

/// Concurrency-safe callback registry with priority-ordered dispatch.
///
/// Cloning is cheap and every clone operates on the same underlying state.
///
/// # Example
/// ```
/// use relay::{CallbackFn, CallbackSpec, Delivery, Relay, RelayConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let relay: Relay<u32> = Relay::new(RelayConfig::default());
///
///     let cb = CallbackFn::arc("printer", |d: &mut Delivery<u32>| {
///         println!("payload: {}", d.payload());
///         Ok(())
///     });
///     let id = relay.add(CallbackSpec::new(cb).with_priority(1)).await;
///
///     relay.invoke(42).await; // printer reacts with 42 and stays registered
///     relay.remove(id).await; // printer's cancel runs once
/// }
/// ```
pub struct Relay<T> {
    core: Arc<RelayCore<T>>,
    index: Arc<PriorityIndex<T>>,
    config: RelayConfig,
}

impl<T: Send + Sync + 'static> Relay<T> {
    /// Creates an empty registry with the given configuration.
    pub fn new(config: RelayConfig) -> Self {
        Self {
            core: RelayCore::new(config.dispatch),
            index: Arc::new(PriorityIndex::new()),
            config,
        }
    }

    /// Returns the registry configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Registers a callback and returns its id.
    ///
    /// Ids are allocated from a monotonically increasing counter and never
    /// reused. If the spec carries a timeout, a one-shot eviction fires after
    /// it elapses; the deadline is fixed at registration time and is not
    /// extended by reactions.
    pub async fn add(&self, spec: CallbackSpec<T>) -> u64 {
        let id = self.core.allocate_id();
        debug!(callback = spec.name(), id, priority = spec.priority(), "callback registered");
        let bucket = self.index.bucket(spec.priority());
        bucket.lock().await.push(id, spec.callback().clone());
        self.core.register(id, bucket, spec.timeout());
        id
    }

    /// Delivers `payload` to every registered callback, buckets in ascending
    /// priority order, honoring removal and short-circuit flags.
    ///
    /// Callback failures are contained: they are logged, the failing callback
    /// is removed, and dispatch of the remaining callbacks proceeds.
    pub async fn invoke(&self, payload: T) {
        self.core
            .dispatch(self.index.snapshot(), Arc::new(payload))
            .await;
    }

    /// Removes a registration by id and runs its callback's `cancel`.
    ///
    /// Unknown ids are a silent no-op, so this is safe to race against
    /// concurrent dispatch, double removal, and timeout eviction.
    pub async fn remove(&self, id: u64) {
        self.core.remove(id).await;
    }

    /// Cancels every registration: the index is cleared first (no new
    /// dispatch can find the buckets), then each callback's `cancel` runs.
    pub async fn cancel_all(&self) {
        self.core.cancel_buckets(self.index.take_all()).await;
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.core.live()
    }

    /// True if no registrations are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Send + Sync + 'static> Default for Relay<T> {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}

impl<T> Clone for Relay<T> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            index: self.index.clone(),
            config: self.config.clone(),
        }
    }
}
