//! # Registry core - shared orchestration for flat and keyed registries.
//!
//! [`RelayCore`] owns everything that is common to both registry shapes:
//! the global id→bucket owner map (O(1) removal regardless of priority or
//! key), the monotonically increasing id counter, the failure-isolated
//! dispatch loop, and the one-shot timeout eviction.
//!
//! ## Dispatch flow
//! ```text
//! invoke(payload)
//!   └─► index.snapshot()            (buckets ascending by priority)
//!         for each bucket:
//!           ├─ Inline:   lock bucket ─► run callbacks in registration order
//!           └─ Parallel: snapshot pairs ─► spawn all ─► await all ─► re-lock, apply flags
//!           │
//!           ├─ mark_removal / failure ─► unlink from bucket + owner map
//!           └─ mark_short_circuit ─► finish this bucket, skip the rest
//! ```
//!
//! ## Rules
//! - Buckets are always visited in ascending priority order; the next bucket
//!   starts only after every callback of the current one has completed.
//! - A short-circuit flag never pre-empts mid-bucket.
//! - Errors and panics inside one callback are reported and contained; the
//!   failing callback is removed, siblings are unaffected.
//! - Eviction is advisory-once: each timeout fires exactly one `remove`
//!   attempt, which is a silent no-op if the id is already gone.
//! - Timer tasks hold only a `Weak` reference to the core and race a
//!   shutdown token cancelled on drop, so a dropped registry leaves no live
//!   timers behind.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::callbacks::{CallbackRef, Delivery};
use crate::config::DispatchMode;
use crate::error::CallbackError;
use crate::registry::index::SharedBucket;

/// Outcome flags of one callback reaction, read by the dispatch loop.
struct Outcome {
    id: u64,
    remove: bool,
    short_circuit: bool,
}

/// Shared state and orchestration logic behind `Relay` and `KeyedRelay`.
pub(crate) struct RelayCore<T> {
    /// Global id → owning bucket. Lookup only; the bucket owns the callback.
    owners: DashMap<u64, SharedBucket<T>>,
    /// Ids start at 1 and are never reused.
    next_id: AtomicU64,
    mode: DispatchMode,
    /// Cancelled on drop; pending eviction timers exit promptly.
    shutdown: CancellationToken,
    /// Self-reference handed to eviction timers; never upgraded while the
    /// registry is gone, so timers cannot keep the core alive.
    weak: Weak<RelayCore<T>>,
}

impl<T: Send + Sync + 'static> RelayCore<T> {
    pub(crate) fn new(mode: DispatchMode) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            owners: DashMap::new(),
            next_id: AtomicU64::new(1),
            mode,
            shutdown: CancellationToken::new(),
            weak: weak.clone(),
        })
    }

    /// Allocates the next registration id. Ids are never reused, so a stale
    /// id can never alias a newer registration.
    pub(crate) fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of live registrations across all priorities and partitions.
    pub(crate) fn live(&self) -> usize {
        self.owners.len()
    }

    /// Records bucket ownership for `id` and arms the eviction timer.
    ///
    /// Must be called after the callback has been appended to `bucket`.
    pub(crate) fn register(&self, id: u64, bucket: SharedBucket<T>, timeout: Option<Duration>) {
        self.owners.insert(id, bucket);
        if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
            self.schedule_eviction(id, timeout);
        }
    }

    /// Arms a one-shot eviction: after `timeout`, one `remove(id)` attempt.
    ///
    /// The deadline is fixed at registration time; reactions in between do
    /// not extend it. If the id is already gone when the timer fires, the
    /// attempt is a silent no-op.
    fn schedule_eviction(&self, id: u64, timeout: Duration) {
        let core = self.weak.clone();
        let shutdown = self.shutdown.clone();
        debug!(id, ?timeout, "eviction scheduled");

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = time::sleep(timeout) => {
                    if let Some(core) = Weak::upgrade(&core) {
                        debug!(id, "eviction deadline elapsed");
                        core.remove(id).await;
                    }
                }
            }
        });
    }

    /// Removes a registration by id and cancels its callback.
    ///
    /// Unknown ids (already removed, evicted, or never registered) are a
    /// silent no-op, which makes this safe to race against concurrent
    /// dispatch and timer firing.
    pub(crate) async fn remove(&self, id: u64) {
        let Some((_, bucket)) = self.owners.remove(&id) else {
            return;
        };

        let callback = { bucket.lock().await.remove(id) };
        if let Some(callback) = callback {
            cancel_callback(id, callback).await;
        }
    }

    /// Delivers `payload` to every callback of `buckets`, in order.
    ///
    /// `buckets` is a priority-ascending snapshot taken by the caller;
    /// buckets created after the snapshot are invisible to this round.
    pub(crate) async fn dispatch(&self, buckets: Vec<SharedBucket<T>>, payload: Arc<T>) {
        for bucket in buckets {
            let short_circuit = match self.mode {
                DispatchMode::Inline => self.dispatch_inline(&bucket, &payload).await,
                DispatchMode::Parallel => self.dispatch_parallel(&bucket, &payload).await,
            };
            if short_circuit {
                break;
            }
        }
    }

    /// Runs one bucket inline: registration order, bucket lock held
    /// throughout, flags applied after each reaction.
    async fn dispatch_inline(&self, bucket: &SharedBucket<T>, payload: &Arc<T>) -> bool {
        let mut guard = bucket.lock().await;
        let round: Vec<u64> = guard.iter().map(|(id, _)| id).collect();

        let mut short_circuit = false;
        for id in round {
            // Membership re-check: a prior reaction may have removed this id.
            let Some(callback) = guard.get(id).cloned() else {
                continue;
            };

            let outcome = run_callback(id, callback, Arc::clone(payload)).await;
            if outcome.remove {
                guard.remove(id);
                self.owners.remove(&id);
            }
            short_circuit |= outcome.short_circuit;
        }
        short_circuit
    }

    /// Runs one bucket in parallel: every callback is spawned before any
    /// result is awaited; completions are unordered. The bucket lock is only
    /// held to snapshot the pairs and to apply removals afterwards, never
    /// while a callback runs.
    async fn dispatch_parallel(&self, bucket: &SharedBucket<T>, payload: &Arc<T>) -> bool {
        let round: Vec<(u64, CallbackRef<T>)> = {
            let guard = bucket.lock().await;
            let mut round = Vec::with_capacity(guard.len());
            round.extend(guard.iter().map(|(id, cb)| (id, cb.clone())));
            round
        };

        let mut running = JoinSet::new();
        for (id, callback) in round {
            running.spawn(run_callback(id, callback, Arc::clone(payload)));
        }

        let mut short_circuit = false;
        let mut removals = Vec::new();
        while let Some(joined) = running.join_next().await {
            // run_callback contains panics itself, so a join error means the
            // task was aborted externally; nothing to account for.
            let Ok(outcome) = joined else { continue };
            if outcome.remove {
                removals.push(outcome.id);
            }
            short_circuit |= outcome.short_circuit;
        }

        if !removals.is_empty() {
            let mut guard = bucket.lock().await;
            for id in removals {
                guard.remove(id);
                self.owners.remove(&id);
            }
        }
        short_circuit
    }

    /// Cancels every callback found in `buckets` and empties them.
    ///
    /// The caller has already detached the buckets from their index
    /// (`take_all`), so no new dispatch round can reach them. Order across
    /// buckets is not significant for cancellation.
    pub(crate) async fn cancel_buckets(&self, buckets: Vec<SharedBucket<T>>) {
        for bucket in buckets {
            let drained = { bucket.lock().await.drain() };
            for (id, callback) in drained {
                self.owners.remove(&id);
                cancel_callback(id, callback).await;
            }
        }
    }
}

impl<T> Drop for RelayCore<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Executes one reaction with full failure isolation.
///
/// Errors and panics are reported with the callback's identity; the callback
/// is then cancelled (best effort) and flagged for unconditional removal.
/// Flags the callback managed to set before failing are still honored for
/// short-circuit accounting.
async fn run_callback<T: Send + Sync + 'static>(
    id: u64,
    callback: CallbackRef<T>,
    payload: Arc<T>,
) -> Outcome {
    let mut delivery = Delivery::new(payload);

    let reaction = std::panic::AssertUnwindSafe(callback.react(&mut delivery))
        .catch_unwind()
        .await;
    let failure = match reaction {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(_) => Some(CallbackError::Panicked),
    };

    match failure {
        None => Outcome {
            id,
            remove: delivery.is_marked_for_removal(),
            short_circuit: delivery.is_marked_short_circuit(),
        },
        Some(err) => {
            error!(
                callback = callback.name(),
                id,
                label = err.as_label(),
                "callback reaction failed: {}; removing it",
                err.as_message()
            );
            cancel_callback(id, callback).await;
            Outcome {
                id,
                remove: true,
                short_circuit: delivery.is_marked_short_circuit(),
            }
        }
    }
}

/// Invokes `cancel` with the same isolation as reactions: failures and
/// panics are reported and swallowed so sibling cancellations proceed.
async fn cancel_callback<T: Send + Sync + 'static>(id: u64, callback: CallbackRef<T>) {
    let cancellation = std::panic::AssertUnwindSafe(callback.cancel())
        .catch_unwind()
        .await;
    match cancellation {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            error!(
                callback = callback.name(),
                id,
                label = err.as_label(),
                "callback cancellation failed: {}",
                err.as_message()
            );
        }
        Err(_) => {
            error!(callback = callback.name(), id, "callback panicked during cancel");
        }
    }
}
