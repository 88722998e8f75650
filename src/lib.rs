//! # relay
//!
//! **relay** is a concurrency-safe callback registry for Rust.
//!
//! Independent producers register reaction handlers ("callbacks") with a
//! priority and an optional eviction timeout; a dispatcher later delivers a
//! single payload to every matching callback in a deterministic priority
//! order. Callbacks that go unanswered past their deadline are evicted. The
//! crate is designed as a building block for request/response matching,
//! in-process event hooks, and protocol plumbing that needs "whoever asked
//! first, answered first" semantics.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   producer   │   │   producer   │   │  dispatcher  │
//!     │ add(spec)→id │   │  remove(id)  │   │   invoke(p)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Relay / KeyedRelay                                               │
//! │  - id counter (monotonic, never reused)                           │
//! │  - owner map (id → bucket, O(1) out-of-band removal)              │
//! │  - priority index per namespace (BTreeMap, ascending)             │
//! │  - eviction timers (one-shot, advisory)                           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐      ┌──────────┐      ┌──────────┐
//!   │ bucket p1│      │ bucket p2│      │ bucket p3│   (insertion order
//!   └────┬─────┘      └────┬─────┘      └────┬─────┘    within a bucket)
//!        ▼                 ▼                 ▼
//!   callbacks…        callbacks…        callbacks…
//! ```
//!
//! ### Dispatch lifecycle
//! ```text
//! invoke(payload)
//!   ├─► snapshot buckets (ascending priority)
//!   └─► for each bucket:
//!         ├─► run every callback with a fresh Delivery
//!         │     ├─ Ok + mark_removal      ─► unregister after this delivery
//!         │     ├─ Ok + mark_short_circuit─► skip lower-priority buckets
//!         │     └─ Err / panic            ─► log, cancel, force-remove
//!         └─► next bucket (unless short-circuited)
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits            |
//! |-----------------|----------------------------------------------------------|-------------------------------|
//! | **Callbacks**   | Async reaction handlers with lifecycle flags.            | [`Callback`], [`CallbackFn`]  |
//! | **Registration**| Priority + timeout bundles, config-derived defaults.     | [`CallbackSpec`]              |
//! | **Dispatch**    | Priority-ordered delivery, inline or intra-bucket parallel. | [`Relay`], [`DispatchMode`] |
//! | **Partitioning**| Independent priority spaces per logical key.             | [`KeyedRelay`]                |
//! | **Eviction**    | One-shot timeout cancellation of unanswered callbacks.   | [`CallbackSpec::with_timeout`]|
//! | **Errors**      | Contained callback failures with stable log labels.      | [`CallbackError`]             |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use relay::{CallbackFn, CallbackSpec, Delivery, Relay, RelayConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let relay: Relay<u32> = Relay::new(RelayConfig::default());
//!
//!     let seen = Arc::new(AtomicU32::new(0));
//!     let seen_in_cb = seen.clone();
//!     let observer = CallbackFn::arc("observer", move |d: &mut Delivery<u32>| {
//!         seen_in_cb.store(*d.payload(), Ordering::SeqCst);
//!         Ok(())
//!     });
//!
//!     relay.add(CallbackSpec::new(observer).with_priority(1)).await;
//!     relay.invoke(42).await;
//!
//!     assert_eq!(seen.load(Ordering::SeqCst), 42);
//! }
//! ```
//!
//! ## Guarantees
//! - Buckets are always dispatched in ascending priority order; a bucket
//!   finishes before the next one starts.
//! - Within a bucket, callbacks run in registration order
//!   ([`DispatchMode::Inline`]) or fully concurrently
//!   ([`DispatchMode::Parallel`]), never a mix of the two.
//! - A failing or panicking callback never affects its siblings.
//! - `remove` is idempotent and safe to race against dispatch and eviction.
//! - Each registration receives at most one [`Delivery`] per invoke call.

mod callbacks;
mod config;
mod error;
mod registry;

// ---- Public re-exports ----

pub use callbacks::{Callback, CallbackFn, CallbackRef, CallbackSpec, Delivery};
pub use config::{DispatchMode, RelayConfig};
pub use error::CallbackError;
pub use registry::{KeyedRelay, Relay};
