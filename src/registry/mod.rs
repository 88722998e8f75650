//! Registry internals: storage structure and dispatch orchestration.
//!
//! Layered leaves-first:
//! - `bucket` - insertion-ordered, id-indexed storage for one priority
//! - `index` - sorted priority → bucket mapping for one namespace
//! - `core` - shared orchestration (owner map, dispatch loop, eviction)
//! - `relay` / `keyed` - the two public registry shapes
//!
//! The only public API from this module is [`Relay`] and [`KeyedRelay`].

mod bucket;
mod core;
mod index;
mod keyed;
mod relay;

pub use keyed::KeyedRelay;
pub use relay::Relay;
