//! # Callback abstractions and registration specifications.
//!
//! This module provides the callback-facing types:
//! - [`Callback`] - trait for implementing async reaction handlers
//! - [`CallbackFn`] - closure-backed callback implementation
//! - [`CallbackRef`] - shared handle (`Arc<dyn Callback>`) used by the registry
//! - [`CallbackSpec`] - registration bundle (callback + priority + timeout)
//! - [`Delivery`] - per-reaction context carrying the payload and outcome flags

mod callback;
mod callback_fn;
mod delivery;
mod spec;

pub use callback::{Callback, CallbackRef};
pub use callback_fn::CallbackFn;
pub use delivery::Delivery;
pub use spec::CallbackSpec;
