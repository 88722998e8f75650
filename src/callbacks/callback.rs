//! # Callback trait.
//!
//! Provides [`Callback`], the extension point for plugging reaction handlers
//! into a registry.
//!
//! Each registered callback gets:
//! - **A fresh [`Delivery`] per invoke** (payload + outcome flags)
//! - **Failure isolation** (errors and panics are caught and reported; sibling
//!   callbacks are unaffected)
//! - **Repeatable semantics by default** (a callback stays registered until it
//!   marks itself for removal, is removed by id, or is evicted on timeout)
//!
//! ## Rules
//! - A failing `react` removes the callback: its `cancel` runs as best-effort
//!   cleanup and the id becomes unknown.
//! - `cancel` runs at most once per registration, and only when the callback
//!   is evicted without having removed itself (timeout, explicit removal, or
//!   batch cancellation).

use async_trait::async_trait;
use std::sync::Arc;

use crate::callbacks::delivery::Delivery;
use crate::error::CallbackError;

/// Shared callback handle stored by the registry.
pub type CallbackRef<T> = Arc<dyn Callback<T>>;

/// Reaction handler for payloads delivered through a registry.
///
/// Implementations react to each delivery and steer their own lifecycle
/// through the [`Delivery`] flags:
/// - [`Delivery::mark_removal`]: deregister after this delivery
/// - [`Delivery::mark_short_circuit`]: skip lower-priority buckets for this
///   invoke call
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use relay::{Callback, CallbackError, Delivery};
///
/// struct FirstResponder;
///
/// #[async_trait]
/// impl Callback<String> for FirstResponder {
///     async fn react(&self, delivery: &mut Delivery<String>) -> Result<(), CallbackError> {
///         println!("got: {}", delivery.payload());
///         delivery.mark_removal(); // one-shot
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str { "first-responder" }
/// }
/// ```
#[async_trait]
pub trait Callback<T>: Send + Sync {
    /// Reacts to one delivered payload.
    ///
    /// Called once per `invoke` that reaches this callback's bucket. Returning
    /// an error removes the callback from the registry after a best-effort
    /// `cancel`; the error never propagates to sibling callbacks or to the
    /// invoking caller.
    ///
    /// In [`DispatchMode::Inline`](crate::DispatchMode::Inline) the bucket's
    /// lock is held while `react` runs, so implementations must not call
    /// registry operations that touch their own bucket from here; use
    /// [`Delivery::mark_removal`] instead of `remove`.
    async fn react(&self, delivery: &mut Delivery<T>) -> Result<(), CallbackError>;

    /// Runs when the callback is evicted without having reacted its way out:
    /// explicit `remove`, timeout eviction, batch cancellation, or cleanup
    /// after a failed reaction.
    ///
    /// Failures here are logged and swallowed.
    async fn cancel(&self) -> Result<(), CallbackError> {
        Ok(())
    }

    /// Returns the callback name used in failure logs.
    ///
    /// Prefer short, descriptive names. The default uses `type_name::<Self>()`,
    /// which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
