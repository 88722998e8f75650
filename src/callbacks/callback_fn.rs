//! # Closure-backed callback implementation.
//!
//! [`CallbackFn`] wraps a plain closure as a [`Callback`], which covers the
//! common case of short, synchronous reactions (record the payload, flip a
//! flag, resolve a waiter). Callbacks that need to await inside `react`
//! implement [`Callback`] directly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::callbacks::callback::{Callback, CallbackRef};
use crate::callbacks::delivery::Delivery;
use crate::error::CallbackError;

type ReactFn<T> = Box<dyn Fn(&mut Delivery<T>) -> Result<(), CallbackError> + Send + Sync>;
type CancelFn = Box<dyn Fn() -> Result<(), CallbackError> + Send + Sync>;

/// Function-backed callback.
///
/// The reaction closure receives the [`Delivery`] context; an optional cancel
/// closure runs when the registration is evicted (timeout, removal by id, or
/// batch cancellation).
///
/// # Example
/// ```
/// use relay::{CallbackFn, Delivery};
///
/// let one_shot = CallbackFn::new("one-shot", |delivery: &mut Delivery<u32>| {
///     println!("payload: {}", delivery.payload());
///     delivery.mark_removal();
///     Ok(())
/// })
/// .on_cancel(|| {
///     println!("evicted before any delivery");
///     Ok(())
/// })
/// .into_arc();
/// # let _ = one_shot;
/// ```
pub struct CallbackFn<T> {
    name: &'static str,
    react: ReactFn<T>,
    cancel: Option<CancelFn>,
}

impl<T: Send + Sync + 'static> CallbackFn<T> {
    /// Creates a callback from a reaction closure.
    pub fn new<F>(name: &'static str, react: F) -> Self
    where
        F: Fn(&mut Delivery<T>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self {
            name,
            react: Box::new(react),
            cancel: None,
        }
    }

    /// Attaches a cancellation closure, invoked when the registration is
    /// evicted without having removed itself.
    pub fn on_cancel<F>(mut self, cancel: F) -> Self
    where
        F: Fn() -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.cancel = Some(Box::new(cancel));
        self
    }

    /// Wraps the callback in the [`CallbackRef`] handle the registry stores.
    pub fn into_arc(self) -> CallbackRef<T> {
        Arc::new(self)
    }

    /// Shorthand for `CallbackFn::new(name, react).into_arc()`.
    pub fn arc<F>(name: &'static str, react: F) -> CallbackRef<T>
    where
        F: Fn(&mut Delivery<T>) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        Self::new(name, react).into_arc()
    }
}

#[async_trait]
impl<T: Send + Sync + 'static> Callback<T> for CallbackFn<T> {
    async fn react(&self, delivery: &mut Delivery<T>) -> Result<(), CallbackError> {
        (self.react)(delivery)
    }

    async fn cancel(&self) -> Result<(), CallbackError> {
        match &self.cancel {
            Some(cancel) => cancel(),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_react_closure_runs_and_sees_payload() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_cb = seen.clone();
        let cb = CallbackFn::new("probe", move |delivery: &mut Delivery<usize>| {
            seen_in_cb.store(*delivery.payload(), Ordering::SeqCst);
            Ok(())
        });

        let mut delivery = Delivery::new(Arc::new(42));
        cb.react(&mut delivery).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(cb.name(), "probe");
    }

    #[tokio::test]
    async fn test_cancel_defaults_to_ok() {
        let cb: CallbackFn<u32> = CallbackFn::new("silent", |_| Ok(()));
        assert!(cb.cancel().await.is_ok());
    }

    #[tokio::test]
    async fn test_on_cancel_hook_runs() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let hook = cancelled.clone();
        let cb: CallbackFn<u32> = CallbackFn::new("waiter", |_| Ok(())).on_cancel(move || {
            hook.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        cb.cancel().await.unwrap();
        assert_eq!(cancelled.load(Ordering::SeqCst), 1);
    }
}
