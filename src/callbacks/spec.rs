//! # Registration specification.
//!
//! Defines [`CallbackSpec`], a bundle describing how a callback should be
//! registered (priority, eviction timeout).
//!
//! A spec can be created:
//! - **Explicitly** with [`CallbackSpec::new`] plus the builder methods
//! - **From config** with [`CallbackSpec::with_defaults`] (inherit defaults)

use std::time::Duration;

use crate::callbacks::callback::CallbackRef;
use crate::config::RelayConfig;

/// Specification for registering a callback.
///
/// Bundles together:
/// - The callback itself ([`CallbackRef`])
/// - Its priority (lower value = delivered first)
/// - An optional eviction timeout
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use relay::{CallbackFn, CallbackSpec, Delivery, RelayConfig};
///
/// let cb = CallbackFn::arc("audit", |d: &mut Delivery<u64>| {
///     println!("audit: {}", d.payload());
///     Ok(())
/// });
///
/// // Explicit configuration:
/// let spec = CallbackSpec::new(cb.clone())
///     .with_priority(-10)
///     .with_timeout(Some(Duration::from_secs(30)));
/// assert_eq!(spec.priority(), -10);
///
/// // Inherit from registry config:
/// let cfg = RelayConfig::default();
/// let spec2 = CallbackSpec::with_defaults(cb, &cfg);
/// // `cfg.timeout = 0s` is treated as `None`
/// assert!(spec2.timeout().is_none());
/// ```
pub struct CallbackSpec<T> {
    callback: CallbackRef<T>,
    priority: i32,
    timeout: Option<Duration>,
}

impl<T> CallbackSpec<T> {
    /// Creates a specification with `priority = 0` and no timeout.
    pub fn new(callback: CallbackRef<T>) -> Self {
        Self {
            callback,
            priority: 0,
            timeout: None,
        }
    }

    /// Creates a specification inheriting priority and timeout from config.
    ///
    /// Uses [`RelayConfig::default_timeout`] so that `0s` in config is
    /// treated as `None`.
    pub fn with_defaults(callback: CallbackRef<T>, cfg: &RelayConfig) -> Self {
        Self {
            callback,
            priority: cfg.priority,
            timeout: cfg.default_timeout(),
        }
    }

    /// Returns a new spec with updated priority. Lower value = delivered first.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Returns a new spec with updated eviction timeout.
    ///
    /// The deadline is fixed at registration time: reacting does **not**
    /// extend it. A registration that should outlive its deadline must be
    /// re-registered.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns reference to the callback.
    pub fn callback(&self) -> &CallbackRef<T> {
        &self.callback
    }

    /// Convenience: returns the callback name.
    pub fn name(&self) -> &'static str {
        self.callback.name()
    }

    /// Returns the priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the eviction timeout, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl<T> Clone for CallbackSpec<T> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback.clone(),
            priority: self.priority,
            timeout: self.timeout,
        }
    }
}
