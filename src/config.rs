//! # Registry configuration.
//!
//! Provides [`RelayConfig`], centralized defaults for a registry instance.
//!
//! Config is used in two ways:
//! 1. **Registry creation**: `Relay::new(config)` / `KeyedRelay::new(config)`
//! 2. **Registration defaults**: `CallbackSpec::with_defaults(callback, &config)`
//!
//! ## Sentinel values
//! - `timeout = 0s` → no eviction deadline (treated as `None` by
//!   [`RelayConfig::default_timeout`])

use std::time::Duration;

/// Per-bucket execution strategy used by `invoke`.
///
/// In both modes buckets are always processed strictly in ascending priority
/// order; the mode only changes how callbacks **within one bucket** run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Callbacks run one after another, in registration order, on the
    /// invoking task. The bucket's lock is held for the duration of the
    /// bucket, so a slow callback serializes concurrent mutation of its own
    /// bucket only.
    #[default]
    Inline,

    /// Every callback of the bucket is spawned before any result is awaited;
    /// completions within the bucket are unordered. No lock is held while a
    /// callback runs, so callback code cannot block unrelated registry
    /// operations.
    Parallel,
}

/// Configuration for a registry instance.
///
/// ## Field semantics
/// - `priority`: default priority for registrations created via
///   [`CallbackSpec::with_defaults`](crate::CallbackSpec::with_defaults);
///   lower values are dispatched earlier
/// - `timeout`: default eviction deadline (`0s` = no deadline)
/// - `dispatch`: per-bucket execution strategy
///
/// All fields are public for flexibility. Prefer [`RelayConfig::default_timeout`]
/// over checking the `0s` sentinel at call sites.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Default priority for new registrations. Lower value = delivered first.
    pub priority: i32,

    /// Default eviction timeout for new registrations.
    ///
    /// A registration that is neither invoked-and-self-removed nor explicitly
    /// removed within this window is evicted: its `cancel` runs once and its
    /// id becomes unknown. `0s` disables the deadline.
    pub timeout: Duration,

    /// How callbacks within one priority bucket are executed.
    pub dispatch: DispatchMode,
}

impl Default for RelayConfig {
    /// Provides a default configuration:
    /// - `priority = 0`
    /// - `timeout = 0s` (no eviction)
    /// - `dispatch = DispatchMode::Inline`
    fn default() -> Self {
        Self {
            priority: 0,
            timeout: Duration::from_secs(0),
            dispatch: DispatchMode::Inline,
        }
    }
}

impl RelayConfig {
    /// Returns the default timeout, mapping the `0s` sentinel to `None`.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use relay::RelayConfig;
    ///
    /// let mut cfg = RelayConfig::default();
    /// assert_eq!(cfg.default_timeout(), None);
    ///
    /// cfg.timeout = Duration::from_millis(250);
    /// assert_eq!(cfg.default_timeout(), Some(Duration::from_millis(250)));
    /// ```
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.priority, 0);
        assert_eq!(cfg.dispatch, DispatchMode::Inline);
        assert_eq!(cfg.default_timeout(), None);
    }

    #[test]
    fn test_zero_timeout_is_none() {
        let cfg = RelayConfig {
            timeout: Duration::from_secs(0),
            ..RelayConfig::default()
        };
        assert_eq!(cfg.default_timeout(), None);
    }
}
