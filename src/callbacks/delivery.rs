//! # Per-reaction delivery context.
//!
//! A [`Delivery`] is created fresh for each (callback, invoke) pair, wraps the
//! delivered payload, and carries two write-once outcome flags that the
//! dispatcher reads after the reaction completes:
//!
//! - `mark_removal`: deregister this callback after the current delivery
//! - `mark_short_circuit`: stop processing lower-priority buckets for the
//!   current invoke call
//!
//! The context lives for exactly one reaction and is discarded once the flags
//! have been read.

use std::sync::Arc;

/// Mutable per-reaction state handed to [`Callback::react`](crate::Callback::react).
pub struct Delivery<T> {
    payload: Arc<T>,
    remove: bool,
    short_circuit: bool,
}

impl<T> Delivery<T> {
    pub(crate) fn new(payload: Arc<T>) -> Self {
        Self {
            payload,
            remove: false,
            short_circuit: false,
        }
    }

    /// Returns the delivered payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Requests deregistration of this callback once the current delivery
    /// completes. Without this flag a callback keeps reacting on every
    /// subsequent invoke until removed or evicted.
    pub fn mark_removal(&mut self) {
        self.remove = true;
    }

    /// Requests that no further, lower-priority buckets are processed during
    /// the current invoke call.
    ///
    /// Callbacks sharing this bucket still complete; the flag takes effect at
    /// the bucket boundary.
    pub fn mark_short_circuit(&mut self) {
        self.short_circuit = true;
    }

    /// True if [`Delivery::mark_removal`] was called during this reaction.
    pub fn is_marked_for_removal(&self) -> bool {
        self.remove
    }

    /// True if [`Delivery::mark_short_circuit`] was called during this reaction.
    pub fn is_marked_short_circuit(&self) -> bool {
        self.short_circuit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_start_unset() {
        let delivery = Delivery::new(Arc::new(7_u32));
        assert_eq!(*delivery.payload(), 7);
        assert!(!delivery.is_marked_for_removal());
        assert!(!delivery.is_marked_short_circuit());
    }

    #[test]
    fn test_flags_are_independent() {
        let mut delivery = Delivery::new(Arc::new("payload"));
        delivery.mark_removal();
        assert!(delivery.is_marked_for_removal());
        assert!(!delivery.is_marked_short_circuit());

        delivery.mark_short_circuit();
        assert!(delivery.is_marked_short_circuit());
    }
}
