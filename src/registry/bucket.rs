//! # Priority bucket - ordered, id-indexed callback storage.
//!
//! A [`Bucket`] holds every registration sharing one priority value, in
//! first-registered-first-delivered order. It is an arena of slots linked by
//! prev/next indices, with an id→slot map on the side:
//!
//! - `push` appends at the tail in O(1)
//! - `remove` unlinks by id in O(1) (no scan)
//! - `iter` walks insertion order
//! - freed slots are recycled through a free list; slot indices stay stable
//!   for the remaining elements, so a traversal snapshot taken before a
//!   removal remains valid
//!
//! ## Rules
//! - An id appears in at most one bucket system-wide (enforced by the
//!   registry's global id counter, not by the bucket).
//! - The bucket is not internally synchronized; callers guard it with the
//!   per-bucket lock (see `SharedBucket` in the index module).

use std::collections::HashMap;

use crate::callbacks::CallbackRef;

struct Slot<T> {
    id: u64,
    callback: CallbackRef<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Insertion-ordered set of registrations sharing one priority value.
pub(crate) struct Bucket<T> {
    slots: Vec<Option<Slot<T>>>,
    ids: HashMap<u64, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Vec<usize>,
}

impl<T> Bucket<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            ids: HashMap::new(),
            head: None,
            tail: None,
            free: Vec::new(),
        }
    }

    /// Appends a registration at the tail.
    pub(crate) fn push(&mut self, id: u64, callback: CallbackRef<T>) {
        let slot = Slot {
            id,
            callback,
            prev: self.tail,
            next: None,
        };

        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };

        if let Some(tail) = self.tail {
            if let Some(Some(prev)) = self.slots.get_mut(tail) {
                prev.next = Some(idx);
            }
        } else {
            self.head = Some(idx);
        }
        self.tail = Some(idx);
        self.ids.insert(id, idx);
    }

    /// Unlinks a registration by id in O(1).
    ///
    /// Returns `None` if the id is not in this bucket (already removed).
    pub(crate) fn remove(&mut self, id: u64) -> Option<CallbackRef<T>> {
        let idx = self.ids.remove(&id)?;
        let slot = self.slots.get_mut(idx)?.take()?;

        match slot.prev {
            Some(prev) => {
                if let Some(Some(p)) = self.slots.get_mut(prev) {
                    p.next = slot.next;
                }
            }
            None => self.head = slot.next,
        }
        match slot.next {
            Some(next) => {
                if let Some(Some(n)) = self.slots.get_mut(next) {
                    n.prev = slot.prev;
                }
            }
            None => self.tail = slot.prev,
        }

        self.free.push(idx);
        Some(slot.callback)
    }

    /// Looks up a registration without unlinking it.
    pub(crate) fn get(&self, id: u64) -> Option<&CallbackRef<T>> {
        let idx = *self.ids.get(&id)?;
        self.slots.get(idx)?.as_ref().map(|slot| &slot.callback)
    }

    /// Walks registrations in insertion order.
    pub(crate) fn iter(&self) -> BucketIter<'_, T> {
        BucketIter {
            bucket: self,
            cursor: self.head,
        }
    }

    /// Detaches every registration, returning them in insertion order.
    pub(crate) fn drain(&mut self) -> Vec<(u64, CallbackRef<T>)> {
        let mut drained = Vec::with_capacity(self.ids.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            match self.slots.get_mut(idx).and_then(Option::take) {
                Some(slot) => {
                    cursor = slot.next;
                    drained.push((slot.id, slot.callback));
                }
                None => break,
            }
        }

        self.slots.clear();
        self.ids.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        drained
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub(crate) struct BucketIter<'a, T> {
    bucket: &'a Bucket<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for BucketIter<'a, T> {
    type Item = (u64, &'a CallbackRef<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let slot = self.bucket.slots.get(idx)?.as_ref()?;
        self.cursor = slot.next;
        Some((slot.id, &slot.callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{CallbackFn, Delivery};

    fn noop(id: u64) -> (u64, CallbackRef<u32>) {
        (id, CallbackFn::arc("noop", |_: &mut Delivery<u32>| Ok(())))
    }

    fn ids_in_order(bucket: &Bucket<u32>) -> Vec<u64> {
        bucket.iter().map(|(id, _)| id).collect()
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let mut bucket = Bucket::new();
        for id in [10, 11, 12] {
            let (id, cb) = noop(id);
            bucket.push(id, cb);
        }
        assert_eq!(ids_in_order(&bucket), vec![10, 11, 12]);
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn test_remove_head_mid_tail() {
        let mut bucket = Bucket::new();
        for id in [1, 2, 3, 4, 5] {
            let (id, cb) = noop(id);
            bucket.push(id, cb);
        }

        assert!(bucket.remove(3).is_some()); // mid
        assert_eq!(ids_in_order(&bucket), vec![1, 2, 4, 5]);

        assert!(bucket.remove(1).is_some()); // head
        assert_eq!(ids_in_order(&bucket), vec![2, 4, 5]);

        assert!(bucket.remove(5).is_some()); // tail
        assert_eq!(ids_in_order(&bucket), vec![2, 4]);
    }

    #[test]
    fn test_remove_unknown_id_is_none() {
        let mut bucket: Bucket<u32> = Bucket::new();
        assert!(bucket.remove(99).is_none());

        let (id, cb) = noop(7);
        bucket.push(id, cb);
        assert!(bucket.remove(7).is_some());
        assert!(bucket.remove(7).is_none());
        assert!(bucket.is_empty());
    }

    #[test]
    fn test_slot_reuse_keeps_order() {
        let mut bucket = Bucket::new();
        for id in [1, 2, 3] {
            let (id, cb) = noop(id);
            bucket.push(id, cb);
        }
        bucket.remove(2);

        // 4 recycles the freed slot but still lands at the tail.
        let (id, cb) = noop(4);
        bucket.push(id, cb);
        assert_eq!(ids_in_order(&bucket), vec![1, 3, 4]);
        assert_eq!(bucket.slots.len(), 3);
    }

    #[test]
    fn test_snapshot_survives_removal_of_current() {
        let mut bucket = Bucket::new();
        for id in [1, 2, 3] {
            let (id, cb) = noop(id);
            bucket.push(id, cb);
        }

        // Dispatch walks a snapshot of ids and re-checks membership, so a
        // removal applied mid-round skips the node without revisiting it.
        let snapshot = ids_in_order(&bucket);
        let mut visited = Vec::new();
        for id in snapshot {
            if bucket.get(id).is_none() {
                continue;
            }
            visited.push(id);
            if id == 1 {
                bucket.remove(2);
            }
        }
        assert_eq!(visited, vec![1, 3]);
    }

    #[test]
    fn test_drain_returns_all_in_order_and_clears() {
        let mut bucket = Bucket::new();
        for id in [5, 6, 7] {
            let (id, cb) = noop(id);
            bucket.push(id, cb);
        }

        let drained: Vec<u64> = bucket.drain().into_iter().map(|(id, _)| id).collect();
        assert_eq!(drained, vec![5, 6, 7]);
        assert!(bucket.is_empty());
        assert!(bucket.iter().next().is_none());
    }
}
