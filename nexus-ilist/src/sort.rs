//! Merge sort and merging of sorted queues.
//!
//! All merging relinks elements; payloads are never copied. Ties resolve
//! toward the left (earlier) input, which makes [`Queue::sort`] stable.

use core::cmp::Ordering;

use log::trace;

use crate::queue::value_of;
use crate::{Element, Key, ListHead, Queue, Storage};

impl<K: Key> Queue<K> {
    /// Merges `other` into this queue. Both must already be sorted in the
    /// requested direction.
    ///
    /// On equal payloads the element from `self` goes first. The result ends
    /// up in `self` and `other` is left empty. Returns the merged size.
    ///
    /// ```
    /// use nexus_ilist::{BoxedStorage, Element, Queue};
    ///
    /// let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(8);
    /// let mut left: Queue = Queue::new();
    /// let mut right: Queue = Queue::new();
    /// for v in ["1", "3", "5"] {
    ///     left.insert_tail(&mut storage, v.as_bytes()).unwrap();
    /// }
    /// for v in ["2", "4"] {
    ///     right.insert_tail(&mut storage, v.as_bytes()).unwrap();
    /// }
    ///
    /// assert_eq!(left.merge_two(&mut right, &mut storage, false), 5);
    /// assert!(right.is_empty());
    /// ```
    pub fn merge_two<S>(&mut self, other: &mut Self, storage: &mut S, descending: bool) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mut merged = ListHead::new();
        let mut size = 0;

        loop {
            let left = self.head.first();
            let right = other.head.first();
            if left.is_none() || right.is_none() {
                break;
            }

            let ord = value_of(storage, left).cmp(value_of(storage, right));
            let take_left = if descending {
                ord != Ordering::Less
            } else {
                ord != Ordering::Greater
            };

            if take_left {
                self.head.unlink(storage, left);
                merged.push_back(storage, left);
            } else {
                other.head.unlink(storage, right);
                merged.push_back(storage, right);
            }
            size += 1;
        }

        size += self.size(storage) + other.size(storage);
        merged.splice_tail(storage, &mut self.head);
        merged.splice_tail(storage, &mut other.head);
        self.head.splice(storage, &mut merged, K::NONE);
        size
    }

    /// Stable merge sort by payload bytes.
    ///
    /// Splits at the slow/fast midpoint (the left half takes the extra
    /// element of an odd length), sorts both halves recursively and merges
    /// them. Recursion depth is O(log n).
    pub fn sort<S>(&mut self, storage: &mut S, descending: bool)
    where
        S: Storage<Element<K>, Key = K>,
    {
        if self.is_empty() || self.is_singular() {
            return;
        }
        trace!("sorting queue (descending: {descending})");
        self.sort_run(storage, descending);
    }

    fn sort_run<S>(&mut self, storage: &mut S, descending: bool)
    where
        S: Storage<Element<K>, Key = K>,
    {
        if self.is_empty() || self.is_singular() {
            return;
        }

        let mid = self.middle(storage);
        let mut left = Queue::new();
        self.head.cut(storage, &mut left.head, K::NONE, mid);

        left.sort_run(storage, descending);
        self.sort_run(storage, descending);
        left.merge_two(self, storage, descending);
        self.head.splice(storage, &mut left.head, K::NONE);
    }

    /// Merges every queue of `queues` into the first one.
    ///
    /// Each queue must already be sorted in the requested direction. Queues
    /// are merged pairwise in rounds (entry `i` absorbs entry `i + step`,
    /// `step` doubling each round), so equal payloads keep the order of the
    /// queues they came from. Every queue but the first ends empty. Returns
    /// the size of the first queue afterwards, or 0 for an empty slice.
    pub fn merge_all<S>(queues: &mut [Self], storage: &mut S, descending: bool) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        let Some(first) = queues.first() else {
            return 0;
        };
        if queues.len() == 1 {
            return first.size(storage);
        }

        let mut step = 1;
        while step < queues.len() {
            let mut i = 0;
            while i + step < queues.len() {
                let (lo, hi) = queues.split_at_mut(i + step);
                lo[i].merge_two(&mut hi[0], storage, descending);
                i += 2 * step;
            }
            step *= 2;
        }

        queues[0].size(storage)
    }
}
