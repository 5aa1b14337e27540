//! In-place structural transforms.
//!
//! Every transform relinks existing elements; none allocates. Elements that
//! are deleted are released back to storage. Destructive traversals go
//! through [`Walk`](crate::Walk), which captures the successor before the
//! current element is touched.

use core::cmp::Ordering;

use crate::queue::value_of;
use crate::{Element, Key, Queue, Storage};

impl<K: Key> Queue<K> {
    /// Slow/fast midpoint. For an even length this is the first of the two
    /// central elements. `NONE` on an empty queue.
    pub(crate) fn middle<S>(&self, storage: &S) -> K
    where
        S: Storage<Element<K>, Key = K>,
    {
        let head = &self.head;
        let mut slow = head.first();
        let mut fast = head.first();
        if fast.is_none() {
            return K::NONE;
        }

        loop {
            let one = head.next_of(storage, fast);
            if one.is_none() {
                break;
            }
            let two = head.next_of(storage, one);
            if two.is_none() {
                break;
            }
            slow = head.next_of(storage, slow);
            fast = two;
        }
        slow
    }

    /// Releases the middle element.
    ///
    /// With an even length the first of the two central elements goes:
    /// `[1, 2, 3, 4]` becomes `[1, 3, 4]`. Returns `false` on an empty queue.
    pub fn delete_mid<S>(&mut self, storage: &mut S) -> bool
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mid = self.middle(storage);
        if mid.is_none() {
            return false;
        }
        self.release(storage, mid);
        true
    }

    /// Releases every element that belongs to a run of two or more equal
    /// adjacent payloads. No copy of a duplicated payload survives.
    ///
    /// Only adjacent elements are compared, so the queue must already be
    /// sorted for this to remove all duplicates. Returns `false` on an empty
    /// queue, `true` otherwise.
    pub fn delete_dup<S>(&mut self, storage: &mut S) -> bool
    where
        S: Storage<Element<K>, Key = K>,
    {
        if self.is_empty() {
            return false;
        }

        let mut in_run = false;
        let mut walk = self.head.walk();
        while let Some(key) = walk.next(&*storage) {
            let matches_next = match walk.peek() {
                Some(next) => value_of(storage, key) == value_of(storage, next),
                None => false,
            };
            if matches_next || in_run {
                self.release(storage, key);
            }
            in_run = matches_next;
        }
        true
    }

    /// Swaps each adjacent pair in place. A trailing odd element stays put.
    pub fn swap<S>(&mut self, storage: &mut S)
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mut cur = self.head.first();
        while cur.is_some() {
            let next = self.head.next_of(storage, cur);
            if next.is_none() {
                break;
            }
            self.head.move_after(storage, cur, next);
            cur = self.head.next_of(storage, cur);
        }
    }

    /// Reverses the queue by moving each element to the front.
    pub fn reverse<S>(&mut self, storage: &mut S)
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mut walk = self.head.walk();
        while let Some(key) = walk.next(&*storage) {
            self.head.move_after(storage, key, K::NONE);
        }
    }

    /// Reverses each consecutive block of `k` elements.
    ///
    /// A final block shorter than `k` keeps its order. `k` of 0 or 1 leaves
    /// the queue unchanged.
    ///
    /// ```
    /// use nexus_ilist::{BoxedStorage, Element, Queue};
    ///
    /// let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(8);
    /// let mut queue: Queue = Queue::new();
    /// for v in ["1", "2", "3", "4", "5"] {
    ///     queue.insert_tail(&mut storage, v.as_bytes()).unwrap();
    /// }
    ///
    /// queue.reverse_k(&mut storage, 2);
    /// let order: Vec<String> = queue.values(&storage).map(|v| v.to_string()).collect();
    /// assert_eq!(order, ["2", "1", "4", "3", "5"]);
    /// ```
    pub fn reverse_k<S>(&mut self, storage: &mut S, k: usize)
    where
        S: Storage<Element<K>, Key = K>,
    {
        if k < 2 {
            return;
        }

        let mut pending = Queue::new();
        let mut before = K::NONE;
        let mut count = 0;
        let mut walk = self.head.walk();
        while let Some(key) = walk.next(&*storage) {
            count += 1;
            if count < k {
                continue;
            }
            count = 0;

            self.head.cut(storage, &mut pending.head, before, key);
            pending.reverse(storage);
            self.head.splice(storage, &mut pending.head, before);
            before = self
                .head
                .prev_of(storage, walk.peek().unwrap_or(K::NONE));
        }
    }

    /// Walking back from the tail, releases every element strictly greater
    /// than the smallest payload kept so far. The survivors read
    /// non-decreasing front to back. Returns the remaining size.
    pub fn ascend<S>(&mut self, storage: &mut S) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.retain_monotonic(storage, Ordering::Greater)
    }

    /// Walking back from the tail, releases every element strictly less than
    /// the largest payload kept so far. The survivors read non-increasing
    /// front to back. Returns the remaining size.
    pub fn descend<S>(&mut self, storage: &mut S) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.retain_monotonic(storage, Ordering::Less)
    }

    fn retain_monotonic<S>(&mut self, storage: &mut S, reject: Ordering) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mut walk = self.head.walk_back();
        let Some(mut bound) = walk.next(&*storage) else {
            return 0;
        };

        while let Some(key) = walk.next(&*storage) {
            if value_of(storage, key).cmp(value_of(storage, bound)) == reject {
                self.release(storage, key);
            } else {
                bound = key;
            }
        }
        self.size(storage)
    }
}
