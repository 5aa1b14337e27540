//! Byte-string queue over external element storage.
//!
//! A [`Queue`] is a sentinel plus the algorithms; the [`Element`]s live in a
//! caller-provided [`Storage`]. Several queues may share one storage, and
//! elements move between them by relinking, never by copying.
//!
//! # Storage Invariant
//!
//! A queue must always be used with the same storage instance. This is the
//! caller's responsibility (same discipline as the `slab` crate). For a
//! version that owns its storage and hands out checked handles, see
//! [`QueuePool`](crate::QueuePool).
//!
//! # Example
//!
//! ```
//! use nexus_ilist::{BoxedStorage, Element, Queue};
//!
//! let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(16);
//! let mut queue: Queue = Queue::new();
//!
//! queue.insert_tail(&mut storage, b"b").unwrap();
//! queue.insert_tail(&mut storage, b"c").unwrap();
//! queue.insert_head(&mut storage, b"a").unwrap();
//! assert_eq!(queue.size(&storage), 3);
//!
//! let mut buf = [0u8; 8];
//! let first = queue.remove_head(&mut storage, Some(&mut buf)).unwrap();
//! assert_eq!(first.value(), "a");
//! assert_eq!(&buf[..2], b"a\0");
//! ```

use crate::error::AllocError;
use crate::{Element, Iter, Key, ListHead, Storage, Value};

/// A queue of [`Element`]s rooted at one sentinel.
///
/// There is no cached length: [`size`](Queue::size) walks the chain, which
/// keeps [`cut`](ListHead::cut) and [`splice`](ListHead::splice) O(1).
#[derive(Debug)]
pub struct Queue<K: Key = u32> {
    pub(crate) head: ListHead<K>,
}

impl<K: Key> Default for Queue<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload of the element at `key`.
#[inline]
pub(crate) fn value_of<K, S>(storage: &S, key: K) -> &Value
where
    K: Key,
    S: Storage<Element<K>, Key = K>,
{
    storage
        .get(key)
        .expect("queued key not in storage")
        .value()
}

impl<K: Key> Queue<K> {
    /// Creates an empty queue.
    #[inline]
    pub const fn new() -> Self {
        Self {
            head: ListHead::new(),
        }
    }

    /// Returns the sentinel.
    #[inline]
    pub fn head(&self) -> &ListHead<K> {
        &self.head
    }

    /// Returns `true` if the queue has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// Returns `true` if the queue has exactly one element.
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.head.is_singular()
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Copies `payload` into a new element linked at the front.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the payload buffer or the storage slot
    /// cannot be allocated. The queue is unchanged on error.
    #[inline]
    pub fn insert_head<S>(&mut self, storage: &mut S, payload: &[u8]) -> Result<K, AllocError>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = Self::allocate(storage, payload)?;
        self.head.push_front(storage, key);
        Ok(key)
    }

    /// Copies `payload` into a new element linked at the back.
    ///
    /// # Errors
    ///
    /// Returns an [`AllocError`] if the payload buffer or the storage slot
    /// cannot be allocated. The queue is unchanged on error.
    #[inline]
    pub fn insert_tail<S>(&mut self, storage: &mut S, payload: &[u8]) -> Result<K, AllocError>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = Self::allocate(storage, payload)?;
        self.head.push_back(storage, key);
        Ok(key)
    }

    fn allocate<S>(storage: &mut S, payload: &[u8]) -> Result<K, AllocError>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let value = Value::try_copy_from(payload)?;
        storage
            .try_insert(Element::new(value))
            .map_err(|_| AllocError::StorageFull)
    }

    // ========================================================================
    // Remove (ownership moves to the caller)
    // ========================================================================

    /// Unlinks the first element and hands it to the caller.
    ///
    /// If `out` is given, the payload is also copied into it as a truncated,
    /// NUL-terminated string (see [`Value::copy_into`]). Returns `None` if
    /// the queue is empty.
    #[inline]
    pub fn remove_head<S>(&mut self, storage: &mut S, out: Option<&mut [u8]>) -> Option<Element<K>>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = self.head.first();
        self.take(storage, key, out)
    }

    /// Unlinks the last element and hands it to the caller.
    ///
    /// See [`remove_head`](Queue::remove_head) for `out`.
    #[inline]
    pub fn remove_tail<S>(&mut self, storage: &mut S, out: Option<&mut [u8]>) -> Option<Element<K>>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = self.head.last();
        self.take(storage, key, out)
    }

    /// Unlinks the element at `key` and hands it to the caller.
    ///
    /// `key` must be on this queue; keys of other queues sharing the storage
    /// corrupt both. Returns `None` if `key` is not in storage.
    #[inline]
    pub fn remove<S>(&mut self, storage: &mut S, key: K) -> Option<Element<K>>
    where
        S: Storage<Element<K>, Key = K>,
    {
        if !storage.contains(key) {
            return None;
        }
        debug_assert!(
            self.owns(storage, key),
            "key {key:?} is not on this queue"
        );
        self.take(storage, key, None)
    }

    /// Follows `key` forward to the sentinel and checks that the chain ends
    /// at this queue's last element. O(n).
    fn owns<S>(&self, storage: &S, key: K) -> bool
    where
        S: Storage<Element<K>, Key = K>,
    {
        let mut cur = key;
        for _ in 0..storage.len() {
            let next = self.head.next_of(storage, cur);
            if next.is_none() {
                return cur == self.head.last();
            }
            cur = next;
        }
        false
    }

    fn take<S>(&mut self, storage: &mut S, key: K, out: Option<&mut [u8]>) -> Option<Element<K>>
    where
        S: Storage<Element<K>, Key = K>,
    {
        if key.is_none() {
            return None;
        }

        self.head.unlink(storage, key);
        let element = storage.remove(key)?;
        if let Some(buf) = out {
            element.copy_into(buf);
        }
        Some(element)
    }

    /// Unlinks and drops the element at `key`.
    #[inline]
    pub(crate) fn release<S>(&mut self, storage: &mut S, key: K)
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.unlink(storage, key);
        storage.remove(key);
    }

    /// Releases every element. Returns how many were released.
    ///
    /// The queue is empty and reusable afterwards.
    #[inline]
    pub fn clear<S>(&mut self, storage: &mut S) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.clear(storage)
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Counts the elements. O(n).
    #[inline]
    pub fn size<S>(&self, storage: &S) -> usize
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.count(storage)
    }

    /// Payload of the first element.
    #[inline]
    pub fn front<'a, S>(&self, storage: &'a S) -> Option<&'a Value>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = self.head.first();
        if key.is_none() {
            None
        } else {
            Some(value_of(storage, key))
        }
    }

    /// Payload of the last element.
    #[inline]
    pub fn back<'a, S>(&self, storage: &'a S) -> Option<&'a Value>
    where
        S: Storage<Element<K>, Key = K>,
    {
        let key = self.head.last();
        if key.is_none() {
            None
        } else {
            Some(value_of(storage, key))
        }
    }

    /// Iterator over `(key, &element)`, front to back.
    #[inline]
    pub fn iter<'a, S>(&self, storage: &'a S) -> Iter<'a, K, Element<K>, S>
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.iter(storage)
    }

    /// Iterator over payloads, front to back.
    #[inline]
    pub fn values<'a, S>(
        &self,
        storage: &'a S,
    ) -> impl DoubleEndedIterator<Item = &'a Value> + use<'a, K, S>
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.iter(storage).map(|(_, element)| element.value())
    }

    /// Verifies the link invariant over the whole queue. O(n).
    #[inline]
    pub fn is_consistent<S>(&self, storage: &S) -> bool
    where
        S: Storage<Element<K>, Key = K>,
    {
        self.head.is_consistent(storage)
    }
}
