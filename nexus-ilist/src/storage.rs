//! Node storage: the allocate / release capability queues are built on.
//!
//! A queue never allocates its nodes itself. Inserting an element asks a
//! [`Storage`] for a slot and gets back a stable [`Key`]; releasing the
//! element hands the slot back. Keys stay valid until their slot is removed,
//! which is what lets links be plain indices instead of pointers.
//!
//! Exhaustion is reported, never papered over: [`Storage::try_insert`]
//! returns the rejected value inside [`Full`] so the caller can fail the
//! whole operation without having mutated anything.

use core::fmt;

use crate::Key;
use crate::error::ConfigError;

/// Slab-like storage with stable keys.
///
/// # Requirements
///
/// Implementations must provide:
/// - **Stable keys**: a key remains valid until explicitly removed
/// - **O(1)** insert, remove, get
/// - **Never issue `Key::NONE`**: that value addresses list sentinels
///
/// # Implementations
///
/// - [`BoxedStorage<T>`] - fixed capacity, exhaustion is an allocation failure
/// - `slab::Slab<T>` - growable (feature `slab`)
pub trait Storage<T> {
    /// Key type for this storage.
    type Key: Key;

    /// Inserts a value, returning its stable key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full(value))` if no slot is available.
    fn try_insert(&mut self, value: T) -> Result<Self::Key, Full<T>>;

    /// Removes and returns the value at `key`, if present.
    fn remove(&mut self, key: Self::Key) -> Option<T>;

    /// Returns a reference to the value at `key`, if present.
    fn get(&self, key: Self::Key) -> Option<&T>;

    /// Returns a mutable reference to the value at `key`, if present.
    fn get_mut(&mut self, key: Self::Key) -> Option<&mut T>;

    /// Returns the number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slots are occupied.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` addresses an occupied slot.
    #[inline]
    fn contains(&self, key: Self::Key) -> bool {
        self.get(key).is_some()
    }
}

/// Error returned when storage has no free slot.
///
/// Carries the value that could not be inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    /// Returns the value that could not be inserted.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage is full")
    }
}

impl<T: fmt::Debug> std::error::Error for Full<T> {}

// =============================================================================
// BoxedStorage - fixed capacity, single allocation, intrusive free list
// =============================================================================

#[derive(Debug)]
enum Entry<T, K> {
    Occupied(T),
    /// Vacant slot holding the next free key (or `NONE`).
    Vacant(K),
}

/// Fixed-capacity storage sized at construction.
///
/// One boxed slice of slots; vacant slots are threaded into a LIFO free
/// list, so the most recently released slot is reused first. Running out of
/// slots is how allocation failure surfaces to queues.
///
/// # Example
///
/// ```
/// use nexus_ilist::{BoxedStorage, Storage};
///
/// let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(2);
/// let a = storage.try_insert(1).unwrap();
/// let _ = storage.try_insert(2).unwrap();
///
/// assert!(storage.try_insert(3).is_err());
/// assert_eq!(storage.remove(a), Some(1));
/// ```
#[derive(Debug)]
pub struct BoxedStorage<T, K: Key = u32> {
    entries: Box<[Entry<T, K>]>,
    free_head: K,
    len: usize,
}

impl<T, K: Key> BoxedStorage<T, K> {
    /// Creates storage with exactly `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0 or does not fit below `K::NONE`.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(storage) => storage,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates storage with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroCapacity`] if `capacity` is 0,
    /// [`ConfigError::CapacityExceedsKey`] if slot `capacity - 1` would
    /// collide with `K::NONE`.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let max = K::NONE.as_usize();
        if capacity > max {
            return Err(ConfigError::CapacityExceedsKey { capacity, max });
        }

        let entries = (0..capacity)
            .map(|i| {
                let next = if i + 1 < capacity {
                    K::from_usize(i + 1)
                } else {
                    K::NONE
                };
                Entry::Vacant(next)
            })
            .collect();

        Ok(Self {
            entries,
            free_head: K::from_usize(0),
            len: 0,
        })
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if all slots are occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    /// Drops every stored value and makes all slots available again.
    ///
    /// Any list still holding keys into this storage is left dangling; clear
    /// those lists first.
    pub fn clear(&mut self) {
        let capacity = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            let next = if i + 1 < capacity {
                K::from_usize(i + 1)
            } else {
                K::NONE
            };
            *entry = Entry::Vacant(next);
        }
        self.free_head = K::from_usize(0);
        self.len = 0;
    }
}

impl<T, K: Key> Storage<T> for BoxedStorage<T, K> {
    type Key = K;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<K, Full<T>> {
        if self.free_head.is_none() {
            return Err(Full(value));
        }

        let key = self.free_head;
        let entry = &mut self.entries[key.as_usize()];
        match core::mem::replace(entry, Entry::Occupied(value)) {
            Entry::Vacant(next) => self.free_head = next,
            Entry::Occupied(_) => unreachable!("free list points at an occupied slot"),
        }
        self.len += 1;

        Ok(key)
    }

    #[inline]
    fn remove(&mut self, key: K) -> Option<T> {
        let entry = self.entries.get_mut(key.as_usize())?;
        if !matches!(entry, Entry::Occupied(_)) {
            return None;
        }

        match core::mem::replace(entry, Entry::Vacant(self.free_head)) {
            Entry::Occupied(value) => {
                self.free_head = key;
                self.len -= 1;
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        match self.entries.get(key.as_usize())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        match self.entries.get_mut(key.as_usize())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }
}

// =============================================================================
// slab::Slab implementation
// =============================================================================

#[cfg(feature = "slab")]
impl<T> Storage<T> for slab::Slab<T> {
    type Key = usize;

    #[inline]
    fn try_insert(&mut self, value: T) -> Result<usize, Full<T>> {
        // `usize::MAX` is the sentinel; a slab that large cannot exist.
        Ok(self.insert(value))
    }

    #[inline]
    fn remove(&mut self, key: usize) -> Option<T> {
        self.try_remove(key)
    }

    #[inline]
    fn get(&self, key: usize) -> Option<&T> {
        slab::Slab::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        slab::Slab::get_mut(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        slab::Slab::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);
        assert!(storage.is_empty());
        assert!(!storage.is_full());
        assert_eq!(storage.len(), 0);
        assert_eq!(storage.capacity(), 16);
    }

    #[test]
    fn capacity_is_exact() {
        let storage: BoxedStorage<u64> = BoxedStorage::with_capacity(100);
        assert_eq!(storage.capacity(), 100);
    }

    #[test]
    fn zero_capacity_rejected() {
        let err = BoxedStorage::<u64>::try_with_capacity(0).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn capacity_must_fit_below_sentinel() {
        let err = BoxedStorage::<u64, u16>::try_with_capacity(70_000).unwrap_err();
        assert_eq!(
            err,
            ConfigError::CapacityExceedsKey {
                capacity: 70_000,
                max: u16::MAX as usize
            }
        );
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn with_capacity_zero_panics() {
        let _ = BoxedStorage::<u64>::with_capacity(0);
    }

    #[test]
    fn insert_get_remove() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let key = storage.try_insert(42).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(key), Some(&42));
        assert!(storage.contains(key));

        assert_eq!(storage.remove(key), Some(42));
        assert_eq!(storage.get(key), None);
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn get_mut() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let key = storage.try_insert(10).unwrap();
        *storage.get_mut(key).unwrap() = 20;

        assert_eq!(storage.get(key), Some(&20));
    }

    #[test]
    fn fill_to_capacity() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        let keys: Vec<_> = (0..4).map(|i| storage.try_insert(i).unwrap()).collect();
        assert!(storage.is_full());

        let err = storage.try_insert(4).unwrap_err();
        assert_eq!(err.into_inner(), 4);

        for (i, key) in keys.iter().enumerate() {
            assert_eq!(storage.get(*key), Some(&(i as u64)));
        }
    }

    #[test]
    fn slot_reuse_is_lifo() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(4);

        let k0 = storage.try_insert(0).unwrap();
        let _k1 = storage.try_insert(1).unwrap();

        storage.remove(k0);

        let k2 = storage.try_insert(2).unwrap();
        assert_eq!(k2, k0);
    }

    #[test]
    fn remove_twice_and_sentinel() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(16);

        let key = storage.try_insert(42).unwrap();
        storage.remove(key);

        assert_eq!(storage.remove(key), None);
        assert_eq!(storage.remove(u32::NONE), None);
        assert_eq!(storage.get(u32::NONE), None);
    }

    #[test]
    fn clear_releases_everything() {
        let mut storage: BoxedStorage<u64> = BoxedStorage::with_capacity(3);
        for i in 0..3 {
            storage.try_insert(i).unwrap();
        }

        storage.clear();

        assert!(storage.is_empty());
        for i in 0..3 {
            storage.try_insert(i).unwrap();
        }
        assert!(storage.is_full());
    }

    #[test]
    fn drop_cleans_up() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

        #[derive(Debug)]
        struct DropCounter;
        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROP_COUNT.fetch_add(1, Ordering::SeqCst);
            }
        }

        {
            let mut storage: BoxedStorage<DropCounter> = BoxedStorage::with_capacity(8);
            storage.try_insert(DropCounter).unwrap();
            storage.try_insert(DropCounter).unwrap();
            storage.try_insert(DropCounter).unwrap();
        }

        assert_eq!(DROP_COUNT.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn u16_key() {
        let mut storage: BoxedStorage<u64, u16> = BoxedStorage::with_capacity(100);

        let key = storage.try_insert(42).unwrap();
        assert_eq!(storage.get(key), Some(&42));
    }

    #[cfg(feature = "slab")]
    mod slab_tests {
        use super::*;

        #[test]
        fn insert_get_remove() {
            let mut storage = slab::Slab::new();

            let key = Storage::try_insert(&mut storage, 42u64).unwrap();
            assert_eq!(Storage::get(&storage, key), Some(&42));

            assert_eq!(Storage::remove(&mut storage, key), Some(42));
            assert_eq!(Storage::get(&storage, key), None);
            assert_eq!(Storage::get(&storage, usize::NONE), None);
        }
    }
}
