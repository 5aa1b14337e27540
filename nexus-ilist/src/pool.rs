//! Handle-based queues that own their storage.
//!
//! [`QueuePool`] keeps every element and every queue sentinel in two
//! fixed-capacity storages and hands out queue ids. An id is checked on
//! every call: [`Key::NONE`] is the null handle, and an id whose queue was
//! freed is stale. Both are rejected instead of touching memory.
//!
//! In debug builds every mutating call re-verifies the link invariant of the
//! queue it touched.
//!
//! # Example
//!
//! ```
//! use nexus_ilist::{ContextChain, QueuePool};
//!
//! let mut pool: QueuePool = QueuePool::builder()
//!     .element_capacity(64)
//!     .queue_capacity(4)
//!     .build()?;
//!
//! let q = pool.new_queue()?;
//! for word in ["delta", "alpha", "charlie", "bravo"] {
//!     pool.insert_tail(q, word.as_bytes())?;
//! }
//! pool.sort(q, false);
//!
//! let mut buf = [0u8; 16];
//! let first = pool.remove_head(q, Some(&mut buf)).unwrap();
//! assert_eq!(first.value(), "alpha");
//! assert_eq!(pool.size(q), 3);
//!
//! let other = pool.new_queue()?;
//! pool.insert_tail(other, b"able")?;
//! let mut chain: ContextChain = ContextChain::with_capacity(4);
//! chain.push(q).unwrap();
//! chain.push(other).unwrap();
//! assert_eq!(pool.merge(&chain, false), 4);
//! assert_eq!(pool.size(other), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::mem;

use log::{debug, warn};

use crate::error::{AllocError, ConfigError, QueueError};
use crate::{BoxedStorage, ContextChain, Element, Key, Queue, Storage, Value};

const DEFAULT_ELEMENT_CAPACITY: usize = 1024;
const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Builder for [`QueuePool`].
///
/// # Example
///
/// ```
/// use nexus_ilist::{ConfigError, PoolBuilder, QueuePool};
///
/// let pool: QueuePool<u16> = PoolBuilder::default()
///     .element_capacity(1000)
///     .build()
///     .unwrap();
/// assert_eq!(pool.element_capacity(), 1000);
///
/// let err = PoolBuilder::default().queue_capacity(0).build::<u32>();
/// assert_eq!(err.unwrap_err(), ConfigError::ZeroCapacity);
/// ```
#[derive(Clone, Debug)]
pub struct PoolBuilder {
    element_capacity: usize,
    queue_capacity: usize,
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self {
            element_capacity: DEFAULT_ELEMENT_CAPACITY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl PoolBuilder {
    /// Maximum number of live elements across all queues. Default: 1024.
    pub fn element_capacity(mut self, n: usize) -> Self {
        self.element_capacity = n;
        self
    }

    /// Maximum number of live queues. Default: 16.
    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    /// Allocates both storages.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if either capacity is zero or not addressable by `K`.
    pub fn build<K: Key>(self) -> Result<QueuePool<K>, ConfigError> {
        let elements = BoxedStorage::try_with_capacity(self.element_capacity)?;
        let queues = BoxedStorage::try_with_capacity(self.queue_capacity)?;
        debug!(
            "queue pool built: {} elements, {} queues",
            self.element_capacity, self.queue_capacity
        );
        Ok(QueuePool { elements, queues })
    }
}

/// Queues addressed by id, sharing one fixed-capacity element storage.
#[derive(Debug)]
pub struct QueuePool<K: Key = u32> {
    elements: BoxedStorage<Element<K>, K>,
    queues: BoxedStorage<Queue<K>, K>,
}

impl QueuePool {
    /// Returns a builder with default capacities.
    ///
    /// Pools keyed by another [`Key`] type start from
    /// `PoolBuilder::default()`.
    pub fn builder() -> PoolBuilder {
        PoolBuilder::default()
    }
}

impl<K: Key> QueuePool<K> {
    /// Creates a pool with the given capacities.
    ///
    /// # Panics
    ///
    /// Panics if either capacity is zero or not addressable by `K`.
    pub fn with_capacity(element_capacity: usize, queue_capacity: usize) -> Self {
        match PoolBuilder::default()
            .element_capacity(element_capacity)
            .queue_capacity(queue_capacity)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => panic!("{e}"),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Creates an empty queue and returns its id.
    ///
    /// # Errors
    ///
    /// [`QueueError::AllocationFailure`] if every queue slot is taken.
    pub fn new_queue(&mut self) -> Result<K, QueueError> {
        match self.queues.try_insert(Queue::new()) {
            Ok(id) => {
                debug!("created queue {id:?}");
                Ok(id)
            }
            Err(_) => {
                warn!("queue allocation failed: {} queues live", self.queues.len());
                Err(AllocError::StorageFull.into())
            }
        }
    }

    /// Releases every element of the queue, then the queue itself.
    ///
    /// A null or stale id is ignored. The id is stale afterwards.
    pub fn free_queue(&mut self, id: K) {
        let Some(mut queue) = self.queues.remove(id) else {
            return;
        };
        let released = queue.clear(&mut self.elements);
        debug!("freed queue {id:?}, released {released} elements");
    }

    /// Returns `true` if `id` names a live queue.
    #[inline]
    pub fn contains(&self, id: K) -> bool {
        self.queues.contains(id)
    }

    /// Borrows the queue sentinel for `id`.
    #[inline]
    pub fn queue(&self, id: K) -> Option<&Queue<K>> {
        self.queues.get(id)
    }

    // ========================================================================
    // Insert / remove
    // ========================================================================

    /// Copies `payload` into a new element at the front of the queue.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidHandle`] for a null or stale id,
    /// [`QueueError::AllocationFailure`] if the element could not be
    /// allocated. The queue is unchanged on error.
    pub fn insert_head(&mut self, id: K, payload: &[u8]) -> Result<K, QueueError> {
        let queue = self.queues.get_mut(id).ok_or(QueueError::InvalidHandle)?;
        let key = queue
            .insert_head(&mut self.elements, payload)
            .inspect_err(|e| warn!("insert_head on queue {id:?} failed: {e}"))?;
        self.debug_check(id);
        Ok(key)
    }

    /// Copies `payload` into a new element at the back of the queue.
    ///
    /// # Errors
    ///
    /// See [`insert_head`](QueuePool::insert_head).
    pub fn insert_tail(&mut self, id: K, payload: &[u8]) -> Result<K, QueueError> {
        let queue = self.queues.get_mut(id).ok_or(QueueError::InvalidHandle)?;
        let key = queue
            .insert_tail(&mut self.elements, payload)
            .inspect_err(|e| warn!("insert_tail on queue {id:?} failed: {e}"))?;
        self.debug_check(id);
        Ok(key)
    }

    /// Unlinks the first element and transfers it to the caller.
    ///
    /// `out` receives a truncated, NUL-terminated copy of the payload. Returns
    /// `None` for a null, stale or empty queue, leaving `out` untouched.
    pub fn remove_head(&mut self, id: K, out: Option<&mut [u8]>) -> Option<Element<K>> {
        let element = self
            .queues
            .get_mut(id)?
            .remove_head(&mut self.elements, out);
        self.debug_check(id);
        element
    }

    /// Unlinks the last element and transfers it to the caller.
    ///
    /// See [`remove_head`](QueuePool::remove_head).
    pub fn remove_tail(&mut self, id: K, out: Option<&mut [u8]>) -> Option<Element<K>> {
        let element = self
            .queues
            .get_mut(id)?
            .remove_tail(&mut self.elements, out);
        self.debug_check(id);
        element
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Number of elements in the queue; 0 for a null or stale id. O(n).
    pub fn size(&self, id: K) -> usize {
        self.queues
            .get(id)
            .map_or(0, |queue| queue.size(&self.elements))
    }

    /// Payload of the element at `key`, whichever queue holds it.
    pub fn get(&self, key: K) -> Option<&Value> {
        self.elements.get(key).map(Element::value)
    }

    /// Payloads of the queue, front to back. Empty for a null or stale id.
    pub fn values(&self, id: K) -> impl DoubleEndedIterator<Item = &Value> + use<'_, K> {
        self.queues
            .get(id)
            .into_iter()
            .flat_map(|queue| queue.values(&self.elements))
    }

    /// Verifies the link invariant of the queue. `false` for a null or stale
    /// id.
    pub fn is_consistent(&self, id: K) -> bool {
        self.queues
            .get(id)
            .is_some_and(|queue| queue.is_consistent(&self.elements))
    }

    /// Live elements across all queues.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Live queues.
    #[inline]
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Maximum number of live elements.
    #[inline]
    pub fn element_capacity(&self) -> usize {
        self.elements.capacity()
    }

    /// Maximum number of live queues.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queues.capacity()
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// See [`Queue::delete_mid`]. `false` for a null or stale id.
    pub fn delete_mid(&mut self, id: K) -> bool {
        let done = self.with_queue(id, false, Queue::delete_mid);
        self.debug_check(id);
        done
    }

    /// See [`Queue::delete_dup`]. `false` for a null or stale id.
    pub fn delete_dup(&mut self, id: K) -> bool {
        let done = self.with_queue(id, false, Queue::delete_dup);
        self.debug_check(id);
        done
    }

    /// See [`Queue::swap`].
    pub fn swap(&mut self, id: K) {
        self.with_queue(id, (), Queue::swap);
        self.debug_check(id);
    }

    /// See [`Queue::reverse`].
    pub fn reverse(&mut self, id: K) {
        self.with_queue(id, (), Queue::reverse);
        self.debug_check(id);
    }

    /// See [`Queue::reverse_k`].
    pub fn reverse_k(&mut self, id: K, k: usize) {
        self.with_queue(id, (), |queue, elements| queue.reverse_k(elements, k));
        self.debug_check(id);
    }

    /// See [`Queue::ascend`]. 0 for a null or stale id.
    pub fn ascend(&mut self, id: K) -> usize {
        let size = self.with_queue(id, 0, Queue::ascend);
        self.debug_check(id);
        size
    }

    /// See [`Queue::descend`]. 0 for a null or stale id.
    pub fn descend(&mut self, id: K) -> usize {
        let size = self.with_queue(id, 0, Queue::descend);
        self.debug_check(id);
        size
    }

    /// See [`Queue::sort`].
    pub fn sort(&mut self, id: K, descending: bool) {
        self.with_queue(id, (), |queue, elements| queue.sort(elements, descending));
        self.debug_check(id);
    }

    /// Merges every queue named by `chain` into the first valid one.
    ///
    /// Each queue must already be sorted in the requested direction. Entries
    /// naming a null or stale id, or repeating an id already seen, are
    /// skipped. The other queues end empty but stay allocated. Equal
    /// payloads keep chain order. Returns the merged size, or 0 if no entry
    /// names a live queue.
    pub fn merge(&mut self, chain: &ContextChain<K>, descending: bool) -> usize {
        let mut ids = Vec::with_capacity(chain.len());
        let mut taken = Vec::with_capacity(chain.len());
        for id in chain.queues() {
            if ids.contains(&id) {
                warn!("merge: skipping repeated queue {id:?}");
                continue;
            }
            let Some(queue) = self.queues.get_mut(id) else {
                warn!("merge: skipping invalid queue {id:?}");
                continue;
            };
            ids.push(id);
            taken.push(mem::take(queue));
        }

        let size = Queue::merge_all(&mut taken, &mut self.elements, descending);

        for (&id, queue) in ids.iter().zip(taken) {
            if let Some(slot) = self.queues.get_mut(id) {
                *slot = queue;
            }
        }
        if let Some(&target) = ids.first() {
            debug!(
                "merged {} queues into {target:?}, {size} elements",
                ids.len()
            );
            self.debug_check(target);
        }
        size
    }

    #[inline]
    fn with_queue<R>(
        &mut self,
        id: K,
        invalid: R,
        f: impl FnOnce(&mut Queue<K>, &mut BoxedStorage<Element<K>, K>) -> R,
    ) -> R {
        match self.queues.get_mut(id) {
            Some(queue) => f(queue, &mut self.elements),
            None => invalid,
        }
    }

    #[inline]
    fn debug_check(&self, id: K) {
        debug_assert!(
            self.queues
                .get(id)
                .is_none_or(|queue| queue.is_consistent(&self.elements)),
            "queue {id:?} failed its link check"
        );
    }
}
