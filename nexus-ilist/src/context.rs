//! Chain of queue references consumed by the k-way merge.
//!
//! A [`ContextChain`] is itself an index-linked list: each [`Context`] entry
//! embeds its own [`Link`] and refers to a queue by id. The chain owns its
//! entries but never the queues they name.

use crate::error::ConfigError;
use crate::{BoxedStorage, Full, Key, Link, Linked, ListHead, Storage};

/// One chain entry: a non-owning reference to a queue.
#[derive(Debug)]
pub struct Context<K: Key = u32> {
    queue: K,
    link: Link<K>,
}

impl<K: Key> Context<K> {
    /// Id of the queue this entry refers to.
    #[inline]
    pub fn queue(&self) -> K {
        self.queue
    }
}

impl<K: Key> Linked<K> for Context<K> {
    #[inline]
    fn link(&self) -> &Link<K> {
        &self.link
    }

    #[inline]
    fn link_mut(&mut self) -> &mut Link<K> {
        &mut self.link
    }
}

/// Ordered, fixed-capacity chain of queue ids.
///
/// Entries keep insertion order. The same queue id may be pushed more than
/// once; the merge skips repeats.
///
/// # Example
///
/// ```
/// use nexus_ilist::ContextChain;
///
/// let mut chain: ContextChain = ContextChain::with_capacity(4);
/// let first = chain.push(10).unwrap();
/// chain.push(20).unwrap();
/// chain.push(30).unwrap();
///
/// assert_eq!(chain.remove(first), Some(10));
/// assert_eq!(chain.queues().collect::<Vec<_>>(), vec![20, 30]);
/// ```
#[derive(Debug)]
pub struct ContextChain<K: Key = u32> {
    entries: BoxedStorage<Context<K>, K>,
    head: ListHead<K>,
}

impl<K: Key> ContextChain<K> {
    /// Creates an empty chain holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or not addressable by `K`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: BoxedStorage::with_capacity(capacity),
            head: ListHead::new(),
        }
    }

    /// Creates an empty chain holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// See [`BoxedStorage::try_with_capacity`].
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            entries: BoxedStorage::try_with_capacity(capacity)?,
            head: ListHead::new(),
        })
    }

    /// Appends a reference to `queue`. Returns the entry key.
    ///
    /// # Errors
    ///
    /// Returns `Err(Full(queue))` if the chain is at capacity.
    pub fn push(&mut self, queue: K) -> Result<K, Full<K>> {
        let entry = self
            .entries
            .try_insert(Context {
                queue,
                link: Link::new(),
            })
            .map_err(|Full(ctx)| Full(ctx.queue))?;
        self.head.push_back(&mut self.entries, entry);
        Ok(entry)
    }

    /// Removes the entry at `entry`, returning the queue id it referred to.
    pub fn remove(&mut self, entry: K) -> Option<K> {
        if !self.entries.contains(entry) {
            return None;
        }
        self.head.unlink(&mut self.entries, entry);
        self.entries.remove(entry).map(|ctx| ctx.queue)
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the chain has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty()
    }

    /// Returns `true` if the chain has exactly one entry.
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.head.is_singular()
    }

    /// Queue id of the first entry.
    pub fn first(&self) -> Option<K> {
        self.entries.get(self.head.first()).map(Context::queue)
    }

    /// Queue ids in chain order.
    pub fn queues(&self) -> impl DoubleEndedIterator<Item = K> + use<'_, K> {
        self.head.iter(&self.entries).map(|(_, ctx)| ctx.queue)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.head.clear(&mut self.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_order() {
        let mut chain: ContextChain<u32> = ContextChain::with_capacity(4);
        assert!(chain.is_empty());
        assert_eq!(chain.first(), None);

        chain.push(3).unwrap();
        assert!(chain.is_singular());
        chain.push(1).unwrap();
        chain.push(2).unwrap();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.first(), Some(3));
        assert_eq!(chain.queues().collect::<Vec<_>>(), vec![3, 1, 2]);
        assert_eq!(chain.queues().rev().collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn push_when_full_returns_id() {
        let mut chain: ContextChain<u32> = ContextChain::with_capacity(1);
        chain.push(7).unwrap();
        assert_eq!(chain.push(8), Err(Full(8)));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn remove_and_reuse() {
        let mut chain: ContextChain<u16> = ContextChain::with_capacity(2);
        let a = chain.push(1).unwrap();
        chain.push(2).unwrap();

        assert_eq!(chain.remove(a), Some(1));
        assert_eq!(chain.remove(a), None);
        assert_eq!(chain.remove(u16::NONE), None);

        chain.push(3).unwrap();
        assert_eq!(chain.queues().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn clear_empties() {
        let mut chain: ContextChain<u32> = ContextChain::with_capacity(4);
        chain.push(1).unwrap();
        chain.push(2).unwrap();

        chain.clear();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        chain.push(5).unwrap();
        assert_eq!(chain.first(), Some(5));
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            ContextChain::<u32>::try_with_capacity(0).unwrap_err(),
            ConfigError::ZeroCapacity
        );
    }
}
