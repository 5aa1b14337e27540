//! Link primitive: sentinel-headed doubly-linked chains over external storage.
//!
//! Every node embeds one [`Link`] (`prev`/`next` keys, never ownership). A
//! chain is rooted at a [`ListHead`], the sentinel, which lives outside the
//! storage. Inside a link the reserved key `K::NONE` addresses that sentinel,
//! so the chain is circular in the usual sense:
//!
//! ```text
//!            ┌───────────────────────────────────────────┐
//!            ▼                                           │
//!   ListHead { next: a, prev: c }                        │
//!            │                                           │
//!            ▼                                           │
//!   a { prev: NONE, next: b } ⇄ b { .. } ⇄ c { prev: b, next: NONE }
//! ```
//!
//! The head is empty iff `next` (and `prev`) is `NONE`. For every node `L`,
//! `next_of(L.prev) == L` and `prev_of(L.next) == L`, where the sentinel's
//! `next`/`prev` stand in when a link holds `NONE`. Every mutating primitive
//! here preserves that invariant; [`ListHead::is_consistent`] checks it.
//!
//! # Destructive traversal
//!
//! A borrowing [`Iter`] cannot coexist with `&mut storage`. Traversals that
//! unlink or release nodes use a [`Walk`] instead: it captures the successor
//! *before* yielding the current node, so the current node may be unlinked,
//! moved, or released between steps. Removing the captured successor itself
//! is not supported.
//!
//! ```
//! use nexus_ilist::{BoxedStorage, Link, Linked, ListHead, Storage};
//!
//! #[derive(Debug)]
//! struct Node {
//!     value: u32,
//!     link: Link<u32>,
//! }
//!
//! impl Linked<u32> for Node {
//!     fn link(&self) -> &Link<u32> { &self.link }
//!     fn link_mut(&mut self) -> &mut Link<u32> { &mut self.link }
//! }
//!
//! let mut storage: BoxedStorage<Node> = BoxedStorage::with_capacity(8);
//! let mut head: ListHead<u32> = ListHead::new();
//!
//! for value in 0..6 {
//!     let key = storage.try_insert(Node { value, link: Link::new() }).unwrap();
//!     head.push_back(&mut storage, key);
//! }
//!
//! // Drop the odd values while walking.
//! let mut walk = head.walk();
//! while let Some(key) = walk.next(&storage) {
//!     if storage.get(key).unwrap().value % 2 == 1 {
//!         head.unlink(&mut storage, key);
//!         storage.remove(key);
//!     }
//! }
//!
//! let values: Vec<u32> = head.iter(&storage).map(|(_, n)| n.value).collect();
//! assert_eq!(values, vec![0, 2, 4]);
//! assert!(head.is_consistent(&storage));
//! ```

use std::marker::PhantomData;

use crate::{Key, Storage};

/// The `prev`/`next` pair embedded in every node.
///
/// `K::NONE` in either field addresses the sentinel of the chain the node
/// is on. A node that is on no chain holds `NONE` in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link<K> {
    pub(crate) prev: K,
    pub(crate) next: K,
}

impl<K: Key> Link<K> {
    /// Creates an unlinked link.
    #[inline]
    pub const fn new() -> Self {
        Self {
            prev: K::NONE,
            next: K::NONE,
        }
    }

    /// Key of the previous node, or `NONE` for the sentinel.
    #[inline]
    pub const fn prev(&self) -> K {
        self.prev
    }

    /// Key of the next node, or `NONE` for the sentinel.
    #[inline]
    pub const fn next(&self) -> K {
        self.next
    }
}

impl<K: Key> Default for Link<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Types that embed a [`Link`] and can sit on a chain.
///
/// # Example
///
/// ```
/// use nexus_ilist::{Link, Linked};
///
/// struct Order {
///     id: u64,
///     link: Link<u32>,
/// }
///
/// impl Linked<u32> for Order {
///     fn link(&self) -> &Link<u32> { &self.link }
///     fn link_mut(&mut self) -> &mut Link<u32> { &mut self.link }
/// }
/// ```
pub trait Linked<K: Key> {
    /// Returns the embedded link.
    fn link(&self) -> &Link<K>;

    /// Returns the embedded link mutably.
    fn link_mut(&mut self) -> &mut Link<K>;
}

#[inline]
fn links<K, N, S>(storage: &S, key: K) -> Link<K>
where
    K: Key,
    N: Linked<K>,
    S: Storage<N, Key = K>,
{
    *storage.get(key).expect("linked key not in storage").link()
}

#[inline]
fn links_mut<'a, K, N, S>(storage: &'a mut S, key: K) -> &'a mut Link<K>
where
    K: Key,
    N: Linked<K> + 'a,
    S: Storage<N, Key = K>,
{
    storage
        .get_mut(key)
        .expect("linked key not in storage")
        .link_mut()
}

/// Sentinel of a chain.
///
/// Holds the first (`next`) and last (`prev`) keys. All primitives take the
/// storage the nodes live in; a head must always be used with the same
/// storage instance.
///
/// Anchors passed to the primitives are node keys on this chain, or
/// `K::NONE` for the sentinel itself: inserting after the sentinel pushes to
/// the front, inserting before it pushes to the back.
///
/// # Panics
///
/// Every primitive panics if it is handed, or reaches, a key that is not
/// occupied in `storage`. That only happens when the chain and storage have
/// been mismatched.
#[derive(Debug)]
pub struct ListHead<K: Key> {
    next: K,
    prev: K,
}

impl<K: Key> Default for ListHead<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> ListHead<K> {
    /// Creates an empty chain.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next: K::NONE,
            prev: K::NONE,
        }
    }

    /// Resets to empty without touching any node.
    ///
    /// Nodes previously on the chain are forgotten, not released.
    #[inline]
    pub fn init(&mut self) {
        self.next = K::NONE;
        self.prev = K::NONE;
    }

    /// First node, or `NONE` if empty.
    #[inline]
    pub const fn first(&self) -> K {
        self.next
    }

    /// Last node, or `NONE` if empty.
    #[inline]
    pub const fn last(&self) -> K {
        self.prev
    }

    /// Returns `true` if the chain has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.next.is_none()
    }

    /// Returns `true` if the chain has exactly one node.
    #[inline]
    pub fn is_singular(&self) -> bool {
        self.next.is_some() && self.next == self.prev
    }

    /// Successor of `at`; `at == NONE` reads the sentinel.
    #[inline]
    pub fn next_of<N, S>(&self, storage: &S, at: K) -> K
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if at.is_none() {
            self.next
        } else {
            links(storage, at).next
        }
    }

    /// Predecessor of `at`; `at == NONE` reads the sentinel.
    #[inline]
    pub fn prev_of<N, S>(&self, storage: &S, at: K) -> K
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if at.is_none() {
            self.prev
        } else {
            links(storage, at).prev
        }
    }

    #[inline]
    fn set_next<N, S>(&mut self, storage: &mut S, at: K, to: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if at.is_none() {
            self.next = to;
        } else {
            links_mut(storage, at).next = to;
        }
    }

    #[inline]
    fn set_prev<N, S>(&mut self, storage: &mut S, at: K, to: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if at.is_none() {
            self.prev = to;
        } else {
            links_mut(storage, at).prev = to;
        }
    }

    // ========================================================================
    // Link / unlink
    // ========================================================================

    /// Links `node` immediately after `anchor`.
    ///
    /// `node` must be in storage and on no chain.
    #[inline]
    pub fn insert_after<N, S>(&mut self, storage: &mut S, anchor: K, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        let next = self.next_of(storage, anchor);
        *links_mut(storage, node) = Link { prev: anchor, next };
        self.set_next(storage, anchor, node);
        self.set_prev(storage, next, node);
    }

    /// Links `node` immediately before `anchor`.
    ///
    /// `node` must be in storage and on no chain.
    #[inline]
    pub fn insert_before<N, S>(&mut self, storage: &mut S, anchor: K, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        let prev = self.prev_of(storage, anchor);
        self.insert_after(storage, prev, node);
    }

    /// Links `node` as the first node.
    #[inline]
    pub fn push_front<N, S>(&mut self, storage: &mut S, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        self.insert_after(storage, K::NONE, node);
    }

    /// Links `node` as the last node.
    #[inline]
    pub fn push_back<N, S>(&mut self, storage: &mut S, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        self.insert_before(storage, K::NONE, node);
    }

    /// Unlinks `node` by joining its neighbours.
    ///
    /// The node stays in storage with both links reset to `NONE`.
    #[inline]
    pub fn unlink<N, S>(&mut self, storage: &mut S, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        let Link { prev, next } = links(storage, node);
        self.set_next(storage, prev, next);
        self.set_prev(storage, next, prev);
        *links_mut(storage, node) = Link::new();
    }

    /// Moves `node` to immediately after `anchor`.
    #[inline]
    pub fn move_after<N, S>(&mut self, storage: &mut S, node: K, anchor: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if node == anchor {
            return;
        }
        self.unlink(storage, node);
        self.insert_after(storage, anchor, node);
    }

    /// Moves `node` to immediately before `anchor`.
    ///
    /// With `anchor == NONE` this moves the node to the back.
    #[inline]
    pub fn move_before<N, S>(&mut self, storage: &mut S, node: K, anchor: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if node == anchor {
            return;
        }
        self.unlink(storage, node);
        self.insert_before(storage, anchor, node);
    }

    // ========================================================================
    // Bulk relinking
    // ========================================================================

    /// Moves the run after `before` up to and including `node` into `dest`.
    ///
    /// `before` is a node on this chain (or `NONE` for the sentinel) that
    /// precedes `node`. `dest` must be empty. O(1).
    ///
    /// Nothing moves if `node` is `NONE` or equal to `before`.
    pub fn cut<N, S>(&mut self, storage: &mut S, dest: &mut Self, before: K, node: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        debug_assert!(dest.is_empty(), "cut destination must be empty");
        if node.is_none() || before == node {
            return;
        }

        let first = self.next_of(storage, before);
        let after = links(storage, node).next;

        self.set_next(storage, before, after);
        self.set_prev(storage, after, before);

        links_mut(storage, first).prev = K::NONE;
        links_mut(storage, node).next = K::NONE;
        dest.next = first;
        dest.prev = node;
    }

    /// Moves every node of `src` to immediately after `at`, emptying `src`.
    ///
    /// `at` is a node on this chain or `NONE` (front). O(1).
    pub fn splice<N, S>(&mut self, storage: &mut S, src: &mut Self, at: K)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if src.is_empty() {
            return;
        }

        let first = src.next;
        let last = src.prev;
        let after = self.next_of(storage, at);

        self.set_next(storage, at, first);
        links_mut(storage, first).prev = at;
        links_mut(storage, last).next = after;
        self.set_prev(storage, after, last);

        src.init();
    }

    /// Moves every node of `src` to the back of this chain, emptying `src`.
    #[inline]
    pub fn splice_tail<N, S>(&mut self, storage: &mut S, src: &mut Self)
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        let at = self.prev;
        self.splice(storage, src, at);
    }

    /// Unlinks and releases every node. Returns how many were released.
    pub fn clear<N, S>(&mut self, storage: &mut S) -> usize
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        let mut released = 0;
        let mut walk = self.walk();
        while let Some(key) = walk.next(&*storage) {
            storage.remove(key);
            released += 1;
        }
        self.init();
        released
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Counts the nodes. O(n).
    pub fn count<N, S>(&self, storage: &S) -> usize
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        self.iter(storage).count()
    }

    /// Borrowing iterator over `(key, &node)`, front to back.
    #[inline]
    pub fn iter<'a, N, S>(&self, storage: &'a S) -> Iter<'a, K, N, S>
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        Iter {
            storage,
            front: self.next,
            back: self.prev,
            _marker: PhantomData,
        }
    }

    /// Node keys, front to back.
    #[inline]
    pub fn keys<'a, N, S>(
        &self,
        storage: &'a S,
    ) -> impl DoubleEndedIterator<Item = K> + use<'a, K, N, S>
    where
        N: Linked<K> + 'a,
        S: Storage<N, Key = K>,
    {
        self.iter(storage).map(|(key, _)| key)
    }

    /// Mutation-tolerant cursor, front to back.
    #[inline]
    pub fn walk(&self) -> Walk<K> {
        Walk {
            upcoming: self.next,
            forward: true,
        }
    }

    /// Mutation-tolerant cursor, back to front.
    #[inline]
    pub fn walk_back(&self) -> Walk<K> {
        Walk {
            upcoming: self.prev,
            forward: false,
        }
    }

    /// Verifies the symmetric link invariant. O(n).
    ///
    /// Returns `false` on a broken back-link, a key missing from storage, a
    /// sentinel whose ends disagree, or a cycle that never returns to the
    /// sentinel.
    pub fn is_consistent<N, S>(&self, storage: &S) -> bool
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if self.next.is_none() != self.prev.is_none() {
            return false;
        }

        let mut prev = K::NONE;
        let mut cur = self.next;
        let mut steps = 0;
        while cur.is_some() {
            if steps >= storage.len() {
                return false;
            }
            let Some(node) = storage.get(cur) else {
                return false;
            };
            let link = node.link();
            if link.prev != prev {
                return false;
            }
            prev = cur;
            cur = link.next;
            steps += 1;
        }

        self.prev == prev
    }
}

/// Cursor that pre-captures the next key before yielding the current one.
///
/// Not an [`Iterator`]: storage is passed to every step so it can be
/// borrowed mutably between steps.
#[derive(Debug, Clone, Copy)]
pub struct Walk<K> {
    upcoming: K,
    forward: bool,
}

impl<K: Key> Walk<K> {
    /// Yields the current key and advances past it.
    #[inline]
    pub fn next<N, S>(&mut self, storage: &S) -> Option<K>
    where
        N: Linked<K>,
        S: Storage<N, Key = K>,
    {
        if self.upcoming.is_none() {
            return None;
        }

        let current = self.upcoming;
        let link = links(storage, current);
        self.upcoming = if self.forward { link.next } else { link.prev };
        Some(current)
    }

    /// Key the next step will yield, without advancing.
    #[inline]
    pub fn peek(&self) -> Option<K> {
        if self.upcoming.is_none() {
            None
        } else {
            Some(self.upcoming)
        }
    }
}

/// Borrowing iterator over a chain.
pub struct Iter<'a, K, N, S> {
    storage: &'a S,
    front: K,
    back: K,
    _marker: PhantomData<N>,
}

impl<'a, K, N, S> Iterator for Iter<'a, K, N, S>
where
    K: Key,
    N: Linked<K> + 'a,
    S: Storage<N, Key = K>,
{
    type Item = (K, &'a N);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front.is_none() {
            return None;
        }

        let key = self.front;
        let node = self.storage.get(key).expect("linked key not in storage");

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.front = node.link().next;
        }

        Some((key, node))
    }
}

impl<'a, K, N, S> DoubleEndedIterator for Iter<'a, K, N, S>
where
    K: Key,
    N: Linked<K> + 'a,
    S: Storage<N, Key = K>,
{
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back.is_none() {
            return None;
        }

        let key = self.back;
        let node = self.storage.get(key).expect("linked key not in storage");

        if self.front == self.back {
            self.front = K::NONE;
            self.back = K::NONE;
        } else {
            self.back = node.link().prev;
        }

        Some((key, node))
    }
}
