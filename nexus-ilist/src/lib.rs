//! Index-linked intrusive queues of byte strings.
//!
//! Nodes carry their own links, and links are keys into caller-owned
//! storage rather than pointers. A queue is just a sentinel: inserting
//! allocates a slot, removing hands the element back by value, and every
//! structural algorithm (sort, merge, reversal, filtering) relinks nodes in
//! place without copying payloads.
//!
//! # Design
//!
//! ```text
//! Storage (BoxedStorage / Slab) - owns elements, hands out stable keys
//! ListHead / Queue              - sentinel + algorithms, owns nothing
//! QueuePool                     - owns both, hands out checked queue ids
//! ```
//!
//! Within a link, `K::NONE` addresses the sentinel of the list the node is
//! on, so the chain is logically circular: the successor of the last node
//! and the predecessor of the first node are both the sentinel.
//!
//! # Quick Start
//!
//! ```
//! use nexus_ilist::{BoxedStorage, Element, Queue};
//!
//! let mut storage: BoxedStorage<Element> = BoxedStorage::with_capacity(64);
//! let mut queue: Queue = Queue::new();
//!
//! for word in ["kiwi", "apple", "fig", "apple"] {
//!     queue.insert_tail(&mut storage, word.as_bytes()).unwrap();
//! }
//!
//! queue.sort(&mut storage, false);
//! queue.delete_dup(&mut storage);
//!
//! let words: Vec<String> = queue.values(&storage).map(|v| v.to_string()).collect();
//! assert_eq!(words, ["fig", "kiwi"]);
//! ```
//!
//! # Critical Invariant: Same Storage Instance
//!
//! A queue must always be used with the storage its elements were inserted
//! into. Mixing storages breaks the chain and ends in a panic on the next
//! traversal. [`QueuePool`] removes the hazard by owning the storage.
//!
//! # Complexity
//!
//! | Operation | Cost |
//! |-----------|------|
//! | insert/remove at either end | O(1) |
//! | `cut`, `splice` | O(1) |
//! | `size` | O(n), no cached length |
//! | `sort` | O(n log n), stable, O(log n) recursion |
//! | `merge_all` over k queues | O(n log k) |
//!
//! # Feature Flags
//!
//! - `slab` - Enable [`Storage`] impl for `slab::Slab`

#![warn(missing_docs)]

pub mod context;
pub mod element;
pub mod error;
pub mod key;
pub mod link;
pub mod pool;
pub mod queue;
mod sort;
pub mod storage;
mod transform;

pub use context::{Context, ContextChain};
pub use element::{Element, Value};
pub use error::{AllocError, ConfigError, QueueError};
pub use key::Key;
pub use link::{Iter, Link, Linked, ListHead, Walk};
pub use pool::{PoolBuilder, QueuePool};
pub use queue::Queue;
pub use storage::{BoxedStorage, Full, Storage};
