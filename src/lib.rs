//! An ordered map implemented with an AVL tree.
//!
//! [`AvlTreeMap`] keeps unique keys in the order given by a [`Compare`]
//! implementation ([`Ord`] by default) and offers lookup, insertion and removal
//! in O(log n) time, ordered iteration, range queries and cursors.
//!
//! ```
//! use avlmap::AvlTreeMap;
//! let mut map = AvlTreeMap::new();
//! map.insert(0, "zero");
//! map.insert(1, "one");
//! map.insert(2, "two");
//! map.insert(2, "two");
//! map.insert(3, "three");
//! assert_eq!(map.len(), 4);
//! assert_eq!(map.get(&1), Some(&"one"));
//! map.remove(&1);
//! assert!(map.get(&1).is_none());
//! assert_eq!(map.try_get(&1), Err(avlmap::KeyNotFoundError));
//!
//! for (k, v) in &map {
//!     println!("{k} => {v}");
//! }
//! ```
//!
//! The `consistency_check` feature makes `AvlTreeMap::check_consistency`
//! available outside of this crate's own tests.

pub mod compare;
pub mod error;
pub mod map;

pub use compare::{Compare, Descending, FnComparator, Natural};
pub use error::KeyNotFoundError;
pub use map::AvlTreeMap;
