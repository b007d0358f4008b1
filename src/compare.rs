//! Orderings used to place and look up keys.

use std::cmp::Ordering;

/// A total order over `T`, used by [`AvlTreeMap`] for both placement and lookup.
///
/// The order must be consistent for the whole lifetime of a map: two keys must
/// always compare the same way. Lookups with a borrowed form `Q` of the key type
/// require `Compare<Q>`, and the order on `Q` *must* match the order on the key type.
///
/// [`AvlTreeMap`]: crate::AvlTreeMap
pub trait Compare<T: ?Sized> {
    /// Compares `lhs` with `rhs`.
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

/// Ascending order given by [`Ord`]. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Descending order given by [`Ord`].
///
/// ```
/// use avlmap::{AvlTreeMap, Descending};
/// let mut map = AvlTreeMap::with_comparator(Descending);
/// map.insert(1, "a");
/// map.insert(3, "c");
/// map.insert(2, "b");
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Descending;

impl<T: Ord + ?Sized> Compare<T> for Descending {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        rhs.cmp(lhs)
    }
}

/// Adapts a closure into a [`Compare`].
///
/// ```
/// use avlmap::{AvlTreeMap, FnComparator};
/// let by_len = FnComparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// let mut map = AvlTreeMap::with_comparator(by_len);
/// map.insert("ccc", 3);
/// map.insert("a", 1);
/// map.insert("bb", 2);
/// map.insert("zz", 20);
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.get(&"xx"), Some(&20));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct FnComparator<F>(pub F);

impl<T: ?Sized, F> Compare<T> for FnComparator<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        (self.0)(lhs, rhs)
    }
}

impl<T: ?Sized, C: Compare<T> + ?Sized> Compare<T> for &C {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        (**self).compare(lhs, rhs)
    }
}
