//! Error types of the map.

use std::fmt;

/// Returned by [`AvlTreeMap::try_get`] when the map holds no entry for the requested key.
///
/// [`AvlTreeMap::try_get`]: crate::AvlTreeMap::try_get
///
/// ```
/// use avlmap::{AvlTreeMap, KeyNotFoundError};
/// let map = AvlTreeMap::<i32, i32>::new();
/// assert_eq!(map.try_get(&1), Err(KeyNotFoundError));
/// assert_eq!(KeyNotFoundError.to_string(), "key not found");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyNotFoundError;

impl fmt::Display for KeyNotFoundError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("key not found")
    }
}

impl std::error::Error for KeyNotFoundError {}
