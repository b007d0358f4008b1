//! Positions within an [`AvlTreeMap`].
//!
//! A cursor points either at an element or at the end of the map, one past the
//! last element. Cursors borrow the map, so no element can be inserted or removed
//! while a cursor is alive. Moving a cursor walks the tree through parent links
//! and takes O(log n) time at most.
//!
//! ```
//! use avlmap::AvlTreeMap;
//! let map = AvlTreeMap::from([(1, "one"), (2, "two"), (3, "three")]);
//! let mut cursor = map.find(&2);
//! assert_eq!(cursor.value(), Some(&"two"));
//! cursor.move_next();
//! assert_eq!(cursor.key(), Some(&3));
//! cursor.move_next();
//! assert!(cursor.is_end());
//! assert_eq!(cursor, map.cursor_end());
//! cursor.move_prev();
//! assert_eq!(cursor.key(), Some(&3));
//! ```

use std::fmt;
use std::marker::PhantomData;

use super::{Link, Node};

/// A position within a map that gives shared access to its element.
pub struct Cursor<'a, K, V> {
    current: Link<K, V>,
    root: Link<K, V>,
    marker: PhantomData<&'a Node<K, V>>,
}

/// A position within a map that gives mutable access to the value of its element.
/// The keys and the shape of the map cannot be changed through it.
pub struct CursorMut<'a, K, V> {
    current: Link<K, V>,
    root: Link<K, V>,
    marker: PhantomData<&'a mut Node<K, V>>,
}

unsafe impl<K: Sync, V: Sync> Send for Cursor<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for Cursor<'_, K, V> {}
unsafe impl<K: Sync, V: Send> Send for CursorMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for CursorMut<'_, K, V> {}

/// Advances `current` in order; the end stays at the end.
fn next_link<K, V>(current: Link<K, V>) -> Link<K, V> {
    current.and_then(|node_ptr| unsafe { Node::successor(node_ptr) })
}

/// Moves `current` back in order; from the end this is the last element,
/// before the first element it is the end again.
fn prev_link<K, V>(current: Link<K, V>, root: Link<K, V>) -> Link<K, V> {
    match current {
        Some(node_ptr) => unsafe { Node::predecessor(node_ptr) },
        None => root.map(|root_ptr| unsafe { Node::rightmost(root_ptr) }),
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(super) fn new(current: Link<K, V>, root: Link<K, V>) -> Self {
        Self {
            current,
            root,
            marker: PhantomData,
        }
    }

    /// Returns true if the cursor points at the end of the map.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key of the element under the cursor, `None` at the end.
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value of the element under the cursor, `None` at the end.
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns the element under the cursor, `None` at the end.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.current
            .map(|node_ptr| unsafe { Node::key_value(node_ptr) })
    }

    /// Moves the cursor to the next element in order,
    /// or to the end if it was at the last element.
    /// A cursor at the end stays there.
    pub fn move_next(&mut self) {
        self.current = next_link(self.current);
    }

    /// Moves the cursor to the previous element in order.
    /// A cursor at the end moves to the last element;
    /// a cursor at the first element moves to the end.
    pub fn move_prev(&mut self) {
        self.current = prev_link(self.current, self.root);
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    /// Cursors are equal if they point at the same element, or are both at the end.
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(super) fn new(current: Link<K, V>, root: Link<K, V>) -> Self {
        Self {
            current,
            root,
            marker: PhantomData,
        }
    }

    /// Returns true if the cursor points at the end of the map.
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key of the element under the cursor, `None` at the end.
    pub fn key(&self) -> Option<&K> {
        self.key_value().map(|(key, _)| key)
    }

    /// Returns the value of the element under the cursor, `None` at the end.
    pub fn value(&self) -> Option<&V> {
        self.key_value().map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value under the cursor, `None` at the end.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.key_value_mut().map(|(_, value)| value)
    }

    /// Returns the element under the cursor, `None` at the end.
    pub fn key_value(&self) -> Option<(&K, &V)> {
        self.current
            .map(|node_ptr| unsafe { Node::key_value(node_ptr) })
    }

    /// Returns the element under the cursor with a mutable value, `None` at the end.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.current
            .map(|node_ptr| unsafe { Node::key_value_mut(node_ptr) })
    }

    /// Moves the cursor to the next element in order,
    /// or to the end if it was at the last element.
    pub fn move_next(&mut self) {
        self.current = next_link(self.current);
    }

    /// Moves the cursor to the previous element in order,
    /// see [`Cursor::move_prev`].
    pub fn move_prev(&mut self) {
        self.current = prev_link(self.current, self.root);
    }

    /// Returns a read-only cursor at the same position,
    /// borrowing this one for the lifetime of the result.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.current, self.root)
    }

    /// Converts into a mutable reference to the value under the cursor,
    /// with the lifetime of the map borrow.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        self.current
            .map(|node_ptr| unsafe { Node::key_value_mut(node_ptr).1 })
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.key_value()).finish()
    }
}
