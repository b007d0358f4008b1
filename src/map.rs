//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Bound, Index, RangeBounds};
use std::ptr::NonNull;

use crate::compare::{Compare, Natural};
use crate::error::KeyNotFoundError;

mod cursor;
mod iter;

pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter, IterMut, Keys, Range, Values, ValuesMut};

/// An ordered map implemented with an AVL tree.
///
/// Keys are unique and kept in the order given by the comparator `C`
/// (ascending [`Ord`] order by default).
///
/// ```
/// use avlmap::AvlTreeMap;
/// let mut map = AvlTreeMap::new();
/// map.insert(0, "zero");
/// map.insert(1, "one");
/// map.insert(2, "two");
/// assert_eq!(map.get(&1), Some(&"one"));
/// map.remove(&1);
/// assert!(map.get(&1).is_none());
/// ```
pub struct AvlTreeMap<K, V, C = Natural> {
    root: Link<K, V>,
    num_nodes: usize,
    comparator: C,
    marker: PhantomData<Box<Node<K, V>>>,
}

struct Node<K, V> {
    key: K,
    value: V,
    left: Link<K, V>,
    right: Link<K, V>,
    parent: Link<K, V>,
    height: usize,
}

type NodePtr<K, V> = NonNull<Node<K, V>>;
type Link<K, V> = Option<NodePtr<K, V>>;

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

// Links are owning pointers into a tree that is never shared between maps.
unsafe impl<K: Send, V: Send, C: Send> Send for AvlTreeMap<K, V, C> {}
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for AvlTreeMap<K, V, C> {}

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map ordered by [`Ord`].
    /// No memory is allocated until the first item is inserted.
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            comparator,
            marker: PhantomData,
        }
    }

    /// Returns a reference to the comparator of the map.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree, 0 for an empty map.
    pub fn height(&self) -> usize {
        height(self.root)
    }

    /// Clears the map, deallocating all memory.
    pub fn clear(&mut self) {
        self.postorder(|node_ptr| unsafe {
            Node::destroy(node_ptr);
        });
        self.root = None;
        self.num_nodes = 0;
    }

    /// Exchanges the contents of two maps in constant time.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Returns the first key-value pair in the map, i.e. the one with the minimum key.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root_ptr| unsafe { Node::key_value(Node::leftmost(root_ptr)) })
    }

    /// Returns the last key-value pair in the map, i.e. the one with the maximum key.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root
            .map(|root_ptr| unsafe { Node::key_value(Node::rightmost(root_ptr)) })
    }

    /// Removes and returns the first element in the map.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let root_ptr = self.root?;
        let (root, min_ptr) = unsafe { Self::detach_min(root_ptr) };
        self.root = root;
        self.num_nodes -= 1;
        Some(unsafe { Node::destroy(min_ptr) })
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let root_ptr = self.root?;
        let (root, max_ptr) = unsafe { Self::detach_max(root_ptr) };
        self.root = root;
        self.num_nodes -= 1;
        Some(unsafe { Node::destroy(max_ptr) })
    }

    /// Retains only the elements for which the predicate returns true.
    /// The predicate visits the elements in ascending order.
    ///
    /// If the predicate panics, no element is removed.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        // The tree is only restructured once every element has been visited.
        let keep: Vec<bool> = self.iter_mut().map(|(key, value)| f(key, value)).collect();
        let num_kept = keep.iter().filter(|&&kept| kept).count();
        if num_kept == self.num_nodes {
            return;
        }

        let mut kept = Vec::with_capacity(num_kept);
        for is_kept in keep {
            if let Some(entry) = self.pop_first() {
                if is_kept {
                    kept.push(entry);
                }
            }
        }
        self.root = Self::build_sorted(kept, None);
        self.num_nodes = num_kept;
    }

    /// Gets a cursor at the first element of the map, or at the end if the map is empty.
    pub fn cursor_first(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.root.map(|root_ptr| unsafe { Node::leftmost(root_ptr) }), self.root)
    }

    /// Gets a cursor at the end of the map, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        Cursor::new(None, self.root)
    }

    /// Gets a mutable cursor at the first element of the map.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::new(self.root.map(|root_ptr| unsafe { Node::leftmost(root_ptr) }), self.root)
    }

    /// Gets a mutable cursor at the end of the map.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, K, V> {
        CursorMut::new(None, self.root)
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self)
    where
        C: Compare<K>,
    {
        unsafe {
            // Check root link
            if let Some(root_node_ptr) = self.root {
                assert!(root_node_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            self.preorder(|node_ptr| {
                let node = node_ptr.as_ref();
                let left_height = height(node.left);
                let right_height = height(node.right);

                // Check link for left child node
                if let Some(left_ptr) = node.left {
                    assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    assert_eq!(
                        self.comparator.compare(&left_ptr.as_ref().key, &node.key),
                        Ordering::Less
                    );
                }

                // Check link for right child node
                if let Some(right_ptr) = node.right {
                    assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    assert_eq!(
                        self.comparator.compare(&right_ptr.as_ref().key, &node.key),
                        Ordering::Greater
                    );
                }

                // Check height
                assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

                // Check AVL condition (nearly balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            });

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);

            // Check in-order walk is strictly ascending
            let mut walked = 0;
            let mut prev: Option<&K> = None;
            for key in self.keys() {
                if let Some(prev) = prev {
                    assert_eq!(self.comparator.compare(prev, key), Ordering::Less);
                }
                prev = Some(key);
                walked += 1;
            }
            assert_eq!(walked, self.num_nodes);
        }
    }

    /// Restores AVL condition (balance) at the given subtree root and adjusts its height.
    /// Both child subtrees must already be balanced and differ in height by at most 2.
    /// Returns the new subtree root, linked to the old root's parent.
    unsafe fn balance(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        update_height(node_ptr);
        let balance = balance_factor(node_ptr);
        debug_assert!((-2..=2).contains(&balance));
        match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
            (Some(mut left_ptr), _) if balance > 1 => {
                // Left heavy, rotate right
                if let (true, Some(left_right_ptr)) =
                    (balance_factor(left_ptr) < 0, left_ptr.as_ref().right)
                {
                    left_ptr = Self::rotate_left(left_ptr, left_right_ptr);
                    node_ptr.as_mut().left = Some(left_ptr);
                }
                Self::rotate_right(node_ptr, left_ptr)
            }
            (_, Some(mut right_ptr)) if balance < -1 => {
                // Right heavy, rotate left
                if let (true, Some(right_left_ptr)) =
                    (balance_factor(right_ptr) > 0, right_ptr.as_ref().left)
                {
                    right_ptr = Self::rotate_right(right_ptr, right_left_ptr);
                    node_ptr.as_mut().right = Some(right_ptr);
                }
                Self::rotate_left(node_ptr, right_ptr)
            }
            _ => node_ptr,
        }
    }

    /// Promotes `right_ptr`, the right child of the given subtree root, and returns it.
    unsafe fn rotate_left(mut node_ptr: NodePtr<K, V>, mut right_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        debug_assert!(node_ptr.as_ref().right == Some(right_ptr));
        node_ptr.as_mut().right = right_ptr.as_ref().left;
        if let Some(mut right_left_ptr) = right_ptr.as_ref().left {
            right_left_ptr.as_mut().parent = Some(node_ptr);
        }

        right_ptr.as_mut().parent = node_ptr.as_ref().parent;
        right_ptr.as_mut().left = Some(node_ptr);
        node_ptr.as_mut().parent = Some(right_ptr);

        update_height(node_ptr);
        update_height(right_ptr);
        right_ptr
    }

    /// Promotes `left_ptr`, the left child of the given subtree root, and returns it.
    unsafe fn rotate_right(mut node_ptr: NodePtr<K, V>, mut left_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        debug_assert!(node_ptr.as_ref().left == Some(left_ptr));
        node_ptr.as_mut().left = left_ptr.as_ref().right;
        if let Some(mut left_right_ptr) = left_ptr.as_ref().right {
            left_right_ptr.as_mut().parent = Some(node_ptr);
        }

        left_ptr.as_mut().parent = node_ptr.as_ref().parent;
        left_ptr.as_mut().right = Some(node_ptr);
        node_ptr.as_mut().parent = Some(left_ptr);

        update_height(node_ptr);
        update_height(left_ptr);
        left_ptr
    }

    /// Unlinks the minimum node of the given subtree, rebalancing on the way back up.
    /// Returns the new subtree root and the detached node.
    unsafe fn detach_min(mut node_ptr: NodePtr<K, V>) -> (Link<K, V>, NodePtr<K, V>) {
        match node_ptr.as_ref().left {
            None => {
                let right = node_ptr.as_ref().right;
                if let Some(mut right_ptr) = right {
                    right_ptr.as_mut().parent = node_ptr.as_ref().parent;
                }
                node_ptr.as_mut().right = None;
                node_ptr.as_mut().parent = None;
                (right, node_ptr)
            }
            Some(left_ptr) => {
                let (left, min_ptr) = Self::detach_min(left_ptr);
                node_ptr.as_mut().left = left;
                (Some(Self::balance(node_ptr)), min_ptr)
            }
        }
    }

    /// Unlinks the maximum node of the given subtree, rebalancing on the way back up.
    unsafe fn detach_max(mut node_ptr: NodePtr<K, V>) -> (Link<K, V>, NodePtr<K, V>) {
        match node_ptr.as_ref().right {
            None => {
                let left = node_ptr.as_ref().left;
                if let Some(mut left_ptr) = left {
                    left_ptr.as_mut().parent = node_ptr.as_ref().parent;
                }
                node_ptr.as_mut().left = None;
                node_ptr.as_mut().parent = None;
                (left, node_ptr)
            }
            Some(right_ptr) => {
                let (right, max_ptr) = Self::detach_max(right_ptr);
                node_ptr.as_mut().right = right;
                (Some(Self::balance(node_ptr)), max_ptr)
            }
        }
    }

    /// Removes the given node from its subtree and returns the new subtree root
    /// together with the removed key-value pair.
    unsafe fn unlink_node(mut node_ptr: NodePtr<K, V>) -> (Link<K, V>, (K, V)) {
        let parent = node_ptr.as_ref().parent;
        match (node_ptr.as_ref().left, node_ptr.as_ref().right) {
            (None, child) | (child, None) => {
                // Node is stem or leaf, replace by its only child
                if let Some(mut child_ptr) = child {
                    child_ptr.as_mut().parent = parent;
                }
                (child, Node::destroy(node_ptr))
            }
            (Some(_), Some(right_ptr)) => {
                // Take over key and value of the in-order successor,
                // then drop the successor node in its place.
                let (right, mut min_ptr) = Self::detach_min(right_ptr);
                node_ptr.as_mut().right = right;
                mem::swap(&mut node_ptr.as_mut().key, &mut min_ptr.as_mut().key);
                mem::swap(&mut node_ptr.as_mut().value, &mut min_ptr.as_mut().value);
                (Some(Self::balance(node_ptr)), Node::destroy(min_ptr))
            }
        }
    }

    /// Builds a balanced subtree from entries in ascending key order.
    /// The middle entry becomes the subtree root.
    fn build_sorted(mut entries: Vec<(K, V)>, parent: Link<K, V>) -> Link<K, V> {
        let mid = entries.len() / 2;
        let upper = entries.split_off(cmp::min(mid + 1, entries.len()));
        let (key, value) = entries.pop()?;
        let mut node_ptr = Node::create(parent, key, value);
        unsafe {
            node_ptr.as_mut().left = Self::build_sorted(entries, Some(node_ptr));
            node_ptr.as_mut().right = Self::build_sorted(upper, Some(node_ptr));
            update_height(node_ptr);
        }
        Some(node_ptr)
    }

    #[cfg(any(test, feature = "consistency_check"))]
    fn preorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(f, |_| {}, |_| {});
    }

    fn postorder<F: FnMut(NodePtr<K, V>)>(&self, f: F) {
        self.traverse(|_| {}, |_| {}, f);
    }

    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodePtr<K, V>),
        In: FnMut(NodePtr<K, V>),
        Post: FnMut(NodePtr<K, V>),
    {
        if let Some(mut node_ptr) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                match dir {
                    Direction::FromParent => {
                        preorder(node_ptr);
                        if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                            node_ptr = left_ptr;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_ptr);
                        if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                            node_ptr = right_ptr;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        // Post order traversal is used for node deletion,
                        // so make sure not to use node pointer after postorder call.
                        if let Some(parent_ptr) = unsafe { node_ptr.as_ref().parent } {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr);
                            node_ptr = parent_ptr;
                        } else {
                            postorder(node_ptr);
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl<K, V, C: Compare<K>> AvlTreeMap<K, V, C> {
    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    /// Otherwise the value is updated in place and the old value is returned;
    /// the key itself is not replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let (root_ptr, mut node_ptr, unused) = self.insert_at(self.root, None, key, || value);
        self.root = Some(root_ptr);
        unused.map(|make_value| unsafe { mem::replace(&mut node_ptr.as_mut().value, make_value()) })
    }

    /// Returns a mutable reference to the value for `key`,
    /// inserting `V::default()` first if the key is absent.
    ///
    /// Unlike indexing, this auto-vivifies missing keys:
    ///
    /// ```
    /// use avlmap::AvlTreeMap;
    /// let mut counts: AvlTreeMap<&str, i32> = AvlTreeMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Returns a mutable reference to the value for `key`,
    /// inserting the result of `f` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let (root_ptr, mut node_ptr, _) = self.insert_at(self.root, None, key, f);
        self.root = Some(root_ptr);
        unsafe { &mut node_ptr.as_mut().value }
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    /// Values of `other` replace values of `self` for equal keys.
    pub fn append<D>(&mut self, other: &mut AvlTreeMap<K, V, D>) {
        while let Some((key, value)) = other.pop_first() {
            self.insert(key, value);
        }
    }

    /// Inserts below `link`, whose parent is `parent`, creating the value with `make_value`
    /// only if `key` is absent.
    /// Returns the new subtree root and the node holding `key`. If the key was already
    /// present, its node is left as it is and `make_value` is handed back unused.
    fn insert_at<F>(
        &mut self,
        link: Link<K, V>,
        parent: Link<K, V>,
        key: K,
        make_value: F,
    ) -> (NodePtr<K, V>, NodePtr<K, V>, Option<F>)
    where
        F: FnOnce() -> V,
    {
        let Some(mut node_ptr) = link else {
            let node_ptr = Node::create(parent, key, make_value());
            self.num_nodes += 1;
            return (node_ptr, node_ptr, None);
        };
        unsafe {
            match self.comparator.compare(&key, &node_ptr.as_ref().key) {
                Ordering::Less => {
                    let (left_ptr, target, unused) =
                        self.insert_at(node_ptr.as_ref().left, Some(node_ptr), key, make_value);
                    if unused.is_some() {
                        return (node_ptr, target, unused);
                    }
                    node_ptr.as_mut().left = Some(left_ptr);
                    (Self::balance(node_ptr), target, None)
                }
                Ordering::Greater => {
                    let (right_ptr, target, unused) =
                        self.insert_at(node_ptr.as_ref().right, Some(node_ptr), key, make_value);
                    if unused.is_some() {
                        return (node_ptr, target, unused);
                    }
                    node_ptr.as_mut().right = Some(right_ptr);
                    (Self::balance(node_ptr), target, None)
                }
                Ordering::Equal => (node_ptr, node_ptr, Some(make_value)),
            }
        }
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key)
            .map(|node_ptr| unsafe { &(*node_ptr.as_ptr()).value })
    }

    /// Returns a reference to the value corresponding to the key,
    /// or [`KeyNotFoundError`] if the key is absent. Never modifies the map.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, KeyNotFoundError>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get(key).ok_or(KeyNotFoundError)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key)
            .map(|node_ptr| unsafe { &mut (*node_ptr.as_ptr()).value })
    }

    /// Returns references to the key-value pair corresponding to the key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key)
            .map(|node_ptr| unsafe { Node::key_value(node_ptr) })
    }

    /// Returns true if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns the number of elements with the given key, which is either 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        usize::from(self.contains_key(key))
    }

    /// Removes a key from the map.
    /// Returns the value at the key if the key was previously in the map.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map.
    /// Returns the stored key and value if the key was previously in the map.
    /// Removing an absent key leaves the map untouched.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let (root, removed) = self.remove_at(self.root?, key);
        if removed.is_some() {
            debug_assert!(self.num_nodes >= 1);
            self.root = root;
            self.num_nodes -= 1;
        }
        removed
    }

    /// Gets a cursor at the element with the given key, or at the end if the key is absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.find_node(key), self.root)
    }

    /// Gets a mutable cursor at the element with the given key, or at the end if the key is absent.
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        CursorMut::new(self.find_node(key), self.root)
    }

    /// Gets a cursor at the first element whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.lower_node(Bound::Included(key)), self.root)
    }

    /// Gets a cursor at the first element whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(self.lower_node(Bound::Excluded(key)), self.root)
    }

    /// Gets the span of elements whose keys compare equal to `key`,
    /// as a pair of `(lower_bound, upper_bound)` cursors.
    /// Since keys are unique the span holds at most one element.
    ///
    /// ```
    /// use avlmap::AvlTreeMap;
    /// let map = AvlTreeMap::from([(1, 'a'), (3, 'c'), (5, 'e')]);
    /// let (first, last) = map.equal_range(&3);
    /// assert_eq!(first.key_value(), Some((&3, &'c')));
    /// assert_eq!(last.key(), Some(&5));
    /// let (first, last) = map.equal_range(&4);
    /// assert_eq!(first, last);
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V>, Cursor<'_, K, V>)
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Gets an iterator over a sub-range of elements in the map in sorted order.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    pub fn range<Q, R>(&self, range: R) -> Range<'_, K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        R: RangeBounds<Q>,
        Q: ?Sized,
    {
        let start = range.start_bound();
        let end = range.end_bound();
        match (start, end) {
            (Bound::Excluded(s), Bound::Excluded(e)) => match self.comparator.compare(s, e) {
                Ordering::Greater => panic!("range start is greater than range end"),
                Ordering::Equal => panic!("range start and end are equal and excluded"),
                Ordering::Less => {}
            },
            (Bound::Included(s) | Bound::Excluded(s), Bound::Included(e) | Bound::Excluded(e)) => {
                if self.comparator.compare(s, e) == Ordering::Greater {
                    panic!("range start is greater than range end");
                }
            }
            _ => {}
        }

        let front = self.lower_node(start);
        let back = self.upper_node(end);
        match (front, back) {
            (Some(front_ptr), Some(back_ptr)) => unsafe {
                let front_key: &Q = front_ptr.as_ref().key.borrow();
                let back_key: &Q = back_ptr.as_ref().key.borrow();
                if self.comparator.compare(front_key, back_key) == Ordering::Greater {
                    Range::empty()
                } else {
                    Range::new(front_ptr, back_ptr)
                }
            },
            _ => Range::empty(),
        }
    }

    fn find_node<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match self.comparator.compare(key, node_ptr.as_ref().key.borrow()) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    /// Finds the first node satisfying the lower bound.
    fn lower_node<Q>(&self, bound: Bound<&Q>) -> Link<K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut current = self.root;
        let mut candidate = None;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            let inside = match bound {
                Bound::Included(key) => {
                    self.comparator.compare(node.key.borrow(), key) != Ordering::Less
                }
                Bound::Excluded(key) => {
                    self.comparator.compare(node.key.borrow(), key) == Ordering::Greater
                }
                Bound::Unbounded => true,
            };
            if inside {
                candidate = current;
                current = node.left;
            } else {
                current = node.right;
            }
        }
        candidate
    }

    /// Finds the last node satisfying the upper bound.
    fn upper_node<Q>(&self, bound: Bound<&Q>) -> Link<K, V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut current = self.root;
        let mut candidate = None;
        while let Some(node_ptr) = current {
            let node = unsafe { node_ptr.as_ref() };
            let inside = match bound {
                Bound::Included(key) => {
                    self.comparator.compare(node.key.borrow(), key) != Ordering::Greater
                }
                Bound::Excluded(key) => {
                    self.comparator.compare(node.key.borrow(), key) == Ordering::Less
                }
                Bound::Unbounded => true,
            };
            if inside {
                candidate = current;
                current = node.right;
            } else {
                current = node.left;
            }
        }
        candidate
    }

    /// Removes `key` below the subtree rooted at `node_ptr`.
    /// Returns the new subtree root and the removed entry.
    /// The subtree is left untouched if the key is absent.
    fn remove_at<Q>(&self, mut node_ptr: NodePtr<K, V>, key: &Q) -> (Link<K, V>, Option<(K, V)>)
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        unsafe {
            match self.comparator.compare(key, node_ptr.as_ref().key.borrow()) {
                Ordering::Less => {
                    let Some(left_ptr) = node_ptr.as_ref().left else {
                        return (Some(node_ptr), None);
                    };
                    let (left, removed) = self.remove_at(left_ptr, key);
                    if removed.is_none() {
                        return (Some(node_ptr), None);
                    }
                    node_ptr.as_mut().left = left;
                    (Some(Self::balance(node_ptr)), removed)
                }
                Ordering::Greater => {
                    let Some(right_ptr) = node_ptr.as_ref().right else {
                        return (Some(node_ptr), None);
                    };
                    let (right, removed) = self.remove_at(right_ptr, key);
                    if removed.is_none() {
                        return (Some(node_ptr), None);
                    }
                    node_ptr.as_mut().right = right;
                    (Some(Self::balance(node_ptr)), removed)
                }
                Ordering::Equal => {
                    let (link, removed) = Self::unlink_node(node_ptr);
                    (link, Some(removed))
                }
            }
        }
    }
}

impl<K, V, C> Drop for AvlTreeMap<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, C: Default> Default for AvlTreeMap<K, V, C> {
    /// Creates an empty map.
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for AvlTreeMap<K, V, C> {
    /// Deep-copies the tree; the clone shares no nodes with `self`.
    fn clone(&self) -> Self {
        Self {
            root: self
                .root
                .map(|root_ptr| unsafe { Node::clone_subtree(root_ptr, None) }),
            num_nodes: self.num_nodes,
            comparator: self.comparator.clone(),
            marker: PhantomData,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlTreeMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for AvlTreeMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for AvlTreeMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, V: Hash, C> Hash for AvlTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self {
            entry.hash(state);
        }
    }
}

impl<K, V, C, Q> Index<&Q> for AvlTreeMap<K, V, C>
where
    K: Borrow<Q>,
    C: Compare<Q>,
    Q: ?Sized,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for AvlTreeMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

// Tied to the default comparator so that `AvlTreeMap::from([...])` needs no annotation.
impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for AvlTreeMap<K, V, C> {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        iter.into_iter().for_each(move |(key, value)| {
            self.insert(key, value);
        });
    }
}

impl<'a, K, V, C> Extend<(&'a K, &'a V)> for AvlTreeMap<K, V, C>
where
    K: Copy + 'a,
    V: Copy + 'a,
    C: Compare<K>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K, V> Node<K, V> {
    fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Frees the node and hands back its entry. Links are not touched.
    unsafe fn destroy(node_ptr: NodePtr<K, V>) -> (K, V) {
        let node = Box::from_raw(node_ptr.as_ptr());
        (node.key, node.value)
    }

    unsafe fn key_value<'a>(node_ptr: NodePtr<K, V>) -> (&'a K, &'a V) {
        let node = &*node_ptr.as_ptr();
        (&node.key, &node.value)
    }

    unsafe fn key_value_mut<'a>(node_ptr: NodePtr<K, V>) -> (&'a K, &'a mut V) {
        let node = &mut *node_ptr.as_ptr();
        (&node.key, &mut node.value)
    }

    unsafe fn leftmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(left_ptr) = node_ptr.as_ref().left {
            node_ptr = left_ptr;
        }
        node_ptr
    }

    unsafe fn rightmost(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        while let Some(right_ptr) = node_ptr.as_ref().right {
            node_ptr = right_ptr;
        }
        node_ptr
    }

    /// In-order successor, found through the right subtree or else the parent links.
    unsafe fn successor(node_ptr: NodePtr<K, V>) -> Link<K, V> {
        if let Some(right_ptr) = node_ptr.as_ref().right {
            return Some(Self::leftmost(right_ptr));
        }
        let mut child_ptr = node_ptr;
        while let Some(parent_ptr) = child_ptr.as_ref().parent {
            if parent_ptr.as_ref().left == Some(child_ptr) {
                return Some(parent_ptr);
            }
            child_ptr = parent_ptr;
        }
        None
    }

    /// In-order predecessor, the mirror image of `successor`.
    unsafe fn predecessor(node_ptr: NodePtr<K, V>) -> Link<K, V> {
        if let Some(left_ptr) = node_ptr.as_ref().left {
            return Some(Self::rightmost(left_ptr));
        }
        let mut child_ptr = node_ptr;
        while let Some(parent_ptr) = child_ptr.as_ref().parent {
            if parent_ptr.as_ref().right == Some(child_ptr) {
                return Some(parent_ptr);
            }
            child_ptr = parent_ptr;
        }
        None
    }

    unsafe fn clone_subtree(node_ptr: NodePtr<K, V>, parent: Link<K, V>) -> NodePtr<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let node = node_ptr.as_ref();
        let mut copy_ptr = Self::create(parent, node.key.clone(), node.value.clone());
        copy_ptr.as_mut().height = node.height;
        if let Some(left_ptr) = node.left {
            copy_ptr.as_mut().left = Some(Self::clone_subtree(left_ptr, Some(copy_ptr)));
        }
        if let Some(right_ptr) = node.right {
            copy_ptr.as_mut().right = Some(Self::clone_subtree(right_ptr, Some(copy_ptr)));
        }
        copy_ptr
    }
}

fn height<K, V>(link: Link<K, V>) -> usize {
    match link {
        None => 0,
        Some(node_ptr) => unsafe { node_ptr.as_ref().height },
    }
}

fn balance_factor<K, V>(node_ptr: NodePtr<K, V>) -> isize {
    let node = unsafe { node_ptr.as_ref() };
    height(node.left) as isize - height(node.right) as isize
}

fn update_height<K, V>(mut node_ptr: NodePtr<K, V>) {
    unsafe {
        let node = node_ptr.as_mut();
        node.height = 1 + cmp::max(height(node.left), height(node.right));
    }
}
