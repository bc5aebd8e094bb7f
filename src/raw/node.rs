use core::borrow::Borrow;
use core::mem;

use smallvec::SmallVec;

use super::handle::Handle;

/// Inline capacity for node storage; trees with orders above this spill the
/// per-node vectors to the heap. The order is a runtime parameter, so the
/// inline capacity is a fixed compromise rather than a function of it.
pub(crate) const INLINE_KEYS: usize = 8;
pub(crate) const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

/// A single B-tree node.
///
/// Unlike a B+tree there is one node shape: every node stores real keys, and
/// a node is a leaf exactly when it has no children. An internal node always
/// holds one more child than keys, with `children[i]` covering the key range
/// below `keys[i]` and `children[keys.len()]` the range above the last key.
#[derive(Clone)]
pub(crate) struct Node<K> {
    keys: SmallVec<[K; INLINE_KEYS]>,
    children: SmallVec<[Handle; INLINE_CHILDREN]>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into, which is also
    /// the insertion position for a leaf.
    NotFound(usize),
}

impl<K> Node<K> {
    /// Creates a new empty leaf node.
    pub(crate) fn new_leaf() -> Self {
        Self {
            keys: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Creates a new internal node holding a single child and no keys.
    ///
    /// This shape only ever exists transiently: it is the freshly grown root
    /// whose lone child is about to split into it.
    pub(crate) fn new_root_above(child: Handle) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self {
            keys: SmallVec::new(),
            children,
        }
    }

    /// Returns true if this node has no children.
    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of keys in this node.
    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of children in this node (zero for leaves).
    #[inline]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns the key at the given index.
    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    /// Returns all keys.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Returns the child handle at the given index.
    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    /// Returns all child handles.
    #[cfg(test)]
    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Returns the smallest key, if any.
    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    /// Returns the greatest key, if any.
    pub(crate) fn last_key(&self) -> Option<&K> {
        self.keys.last()
    }

    /// Searches this node's key list.
    ///
    /// `NotFound(i)` names the child whose range covers the probe: the slot
    /// below the smallest key strictly greater than it, or the last child
    /// when the probe exceeds every key.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Inserts a key at the given position.
    pub(crate) fn insert_key(&mut self, index: usize, key: K) {
        self.keys.insert(index, key);
    }

    /// Removes and returns the key at the given position.
    pub(crate) fn remove_key(&mut self, index: usize) -> K {
        self.keys.remove(index)
    }

    /// Replaces the key at the given position, returning the old key.
    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        mem::replace(&mut self.keys[index], key)
    }

    /// Inserts a child handle at the given position.
    pub(crate) fn insert_child(&mut self, index: usize, child: Handle) {
        self.children.insert(index, child);
    }

    /// Removes and returns the child handle at the given position.
    pub(crate) fn remove_child(&mut self, index: usize) -> Handle {
        self.children.remove(index)
    }

    /// Pushes a key past the current greatest.
    pub(crate) fn push_key(&mut self, key: K) {
        self.keys.push(key);
    }

    /// Pushes a key before the current smallest.
    pub(crate) fn push_key_front(&mut self, key: K) {
        self.keys.insert(0, key);
    }

    /// Pops the greatest key.
    pub(crate) fn pop_key(&mut self) -> Option<K> {
        self.keys.pop()
    }

    /// Pops the smallest key.
    pub(crate) fn pop_key_front(&mut self) -> Option<K> {
        if self.keys.is_empty() { None } else { Some(self.keys.remove(0)) }
    }

    /// Pushes a child handle past the current last.
    pub(crate) fn push_child(&mut self, child: Handle) {
        self.children.push(child);
    }

    /// Pushes a child handle before the current first.
    pub(crate) fn push_child_front(&mut self, child: Handle) {
        self.children.insert(0, child);
    }

    /// Pops the last child handle.
    pub(crate) fn pop_child(&mut self) -> Option<Handle> {
        self.children.pop()
    }

    /// Pops the first child handle.
    pub(crate) fn pop_child_front(&mut self) -> Option<Handle> {
        if self.children.is_empty() { None } else { Some(self.children.remove(0)) }
    }

    /// Splits an overfull node around its median key.
    ///
    /// The median sits at index `keys.len() / 2` (floor division; for even
    /// key counts this tie-breaks by promoting the lower-middle slot). Keys
    /// and children past the median move into a fresh right sibling, the
    /// median itself is removed and returned for promotion into the parent.
    pub(crate) fn split_at_median(&mut self) -> (K, Node<K>) {
        let mid = self.keys.len() / 2;

        let mut right = Node::new_leaf();
        right.keys = self.keys.drain(mid + 1..).collect();
        if !self.children.is_empty() {
            right.children = self.children.drain(mid + 1..).collect();
        }

        // The median is now the last remaining key.
        let median = self.keys.pop().expect("`Node::split_at_median()` - node has no keys!");

        (median, right)
    }

    /// Absorbs a right sibling and the separator key between them.
    ///
    /// Keys and children concatenate in order, so the result is a valid node
    /// covering the union of both ranges.
    pub(crate) fn merge_with_right(&mut self, separator: K, mut right: Node<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_of(keys: &[i32]) -> Node<i32> {
        let mut node = Node::new_leaf();
        for &k in keys {
            node.push_key(k);
        }
        node
    }

    #[test]
    fn split_odd_key_count() {
        // Median of [1, 2, 3] is index 1.
        let mut node = leaf_of(&[1, 2, 3]);
        let (median, right) = node.split_at_median();

        assert_eq!(median, 2);
        assert_eq!(node.keys(), &[1]);
        assert_eq!(right.keys(), &[3]);
    }

    #[test]
    fn split_even_key_count_promotes_floor_median() {
        // Median of [1, 2, 3, 4] is index 4 / 2 = 2, the documented tie-break.
        let mut node = leaf_of(&[1, 2, 3, 4]);
        let (median, right) = node.split_at_median();

        assert_eq!(median, 3);
        assert_eq!(node.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[4]);
    }

    #[test]
    fn split_internal_partitions_children() {
        let mut node = leaf_of(&[10, 20, 30]);
        for i in 0..4 {
            node.push_child(Handle::from_index(i));
        }

        let (median, right) = node.split_at_median();

        assert_eq!(median, 20);
        assert_eq!(node.keys(), &[10]);
        assert_eq!(right.keys(), &[30]);
        assert_eq!(node.children(), &[Handle::from_index(0), Handle::from_index(1)]);
        assert_eq!(right.children(), &[Handle::from_index(2), Handle::from_index(3)]);
    }

    #[test]
    fn merge_concatenates_in_order() {
        let mut left = leaf_of(&[1, 2]);
        let right = leaf_of(&[7, 9]);

        left.merge_with_right(5, right);

        assert_eq!(left.keys(), &[1, 2, 5, 7, 9]);
        assert!(left.is_leaf());
    }

    #[test]
    fn search_reports_descent_slot() {
        let node = leaf_of(&[10, 20, 30]);

        assert!(matches!(node.search(&20), SearchResult::Found(1)));
        assert!(matches!(node.search(&5), SearchResult::NotFound(0)));
        assert!(matches!(node.search(&25), SearchResult::NotFound(2)));
        assert!(matches!(node.search(&99), SearchResult::NotFound(3)));
    }
}
