//! The public B-tree set.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::raw::{Handle, RawBTree};

/// An ordered set of unique keys, stored as a B-tree of a runtime-chosen
/// branching factor.
///
/// The *order* fixed at construction is the maximum number of children any
/// node may have: a node holds at most `order - 1` keys and, except for the
/// root, at least `⌈order/2⌉ - 1`. Insertions that overfill a node split it
/// around its median; removals that drain a node below the minimum repair it
/// by rotating a key from a sibling or merging with one. All leaves stay at
/// the same depth throughout.
///
/// The tree is single-owner and provides no internal synchronization; wrap
/// it in a lock if it must be shared across threads.
///
/// # Examples
///
/// ```
/// use fanout_tree::BTree;
///
/// let mut tree = BTree::new(5).unwrap();
///
/// tree.insert(3);
/// tree.insert(1);
/// tree.insert(2);
///
/// assert!(tree.contains(&2));
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.find_least().unwrap(), &1);
///
/// tree.remove(&1);
/// assert_eq!(tree.find_least().unwrap(), &2);
/// ```
#[derive(Clone)]
pub struct BTree<K> {
    raw: RawBTree<K>,
}

impl<K> BTree<K> {
    /// Creates an empty tree with the given order (branching factor).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below 3: with fewer
    /// than three children per node, splitting and merging degenerate.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::{BTree, Error};
    ///
    /// let tree: BTree<i32> = BTree::new(3).unwrap();
    /// assert!(tree.is_empty());
    ///
    /// assert_eq!(BTree::<i32>::new(2).unwrap_err(), Error::InvalidOrder { order: 2 });
    /// ```
    pub const fn new(order: usize) -> Result<Self> {
        if order < 3 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self {
            raw: RawBTree::new(order),
        })
    }

    /// Creates an empty tree with node storage pre-sized for at least
    /// `capacity` keys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below 3.
    pub fn with_capacity(order: usize, capacity: usize) -> Result<Self> {
        if order < 3 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self {
            raw: RawBTree::with_capacity(order, capacity),
        })
    }

    /// Returns the order (branching factor) this tree was constructed with.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.raw.order()
    }

    /// Returns the number of keys in the tree.
    ///
    /// Maintained incrementally; O(1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree.
    ///
    /// Convention: a tree whose root is a leaf has height 1, and the empty
    /// tree has height 0. Every insertion grows the height by at most one
    /// (when the root splits) and every removal shrinks it by at most one
    /// (when the root collapses).
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert_eq!(tree.height(), 0);
    ///
    /// tree.insert(1);
    /// assert_eq!(tree.height(), 1);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Drops every key, resetting to the empty tree. The order is retained.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator that visits the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend([3, 1, 2]);
    ///
    /// let keys: Vec<i32> = tree.iter().copied().collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(&self.raw)
    }
}

impl<K: Ord> BTree<K> {
    /// Returns true if the tree contains the given key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// ordering on the borrowed form must match the ordering on the key
    /// type.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// tree.insert(7);
    ///
    /// assert!(tree.contains(&7));
    /// assert!(!tree.contains(&8));
    /// ```
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains(key)
    }

    /// Adds a key to the tree.
    ///
    /// Returns true if the key was newly inserted. Returns false, leaving
    /// the tree untouched, if an equal key was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    ///
    /// assert!(tree.insert(2));
    /// assert!(!tree.insert(2));
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.raw.insert(key)
    }

    /// Removes a key from the tree.
    ///
    /// Returns true if the key was present and removed; false if it was
    /// absent, in which case the tree is untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// tree.insert(2);
    ///
    /// assert!(tree.remove(&2));
    /// assert!(!tree.remove(&2));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the least key in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert_eq!(tree.find_least(), Err(Error::EmptyTree));
    ///
    /// tree.extend([5, 3, 9]);
    /// assert_eq!(tree.find_least().unwrap(), &3);
    /// ```
    pub fn find_least(&self) -> Result<&K> {
        self.raw.first().ok_or(Error::EmptyTree)
    }

    /// Returns the greatest key in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTree`] if the tree holds no keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use fanout_tree::{BTree, Error};
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// assert_eq!(tree.find_greatest(), Err(Error::EmptyTree));
    ///
    /// tree.extend([5, 3, 9]);
    /// assert_eq!(tree.find_greatest().unwrap(), &9);
    /// ```
    pub fn find_greatest(&self) -> Result<&K> {
        self.raw.last().ok_or(Error::EmptyTree)
    }
}

impl<K: fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// An in-order iterator over the keys of a [`BTree`].
///
/// Carries an explicit stack of (node, key index) frames instead of
/// recursing, so `next` is worst-case logarithmic and amortized constant.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K> {
    tree: &'a RawBTree<K>,
    stack: SmallVec<[(Handle, usize); 16]>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RawBTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        if let Some(root) = tree.root() {
            iter.descend_first(root);
        }
        iter
    }

    /// Pushes the path from `handle` down to its leftmost leaf.
    fn descend_first(&mut self, mut handle: Handle) {
        loop {
            self.stack.push((handle, 0));
            let node = self.tree.node(handle);
            if node.is_leaf() {
                return;
            }
            handle = node.child(0);
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let tree = self.tree;
        loop {
            let &(handle, index) = self.stack.last()?;
            let node = tree.node(handle);

            if index == node.key_count() {
                // Subtree exhausted; resume in the parent.
                self.stack.pop();
                continue;
            }

            // Yield this key, and queue the subtree to its right first.
            self.stack.last_mut().expect("`Iter::next()` - stack is empty!").1 = index + 1;
            if !node.is_leaf() {
                self.descend_first(node.child(index + 1));
            }
            self.remaining -= 1;
            return Some(node.key(index));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}
impl<K> FusedIterator for Iter<'_, K> {}

// Not derived: a derive would demand `K: Clone` for an iterator that only
// copies a shared borrow.
impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_orders() {
        for order in 0..3 {
            assert_eq!(BTree::<i32>::new(order).unwrap_err(), Error::InvalidOrder { order });
            assert_eq!(BTree::<i32>::with_capacity(order, 100).unwrap_err(), Error::InvalidOrder { order });
        }
        assert!(BTree::<i32>::new(3).is_ok());
    }

    #[test]
    fn min_max_signal_on_empty_tree() {
        let mut tree: BTree<i32> = BTree::new(4).unwrap();

        assert_eq!(tree.find_least(), Err(Error::EmptyTree));
        assert_eq!(tree.find_greatest(), Err(Error::EmptyTree));

        tree.insert(1);
        tree.remove(&1);

        assert_eq!(tree.find_least(), Err(Error::EmptyTree));
        assert_eq!(tree.find_greatest(), Err(Error::EmptyTree));
    }

    #[test]
    fn iterates_in_ascending_order() {
        let mut tree: BTree<i32> = BTree::new(3).unwrap();
        tree.extend([10, 20, 5, 6, 12, 30, 7, 17]);

        let keys: Vec<i32> = tree.iter().copied().collect();
        assert_eq!(keys, [5, 6, 7, 10, 12, 17, 20, 30]);

        let iter = tree.iter();
        assert_eq!(iter.len(), 8);
    }

    #[test]
    fn debug_formats_as_a_set() {
        let mut tree: BTree<i32> = BTree::new(3).unwrap();
        tree.extend([2, 1, 3]);

        assert_eq!(format!("{tree:?}"), "{1, 2, 3}");
    }

    #[test]
    fn clone_is_independent() {
        let mut tree: BTree<i32> = BTree::new(3).unwrap();
        tree.extend(0..20);

        let mut copy = tree.clone();
        copy.remove(&10);

        assert!(tree.contains(&10));
        assert!(!copy.contains(&10));
        assert_eq!(copy.len(), tree.len() - 1);
    }
}
