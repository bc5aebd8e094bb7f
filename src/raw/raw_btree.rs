use core::borrow::Borrow;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, SearchResult};

/// Path element for tracking a descent during mutations.
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// A root-to-node descent record (stack of path elements).
type Path = SmallVec<[PathElement; 16]>;

/// The core B-tree implementation backing `BTree`.
///
/// All nodes live in an arena and refer to each other by stable handles, so
/// rebalancing replaces child slots through the arena instead of mutating
/// through parent back-pointers. Every mutation records its descent in an
/// explicit path stack and repairs the tree bottom-up along it.
#[derive(Clone)]
pub(crate) struct RawBTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of keys in the tree.
    len: usize,
    /// The branching factor: maximum child count per node. At least 3,
    /// enforced by the public facade.
    order: usize,
}

impl<K> RawBTree<K> {
    /// Creates a new, empty tree of the given order.
    pub(crate) const fn new(order: usize) -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            order,
        }
    }

    /// Creates a new tree with node storage pre-sized for `capacity` keys.
    pub(crate) fn with_capacity(order: usize, capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity.div_ceil(order - 1)),
            root: None,
            len: 0,
            order,
        }
    }

    /// Returns the branching factor this tree was constructed with.
    pub(crate) const fn order(&self) -> usize {
        self.order
    }

    /// A node must split once it reaches `order` keys; at rest it holds at
    /// most this many.
    const fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum key count for non-root nodes: the canonical ⌈order/2⌉ - 1.
    const fn min_keys(&self) -> usize {
        self.order.div_ceil(2) - 1
    }

    /// Returns the number of keys in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no keys.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the root handle, if the tree is non-empty.
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Returns a reference to a node by handle.
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Drops every key and resets to the empty tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns the height of the tree: leaves are at height 1, the empty
    /// tree at height 0. All leaves share one depth, so following first
    /// children measures every path.
    pub(crate) fn height(&self) -> usize {
        let Some(mut current) = self.root else {
            return 0;
        };

        let mut height = 1;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return height;
            }
            current = node.child(0);
            height += 1;
        }
    }

    /// Returns the least key, or None on an empty tree.
    pub(crate) fn first(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.first_key();
            }
            current = node.child(0);
        }
    }

    /// Returns the greatest key, or None on an empty tree.
    pub(crate) fn last(&self) -> Option<&K> {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            if node.is_leaf() {
                return node.last_key();
            }
            current = node.child(node.child_count() - 1);
        }
    }
}

impl<K: Ord> RawBTree<K> {
    /// Returns true if the tree contains the given key.
    pub(crate) fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(mut current) = self.root else {
            return false;
        };

        loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(_) => return true,
                SearchResult::NotFound(idx) => {
                    if node.is_leaf() {
                        return false;
                    }
                    current = node.child(idx);
                }
            }
        }
    }

    /// Inserts a key. Returns true if the key was newly inserted, false if
    /// it was already present (the tree is left untouched).
    pub(crate) fn insert(&mut self, key: K) -> bool {
        let Some(root) = self.root else {
            let mut leaf = Node::new_leaf();
            leaf.push_key(key);
            self.root = Some(self.nodes.alloc(leaf));
            self.len = 1;
            return true;
        };

        // Descend to the responsible leaf, bailing out if the key shows up
        // as a separator along the way.
        let mut path: Path = SmallVec::new();
        let mut current = root;
        let insert_at = loop {
            let node = self.nodes.get(current);
            match node.search(&key) {
                SearchResult::Found(_) => return false,
                SearchResult::NotFound(idx) => {
                    if node.is_leaf() {
                        break idx;
                    }
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        };

        self.nodes.get_mut(current).insert_key(insert_at, key);
        self.len += 1;

        self.repair_overflow(current, &mut path);

        true
    }

    /// Split-repair: splits nodes bottom-up along the path while they sit at
    /// the order. Terminates because each split moves one level closer to
    /// the root, and a root split grows the height exactly once.
    fn repair_overflow(&mut self, mut current: Handle, path: &mut Path) {
        while self.nodes.get(current).key_count() > self.max_keys() {
            let (parent, child_index) = match path.pop() {
                Some(elem) => (elem.node, elem.child_index),
                None => {
                    // The root itself is overfull: synthesize a parent for
                    // it so the split target always has one. Height +1.
                    let new_root = self.nodes.alloc(Node::new_root_above(current));
                    self.root = Some(new_root);
                    (new_root, 0)
                }
            };

            let (median, right) = self.nodes.get_mut(current).split_at_median();
            let right = self.nodes.alloc(right);

            let parent_node = self.nodes.get_mut(parent);
            parent_node.insert_key(child_index, median);
            parent_node.insert_child(child_index + 1, right);

            current = parent;
        }
    }

    /// Removes a key. Returns true if the key was present and removed,
    /// false if it was absent (the tree is left untouched).
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(root) = self.root else {
            return false;
        };

        // Locate the key, recording the descent.
        let mut path: Path = SmallVec::new();
        let mut current = root;
        let (holder, key_index) = loop {
            let node = self.nodes.get(current);
            match node.search(key) {
                SearchResult::Found(idx) => break (current, idx),
                SearchResult::NotFound(idx) => {
                    if node.is_leaf() {
                        return false;
                    }
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        };

        let leaf = if self.nodes.get(holder).is_leaf() {
            self.nodes.get_mut(holder).remove_key(key_index);
            holder
        } else {
            // The key is a separator: overwrite it with its in-order
            // predecessor, the greatest key of the subtree to its left,
            // which always lives in a leaf.
            path.push(PathElement {
                node: holder,
                child_index: key_index,
            });
            let mut current = self.nodes.get(holder).child(key_index);
            loop {
                let node = self.nodes.get(current);
                if node.is_leaf() {
                    break;
                }
                let last = node.child_count() - 1;
                path.push(PathElement {
                    node: current,
                    child_index: last,
                });
                current = node.child(last);
            }

            let predecessor = self
                .nodes
                .get_mut(current)
                .pop_key()
                .expect("`RawBTree::remove()` - predecessor leaf is empty!");
            self.nodes.get_mut(holder).replace_key(key_index, predecessor);
            current
        };

        self.len -= 1;

        if self.len == 0 {
            self.nodes.clear();
            self.root = None;
            return true;
        }

        self.repair_underflow(leaf, &mut path);

        true
    }

    /// Merge-repair: restores the minimum-occupancy invariant bottom-up
    /// along the path after a leaf lost a key.
    ///
    /// For each deficient node the parent tries, in order: a rotation from
    /// the right sibling, a rotation from the left sibling, and finally a
    /// merge with a minimal sibling (preferring the right one). Only a merge
    /// shrinks the parent and keeps the loop climbing.
    fn repair_underflow(&mut self, mut current: Handle, path: &mut Path) {
        let min_keys = self.min_keys();

        while self.nodes.get(current).key_count() < min_keys {
            let Some(elem) = path.pop() else {
                // The root is exempt from the lower bound.
                break;
            };
            let parent = elem.node;
            let child_index = elem.child_index;

            let parent_node = self.nodes.get(parent);
            let child_count = parent_node.child_count();

            // 1. Rotate from the right sibling when it has surplus keys.
            if child_index + 1 < child_count {
                let right = parent_node.child(child_index + 1);
                if self.nodes.get(right).key_count() > min_keys {
                    self.rotate_from_right(parent, child_index);
                    return;
                }
            }

            // 2. Rotate from the left sibling.
            if child_index > 0 {
                let left = self.nodes.get(parent).child(child_index - 1);
                if self.nodes.get(left).key_count() > min_keys {
                    self.rotate_from_left(parent, child_index);
                    return;
                }
            }

            // 3. Merge with a minimal sibling, preferring the right one.
            if child_index + 1 < child_count {
                self.merge_children(parent, child_index);
            } else {
                self.merge_children(parent, child_index - 1);
            }

            current = parent;
        }

        // A root drained to zero keys hands the root role to its only
        // remaining child. Height -1.
        let root = self.root.expect("`RawBTree::repair_underflow()` - tree is empty!");
        let root_node = self.nodes.get(root);
        if root_node.key_count() == 0 && !root_node.is_leaf() {
            let new_root = root_node.child(0);
            self.nodes.free(root);
            self.root = Some(new_root);
        }
    }

    /// Moves one key counter-clockwise through the parent: the separator
    /// drops into the deficient child and the right sibling's least key
    /// (plus its leading child, for internal nodes) replaces it.
    fn rotate_from_right(&mut self, parent: Handle, child_index: usize) {
        let parent_node = self.nodes.get(parent);
        let child = parent_node.child(child_index);
        let right = parent_node.child(child_index + 1);

        let right_node = self.nodes.get_mut(right);
        let up = right_node
            .pop_key_front()
            .expect("`RawBTree::rotate_from_right()` - right sibling is empty!");
        let moved_child = right_node.pop_child_front();

        let separator = self.nodes.get_mut(parent).replace_key(child_index, up);

        let child_node = self.nodes.get_mut(child);
        child_node.push_key(separator);
        if let Some(handle) = moved_child {
            child_node.push_child(handle);
        }
    }

    /// Mirror image of [`Self::rotate_from_right`], borrowing the left
    /// sibling's greatest key through the separator at `child_index - 1`.
    fn rotate_from_left(&mut self, parent: Handle, child_index: usize) {
        let parent_node = self.nodes.get(parent);
        let child = parent_node.child(child_index);
        let left = parent_node.child(child_index - 1);

        let left_node = self.nodes.get_mut(left);
        let up = left_node
            .pop_key()
            .expect("`RawBTree::rotate_from_left()` - left sibling is empty!");
        let moved_child = left_node.pop_child();

        let separator = self.nodes.get_mut(parent).replace_key(child_index - 1, up);

        let child_node = self.nodes.get_mut(child);
        child_node.push_key_front(separator);
        if let Some(handle) = moved_child {
            child_node.push_child_front(handle);
        }
    }

    /// Merges the children at `left_index` and `left_index + 1` together
    /// with the separator between them, freeing the absorbed right node.
    /// The parent loses one key and one child slot.
    fn merge_children(&mut self, parent: Handle, left_index: usize) {
        let parent_node = self.nodes.get_mut(parent);
        let separator = parent_node.remove_key(left_index);
        let right = parent_node.remove_child(left_index + 1);
        let left = parent_node.child(left_index);

        let right_node = self.nodes.take(right);
        self.nodes.get_mut(left).merge_with_right(separator, right_node);
    }
}
