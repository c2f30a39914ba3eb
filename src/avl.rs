//! Height-balanced binary search tree.
//!
//! Every node caches the height of its subtree (0 for a leaf, -1 for the nil
//! sentinel). Insertion descends recursively, and on the way back up the
//! lowest ancestor whose children differ in height by more than one is
//! repaired with a single or double rotation. That rotation restores the
//! subtree to its height before the insertion, so nothing above it changes.

use alloc::vec::Vec;

use crate::{InsertMetrics, NodeIndex, OrderedTree, Side};

#[derive(Debug)]
struct AvlNode<K> {
    key: K,
    height: i32,
    left: NodeIndex,
    right: NodeIndex,
}

impl<K> AvlNode<K> {
    fn new_leaf(key: K) -> Self {
        Self {
            key,
            height: 0,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        }
    }

    fn child(&self, side: Side) -> NodeIndex {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn set_child(&mut self, side: Side, child: NodeIndex) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }
}

impl<K: Default> AvlNode<K> {
    fn nil() -> Self {
        Self {
            height: -1,
            ..Self::new_leaf(K::default())
        }
    }
}

/// Bookkeeping carried through one recursive insertion.
#[derive(Debug, Default)]
struct InsertProbe {
    steps: usize,
    rotated: bool,
    /// Set once the subtree heights above the current node cannot change.
    settled: bool,
}

#[derive(Debug)]
pub struct AvlTree<K: Ord> {
    storage: Vec<AvlNode<K>>,
    root: NodeIndex,
}

impl<K: Default + Ord> AvlTree<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Vec::with_capacity(capacity + 1);
        storage.push(AvlNode::nil());

        Self {
            storage,
            root: NodeIndex::NIL,
        }
    }
}

impl<K: Default + Ord> Default for AvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> AvlTree<K> {
    /// Cached height of the root: -1 when empty, 0 for a single node.
    #[must_use]
    pub fn cached_height(&self) -> i32 {
        self.node(self.root).height
    }

    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    fn node(&self, idx: NodeIndex) -> &AvlNode<K> {
        &self.storage[idx.0]
    }

    fn node_mut(&mut self, idx: NodeIndex) -> &mut AvlNode<K> {
        &mut self.storage[idx.0]
    }

    fn allocate(&mut self, key: K) -> NodeIndex {
        let idx = NodeIndex(self.storage.len());
        self.storage.push(AvlNode::new_leaf(key));
        idx
    }

    fn update_height(&mut self, idx: NodeIndex) {
        let node = self.node(idx);
        let height = 1 + self.node(node.left).height.max(self.node(node.right).height);
        self.node_mut(idx).height = height;
    }

    fn balance_factor(&self, idx: NodeIndex) -> i32 {
        let node = self.node(idx);
        self.node(node.left).height - self.node(node.right).height
    }

    /// Inserts `key` below `node` and returns the index now rooting that
    /// subtree.
    fn insert_below(&mut self, node: NodeIndex, key: K, probe: &mut InsertProbe) -> NodeIndex {
        probe.steps += 1;

        if node.is_nil() {
            return self.allocate(key);
        }

        let side = Side::of(&key, &self.node(node).key);
        let child = self.node(node).child(side);
        let grandchild_side = (!child.is_nil()).then(|| Side::of(&key, &self.node(child).key));

        let new_child = self.insert_below(child, key, probe);
        self.node_mut(node).set_child(side, new_child);

        if probe.settled {
            return node;
        }

        let previous_height = self.node(node).height;
        self.update_height(node);
        let balance = self.balance_factor(node);

        if (-1..=1).contains(&balance) {
            probe.settled = self.node(node).height == previous_height;
            return node;
        }

        // Only the side that just grew can be too tall, and it grew because a
        // node was added below an existing child.
        let Some(grandchild_side) = grandchild_side else {
            unreachable!("a fresh leaf cannot unbalance its parent");
        };

        probe.rotated = true;
        probe.settled = true;

        match (side, grandchild_side) {
            (Side::Left, Side::Left) => self.rotate_right(node),
            (Side::Left, Side::Right) => {
                let left = self.rotate_left(self.node(node).left);
                self.node_mut(node).left = left;
                self.rotate_right(node)
            }
            (Side::Right, Side::Right) => self.rotate_left(node),
            (Side::Right, Side::Left) => {
                let right = self.rotate_right(self.node(node).right);
                self.node_mut(node).right = right;
                self.rotate_left(node)
            }
        }
    }

    fn rotate_left(&mut self, center: NodeIndex) -> NodeIndex {
        let pivot = self.node(center).right;

        self.node_mut(center).right = self.node(pivot).left;
        self.node_mut(pivot).left = center;

        self.update_height(center);
        self.update_height(pivot);

        #[cfg(feature = "tracing")]
        tracing::trace!(center = center.0, pivot = pivot.0, "avl: rotate left");

        pivot
    }

    fn rotate_right(&mut self, center: NodeIndex) -> NodeIndex {
        let pivot = self.node(center).left;

        self.node_mut(center).left = self.node(pivot).right;
        self.node_mut(pivot).right = center;

        self.update_height(center);
        self.update_height(pivot);

        #[cfg(feature = "tracing")]
        tracing::trace!(center = center.0, pivot = pivot.0, "avl: rotate right");

        pivot
    }

    /// Recomputes every height from the leaves up and checks it against the
    /// cached value, the balance bound, the key ordering, and that each
    /// arena node is reachable exactly once from the root.
    #[must_use]
    pub fn is_valid_avl(&self) -> bool {
        let mut visited = alloc::vec![false; self.storage.len()];

        let valid = self.check_subtree(self.root, None, None, &mut visited).is_some()
            && visited.iter().skip(1).all(|&seen| seen)
            && self.node(NodeIndex::NIL).height == -1;

        #[cfg(feature = "tracing")]
        if !valid {
            tracing::debug!(nodes = self.len(), "avl: invariant check failed");
        }

        valid
    }

    /// Returns the recomputed height of the subtree, `None` if any check
    /// fails below `idx`.
    fn check_subtree(
        &self,
        idx: NodeIndex,
        lower: Option<&K>,
        upper: Option<&K>,
        visited: &mut [bool],
    ) -> Option<i32> {
        if idx.is_nil() {
            return Some(-1);
        }
        if core::mem::replace(&mut visited[idx.0], true) {
            return None;
        }

        let node = self.node(idx);
        if node.left == idx || node.right == idx {
            return None;
        }
        if lower.is_some_and(|lower| node.key < *lower) || upper.is_some_and(|upper| node.key > *upper) {
            return None;
        }

        let left_height = self.check_subtree(node.left, lower, Some(&node.key), visited)?;
        let right_height = self.check_subtree(node.right, Some(&node.key), upper, visited)?;
        let height = 1 + left_height.max(right_height);

        ((left_height - right_height).abs() <= 1 && height == node.height).then_some(height)
    }
}

impl<K: Ord> OrderedTree<K> for AvlTree<K> {
    fn root(&self) -> NodeIndex {
        self.root
    }

    fn key(&self, node: NodeIndex) -> &K {
        &self.node(node).key
    }

    fn left(&self, node: NodeIndex) -> NodeIndex {
        self.node(node).left
    }

    fn right(&self, node: NodeIndex) -> NodeIndex {
        self.node(node).right
    }

    fn len(&self) -> usize {
        self.storage.len() - 1
    }

    fn insert_with_metrics(&mut self, key: K) -> InsertMetrics {
        let mut probe = InsertProbe::default();
        self.root = self.insert_below(self.root, key, &mut probe);

        InsertMetrics {
            steps: probe.steps,
            adjustments: usize::from(probe.rotated),
        }
    }

    fn height(&self) -> usize {
        (self.cached_height() + 1) as usize
    }
}
