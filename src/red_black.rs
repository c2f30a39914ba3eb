//! Color-balanced binary search tree.
//!
//! New keys are placed as red leaves and red-red violations are then
//! repaired walking back up through parent links (recoloring while the
//! uncle is red, then at most two rotations).

use alloc::vec::Vec;

use crate::{InsertMetrics, NodeIndex, OrderedTree, Side};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    #[default]
    Red,
    Black,
}

#[derive(Debug)]
struct RedBlackNode<K> {
    key: K,
    color: Color,
    parent: NodeIndex,
    left: NodeIndex,
    right: NodeIndex,
}

impl<K> RedBlackNode<K> {
    fn new_isolated(key: K) -> Self {
        Self {
            key,
            color: Color::default(),
            parent: NodeIndex::NIL,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        }
    }
}

impl<K: Default> RedBlackNode<K> {
    fn black_nil() -> Self {
        Self {
            color: Color::Black,
            ..Self::new_isolated(K::default())
        }
    }
}

/// Outcome of the recursive black-height check of a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackHeight {
    pub valid: bool,
    /// Black nodes on every path from the subtree root down to a nil leaf,
    /// the root itself excluded.
    pub black_height: usize,
}

impl BlackHeight {
    const INVALID: BlackHeight = BlackHeight {
        valid: false,
        black_height: 0,
    };
}

#[derive(Debug)]
pub struct RedBlackTree<K: Ord> {
    storage: Vec<RedBlackNode<K>>,
    root: NodeIndex,
}

impl<K: Default + Ord> RedBlackTree<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Vec::with_capacity(capacity + 1);
        storage.push(RedBlackNode::black_nil());

        Self {
            storage,
            root: NodeIndex::NIL,
        }
    }
}

impl<K: Default + Ord> Default for RedBlackTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> RedBlackTree<K> {
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    /// Color of a node; the nil sentinel is black.
    #[must_use]
    pub fn color(&self, node: NodeIndex) -> Color {
        self.storage[node.0].color
    }

    #[must_use]
    pub fn parent(&self, node: NodeIndex) -> NodeIndex {
        self.storage[node.0].parent
    }

    fn is_red(&self, node: NodeIndex) -> bool {
        self.color(node) == Color::Red
    }

    fn set_color(&mut self, node: NodeIndex, color: Color) {
        self.storage[node.0].color = color;
    }

    /// Places `key` as a red leaf, then restores the coloring. Returns the
    /// number of nodes visited and rotations performed.
    fn insert_counted(&mut self, key: K) -> InsertMetrics {
        let mut current_node = self.root;
        let mut parent_node = NodeIndex::NIL;
        let mut side = Side::Left;
        let mut steps = 1;

        while !current_node.is_nil() {
            steps += 1;
            parent_node = current_node;
            let curr_node_storage = &self.storage[current_node.0];

            side = Side::of(&key, &curr_node_storage.key);
            current_node = match side {
                Side::Left => curr_node_storage.left,
                Side::Right => curr_node_storage.right,
            };
        }

        let new_node_pos = NodeIndex(self.storage.len());
        self.storage.push(RedBlackNode::new_isolated(key));
        self.storage[new_node_pos.0].parent = parent_node;

        if parent_node.is_nil() {
            self.root = new_node_pos;
        } else {
            let parent_node_storage = &mut self.storage[parent_node.0];
            match side {
                Side::Left => parent_node_storage.left = new_node_pos,
                Side::Right => parent_node_storage.right = new_node_pos,
            }
        }

        let rotations = self.fix_red_violation(new_node_pos);
        let root = self.root;
        self.set_color(root, Color::Black);

        InsertMetrics {
            steps,
            adjustments: rotations,
        }
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) -> usize {
        let mut rotations = 0;
        let mut curr_node = start_node_idx;

        while self.is_red(self.parent(curr_node)) {
            let parent_idx = self.parent(curr_node);
            let grandparent_idx = self.parent(parent_idx);

            // A red parent is never the root, so the grandparent is real.
            debug_assert!(!grandparent_idx.is_nil(), "red root at {parent_idx:?}");

            let grandparent = &self.storage[grandparent_idx.0];
            let parent_is_right_child = grandparent.right == parent_idx;
            let uncle = if parent_is_right_child {
                grandparent.left
            } else {
                grandparent.right
            };

            if self.is_red(uncle) {
                self.set_color(parent_idx, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grandparent_idx, Color::Red);

                curr_node = grandparent_idx;
                continue;
            }

            let parent = &self.storage[parent_idx.0];
            if (parent_is_right_child && parent.left == curr_node)
                || (!parent_is_right_child && parent.right == curr_node)
            {
                if parent_is_right_child {
                    self.rotate_right(parent_idx);
                } else {
                    self.rotate_left(parent_idx);
                }
                rotations += 1;

                curr_node = parent_idx;
                continue;
            }

            self.set_color(parent_idx, Color::Black);
            self.set_color(grandparent_idx, Color::Red);

            if parent_is_right_child {
                self.rotate_left(grandparent_idx);
            } else {
                self.rotate_right(grandparent_idx);
            }
            rotations += 1;
        }

        rotations
    }

    fn rotate_left(&mut self, center: NodeIndex) {
        let grandparent_idx = self.storage[center.0].parent;
        let sibling_idx = self.storage[center.0].right;

        let c_idx = self.storage[sibling_idx.0].left;

        self.storage[center.0].right = c_idx;
        if !c_idx.is_nil() {
            self.storage[c_idx.0].parent = center;
        }

        self.storage[sibling_idx.0].left = center;
        self.storage[center.0].parent = sibling_idx;
        self.storage[sibling_idx.0].parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);

        #[cfg(feature = "tracing")]
        tracing::trace!(center = center.0, pivot = sibling_idx.0, "red-black: rotate left");
    }

    fn rotate_right(&mut self, center: NodeIndex) {
        let grandparent_idx = self.storage[center.0].parent;
        let sibling_idx = self.storage[center.0].left;

        let c_idx = self.storage[sibling_idx.0].right;

        self.storage[center.0].left = c_idx;
        if !c_idx.is_nil() {
            self.storage[c_idx.0].parent = center;
        }

        self.storage[sibling_idx.0].right = center;
        self.storage[center.0].parent = sibling_idx;
        self.storage[sibling_idx.0].parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);

        #[cfg(feature = "tracing")]
        tracing::trace!(center = center.0, pivot = sibling_idx.0, "red-black: rotate right");
    }

    /// Points `parent` (or the root, when `parent` is nil) at `new_child`
    /// instead of `old_child`.
    fn replace_child(&mut self, parent: NodeIndex, old_child: NodeIndex, new_child: NodeIndex) {
        if parent.is_nil() {
            self.root = new_child;
        } else if self.storage[parent.0].right == old_child {
            self.storage[parent.0].right = new_child;
        } else {
            self.storage[parent.0].left = new_child;
        }
    }

    #[must_use]
    pub fn is_valid_red_black(&self) -> bool {
        let valid = !self.is_red(self.root)
            && !self.is_red(NodeIndex::NIL)
            && self.parent(self.root).is_nil()
            && self.black_height_check().valid;

        #[cfg(feature = "tracing")]
        if !valid {
            tracing::debug!(nodes = self.len(), "red-black: invariant check failed");
        }

        valid
    }

    /// Recursively checks that no red node has a red child, that parent
    /// links mirror child links, and that both subtrees of every node carry
    /// the same number of black nodes.
    #[must_use]
    pub fn black_height_check(&self) -> BlackHeight {
        self.check_subtree(self.root, 0)
    }

    fn check_subtree(&self, node: NodeIndex, depth: usize) -> BlackHeight {
        if node.is_nil() {
            return BlackHeight {
                valid: true,
                black_height: 0,
            };
        }
        // Deeper than the arena is large: the links form a cycle.
        if depth >= self.storage.len() {
            return BlackHeight::INVALID;
        }

        let RedBlackNode { left, right, .. } = self.storage[node.0];

        for child in [left, right] {
            if child.is_nil() {
                continue;
            }
            if child == node || self.parent(child) != node {
                return BlackHeight::INVALID;
            }
            if self.is_red(node) && self.is_red(child) {
                return BlackHeight::INVALID;
            }
        }

        // Black nodes below `node` through each child, the child included.
        let through = |child: NodeIndex| {
            let result = self.check_subtree(child, depth + 1);
            result
                .valid
                .then_some(result.black_height + usize::from(!self.is_red(child)))
        };

        match (through(left), through(right)) {
            (Some(left_height), Some(right_height)) if left_height == right_height => BlackHeight {
                valid: true,
                black_height: left_height,
            },
            _ => BlackHeight::INVALID,
        }
    }
}

impl<K: Ord> OrderedTree<K> for RedBlackTree<K> {
    fn root(&self) -> NodeIndex {
        self.root
    }

    fn key(&self, node: NodeIndex) -> &K {
        &self.storage[node.0].key
    }

    fn left(&self, node: NodeIndex) -> NodeIndex {
        self.storage[node.0].left
    }

    fn right(&self, node: NodeIndex) -> NodeIndex {
        self.storage[node.0].right
    }

    fn len(&self) -> usize {
        self.storage.len() - 1
    }

    fn insert_with_metrics(&mut self, key: K) -> InsertMetrics {
        self.insert_counted(key)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Color, NodeIndex, OrderedTree, RedBlackTree, TraversalOrder};

    #[test]
    pub fn create_tree() {
        let tree = RedBlackTree::<usize>::new();

        assert!(tree.is_empty());
        assert!(tree.is_valid_red_black());
        assert_eq!(tree.black_height_check().black_height, 0);
    }

    #[test]
    pub fn root_is_black() {
        let mut tree = RedBlackTree::new();
        let metrics = tree.insert_with_metrics(5);

        assert_eq!(metrics.steps, 1);
        assert_eq!(metrics.adjustments, 0);
        assert_eq!(tree.color(tree.root()), Color::Black);
    }

    #[test]
    pub fn straight_chain_single_rotation() {
        let mut tree = RedBlackTree::new();
        assert_eq!(tree.insert_with_metrics(10).adjustments, 0);
        assert_eq!(tree.insert_with_metrics(20).adjustments, 0);
        assert_eq!(tree.insert_with_metrics(30).adjustments, 1);

        let root = tree.root();
        assert_eq!(*tree.key(root), 20);
        assert_eq!(tree.color(root), Color::Black);
        assert_eq!(*tree.key(tree.left(root)), 10);
        assert_eq!(*tree.key(tree.right(root)), 30);
        assert_eq!(tree.color(tree.left(root)), Color::Red);
        assert_eq!(tree.color(tree.right(root)), Color::Red);
        assert_eq!(tree.parent(tree.left(root)), root);
        assert!(tree.parent(root).is_nil());
        assert!(tree.is_valid_red_black());
    }

    #[test]
    pub fn zig_zag_double_rotation() {
        let mut tree = RedBlackTree::new();
        tree.insert(30);
        tree.insert(10);

        let metrics = tree.insert_with_metrics(20);

        assert_eq!(metrics.steps, 3);
        assert_eq!(metrics.adjustments, 2);
        assert_eq!(tree.traverse(TraversalOrder::PreOrder), [&20, &10, &30]);
        assert!(tree.is_valid_red_black());
    }

    #[test]
    pub fn red_uncle_recolors_without_rotation() {
        let mut tree = RedBlackTree::new();
        for key in [20, 10, 30] {
            tree.insert(key);
        }

        assert_eq!(tree.insert_with_metrics(5).adjustments, 0);

        let root = tree.root();
        assert_eq!(tree.color(root), Color::Black);
        assert_eq!(tree.color(tree.left(root)), Color::Black);
        assert_eq!(tree.color(tree.right(root)), Color::Black);
        assert_eq!(tree.black_height_check().black_height, 2);
        assert!(tree.is_valid_red_black());
    }

    #[test]
    pub fn sequential_insertions_stay_valid() {
        let mut tree = RedBlackTree::new();

        for key in 0..2000 {
            assert!(tree.insert_with_metrics(key).adjustments <= 2);
            assert!(tree.is_valid_red_black());
        }

        assert!(tree.iter().copied().eq(0..2000));
        assert!(tree.height() <= 2 * 11);
        assert!(tree.search(&1999));
        assert!(!tree.search(&2000));
    }

    #[test]
    pub fn duplicates_are_kept() {
        let mut tree = RedBlackTree::new();
        for key in [7, 7, 7, 7, 3] {
            tree.insert(key);
        }

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 7, 7, 7, 7]);
        assert!(tree.is_search_ordered());
        assert!(tree.is_valid_red_black());
    }

    #[test]
    pub fn red_red_edge_is_reported() {
        let mut tree = RedBlackTree::new();
        for key in [10, 20, 30, 40] {
            tree.insert(key);
        }

        // 40 hangs red below the black 30.
        let thirty = tree.right(tree.root());
        tree.set_color(thirty, Color::Red);

        assert!(!tree.black_height_check().valid);
        assert!(!tree.is_valid_red_black());
    }

    #[test]
    pub fn broken_parent_link_is_reported() {
        let mut tree = RedBlackTree::new();
        for key in [2, 1, 3] {
            tree.insert(key);
        }

        let left = tree.left(tree.root());
        tree.storage[left.0].parent = NodeIndex::NIL;

        assert!(!tree.is_valid_red_black());
    }
}
