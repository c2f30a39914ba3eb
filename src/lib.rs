//! Ordered containers that report how much work each insertion costs.
//!
//! Three independent engines are provided:
//!
//! - [`AvlTree`], a height-balanced binary search tree,
//! - [`RedBlackTree`], a color-balanced binary search tree,
//! - [`SkipList`], a randomized layered linked list.
//!
//! Both trees store their nodes in an arena and address them through
//! [`NodeIndex`], with slot 0 reserved for a nil sentinel. They share the
//! [`OrderedTree`] trait, which provides search, traversals and structural
//! queries on top of a handful of engine hooks.
//!
//! Duplicate keys are accepted and routed to the right subtree.
//!
//! ```
//! use canopy::{AvlTree, OrderedTree, TraversalOrder};
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.search(&4));
//! assert_eq!(tree.height(), 3);
//! assert_eq!(
//!     tree.traverse(TraversalOrder::InOrder),
//!     [&1, &3, &4, &5, &7, &8, &9]
//! );
//! ```

extern crate alloc;

use core::{cmp::Ordering, fmt, str::FromStr};

use alloc::vec::Vec;

pub mod avl;
pub mod error;
pub mod iter;
pub mod red_black;
pub mod skip_list;
pub mod stats;

pub use avl::AvlTree;
pub use error::TreeError;
pub use iter::InOrderIter;
pub use red_black::{BlackHeight, Color, RedBlackTree};
pub use skip_list::SkipList;
pub use stats::Summary;

/// Position of a node inside a tree arena.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// The sentinel slot standing for every absent child.
    pub const NIL: NodeIndex = NodeIndex(0);

    #[must_use]
    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

/// Which child of a node a key is routed to. Ties go right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) fn of<K: Ord>(key: &K, node_key: &K) -> Self {
        match key.cmp(node_key) {
            Ordering::Less => Side::Left,
            Ordering::Equal | Ordering::Greater => Side::Right,
        }
    }
}

/// Work done by a single instrumented insertion.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertMetrics {
    /// Nodes visited on the way down, plus one for creating the new node.
    pub steps: usize,
    /// Rotations for the trees, promotions above level 0 for the skip list.
    ///
    /// The AVL tree reports at most 1 (a double rotation counts once), the
    /// red-black tree counts every rotation of the repair walk.
    pub adjustments: usize,
}

/// Order in which [`OrderedTree::traverse`] visits the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    PreOrder,
    InOrder,
    PostOrder,
}

impl FromStr for TraversalOrder {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "pre_order" | "preorder" | "pre-order" => Ok(TraversalOrder::PreOrder),
            "in" | "in_order" | "inorder" | "in-order" => Ok(TraversalOrder::InOrder),
            "post" | "post_order" | "postorder" | "post-order" => Ok(TraversalOrder::PostOrder),
            _ => Err(TreeError::InvalidTraversalOrder(s.to_owned())),
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalOrder::PreOrder => "pre_order",
            TraversalOrder::InOrder => "in_order",
            TraversalOrder::PostOrder => "post_order",
        })
    }
}

/// Binary search tree stored in an index arena.
///
/// Engines supply the structural hooks and their insertion routine; every
/// read-only query is shared.
pub trait OrderedTree<K: Ord> {
    /// Index of the root node, [`NodeIndex::NIL`] when the tree is empty.
    fn root(&self) -> NodeIndex;

    fn key(&self, node: NodeIndex) -> &K;

    fn left(&self, node: NodeIndex) -> NodeIndex;

    fn right(&self, node: NodeIndex) -> NodeIndex;

    /// Number of keys stored, duplicates included.
    fn len(&self) -> usize;

    /// Inserts `key` and reports the work the insertion took.
    fn insert_with_metrics(&mut self, key: K) -> InsertMetrics;

    fn insert(&mut self, key: K) {
        self.insert_with_metrics(key);
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn search(&self, key: &K) -> bool {
        let mut current_node = self.root();

        while !current_node.is_nil() {
            match key.cmp(self.key(current_node)) {
                Ordering::Less => current_node = self.left(current_node),
                Ordering::Equal => return true,
                Ordering::Greater => current_node = self.right(current_node),
            }
        }

        false
    }

    /// Number of nodes on the longest root-to-leaf path.
    fn height(&self) -> usize {
        fn subtree_height<K: Ord, T: OrderedTree<K> + ?Sized>(tree: &T, node: NodeIndex) -> usize {
            if node.is_nil() {
                return 0;
            }

            1 + subtree_height(tree, tree.left(node)).max(subtree_height(tree, tree.right(node)))
        }

        subtree_height(self, self.root())
    }

    fn leaf_count(&self) -> usize {
        let mut leaves = 0;
        let mut pending = Vec::new();

        if !self.root().is_nil() {
            pending.push(self.root());
        }

        while let Some(node) = pending.pop() {
            let (left, right) = (self.left(node), self.right(node));

            if left.is_nil() && right.is_nil() {
                leaves += 1;
                continue;
            }
            if !left.is_nil() {
                pending.push(left);
            }
            if !right.is_nil() {
                pending.push(right);
            }
        }

        leaves
    }

    /// Borrowing in-order iterator over the keys.
    fn iter(&self) -> InOrderIter<'_, K, Self>
    where
        Self: Sized,
    {
        InOrderIter::new(self)
    }

    fn traverse(&self, order: TraversalOrder) -> Vec<&K> {
        fn walk<'a, K: Ord, T: OrderedTree<K> + ?Sized>(
            tree: &'a T,
            node: NodeIndex,
            order: TraversalOrder,
            out: &mut Vec<&'a K>,
        ) {
            if node.is_nil() {
                return;
            }

            if order == TraversalOrder::PreOrder {
                out.push(tree.key(node));
            }
            walk(tree, tree.left(node), order, out);
            if order == TraversalOrder::InOrder {
                out.push(tree.key(node));
            }
            walk(tree, tree.right(node), order, out);
            if order == TraversalOrder::PostOrder {
                out.push(tree.key(node));
            }
        }

        let mut keys = Vec::with_capacity(self.len());
        walk(self, self.root(), order, &mut keys);
        keys
    }

    /// Checks the search-tree ordering: no left descendant is greater than a
    /// node and no right descendant is less.
    ///
    /// Equal keys may sit on either side, since rotations can lift a
    /// duplicate above the copy it was inserted after.
    fn is_search_ordered(&self) -> bool {
        fn within<K: Ord, T: OrderedTree<K> + ?Sized>(
            tree: &T,
            node: NodeIndex,
            lower: Option<&K>,
            upper: Option<&K>,
        ) -> bool {
            if node.is_nil() {
                return true;
            }

            let key = tree.key(node);
            if lower.is_some_and(|lower| key < lower) || upper.is_some_and(|upper| key > upper) {
                return false;
            }

            within(tree, tree.left(node), lower, Some(key))
                && within(tree, tree.right(node), Some(key), upper)
        }

        within(self, self.root(), None, None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{AvlTree, OrderedTree, RedBlackTree, TraversalOrder, TreeError};

    #[test]
    pub fn traversal_order_parsing() {
        assert_eq!("in_order".parse::<TraversalOrder>(), Ok(TraversalOrder::InOrder));
        assert_eq!("PRE_ORDER".parse::<TraversalOrder>(), Ok(TraversalOrder::PreOrder));
        assert_eq!("post".parse::<TraversalOrder>(), Ok(TraversalOrder::PostOrder));
        assert_eq!(
            "level_order".parse::<TraversalOrder>(),
            Err(TreeError::InvalidTraversalOrder("level_order".into()))
        );
        assert_eq!(TraversalOrder::InOrder.to_string(), "in_order");
    }

    #[test]
    pub fn empty_tree_queries() {
        let tree = AvlTree::<i32>::new();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.leaf_count(), 0);
        assert!(!tree.search(&1));
        assert!(tree.traverse(TraversalOrder::PreOrder).is_empty());
        assert!(tree.is_search_ordered());
    }

    #[test]
    pub fn traversals_of_balanced_tree() {
        let mut tree = RedBlackTree::new();
        for key in [2, 1, 3] {
            tree.insert(key);
        }

        assert_eq!(tree.traverse(TraversalOrder::PreOrder), [&2, &1, &3]);
        assert_eq!(tree.traverse(TraversalOrder::InOrder), [&1, &2, &3]);
        assert_eq!(tree.traverse(TraversalOrder::PostOrder), [&1, &3, &2]);
        assert_eq!(tree.leaf_count(), 2);
    }
}
