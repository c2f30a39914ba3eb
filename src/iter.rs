use core::marker::PhantomData;

use alloc::vec::Vec;

use crate::{NodeIndex, OrderedTree};

/// Sorted iterator over the keys of an arena tree.
///
/// Keeps the path of pending ancestors on an explicit stack instead of
/// following parent links, so it works for trees without back-references.
pub struct InOrderIter<'a, K: Ord, T: OrderedTree<K>> {
    pub(crate) tree: &'a T,
    pub(crate) curr: NodeIndex,
    pub(crate) stack: Vec<NodeIndex>,
    pub(crate) phantom: PhantomData<&'a K>,
}

impl<'a, K: Ord, T: OrderedTree<K>> InOrderIter<'a, K, T> {
    pub(crate) fn new(tree: &'a T) -> Self {
        Self {
            tree,
            curr: tree.root(),
            stack: Vec::new(),
            phantom: PhantomData,
        }
    }
}

impl<'a, K: Ord + 'a, T: OrderedTree<K>> Iterator for InOrderIter<'a, K, T> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.curr.is_nil() {
            self.stack.push(self.curr);
            self.curr = self.tree.left(self.curr);
        }

        if let Some(node) = self.stack.pop() {
            self.curr = self.tree.right(node);

            return Some(self.tree.key(node));
        }

        None
    }
}
