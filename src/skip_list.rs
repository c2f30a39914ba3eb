//! Probabilistic layered sorted list.
//!
//! Every node draws a height from a geometric distribution with p = 1/2 and
//! is linked into each level below that height. Level 0 holds every value;
//! each level above holds a sorted subsequence of the one beneath it.
//!
//! ```text
//! level 2:  HEAD ──────────────► 20 ───────────────────► NIL
//! level 1:  HEAD ───────► 10 ──► 20 ───────► 40 ───────► NIL
//! level 0:  HEAD ──► 5 ─► 10 ──► 20 ──► 30 ─► 40 ──► 50 ► NIL
//! ```
//!
//! Nodes live in an arena. Forward links own nothing, and back links are
//! [`Position`]s so that the header can be named without being a node.

use alloc::vec::Vec;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::InsertMetrics;

/// Predecessor of a node on some level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The header, which sorts before every value.
    Head,
    Node(usize),
}

#[derive(Debug)]
struct SkipNode<V> {
    value: V,
    next: Vec<Option<usize>>,
    previous: Vec<Position>,
}

impl<V> SkipNode<V> {
    fn height(&self) -> usize {
        self.next.len()
    }
}

#[derive(Debug)]
pub struct SkipList<V, R = StdRng> {
    nodes: Vec<SkipNode<V>>,
    /// First node of every level.
    head: Vec<Option<usize>>,
    max_height: usize,
    rng: R,
}

impl<V: Ord> SkipList<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A list whose node heights are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<V: Ord> Default for SkipList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Ord, R: Rng> SkipList<V, R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            nodes: Vec::new(),
            head: Vec::new(),
            max_height: 0,
            rng,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the tallest node ever inserted.
    #[must_use]
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Flips a fair coin until it comes up tails; the height is the number
    /// of flips.
    fn draw_height(&mut self) -> usize {
        let mut height = 1;
        while self.rng.gen_bool(0.5) {
            height += 1;
        }
        height
    }

    fn next(&self, position: Position, level: usize) -> Option<usize> {
        match position {
            Position::Head => self.head[level],
            Position::Node(idx) => self.nodes[idx].next[level],
        }
    }

    fn set_next(&mut self, position: Position, level: usize, next: Option<usize>) {
        match position {
            Position::Head => self.head[level] = next,
            Position::Node(idx) => self.nodes[idx].next[level] = next,
        }
    }

    pub fn insert(&mut self, value: V) {
        self.insert_with_metrics(value);
    }

    /// Inserts `value` and reports the levels visited plus forward moves
    /// made while searching, and how many levels above 0 the node joined.
    pub fn insert_with_metrics(&mut self, value: V) -> InsertMetrics {
        let height = self.draw_height();
        if height > self.max_height {
            self.head.resize(height, None);
            self.max_height = height;
        }

        let mut steps = 0;
        let mut cursor = Position::Head;
        let mut predecessors = alloc::vec![Position::Head; height];

        for level in (0..self.max_height).rev() {
            steps += 1;
            while let Some(next) = self.next(cursor, level) {
                if self.nodes[next].value >= value {
                    break;
                }
                cursor = Position::Node(next);
                steps += 1;
            }

            if level < height {
                predecessors[level] = cursor;
            }
        }

        let new_idx = self.nodes.len();
        let next = (0..height)
            .map(|level| self.next(predecessors[level], level))
            .collect::<Vec<_>>();

        for (level, successor) in next.iter().enumerate() {
            if let Some(successor) = *successor {
                self.nodes[successor].previous[level] = Position::Node(new_idx);
            }
            self.set_next(predecessors[level], level, Some(new_idx));
        }

        self.nodes.push(SkipNode {
            value,
            next,
            previous: predecessors,
        });

        #[cfg(feature = "tracing")]
        if height > 1 {
            tracing::trace!(node = new_idx, height, "skip list: promoted");
        }

        InsertMetrics {
            steps,
            adjustments: height - 1,
        }
    }

    #[must_use]
    pub fn contains(&self, value: &V) -> bool {
        let mut cursor = Position::Head;

        for level in (0..self.max_height).rev() {
            while let Some(next) = self.next(cursor, level) {
                match self.nodes[next].value.cmp(value) {
                    core::cmp::Ordering::Less => cursor = Position::Node(next),
                    core::cmp::Ordering::Equal => return true,
                    core::cmp::Ordering::Greater => break,
                }
            }
        }

        false
    }

    /// Values linked on `level`, in ascending order. Level 0 holds all of
    /// them; levels at or above [`max_height`](Self::max_height) are empty.
    pub fn level(&self, level: usize) -> impl Iterator<Item = &V> + '_ {
        let first = self.head.get(level).copied().flatten();

        core::iter::successors(first, move |&idx| self.nodes[idx].next[level]).map(|idx| &self.nodes[idx].value)
    }

    /// All values in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.level(0)
    }

    /// All values in descending order, following back links on level 0.
    pub fn iter_rev(&self) -> impl Iterator<Item = &V> + '_ {
        let mut last = None;
        let mut cursor = Position::Head;
        for level in (0..self.max_height).rev() {
            while let Some(next) = self.next(cursor, level) {
                cursor = Position::Node(next);
                last = Some(next);
            }
        }

        core::iter::successors(last, move |&idx| match self.nodes[idx].previous[0] {
            Position::Head => None,
            Position::Node(previous) => Some(previous),
        })
        .map(|idx| &self.nodes[idx].value)
    }

    /// Checks that every level is sorted and links only nodes tall enough
    /// for it, that back links mirror forward links, that each level is a
    /// subsequence of the one beneath it, and that level 0 holds every node.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.head.len() != self.max_height || self.nodes.iter().any(|node| node.height() > self.max_height) {
            return false;
        }

        let mut linked = alloc::vec![0_usize; self.nodes.len()];

        for level in 0..self.max_height {
            let mut previous = Position::Head;
            let mut count = 0;

            while let Some(idx) = self.next(previous, level) {
                let node = &self.nodes[idx];
                if node.height() <= level || node.previous[level] != previous {
                    return false;
                }
                if let Position::Node(previous_idx) = previous {
                    if self.nodes[previous_idx].value > node.value {
                        return false;
                    }
                }
                // Levels above 0 only link nodes already seen beneath them.
                if linked[idx] != level {
                    return false;
                }

                linked[idx] += 1;
                count += 1;
                if count > self.nodes.len() {
                    return false;
                }
                previous = Position::Node(idx);
            }
        }

        let valid = self
            .nodes
            .iter()
            .zip(&linked)
            .all(|(node, &levels)| levels == node.height());

        #[cfg(feature = "tracing")]
        if !valid {
            tracing::debug!(nodes = self.len(), "skip list: invariant check failed");
        }

        valid
    }
}
