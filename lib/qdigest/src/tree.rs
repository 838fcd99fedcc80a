//! Complete binary tree layout over the value domain.
//!
//! The tree is stored breadth-first in a flat array: the root lives at index 0, and the children of node `i` live at
//! `2i + 1` and `2i + 2`. Every leaf maps to exactly one domain value, so the tree always has at least `sigma` leaves.

use std::ops::RangeInclusive;

/// Returns the index of the left child of `index`.
#[inline]
pub(crate) const fn left_child(index: usize) -> usize {
    2 * index + 1
}

/// Returns the index of the right child of `index`.
#[inline]
pub(crate) const fn right_child(index: usize) -> usize {
    2 * index + 2
}

/// Returns `ceil(log2(value))`, with `ceil_log2(0) == ceil_log2(1) == 0`.
pub(crate) const fn ceil_log2(value: u64) -> u32 {
    if value <= 1 {
        0
    } else {
        u64::BITS - (value - 1).leading_zeros()
    }
}

/// Shape of the tree backing a digest over a domain of `sigma` values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct TreeLayout {
    height: u32,
    leaf_count: usize,
}

impl TreeLayout {
    /// Creates the layout for a domain of `sigma` values.
    ///
    /// `sigma` must already be validated as non-zero and small enough for its tree to be addressable.
    pub fn for_sigma(sigma: u64) -> Self {
        let height = ceil_log2(sigma) + 1;
        Self {
            height,
            leaf_count: 1 << (height - 1),
        }
    }

    /// Number of levels in the tree, counting the leaf level.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of leaf slots, including padding leaves past the end of the domain.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Total number of nodes.
    pub fn size(&self) -> usize {
        2 * self.leaf_count - 1
    }

    /// Index of the leaf holding domain value 0.
    pub fn first_leaf(&self) -> usize {
        self.size() - self.leaf_count
    }

    /// Allocates a zeroed tree and seeds its leaves with the given per-value counts.
    pub fn seed(&self, frequencies: &[u64]) -> Box<[u64]> {
        let mut tree = vec![0u64; self.size()].into_boxed_slice();
        let first_leaf = self.first_leaf();
        tree[first_leaf..first_leaf + frequencies.len()].copy_from_slice(frequencies);
        tree
    }

    /// Returns the domain values covered by the node at `index`, or `None` if the index is outside the tree.
    ///
    /// A node at depth `d` covers `leaf_count / 2^d` consecutive values. Ranges of padding nodes extend past the end of
    /// the domain.
    pub fn node_range(&self, index: usize) -> Option<RangeInclusive<u64>> {
        if index >= self.size() {
            return None;
        }

        let step = (self.leaf_count >> (index + 1).ilog2()) as u64;
        let low = self.node_start(index);

        Some(low..=low + step - 1)
    }

    /// Returns the smallest domain value covered by the node at `index`.
    ///
    /// `index` must be within the tree.
    pub(crate) fn node_start(&self, index: usize) -> u64 {
        let depth = (index + 1).ilog2();
        let position = index + 1 - (1 << depth);

        (position * (self.leaf_count >> depth)) as u64
    }
}
