//! Bottom-up compression of the digest tree.

use tracing::trace;

use crate::tree::{left_child, right_child};

/// Compresses `tree` in place against `threshold`.
///
/// Nodes are visited in post-order over the domain range each one covers, so both children are fully resolved before
/// their parent is considered. Whenever a node and its two children hold no more than `threshold` items between them,
/// their counts are merged into the node and the children are zeroed. Mass only ever moves upward.
///
/// Returns the number of merges that moved a non-zero count.
pub(crate) fn compress(tree: &mut [u64], leaf_count: usize, threshold: u64) -> usize {
    compress_range(tree, 0, leaf_count - 1, 0, threshold)
}

fn compress_range(tree: &mut [u64], low: usize, high: usize, index: usize, threshold: u64) -> usize {
    if low >= high {
        return 0;
    }

    let left = left_child(index);
    let right = right_child(index);
    let mid = low + (high - low) / 2;

    let mut merges = compress_range(tree, low, mid, left, threshold);
    merges += compress_range(tree, mid + 1, high, right, threshold);

    let moved = tree[left] + tree[right];
    let sum = tree[index] + moved;
    if sum <= threshold {
        tree[index] = sum;
        tree[left] = 0;
        tree[right] = 0;

        if moved > 0 {
            trace!(index, sum, "Merged children into parent.");
            merges += 1;
        }
    }

    merges
}
