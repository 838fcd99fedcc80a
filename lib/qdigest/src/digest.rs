use std::ops::RangeInclusive;

use snafu::ensure;
use tracing::debug;

use crate::compress::compress;
use crate::config::QDigestConfig;
use crate::error::{EmptyDigest, InvalidArgument, InvariantViolation, QDigestError};
use crate::frequency::Frequencies;
use crate::tree::{left_child, right_child, TreeLayout};

/// A q-digest over the integer domain `[0, sigma)`.
///
/// The digest is built once from a batch of values and is immutable afterwards. Construction counts the values,
/// seeds them into the leaves of a complete binary tree with at least `sigma` leaves, and then compresses the tree
/// bottom-up so that sparsely populated subtrees are folded into their parents.
///
/// After compression, with `threshold = floor(n / k)`:
///
/// - every internal node holds at most `threshold` items
/// - every internal node with a non-empty child holds, together with its children, more than `threshold` items
/// - the counts across the tree still sum to `n`
///
/// Quantile queries are accurate to within `log2(sigma) * n / k` ranks.
///
/// # Example
///
/// ```
/// use qdigest::QDigest;
///
/// let digest = QDigest::new(&[0, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 5, 6, 7], 5, 8).unwrap();
///
/// assert_eq!(digest.tree_size(), 15);
/// assert_eq!(digest.serialize(), vec![(0, 1), (5, 2), (6, 2), (9, 4), (10, 6)]);
/// assert_eq!(digest.quantile(0.5).unwrap(), 3);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QDigest {
    config: QDigestConfig,
    layout: TreeLayout,

    /// Number of items the digest was built from.
    count: u64,

    /// Maximum count of any merged bucket: `floor(count / k)`.
    threshold: u64,

    /// Node counts, stored breadth-first.
    tree: Box<[u64]>,
}

impl QDigest {
    /// Builds a digest over `data` with compression parameter `k`, for values in `[0, sigma)`.
    ///
    /// # Errors
    ///
    /// If `k` or `sigma` is zero, `sigma` is too large, or any value falls outside of `[0, sigma)`, an error is
    /// returned.
    pub fn new(data: &[u64], k: u64, sigma: u64) -> Result<Self, QDigestError> {
        Self::from_config(QDigestConfig::new(k, sigma), data)
    }

    pub(crate) fn from_config(config: QDigestConfig, data: &[u64]) -> Result<Self, QDigestError> {
        config.validate()?;

        let frequencies = Frequencies::count(data, config.sigma)?;
        let layout = TreeLayout::for_sigma(config.sigma);
        let mut tree = layout.seed(frequencies.as_slice());

        let count = frequencies.total();
        let threshold = count / config.k;
        let merges = compress(&mut tree, layout.leaf_count(), threshold);

        debug!(
            sigma = config.sigma,
            k = config.k,
            count,
            threshold,
            tree_size = tree.len(),
            height = layout.height(),
            merges,
            "Built q-digest."
        );

        Ok(Self {
            config,
            layout,
            count,
            threshold,
            tree,
        })
    }

    /// Returns the configuration the digest was built with.
    pub fn config(&self) -> &QDigestConfig {
        &self.config
    }

    /// Returns the compression parameter.
    pub fn k(&self) -> u64 {
        self.config.k
    }

    /// Returns the cardinality of the value domain.
    pub fn sigma(&self) -> u64 {
        self.config.sigma
    }

    /// Returns the number of items the digest was built from.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns `true` if the digest was built from zero items.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the merge threshold, `floor(n / k)`.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Returns the number of levels in the tree, counting the leaf level.
    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Returns the number of leaf slots in the tree.
    pub fn leaf_count(&self) -> usize {
        self.layout.leaf_count()
    }

    /// Returns the node counts of the compressed tree, breadth-first.
    pub fn tree(&self) -> &[u64] {
        &self.tree
    }

    /// Returns the total number of nodes in the tree.
    pub fn tree_size(&self) -> usize {
        self.tree.len()
    }

    /// Returns the published worst-case rank error of a quantile query, `log2(sigma) * n / k`.
    pub fn error_bound(&self) -> f64 {
        (self.config.sigma as f64).log2() * self.count as f64 / self.config.k as f64
    }

    /// Returns the worst-case rank error of a quantile query against this tree.
    ///
    /// Items that a query cannot place precisely sit in internal nodes on the path to the answer, and each internal
    /// node holds at most `threshold` items, so the error is at most `(height - 1) * threshold`. This matches
    /// [`error_bound`](Self::error_bound) up to rounding of `log2(sigma)` and `n / k`.
    pub fn max_rank_error(&self) -> u64 {
        u64::from(self.layout.height() - 1) * self.threshold
    }

    /// Returns the domain values covered by the node at `index`, or `None` if the index is outside the tree.
    ///
    /// Ranges are not clamped to the domain: padding nodes report the slots they cover past `sigma - 1`.
    pub fn node_range(&self, index: usize) -> Option<RangeInclusive<u64>> {
        self.layout.node_range(index)
    }

    /// Returns the non-zero nodes of the tree as `(index, count)` pairs, in ascending index order.
    ///
    /// The order is breadth-first, not by represented value.
    pub fn serialize(&self) -> Vec<(usize, u64)> {
        self.tree
            .iter()
            .enumerate()
            .filter(|(_, &count)| count != 0)
            .map(|(index, &count)| (index, count))
            .collect()
    }

    /// Returns the approximate value at the given rank fraction.
    ///
    /// The tree is walked in post-order until the first bucket at which the cumulative count reaches `fraction * n`.
    /// The result is the lower end of that bucket's range, raised to the lower end of any non-empty bucket passed on
    /// the way: an ancestor can answer after one of its heavier descendants, and its range starts further left.
    /// Results are monotonic in `fraction`, and the number of items below or at the result is within
    /// [`max_rank_error`](Self::max_rank_error) of `fraction * n`.
    ///
    /// # Errors
    ///
    /// If `fraction` is not within `[0, 1]`, or the digest is empty, an error is returned.
    pub fn quantile(&self, fraction: f64) -> Result<u64, QDigestError> {
        self.quantile_node(fraction).map(|(_, value)| value)
    }

    /// Returns the range of values covered by the bucket answering a query at the given rank fraction.
    ///
    /// The range is clamped to the domain, and contains the value returned by [`quantile`](Self::quantile).
    ///
    /// # Errors
    ///
    /// If `fraction` is not within `[0, 1]`, or the digest is empty, an error is returned.
    pub fn quantile_range(&self, fraction: f64) -> Result<RangeInclusive<u64>, QDigestError> {
        let (index, _) = self.quantile_node(fraction)?;
        let Some(range) = self.layout.node_range(index) else {
            unreachable!("quantile walk answered with node {} outside of the tree", index)
        };
        let max_value = self.config.sigma - 1;

        Ok((*range.start()).min(max_value)..=(*range.end()).min(max_value))
    }

    /// Walks the tree in post-order and returns the index of the first node whose count carries the running total to
    /// `fraction * n`, along with the value it answers.
    fn quantile_node(&self, fraction: f64) -> Result<(usize, u64), QDigestError> {
        ensure!(
            (0.0..=1.0).contains(&fraction),
            InvalidArgument {
                reason: format!("fraction must be within [0, 1], got {}", fraction),
            }
        );
        ensure!(!self.is_empty(), EmptyDigest);

        let target = fraction * self.count as f64;
        let len = self.tree.len();
        let mut running = 0;
        let mut floor = 0u64;
        let mut stack = Vec::with_capacity(2 * self.layout.height() as usize);
        let mut node = 0;

        loop {
            if node < len {
                stack.push(right_child(node));
                stack.push(node);
                node = left_child(node);
                continue;
            }

            let Some(current) = stack.pop() else {
                break;
            };

            let right = right_child(current);
            if stack.last() == Some(&right) {
                // Right subtree still open: revisit this node once it's done.
                stack.pop();
                stack.push(current);
                node = right;
            } else {
                let count = self.tree[current];
                let start = self.layout.node_start(current);
                if (running + count) as f64 >= target {
                    return Ok((current, floor.max(start)));
                }
                if count > 0 {
                    floor = floor.max(start);
                }
                running += count;
                node = len;
            }
        }

        unreachable!("post-order walk ended below the target rank on a non-empty digest")
    }

    /// Returns `true` if the node at `index` satisfies the capacity invariant.
    ///
    /// Internal nodes may hold at most `threshold` items. Leaves hold raw frequencies and always pass. Indices outside
    /// the tree never pass.
    pub fn within_capacity(&self, index: usize) -> bool {
        if index >= self.tree.len() {
            return false;
        }

        index >= self.layout.first_leaf() || self.tree[index] <= self.threshold
    }

    /// Returns `true` if the node at `index` and its children together hold more than `threshold` items.
    ///
    /// Children outside the tree count as empty. A node failing this check would have been merged into by compression.
    pub fn is_unmergeable(&self, index: usize) -> bool {
        let count_at = |i: usize| self.tree.get(i).copied().unwrap_or(0);
        count_at(index) + count_at(left_child(index)) + count_at(right_child(index)) > self.threshold
    }

    /// Verifies the structural invariants of the compressed tree.
    ///
    /// # Errors
    ///
    /// If the counts do not sum to `n`, a padding leaf is non-zero, an internal node exceeds `threshold`, or an internal
    /// node with a non-empty child could still be merged, an error naming the first offending node is returned.
    pub fn check_invariants(&self) -> Result<(), QDigestError> {
        let total = self.tree.iter().sum::<u64>();
        ensure!(
            total == self.count,
            InvariantViolation {
                index: 0usize,
                reason: format!("tree holds {} items, expected {}", total, self.count),
            }
        );

        let first_leaf = self.layout.first_leaf();
        for index in 0..first_leaf {
            ensure!(
                self.within_capacity(index),
                InvariantViolation {
                    index,
                    reason: format!("count {} exceeds threshold {}", self.tree[index], self.threshold),
                }
            );

            let has_children = self.tree[left_child(index)] + self.tree[right_child(index)] > 0;
            ensure!(
                !has_children || self.is_unmergeable(index),
                InvariantViolation {
                    index,
                    reason: format!("node and children hold at most {} items but were not merged", self.threshold),
                }
            );
        }

        let first_padding = first_leaf + self.config.sigma as usize;
        if let Some(offset) = self.tree[first_padding..].iter().position(|&count| count != 0) {
            return InvariantViolation {
                index: first_padding + offset,
                reason: "padding leaf holds items",
            }
            .fail();
        }

        Ok(())
    }
}
