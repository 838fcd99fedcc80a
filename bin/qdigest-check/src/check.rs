use qdigest::{QDigest, QDigestError};

/// Outcome of comparing a digest's answer at one rank fraction against the exact answer.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantileCheck {
    /// Queried rank fraction.
    pub fraction: f64,

    /// Value reported by the digest.
    pub estimate: u64,

    /// Smallest value with at least `fraction * n` items at or below it.
    pub exact: u64,

    /// Distance, in ranks, between `fraction * n` and the ranks the estimate spans.
    pub rank_error: f64,

    /// Maximum rank error the digest guarantees.
    pub bound: f64,
}

impl QuantileCheck {
    /// Returns `true` if the rank error is within the digest's guarantee.
    pub fn passed(&self) -> bool {
        self.rank_error <= self.bound
    }
}

/// Exact answers for a batch of values.
pub struct GroundTruth {
    sorted: Vec<u64>,
}

impl GroundTruth {
    /// Creates the ground truth for the given values.
    pub fn new(mut values: Vec<u64>) -> Self {
        values.sort_unstable();
        Self { sorted: values }
    }

    /// Returns the smallest value with at least `fraction * n` items at or below it.
    fn exact(&self, fraction: f64) -> u64 {
        let target = (fraction * self.sorted.len() as f64).ceil() as usize;
        self.sorted[target.saturating_sub(1).min(self.sorted.len() - 1)]
    }

    /// Returns how far, in ranks, `target` lies outside of the ranks occupied by `value`.
    fn rank_error(&self, value: u64, target: f64) -> f64 {
        let below = self.sorted.partition_point(|&v| v < value) as f64;
        let at_or_below = self.sorted.partition_point(|&v| v <= value) as f64;

        if target < below {
            below - target
        } else if target > at_or_below {
            target - at_or_below
        } else {
            0.0
        }
    }

    /// Queries `digest` at `fraction` and compares the answer against the exact one.
    ///
    /// # Errors
    ///
    /// If the digest rejects the query, an error is returned.
    pub fn check(&self, digest: &QDigest, fraction: f64) -> Result<QuantileCheck, QDigestError> {
        let estimate = digest.quantile(fraction)?;
        let target = fraction * digest.count() as f64;

        Ok(QuantileCheck {
            fraction,
            estimate,
            exact: self.exact(fraction),
            rank_error: self.rank_error(estimate, target),
            bound: digest.max_rank_error() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: [u64; 15] = [0, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 5, 6, 7];

    #[test]
    fn exact_answers() {
        let truth = GroundTruth::new(DATA.iter().rev().copied().collect());

        assert_eq!(truth.exact(0.0), 0);
        assert_eq!(truth.exact(0.25), 2);
        assert_eq!(truth.exact(0.5), 3);
        assert_eq!(truth.exact(0.75), 4);
        assert_eq!(truth.exact(1.0), 7);
    }

    #[test]
    fn rank_errors() {
        let truth = GroundTruth::new(DATA.to_vec());

        // Value 3 spans ranks 5 through 11.
        assert_eq!(truth.rank_error(3, 5.0), 0.0);
        assert_eq!(truth.rank_error(3, 11.0), 0.0);
        assert_eq!(truth.rank_error(3, 2.5), 2.5);
        assert_eq!(truth.rank_error(3, 13.0), 2.0);
    }

    #[test]
    fn reference_digest_passes() {
        let digest = QDigest::new(&DATA, 5, 8).unwrap();
        let truth = GroundTruth::new(DATA.to_vec());

        for fraction in [0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let check = truth.check(&digest, fraction).unwrap();
            assert!(check.passed(), "{:?}", check);
        }

        let check = truth.check(&digest, 0.75).unwrap();
        assert_eq!(check.estimate, 4);
        assert_eq!(check.exact, 4);
        assert_eq!(check.rank_error, 0.0);
    }

    #[test]
    fn empty_digest_is_rejected() {
        let digest = QDigest::new(&[], 5, 8).unwrap();
        let truth = GroundTruth::new(Vec::new());

        assert_eq!(truth.check(&digest, 0.5), Err(QDigestError::EmptyDigest));
    }
}
