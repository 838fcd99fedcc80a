use serde::Deserialize;
use snafu::ensure;

use crate::error::{InvalidArgument, QDigestError};
use crate::QDigest;

/// Largest supported domain cardinality.
///
/// The backing tree holds `2 * 2^ceil(log2(sigma)) - 1` counts, so this caps a single digest at 32GiB of counts.
pub const MAX_SIGMA: u64 = 1 << 31;

/// Construction parameters for a [`QDigest`].
///
/// # Example
///
/// ```
/// use qdigest::QDigestConfig;
///
/// let config = QDigestConfig::new(5, 8);
/// let digest = config.build(&[0, 2, 2, 3, 7]).unwrap();
/// assert_eq!(digest.count(), 5);
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QDigestConfig {
    /// Compression parameter.
    ///
    /// Larger values of `k` produce a smaller tree with a larger error. Buckets hold at most `n / k` items, and queries
    /// are accurate to within `log2(sigma) * n / k` ranks.
    pub k: u64,

    /// Cardinality of the value domain.
    ///
    /// Valid input values are the integers in `[0, sigma)`.
    pub sigma: u64,
}

impl QDigestConfig {
    /// Creates a new `QDigestConfig` with the given compression parameter and domain cardinality.
    pub fn new(k: u64, sigma: u64) -> Self {
        Self { k, sigma }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// If `k` is zero, or `sigma` is zero or larger than [`MAX_SIGMA`], an error is returned.
    pub fn validate(&self) -> Result<(), QDigestError> {
        ensure!(
            self.sigma > 0,
            InvalidArgument {
                reason: "sigma must be greater than zero",
            }
        );
        ensure!(
            self.sigma <= MAX_SIGMA,
            InvalidArgument {
                reason: format!("sigma must be at most {}, got {}", MAX_SIGMA, self.sigma),
            }
        );
        ensure!(
            self.k > 0,
            InvalidArgument {
                reason: "k must be greater than zero",
            }
        );

        Ok(())
    }

    /// Builds a digest over `data` with this configuration.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid, or any value in `data` falls outside of `[0, sigma)`, an error is returned.
    pub fn build(&self, data: &[u64]) -> Result<QDigest, QDigestError> {
        QDigest::from_config(*self, data)
    }
}
