use snafu::ensure;

use crate::error::{InvalidArgument, QDigestError};

/// Occurrence counts for every value of the domain `[0, sigma)`.
#[derive(Debug)]
pub(crate) struct Frequencies {
    counts: Vec<u64>,
    total: u64,
}

impl Frequencies {
    /// Counts the occurrences of each value in `data`.
    ///
    /// # Errors
    ///
    /// If any value falls outside of `[0, sigma)`, an error is returned.
    pub fn count(data: &[u64], sigma: u64) -> Result<Self, QDigestError> {
        let mut counts = vec![0u64; sigma as usize];
        for &value in data {
            ensure!(
                value < sigma,
                InvalidArgument {
                    reason: format!("value {} is outside of the domain [0, {})", value, sigma),
                }
            );
            counts[value as usize] += 1;
        }

        Ok(Self {
            counts,
            total: data.len() as u64,
        })
    }

    /// Total number of items counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Per-value counts, indexed by domain value.
    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }
}
