//! A q-digest: approximate quantiles over a small, known integer domain.
//!
//! A q-digest summarizes a multiset of values drawn from `[0, sigma)` in a complete binary tree whose nodes each
//! count the items falling in a sub-range of the domain. Sparsely populated subtrees are folded into their parents, so
//! the digest answers quantile queries to within `log2(sigma) * n / k` ranks while keeping only the buckets that carry
//! enough information.
//!
//! Based on "Medians and Beyond: New Aggregation Techniques for Sensor Networks" by Shrivastava, Buragohain, Agrawal
//! and Suri.
//!
//! # Quick Start
//!
//! ```
//! use qdigest::QDigest;
//!
//! // Latencies bucketed into 8 bins, compressed with k = 5.
//! let digest = QDigest::new(&[0, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3, 4, 5, 6, 7], 5, 8).unwrap();
//!
//! let p25 = digest.quantile(0.25).unwrap();
//! let p50 = digest.quantile(0.5).unwrap();
//! assert!(p25 <= p50);
//! ```
#![deny(warnings)]
#![deny(missing_docs)]

mod compress;

mod config;
pub use self::config::{QDigestConfig, MAX_SIGMA};

mod digest;
pub use self::digest::QDigest;

mod error;
pub use self::error::QDigestError;

mod frequency;
mod tree;
