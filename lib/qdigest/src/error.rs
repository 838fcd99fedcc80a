use snafu::Snafu;

/// Errors that can occur while building or querying a [`QDigest`](crate::QDigest).
#[derive(Clone, Debug, Eq, PartialEq, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum QDigestError {
    /// An argument was outside of its valid range.
    #[snafu(display("Invalid argument: {}", reason))]
    InvalidArgument {
        /// Why the argument was rejected.
        reason: String,
    },

    /// The digest was built from zero items, so no rank is defined.
    #[snafu(display("Cannot query quantiles of an empty digest."))]
    EmptyDigest,

    /// A structural invariant of the compressed tree does not hold.
    #[snafu(display("Invariant violated at node {}: {}", index, reason))]
    InvariantViolation {
        /// Index of the offending node.
        index: usize,

        /// Which invariant failed, and how.
        reason: String,
    },
}
