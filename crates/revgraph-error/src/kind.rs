//! Error kinds for revgraph operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// The engine's failure surface is small by design: almost everything here is
/// a caller contract violation or a corrupted-graph detection, not a transient
/// condition. Users can match on ErrorKind to decide how to handle specific
/// cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid argument passed to an operation (e.g. an out-of-range row index)
    InvalidArgument,

    /// A precondition the caller was responsible for does not hold
    /// (e.g. showing a fragment that is not collapsed)
    AssertionFailed,

    /// A structural invariant of the graph does not hold
    /// (e.g. an edge of unexpected kind at a fragment boundary)
    InvariantViolation,

    /// The same commit hash appeared twice in the builder input
    DuplicateCommit,

    /// Graph construction failed
    GraphBuildFailed,

    /// A node id did not resolve to a live node
    NodeNotFound,

    /// An edge id did not resolve to a live edge
    EdgeNotFound,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind is retryable by default.
    ///
    /// Contract violations never are; retrying a caller bug cannot help.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
