//! Error status for retry logic

use std::fmt;

/// The status of an error, indicating whether it can be retried.
///
/// The graph engine classifies essentially everything as `Permanent`: its
/// errors are caller bugs or corrupted state, not conditions that resolve on
/// their own. The full classification is kept so callers embedding the engine
/// behind retrying layers can treat its errors uniformly with their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorStatus {
    /// Error is permanent - don't retry without external changes.
    #[default]
    Permanent,

    /// Error is temporary - retry may succeed.
    Temporary,

    /// Error was temporary but persisted after retries; stop retrying.
    Persistent,
}

impl ErrorStatus {
    /// Check if retry is recommended
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Temporary)
    }

    /// Mark as persistent after failed retries
    pub fn persist(self) -> Self {
        match self {
            ErrorStatus::Temporary => ErrorStatus::Persistent,
            other => other,
        }
    }

    /// Get status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Permanent => "permanent",
            ErrorStatus::Temporary => "temporary",
            ErrorStatus::Persistent => "persistent",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
