use async_trait::async_trait;
use thiserror::Error;

use crate::models::submission::{QuizResult, SubmissionPayload};

/// Message substrings that mark an error from an untyped source as
/// transient. Structured errors should carry a status code instead; this
/// list is only the fallback for legacy sources.
const TRANSIENT_MARKERS: [&str; 8] = [
    "network",
    "timeout",
    "failed to fetch",
    "connection refused",
    "connection reset",
    "deadlock",
    "write conflict",
    "temporarily unavailable",
];

/// Failure reported by the injected transport. `Clone` because outcomes are
/// fanned out to concurrent callers through a shared future.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network-level failure or timeout; worth retrying with backoff.
    #[error("transient transport failure: {0}")]
    Transient(String),
    /// The server understood the request and rejected it; retrying cannot
    /// help.
    #[error("permanent transport failure: {0}")]
    Permanent(String),
    /// Non-2xx HTTP response; transience is decided by the status code.
    #[error("server responded with status {status}: {message}")]
    Status { status: u16, message: String },
}

impl TransportError {
    /// Explicit retry predicate over the structured error.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Transient(_) => true,
            TransportError::Permanent(_) => false,
            TransportError::Status { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
        }
    }

    /// Fallback classification for errors from untyped sources, matching
    /// known failure-message substrings. Anything unmatched is permanent.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();
        let transient = TRANSIENT_MARKERS.iter().any(|m| lowered.contains(m))
            || lowered.contains("500")
            || lowered.contains("503");
        if transient {
            TransportError::Transient(message)
        } else {
            TransportError::Permanent(message)
        }
    }
}

/// Injected network transport. The coordinator owns when and how often this
/// is called; implementations own how the payload reaches the remote store.
#[async_trait]
pub trait ResultTransport: Send + Sync {
    async fn send(
        &self,
        slug: &str,
        payload: &SubmissionPayload,
    ) -> Result<QuizResult, TransportError>;
}
