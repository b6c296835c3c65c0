use std::time::Duration;

use thiserror::Error;

use crate::models::SubmissionKey;
use crate::transport::TransportError;

/// Typed failure surfaced to callers of the coordinator. `Clone` so the
/// outcome of one network call can be handed to every caller awaiting the
/// same in-flight submission.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// The request failed validation before any state was touched. Never
    /// retried.
    #[error("invalid submission request: {0}")]
    Validation(String),
    /// A submission for this key was attempted too recently. The caller
    /// should wait and let the user retry explicitly.
    #[error("submission throttled, retry allowed in {retry_after:?}")]
    Throttled { retry_after: Duration },
    /// The outer attempt budget for this key is spent. Terminal until the
    /// caller clears the key's state.
    #[error("max submission attempts ({max}) exceeded for {key}")]
    MaxAttemptsExceeded { key: SubmissionKey, max: u32 },
    /// Every backoff retry inside one submission failed transiently.
    #[error("retries exhausted after {attempts} transport calls: {last}")]
    RetriesExhausted {
        attempts: usize,
        last: TransportError,
    },
    /// The transport failed permanently; surfaced without retry.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The durable guard store misbehaved.
    #[error("guard store failure: {0}")]
    Store(String),
    #[error("submission task failed: {0}")]
    Internal(String),
}

impl SubmitError {
    /// Label used for the submission outcome metric.
    pub fn metric_label(&self) -> &'static str {
        match self {
            SubmitError::Validation(_) => "validation_error",
            SubmitError::Throttled { .. } => "throttled",
            SubmitError::MaxAttemptsExceeded { .. } => "max_attempts",
            SubmitError::RetriesExhausted { .. } => "retries_exhausted",
            SubmitError::Transport(_) => "transport_error",
            SubmitError::Store(_) => "store_error",
            SubmitError::Internal(_) => "internal_error",
        }
    }
}
