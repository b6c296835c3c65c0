use std::collections::HashMap;

use crate::models::SubmissionKey;

/// Cross-call counter of top-level submission attempts per key. Counts
/// user-triggered submissions, not the backoff retries inside a single
/// call. Reset only on success or an explicit reset flow.
#[derive(Default)]
pub struct AttemptLedger {
    counts: HashMap<SubmissionKey, u32>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SubmissionKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Returns the new count.
    pub fn increment(&mut self, key: &SubmissionKey) -> u32 {
        let count = self.counts.entry(key.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn reset(&mut self, key: &SubmissionKey) {
        self.counts.remove(key);
    }

    pub fn clear_prefix(&mut self, prefix: &str) {
        self.counts.retain(|key, _| !key.as_str().starts_with(prefix));
    }

    pub fn clear_all(&mut self) {
        self.counts.clear();
    }
}
