use std::sync::Arc;

use anyhow::{Context, Result};

use crate::models::submission::SubmissionOutcome;
use crate::models::{ResultType, SubmissionKey};
use crate::stores::KvStore;

/// Durable, cross-restart record that a logical submission already
/// succeeded. The stored value is the full serialized outcome, so a
/// cold-started coordinator can serve the saved result without ever
/// resubmitting it.
pub struct PersistenceGuard {
    store: Arc<dyn KvStore>,
    namespace: String,
}

impl PersistenceGuard {
    pub fn new(store: Arc<dyn KvStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn storage_key(&self, key: &SubmissionKey) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Checked before any network attempt; `Some` short-circuits the whole
    /// submission.
    pub async fn load(&self, key: &SubmissionKey) -> Result<Option<SubmissionOutcome>> {
        let raw = self
            .store
            .get(&self.storage_key(key))
            .await
            .context("guard store read failed")?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<SubmissionOutcome>(&raw) {
            Ok(outcome) => Ok(Some(outcome)),
            Err(e) => {
                // An unreadable record is treated as absent: the worst case
                // is one extra network submission, never a lost result.
                tracing::warn!("Discarding corrupt guard record for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    pub async fn is_marked(&self, key: &SubmissionKey) -> Result<bool> {
        Ok(self.load(key).await?.is_some())
    }

    /// Must be called only after the transport confirmed success.
    pub async fn mark(&self, key: &SubmissionKey, outcome: &SubmissionOutcome) -> Result<()> {
        let raw = serde_json::to_string(outcome).context("failed to serialize guard record")?;
        self.store
            .set(&self.storage_key(key), &raw)
            .await
            .context("guard store write failed")
    }

    pub async fn clear(&self, key: &SubmissionKey) -> Result<()> {
        self.store
            .delete(&self.storage_key(key))
            .await
            .context("guard store delete failed")
    }

    /// Removes the guard record for every result type of the quiz. The
    /// key-value contract has no scan, so the reset flow enumerates the
    /// known result types instead.
    pub async fn clear_quiz(&self, quiz_id: &str) -> Result<()> {
        for kind in ResultType::ALL {
            self.clear(&SubmissionKey::new(quiz_id, kind)).await?;
        }
        Ok(())
    }
}
