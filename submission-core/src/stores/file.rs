use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::KvStore;

/// Durable store backed by a single JSON document on disk. Suited to
/// deployments without Redis; every write rewrites the whole document,
/// which is fine for the handful of guard records this crate keeps.
pub struct FileKvStore {
    path: PathBuf,
    // serializes read-modify-write cycles against the backing file
    lock: Mutex<()>,
}

impl FileKvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<HashMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt key-value document at {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to read key-value document at {}", self.path.display())
            }),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("failed to create store directory {}", parent.display())
                })?;
            }
        }
        let bytes =
            serde_json::to_vec_pretty(entries).context("failed to serialize key-value document")?;
        tokio::fs::write(&self.path, bytes).await.with_context(|| {
            format!(
                "failed to write key-value document at {}",
                self.path.display()
            )
        })
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("submission-core-kv-{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn roundtrip_survives_reopening() {
        let path = temp_path();

        let store = FileKvStore::new(&path);
        store.set("quiz-1:mcq", "{\"saved\":true}").await.unwrap();
        drop(store);

        let reopened = FileKvStore::new(&path);
        assert_eq!(
            reopened.get("quiz-1:mcq").await.unwrap(),
            Some("{\"saved\":true}".to_string())
        );

        reopened.delete("quiz-1:mcq").await.unwrap();
        assert_eq!(reopened.get("quiz-1:mcq").await.unwrap(), None);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = FileKvStore::new(temp_path());
        assert_eq!(store.get("anything").await.unwrap(), None);
        // delete on a missing file is a no-op, not an error
        store.delete("anything").await.unwrap();
    }
}
