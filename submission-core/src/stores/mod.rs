use async_trait::async_trait;

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use redis::RedisKvStore;

/// Generic durable key-value interface the persistence guard depends on.
/// This is the only resource whose writes must survive a process restart;
/// everything else the coordinator keeps is rebuilt empty on cold start.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}
