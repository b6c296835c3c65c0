use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::models::SubmissionKey;

/// Per-key cooldown preventing submission storms. A window opens on each
/// acquired attempt; while it is live, further attempts for the key are
/// rejected without touching the network.
///
/// Windows are plain expiry timestamps checked lazily on every call, so no
/// background timer exists. Advisory only: the map is rebuilt empty on
/// restart.
pub struct ThrottleGate {
    window: Duration,
    windows: HashMap<SubmissionKey, Instant>,
}

impl ThrottleGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            windows: HashMap::new(),
        }
    }

    /// Opens a window for `key` and returns true, or returns false while a
    /// previous window is still live. Synchronous and non-blocking: callers
    /// are rejected, never queued.
    pub fn try_acquire(&mut self, key: &SubmissionKey) -> bool {
        let now = Instant::now();
        self.windows.retain(|_, expires_at| *expires_at > now);

        if self.windows.contains_key(key) {
            return false;
        }
        self.windows.insert(key.clone(), now + self.window);
        true
    }

    /// Time left until `key` becomes acquirable again.
    pub fn remaining(&self, key: &SubmissionKey) -> Option<Duration> {
        let now = Instant::now();
        self.windows
            .get(key)
            .and_then(|expires_at| expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    pub fn clear_prefix(&mut self, prefix: &str) {
        self.windows.retain(|key, _| !key.as_str().starts_with(prefix));
    }

    pub fn clear_all(&mut self) {
        self.windows.clear();
    }
}
