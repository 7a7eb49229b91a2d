use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const DEFAULT_REFRESH_DEBOUNCE_MS: u64 = 2000;

/// Configuration for a connection session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Refresh requests for the same address within this window of a
    /// successful fetch are ignored
    #[serde(default = "default_debounce")]
    pub refresh_debounce_ms: u64,
}

fn default_debounce() -> u64 {
    DEFAULT_REFRESH_DEBOUNCE_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_debounce_ms: DEFAULT_REFRESH_DEBOUNCE_MS,
        }
    }
}

impl SessionConfig {
    #[inline]
    pub fn refresh_debounce(&self) -> Duration {
        Duration::from_millis(self.refresh_debounce_ms)
    }
}

/// Source of wall-clock milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: AtomicU64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
