//! Cache & Cooldown Controller
//!
//! One durable cache slot for the last successful recommendation run, plus
//! the advisory cooldown between expensive analysis runs. The cache lives
//! in a single JSON file; stale or unparsable entries are repaired by
//! deletion on read, never surfaced as errors. The cooldown is an owned
//! value, not a process-wide singleton, and is not a lock: guarding
//! concurrent runs is the orchestrator's job.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::schema::RecommendationResponse;

/// How long a cached result stays servable
pub const CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Minimum interval between analysis runs
pub const COOLDOWN: Duration = Duration::from_secs(60);

/// A cached response plus the wall-clock time it was produced at
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedResult {
    pub data: RecommendationResponse,

    /// Production time, epoch milliseconds
    pub timestamp: i64,
}

/// Single-slot file-backed cache
pub struct RecommendationCache {
    path: PathBuf,
    ttl: Duration,
}

impl RecommendationCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), ttl: CACHE_TTL }
    }

    /// Custom TTL, for tests
    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self { path: path.into(), ttl }
    }

    /// Read the slot. Missing, unparsable, and expired entries all read as
    /// absent; the latter two delete the file as a side effect.
    pub fn load(&self) -> Option<CachedResult> {
        let raw = fs::read_to_string(&self.path).ok()?;

        let cached: CachedResult = match serde_json::from_str(&raw) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "repairing unparsable cache entry");
                self.repair();
                return None;
            }
        };

        let age_ms = Utc::now().timestamp_millis() - cached.timestamp;
        if age_ms > self.ttl.as_millis() as i64 {
            tracing::debug!(path = %self.path.display(), age_ms, "evicting expired cache entry");
            self.repair();
            return None;
        }

        Some(cached)
    }

    /// Overwrite the slot with `data` at the current timestamp
    pub fn save(&self, data: &RecommendationResponse) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let cached = CachedResult {
            data: data.clone(),
            timestamp: Utc::now().timestamp_millis(),
        };
        fs::write(&self.path, serde_json::to_string(&cached)?)?;
        Ok(())
    }

    fn repair(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Earliest-next-allowed-run state. In-memory only; a restart clears it.
#[derive(Debug)]
pub struct CooldownState {
    until: Option<Instant>,
    window: Duration,
}

impl Default for CooldownState {
    fn default() -> Self {
        Self::new()
    }
}

impl CooldownState {
    pub fn new() -> Self {
        Self { until: None, window: COOLDOWN }
    }

    /// Custom window, for tests
    pub fn with_window(window: Duration) -> Self {
        Self { until: None, window }
    }

    /// Arm the window from now
    pub fn start(&mut self) {
        self.until = Some(Instant::now() + self.window);
    }

    /// Time left; exactly zero once expired or never armed
    pub fn remaining(&self) -> Duration {
        self.until
            .map_or(Duration::ZERO, |until| until.saturating_duration_since(Instant::now()))
    }

    pub fn is_active(&self) -> bool {
        self.remaining() > Duration::ZERO
    }
}
