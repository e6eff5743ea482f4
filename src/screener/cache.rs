//! TTL-governed JSON cache for screening results.
//!
//! Keyed by instance and timeframe. A single writer owns the file; readers
//! accept stale-but-valid entries without blocking. Writes go through a
//! temp file and rename so a crashed write never leaves a torn artifact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::PairCandidate;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// On-disk cache artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerCacheEntry {
    pub instance: String,
    pub timeframe: String,
    pub discovered_at: DateTime<Utc>,
    pub symbols_screened: usize,
    pub pairs: Vec<PairCandidate>,
}

pub struct ScreenerCache {
    path: PathBuf,
    instance: String,
    ttl_hours: f64,
}

impl ScreenerCache {
    pub fn new(path: impl Into<PathBuf>, instance: impl Into<String>, ttl_hours: f64) -> Self {
        Self {
            path: path.into(),
            instance: instance.into(),
            ttl_hours,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh cached pairs for this instance+timeframe, or None when the
    /// file is missing, unreadable, mismatched, or expired. A corrupt file
    /// is a warning and a miss, never a hard failure.
    pub fn load(&self, timeframe: &str, now: DateTime<Utc>) -> Option<ScreenerCacheEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Screener cache unreadable");
                return None;
            }
        };

        let entry: ScreenerCacheEntry = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Screener cache corrupt, ignoring");
                return None;
            }
        };

        if entry.instance != self.instance || entry.timeframe != timeframe {
            debug!(
                cached_instance = %entry.instance,
                cached_timeframe = %entry.timeframe,
                "Screener cache keyed for different instance/timeframe"
            );
            return None;
        }

        let age = now.signed_duration_since(entry.discovered_at);
        let ttl = Duration::seconds((self.ttl_hours * 3600.0) as i64);
        if age > ttl {
            debug!(
                age_hours = format!("{:.1}", age.num_minutes() as f64 / 60.0),
                "Screener cache expired"
            );
            return None;
        }

        Some(entry)
    }

    /// Persist a screening result, overwriting any previous entry.
    pub fn store(
        &self,
        timeframe: &str,
        symbols_screened: usize,
        pairs: &[PairCandidate],
        now: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let entry = ScreenerCacheEntry {
            instance: self.instance.clone(),
            timeframe: timeframe.to_string(),
            discovered_at: now,
            symbols_screened,
            pairs: pairs.to_vec(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(&entry)?)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!(path = %self.path.display(), pairs = pairs.len(), "Screener cache written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_pair() -> PairCandidate {
        PairCandidate {
            symbol1: "SOL".to_string(),
            symbol2: "RAY".to_string(),
            beta: 1.1,
            correlation: 0.7,
            adf_p_value: 0.02,
            hurst_exponent: 0.35,
            half_life: 6.0,
            coefficient_of_variation: 0.4,
            confidence_score: 0.7,
        }
    }

    fn cache_in(dir: &TempDir) -> ScreenerCache {
        ScreenerCache::new(dir.path().join("screener.json"), "test-instance", 12.0)
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        assert!(cache_in(&dir).load("1h", Utc::now()).is_none());
    }

    #[test]
    fn test_store_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();

        cache.store("1h", 12, &[sample_pair()], now).unwrap();
        let entry = cache.load("1h", now).unwrap();

        assert_eq!(entry.symbols_screened, 12);
        assert_eq!(entry.pairs.len(), 1);
        assert_eq!(entry.pairs[0].symbol1, "SOL");
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let discovered = Utc::now();

        cache.store("1h", 12, &[sample_pair()], discovered).unwrap();
        let later = discovered + Duration::hours(13);
        assert!(cache.load("1h", later).is_none());
    }

    #[test]
    fn test_timeframe_mismatch_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();

        cache.store("1h", 12, &[sample_pair()], now).unwrap();
        assert!(cache.load("4h", now).is_none());
    }

    #[test]
    fn test_instance_mismatch_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        cache_in(&dir).store("1h", 12, &[sample_pair()], now).unwrap();

        let other = ScreenerCache::new(dir.path().join("screener.json"), "other-instance", 12.0);
        assert!(other.load("1h", now).is_none());
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        std::fs::write(cache.path(), "{not json").unwrap();
        assert!(cache.load("1h", Utc::now()).is_none());
    }
}
