use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Time source for TTL checks. Production uses [`SystemClock`]; tests
/// inject a fixed clock to exercise expiry boundaries deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    data: Value,
    timestamp: f64,
}

/// On-disk JSON cache keyed by URL, with a per-entry TTL.
///
/// The whole map is rewritten on every store; entry volume is small
/// (one per scraped URL) so a full rewrite stays cheap and keeps the
/// file format trivially inspectable.
pub struct ScrapeCache {
    path: PathBuf,
    ttl_secs: f64,
    enabled: bool,
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Box<dyn Clock>,
}

impl ScrapeCache {
    pub fn new(dir: impl AsRef<Path>, ttl_secs: u64, enabled: bool) -> Self {
        Self::with_clock(dir, ttl_secs, enabled, Box::new(SystemClock))
    }

    pub fn with_clock(
        dir: impl AsRef<Path>,
        ttl_secs: u64,
        enabled: bool,
        clock: Box<dyn Clock>,
    ) -> Self {
        let path = dir.as_ref().join("scrape_cache.json");
        let entries = if enabled { load_entries(&path) } else { HashMap::new() };
        Self {
            path,
            ttl_secs: ttl_secs as f64,
            enabled,
            entries: Mutex::new(entries),
            clock,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Fetch a cached value if present and younger than the TTL.
    /// An entry whose age equals the TTL exactly is still fresh; expired
    /// entries are dropped from the file on the spot.
    pub fn get(&self, url: &str) -> Option<Value> {
        if !self.enabled {
            return None;
        }
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.get(url)?;
        let age = self.clock.now() - entry.timestamp;
        if age > self.ttl_secs {
            debug!(url, age, "cache entry expired");
            entries.remove(url);
            self.persist(&entries);
            return None;
        }
        debug!(url, age, "cache hit");
        Some(entry.data.clone())
    }

    /// Store a value under the URL and persist the whole map to disk.
    /// Disk failures are logged and swallowed; the in-memory entry
    /// still serves the rest of the process lifetime.
    pub fn set(&self, url: &str, data: Value) {
        if !self.enabled {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            url.to_string(),
            CacheEntry {
                data,
                timestamp: self.clock.now(),
            },
        );
        self.persist(&entries);
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(?err, dir = %parent.display(), "failed to create cache dir");
                return;
            }
        }
        match serde_json::to_string(entries) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    warn!(?err, path = %self.path.display(), "failed to write cache file");
                }
            }
            Err(err) => warn!(?err, "failed to serialize cache"),
        }
    }
}

fn load_entries(path: &Path) -> HashMap<String, CacheEntry> {
    match fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(entries) => entries,
            Err(err) => {
                // A corrupt file starts an empty cache; next store rewrites it.
                warn!(?err, path = %path.display(), "cache file unreadable, starting empty");
                HashMap::new()
            }
        },
        Err(_) => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedClock(Mutex<f64>);

    impl FixedClock {
        fn new(t: f64) -> Self {
            Self(Mutex::new(t))
        }
        fn advance(&self, dt: f64) {
            *self.0.lock().unwrap() += dt;
        }
    }

    impl Clock for &'static FixedClock {
        fn now(&self) -> f64 {
            *self.0.lock().unwrap()
        }
    }

    fn leaked_clock(t: f64) -> &'static FixedClock {
        Box::leak(Box::new(FixedClock::new(t)))
    }

    #[test]
    fn entry_at_exact_ttl_is_still_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let clock = leaked_clock(1000.0);
        let cache = ScrapeCache::with_clock(dir.path(), 60, true, Box::new(clock));
        cache.set("https://a.example", json!({"markdown": "x"}));

        clock.advance(60.0);
        assert!(cache.get("https://a.example").is_some());

        clock.advance(0.5);
        assert!(cache.get("https://a.example").is_none());
    }

    #[test]
    fn disabled_cache_never_stores_or_serves() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ScrapeCache::new(dir.path(), 60, false);
        cache.set("https://a.example", json!(1));
        assert!(cache.get("https://a.example").is_none());
        assert!(!dir.path().join("scrape_cache.json").exists());
    }

    #[test]
    fn entries_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = ScrapeCache::new(dir.path(), 600, true);
            cache.set("https://a.example", json!({"markdown": "hello"}));
        }
        let cache = ScrapeCache::new(dir.path(), 600, true);
        assert_eq!(
            cache.get("https://a.example"),
            Some(json!({"markdown": "hello"}))
        );
    }

    #[test]
    fn corrupt_file_degrades_to_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scrape_cache.json"), "{not json").unwrap();
        let cache = ScrapeCache::new(dir.path(), 600, true);
        assert!(cache.get("https://a.example").is_none());
        cache.set("https://a.example", json!(2));
        assert_eq!(cache.get("https://a.example"), Some(json!(2)));
    }
}
