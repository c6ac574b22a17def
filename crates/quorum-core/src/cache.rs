use std::{
    collections::BTreeMap,
    hash::{DefaultHasher, Hash, Hasher},
    path::PathBuf,
};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;

pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// One persisted record per cache key. Entries are never mutated in place;
/// a write replaces the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub result: serde_json::Value,
    pub cached_at: DateTime<Utc>,
    pub subject_id: String,
    pub analysis_kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub by_kind: BTreeMap<String, usize>,
}

/// Content-addressed response cache over flat JSON files, with lazy
/// time-based eviction. One file per key; corrupt or unreadable entries are
/// treated as misses, never errors.
pub struct ResponseCache {
    dir: PathBuf,
    retention: Duration,
}

impl ResponseCache {
    pub fn new(dir: PathBuf, retention_days: i64) -> Self {
        Self {
            dir,
            retention: Duration::days(retention_days),
        }
    }

    /// Default on-disk location under the platform cache directory.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("quorum")
            .join("analysis")
    }

    /// Derive the cache key for one analysis identity. Pure and
    /// deterministic: the extra parameters are canonicalized (recursively
    /// key-sorted) before hashing, so parameter order never changes the key.
    pub fn derive_key(
        subject_id: &str,
        analysis_kind: &str,
        extra: Option<&serde_json::Value>,
    ) -> String {
        let mut hasher = DefaultHasher::new();
        subject_id.hash(&mut hasher);
        analysis_kind.hash(&mut hasher);
        if let Some(value) = extra {
            canonical_json(value).hash(&mut hasher);
        }
        hasher.finish().to_string()
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up a key. Expired entries are deleted as a side effect and
    /// reported as a miss.
    pub async fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        let path = self.entry_path(key);
        let raw = fs::read_to_string(&path).await.ok()?;
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache entry, treating as miss");
                return None;
            }
        };

        if Utc::now() - entry.cached_at > self.retention {
            debug!(key, "cache entry expired, evicting");
            let _ = fs::remove_file(&path).await;
            return None;
        }

        debug!(key, "cache hit");
        Some(entry.result)
    }

    /// Persist a result under a key, replacing any existing entry.
    pub async fn store(
        &self,
        key: &str,
        subject_id: &str,
        analysis_kind: &str,
        result: serde_json::Value,
    ) -> Result<()> {
        let entry = CacheEntry {
            result,
            cached_at: Utc::now(),
            subject_id: subject_id.to_string(),
            analysis_kind: analysis_kind.to_string(),
        };
        fs::create_dir_all(&self.dir).await?;
        let pretty_json = serde_json::to_string_pretty(&entry)?;
        fs::write(self.entry_path(key), &pretty_json).await?;
        Ok(())
    }

    /// Read-through wrapper, the primary consumer contract: return the
    /// cached payload when fresh, otherwise run `compute` once and persist
    /// its result. `force_refresh` always recomputes and overwrites.
    ///
    /// Concurrent misses for the same key may both compute; the last write
    /// wins. There is no per-key mutual exclusion.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        subject_id: &str,
        analysis_kind: &str,
        extra: Option<&serde_json::Value>,
        force_refresh: bool,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = Self::derive_key(subject_id, analysis_kind, extra);

        if !force_refresh
            && let Some(value) = self.lookup(&key).await
        {
            match serde_json::from_value(value) {
                Ok(cached) => return Ok(cached),
                Err(e) => {
                    warn!(key, error = %e, "cached payload has unexpected shape, recomputing");
                }
            }
        }

        let result = compute().await?;
        self.store(&key, subject_id, analysis_kind, serde_json::to_value(&result)?)
            .await?;
        Ok(result)
    }

    /// Remove entries matching both filters; `None` matches everything, so
    /// `invalidate(None, None)` clears the cache. Returns the removed count.
    pub async fn invalidate(
        &self,
        subject_id: Option<&str>,
        analysis_kind: Option<&str>,
    ) -> Result<usize> {
        let mut removed = 0;
        for (path, entry) in self.enumerate().await? {
            let Some(entry) = entry else {
                // Malformed entries only go away on a full clear.
                if subject_id.is_none() && analysis_kind.is_none() {
                    let _ = fs::remove_file(&path).await;
                    removed += 1;
                }
                continue;
            };
            let subject_matches = subject_id.is_none_or(|s| s == entry.subject_id);
            let kind_matches = analysis_kind.is_none_or(|k| k == entry.analysis_kind);
            if subject_matches && kind_matches {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Entry count, total storage size, and a per-kind breakdown. Malformed
    /// entries are skipped, not fatal.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for (path, entry) in self.enumerate().await? {
            if let Ok(meta) = fs::metadata(&path).await {
                stats.total_bytes += meta.len();
            }
            let Some(entry) = entry else {
                warn!(path = %path.display(), "skipping malformed cache entry in stats");
                continue;
            };
            stats.entries += 1;
            *stats.by_kind.entry(entry.analysis_kind).or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// All entry files with their parsed contents (`None` when malformed).
    async fn enumerate(&self) -> Result<Vec<(PathBuf, Option<CacheEntry>)>> {
        let mut entries = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            // A cache that was never written to is empty, not broken.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(e.into()),
        };
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let parsed = match fs::read_to_string(&path).await {
                Ok(raw) => serde_json::from_str(&raw).ok(),
                Err(_) => None,
            };
            entries.push((path, parsed));
        }
        Ok(entries)
    }
}

/// Canonical serialization: objects render with recursively sorted keys so
/// logically equal parameter maps hash identically.
fn canonical_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let fields: BTreeMap<&String, String> = map
                .iter()
                .map(|(k, v)| (k, canonical_json(v)))
                .collect();
            let body = fields
                .iter()
                .map(|(k, v)| format!("{k:?}:{v}"))
                .collect::<Vec<_>>()
                .join(",");
            format!("{{{body}}}")
        }
        serde_json::Value::Array(items) => {
            let body = items
                .iter()
                .map(canonical_json)
                .collect::<Vec<_>>()
                .join(",");
            format!("[{body}]")
        }
        other => other.to_string(),
    }
}
