use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::core::entity::{Entity, FileRecord, RepoCoords};

/// Bump whenever the serialized record layout changes; records written under
/// any other version are evicted on read.
pub const CACHE_VERSION: u32 = 2;

/// One cached analysis result for a (repository, branch) fingerprint.
///
/// Records are immutable once written; an update is a whole-record
/// replacement, never a partial mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheRecord {
    pub version: u32,
    /// Unix seconds at capture time.
    pub captured_at: u64,
    /// Unix seconds after which the record is stale.
    pub expires_at: u64,
    pub entities: Vec<Entity>,
    pub files: Vec<FileRecord>,
    pub repo: RepoCoords,
}

impl CacheRecord {
    pub fn new(
        entities: Vec<Entity>,
        files: Vec<FileRecord>,
        repo: RepoCoords,
        ttl_secs: u64,
    ) -> Self {
        let captured_at = now_unix();
        Self {
            version: CACHE_VERSION,
            captured_at,
            expires_at: captured_at.saturating_add(ttl_secs),
            entities,
            files,
            repo,
        }
    }

    /// Usable iff the stored format version matches and the expiry has not
    /// elapsed.
    pub fn is_valid(&self, now: u64) -> bool {
        self.version == CACHE_VERSION && now < self.expires_at
    }
}

/// Aggregate numbers over the stored records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
    /// Earliest capture timestamp among stored records.
    pub oldest: Option<u64>,
    /// Latest capture timestamp among stored records.
    pub newest: Option<u64>,
}

/// Size/validity snapshot of one stored record, decoupled from I/O so the
/// eviction policy stays a pure function.
#[derive(Debug, Clone)]
pub struct RecordSummary {
    pub key: String,
    /// Unix seconds of the record file's last modification.
    pub modified: u64,
    pub size: u64,
    pub valid: bool,
}

/// Computes the set of record keys to delete after a write.
///
/// Invalid (expired or version-mismatched) records are always deleted. If
/// the remaining records still exceed `max_bytes` in aggregate, the
/// oldest-modified survivors are deleted until the total fits.
pub fn eviction_plan(summaries: &[RecordSummary], max_bytes: u64) -> Vec<String> {
    let mut doomed: Vec<String> = summaries
        .iter()
        .filter(|s| !s.valid)
        .map(|s| s.key.clone())
        .collect();

    let mut live: Vec<&RecordSummary> = summaries.iter().filter(|s| s.valid).collect();
    live.sort_by_key(|s| s.modified);

    let mut total: u64 = live.iter().map(|s| s.size).sum();
    let mut oldest_first = live.into_iter();
    while total > max_bytes {
        match oldest_first.next() {
            Some(victim) => {
                total -= victim.size;
                doomed.push(victim.key.clone());
            }
            None => break,
        }
    }

    doomed
}

/// Store for previously computed analysis results, keyed by a deterministic
/// fingerprint of (repository location, branch).
///
/// Memory layer in front of best-effort disk storage. Every storage I/O
/// error is logged and treated as a miss; nothing escapes to the caller.
pub struct AnalysisCache {
    memory: DashMap<String, CacheRecord>,
    cache_dir: Option<PathBuf>,
    ttl_secs: u64,
    max_bytes: u64,
}

impl AnalysisCache {
    pub fn new(cache_dir: PathBuf, ttl_secs: u64, max_bytes: u64) -> Self {
        let cache_dir = match fs::create_dir_all(&cache_dir) {
            Ok(()) => Some(cache_dir),
            Err(err) => {
                warn!(
                    "failed to initialize cache directory {}: {err}; continuing without disk cache",
                    cache_dir.display()
                );
                None
            }
        };

        Self {
            memory: DashMap::new(),
            cache_dir,
            ttl_secs,
            max_bytes,
        }
    }

    /// Build a store that never touches the filesystem.
    pub fn in_memory_only(ttl_secs: u64, max_bytes: u64) -> Self {
        Self {
            memory: DashMap::new(),
            cache_dir: None,
            ttl_secs,
            max_bytes,
        }
    }

    /// Stable one-way key for a (location, branch) pair; identical requests
    /// always map to the same key.
    pub fn fingerprint(location: &str, branch: &str) -> String {
        let digest = Sha256::digest(format!("{location}#{branch}").as_bytes());
        format!("{digest:x}")
    }

    /// Returns the cached record for (location, branch) if one exists and is
    /// still valid. Invalid records found on the way are deleted.
    pub fn get(&self, location: &str, branch: &str) -> Option<CacheRecord> {
        let key = Self::fingerprint(location, branch);
        let now = now_unix();

        if let Some(entry) = self.memory.get(&key) {
            if entry.is_valid(now) {
                return Some(entry.clone());
            }
            drop(entry);
            self.memory.remove(&key);
            self.remove_record_file(&key);
            return None;
        }

        let path = self.record_path(&key)?;
        if !path.exists() {
            return None;
        }

        match self.load_record(&path) {
            Some(record) if record.is_valid(now) => {
                self.memory.insert(key, record.clone());
                Some(record)
            }
            _ => {
                // Lazy eviction: stale, version-mismatched, or unreadable.
                self.remove_record_file(&key);
                None
            }
        }
    }

    /// Writes a fresh record for (location, branch), then enforces the
    /// expiry and size policies over the whole store.
    pub fn put(
        &self,
        location: &str,
        branch: &str,
        entities: Vec<Entity>,
        files: Vec<FileRecord>,
        repo: RepoCoords,
    ) {
        let record = CacheRecord::new(entities, files, repo, self.ttl_secs);
        self.store_record(location, branch, record);
    }

    /// Writes an already-built record. Exposed so invalidation behavior can
    /// be exercised against records from other format versions.
    pub fn store_record(&self, location: &str, branch: &str, record: CacheRecord) {
        let key = Self::fingerprint(location, branch);
        self.memory.insert(key.clone(), record.clone());

        if let Some(path) = self.record_path(&key) {
            match bincode::serialize(&record) {
                Ok(bytes) => {
                    if let Err(err) = fs::write(&path, bytes) {
                        warn!("failed to write cache record {}: {err}", path.display());
                    }
                }
                Err(err) => warn!("failed to serialize cache record {key}: {err}"),
            }
        }

        self.enforce_capacity();
    }

    /// Aggregate stats over the disk store (memory-only stores report the
    /// memory layer instead).
    pub fn stats(&self) -> CacheStats {
        let Some(dir) = self.cache_dir.as_deref() else {
            let count = self.memory.len();
            let (oldest, newest) = self
                .memory
                .iter()
                .fold((None, None), |(lo, hi), entry| {
                    let t = entry.captured_at;
                    (min_opt(lo, t), max_opt(hi, t))
                });
            return CacheStats {
                count,
                total_bytes: 0,
                oldest,
                newest,
            };
        };

        let mut stats = CacheStats {
            count: 0,
            total_bytes: 0,
            oldest: None,
            newest: None,
        };

        for path in self.record_files(dir) {
            stats.count += 1;
            if let Ok(meta) = fs::metadata(&path) {
                stats.total_bytes += meta.len();
            }
            if let Some(record) = self.load_record(&path) {
                stats.oldest = min_opt(stats.oldest, record.captured_at);
                stats.newest = max_opt(stats.newest, record.captured_at);
            }
        }

        stats
    }

    /// Destructively drops every stored record.
    pub fn clear(&self) {
        self.memory.clear();
        if let Some(dir) = self.cache_dir.as_deref() {
            if dir.exists() {
                if let Err(err) = fs::remove_dir_all(dir).and_then(|()| fs::create_dir_all(dir)) {
                    warn!("failed to clear cache directory {}: {err}", dir.display());
                }
            }
        }
    }

    fn enforce_capacity(&self) {
        let Some(dir) = self.cache_dir.as_deref() else {
            return;
        };

        let now = now_unix();
        let mut summaries = Vec::new();
        for path in self.record_files(dir) {
            let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };
            let (modified, size) = match fs::metadata(&path) {
                Ok(meta) => (unix_secs(meta.modified().ok()), meta.len()),
                Err(err) => {
                    warn!("failed to stat cache record {}: {err}", path.display());
                    continue;
                }
            };
            let valid = self
                .load_record(&path)
                .map(|record| record.is_valid(now))
                .unwrap_or(false);
            summaries.push(RecordSummary {
                key,
                modified,
                size,
                valid,
            });
        }

        for key in eviction_plan(&summaries, self.max_bytes) {
            self.memory.remove(&key);
            self.remove_record_file(&key);
        }
    }

    fn record_files(&self, dir: &Path) -> Vec<PathBuf> {
        match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
                .collect(),
            Err(err) => {
                warn!("failed to list cache directory {}: {err}", dir.display());
                Vec::new()
            }
        }
    }

    fn record_path(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(format!("{key}.bin")))
    }

    fn load_record(&self, path: &Path) -> Option<CacheRecord> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to read cache record {}: {err}", path.display());
                return None;
            }
        };
        match bincode::deserialize(&bytes) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!("failed to decode cache record {}: {err}", path.display());
                None
            }
        }
    }

    fn remove_record_file(&self, key: &str) {
        if let Some(path) = self.record_path(key) {
            if path.exists() {
                if let Err(err) = fs::remove_file(&path) {
                    warn!("failed to remove cache record {}: {err}", path.display());
                }
            }
        }
    }
}

fn now_unix() -> u64 {
    unix_secs(Some(SystemTime::now()))
}

fn unix_secs(time: Option<SystemTime>) -> u64 {
    time.and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn min_opt(current: Option<u64>, candidate: u64) -> Option<u64> {
    Some(current.map_or(candidate, |c| c.min(candidate)))
}

fn max_opt(current: Option<u64>, candidate: u64) -> Option<u64> {
    Some(current.map_or(candidate, |c| c.max(candidate)))
}
