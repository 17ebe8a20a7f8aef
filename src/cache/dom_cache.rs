use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Cache keys
// ============================================================================

/// Stable key for a piece of source content: sha1 hex digest.
pub fn cache_key(content: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

// ============================================================================
// On-disk TTL cache
// ============================================================================

/// One stored entry. The schema is internal; anything that fails to
/// deserialize is simply a miss.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    inserted_at_ms: u128,
    content_hash: String,
    payload: Value,
}

/// TTL-bounded key/value store for DOM snapshots, one JSON file per key.
///
/// Entries expire strictly by elapsed wall-clock time since insertion; an
/// expired or unreadable entry is treated as a miss and purged lazily.
/// Concurrent writers are last-writer-wins — staleness is self-limited by
/// the TTL and corrected by the healing pass, so no locking is needed.
pub struct DomCache {
    dir: PathBuf,
    ttl_ms: u128,
}

impl DomCache {
    pub fn new(dir: &Path, ttl_ms: u128) -> Self {
        DomCache {
            dir: dir.to_path_buf(),
            ttl_ms,
        }
    }

    /// Look up `key` at the current wall-clock time.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, now_ms())
    }

    /// Store `payload` under `key` at the current wall-clock time,
    /// overwriting any prior entry.
    pub fn put(&self, key: &str, payload: Value) {
        self.put_at(key, payload, now_ms());
    }

    /// TTL check factored over an explicit clock so the boundary is
    /// testable without sleeping.
    pub fn get_at(&self, key: &str, now_ms: u128) -> Option<Value> {
        let path = self.entry_path(key);
        let content = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(_) => {
                // Corrupt entry: miss, never an error
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        if now_ms.saturating_sub(entry.inserted_at_ms) >= self.ttl_ms {
            let _ = std::fs::remove_file(&path);
            return None;
        }

        Some(entry.payload)
    }

    pub fn put_at(&self, key: &str, payload: Value, now_ms: u128) {
        let entry = CacheEntry {
            inserted_at_ms: now_ms,
            content_hash: cache_key(&payload.to_string()),
            payload,
        };

        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            eprintln!("Warning: could not create cache dir: {}", e);
            return;
        }

        let json = match serde_json::to_string(&entry) {
            Ok(j) => j,
            Err(e) => {
                eprintln!("Warning: failed to serialize cache entry: {}", e);
                return;
            }
        };

        if let Err(e) = std::fs::write(self.entry_path(key), json) {
            eprintln!("Warning: failed to write cache entry: {}", e);
        }
    }

    /// Eagerly delete every expired entry. Lazy purge on read already keeps
    /// the cache correct; this just reclaims disk.
    pub fn purge_expired(&self) {
        let now = now_ms();
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let expired = match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<CacheEntry>(&content) {
                    Ok(e) => now.saturating_sub(e.inserted_at_ms) >= self.ttl_ms,
                    Err(_) => true, // corrupt counts as expired
                },
                Err(_) => true,
            };
            if expired {
                let _ = std::fs::remove_file(&path);
            }
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_key(key)))
    }
}

// ============================================================================
// Bounded in-memory companion cache
// ============================================================================

#[derive(Debug, Clone)]
struct MemEntry {
    inserted_at_ms: u128,
    payload: Value,
}

/// Capacity-bounded in-memory cache with the same TTL contract as the disk
/// cache. Eviction is first-in-first-out by insertion, not recency-based:
/// once capacity is exceeded, the oldest-inserted entry goes.
pub struct MemoryCache {
    capacity: usize,
    ttl_ms: u128,
    entries: HashMap<String, MemEntry>,
    insertion_order: VecDeque<String>,
}

impl MemoryCache {
    pub fn new(capacity: usize, ttl_ms: u128) -> Self {
        MemoryCache {
            capacity,
            ttl_ms,
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, now_ms())
    }

    pub fn put(&mut self, key: &str, payload: Value) {
        self.put_at(key, payload, now_ms());
    }

    pub fn get_at(&mut self, key: &str, now_ms: u128) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(e) => now_ms.saturating_sub(e.inserted_at_ms) >= self.ttl_ms,
            None => return None,
        };

        if expired {
            self.remove(key);
            return None;
        }

        self.entries.get(key).map(|e| e.payload.clone())
    }

    pub fn put_at(&mut self, key: &str, payload: Value, now_ms: u128) {
        if self.capacity == 0 {
            return;
        }

        // Overwrite keeps the original insertion position
        if !self.entries.contains_key(key) {
            self.insertion_order.push_back(key.to_string());
        }
        self.entries.insert(
            key.to_string(),
            MemEntry {
                inserted_at_ms: now_ms,
                payload,
            },
        );

        while self.entries.len() > self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.insertion_order.retain(|k| k != key);
    }
}
