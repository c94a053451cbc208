//! String-only tiers. Values are JSON-serialized on the way in and parsed on the
//! way out, and the total size of all keys and values is capped by a quota.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::warn;

use super::{StorageTier, TierKind};
use crate::error::{StudioError, StudioResult};

/// 5 MiB, the usual per-origin ceiling for browser string storage.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

type StringMap = HashMap<String, String>;

fn usage(map: &StringMap) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Insert `key` → `raw` into `map` if the result stays within `quota`.
fn insert_within_quota(
    tier: TierKind,
    map: &mut StringMap,
    key: &str,
    raw: String,
    quota: usize,
) -> StudioResult<()> {
    let previous = map.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
    let needed = usage(map) - previous + key.len() + raw.len();
    if needed > quota {
        return Err(StudioError::quota_exceeded(tier, needed, quota));
    }
    map.insert(key.to_string(), raw);
    Ok(())
}

fn parse_raw(tier: TierKind, raw: &str) -> StudioResult<Value> {
    serde_json::from_str(raw).map_err(|e| StudioError::storage(tier, "parse", e.to_string()))
}

/// Fallback A: a string map persisted as one JSON object file.
pub struct LocalStringStore {
    path: PathBuf,
    quota: usize,
    // Serializes read-modify-write cycles within this process.
    lock: tokio::sync::Mutex<()>,
}

impl LocalStringStore {
    pub fn new(path: impl Into<PathBuf>, quota: usize) -> Self {
        Self {
            path: path.into(),
            quota,
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> StudioResult<StringMap> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StudioError::storage(TierKind::Local, "read map", e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StringMap::new()),
            Err(e) => Err(StudioError::io_at(
                "read local store",
                self.path.display().to_string(),
                e,
            )),
        }
    }
}

#[async_trait]
impl StorageTier for LocalStringStore {
    fn kind(&self) -> TierKind {
        TierKind::Local
    }

    async fn get(&self, key: &str) -> StudioResult<Option<Value>> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        map.get(key).map(|raw| parse_raw(TierKind::Local, raw)).transpose()
    }

    async fn set(&self, key: &str, value: &Value) -> StudioResult<()> {
        let raw = serde_json::to_string(value)?;
        let _guard = self.lock.lock().await;

        let mut map = match self.read_map().await {
            Ok(map) => map,
            Err(StudioError::Storage { reason, .. }) => {
                warn!(path = %self.path.display(), %reason, "local store file is corrupt, starting over");
                StringMap::new()
            }
            Err(e) => return Err(e),
        };
        insert_within_quota(TierKind::Local, &mut map, key, raw, self.quota)?;

        let bytes = serde_json::to_vec(&map)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_file_atomically(&path, &bytes))
            .await
            .map_err(|e| StudioError::storage(TierKind::Local, "set", e.to_string()))?
    }
}

fn write_file_atomically(path: &Path, bytes: &[u8]) -> StudioResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .map_err(|e| StudioError::io_at("create local store directory", dir.display().to_string(), e))?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path)
        .map_err(|e| StudioError::io_at("replace local store", path.display().to_string(), e.error))?;
    Ok(())
}

/// Fallback B: an in-process string map. Gone when the process exits.
pub struct SessionStringStore {
    entries: Mutex<StringMap>,
    quota: usize,
}

impl SessionStringStore {
    pub fn new(quota: usize) -> Self {
        Self {
            entries: Mutex::new(StringMap::new()),
            quota,
        }
    }

    /// Bytes currently held across all keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.lock().map(|m| usage(&m)).unwrap_or(0)
    }

    fn poisoned(operation: &str) -> StudioError {
        StudioError::storage(TierKind::Session, operation, "session map lock poisoned")
    }
}

#[async_trait]
impl StorageTier for SessionStringStore {
    fn kind(&self) -> TierKind {
        TierKind::Session
    }

    async fn get(&self, key: &str) -> StudioResult<Option<Value>> {
        let map = self.entries.lock().map_err(|_| Self::poisoned("get"))?;
        map.get(key).map(|raw| parse_raw(TierKind::Session, raw)).transpose()
    }

    async fn set(&self, key: &str, value: &Value) -> StudioResult<()> {
        let raw = serde_json::to_string(value)?;
        let mut map = self.entries.lock().map_err(|_| Self::poisoned("set"))?;
        insert_within_quota(TierKind::Session, &mut map, key, raw, self.quota)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let mut map = StringMap::new();
        insert_within_quota(TierKind::Session, &mut map, "k", "x".repeat(8), 10).unwrap();
        // Replacing the same key frees the old value first.
        insert_within_quota(TierKind::Session, &mut map, "k", "y".repeat(9), 10).unwrap();
        let err = insert_within_quota(TierKind::Session, &mut map, "k2", "z".into(), 10).unwrap_err();
        assert!(matches!(err, StudioError::QuotaExceeded { needed: 13, limit: 10, .. }));
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let store = SessionStringStore::new(DEFAULT_QUOTA_BYTES);
        store.set("k", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert_eq!(store.get("other").await.unwrap(), None);
        assert!(store.used_bytes() > 0);
    }

    #[tokio::test]
    async fn test_session_quota_exceeded() {
        let store = SessionStringStore::new(16);
        let err = store.set("k", &json!("a long string value")).await.unwrap_err();
        assert_eq!(err.category(), "quota");
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_local_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        LocalStringStore::new(&path, DEFAULT_QUOTA_BYTES)
            .set("k", &json!([1, 2, 3]))
            .await
            .unwrap();

        let reopened = LocalStringStore::new(&path, DEFAULT_QUOTA_BYTES);
        assert_eq!(reopened.get("k").await.unwrap(), Some(json!([1, 2, 3])));
    }

    #[tokio::test]
    async fn test_local_stores_strings_not_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        let store = LocalStringStore::new(&path, DEFAULT_QUOTA_BYTES);
        store.set("k", &json!([1])).await.unwrap();

        let on_disk: HashMap<String, String> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk["k"], "[1]");
    }

    #[tokio::test]
    async fn test_local_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        std::fs::write(&path, b"garbage").unwrap();
        let store = LocalStringStore::new(&path, DEFAULT_QUOTA_BYTES);

        assert!(store.get("k").await.is_err());
        store.set("k", &json!(true)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(true)));
    }
}
