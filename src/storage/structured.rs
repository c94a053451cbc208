//! Structured tier: one JSON document per key, stored natively (not as a string)
//! and replaced atomically through a temp file in the same directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::NamedTempFile;

use super::{StorageTier, TierKind};
use crate::error::{StudioError, StudioResult};

pub struct StructuredStore {
    root: PathBuf,
    available: AtomicBool,
}

impl StructuredStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            available: AtomicBool::new(true),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Toggle availability. An unavailable store fails every read and write,
    /// the way a browser's indexed store does under private-browsing restrictions.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", encode_key(key)))
    }

    fn ensure_available(&self, operation: &str) -> StudioResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StudioError::storage(
                TierKind::Structured,
                operation,
                "store is unavailable",
            ))
        }
    }
}

#[async_trait]
impl StorageTier for StructuredStore {
    fn kind(&self) -> TierKind {
        TierKind::Structured
    }

    async fn get(&self, key: &str) -> StudioResult<Option<Value>> {
        self.ensure_available("get")?;
        let path = self.document_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StudioError::io_at("read document", path.display().to_string(), e)),
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| StudioError::storage(TierKind::Structured, "get", e.to_string()))?;
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &Value) -> StudioResult<()> {
        self.ensure_available("set")?;
        let bytes = serde_json::to_vec(value)?;
        let root = self.root.clone();
        let path = self.document_path(key);

        tokio::task::spawn_blocking(move || write_atomically(&root, &path, &bytes))
            .await
            .map_err(|e| StudioError::storage(TierKind::Structured, "set", e.to_string()))?
    }
}

fn write_atomically(root: &Path, path: &Path, bytes: &[u8]) -> StudioResult<()> {
    std::fs::create_dir_all(root)
        .map_err(|e| StudioError::io_at("create store directory", root.display().to_string(), e))?;
    let mut tmp = NamedTempFile::new_in(root)
        .map_err(|e| StudioError::io_at("create temp document", root.display().to_string(), e))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| StudioError::io_at("replace document", path.display().to_string(), e.error))?;
    Ok(())
}

/// Keys become file names: ASCII alphanumerics, `-` and `_` pass through,
/// everything else is percent-encoded byte by byte.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
