//! # Studio Configuration
//!
//! [`StudioConfig`] is the common interface between the `tryon` CLI and the
//! library. Values come from defaults, then environment variables, then CLI flags.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Env var | Default | Description |
//! |-----------|---------|---------|-------------|
//! | `data_dir` | `TRYON_DATA_DIR` | `.tryon-data` | Root of the persistent tiers |
//! | `local_quota_bytes` | `TRYON_LOCAL_QUOTA` | 5 MiB | Local string tier ceiling |
//! | `session_quota_bytes` | `TRYON_SESSION_QUOTA` | 5 MiB | Session string tier ceiling |
//! | `max_dimension` | | 1024 | Longest side of compressed images |
//! | `quality` | | 0.85 | JPEG quality in (0, 1] |
//! | `gemini_api_key` | `GEMINI_API_KEY` | none | Image generation and editing |
//! | `elevenlabs_api_key` | `ELEVENLABS_API_KEY` | none | Speech transcription |
//! | `request_timeout_secs` | | 60 | Per-request timeout for remote calls |
//!
//! ## Examples
//!
//! ```rust
//! use try_on_studio::config::StudioConfig;
//!
//! let config = StudioConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.max_dimension, 1024);
//! ```

use std::path::PathBuf;

use crate::error::{StudioError, StudioResult};
use crate::storage::DEFAULT_QUOTA_BYTES;

pub const DATA_DIR_ENV: &str = "TRYON_DATA_DIR";
pub const LOCAL_QUOTA_ENV: &str = "TRYON_LOCAL_QUOTA";
pub const SESSION_QUOTA_ENV: &str = "TRYON_SESSION_QUOTA";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";
pub const ELEVENLABS_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Configuration for one studio instance.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Root directory for the structured and local tiers.
    pub data_dir: PathBuf,

    /// Ceiling for the local string tier, in bytes of keys plus values.
    pub local_quota_bytes: usize,

    /// Ceiling for the session string tier.
    pub session_quota_bytes: usize,

    /// Longest side, in pixels, that compressed images may have.
    pub max_dimension: u32,

    /// JPEG quality used when re-encoding, in (0, 1].
    pub quality: f32,

    pub gemini_api_key: Option<String>,

    pub elevenlabs_api_key: Option<String>,

    pub request_timeout_secs: u64,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".tryon-data"),
            local_quota_bytes: DEFAULT_QUOTA_BYTES,
            session_quota_bytes: DEFAULT_QUOTA_BYTES,
            max_dimension: 1024,
            quality: 0.85,
            gemini_api_key: None,
            elevenlabs_api_key: None,
            request_timeout_secs: 60,
        }
    }
}

impl StudioConfig {
    /// Defaults overlaid with whatever the environment provides.
    ///
    /// Unparseable quota values are ignored and the default is kept.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`StudioConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|s| !s.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(q) = lookup(LOCAL_QUOTA_ENV).and_then(|s| s.trim().parse().ok()) {
            config.local_quota_bytes = q;
        }
        if let Some(q) = lookup(SESSION_QUOTA_ENV).and_then(|s| s.trim().parse().ok()) {
            config.session_quota_bytes = q;
        }
        config.gemini_api_key = non_empty(lookup(GEMINI_KEY_ENV));
        config.elevenlabs_api_key = non_empty(lookup(ELEVENLABS_KEY_ENV));
        config
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> StudioResult<()> {
        let invalid = |field: &str, value: String, reason: &str| {
            Err(StudioError::config(field, value, reason).with_operation("validate configuration"))
        };
        if self.data_dir.as_os_str().is_empty() {
            return invalid("data_dir", String::new(), "must not be empty");
        }
        if self.max_dimension == 0 {
            return invalid("max_dimension", "0".into(), "must be greater than 0");
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return invalid("quality", self.quality.to_string(), "must be in (0, 1]");
        }
        if self.request_timeout_secs == 0 {
            return invalid("request_timeout_secs", "0".into(), "must be greater than 0");
        }
        Ok(())
    }

    /// Directory holding structured-tier documents.
    pub fn structured_dir(&self) -> PathBuf {
        self.data_dir.join("structured")
    }

    /// File backing the local string tier.
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local-storage.json")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.data_dir, PathBuf::from(".tryon-data"));
        assert_eq!(config.max_dimension, 1024);
        assert_eq!(config.quality, 0.85);
        assert_eq!(config.local_quota_bytes, 5 * 1024 * 1024);
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = StudioConfig::default();
        assert!(config.validate().is_ok());

        config.max_dimension = 0;
        assert!(config.validate().is_err());
        config.max_dimension = 1024;

        config.quality = 0.0;
        assert!(config.validate().is_err());
        config.quality = 1.5;
        assert!(config.validate().is_err());
        config.quality = 1.0;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_error_names_field() {
        let config = StudioConfig {
            quality: 1.5,
            ..StudioConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.category(), "config");
        assert!(err.to_string().contains("'quality'"));
        assert_eq!(err.context().operation.as_deref(), Some("validate configuration"));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (DATA_DIR_ENV, "/tmp/studio"),
            (LOCAL_QUOTA_ENV, "1024"),
            (SESSION_QUOTA_ENV, "not a number"),
            (GEMINI_KEY_ENV, "abc"),
            (ELEVENLABS_KEY_ENV, "  "),
        ]);
        let config = StudioConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.data_dir, PathBuf::from("/tmp/studio"));
        assert_eq!(config.local_quota_bytes, 1024);
        assert_eq!(config.session_quota_bytes, DEFAULT_QUOTA_BYTES);
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc"));
        assert!(config.elevenlabs_api_key.is_none());
        assert_eq!(config.structured_dir(), PathBuf::from("/tmp/studio/structured"));
    }
}
