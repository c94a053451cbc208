//! # Remote Collaborators
//!
//! The studio talks to three external services: a generative image editor, a
//! text-to-image generator and a speech transcriber. Each is a trait here so the
//! workflows can be driven by test doubles; [`gemini`] and [`elevenlabs`] hold the
//! HTTP implementations.
//!
//! Calls are single attempts. An editor or generator answering `Ok(None)` means
//! the service produced no image, which callers treat exactly like an error.
//! Superseded responses are detected with a [`RequestTracker`].

pub mod dictation;
pub mod elevenlabs;
pub mod gemini;
mod generation;

pub use dictation::{AudioSource, FileAudioSource, dictate};
pub use elevenlabs::ElevenLabsClient;
pub use gemini::GeminiClient;
pub use generation::{RequestToken, RequestTracker};

use std::convert::Infallible;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::{StudioError, StudioResult};
use crate::processing::ImagePayload;

/// An image edit: one base image, optional reference images, and an instruction.
///
/// With references present this is a composite edit.
#[derive(Debug, Clone)]
pub struct EditRequest {
    pub base: ImagePayload,
    pub references: Vec<ImagePayload>,
    pub instruction: String,
}

impl EditRequest {
    pub fn is_composite(&self) -> bool {
        !self.references.is_empty()
    }
}

#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit(&self, request: &EditRequest) -> StudioResult<Option<ImagePayload>>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> StudioResult<Option<ImagePayload>>;
}

/// A recorded audio clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a clip from disk, taking the media type from the extension.
    pub async fn from_file(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StudioError::io_at("read audio", path.display().to_string(), e))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let mime = match ext.as_deref() {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("ogg") => "audio/ogg",
            Some("m4a") => "audio/mp4",
            _ => "audio/webm",
        };
        Ok(Self::new(bytes, mime))
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, clip: &AudioClip) -> StudioResult<String>;
}

/// Microphone permission as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicPermission {
    Granted,
    Denied,
    Prompt,
    Unknown,
}

impl FromStr for MicPermission {
    type Err = Infallible;

    /// Never fails: anything unrecognized is `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "granted" => MicPermission::Granted,
            "denied" => MicPermission::Denied,
            "prompt" => MicPermission::Prompt,
            _ => MicPermission::Unknown,
        })
    }
}

impl fmt::Display for MicPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MicPermission::Granted => "granted",
            MicPermission::Denied => "denied",
            MicPermission::Prompt => "prompt",
            MicPermission::Unknown => "unknown",
        })
    }
}
