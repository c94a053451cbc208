//! Dictation: record a clip from an audio source and transcribe it.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{AudioClip, MicPermission, Transcriber};
use crate::error::{ErrorSeverity, StudioError, StudioResult};

/// Anything that can record a clip, such as a microphone or a file on disk.
#[async_trait]
pub trait AudioSource: Send {
    async fn permission(&self) -> MicPermission;
    async fn start(&mut self) -> StudioResult<()>;
    async fn stop(&mut self) -> StudioResult<AudioClip>;
    /// Release the device. Called on every exit path.
    async fn release(&mut self);
}

/// Guidance for each permission state, if the user needs to act.
pub fn permission_guidance(permission: MicPermission) -> Option<&'static str> {
    match permission {
        MicPermission::Granted => None,
        MicPermission::Denied => Some(
            "Microphone access is blocked. Allow it in your browser or system settings and try again.",
        ),
        MicPermission::Prompt => Some("You will be asked for microphone access when dictation starts."),
        MicPermission::Unknown => Some("Microphone permission could not be determined."),
    }
}

/// Record one clip from `source` and transcribe it.
///
/// A denied permission fails before recording starts. The source is released
/// whether or not recording and transcription succeed.
pub async fn dictate(
    source: &mut dyn AudioSource,
    transcriber: &dyn Transcriber,
) -> StudioResult<String> {
    let permission = source.permission().await;
    if permission == MicPermission::Denied {
        let mut err = StudioError::validation("microphone", "permission denied", permission.to_string())
            .with_severity(ErrorSeverity::Warning);
        if let Some(hint) = permission_guidance(permission) {
            err = err.with_recovery_suggestion(hint);
        }
        return Err(err);
    }

    let recorded = record(source).await;
    source.release().await;
    let clip = recorded?;

    debug!(bytes = clip.bytes.len(), "transcribing dictation");
    let text = transcriber.transcribe(&clip).await.inspect_err(|e| {
        warn!(error = %e, "transcription failed");
    })?;
    Ok(text.trim().to_string())
}

async fn record(source: &mut dyn AudioSource) -> StudioResult<AudioClip> {
    source.start().await?;
    source.stop().await
}

/// Plays back a recorded file as if it came from a microphone.
pub struct FileAudioSource {
    path: PathBuf,
    clip: Option<AudioClip>,
}

impl FileAudioSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clip: None,
        }
    }
}

#[async_trait]
impl AudioSource for FileAudioSource {
    async fn permission(&self) -> MicPermission {
        MicPermission::Granted
    }

    async fn start(&mut self) -> StudioResult<()> {
        self.clip = Some(AudioClip::from_file(&self.path).await?);
        Ok(())
    }

    async fn stop(&mut self) -> StudioResult<AudioClip> {
        self.clip
            .take()
            .ok_or_else(|| StudioError::validation("recording", "stop called before start", ""))
    }

    async fn release(&mut self) {
        self.clip = None;
    }
}
