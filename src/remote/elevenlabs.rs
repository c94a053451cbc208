//! ElevenLabs speech-to-text client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::{AudioClip, Transcriber};
use crate::config::StudioConfig;
use crate::config::config::ELEVENLABS_KEY_ENV;
use crate::error::{StudioError, StudioResult};

pub const DEFAULT_ENDPOINT: &str = "https://api.elevenlabs.io/v1/speech-to-text";
pub const DEFAULT_MODEL_ID: &str = "scribe_v1";
const SERVICE: &str = "ElevenLabs";
const UPLOAD_FILE_NAME: &str = "audio.webm";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: Option<String>,
}

pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> StudioResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn from_config(config: &StudioConfig) -> StudioResult<Self> {
        Self::new(
            config.elevenlabs_api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Transcriber for ElevenLabsClient {
    async fn transcribe(&self, clip: &AudioClip) -> StudioResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudioError::missing_credentials(SERVICE, ELEVENLABS_KEY_ENV))?;
        if clip.bytes.is_empty() {
            return Err(StudioError::validation("audio", "must not be empty", ""));
        }

        let file = Part::bytes(clip.bytes.clone())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(&clip.mime_type)?;
        let form = Form::new()
            .part("file", file)
            .text("model_id", DEFAULT_MODEL_ID);

        debug!(bytes = clip.bytes.len(), mime = %clip.mime_type, "uploading audio for transcription");
        let resp = self
            .http
            .post(&self.endpoint)
            .header("xi-api-key", api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StudioError::remote(SERVICE, format!("{} {}", status, body.trim())));
        }

        let parsed: TranscriptionResponse = resp.json().await?;
        Ok(parsed.text.unwrap_or_default())
    }
}
