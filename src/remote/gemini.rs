//! Gemini image client (`generateContent` over REST).
//!
//! Requests carry images as inline base64 parts followed by one text part, and ask
//! for image and text modalities. The first inline image in the first candidate is
//! the result; a response without one is `Ok(None)`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EditRequest, ImageEditor, ImageGenerator};
use crate::config::StudioConfig;
use crate::config::config::GEMINI_KEY_ENV;
use crate::error::{StudioError, StudioResult};
use crate::processing::ImagePayload;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";
const SERVICE: &str = "Gemini";

/// Instruction used for a single-garment try-on.
pub fn try_on_instruction(product_name: &str) -> String {
    format!(
        "Realistically edit the image to make the person wear a {}. Keep the person's face, \
         body shape, skin tone, hairstyle, and background unchanged. Blend the item naturally \
         with proper lighting, shadows, and proportions. Do not distort or alter unrelated parts \
         of the photo.",
        product_name
    )
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> StudioResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn from_config(config: &StudioConfig) -> StudioResult<Self> {
        Self::new(
            config.gemini_api_key.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate_content(
        &self,
        body: &GenerateRequest<'_>,
        fallback_mime: Option<&str>,
    ) -> StudioResult<Option<ImagePayload>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| StudioError::missing_credentials(SERVICE, GEMINI_KEY_ENV))?;
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, parts = body.contents.first().map(|c| c.parts.len()).unwrap_or(0), "calling Gemini");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StudioError::remote(SERVICE, format!("{} {}", status, text.trim())));
        }

        let parsed: GenerateResponse = resp.json().await?;
        let image = extract_image(parsed, fallback_mime);
        if image.is_none() {
            warn!("Gemini returned no inline image part");
        }
        Ok(image)
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn edit(&self, request: &EditRequest) -> StudioResult<Option<ImagePayload>> {
        let mut parts = Vec::with_capacity(request.references.len() + 2);
        parts.push(Part::inline(&request.base));
        parts.extend(request.references.iter().map(Part::inline));
        parts.push(Part::Text {
            text: &request.instruction,
        });
        let body = GenerateRequest::new(parts);
        self.generate_content(&body, Some(&request.base.mime_type)).await
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> StudioResult<Option<ImagePayload>> {
        let body = GenerateRequest::new(vec![Part::Text { text: prompt }]);
        self.generate_content(&body, None).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateRequest<'a> {
    fn new(parts: Vec<Part<'a>>) -> Self {
        Self {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataRef<'a>,
    },
    Text {
        text: &'a str,
    },
}

impl<'a> Part<'a> {
    fn inline(image: &'a ImagePayload) -> Self {
        Part::Inline {
            inline_data: InlineDataRef {
                mime_type: &image.mime_type,
                data: &image.data,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataRef<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// First inline image of the first candidate. The media type falls back to the
/// request's, then to `image/png`.
fn extract_image(response: GenerateResponse, fallback_mime: Option<&str>) -> Option<ImagePayload> {
    let candidate = response.candidates.into_iter().next()?;
    candidate
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.inline_data)
        .find_map(|inline| {
            let data = inline.data.filter(|d| !d.is_empty())?;
            let mime = inline
                .mime_type
                .filter(|m| !m.is_empty())
                .or_else(|| fallback_mime.map(str::to_string))
                .unwrap_or_else(|| "image/png".to_string());
            Some(ImagePayload::new(data, mime))
        })
}
