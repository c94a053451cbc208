//! Base64 image payloads and `data:` URIs.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::error::{StudioError, StudioResult};

/// An encoded image as exchanged with remote services and stored on products:
/// base64 bytes plus a media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub data: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encode raw bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self::new(general_purpose::STANDARD.encode(bytes), mime_type)
    }

    /// Decode the base64 body.
    pub fn decode_bytes(&self) -> StudioResult<Vec<u8>> {
        Ok(general_purpose::STANDARD.decode(self.data.trim())?)
    }

    /// Approximate decoded size in bytes.
    pub fn decoded_len(&self) -> usize {
        self.data.len() / 4 * 3
    }

    /// `data:<mime>;base64,<data>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a base64 `data:` URI.
    pub fn from_data_uri(uri: &str) -> StudioResult<Self> {
        let invalid = |why: &str| StudioError::validation("data_uri", why, truncate(uri, 48));
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| invalid("must start with data:"))?;
        let (mime, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("must be base64 encoded"))?;
        if mime.is_empty() {
            return Err(invalid("missing media type"));
        }
        Ok(Self::new(data, mime))
    }

    /// Read an image file, guessing the media type from its contents.
    pub async fn from_file(path: impl AsRef<Path>) -> StudioResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StudioError::io_at("read image", path.display().to_string(), e))?;
        let mime = image::guess_format(&bytes)
            .map(|f| f.to_mime_type())
            .unwrap_or("application/octet-stream");
        Ok(Self::from_bytes(&bytes, mime))
    }

    /// Write the decoded bytes to `path`.
    pub async fn write_to_file(&self, path: impl AsRef<Path>) -> StudioResult<()> {
        let path = path.as_ref();
        let bytes = self.decode_bytes()?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|e| StudioError::io_at("write image", path.display().to_string(), e))
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
