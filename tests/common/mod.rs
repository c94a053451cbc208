//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::Value;

use try_on_studio::storage::{LocalStringStore, SessionStringStore, StructuredStore};
use try_on_studio::{
    Category, ImagePayload, Product, StorageTier, StudioError, StudioResult, TierKind,
    TieredStore,
};

/// A gradient PNG of the given size, base64 encoded.
pub fn png_payload(width: u32, height: u32) -> ImagePayload {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode test png");
    ImagePayload::from_bytes(&bytes, "image/png")
}

/// Width and height of an encoded payload.
pub fn dimensions(payload: &ImagePayload) -> (u32, u32) {
    let bytes = payload.decode_bytes().expect("valid base64");
    let img = image::load_from_memory(&bytes).expect("decodable image");
    (img.width(), img.height())
}

pub fn product(id: u32, name: &str, category: Category) -> Product {
    Product {
        id,
        name: name.to_string(),
        category,
        price: "$10.00".to_string(),
        image_src: format!("/assets/{}.jpg", name.to_lowercase().replace(' ', "-")),
    }
}

/// A tier whose reads and writes always fail.
pub struct FailingTier(pub TierKind);

#[async_trait]
impl StorageTier for FailingTier {
    fn kind(&self) -> TierKind {
        self.0
    }

    async fn get(&self, _key: &str) -> StudioResult<Option<Value>> {
        Err(StudioError::storage(self.0, "get", "simulated failure"))
    }

    async fn set(&self, _key: &str, _value: &Value) -> StudioResult<()> {
        Err(StudioError::storage(self.0, "set", "simulated failure"))
    }
}

/// A tier that holds a fixed value for every key and refuses writes.
pub struct FixedTier {
    pub kind: TierKind,
    pub value: Value,
}

#[async_trait]
impl StorageTier for FixedTier {
    fn kind(&self) -> TierKind {
        self.kind
    }

    async fn get(&self, _key: &str) -> StudioResult<Option<Value>> {
        Ok(Some(self.value.clone()))
    }

    async fn set(&self, _key: &str, _value: &Value) -> StudioResult<()> {
        Err(StudioError::storage(self.kind, "set", "read-only"))
    }
}

/// The standard chain under `dir`, with the given string-tier quotas.
pub fn chain_in(dir: &std::path::Path, local_quota: usize, session_quota: usize) -> TieredStore {
    TieredStore::new()
        .with_tier(StructuredStore::new(dir.join("structured")))
        .with_tier(LocalStringStore::new(dir.join("local.json"), local_quota))
        .with_tier(SessionStringStore::new(session_quota))
}
