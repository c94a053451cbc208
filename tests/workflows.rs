//! Try-on and add-product flows against in-process collaborators.

mod common;

use std::sync::Mutex;

use async_trait::async_trait;
use common::{dimensions, png_payload, product};
use tempfile::TempDir;

use try_on_studio::remote::{EditRequest, ImageEditor, ImageGenerator};
use try_on_studio::storage::{DEFAULT_QUOTA_BYTES, SessionStringStore};
use try_on_studio::{
    AddProductDraft, CatalogStore, Category, Completion, ImagePayload, PersistNotice,
    StudioError, StudioResult, TierKind, TieredStore, TryOnSession,
};

/// Answers every edit with a fixed image and records what it was asked.
struct RecordingEditor {
    answer: Option<ImagePayload>,
    seen: Mutex<Vec<EditRequest>>,
}

impl RecordingEditor {
    fn answering(answer: Option<ImagePayload>) -> Self {
        Self {
            answer,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ImageEditor for RecordingEditor {
    async fn edit(&self, request: &EditRequest) -> StudioResult<Option<ImagePayload>> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(self.answer.clone())
    }
}

struct BrokenEditor;

#[async_trait]
impl ImageEditor for BrokenEditor {
    async fn edit(&self, _request: &EditRequest) -> StudioResult<Option<ImagePayload>> {
        Err(StudioError::remote("editor", "503 Service Unavailable"))
    }
}

struct FixedGenerator(ImagePayload);

#[async_trait]
impl ImageGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str) -> StudioResult<Option<ImagePayload>> {
        Ok(Some(self.0.clone()))
    }
}

fn session() -> TryOnSession {
    TryOnSession::new(product(3, "Classic Denim Jacket", Category::Outerwear))
}

#[tokio::test]
async fn test_try_on_stores_result() {
    let editor = RecordingEditor::answering(Some(ImagePayload::new("RESULT", "image/png")));
    let mut s = session();
    s.set_photo(ImagePayload::new("PHOTO", "image/jpeg"));

    assert_eq!(s.generate(&editor).await.unwrap(), Completion::Applied);
    assert_eq!(s.result().unwrap().data, "RESULT");
    assert_eq!(s.download_file_name(), "tryon_Classic_Denim_Jacket.png");

    let seen = editor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].base.data, "PHOTO");
    assert!(seen[0].instruction.contains("Classic Denim Jacket"));
}

#[tokio::test]
async fn test_style_further_chains_edits() {
    let editor = RecordingEditor::answering(Some(ImagePayload::new("STYLED", "image/png")));
    let mut s = session();
    s.set_photo(ImagePayload::new("PHOTO", "image/jpeg"));
    s.generate(&editor).await.unwrap();
    s.style_further().unwrap();
    s.add_reference(ImagePayload::new("HAT", "image/png"));
    s.generate(&editor).await.unwrap();

    let seen = editor.seen.lock().unwrap();
    assert_eq!(seen[1].base.data, "STYLED");
    assert!(seen[1].is_composite());
}

#[tokio::test]
async fn test_no_image_and_error_are_both_failures() {
    let mut s = session();
    s.set_photo(ImagePayload::new("PHOTO", "image/jpeg"));
    assert!(s.generate(&RecordingEditor::answering(None)).await.is_err());
    assert!(s.generate(&BrokenEditor).await.is_err());
    assert!(s.result().is_none());
    assert!(!s.is_loading());
}

#[tokio::test]
async fn test_superseded_try_on_is_discarded() {
    let mut s = session();
    s.set_photo(ImagePayload::new("PHOTO", "image/jpeg"));
    let (stale, _) = s.begin().unwrap();
    let (current, request) = s.begin().unwrap();

    let editor = RecordingEditor::answering(Some(ImagePayload::new("LATEST", "image/png")));
    let latest = editor.edit(&request).await;
    assert_eq!(s.complete(current, latest).unwrap(), Completion::Applied);

    let late = Ok(Some(ImagePayload::new("OLD", "image/png")));
    assert_eq!(s.complete(stale, late).unwrap(), Completion::Discarded);
    assert_eq!(s.result().unwrap().data, "LATEST");
}

#[tokio::test]
async fn test_generated_product_is_compressed_and_saved() {
    let generator = FixedGenerator(png_payload(400, 200));
    let mut draft = AddProductDraft::new();
    draft.prompt = "oversized striped linen shirt, studio lighting".into();
    draft.price = "$39.00".into();

    let done = draft.generate(&generator, 100, 0.85).await.unwrap();
    assert_eq!(done, Completion::Applied);
    let preview = draft.preview().unwrap();
    assert_eq!(preview.mime_type, "image/jpeg");
    assert_eq!(dimensions(preview), (100, 50));
    assert_eq!(draft.name, "oversized striped linen shirt, studio li");
    assert!(draft.can_save());

    let storage = TieredStore::new().with_tier(SessionStringStore::new(DEFAULT_QUOTA_BYTES));
    let mut store = CatalogStore::builder().with_storage(storage).build();
    let created = store
        .create_product(draft.to_new_product().unwrap())
        .await
        .unwrap();
    assert_eq!(created.product.id, 41);
    assert_eq!(created.product.category, Category::Shirts);
    assert!(created.product.has_embedded_image());
    assert_eq!(created.notice, PersistNotice::Degraded { tier: TierKind::Session });
}

#[tokio::test]
async fn test_imported_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shoe.png");
    png_payload(30, 60).write_to_file(&path).await.unwrap();

    let loaded = ImagePayload::from_file(&path).await.unwrap();
    assert_eq!(loaded.mime_type, "image/png");

    let mut draft = AddProductDraft::new();
    draft.name = "Trail Runner".into();
    draft.category = Category::Shoes;
    draft.set_preview(try_on_studio::compress(&loaded, 1024, 0.85));
    let new = draft.to_new_product().unwrap();
    let payload = ImagePayload::from_data_uri(&new.image_src).unwrap();
    assert_eq!(dimensions(&payload), (30, 60));
}
