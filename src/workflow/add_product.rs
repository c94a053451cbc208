//! Draft of a user product, generated from a text prompt or imported from a file.

use tracing::{debug, info, warn};

use super::{Completion, no_image};
use crate::catalog::Category;
use crate::error::{StudioError, StudioResult};
use crate::processing::{ImagePayload, compress};
use crate::remote::{ImageGenerator, RequestToken, RequestTracker};
use crate::state::NewProduct;

pub const DEFAULT_DRAFT_PRICE: &str = "$0.00";
/// Length of the name derived from the prompt when none was entered.
pub const NAME_FROM_PROMPT_CHARS: usize = 40;

#[derive(Debug)]
pub struct AddProductDraft {
    pub prompt: String,
    pub name: String,
    pub category: Category,
    pub price: String,
    preview: Option<ImagePayload>,
    tracker: RequestTracker,
}

impl Default for AddProductDraft {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            name: String::new(),
            category: Category::Shirts,
            price: DEFAULT_DRAFT_PRICE.to_string(),
            preview: None,
            tracker: RequestTracker::new(),
        }
    }
}

impl AddProductDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&ImagePayload> {
        self.preview.as_ref()
    }

    /// Use an already-compressed image as the preview, superseding any generation.
    pub fn set_preview(&mut self, image: ImagePayload) {
        self.tracker.invalidate();
        self.preview = Some(image);
    }

    pub fn begin(&self) -> StudioResult<(RequestToken, String)> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::validation("prompt", "Please enter a prompt.", ""));
        }
        Ok((self.tracker.begin(), prompt.to_string()))
    }

    /// Apply a finished generation. The image is compressed before it becomes the
    /// preview, and an empty name is filled from the prompt.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: StudioResult<Option<ImagePayload>>,
        max_dimension: u32,
        quality: f32,
    ) -> StudioResult<Completion> {
        let Some(outcome) = self.tracker.accept(token, outcome) else {
            return Ok(Completion::Discarded);
        };
        let image = match outcome {
            Ok(Some(image)) => image,
            Ok(None) => {
                warn!("generator returned no image");
                return Err(no_image("product generator"));
            }
            Err(e) => {
                warn!(error = %e, "product generation failed");
                return Err(e);
            }
        };

        let before = image.data.len();
        let compressed = compress(&image, max_dimension, quality);
        debug!(before, after = compressed.data.len(), "compressed generated image");
        self.preview = Some(compressed);

        if self.name.trim().is_empty() {
            self.name = self.prompt.trim().chars().take(NAME_FROM_PROMPT_CHARS).collect();
        }
        info!(name = %self.name, "product preview ready");
        Ok(Completion::Applied)
    }

    pub async fn generate(
        &mut self,
        generator: &dyn ImageGenerator,
        max_dimension: u32,
        quality: f32,
    ) -> StudioResult<Completion> {
        let (token, prompt) = self.begin()?;
        let outcome = generator.generate(&prompt).await;
        self.complete(token, outcome, max_dimension, quality)
    }

    pub fn can_save(&self) -> bool {
        self.preview.is_some() && !self.name.trim().is_empty() && !self.price.trim().is_empty()
    }

    /// The product to hand to the catalog, with the preview as a `data:` URI.
    pub fn to_new_product(&self) -> StudioResult<NewProduct> {
        let preview = self
            .preview
            .as_ref()
            .ok_or_else(|| StudioError::validation("preview", "generate an image first", ""))?;
        if !self.can_save() {
            return Err(StudioError::validation(
                "product",
                "name and price are required",
                format!("{:?} / {:?}", self.name, self.price),
            ));
        }
        Ok(NewProduct {
            name: self.name.trim().to_string(),
            category: self.category,
            price: self.price.trim().to_string(),
            image_src: preview.to_data_uri(),
        })
    }

    /// Back to an empty draft.
    pub fn reset(&mut self) {
        self.tracker.invalidate();
        *self = Self {
            tracker: std::mem::take(&mut self.tracker),
            ..Self::default()
        };
    }
}
