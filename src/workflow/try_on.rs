//! Virtual try-on session for one product.

use tracing::{debug, info, warn};

use super::{Completion, no_image};
use crate::catalog::Product;
use crate::error::{StudioError, StudioResult};
use crate::processing::ImagePayload;
use crate::remote::gemini::try_on_instruction;
use crate::remote::{EditRequest, ImageEditor, RequestToken, RequestTracker};

const SERVICE: &str = "try-on";

/// `tryon_<product name>.png`, with each run of whitespace replaced by `_`.
pub fn download_file_name(product_name: &str) -> String {
    let mut name = String::with_capacity(product_name.len());
    let mut in_space = false;
    for c in product_name.chars() {
        if c.is_whitespace() {
            if !in_space {
                name.push('_');
            }
            in_space = true;
        } else {
            name.push(c);
            in_space = false;
        }
    }
    format!("tryon_{}.png", name)
}

fn composite_instruction(product_name: &str, references: usize) -> String {
    format!(
        "{} Also dress the person in the item{} shown in the additional image{}, keeping every \
         garment consistent with its reference.",
        try_on_instruction(product_name),
        if references == 1 { "" } else { "s" },
        if references == 1 { "" } else { "s" },
    )
}

/// Holds the inputs and latest result of try-on edits for a single product.
///
/// The edit base is the staged image when "style further" is active, otherwise
/// the user's photo.
pub struct TryOnSession {
    product: Product,
    user_photo: Option<ImagePayload>,
    staged_base: Option<ImagePayload>,
    references: Vec<ImagePayload>,
    result: Option<ImagePayload>,
    tracker: RequestTracker,
    in_flight: Option<RequestToken>,
}

impl TryOnSession {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            user_photo: None,
            staged_base: None,
            references: Vec::new(),
            result: None,
            tracker: RequestTracker::new(),
            in_flight: None,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn user_photo(&self) -> Option<&ImagePayload> {
        self.user_photo.as_ref()
    }

    pub fn result(&self) -> Option<&ImagePayload> {
        self.result.as_ref()
    }

    pub fn is_styling_further(&self) -> bool {
        self.staged_base.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replace the photo. Clears the result and staged base and supersedes any
    /// request still running.
    pub fn set_photo(&mut self, photo: ImagePayload) {
        self.tracker.invalidate();
        self.in_flight = None;
        self.user_photo = Some(photo);
        self.staged_base = None;
        self.result = None;
    }

    /// Add an extra garment image for a composite edit.
    pub fn add_reference(&mut self, image: ImagePayload) {
        self.references.push(image);
    }

    pub fn clear_references(&mut self) {
        self.references.clear();
    }

    /// Use the current result as the base of the next edit.
    pub fn style_further(&mut self) -> StudioResult<()> {
        let result = self
            .result
            .clone()
            .ok_or_else(|| StudioError::validation("result", "generate a try-on first", ""))?;
        debug!(product = self.product.id, "staging result for further styling");
        self.staged_base = Some(result);
        Ok(())
    }

    /// Leave "style further" mode and edit the original photo again.
    pub fn reset_base(&mut self) {
        self.staged_base = None;
    }

    /// Start a request: validate inputs and build the edit.
    pub fn begin(&mut self) -> StudioResult<(RequestToken, EditRequest)> {
        let base = self
            .staged_base
            .as_ref()
            .or(self.user_photo.as_ref())
            .cloned()
            .ok_or_else(|| {
                StudioError::validation("photo", "Please upload an image first.", "")
            })?;

        let instruction = if self.references.is_empty() {
            try_on_instruction(&self.product.name)
        } else {
            composite_instruction(&self.product.name, self.references.len())
        };
        let token = self.tracker.begin();
        self.in_flight = Some(token);
        Ok((
            token,
            EditRequest {
                base,
                references: self.references.clone(),
                instruction,
            },
        ))
    }

    /// Finish the request identified by `token`.
    ///
    /// Superseded requests are discarded whatever their outcome. A current request
    /// with no image is an error, the same as a failed call.
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: StudioResult<Option<ImagePayload>>,
    ) -> StudioResult<Completion> {
        let Some(outcome) = self.tracker.accept(token, outcome) else {
            return Ok(Completion::Discarded);
        };
        self.in_flight = None;
        match outcome {
            Ok(Some(image)) => {
                info!(product = self.product.id, "try-on image ready");
                self.result = Some(image);
                Ok(Completion::Applied)
            }
            Ok(None) => {
                warn!(product = self.product.id, "editor returned no image");
                Err(no_image(SERVICE))
            }
            Err(e) => {
                warn!(product = self.product.id, error = %e, "try-on failed");
                Err(e)
            }
        }
    }

    /// Run one edit with `editor`.
    pub async fn generate(&mut self, editor: &dyn ImageEditor) -> StudioResult<Completion> {
        let (token, request) = self.begin()?;
        let outcome = editor.edit(&request).await;
        self.complete(token, outcome)
    }

    pub fn download_file_name(&self) -> String {
        download_file_name(&self.product.name)
    }
}
