//! # Workflows
//!
//! Front-end independent logic behind the two interactive flows: trying a product
//! on a photo ([`TryOnSession`]) and creating a product from a prompt
//! ([`AddProductDraft`]). Both talk to remote collaborators through the traits in
//! [`crate::remote`] and use a [`RequestTracker`](crate::remote::RequestTracker)
//! so a slow response never overwrites a newer one.

mod add_product;
mod try_on;

pub use add_product::{AddProductDraft, DEFAULT_DRAFT_PRICE, NAME_FROM_PROMPT_CHARS};
pub use try_on::{TryOnSession, download_file_name};

use crate::error::StudioError;

/// What happened to a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was stored.
    Applied,
    /// A newer request started in the meantime; the result was dropped.
    Discarded,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        self == Completion::Applied
    }
}

/// Error for a remote call that answered without an image.
pub(crate) fn no_image(service: &str) -> StudioError {
    StudioError::remote(service, "no image was returned")
        .with_recovery_suggestion("Try again, or adjust the photo or prompt")
}
