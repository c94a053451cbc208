//! # Try-On Studio
//!
//! Core of a virtual fitting-room: a product catalog with user-created products,
//! AI-assisted try-on and product generation, and best-effort persistence of user
//! products across a chain of storage tiers.
//!
//! ## Architecture
//!
//! - `catalog`: built-in products and the category taxonomy
//! - `state`: immutable catalog snapshots and the controller that persists them
//! - `storage`: tiered key/value persistence (structured, local, session)
//! - `processing`: image payloads and the JPEG compression step
//! - `remote`: traits and HTTP clients for image editing, generation and transcription
//! - `workflow`: the try-on session and the add-product draft
//! - `config`: runtime configuration from the environment
//! - `error`: the studio error type
//!
//! ## Example
//!
//! ```rust,no_run
//! use try_on_studio::{CatalogStore, StudioConfig, TieredStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StudioConfig::from_env();
//! let mut store = CatalogStore::builder()
//!     .with_storage(TieredStore::from_config(&config))
//!     .build();
//! let loaded = store.load().await;
//! println!("{} user products, {} visible", loaded, store.state().visible_products().len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod processing;
pub mod remote;
pub mod state;
pub mod storage;
pub mod workflow;

pub use catalog::{CATEGORIES, Category, Product};
pub use config::StudioConfig;
pub use error::{
    ErrorSeverity, HasRecoverySuggestion, HasSeverity, Retryable, StudioError, StudioResult,
};
pub use processing::{ImagePayload, compress};
pub use state::{CatalogState, CatalogStore, NewProduct, PersistNotice};
pub use storage::{StorageTier, TierKind, TierResult, TieredStore};
pub use workflow::{AddProductDraft, Completion, TryOnSession};
