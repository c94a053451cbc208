//! Controller that owns the current [`CatalogState`] and mirrors user products
//! into the tiered store.

use std::collections::HashSet;
use std::fmt;

use tracing::{error, info, warn};

use super::CatalogState;
use crate::catalog::{Category, Product, builtin_products};
use crate::error::{StudioError, StudioResult};
use crate::storage::{TierKind, TierResult, TieredStore};

/// What the user should be told after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistNotice {
    /// Stored in the structured tier. Nothing to show.
    Durable,
    /// Stored only in a fallback tier. Show a non-blocking warning.
    Degraded { tier: TierKind },
    /// Stored nowhere. Show a blocking alert.
    Lost,
}

impl PersistNotice {
    pub fn from_result(result: TierResult) -> Self {
        match result {
            TierResult::Structured => PersistNotice::Durable,
            TierResult::Local => PersistNotice::Degraded {
                tier: TierKind::Local,
            },
            TierResult::Session => PersistNotice::Degraded {
                tier: TierKind::Session,
            },
            TierResult::None => PersistNotice::Lost,
        }
    }

    /// Requires acknowledgement before the user continues.
    pub fn is_blocking(self) -> bool {
        self == PersistNotice::Lost
    }

    /// Text for the warning or alert, if one should be shown.
    pub fn message(self) -> Option<String> {
        match self {
            PersistNotice::Durable => None,
            PersistNotice::Degraded { tier: TierKind::Session } => Some(
                "Saved for this session only. Your products will be gone when the studio closes."
                    .to_string(),
            ),
            PersistNotice::Degraded { tier } => Some(format!(
                "Saved to {} storage. Space is limited, so large images may not fit next time.",
                tier
            )),
            PersistNotice::Lost => Some(
                "Could not save your products anywhere. They will be lost when the studio closes."
                    .to_string(),
            ),
        }
    }
}

impl fmt::Display for PersistNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(m) => f.write_str(&m),
            None => f.write_str("Saved."),
        }
    }
}

/// A product as submitted by the add-product flow, before it has an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: Category,
    pub price: String,
    pub image_src: String,
}

impl NewProduct {
    fn validate(&self) -> StudioResult<()> {
        if self.name.trim().is_empty() {
            return Err(StudioError::validation("name", "must not be empty", &self.name));
        }
        if self.price.trim().is_empty() {
            return Err(StudioError::validation("price", "must not be empty", &self.price));
        }
        if !self.category.is_storable() {
            return Err(StudioError::validation(
                "category",
                "must be a concrete category",
                self.category.id(),
            ));
        }
        if self.image_src.trim().is_empty() {
            return Err(StudioError::validation("image_src", "must not be empty", ""));
        }
        Ok(())
    }
}

/// A freshly created product and how its persistence went.
#[derive(Debug, Clone)]
pub struct Created {
    pub product: Product,
    pub notice: PersistNotice,
}

/// Owns the catalog snapshot and the storage chain.
pub struct CatalogStore {
    state: CatalogState,
    storage: TieredStore,
}

impl CatalogStore {
    pub fn builder() -> CatalogStoreBuilder {
        CatalogStoreBuilder::new()
    }

    /// The current snapshot.
    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn storage(&self) -> &TieredStore {
        &self.storage
    }

    /// Load user products once at startup. Returns how many were found; an empty
    /// or unreadable store yields 0 and an empty collection.
    ///
    /// A stored collection reusing a built-in ID is malformed and skipped.
    pub async fn load(&mut self) -> usize {
        let builtin_ids: HashSet<u32> = self.state.builtins().iter().map(|p| p.id).collect();
        let products = self
            .storage
            .load_products_where(|products| {
                let clash = products.iter().find(|p| builtin_ids.contains(&p.id));
                if let Some(p) = clash {
                    warn!(id = p.id, name = %p.name, "stored product reuses a built-in ID, skipping collection");
                }
                clash.is_none()
            })
            .await
            .unwrap_or_default();
        let count = products.len();
        self.transition(|s| s.with_user_products(products));
        count
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.transition(|s| s.with_search_term(term));
    }

    pub fn set_category(&mut self, category: Category) {
        self.transition(|s| s.with_category(category));
    }

    /// Assign the next ID, append, and persist the user collection.
    ///
    /// The product stays in memory even when persistence fails; the notice says so.
    pub async fn create_product(&mut self, new: NewProduct) -> StudioResult<Created> {
        new.validate()?;
        let id = self.state.next_id().ok_or_else(|| {
            StudioError::validation("id", "ID space exhausted", u32::MAX.to_string())
        })?;
        let product = Product {
            id,
            name: new.name.trim().to_string(),
            category: new.category,
            price: new.price.trim().to_string(),
            image_src: new.image_src,
        };
        info!(id = product.id, name = %product.name, "created product");

        let appended = product.clone();
        self.transition(|s| s.with_product(appended));
        let notice = self.persist().await;
        Ok(Created { product, notice })
    }

    /// Mirror the current user collection into storage.
    pub async fn persist(&self) -> PersistNotice {
        let result = self.storage.save_products(self.state.user_products()).await;
        let notice = PersistNotice::from_result(result);
        match notice {
            PersistNotice::Durable => {}
            PersistNotice::Degraded { tier } => warn!(%tier, "user products saved with reduced durability"),
            PersistNotice::Lost => error!("user products were not saved to any tier"),
        }
        notice
    }

    fn transition(&mut self, f: impl FnOnce(CatalogState) -> CatalogState) {
        // Snapshots share their product lists, so the clone is shallow.
        self.state = f(self.state.clone());
    }
}

/// Builder for [`CatalogStore`].
pub struct CatalogStoreBuilder {
    builtins: Option<Vec<Product>>,
    storage: Option<TieredStore>,
}

impl Default for CatalogStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStoreBuilder {
    pub fn new() -> Self {
        Self {
            builtins: None,
            storage: None,
        }
    }

    /// Replace the built-in catalog (defaults to the shipped products).
    pub fn with_builtins(mut self, builtins: Vec<Product>) -> Self {
        self.builtins = Some(builtins);
        self
    }

    pub fn with_storage(mut self, storage: TieredStore) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Without storage the store still works, but every save reports `Lost`.
    pub fn build(self) -> CatalogStore {
        let builtins = self
            .builtins
            .unwrap_or_else(|| builtin_products().to_vec());
        CatalogStore {
            state: CatalogState::new(builtins),
            storage: self.storage.unwrap_or_default(),
        }
    }
}
