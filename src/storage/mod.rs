//! # Tiered Storage
//!
//! User-created products are mirrored into an ordered chain of storage tiers,
//! most durable first:
//!
//! 1. [`StructuredStore`]: JSON documents on disk, written atomically
//! 2. [`LocalStringStore`]: a quota-limited string map persisted to one file
//! 3. [`SessionStringStore`]: a quota-limited string map that lives as long as the process
//!
//! Reads walk the chain and return the first well-formed value. Writes walk the
//! chain and stop at the first tier that accepts the value; [`TierResult`] reports
//! which one did, or `None` when nothing did. Every tier gets exactly one attempt.
//!
//! There is no locking across processes. Two writers racing on the same key end
//! with whichever write landed last.

mod string_store;
mod structured;

pub use string_store::{DEFAULT_QUOTA_BYTES, LocalStringStore, SessionStringStore};
pub use structured::StructuredStore;

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::catalog::Product;
use crate::config::StudioConfig;
use crate::error::StudioResult;

/// Key under which the user-product collection is stored in every tier.
pub const USER_PRODUCTS_KEY: &str = "userProducts";

/// Identifies one tier in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierKind {
    Structured,
    Local,
    Session,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TierKind::Structured => "structured",
            TierKind::Local => "local",
            TierKind::Session => "session",
        })
    }
}

/// Outcome of a save across the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierResult {
    Structured,
    Local,
    Session,
    None,
}

impl TierResult {
    pub fn from_kind(kind: TierKind) -> Self {
        match kind {
            TierKind::Structured => TierResult::Structured,
            TierKind::Local => TierResult::Local,
            TierKind::Session => TierResult::Session,
        }
    }

    /// The tier that accepted the write, if any.
    pub fn tier(self) -> Option<TierKind> {
        match self {
            TierResult::Structured => Some(TierKind::Structured),
            TierResult::Local => Some(TierKind::Local),
            TierResult::Session => Some(TierKind::Session),
            TierResult::None => None,
        }
    }

    /// Landed in the structured tier.
    pub fn is_durable(self) -> bool {
        self == TierResult::Structured
    }

    /// Landed somewhere, but not in the structured tier.
    pub fn is_degraded(self) -> bool {
        matches!(self, TierResult::Local | TierResult::Session)
    }
}

impl fmt::Display for TierResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tier() {
            Some(kind) => kind.fmt(f),
            None => f.write_str("none"),
        }
    }
}

/// One backend in the chain.
///
/// `get` returns `Ok(None)` when the key is absent. Errors from either method are
/// never surfaced past [`TieredStore`]; they only decide whether the chain moves on.
#[async_trait]
pub trait StorageTier: Send + Sync {
    fn kind(&self) -> TierKind;

    async fn get(&self, key: &str) -> StudioResult<Option<Value>>;

    async fn set(&self, key: &str, value: &Value) -> StudioResult<()>;
}

/// Chain of responsibility over [`StorageTier`]s, tried in insertion order.
pub struct TieredStore {
    tiers: Vec<Box<dyn StorageTier>>,
}

impl Default for TieredStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TieredStore {
    /// An empty chain. Every save reports [`TierResult::None`].
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier at the lowest priority.
    pub fn with_tier(mut self, tier: impl StorageTier + 'static) -> Self {
        self.tiers.push(Box::new(tier));
        self
    }

    /// Append an already boxed tier.
    pub fn with_boxed_tier(mut self, tier: Box<dyn StorageTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    /// The standard three-tier chain rooted at `config.data_dir`.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new()
            .with_tier(StructuredStore::new(config.structured_dir()))
            .with_tier(LocalStringStore::new(
                config.local_store_path(),
                config.local_quota_bytes,
            ))
            .with_tier(SessionStringStore::new(config.session_quota_bytes))
    }

    /// Tier kinds in priority order.
    pub fn kinds(&self) -> Vec<TierKind> {
        self.tiers.iter().map(|t| t.kind()).collect()
    }

    /// First value present under `key`, with the tier it came from.
    pub async fn get(&self, key: &str) -> Option<(TierKind, Value)> {
        self.first_accepted(key, Some).await
    }

    /// Write `value` to the first tier that accepts it.
    pub async fn set(&self, key: &str, value: &Value) -> TierResult {
        for tier in &self.tiers {
            match tier.set(key, value).await {
                Ok(()) => {
                    info!(tier = %tier.kind(), key, "stored value");
                    return TierResult::from_kind(tier.kind());
                }
                Err(e) => {
                    warn!(tier = %tier.kind(), key, error = %e, "tier write failed, falling through");
                }
            }
        }
        error!(key, "no storage tier accepted the write");
        TierResult::None
    }

    /// Load the user-product collection. `None` means nothing usable was stored.
    pub async fn load_products(&self) -> Option<Vec<Product>> {
        self.load_products_where(|_| true).await
    }

    /// Like [`TieredStore::load_products`], but a collection failing `accept` is
    /// treated as malformed and the next tier is consulted.
    pub async fn load_products_where(
        &self,
        accept: impl Fn(&[Product]) -> bool,
    ) -> Option<Vec<Product>> {
        self.first_accepted(USER_PRODUCTS_KEY, |value| {
            parse_products(value).filter(|products| accept(products))
        })
        .await
            .map(|(kind, products)| {
                info!(tier = %kind, count = products.len(), "loaded user products");
                products
            })
    }

    /// Persist the whole user-product collection, replacing what was there.
    pub async fn save_products(&self, products: &[Product]) -> TierResult {
        let value = match serde_json::to_value(products) {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "could not serialize user products");
                return TierResult::None;
            }
        };
        self.set(USER_PRODUCTS_KEY, &value).await
    }

    async fn first_accepted<T>(
        &self,
        key: &str,
        accept: impl Fn(Value) -> Option<T>,
    ) -> Option<(TierKind, T)> {
        for tier in &self.tiers {
            match tier.get(key).await {
                Ok(Some(value)) => match accept(value) {
                    Some(parsed) => return Some((tier.kind(), parsed)),
                    None => debug!(tier = %tier.kind(), key, "stored value is malformed, treating as absent"),
                },
                Ok(None) => debug!(tier = %tier.kind(), key, "nothing stored"),
                Err(e) => debug!(tier = %tier.kind(), key, error = %e, "tier read failed, treating as absent"),
            }
        }
        None
    }
}

/// A stored collection: an array of products with concrete categories and
/// distinct IDs. Anything else counts as absent.
fn parse_products(value: Value) -> Option<Vec<Product>> {
    if !value.is_array() {
        return None;
    }
    let products: Vec<Product> = serde_json::from_value(value).ok()?;
    if products.iter().any(|p| !p.category.is_storable()) {
        return None;
    }
    let mut seen = HashSet::with_capacity(products.len());
    if !products.iter().all(|p| seen.insert(p.id)) {
        return None;
    }
    Some(products)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_result_classification() {
        assert!(TierResult::Structured.is_durable());
        assert!(TierResult::Local.is_degraded());
        assert!(TierResult::Session.is_degraded());
        assert!(!TierResult::None.is_degraded());
        assert_eq!(TierResult::None.tier(), None);
        assert_eq!(TierResult::from_kind(TierKind::Session), TierResult::Session);
        assert_eq!(TierResult::Local.to_string(), "local");
        assert_eq!(TierResult::None.to_string(), "none");
    }

    #[test]
    fn test_parse_products_rejects_non_arrays() {
        assert!(parse_products(serde_json::json!({"id": 1})).is_none());
        assert!(parse_products(serde_json::json!([{"id": "x"}])).is_none());
        assert_eq!(parse_products(serde_json::json!([])), Some(vec![]));
    }

    fn record(id: u32, category: &str) -> Value {
        serde_json::json!({
            "id": id,
            "name": "Scarf",
            "category": category,
            "price": "$5",
            "imageSrc": "/assets/scarf.jpg"
        })
    }

    #[test]
    fn test_parse_products_rejects_filter_category() {
        let ok = Value::Array(vec![record(41, "hats")]);
        assert_eq!(parse_products(ok).map(|p| p.len()), Some(1));
        let sentinel = Value::Array(vec![record(41, "hats"), record(42, "all")]);
        assert!(parse_products(sentinel).is_none());
    }

    #[test]
    fn test_parse_products_rejects_duplicate_ids() {
        let dup = Value::Array(vec![record(41, "hats"), record(41, "shoes")]);
        assert!(parse_products(dup).is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_reports_none() {
        let store = TieredStore::new();
        assert_eq!(store.save_products(&[]).await, TierResult::None);
        assert!(store.load_products().await.is_none());
    }
}
