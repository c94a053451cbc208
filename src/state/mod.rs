//! # Catalog State
//!
//! [`CatalogState`] is an immutable snapshot of everything the catalog view needs:
//! built-in products, user products, the search term and the active category.
//! Transitions consume a snapshot and return the next one; nothing is mutated in
//! place. [`CatalogStore`] owns the current snapshot and keeps storage in sync.

mod store;

pub use store::{CatalogStore, CatalogStoreBuilder, Created, NewProduct, PersistNotice};

use std::sync::Arc;

use crate::catalog::{Category, Product, builtin_products, max_id};

/// Whether `product` is visible under `category` and `search_term`.
///
/// Both conditions must hold. The search is a case-insensitive substring match on
/// the name; an empty term matches everything.
pub fn matches_filter(product: &Product, category: Category, search_term: &str) -> bool {
    let in_category = category == Category::All || product.category == category;
    in_category && product.name.to_lowercase().contains(&search_term.to_lowercase())
}

/// Products passing [`matches_filter`], in input order.
pub fn filter_products<'a>(
    products: impl IntoIterator<Item = &'a Product>,
    category: Category,
    search_term: &str,
) -> Vec<&'a Product> {
    products
        .into_iter()
        .filter(|p| matches_filter(p, category, search_term))
        .collect()
}

#[derive(Debug, Clone)]
pub struct CatalogState {
    builtins: Arc<[Product]>,
    user_products: Arc<[Product]>,
    search_term: String,
    active_category: Category,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self::new(builtin_products().to_vec())
    }
}

impl CatalogState {
    /// A snapshot over `builtins` with no user products and no filters.
    pub fn new(builtins: Vec<Product>) -> Self {
        Self {
            builtins: builtins.into(),
            user_products: Arc::from(Vec::new()),
            search_term: String::new(),
            active_category: Category::All,
        }
    }

    pub fn builtins(&self) -> &[Product] {
        &self.builtins
    }

    pub fn user_products(&self) -> &[Product] {
        &self.user_products
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn active_category(&self) -> Category {
        self.active_category
    }

    /// Built-ins followed by user products.
    pub fn all_products(&self) -> impl Iterator<Item = &Product> {
        self.builtins.iter().chain(self.user_products.iter())
    }

    /// Products visible under the current filters.
    pub fn visible_products(&self) -> Vec<&Product> {
        filter_products(self.all_products(), self.active_category, &self.search_term)
    }

    pub fn find(&self, id: u32) -> Option<&Product> {
        self.all_products().find(|p| p.id == id)
    }

    /// `max(existing IDs) + 1` across built-ins and user products, or `None`
    /// once the largest ID is `u32::MAX`.
    pub fn next_id(&self) -> Option<u32> {
        max_id(self.all_products()).checked_add(1)
    }

    pub fn with_search_term(self, term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            ..self
        }
    }

    pub fn with_category(self, category: Category) -> Self {
        Self {
            active_category: category,
            ..self
        }
    }

    /// Replace the user-product collection wholesale (used when loading).
    pub fn with_user_products(self, products: Vec<Product>) -> Self {
        Self {
            user_products: products.into(),
            ..self
        }
    }

    /// Append one user product.
    pub fn with_product(self, product: Product) -> Self {
        let mut products = self.user_products.to_vec();
        products.push(product);
        self.with_user_products(products)
    }
}
