//! Catalog filtering, ID assignment and persistence through the store.

mod common;

use common::{FailingTier, chain_in, product};
use serde_json::json;
use tempfile::TempDir;

use try_on_studio::catalog::builtin_products;
use try_on_studio::state::filter_products;
use try_on_studio::storage::{
    DEFAULT_QUOTA_BYTES, LocalStringStore, SessionStringStore, USER_PRODUCTS_KEY,
};
use try_on_studio::{
    CATEGORIES, CatalogStore, Category, NewProduct, PersistNotice, StorageTier, TierKind,
    TieredStore,
};

fn new_product(name: &str, category: Category) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category,
        price: "$19.99".to_string(),
        image_src: "data:image/jpeg;base64,AAAA".to_string(),
    }
}

#[test]
fn test_all_with_empty_term_returns_input_in_order() {
    let products = builtin_products();
    let visible = filter_products(products, Category::All, "");
    assert_eq!(visible.len(), products.len());
    assert!(visible.iter().zip(products).all(|(a, b)| a.id == b.id));
}

#[test]
fn test_filters_combine_with_and() {
    let products = vec![
        product(1, "Gray Hoodie", Category::Outerwear),
        product(2, "Gray Cap", Category::Hats),
        product(3, "Black Cap", Category::Hats),
    ];
    let ids = |c, t| {
        filter_products(&products, c, t)
            .iter()
            .map(|p| p.id)
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(Category::Hats, "gray"), vec![2]);
    assert_eq!(ids(Category::All, "gray"), vec![1, 2]);
    assert_eq!(ids(Category::Hats, ""), vec![2, 3]);
    assert!(ids(Category::Shoes, "gray").is_empty());
}

#[test]
fn test_category_bar() {
    assert_eq!(CATEGORIES.len(), 7);
    assert_eq!(CATEGORIES[0], Category::All);
    assert!(builtin_products().iter().all(|p| p.category.is_storable()));
}

#[tokio::test]
async fn test_sequential_creations_get_increasing_ids() {
    let dir = TempDir::new().unwrap();
    let mut store = CatalogStore::builder()
        .with_storage(chain_in(dir.path(), DEFAULT_QUOTA_BYTES, DEFAULT_QUOTA_BYTES))
        .build();
    assert_eq!(store.load().await, 0);

    let first = store.create_product(new_product("Tee", Category::Shirts)).await.unwrap();
    let second = store.create_product(new_product("Chinos", Category::Pants)).await.unwrap();
    assert_eq!(first.product.id, 41);
    assert_eq!(second.product.id, 42);
    assert_eq!(first.notice, PersistNotice::Durable);
    assert_eq!(store.state().user_products().len(), 2);
}

#[tokio::test]
async fn test_products_reload_from_disk() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = CatalogStore::builder()
            .with_storage(chain_in(dir.path(), DEFAULT_QUOTA_BYTES, DEFAULT_QUOTA_BYTES))
            .build();
        store.load().await;
        store.create_product(new_product("Tee", Category::Shirts)).await.unwrap();
    }

    let mut reopened = CatalogStore::builder()
        .with_storage(chain_in(dir.path(), DEFAULT_QUOTA_BYTES, DEFAULT_QUOTA_BYTES))
        .build();
    assert_eq!(reopened.load().await, 1);
    assert_eq!(reopened.state().next_id(), Some(42));
    reopened.set_search_term("TEE");
    reopened.set_category(Category::Shirts);
    let visible = reopened.state().visible_products();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, 41);
}

#[tokio::test]
async fn test_degraded_save_keeps_product_and_warns() {
    let dir = TempDir::new().unwrap();
    let storage = TieredStore::new()
        .with_tier(FailingTier(TierKind::Structured))
        .with_tier(LocalStringStore::new(dir.path().join("local.json"), 8))
        .with_tier(SessionStringStore::new(DEFAULT_QUOTA_BYTES));
    let mut store = CatalogStore::builder().with_storage(storage).build();

    let created = store.create_product(new_product("Scarf", Category::Accessories)).await.unwrap();
    assert_eq!(created.notice, PersistNotice::Degraded { tier: TierKind::Session });
    assert!(!created.notice.is_blocking());
    assert!(store.state().find(created.product.id).is_some());
}

#[tokio::test]
async fn test_invalid_product_is_rejected_without_side_effects() {
    let mut store = CatalogStore::builder().build();
    let err = store
        .create_product(new_product("  ", Category::Shirts))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "validation");
    assert!(store.state().user_products().is_empty());
    assert_eq!(store.state().next_id(), Some(41));
}

async fn session_holding(value: serde_json::Value) -> SessionStringStore {
    let session = SessionStringStore::new(DEFAULT_QUOTA_BYTES);
    session.set(USER_PRODUCTS_KEY, &value).await.unwrap();
    session
}

#[tokio::test]
async fn test_create_after_max_id_reports_exhaustion() {
    let stored = serde_json::to_value(vec![product(u32::MAX, "Last Hat", Category::Hats)]).unwrap();
    let storage = TieredStore::new().with_tier(session_holding(stored).await);
    let mut store = CatalogStore::builder().with_storage(storage).build();
    assert_eq!(store.load().await, 1);
    assert_eq!(store.state().next_id(), None);

    let err = store
        .create_product(new_product("One More", Category::Hats))
        .await
        .unwrap_err();
    assert_eq!(err.category(), "validation");
    assert!(err.to_string().contains("ID space exhausted"));
    assert_eq!(store.state().user_products().len(), 1);
}

#[tokio::test]
async fn test_stored_filter_category_is_treated_as_absent() {
    let mut sentinel = serde_json::to_value(vec![product(41, "Scarf", Category::Accessories)]).unwrap();
    sentinel[0]["category"] = json!("all");
    let storage = TieredStore::new().with_tier(session_holding(sentinel).await);
    let mut store = CatalogStore::builder().with_storage(storage).build();
    assert_eq!(store.load().await, 0);
    assert_eq!(store.state().next_id(), Some(41));
}

#[tokio::test]
async fn test_duplicate_stored_ids_are_treated_as_absent() {
    let dup = serde_json::to_value(vec![
        product(41, "Scarf", Category::Accessories),
        product(41, "Belt", Category::Accessories),
    ])
    .unwrap();
    let storage = TieredStore::new().with_tier(session_holding(dup).await);
    let mut store = CatalogStore::builder().with_storage(storage).build();
    assert_eq!(store.load().await, 0);
}

#[tokio::test]
async fn test_collection_reusing_builtin_id_falls_through() {
    let dir = TempDir::new().unwrap();
    let clashing = serde_json::to_value(vec![product(3, "Impostor", Category::Shirts)]).unwrap();
    let good = serde_json::to_value(vec![product(41, "Tee", Category::Shirts)]).unwrap();
    let local = LocalStringStore::new(dir.path().join("local.json"), DEFAULT_QUOTA_BYTES);
    local.set(USER_PRODUCTS_KEY, &clashing).await.unwrap();

    let storage = TieredStore::new()
        .with_tier(local)
        .with_tier(session_holding(good).await);
    let mut store = CatalogStore::builder().with_storage(storage).build();
    assert_eq!(store.load().await, 1);
    assert_eq!(store.state().find(3).unwrap().name, builtin_products()[2].name);
    assert_eq!(store.state().find(41).unwrap().name, "Tee");
}
