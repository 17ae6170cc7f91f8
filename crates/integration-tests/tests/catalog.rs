//! Catalog reader and seeding.

use corner_shop_core::ProductId;
use corner_shop_integration_tests::TestStore;
use corner_shop_storefront::AppError;
use corner_shop_storefront::seed::DEFAULT_CATALOG;

#[tokio::test]
async fn test_seed_fills_empty_catalog_once() {
    let store = TestStore::new().await;

    assert_eq!(store.seed_catalog().await.expect("seed"), DEFAULT_CATALOG.len());
    assert_eq!(store.seed_catalog().await.expect("seed again"), 0);

    let products = store.list_products(false).await.expect("list");
    assert_eq!(products.len(), DEFAULT_CATALOG.len());
}

#[tokio::test]
async fn test_listing_is_ordered_by_name() {
    let store = TestStore::new().await;
    store.product("Webcam", 49_990, 20).await;
    store.product("Drone", 329_990, 8).await;
    store.product("Mouse", 39_990, 25).await;

    let names: Vec<_> = store
        .list_products(false)
        .await
        .expect("list")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Drone", "Mouse", "Webcam"]);
}

#[tokio::test]
async fn test_in_stock_filter() {
    let store = TestStore::new().await;
    let sold_out = store.product("Sold Out", 10_000, 0).await;
    let available = store.product("Available", 10_000, 3).await;

    let all = store.list_products(false).await.expect("list");
    assert_eq!(all.len(), 2);

    let in_stock = store.list_products(true).await.expect("list");
    assert_eq!(in_stock.len(), 1);
    assert_eq!(in_stock[0].id, available);
    assert!(!all.iter().find(|p| p.id == sold_out).expect("listed").is_in_stock());
}

#[tokio::test]
async fn test_get_product() {
    let store = TestStore::new().await;
    let id = store.product("Hub", 24_990, 22).await;

    let product = store.get_product(id).await.expect("product");
    assert_eq!(product.name, "Hub");
    assert_eq!(product.price.to_cents().expect("cents"), 24_990);
    assert_eq!(product.stock, 22);

    let err = store.get_product(ProductId::new(9_999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
