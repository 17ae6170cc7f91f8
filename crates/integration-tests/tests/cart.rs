//! Cart engine scenarios against a real `SQLite` store.

use corner_shop_core::{CartLineId, GuestToken, Identity, ProductId};
use corner_shop_integration_tests::TestStore;
use corner_shop_storefront::AppError;

#[tokio::test]
async fn test_add_sums_quantities_up_to_stock() {
    let store = TestStore::new().await;
    let product = store.product("Webcam", 49_990, 10).await;
    let customer = Identity::Customer(store.customer("Ana", "ana@example.com").await);

    store.add_to_cart(customer, product, 4).await.expect("add 4");
    let line = store.add_to_cart(customer, product, 5).await.expect("add 5");
    assert_eq!(line.quantity.get(), 9);

    let err = store.add_to_cart(customer, product, 2).await.unwrap_err();
    match err {
        AppError::InsufficientStock {
            product_id,
            requested,
            available,
            ..
        } => {
            assert_eq!(product_id, product);
            assert_eq!(requested, 11);
            assert_eq!(available, 10);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let cart = store.cart(customer).await.expect("cart");
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity.get(), 9);
    assert_eq!(store.stock(product).await, 10);
}

#[tokio::test]
async fn test_add_rejects_non_positive_quantity() {
    let store = TestStore::new().await;
    let product = store.product("Mouse", 39_990, 5).await;
    let guest = Identity::Guest(GuestToken::generate());

    assert!(matches!(
        store.add_to_cart(guest, product, 0).await,
        Err(AppError::InvalidQuantity(0))
    ));
    assert!(matches!(
        store.add_to_cart(guest, product, -1).await,
        Err(AppError::InvalidQuantity(-1))
    ));
    assert!(store.cart(guest).await.expect("cart").is_empty());
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let store = TestStore::new().await;
    let guest = Identity::Guest(GuestToken::generate());

    let err = store
        .add_to_cart(guest, ProductId::new(9_999), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_line_keeps_price_snapshot_from_first_add() {
    let store = TestStore::new().await;
    let product = store.product("Keyboard", 59_990, 10).await;
    let guest = Identity::Guest(GuestToken::generate());

    store.add_to_cart(guest, product, 1).await.expect("add");
    store.set_price_cents(product, 79_990).await;
    let line = store.add_to_cart(guest, product, 1).await.expect("add again");

    assert_eq!(line.quantity.get(), 2);
    assert_eq!(line.unit_price.to_cents().expect("cents"), 59_990);
    assert_eq!(
        store.cart(guest).await.expect("cart").total.to_cents().expect("cents"),
        119_980
    );
}

#[tokio::test]
async fn test_update_quantity_checks_owner_and_stock() {
    let store = TestStore::new().await;
    let product = store.product("Headset", 69_990, 6).await;
    let ana = Identity::Customer(store.customer("Ana", "ana@example.com").await);
    let bia = Identity::Customer(store.customer("Bia", "bia@example.com").await);

    let line = store.add_to_cart(ana, product, 2).await.expect("add");

    let err = store.update_cart_line(bia, line.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = store.update_cart_line(ana, line.id, 7).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { available: 6, .. }));

    let err = store.update_cart_line(ana, line.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity(0)));

    let updated = store.update_cart_line(ana, line.id, 6).await.expect("update");
    assert_eq!(updated.quantity.get(), 6);
    assert_eq!(updated.unit_price, line.unit_price);

    let err = store
        .update_cart_line(ana, CartLineId::new(9_999), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_remove_is_idempotent_and_owner_scoped() {
    let store = TestStore::new().await;
    let product = store.product("SSD", 59_990, 30).await;
    let ana = Identity::Customer(store.customer("Ana", "ana@example.com").await);
    let guest = Identity::Guest(GuestToken::generate());

    let line = store.add_to_cart(ana, product, 1).await.expect("add");

    assert!(!store.remove_cart_line(guest, line.id).await.expect("remove"));
    assert_eq!(store.cart(ana).await.expect("cart").lines.len(), 1);

    assert!(store.remove_cart_line(ana, line.id).await.expect("remove"));
    assert!(!store.remove_cart_line(ana, line.id).await.expect("remove again"));
    assert!(store.cart(ana).await.expect("cart").is_empty());
}

#[tokio::test]
async fn test_cart_lists_newest_first_with_totals() {
    let store = TestStore::new().await;
    let first = store.product("Mousepad", 19_990, 30).await;
    let second = store.product("Hub", 24_990, 22).await;
    let guest = Identity::Guest(GuestToken::generate());

    store.add_to_cart(guest, first, 2).await.expect("add first");
    store.add_to_cart(guest, second, 1).await.expect("add second");

    let cart = store.cart(guest).await.expect("cart");
    let products: Vec<_> = cart.lines.iter().map(|l| l.product_id).collect();
    assert_eq!(products, vec![second, first]);
    assert_eq!(
        cart.lines[1].subtotal().expect("subtotal").to_cents().expect("cents"),
        39_980
    );
    assert_eq!(cart.total.to_cents().expect("cents"), 64_970);
    assert_eq!(cart.item_count(), 3);
}

#[tokio::test]
async fn test_guest_carts_are_isolated() {
    let store = TestStore::new().await;
    let product = store.product("Drone", 329_990, 8).await;
    let one = Identity::Guest(GuestToken::generate());
    let two = Identity::Guest(GuestToken::generate());

    store.add_to_cart(one, product, 2).await.expect("add");

    assert_eq!(store.cart(one).await.expect("cart").item_count(), 2);
    assert!(store.cart(two).await.expect("cart").is_empty());
}

#[tokio::test]
async fn test_totals_past_storable_range_are_rejected() {
    let store = TestStore::new().await;
    let priciest = store.product("Priciest", i64::MAX, i64::MAX).await;
    let cheap = store.product("Cheap", 1, 10).await;
    let guest = Identity::Guest(GuestToken::generate());

    let err = store.add_to_cart(guest, priciest, i64::MAX).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");
    assert!(store.cart(guest).await.expect("cart").is_empty());

    let line = store.add_to_cart(guest, priciest, 1).await.expect("add one");
    let err = store.update_cart_line(guest, line.id, 2).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");

    let err = store.add_to_cart(guest, cheap, 1).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)), "got {err:?}");

    let cart = store.cart(guest).await.expect("cart");
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.total.to_cents().expect("cents"), i64::MAX);
}
