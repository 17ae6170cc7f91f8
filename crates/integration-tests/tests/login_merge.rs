//! Login and the guest-to-customer cart merge.

use corner_shop_core::{GuestToken, Identity};
use corner_shop_integration_tests::{TEST_PASSWORD, TestStore};
use corner_shop_storefront::AppError;
use corner_shop_storefront::services::CartMerge;

#[tokio::test]
async fn test_guest_line_moves_to_customer_without_that_product() {
    let store = TestStore::new().await;
    let product = store.product("Webcam", 49_990, 20).await;
    let customer = store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();

    store
        .add_to_cart(Identity::Guest(token), product, 3)
        .await
        .expect("guest add");

    let outcome = store
        .login(Some(token), "ana@example.com", TEST_PASSWORD)
        .await
        .expect("login");
    assert_eq!(outcome.customer.id, customer);
    match outcome.cart_merge {
        CartMerge::Merged(merge) => {
            assert_eq!(merge.moved, 1);
            assert_eq!(merge.combined, 0);
        }
        other => panic!("expected merge, got {other:?}"),
    }

    let cart = store.cart(outcome.identity()).await.expect("customer cart");
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity.get(), 3);
    assert_eq!(cart.lines[0].owner, Identity::Customer(customer));

    assert!(store.cart(Identity::Guest(token)).await.expect("guest cart").is_empty());
}

#[tokio::test]
async fn test_combined_line_is_capped_at_stock() {
    let store = TestStore::new().await;
    let product = store.product("Graphics Card", 249_990, 5).await;
    let customer = store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();

    store
        .add_to_cart(Identity::Customer(customer), product, 4)
        .await
        .expect("customer add");
    store
        .add_to_cart(Identity::Guest(token), product, 3)
        .await
        .expect("guest add");

    let outcome = store
        .login(Some(token), "ana@example.com", TEST_PASSWORD)
        .await
        .expect("login succeeds despite the cap");
    match outcome.cart_merge {
        CartMerge::Merged(merge) => {
            assert_eq!(merge.combined, 1);
            assert_eq!(merge.units_dropped, 2);
        }
        other => panic!("expected merge, got {other:?}"),
    }

    let cart = store.cart(Identity::Customer(customer)).await.expect("cart");
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity.get(), 5);
    assert_eq!(store.count("cart_lines").await, 1);
}

#[tokio::test]
async fn test_merge_never_shrinks_existing_line() {
    let store = TestStore::new().await;
    let product = store.product("Tablet", 429_990, 7).await;
    let customer = store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();

    store
        .add_to_cart(Identity::Customer(customer), product, 6)
        .await
        .expect("customer add");
    store
        .add_to_cart(Identity::Guest(token), product, 1)
        .await
        .expect("guest add");
    store.set_stock(product, 2).await;

    let merge = store
        .merge_guest_cart(token, customer)
        .await
        .expect("merge");
    assert_eq!(merge.units_dropped, 1);

    let cart = store.cart(Identity::Customer(customer)).await.expect("cart");
    assert_eq!(cart.lines[0].quantity.get(), 6);
}

#[tokio::test]
async fn test_merging_twice_does_not_duplicate_lines() {
    let store = TestStore::new().await;
    let first = store.product("Router", 69_990, 14).await;
    let second = store.product("Speaker", 89_990, 18).await;
    let customer = store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();
    let guest = Identity::Guest(token);

    store.add_to_cart(guest, first, 1).await.expect("guest add");
    store.add_to_cart(guest, second, 2).await.expect("guest add");
    store
        .add_to_cart(Identity::Customer(customer), first, 1)
        .await
        .expect("customer add");

    store.merge_guest_cart(token, customer).await.expect("first merge");
    let again = store
        .merge_guest_cart(token, customer)
        .await
        .expect("second merge");
    assert!(again.is_noop());

    let cart = store.cart(Identity::Customer(customer)).await.expect("cart");
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.item_count(), 4);
    assert_eq!(store.count("cart_lines").await, 2);
}

#[tokio::test]
async fn test_login_without_guest_token_skips_merge() {
    let store = TestStore::new().await;
    store.customer("Ana", "ana@example.com").await;

    let outcome = store
        .login(None, "ANA@example.com", TEST_PASSWORD)
        .await
        .expect("login");
    assert_eq!(outcome.cart_merge, CartMerge::Skipped);
}

#[tokio::test]
async fn test_failed_login_leaves_guest_cart_alone() {
    let store = TestStore::new().await;
    let product = store.product("Smartwatch", 299_990, 12).await;
    store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();

    store
        .add_to_cart(Identity::Guest(token), product, 1)
        .await
        .expect("guest add");

    let err = store
        .login(Some(token), "ana@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
    assert_eq!(
        store.cart(Identity::Guest(token)).await.expect("cart").item_count(),
        1
    );
}

#[tokio::test]
async fn test_failed_merge_keeps_both_carts_and_login_succeeds() {
    let store = TestStore::new().await;
    let kept = store.product("Keyboard", 59_990, 10).await;
    let pending = store.product("Mouse", 39_990, 10).await;
    let customer = store.customer("Ana", "ana@example.com").await;
    let token = GuestToken::generate();

    store
        .add_to_cart(Identity::Customer(customer), kept, 2)
        .await
        .expect("customer add");
    store
        .add_to_cart(Identity::Guest(token), pending, 3)
        .await
        .expect("guest add");

    sqlx::query(
        "CREATE TRIGGER freeze_cart_lines BEFORE UPDATE ON cart_lines \
         BEGIN SELECT RAISE(ABORT, 'cart lines are frozen'); END",
    )
    .execute(store.pool())
    .await
    .expect("create trigger");

    let outcome = store
        .login(Some(token), "ana@example.com", TEST_PASSWORD)
        .await
        .expect("login succeeds when the merge fails");
    assert_eq!(outcome.customer.id, customer);
    assert_eq!(outcome.cart_merge, CartMerge::Failed);

    let guest_cart = store.cart(Identity::Guest(token)).await.expect("guest cart");
    assert_eq!(guest_cart.lines.len(), 1);
    assert_eq!(guest_cart.lines[0].product_id, pending);
    assert_eq!(guest_cart.item_count(), 3);

    let customer_cart = store
        .cart(Identity::Customer(customer))
        .await
        .expect("customer cart");
    assert_eq!(customer_cart.lines.len(), 1);
    assert_eq!(customer_cart.lines[0].product_id, kept);
    assert_eq!(customer_cart.item_count(), 2);
}
