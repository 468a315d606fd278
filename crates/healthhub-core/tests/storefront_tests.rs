//! Storefront integration tests: persistence, cart, checkout and reorder.

use std::time::Duration;

use healthhub_core::checkout::{CheckoutError, CheckoutRequest};
use healthhub_core::db::Database;
use healthhub_core::models::{
    AuditAction, AuditLog, CartItem, FulfillmentType, Language, Order, OrderStatus,
    PaymentMethod, Product, Role, ViewState,
};
use healthhub_core::store::PreferenceStore;
use healthhub_core::{Storefront, StorefrontConfig, StorefrontError};
use tokio_util::sync::CancellationToken;

fn dolo() -> Product {
    let mut product = Product::new(
        "1".to_string(),
        "Dolo 650".to_string(),
        "Paracetamol".to_string(),
        45.0,
    );
    product.stock = 120;
    product
}

fn delivered_order() -> Order {
    let mut item = CartItem::new(dolo());
    item.quantity = 2;
    Order {
        id: "TRX-OLD".to_string(),
        items: vec![item],
        total: 151.0,
        status: OrderStatus::Delivered,
        fulfillment: FulfillmentType::Delivery,
        date: "2024-02-10T08:00:00Z".to_string(),
        customer_name: "Arjun Sharma".to_string(),
        payment_method: PaymentMethod::Upi,
        auto_refill: true,
        delivery_estimate: Some("35 mins".to_string()),
        dispensed_by: Some("STF- Sarah V.".to_string()),
    }
}

fn storefront() -> Storefront {
    let sf = Storefront::open_in_memory(StorefrontConfig::default()).unwrap();
    sf.database().upsert_product(&dolo()).unwrap();
    sf
}

fn storefront_with(orders: &[Order]) -> Storefront {
    let db = Database::open_in_memory().unwrap();
    db.upsert_product(&dolo()).unwrap();
    PreferenceStore::new(&db).set_orders(orders).unwrap();
    Storefront::load(db, StorefrontConfig::default()).unwrap()
}

// =========================================================================
// Preference store round trips
// =========================================================================

#[test]
fn test_scalar_preferences_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let store = PreferenceStore::new(&db);

    for value in [true, false] {
        store.set_large_font(value).unwrap();
        store.set_assisted_mode(value).unwrap();
        store.set_accessibility(value).unwrap();
        assert_eq!(store.large_font().unwrap(), value);
        assert_eq!(store.assisted_mode().unwrap(), value);
        assert_eq!(store.accessibility().unwrap(), value);
    }

    for language in [Language::Hi, Language::En] {
        store.set_language(language).unwrap();
        assert_eq!(store.language().unwrap(), language);
    }

    for view in ViewState::ALL {
        store.set_last_view(view).unwrap();
        assert_eq!(store.last_view().unwrap(), view);
    }
}

#[test]
fn test_json_preferences_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let store = PreferenceStore::new(&db);

    let orders = vec![delivered_order()];
    store.set_orders(&orders).unwrap();
    assert_eq!(store.orders().unwrap(), orders);

    let logs = vec![AuditLog {
        id: "LOG-1".to_string(),
        timestamp: "2024-02-10T09:00:00Z".to_string(),
        action: AuditAction::Dispense,
        staff_id: "STF- Sarah V.".to_string(),
        entity_id: "TRX-OLD".to_string(),
        details: "Units dispensed.".to_string(),
        security_hash: "SHA256-ABCDEF123".to_string(),
    }];
    store.set_audit_logs(&logs).unwrap();
    assert_eq!(store.audit_logs().unwrap(), logs);
}

#[test]
fn test_profile_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    {
        let mut sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
        sf.set_large_font(true).unwrap();
        sf.set_language(Language::Hi).unwrap();
        sf.remember_email(Some("arjun@example.com")).unwrap();
        sf.login(Role::Staff).unwrap();
    }

    let sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
    assert!(sf.display().large_font);
    assert_eq!(sf.display().language, Language::Hi);
    assert_eq!(sf.remembered_email(), Some("arjun@example.com"));
    assert!(sf.auth().is_logged_in);
    assert_eq!(sf.auth().role, Some(Role::Staff));
    assert_eq!(sf.view(), ViewState::StaffDashboard);
    assert_eq!(sf.audit_logs().len(), 1);
    assert_eq!(sf.audit_logs()[0].action, AuditAction::Login);
}

#[test]
fn test_reopen_on_checkout_lands_on_cart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    {
        let mut sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
        sf.database().upsert_product(&dolo()).unwrap();
        sf.customer().add_product_by_id("1").unwrap();
        assert_eq!(sf.navigate(ViewState::Checkout).unwrap(), ViewState::Checkout);
    }

    let sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
    assert!(sf.cart().is_empty());
    assert_eq!(sf.view(), ViewState::Cart);
    assert_eq!(
        PreferenceStore::new(sf.database()).last_view().unwrap(),
        ViewState::Cart
    );
}

#[test]
fn test_reopen_on_product_details_lands_on_shop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profile.db");

    {
        let mut sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
        sf.database().upsert_product(&dolo()).unwrap();
        sf.select_product("1").unwrap();
        assert_eq!(sf.view(), ViewState::ProductDetails);
    }

    let sf = Storefront::open(&path, StorefrontConfig::default()).unwrap();
    assert_eq!(sf.selected_product(), None);
    assert_eq!(sf.view(), ViewState::Shop);
}

#[test]
fn test_sign_out_returns_home() {
    let mut sf = storefront();
    sf.login(Role::User).unwrap();
    assert_eq!(sf.view(), ViewState::UserDashboard);
    // Customer logins are not audited
    assert!(sf.audit_logs().is_empty());

    assert_eq!(sf.sign_out().unwrap(), ViewState::Home);
    assert!(!sf.auth().is_logged_in);
    assert_eq!(PreferenceStore::new(sf.database()).auth().unwrap().role, None);
}

// =========================================================================
// Cart
// =========================================================================

#[test]
fn test_quantity_clamped_at_one() {
    let mut sf = storefront();
    let mut customer = sf.customer();

    customer.add_product_by_id("1").unwrap();
    customer.add_product_by_id("1").unwrap();
    assert_eq!(customer.add_product_by_id("1").unwrap(), 3);

    assert_eq!(customer.update_quantity("1", -100), Some(1));
    assert_eq!(customer.cart().items()[0].quantity, 1);
    assert_eq!(customer.update_quantity("1", -1), Some(1));
    assert_eq!(customer.update_quantity("missing", 1), None);
}

#[test]
fn test_add_unknown_or_recalled_product() {
    let mut sf = storefront();
    assert!(matches!(
        sf.customer().add_product_by_id("999"),
        Err(StorefrontError::ProductNotFound(_))
    ));

    sf.staff().void_recalled("1", "Contamination").unwrap();
    assert!(matches!(
        sf.customer().add_product_by_id("1"),
        Err(StorefrontError::ProductRecalled(_))
    ));
    assert!(sf.cart().is_empty());
}

// =========================================================================
// Checkout
// =========================================================================

#[test]
fn test_empty_cart_checkout_creates_nothing() {
    let mut sf = storefront_with(&[delivered_order()]);
    let before = sf.orders().len();

    assert_eq!(sf.navigate(ViewState::Checkout).unwrap(), ViewState::Cart);
    assert!(matches!(
        sf.begin_checkout(CheckoutRequest::default()),
        Err(CheckoutError::EmptyCart)
    ));
    assert_eq!(sf.orders().len(), before);
    assert!(!sf.is_processing_checkout());
}

#[tokio::test(start_paused = true)]
async fn test_place_order() {
    let mut sf = storefront();
    sf.customer().add_product_by_id("1").unwrap();
    sf.customer().add_product_by_id("1").unwrap();
    assert_eq!(sf.navigate(ViewState::Checkout).unwrap(), ViewState::Checkout);

    let request = CheckoutRequest {
        fulfillment: FulfillmentType::Takeaway,
        payment_method: PaymentMethod::Card,
        auto_refill: true,
    };
    let start = tokio::time::Instant::now();
    let order = sf
        .customer()
        .place_order(request, &CancellationToken::new())
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_millis(1500));
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.total, 151.0);
    assert_eq!(order.delivery_estimate.as_deref(), Some("Ready in 10 mins"));
    assert_eq!(order.customer_name, "Arjun Sharma");
    assert!(order.auto_refill);

    assert!(sf.cart().is_empty());
    assert_eq!(sf.view(), ViewState::UserDashboard);
    assert_eq!(sf.orders()[0].id, order.id);
    assert!(!sf.is_processing_checkout());

    let stored = PreferenceStore::new(sf.database()).orders().unwrap();
    assert_eq!(stored[0], order);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_checkout_keeps_cart() {
    let mut sf = storefront();
    sf.customer().add_product_by_id("1").unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = sf
        .customer()
        .place_order(CheckoutRequest::default(), &cancel)
        .await;

    assert!(matches!(result, Err(CheckoutError::Cancelled)));
    assert!(sf.orders().is_empty());
    assert_eq!(sf.cart().item_count(), 1);
    assert!(!sf.is_processing_checkout());
}

#[tokio::test(start_paused = true)]
async fn test_double_submit_rejected() {
    let mut sf = storefront();
    sf.customer().add_product_by_id("1").unwrap();

    let first = sf.begin_checkout(CheckoutRequest::default()).unwrap();
    assert!(sf.is_processing_checkout());
    assert!(matches!(
        sf.begin_checkout(CheckoutRequest::default()),
        Err(CheckoutError::AlreadyProcessing)
    ));

    let settled = first.settle(&CancellationToken::new()).await.unwrap();
    sf.complete_checkout(settled).unwrap();

    assert_eq!(sf.orders().len(), 1);
    assert!(!sf.is_processing_checkout());
}

// =========================================================================
// Reorder and order selection
// =========================================================================

#[test]
fn test_reorder_copies_items_into_cart() {
    let mut sf = storefront_with(&[delivered_order()]);

    sf.customer().reorder("TRX-OLD").unwrap();

    assert_eq!(sf.view(), ViewState::Cart);
    let items = sf.cart().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id, "1");
    assert_eq!(items[0].product.price, 45.0);
    assert_eq!(items[0].quantity, 2);

    // The cart holds a copy; editing it leaves the order alone
    sf.customer().update_quantity("1", 5);
    assert_eq!(sf.cart().items()[0].quantity, 7);
    assert_eq!(sf.order("TRX-OLD").unwrap().items[0].quantity, 2);
}

#[test]
fn test_reorder_unknown_order() {
    let mut sf = storefront();
    assert!(matches!(
        sf.customer().reorder("TRX-NOPE"),
        Err(StorefrontError::OrderNotFound(_))
    ));
    assert!(sf.cart().is_empty());
}

#[test]
fn test_view_order_routes_by_status() {
    let mut active = delivered_order();
    active.id = "TRX-NEW".to_string();
    active.status = OrderStatus::Packed;
    let mut sf = storefront_with(&[active, delivered_order()]);

    assert_eq!(
        sf.customer().view_order("TRX-OLD").unwrap(),
        ViewState::SmartPack
    );
    assert_eq!(sf.selected_order().unwrap().id, "TRX-OLD");

    assert_eq!(
        sf.customer().view_order("TRX-NEW").unwrap(),
        ViewState::UserDashboard
    );
    assert_eq!(sf.customer().active_orders().count(), 1);
}

#[test]
fn test_clear_profile() {
    let mut sf = storefront_with(&[delivered_order()]);
    sf.set_large_font(true).unwrap();
    sf.login(Role::Staff).unwrap();

    sf.clear_profile().unwrap();

    assert!(sf.orders().is_empty());
    assert!(sf.audit_logs().is_empty());
    assert!(!sf.display().large_font);
    assert_eq!(sf.view(), ViewState::Home);

    let store = PreferenceStore::new(sf.database());
    assert!(store.orders().unwrap().is_empty());
    assert!(!store.auth().unwrap().is_logged_in);
}
