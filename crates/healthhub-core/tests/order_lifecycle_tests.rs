//! Order lifecycle integration tests: pricing, staff transitions, dispensing.

use healthhub_core::cart::settlement_total;
use healthhub_core::console::ConsoleError;
use healthhub_core::db::Database;
use healthhub_core::lifecycle::{timeline_for, StepState, Timeline};
use healthhub_core::models::{
    AuditAction, CartItem, FulfillmentType, Order, OrderStatus, PaymentMethod, Product,
};
use healthhub_core::store::PreferenceStore;
use healthhub_core::{Storefront, StorefrontConfig};
use proptest::prelude::*;

const STAFF_ID: &str = "STF- Sarah V.";

fn item(id: &str, price: f64, quantity: u32) -> CartItem {
    let mut item = CartItem::new(Product::new(
        id.to_string(),
        format!("Product {}", id),
        "Paracetamol".to_string(),
        price,
    ));
    item.quantity = quantity;
    item
}

fn make_order(id: &str, status: OrderStatus, items: Vec<CartItem>) -> Order {
    let total = settlement_total(&items, &StorefrontConfig::default());
    Order {
        id: id.to_string(),
        items,
        total,
        status,
        fulfillment: FulfillmentType::Delivery,
        date: "2024-03-01T09:30:00Z".to_string(),
        customer_name: "Arjun Sharma".to_string(),
        payment_method: PaymentMethod::Upi,
        auto_refill: false,
        delivery_estimate: Some("35 mins".to_string()),
        dispensed_by: None,
    }
}

fn storefront_with(orders: &[Order]) -> Storefront {
    let db = Database::open_in_memory().unwrap();
    PreferenceStore::new(&db).set_orders(orders).unwrap();
    Storefront::load(db, StorefrontConfig::default()).unwrap()
}

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::PrescriptionPending),
        Just(OrderStatus::Confirmed),
        Just(OrderStatus::Packed),
        Just(OrderStatus::OutForDelivery),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Cancelled),
    ]
}

#[test]
fn test_total_formula_reference_order() {
    let order = make_order("TRX-1", OrderStatus::Confirmed, vec![item("1", 45.0, 2)]);
    // 90 * 1.12 + 50 = 150.8
    assert_eq!(order.total, 151.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_total_fixed_at_creation_and_stable(
        lines in prop::collection::vec((1u32..500, 1u32..10), 1..5),
        moves in prop::collection::vec(status_strategy(), 0..8),
    ) {
        let items: Vec<CartItem> = lines
            .iter()
            .enumerate()
            .map(|(i, (cents, qty))| item(&i.to_string(), f64::from(*cents) / 2.0, *qty))
            .collect();

        let subtotal: f64 = items.iter().map(|i| i.product.price * f64::from(i.quantity)).sum();
        let expected = (subtotal * 1.12 + 50.0).round();

        let order = make_order("TRX-P", OrderStatus::PrescriptionPending, items);
        prop_assert!((order.total - expected).abs() < 1e-9);

        let mut sf = storefront_with(&[order.clone()]);
        for to in moves {
            let _ = sf.staff().advance_status("TRX-P", to);
        }

        let after = sf.order("TRX-P").unwrap();
        prop_assert_eq!(after.total, order.total);
        prop_assert_eq!(&after.items, &order.items);
    }

    #[test]
    fn prop_cancelled_only_from_early_states(
        moves in prop::collection::vec(status_strategy(), 1..10),
    ) {
        let mut sf = storefront_with(&[make_order(
            "TRX-S",
            OrderStatus::PrescriptionPending,
            vec![item("1", 45.0, 1)],
        )]);

        for to in moves {
            let from = sf.order("TRX-S").unwrap().status;
            let result = sf.staff().advance_status("TRX-S", to);
            if to == OrderStatus::Cancelled && result.is_ok() {
                prop_assert!(matches!(
                    from,
                    OrderStatus::PrescriptionPending | OrderStatus::Confirmed
                ));
            }
        }
    }
}

#[test]
fn test_cancel_rejected_after_packing() {
    for status in [
        OrderStatus::Packed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ] {
        let mut sf = storefront_with(&[make_order("TRX-C", status, vec![item("1", 45.0, 1)])]);

        let result = sf.staff().advance_status("TRX-C", OrderStatus::Cancelled);
        assert!(
            matches!(result, Err(ConsoleError::Transition(_))),
            "cancel from {:?} must be rejected",
            status
        );
        assert_eq!(sf.order("TRX-C").unwrap().status, status);
        assert!(sf.audit_logs().is_empty());
    }
}

#[test]
fn test_cancel_allowed_before_packing() {
    for status in [OrderStatus::PrescriptionPending, OrderStatus::Confirmed] {
        let mut sf = storefront_with(&[make_order("TRX-C", status, vec![item("1", 45.0, 1)])]);

        let order = sf
            .staff()
            .advance_status("TRX-C", OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }
}

#[test]
fn test_no_backward_moves() {
    let mut sf = storefront_with(&[make_order(
        "TRX-B",
        OrderStatus::OutForDelivery,
        vec![item("1", 45.0, 1)],
    )]);

    assert!(sf
        .staff()
        .advance_status("TRX-B", OrderStatus::Confirmed)
        .is_err());
    assert!(sf
        .staff()
        .advance_status("TRX-B", OrderStatus::OutForDelivery)
        .is_err());
}

#[test]
fn test_status_change_persists_and_audits() {
    let mut sf = storefront_with(&[make_order(
        "TRX-V",
        OrderStatus::PrescriptionPending,
        vec![item("1", 45.0, 1)],
    )]);

    sf.staff()
        .advance_status("TRX-V", OrderStatus::Confirmed)
        .unwrap();

    let stored = PreferenceStore::new(sf.database()).orders().unwrap();
    assert_eq!(stored[0].status, OrderStatus::Confirmed);

    let logs = sf.audit_logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, AuditAction::VerifyPrescription);
    assert_eq!(logs[0].entity_id, "TRX-V");
}

#[test]
fn test_dispense_confirmed_order() {
    let mut sf = storefront_with(&[
        make_order("TRX-D", OrderStatus::Confirmed, vec![item("1", 45.0, 2)]),
        make_order("TRX-E", OrderStatus::Confirmed, vec![item("2", 30.0, 1)]),
    ]);
    let before = sf.audit_logs().len();

    let order = sf.staff().dispense("TRX-D").unwrap();

    assert_eq!(order.status, OrderStatus::Delivered);
    assert_eq!(order.dispensed_by.as_deref(), Some(STAFF_ID));

    let logs = sf.audit_logs();
    assert_eq!(logs.len(), before + 1);
    assert_eq!(logs[0].action, AuditAction::Dispense);
    assert_eq!(logs[0].entity_id, "TRX-D");
    assert_eq!(logs[0].staff_id, STAFF_ID);

    // The other order is untouched
    assert_eq!(sf.order("TRX-E").unwrap().status, OrderStatus::Confirmed);
    assert!(sf.order("TRX-E").unwrap().dispensed_by.is_none());

    // Persisted through the store
    let stored = PreferenceStore::new(sf.database()).audit_logs().unwrap();
    assert_eq!(stored.len(), 1);
}

#[test]
fn test_dispense_unknown_order() {
    let mut sf = storefront_with(&[]);
    assert!(matches!(
        sf.staff().dispense("TRX-NOPE"),
        Err(ConsoleError::OrderNotFound(_))
    ));
    assert!(sf.audit_logs().is_empty());
}

#[test]
fn test_dispense_delivered_order_rejected() {
    let mut sf = storefront_with(&[make_order(
        "TRX-X",
        OrderStatus::Delivered,
        vec![item("1", 45.0, 1)],
    )]);
    assert!(matches!(
        sf.staff().dispense("TRX-X"),
        Err(ConsoleError::Transition(_))
    ));
    assert!(sf.audit_logs().is_empty());
}

#[test]
fn test_timeline_follows_status() {
    match timeline_for(OrderStatus::Delivered) {
        Timeline::Steps(steps) => {
            assert!(steps[..3].iter().all(|s| s.state == StepState::Completed));
            assert_eq!(steps[3].state, StepState::Current);
        }
        Timeline::Cancelled => panic!("delivered order rendered as cancelled"),
    }

    match timeline_for(OrderStatus::Packed) {
        Timeline::Steps(steps) => {
            let states: Vec<StepState> = steps.iter().map(|s| s.state).collect();
            assert_eq!(
                states,
                vec![
                    StepState::Completed,
                    StepState::Current,
                    StepState::Pending,
                    StepState::Pending
                ]
            );
        }
        Timeline::Cancelled => panic!("packed order rendered as cancelled"),
    }

    assert!(matches!(
        timeline_for(OrderStatus::Cancelled),
        Timeline::Cancelled
    ));
}
