//! Staff console: the only write path to order status and the audit trail
//! outside of checkout.

mod vendors;

pub use vendors::*;

use thiserror::Error;
use tracing::{info, warn};

use crate::cart::round2;
use crate::db::{DbError, DbResult};
use crate::ids;
use crate::lifecycle::{apply_transition, TransitionError};
use crate::models::{
    AuditAction, AuditLog, Order, OrderStatus, Product, PurchaseOrder, PurchaseOrderItem,
    PurchaseOrderStatus, RecallStatus, Vendor, VendorStatus,
};
use crate::storefront::Storefront;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Figures shown on the console overview tab.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewStats {
    /// Orders awaiting packing (`confirmed`)
    pub pending_fulfilment: usize,
    /// Orders awaiting prescription verification
    pub awaiting_verification: usize,
    /// Sum of every order total
    pub total_revenue: f64,
    pub low_stock_count: usize,
    pub active_vendors: usize,
    pub audit_entries: usize,
}

/// Staff capability view over the storefront.
pub struct StaffConsole<'a> {
    storefront: &'a mut Storefront,
}

impl<'a> StaffConsole<'a> {
    pub(crate) fn new(storefront: &'a mut Storefront) -> Self {
        Self { storefront }
    }

    fn staff_id(&self) -> String {
        self.storefront.config.staff_id.clone()
    }

    // =========================================================================
    // Queues and overview
    // =========================================================================

    pub fn orders(&self) -> &[Order] {
        &self.storefront.orders
    }

    /// Confirmed orders waiting to be packed or dispensed.
    pub fn fulfilment_queue(&self) -> Vec<&Order> {
        self.orders_with_status(OrderStatus::Confirmed)
    }

    /// Orders waiting on prescription verification.
    pub fn verification_queue(&self) -> Vec<&Order> {
        self.orders_with_status(OrderStatus::PrescriptionPending)
    }

    fn orders_with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.storefront
            .orders
            .iter()
            .filter(|o| o.status == status)
            .collect()
    }

    pub fn overview(&self) -> DbResult<OverviewStats> {
        let total_revenue = round2(self.storefront.orders.iter().map(|o| o.total).sum());
        Ok(OverviewStats {
            pending_fulfilment: self.fulfilment_queue().len(),
            awaiting_verification: self.verification_queue().len(),
            total_revenue,
            low_stock_count: self.low_stock()?.len(),
            active_vendors: self.storefront.vendors.active_count(),
            audit_entries: self.storefront.audit.len(),
        })
    }

    // =========================================================================
    // Order actions
    // =========================================================================

    /// Move an order forward (or cancel it early).
    ///
    /// Rejected transitions leave the order and the audit trail untouched.
    pub fn advance_status(&mut self, order_id: &str, to: OrderStatus) -> ConsoleResult<Order> {
        let updated = self.transitioned(order_id, to)?;
        let order = self.commit_order(
            updated,
            AuditAction::VerifyPrescription,
            &format!("Status updated to {}", to),
        )?;
        info!(order_id, status = %to, "Order status advanced");
        Ok(order)
    }

    /// Hand the order over: `delivered` plus the dispensing pharmacist.
    pub fn dispense(&mut self, order_id: &str) -> ConsoleResult<Order> {
        let mut updated = self.transitioned(order_id, OrderStatus::Delivered)?;
        updated.dispensed_by = Some(self.staff_id());

        let order = self.commit_order(updated, AuditAction::Dispense, "Units dispensed.")?;
        info!(order_id, units = order.unit_count(), "Order dispensed");
        Ok(order)
    }

    /// Append an audit entry under the configured staff identifier.
    pub fn record_audit(
        &mut self,
        action: AuditAction,
        entity_id: &str,
        details: &str,
    ) -> DbResult<AuditLog> {
        let staff_id = self.staff_id();
        let entry = self
            .storefront
            .audit
            .record(action, &staff_id, entity_id, details)
            .clone();
        self.storefront.persist_audit()?;
        Ok(entry)
    }

    pub fn audit_logs(&self) -> &[AuditLog] {
        self.storefront.audit.entries()
    }

    /// Copy of the order moved to `to`. Nothing is changed yet.
    fn transitioned(&self, order_id: &str, to: OrderStatus) -> ConsoleResult<Order> {
        let mut order = self
            .storefront
            .order(order_id)
            .cloned()
            .ok_or_else(|| ConsoleError::OrderNotFound(order_id.to_string()))?;
        if let Err(e) = apply_transition(&mut order, to) {
            warn!(order_id, from = %order.status, to = %to, "Transition rejected");
            return Err(e.into());
        }
        Ok(order)
    }

    /// Store `updated` together with its audit entry in one transaction.
    /// On failure both the order and the trail are restored.
    fn commit_order(
        &mut self,
        updated: Order,
        action: AuditAction,
        details: &str,
    ) -> ConsoleResult<Order> {
        let staff_id = self.staff_id();
        let sf = &mut *self.storefront;
        let index = sf
            .orders
            .iter()
            .position(|o| o.id == updated.id)
            .ok_or_else(|| ConsoleError::OrderNotFound(updated.id.clone()))?;

        let previous = std::mem::replace(&mut sf.orders[index], updated.clone());
        sf.audit.record(action, &staff_id, &updated.id, details);

        let saved = sf.db.in_transaction(|_| {
            sf.persist_orders()?;
            sf.persist_audit()
        });
        if let Err(e) = saved {
            warn!(order_id = %updated.id, error = %e, "Order update rolled back");
            sf.orders[index] = previous;
            sf.audit.discard_newest();
            return Err(e.into());
        }
        Ok(updated)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Products under the configured low-stock threshold.
    pub fn low_stock(&self) -> DbResult<Vec<Product>> {
        self.storefront
            .db
            .list_low_stock(self.storefront.config.low_stock_threshold)
    }

    /// Receive stock for a product. Returns the new stock level.
    pub fn restock(&mut self, product_id: &str, quantity: u32) -> ConsoleResult<u32> {
        if quantity == 0 {
            return Err(ConsoleError::InvalidInput(
                "restock quantity must be positive".to_string(),
            ));
        }
        let stock = match self.storefront.db.restock_product(product_id, quantity) {
            Ok(stock) => stock,
            Err(DbError::NotFound(_)) => {
                return Err(ConsoleError::ProductNotFound(product_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        self.record_audit(
            AuditAction::InventoryRestock,
            product_id,
            &format!("Restocked {} units (now {})", quantity, stock),
        )?;
        Ok(stock)
    }

    /// Flag a product as recalled so it can no longer be sold.
    pub fn void_recalled(&mut self, product_id: &str, reason: &str) -> ConsoleResult<RecallStatus> {
        let recall = RecallStatus {
            is_recalled: true,
            reason: reason.to_string(),
            date: chrono::Utc::now().format("%Y-%m-%d").to_string(),
        };
        if !self.storefront.db.set_recall_status(product_id, Some(&recall))? {
            return Err(ConsoleError::ProductNotFound(product_id.to_string()));
        }

        self.record_audit(
            AuditAction::RecallVoid,
            product_id,
            &format!("Recalled: {}", reason),
        )?;
        Ok(recall)
    }

    // =========================================================================
    // Vendors and purchasing
    // =========================================================================

    pub fn vendors(&self) -> &[Vendor] {
        self.storefront.vendors.list()
    }

    pub fn save_vendor(&mut self, editing: Option<&str>, form: VendorForm) -> Vendor {
        self.storefront.vendors.save(editing, form).clone()
    }

    /// Remove a vendor. Its purchase orders are kept.
    pub fn delete_vendor(&mut self, vendor_id: &str) -> bool {
        self.storefront.vendors.delete(vendor_id)
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.storefront.purchase_orders
    }

    /// Raise a draft purchase order with a vendor.
    pub fn create_purchase_order(
        &mut self,
        vendor_id: &str,
        items: Vec<PurchaseOrderItem>,
        notes: Option<String>,
    ) -> ConsoleResult<PurchaseOrder> {
        let vendor = self
            .storefront
            .vendors
            .get(vendor_id)
            .ok_or_else(|| ConsoleError::VendorNotFound(vendor_id.to_string()))?;
        if vendor.status == VendorStatus::Blacklisted {
            return Err(ConsoleError::InvalidInput(format!(
                "vendor {} is blacklisted",
                vendor.name
            )));
        }
        if items.is_empty() || items.iter().any(|i| i.quantity == 0) {
            return Err(ConsoleError::InvalidInput(
                "purchase order needs at least one line with a positive quantity".to_string(),
            ));
        }

        let order = PurchaseOrder {
            id: ids::purchase_order_id(),
            vendor_id: vendor.id.clone(),
            vendor_name: vendor.name.clone(),
            total_amount: round2(items.iter().map(PurchaseOrderItem::line_total).sum()),
            items,
            status: PurchaseOrderStatus::Draft,
            order_date: chrono::Utc::now().to_rfc3339(),
            delivery_date: None,
            notes,
        };

        self.record_audit(
            AuditAction::VendorPoCreate,
            &order.id,
            &format!("PO to {} for {:.2}", order.vendor_name, order.total_amount),
        )?;
        self.storefront.purchase_orders.insert(0, order.clone());
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::models::{CartItem, FulfillmentType, PaymentMethod};

    fn order(id: &str, status: OrderStatus, total: f64) -> Order {
        let product = Product::new("1".into(), "Dolo 650".into(), "Paracetamol".into(), 45.0);
        Order {
            id: id.into(),
            items: vec![CartItem::new(product)],
            total,
            status,
            fulfillment: FulfillmentType::Delivery,
            date: "2024-01-15T10:00:00Z".into(),
            customer_name: "Arjun Sharma".into(),
            payment_method: PaymentMethod::Upi,
            auto_refill: false,
            delivery_estimate: None,
            dispensed_by: None,
        }
    }

    fn storefront_with(orders: Vec<Order>) -> Storefront {
        let mut sf = Storefront::open_in_memory(StorefrontConfig::default()).unwrap();
        sf.orders = orders;
        sf
    }

    #[test]
    fn test_queues_and_overview() {
        let mut sf = storefront_with(vec![
            order("A", OrderStatus::Confirmed, 100.0),
            order("B", OrderStatus::PrescriptionPending, 50.5),
            order("C", OrderStatus::Delivered, 20.0),
        ]);
        let mut low = Product::new("P".into(), "Allegra".into(), "Fexofenadine".into(), 180.0);
        low.stock = 10;
        sf.db.upsert_product(&low).unwrap();

        let console = sf.staff();
        assert_eq!(console.fulfilment_queue().len(), 1);
        assert_eq!(console.verification_queue()[0].id, "B");

        let stats = console.overview().unwrap();
        assert_eq!(stats.total_revenue, 170.5);
        assert_eq!(stats.low_stock_count, 1);
    }

    #[test]
    fn test_rejected_transition_has_no_side_effects() {
        let mut sf = storefront_with(vec![order("A", OrderStatus::Packed, 100.0)]);

        let result = sf.staff().advance_status("A", OrderStatus::Cancelled);
        assert!(matches!(result, Err(ConsoleError::Transition(_))));
        assert_eq!(sf.orders()[0].status, OrderStatus::Packed);
        assert!(sf.audit_logs().is_empty());
    }

    #[test]
    fn test_advance_writes_audit() {
        let mut sf = storefront_with(vec![order("A", OrderStatus::PrescriptionPending, 100.0)]);

        let updated = sf.staff().advance_status("A", OrderStatus::Confirmed).unwrap();
        assert_eq!(updated.status, OrderStatus::Confirmed);

        let entry = &sf.audit_logs()[0];
        assert_eq!(entry.action, AuditAction::VerifyPrescription);
        assert_eq!(entry.entity_id, "A");
        assert_eq!(entry.details, "Status updated to confirmed");
    }

    #[test]
    fn test_dispense_records_pharmacist_and_audit() {
        let mut sf = storefront_with(vec![order("A", OrderStatus::Confirmed, 100.0)]);

        let dispensed = sf.staff().dispense("A").unwrap();
        assert_eq!(dispensed.status, OrderStatus::Delivered);
        assert_eq!(dispensed.dispensed_by.as_deref(), Some("STF- Sarah V."));

        let stored = sf.store().orders().unwrap();
        assert_eq!(stored[0], dispensed);
        assert_eq!(sf.store().audit_logs().unwrap()[0].action, AuditAction::Dispense);
    }

    #[test]
    fn test_dispense_rolled_back_when_audit_write_fails() {
        let mut sf = storefront_with(vec![order("A", OrderStatus::Confirmed, 100.0)]);
        sf.persist_orders().unwrap();
        sf.db
            .conn()
            .execute_batch(
                "CREATE TRIGGER block_audit_insert BEFORE INSERT ON preferences
                 WHEN NEW.key = 'healthhub_audit_logs'
                 BEGIN SELECT RAISE(ABORT, 'audit store offline'); END;
                 CREATE TRIGGER block_audit_update BEFORE UPDATE ON preferences
                 WHEN NEW.key = 'healthhub_audit_logs'
                 BEGIN SELECT RAISE(ABORT, 'audit store offline'); END;",
            )
            .unwrap();

        let result = sf.staff().dispense("A");
        assert!(matches!(result, Err(ConsoleError::Database(_))));

        assert_eq!(sf.orders()[0].status, OrderStatus::Confirmed);
        assert_eq!(sf.orders()[0].dispensed_by, None);
        assert!(sf.audit_logs().is_empty());

        let stored = sf.store().orders().unwrap();
        assert_eq!(stored[0].status, OrderStatus::Confirmed);
        assert_eq!(stored[0].dispensed_by, None);
    }

    #[test]
    fn test_unknown_order() {
        let mut sf = storefront_with(vec![]);
        assert!(matches!(
            sf.staff().dispense("nope"),
            Err(ConsoleError::OrderNotFound(_))
        ));
    }

    #[test]
    fn test_restock_and_recall_are_audited() {
        let mut sf = storefront_with(vec![]);
        let mut product = Product::new("P".into(), "Allegra".into(), "Fexofenadine".into(), 180.0);
        product.stock = 10;
        sf.db.upsert_product(&product).unwrap();

        let mut console = sf.staff();
        assert_eq!(console.restock("P", 40).unwrap(), 50);
        assert!(matches!(
            console.restock("P", 0),
            Err(ConsoleError::InvalidInput(_))
        ));
        assert!(matches!(
            console.restock("missing", 5),
            Err(ConsoleError::ProductNotFound(_))
        ));

        console.void_recalled("P", "Contaminated batch").unwrap();

        let actions: Vec<_> = sf.audit_logs().iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::RecallVoid, AuditAction::InventoryRestock]
        );
        assert!(sf.database().get_product("P").unwrap().unwrap().is_recalled());
    }

    #[test]
    fn test_purchase_order_flow() {
        let mut sf = storefront_with(vec![]);
        let mut console = sf.staff();
        let vendor = console.save_vendor(
            None,
            VendorForm {
                name: "Zydus Lifesciences".into(),
                categories: "Pain Relief".into(),
                ..Default::default()
            },
        );

        let po = console
            .create_purchase_order(
                &vendor.id,
                vec![
                    PurchaseOrderItem {
                        product_id: "P".into(),
                        name: "Allegra 120".into(),
                        quantity: 10,
                        unit_price: 12.5,
                    },
                    PurchaseOrderItem {
                        product_id: "Q".into(),
                        name: "Dolo 650".into(),
                        quantity: 4,
                        unit_price: 2.0,
                    },
                ],
                Some("Urgent".into()),
            )
            .unwrap();

        assert_eq!(po.total_amount, 133.0);
        assert_eq!(po.status, PurchaseOrderStatus::Draft);
        assert_eq!(po.vendor_name, "Zydus Lifesciences");
        assert!(po.id.starts_with("PO-"));

        // No cascade on vendor removal
        assert!(console.delete_vendor(&vendor.id));
        assert_eq!(console.purchase_orders().len(), 1);
        assert_eq!(sf.audit_logs()[0].action, AuditAction::VendorPoCreate);
    }

    #[test]
    fn test_purchase_order_validation() {
        let mut sf = storefront_with(vec![]);
        let mut console = sf.staff();

        assert!(matches!(
            console.create_purchase_order("nope", vec![], None),
            Err(ConsoleError::VendorNotFound(_))
        ));

        let vendor = console.save_vendor(None, VendorForm::default());
        assert!(matches!(
            console.create_purchase_order(&vendor.id, vec![], None),
            Err(ConsoleError::InvalidInput(_))
        ));
    }
}
