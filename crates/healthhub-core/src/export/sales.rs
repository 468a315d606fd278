//! Sales ledger export for accounting.

use serde::{Deserialize, Serialize};

use super::escape_csv;
use crate::cart::round2;
use crate::models::{Order, OrderStatus};

/// One line of the sales ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesLedgerLine {
    pub order_id: String,
    pub date: String,
    pub customer_name: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
    pub status: OrderStatus,
    pub payment_method: String,
    pub fulfillment: String,
    /// Settlement total of the whole order (repeated per line)
    pub order_total: f64,
}

/// Ledger of every order, one row per line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesLedger {
    /// Export timestamp
    pub exported_at: String,
    pub lines: Vec<SalesLedgerLine>,
    pub order_count: usize,
    /// Sum of order totals, cancelled orders excluded
    pub gross_revenue: f64,
}

impl SalesLedger {
    pub fn from_orders(orders: &[Order]) -> Self {
        let lines = orders
            .iter()
            .flat_map(|order| {
                order.items.iter().map(move |item| SalesLedgerLine {
                    order_id: order.id.clone(),
                    date: order.date.clone(),
                    customer_name: order.customer_name.clone(),
                    product_id: item.product.id.clone(),
                    product_name: item.product.name.clone(),
                    quantity: item.quantity,
                    unit_price: item.product.price,
                    line_total: round2(item.line_total()),
                    status: order.status,
                    payment_method: order.payment_method.as_str().to_string(),
                    fulfillment: order.fulfillment.as_str().to_string(),
                    order_total: order.total,
                })
            })
            .collect();

        let gross_revenue = round2(
            orders
                .iter()
                .filter(|o| o.status != OrderStatus::Cancelled)
                .map(|o| o.total)
                .sum(),
        );

        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            lines,
            order_count: orders.len(),
            gross_revenue,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("order_id,date,customer,product_id,product,quantity,unit_price,line_total,status,payment_method,fulfillment,order_total\n");

        for line in &self.lines {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{:.2},{:.2},{},{},{},{:.2}\n",
                escape_csv(&line.order_id),
                escape_csv(&line.date),
                escape_csv(&line.customer_name),
                escape_csv(&line.product_id),
                escape_csv(&line.product_name),
                line.quantity,
                line.unit_price,
                line.line_total,
                line.status.as_str(),
                line.payment_method,
                line.fulfillment,
                line.order_total,
            ));
        }

        csv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartItem, FulfillmentType, PaymentMethod, Product};

    fn make_order(id: &str, status: OrderStatus, total: f64) -> Order {
        let mut dolo = CartItem::new(Product::new(
            "1".into(),
            "Dolo 650".into(),
            "Paracetamol".into(),
            45.0,
        ));
        dolo.quantity = 2;
        let allegra = CartItem::new(Product::new(
            "3".into(),
            "Allegra, 120mg".into(),
            "Fexofenadine".into(),
            180.0,
        ));

        Order {
            id: id.into(),
            items: vec![dolo, allegra],
            total,
            status,
            fulfillment: FulfillmentType::Takeaway,
            date: "2024-01-15T10:00:00Z".into(),
            customer_name: "Arjun Sharma".into(),
            payment_method: PaymentMethod::Card,
            auto_refill: false,
            delivery_estimate: None,
            dispensed_by: None,
        }
    }

    #[test]
    fn test_ledger_lines_and_revenue() {
        let orders = vec![
            make_order("TRX-A", OrderStatus::Delivered, 352.0),
            make_order("TRX-B", OrderStatus::Cancelled, 352.0),
        ];
        let ledger = SalesLedger::from_orders(&orders);

        assert_eq!(ledger.lines.len(), 4);
        assert_eq!(ledger.order_count, 2);
        assert_eq!(ledger.gross_revenue, 352.0);
        assert_eq!(ledger.lines[0].line_total, 90.0);
    }

    #[test]
    fn test_ledger_csv() {
        let ledger = SalesLedger::from_orders(&[make_order("TRX-A", OrderStatus::Confirmed, 352.0)]);
        let csv = ledger.to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3); // Header + 2 items
        assert!(lines[1].contains("TRX-A"));
        assert!(lines[1].contains("90.00"));
        // Product name with a comma is quoted
        assert!(lines[2].contains("\"Allegra, 120mg\""));
        assert!(lines[2].ends_with("352.00"));
    }

    #[test]
    fn test_ledger_json() {
        let ledger = SalesLedger::from_orders(&[make_order("TRX-A", OrderStatus::Packed, 352.0)]);
        let json = ledger.to_json().unwrap();
        assert!(json.contains("\"status\": \"packed\""));
    }
}
