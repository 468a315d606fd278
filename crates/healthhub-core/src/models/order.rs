//! Cart and order models.

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting for a pharmacist to verify the prescription
    PrescriptionPending,
    /// Accepted, awaiting packing
    Confirmed,
    /// Packed at the store
    Packed,
    /// With the courier
    OutForDelivery,
    /// Handed over to the customer
    Delivered,
    /// Rejected or withdrawn (terminal)
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PrescriptionPending => "prescription_pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packed => "packed",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prescription_pending" => Some(OrderStatus::PrescriptionPending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "packed" => Some(OrderStatus::Packed),
            "out_for_delivery" => Some(OrderStatus::OutForDelivery),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentType {
    #[default]
    Delivery,
    Takeaway,
}

impl FulfillmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentType::Delivery => "delivery",
            FulfillmentType::Takeaway => "takeaway",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "delivery" => Some(FulfillmentType::Delivery),
            "takeaway" => Some(FulfillmentType::Takeaway),
            _ => None,
        }
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "UPI")]
    Upi,
    Card,
    #[serde(rename = "COD")]
    Cod,
    Insurance,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "Card",
            PaymentMethod::Cod => "COD",
            PaymentMethod::Insurance => "Insurance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UPI" => Some(PaymentMethod::Upi),
            "Card" => Some(PaymentMethod::Card),
            "COD" => Some(PaymentMethod::Cod),
            "Insurance" => Some(PaymentMethod::Insurance),
            _ => None,
        }
    }
}

/// A product in the cart together with the requested quantity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Always >= 1
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    pub fn id(&self) -> &str {
        &self.product.id
    }

    /// Price times quantity.
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity)
    }
}

/// A placed order. Items and total are fixed at creation; only the status
/// (and the dispensing pharmacist) change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Opaque order token (e.g. "TRX-4K2J9QX1A")
    pub id: String,
    pub items: Vec<CartItem>,
    /// Settlement total (subtotal x tax multiplier + flat fee)
    pub total: f64,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub fulfillment: FulfillmentType,
    /// RFC 3339 creation timestamp
    pub date: String,
    pub customer_name: String,
    pub payment_method: PaymentMethod,
    pub auto_refill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_estimate: Option<String>,
    /// Staff identifier of the dispensing pharmacist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispensed_by: Option<String>,
}

impl Order {
    /// Total units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
