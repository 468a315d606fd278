//! In-memory shopping cart and settlement pricing.

use tracing::debug;

use crate::config::StorefrontConfig;
use crate::models::{CartItem, Product};

/// The customer's cart. Lives only in memory; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Add one unit. Returns the line's new quantity.
    ///
    /// Stock is not checked here.
    pub fn add(&mut self, product: Product) -> u32 {
        if let Some(item) = self.items.iter_mut().find(|i| i.id() == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            debug!(product_id = %product.id, quantity = item.quantity, "Incremented cart line");
            return item.quantity;
        }

        debug!(product_id = %product.id, "Added cart line");
        self.items.push(CartItem::new(product));
        1
    }

    /// Shift a line's quantity by `delta`, never below 1.
    ///
    /// Returns the new quantity, or `None` if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &str, delta: i64) -> Option<u32> {
        let item = self.items.iter_mut().find(|i| i.id() == product_id)?;
        let next = (i64::from(item.quantity) + delta).clamp(1, i64::from(u32::MAX));
        item.quantity = next as u32;
        Some(item.quantity)
    }

    /// Drop a line. Returns whether it was present.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replace the contents with an independent copy of `items` (reorder).
    pub fn replace_with(&mut self, items: &[CartItem]) {
        self.items = items.to_vec();
    }

    /// Sum of price times quantity.
    pub fn subtotal(&self) -> f64 {
        subtotal(&self.items)
    }

    pub fn total(&self, config: &StorefrontConfig) -> f64 {
        settlement_total(&self.items, config)
    }
}

pub fn subtotal(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::line_total).sum()
}

/// `subtotal x tax multiplier + flat fee`, rounded to whole rupees.
pub fn settlement_total(items: &[CartItem], config: &StorefrontConfig) -> f64 {
    (subtotal(items) * config.tax_multiplier + config.flat_fee).round()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
