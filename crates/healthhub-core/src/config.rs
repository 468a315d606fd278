//! Storefront configuration.
//!
//! Defaults match the live storefront; every value can be overridden through
//! `HEALTHHUB_*` environment variables.

use std::time::Duration;

use crate::models::FulfillmentType;

/// Tunables for pricing, settlement and staff identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    /// Multiplier applied to the cart subtotal (tax-equivalent surcharge)
    pub tax_multiplier: f64,
    /// Flat fee added after the multiplier
    pub flat_fee: f64,
    /// Simulated payment settlement latency
    pub settlement_delay: Duration,
    /// Identifier written on staff audit entries and dispensed orders
    pub staff_id: String,
    /// Name stamped on orders placed from this profile
    pub customer_name: String,
    /// Stock level below which a product counts as low stock
    pub low_stock_threshold: u32,
    pub delivery_estimate: String,
    pub takeaway_estimate: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            tax_multiplier: 1.12,
            flat_fee: 50.0,
            settlement_delay: Duration::from_millis(1500),
            staff_id: "STF- Sarah V.".to_string(),
            customer_name: "Arjun Sharma".to_string(),
            low_stock_threshold: 50,
            delivery_estimate: "35 mins".to_string(),
            takeaway_estimate: "Ready in 10 mins".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Defaults overridden by any `HEALTHHUB_*` variables that are set and parse.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tax_multiplier: env_f64("HEALTHHUB_TAX_MULTIPLIER", defaults.tax_multiplier),
            flat_fee: env_f64("HEALTHHUB_FLAT_FEE", defaults.flat_fee),
            settlement_delay: Duration::from_millis(env_u64(
                "HEALTHHUB_SETTLEMENT_DELAY_MS",
                defaults.settlement_delay.as_millis() as u64,
            )),
            staff_id: env_string("HEALTHHUB_STAFF_ID", defaults.staff_id),
            customer_name: env_string("HEALTHHUB_CUSTOMER_NAME", defaults.customer_name),
            low_stock_threshold: env_u64(
                "HEALTHHUB_LOW_STOCK_THRESHOLD",
                u64::from(defaults.low_stock_threshold),
            )
            .try_into()
            .unwrap_or(defaults.low_stock_threshold),
            delivery_estimate: env_string("HEALTHHUB_DELIVERY_ESTIMATE", defaults.delivery_estimate),
            takeaway_estimate: env_string("HEALTHHUB_TAKEAWAY_ESTIMATE", defaults.takeaway_estimate),
        }
    }

    /// Estimate string shown on a freshly placed order.
    pub fn estimate_for(&self, fulfillment: FulfillmentType) -> &str {
        match fulfillment {
            FulfillmentType::Delivery => &self.delivery_estimate,
            FulfillmentType::Takeaway => &self.takeaway_estimate,
        }
    }
}

fn env_string(name: &str, default: String) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(default)
}
