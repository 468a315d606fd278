//! Checkout as an explicit, cancellable, non-reentrant task.
//!
//! ```text
//! begin_checkout ──► PendingCheckout ──settle()──► SettledCheckout ──► complete_checkout
//!   (snapshot cart,         (awaits settlement delay,            (order appended,
//!    take processing flag)   aborts on cancel)                    cart cleared)
//! ```
//!
//! The processing flag is held by the pending/settled value and released when it
//! is dropped, so an abandoned or cancelled checkout never blocks the next one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cart::settlement_total;
use crate::config::StorefrontConfig;
use crate::db::DbError;
use crate::ids;
use crate::models::{CartItem, FulfillmentType, Order, OrderStatus, PaymentMethod};

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("A checkout is already being processed")]
    AlreadyProcessing,

    #[error("Checkout was cancelled before settlement")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Choices made on the checkout screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckoutRequest {
    pub fulfillment: FulfillmentType,
    pub payment_method: PaymentMethod,
    pub auto_refill: bool,
}

/// Shared "payment processing" flag. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CheckoutGate {
    processing: Arc<AtomicBool>,
}

impl CheckoutGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a checkout currently holds the flag (submit control disabled).
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    fn try_acquire(&self) -> Option<ProcessingGuard> {
        self.processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ProcessingGuard {
                flag: Arc::clone(&self.processing),
            })
    }
}

#[derive(Debug)]
struct ProcessingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// A checkout that has been submitted but not yet settled.
#[derive(Debug)]
pub struct PendingCheckout {
    request: CheckoutRequest,
    items: Vec<CartItem>,
    total: f64,
    delay: Duration,
    guard: ProcessingGuard,
}

impl PendingCheckout {
    /// Take the processing flag and snapshot the cart.
    pub fn begin(
        gate: &CheckoutGate,
        items: &[CartItem],
        request: CheckoutRequest,
        config: &StorefrontConfig,
    ) -> CheckoutResult<Self> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let guard = gate.try_acquire().ok_or(CheckoutError::AlreadyProcessing)?;

        let total = settlement_total(items, config);
        debug!(lines = items.len(), total, "Checkout started");

        Ok(Self {
            request,
            items: items.to_vec(),
            total,
            delay: config.settlement_delay,
            guard,
        })
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Wait out the settlement delay unless `cancel` fires first.
    pub async fn settle(self, cancel: &CancellationToken) -> CheckoutResult<SettledCheckout> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(total = self.total, "Checkout cancelled during settlement");
                Err(CheckoutError::Cancelled)
            }
            _ = tokio::time::sleep(self.delay) => Ok(SettledCheckout {
                request: self.request,
                items: self.items,
                total: self.total,
                _guard: self.guard,
            }),
        }
    }
}

/// Payment settled; ready to become an order.
#[derive(Debug)]
pub struct SettledCheckout {
    request: CheckoutRequest,
    items: Vec<CartItem>,
    total: f64,
    _guard: ProcessingGuard,
}

impl SettledCheckout {
    /// Materialise the order. The processing flag is released when `self` drops.
    pub fn into_order(self, config: &StorefrontConfig) -> Order {
        Order {
            id: ids::order_id(),
            items: self.items,
            total: self.total,
            status: OrderStatus::Confirmed,
            fulfillment: self.request.fulfillment,
            date: chrono::Utc::now().to_rfc3339(),
            customer_name: config.customer_name.clone(),
            payment_method: self.request.payment_method,
            auto_refill: self.request.auto_refill,
            delivery_estimate: Some(config.estimate_for(self.request.fulfillment).to_string()),
            dispensed_by: None,
        }
    }
}
