//! HealthHub Core Library
//!
//! Local-first pharmacy storefront and staff console.
//!
//! # Architecture
//!
//! ```text
//!   Shop / Catalog ──► Cart ──► Checkout ──(settle 1.5s, cancellable)──► Order (confirmed)
//!                                                                          │
//!                                                       ┌──────────────────┘
//!                                                       ▼
//!            Staff Console ── advance_status / dispense ──► Order lifecycle
//!                   │                                            │
//!                   └────────────► Audit trail ◄─────────────────┘
//!                                       │
//!                     Preference store (one SQLite file per profile)
//! ```
//!
//! # Core Principle
//!
//! **Every state change writes straight through.** Persisted keys are read once
//! at open; there is no batching and no background sync.
//!
//! # Modules
//!
//! - [`db`]: SQLite layer (preferences key-value table, product catalog)
//! - [`models`]: Domain types (Product, Order, AuditLog, Vendor, ViewState, ...)
//! - [`store`]: Typed preference store with corrupt-value recovery
//! - [`lifecycle`]: Order status transitions and tracking timeline
//! - [`cart`] / [`checkout`]: Cart pricing and the settlement task
//! - [`storefront`]: Application state container and customer actions
//! - [`console`]: Staff console (queues, dispensing, vendors, inventory)
//! - [`catalog`]: Substring search plus fuzzy suggestions
//! - [`export`]: Audit and sales exports

pub mod audit;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod console;
pub mod db;
pub mod export;
pub mod ids;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod store;
pub mod storefront;

// Re-export commonly used types
pub use audit::AuditTrail;
pub use cart::{settlement_total, Cart};
pub use catalog::{Catalog, Suggestion};
pub use checkout::{CheckoutError, CheckoutGate, CheckoutRequest, PendingCheckout, SettledCheckout};
pub use config::StorefrontConfig;
pub use console::{ConsoleError, OverviewStats, StaffConsole, VendorForm, VendorRegistry};
pub use db::Database;
pub use lifecycle::{can_transition, timeline_for, StepState, Timeline, TransitionError};
pub use models::{
    AuditAction, AuditLog, AuthState, CartItem, FulfillmentType, Language, Order, OrderStatus,
    PaymentMethod, Product, ProductCategory, Role, ViewState,
};
pub use store::PreferenceStore;
pub use storefront::{CustomerActions, Storefront, StorefrontError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HealthHubError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transition rejected: {0}")]
    TransitionRejected(String),

    #[error("Checkout error: {0}")]
    CheckoutFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

impl From<db::DbError> for HealthHubError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => HealthHubError::NotFound(what),
            other => HealthHubError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for HealthHubError {
    fn from(e: serde_json::Error) -> Self {
        HealthHubError::SerializationError(e.to_string())
    }
}

impl From<StorefrontError> for HealthHubError {
    fn from(e: StorefrontError) -> Self {
        match e {
            StorefrontError::Database(e) => e.into(),
            StorefrontError::OrderNotFound(_) | StorefrontError::ProductNotFound(_) => {
                HealthHubError::NotFound(e.to_string())
            }
            StorefrontError::ProductRecalled(_) => HealthHubError::InvalidInput(e.to_string()),
        }
    }
}

impl From<ConsoleError> for HealthHubError {
    fn from(e: ConsoleError) -> Self {
        match e {
            ConsoleError::Database(e) => e.into(),
            ConsoleError::Transition(e) => HealthHubError::TransitionRejected(e.to_string()),
            ConsoleError::InvalidInput(msg) => HealthHubError::InvalidInput(msg),
            ConsoleError::OrderNotFound(_)
            | ConsoleError::ProductNotFound(_)
            | ConsoleError::VendorNotFound(_) => HealthHubError::NotFound(e.to_string()),
        }
    }
}

impl From<CheckoutError> for HealthHubError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Database(e) => e.into(),
            other => HealthHubError::CheckoutFailed(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for HealthHubError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HealthHubError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a storefront profile at the given path.
#[uniffi::export]
pub fn open_storefront(path: String) -> Result<Arc<HealthHubCore>, HealthHubError> {
    let storefront = Storefront::open(&path, StorefrontConfig::from_env())?;
    HealthHubCore::new(storefront)
}

/// Create an in-memory profile (for testing).
#[uniffi::export]
pub fn open_storefront_in_memory() -> Result<Arc<HealthHubCore>, HealthHubError> {
    let storefront = Storefront::open_in_memory(StorefrontConfig::default())?;
    HealthHubCore::new(storefront)
}

/// Install the tracing subscriber. Returns false if one was already installed.
#[uniffi::export]
pub fn enable_logging(filter: Option<String>) -> bool {
    logging::init_logging(filter.as_deref())
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe storefront wrapper for FFI.
#[derive(uniffi::Object)]
pub struct HealthHubCore {
    storefront: Mutex<Storefront>,
    runtime: tokio::runtime::Runtime,
    checkout_cancel: Mutex<Option<CancellationToken>>,
}

impl HealthHubCore {
    fn new(storefront: Storefront) -> Result<Arc<Self>, HealthHubError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| HealthHubError::RuntimeError(e.to_string()))?;

        Ok(Arc::new(Self {
            storefront: Mutex::new(storefront),
            runtime,
            checkout_cancel: Mutex::new(None),
        }))
    }
}

#[uniffi::export]
impl HealthHubCore {
    // =========================================================================
    // Navigation and Session
    // =========================================================================

    /// Current screen name (e.g. "user-dashboard").
    pub fn current_view(&self) -> Result<String, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.view().as_str().to_string())
    }

    /// Switch screens. Returns the screen actually shown.
    pub fn navigate(&self, view: String) -> Result<String, HealthHubError> {
        let target = parse_view(&view)?;
        let mut sf = self.storefront.lock()?;
        Ok(sf.navigate(target)?.as_str().to_string())
    }

    pub fn is_logged_in(&self) -> Result<bool, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.auth().is_logged_in)
    }

    /// Log in as "user" or "staff". Returns the landing screen.
    pub fn login(&self, role: String) -> Result<String, HealthHubError> {
        let role = Role::parse(&role)
            .ok_or_else(|| HealthHubError::InvalidInput(format!("Unknown role: {}", role)))?;
        let mut sf = self.storefront.lock()?;
        Ok(sf.login(role)?.as_str().to_string())
    }

    pub fn sign_out(&self) -> Result<String, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.sign_out()?.as_str().to_string())
    }

    pub fn remembered_email(&self) -> Result<Option<String>, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.remembered_email().map(str::to_string))
    }

    pub fn remember_email(&self, email: Option<String>) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.remember_email(email.as_deref())?;
        Ok(())
    }

    // =========================================================================
    // Display Preferences
    // =========================================================================

    pub fn display_preferences(&self) -> Result<FfiDisplayPreferences, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.display().into())
    }

    pub fn set_large_font(&self, enabled: bool) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.set_large_font(enabled)?;
        Ok(())
    }

    pub fn set_assisted_mode(&self, enabled: bool) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.set_assisted_mode(enabled)?;
        Ok(())
    }

    pub fn set_accessibility(&self, enabled: bool) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.set_accessibility(enabled)?;
        Ok(())
    }

    /// Set the UI language ("en" or "hi").
    pub fn set_language(&self, language: String) -> Result<(), HealthHubError> {
        let language = Language::parse(&language).ok_or_else(|| {
            HealthHubError::InvalidInput(format!("Unknown language: {}", language))
        })?;
        let mut sf = self.storefront.lock()?;
        sf.set_language(language)?;
        Ok(())
    }

    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a catalog product.
    pub fn upsert_product(&self, product: FfiProduct) -> Result<(), HealthHubError> {
        let sf = self.storefront.lock()?;
        let product: Product = product.try_into()?;
        sf.database().upsert_product(&product)?;
        Ok(())
    }

    pub fn get_product(&self, product_id: String) -> Result<Option<FfiProduct>, HealthHubError> {
        let sf = self.storefront.lock()?;
        let product = sf.catalog().get(&product_id)?;
        Ok(product.map(|p| p.into()))
    }

    /// Search by name or ingredient, falling back to fuzzy suggestions.
    pub fn search_products(&self, query: String) -> Result<Vec<FfiProduct>, HealthHubError> {
        let sf = self.storefront.lock()?;
        let products = sf.catalog().search_or_suggest(&query)?;
        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// Generic substitutes for a product.
    pub fn product_alternatives(
        &self,
        product_id: String,
    ) -> Result<Vec<FfiProduct>, HealthHubError> {
        let sf = self.storefront.lock()?;
        let products = sf.catalog().alternatives(&product_id)?;
        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Cart and Checkout
    // =========================================================================

    pub fn cart(&self) -> Result<FfiCartSummary, HealthHubError> {
        let sf = self.storefront.lock()?;
        let cart = sf.cart();
        Ok(FfiCartSummary {
            items: cart.items().iter().cloned().map(|i| i.into()).collect(),
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            total: cart.total(sf.config()),
        })
    }

    /// Add one unit of a catalog product. Returns the line's quantity.
    pub fn add_to_cart(&self, product_id: String) -> Result<u32, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.customer().add_product_by_id(&product_id)?)
    }

    pub fn update_cart_quantity(
        &self,
        product_id: String,
        delta: i64,
    ) -> Result<Option<u32>, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.customer().update_quantity(&product_id, delta))
    }

    pub fn remove_from_cart(&self, product_id: String) -> Result<bool, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.customer().remove_from_cart(&product_id))
    }

    /// Place an order from the cart. Blocks for the settlement delay; the
    /// storefront lock is released while waiting.
    pub fn place_order(
        &self,
        fulfillment: String,
        payment_method: String,
        auto_refill: bool,
    ) -> Result<FfiOrder, HealthHubError> {
        let request = CheckoutRequest {
            fulfillment: FulfillmentType::parse(&fulfillment).ok_or_else(|| {
                HealthHubError::InvalidInput(format!("Unknown fulfillment type: {}", fulfillment))
            })?,
            payment_method: PaymentMethod::parse(&payment_method).ok_or_else(|| {
                HealthHubError::InvalidInput(format!("Unknown payment method: {}", payment_method))
            })?,
            auto_refill,
        };

        let pending = self.storefront.lock()?.begin_checkout(request)?;

        let cancel = CancellationToken::new();
        *self.checkout_cancel.lock()? = Some(cancel.clone());
        let settled = self.runtime.block_on(pending.settle(&cancel));
        *self.checkout_cancel.lock()? = None;

        let order = self.storefront.lock()?.complete_checkout(settled?)?;
        Ok(order.into())
    }

    /// Abort an in-flight checkout. Returns whether one was running.
    pub fn cancel_checkout(&self) -> Result<bool, HealthHubError> {
        let cancel = self.checkout_cancel.lock()?;
        match cancel.as_ref() {
            Some(token) => {
                token.cancel();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_processing_checkout(&self) -> Result<bool, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.is_processing_checkout())
    }

    // =========================================================================
    // Order History
    // =========================================================================

    /// Order history, newest first.
    pub fn orders(&self) -> Result<Vec<FfiOrder>, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.orders().iter().cloned().map(|o| o.into()).collect())
    }

    pub fn reorder(&self, order_id: String) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.customer().reorder(&order_id)?;
        Ok(())
    }

    /// Open an order. Returns the screen shown.
    pub fn view_order(&self, order_id: String) -> Result<String, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.customer().view_order(&order_id)?.as_str().to_string())
    }

    pub fn order_timeline(&self, order_id: String) -> Result<FfiTimeline, HealthHubError> {
        let sf = self.storefront.lock()?;
        let order = sf
            .order(&order_id)
            .ok_or_else(|| HealthHubError::NotFound(format!("order {}", order_id)))?;
        Ok(timeline_for(order.status).into())
    }

    // =========================================================================
    // Staff Console
    // =========================================================================

    pub fn advance_order_status(
        &self,
        order_id: String,
        status: String,
    ) -> Result<FfiOrder, HealthHubError> {
        let status = OrderStatus::parse(&status)
            .ok_or_else(|| HealthHubError::InvalidInput(format!("Unknown status: {}", status)))?;
        let mut sf = self.storefront.lock()?;
        Ok(sf.staff().advance_status(&order_id, status)?.into())
    }

    pub fn dispense_order(&self, order_id: String) -> Result<FfiOrder, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.staff().dispense(&order_id)?.into())
    }

    pub fn staff_overview(&self) -> Result<FfiOverview, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        let stats = sf.staff().overview()?;
        Ok(stats.into())
    }

    pub fn restock_product(&self, product_id: String, quantity: u32) -> Result<u32, HealthHubError> {
        let mut sf = self.storefront.lock()?;
        Ok(sf.staff().restock(&product_id, quantity)?)
    }

    pub fn void_recalled_product(
        &self,
        product_id: String,
        reason: String,
    ) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.staff().void_recalled(&product_id, &reason)?;
        Ok(())
    }

    /// Audit trail, newest first.
    pub fn audit_logs(&self) -> Result<Vec<FfiAuditLog>, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(sf.audit_logs().iter().cloned().map(|e| e.into()).collect())
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    pub fn export_audit_json(&self) -> Result<String, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(export::AuditExport::new(sf.audit_logs()).to_json()?)
    }

    pub fn export_audit_csv(&self) -> Result<String, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(export::AuditExport::new(sf.audit_logs()).to_csv())
    }

    pub fn export_sales_json(&self) -> Result<String, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(export::SalesLedger::from_orders(sf.orders()).to_json()?)
    }

    pub fn export_sales_csv(&self) -> Result<String, HealthHubError> {
        let sf = self.storefront.lock()?;
        Ok(export::SalesLedger::from_orders(sf.orders()).to_csv())
    }

    /// Wipe the profile (sign-out, history, preferences).
    pub fn clear_profile(&self) -> Result<(), HealthHubError> {
        let mut sf = self.storefront.lock()?;
        sf.clear_profile()?;
        Ok(())
    }
}

fn parse_view(view: &str) -> Result<ViewState, HealthHubError> {
    ViewState::parse(view)
        .ok_or_else(|| HealthHubError::InvalidInput(format!("Unknown view: {}", view)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe product.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProduct {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub active_ingredient: String,
    pub category: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub stock: u32,
    pub requires_prescription: bool,
    pub expiry_date: String,
    pub batch_number: String,
    pub rating: f64,
    pub is_recalled: bool,
}

impl From<Product> for FfiProduct {
    fn from(product: Product) -> Self {
        Self {
            is_recalled: product.is_recalled(),
            id: product.id,
            name: product.name,
            brand: product.brand,
            active_ingredient: product.active_ingredient,
            category: product.category.as_str().to_string(),
            price: product.price,
            description: product.description,
            image: product.image,
            stock: product.stock,
            requires_prescription: product.requires_prescription,
            expiry_date: product.expiry_date,
            batch_number: product.batch_number,
            rating: product.rating,
        }
    }
}

impl TryFrom<FfiProduct> for Product {
    type Error = HealthHubError;

    fn try_from(product: FfiProduct) -> Result<Self, Self::Error> {
        let category = ProductCategory::parse(&product.category).ok_or_else(|| {
            HealthHubError::InvalidInput(format!("Unknown category: {}", product.category))
        })?;

        Ok(Product {
            id: product.id,
            name: product.name,
            brand: product.brand,
            active_ingredient: product.active_ingredient,
            category,
            price: product.price,
            description: product.description,
            image: product.image,
            stock: product.stock,
            requires_prescription: product.requires_prescription,
            expiry_date: product.expiry_date,
            batch_number: product.batch_number,
            rating: product.rating,
            contraindications: Vec::new(),
            dosage_guidelines: None,
            side_effects: Vec::new(),
            recall_status: None,
        })
    }
}

/// FFI-safe cart line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub line_total: f64,
}

impl From<CartItem> for FfiCartItem {
    fn from(item: CartItem) -> Self {
        Self {
            line_total: item.line_total(),
            product_id: item.product.id,
            name: item.product.name,
            unit_price: item.product.price,
            quantity: item.quantity,
        }
    }
}

/// FFI-safe cart summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCartSummary {
    pub items: Vec<FfiCartItem>,
    pub item_count: u32,
    pub subtotal: f64,
    /// Settlement total (tax multiplier and flat fee applied)
    pub total: f64,
}

/// FFI-safe order.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOrder {
    pub id: String,
    pub items: Vec<FfiCartItem>,
    pub total: f64,
    pub status: String,
    pub fulfillment: String,
    pub date: String,
    pub customer_name: String,
    pub payment_method: String,
    pub auto_refill: bool,
    pub delivery_estimate: Option<String>,
    pub dispensed_by: Option<String>,
}

impl From<Order> for FfiOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            items: order.items.into_iter().map(|i| i.into()).collect(),
            total: order.total,
            status: order.status.as_str().to_string(),
            fulfillment: order.fulfillment.as_str().to_string(),
            date: order.date,
            customer_name: order.customer_name,
            payment_method: order.payment_method.as_str().to_string(),
            auto_refill: order.auto_refill,
            delivery_estimate: order.delivery_estimate,
            dispensed_by: order.dispensed_by,
        }
    }
}

/// FFI-safe timeline step.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimelineStep {
    pub label: String,
    /// "completed", "current" or "pending"
    pub state: String,
}

/// FFI-safe tracking timeline.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimeline {
    pub cancelled: bool,
    pub steps: Vec<FfiTimelineStep>,
}

impl From<Timeline> for FfiTimeline {
    fn from(timeline: Timeline) -> Self {
        match timeline {
            Timeline::Cancelled => Self {
                cancelled: true,
                steps: Vec::new(),
            },
            Timeline::Steps(steps) => Self {
                cancelled: false,
                steps: steps
                    .iter()
                    .map(|s| FfiTimelineStep {
                        label: s.label.to_string(),
                        state: match s.state {
                            StepState::Completed => "completed",
                            StepState::Current => "current",
                            StepState::Pending => "pending",
                        }
                        .to_string(),
                    })
                    .collect(),
            },
        }
    }
}

/// FFI-safe audit entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAuditLog {
    pub id: String,
    pub timestamp: String,
    pub action: String,
    pub staff_id: String,
    pub entity_id: String,
    pub details: String,
    pub security_hash: String,
}

impl From<AuditLog> for FfiAuditLog {
    fn from(entry: AuditLog) -> Self {
        Self {
            id: entry.id,
            timestamp: entry.timestamp,
            action: entry.action.as_str().to_string(),
            staff_id: entry.staff_id,
            entity_id: entry.entity_id,
            details: entry.details,
            security_hash: entry.security_hash,
        }
    }
}

/// FFI-safe console overview.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiOverview {
    pub pending_fulfilment: u32,
    pub awaiting_verification: u32,
    pub total_revenue: f64,
    pub low_stock_count: u32,
    pub active_vendors: u32,
    pub audit_entries: u32,
}

impl From<OverviewStats> for FfiOverview {
    fn from(stats: OverviewStats) -> Self {
        Self {
            pending_fulfilment: stats.pending_fulfilment as u32,
            awaiting_verification: stats.awaiting_verification as u32,
            total_revenue: stats.total_revenue,
            low_stock_count: stats.low_stock_count as u32,
            active_vendors: stats.active_vendors as u32,
            audit_entries: stats.audit_entries as u32,
        }
    }
}

/// FFI-safe display preferences.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDisplayPreferences {
    pub large_font: bool,
    pub assisted_mode: bool,
    pub accessibility: bool,
    pub language: String,
}

impl From<store::DisplayPreferences> for FfiDisplayPreferences {
    fn from(display: store::DisplayPreferences) -> Self {
        Self {
            large_font: display.large_font,
            assisted_mode: display.assisted_mode,
            accessibility: display.accessibility,
            language: display.language.as_str().to_string(),
        }
    }
}
