//! Application state container.
//!
//! `Storefront` owns every piece of session state and is the single
//! persistence boundary: persisted keys are read once at open and each
//! mutation writes its key straight through. Customer and staff code paths get
//! separate capability views over the same state:
//!
//! - [`Storefront::customer`] → [`CustomerActions`]: cart, place order, reorder
//! - [`Storefront::staff`] → [`StaffConsole`]: status changes, dispensing, audit

use std::path::Path;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::audit::AuditTrail;
use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::checkout::{CheckoutGate, CheckoutRequest, CheckoutResult, PendingCheckout, SettledCheckout};
use crate::config::StorefrontConfig;
use crate::console::{StaffConsole, VendorRegistry};
use crate::db::{Database, DbError, DbResult};
use crate::models::{
    AuditAction, AuditLog, AuthState, Language, Order, OrderStatus, Product, PurchaseOrder, Role,
    ViewState,
};
use crate::store::{DisplayPreferences, PreferenceStore};

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product {0} is under recall")]
    ProductRecalled(String),
}

pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Screen actually shown when `view` is requested.
fn landing_view(view: ViewState, cart_empty: bool, has_product: bool) -> ViewState {
    match view {
        ViewState::Checkout if cart_empty => ViewState::Cart,
        ViewState::ProductDetails if !has_product => ViewState::Shop,
        other => other,
    }
}

pub struct Storefront {
    pub(crate) db: Database,
    pub(crate) config: StorefrontConfig,
    view: ViewState,
    display: DisplayPreferences,
    auth: AuthState,
    remembered_email: Option<String>,
    pub(crate) cart: Cart,
    pub(crate) orders: Vec<Order>,
    pub(crate) audit: AuditTrail,
    selected_order: Option<String>,
    selected_product: Option<String>,
    gate: CheckoutGate,
    pub(crate) vendors: VendorRegistry,
    pub(crate) purchase_orders: Vec<PurchaseOrder>,
}

impl Storefront {
    /// Open (or create) the profile database at `path`.
    pub fn open<P: AsRef<Path>>(path: P, config: StorefrontConfig) -> StorefrontResult<Self> {
        Self::load(Database::open(path)?, config)
    }

    /// Fresh, empty profile.
    pub fn open_in_memory(config: StorefrontConfig) -> StorefrontResult<Self> {
        Self::load(Database::open_in_memory()?, config)
    }

    /// Read every persisted key once.
    pub fn load(db: Database, config: StorefrontConfig) -> StorefrontResult<Self> {
        let store = PreferenceStore::new(&db);
        // The cart and product selection are not persisted.
        let saved_view = store.last_view()?;
        let view = landing_view(saved_view, true, false);
        if view != saved_view {
            store.set_last_view(view)?;
        }
        let display = store.display()?;
        let auth = store.auth()?;
        let remembered_email = store.remembered_email()?;
        let orders = store.orders()?;
        let audit = AuditTrail::from_entries(store.audit_logs()?);

        info!(
            view = view.as_str(),
            orders = orders.len(),
            audit_entries = audit.len(),
            logged_in = auth.is_logged_in,
            "Storefront loaded"
        );

        Ok(Self {
            db,
            config,
            view,
            display,
            auth,
            remembered_email,
            cart: Cart::new(),
            orders,
            audit,
            selected_order: None,
            selected_product: None,
            gate: CheckoutGate::new(),
            vendors: VendorRegistry::default(),
            purchase_orders: Vec::new(),
        })
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub(crate) fn store(&self) -> PreferenceStore<'_> {
        PreferenceStore::new(&self.db)
    }

    // =========================================================================
    // Capability views
    // =========================================================================

    pub fn customer(&mut self) -> CustomerActions<'_> {
        CustomerActions { storefront: self }
    }

    pub fn staff(&mut self) -> StaffConsole<'_> {
        StaffConsole::new(self)
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.db)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Switch screens and remember the choice.
    ///
    /// Checkout is only reachable with a non-empty cart; otherwise the cart
    /// screen is shown.
    pub fn navigate(&mut self, view: ViewState) -> DbResult<ViewState> {
        let target = landing_view(
            view,
            self.cart.is_empty(),
            self.selected_product.is_some(),
        );

        self.store().set_last_view(target)?;
        debug!(from = self.view.as_str(), to = target.as_str(), "Navigate");
        self.view = target;
        Ok(target)
    }

    /// Open the product details screen.
    pub fn select_product(&mut self, product_id: &str) -> StorefrontResult<Product> {
        let product = self
            .db
            .get_product(product_id)?
            .ok_or_else(|| StorefrontError::ProductNotFound(product_id.to_string()))?;
        self.selected_product = Some(product.id.clone());
        self.navigate(ViewState::ProductDetails)?;
        Ok(product)
    }

    pub fn selected_product(&self) -> Option<&str> {
        self.selected_product.as_deref()
    }

    pub fn selected_order(&self) -> Option<&Order> {
        let id = self.selected_order.as_deref()?;
        self.order(id)
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Mark the session logged in and land on the role's dashboard.
    ///
    /// No credentials are checked. Staff logins are audited.
    pub fn login(&mut self, role: Role) -> DbResult<ViewState> {
        let auth = AuthState::logged_in(role);
        self.store().set_auth(&auth)?;
        self.auth = auth;

        if role == Role::Staff {
            let staff_id = self.config.staff_id.clone();
            self.audit
                .record(AuditAction::Login, &staff_id, "SESSION", "Staff console login");
            self.persist_audit()?;
        }

        info!(role = role.as_str(), "Logged in");
        self.navigate(role.dashboard())
    }

    /// Forget the session and return home.
    pub fn sign_out(&mut self) -> DbResult<ViewState> {
        self.store().clear_auth()?;
        self.auth = AuthState::default();
        info!("Signed out");
        self.navigate(ViewState::Home)
    }

    pub fn remembered_email(&self) -> Option<&str> {
        self.remembered_email.as_deref()
    }

    /// Persist or forget the login prefill.
    pub fn remember_email(&mut self, email: Option<&str>) -> DbResult<()> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        self.store().set_remembered_email(email)?;
        self.remembered_email = email.map(str::to_string);
        Ok(())
    }

    // =========================================================================
    // Display preferences
    // =========================================================================

    pub fn display(&self) -> DisplayPreferences {
        self.display
    }

    pub fn set_large_font(&mut self, enabled: bool) -> DbResult<()> {
        self.store().set_large_font(enabled)?;
        self.display.large_font = enabled;
        Ok(())
    }

    pub fn set_assisted_mode(&mut self, enabled: bool) -> DbResult<()> {
        self.store().set_assisted_mode(enabled)?;
        self.display.assisted_mode = enabled;
        Ok(())
    }

    pub fn set_accessibility(&mut self, enabled: bool) -> DbResult<()> {
        self.store().set_accessibility(enabled)?;
        self.display.accessibility = enabled;
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) -> DbResult<()> {
        self.store().set_language(language)?;
        self.display.language = language;
        Ok(())
    }

    // =========================================================================
    // Orders and audit (read side)
    // =========================================================================

    /// Order history, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    pub fn audit_logs(&self) -> &[AuditLog] {
        self.audit.entries()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn purchase_orders(&self) -> &[PurchaseOrder] {
        &self.purchase_orders
    }

    pub fn vendors(&self) -> &VendorRegistry {
        &self.vendors
    }

    pub(crate) fn persist_orders(&self) -> DbResult<()> {
        self.store().set_orders(&self.orders)
    }

    pub(crate) fn persist_audit(&self) -> DbResult<()> {
        self.store().set_audit_logs(self.audit.entries())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Whether a checkout is mid-settlement.
    pub fn is_processing_checkout(&self) -> bool {
        self.gate.is_processing()
    }

    /// Snapshot the cart and take the processing flag.
    ///
    /// Borrows immutably so callers can release a lock while settlement runs.
    pub fn begin_checkout(&self, request: CheckoutRequest) -> CheckoutResult<PendingCheckout> {
        PendingCheckout::begin(&self.gate, self.cart.items(), request, &self.config)
    }

    /// Append the settled order, clear the cart and show the order history.
    pub fn complete_checkout(&mut self, settled: SettledCheckout) -> CheckoutResult<Order> {
        let order = settled.into_order(&self.config);
        self.orders.insert(0, order.clone());
        self.persist_orders()?;
        self.cart.clear();
        self.navigate(ViewState::UserDashboard)?;

        info!(
            order_id = %order.id,
            total = order.total,
            units = order.unit_count(),
            "Order placed"
        );
        Ok(order)
    }

    /// Wipe every persisted key and reset in-memory session state.
    pub fn clear_profile(&mut self) -> DbResult<()> {
        self.store().clear()?;
        self.view = ViewState::default();
        self.display = DisplayPreferences::default();
        self.auth = AuthState::default();
        self.remembered_email = None;
        self.cart.clear();
        self.orders.clear();
        self.audit = AuditTrail::new();
        self.selected_order = None;
        self.selected_product = None;
        info!("Profile cleared");
        Ok(())
    }
}

/// Customer-side operations: cart, checkout, reorder and order tracking.
pub struct CustomerActions<'a> {
    storefront: &'a mut Storefront,
}

impl<'a> CustomerActions<'a> {
    pub fn cart(&self) -> &Cart {
        &self.storefront.cart
    }

    /// Add one unit of `product` and show the cart.
    pub fn add_to_cart(&mut self, product: Product) -> DbResult<u32> {
        let quantity = self.storefront.cart.add(product);
        self.storefront.navigate(ViewState::Cart)?;
        Ok(quantity)
    }

    /// Look up a catalog product and add it. Recalled products are refused.
    pub fn add_product_by_id(&mut self, product_id: &str) -> StorefrontResult<u32> {
        let product = self
            .storefront
            .db
            .get_product(product_id)?
            .ok_or_else(|| StorefrontError::ProductNotFound(product_id.to_string()))?;
        if product.is_recalled() {
            return Err(StorefrontError::ProductRecalled(product.id));
        }
        Ok(self.add_to_cart(product)?)
    }

    pub fn update_quantity(&mut self, product_id: &str, delta: i64) -> Option<u32> {
        self.storefront.cart.update_quantity(product_id, delta)
    }

    pub fn remove_from_cart(&mut self, product_id: &str) -> bool {
        self.storefront.cart.remove(product_id)
    }

    /// Run the whole checkout: begin, settle, complete.
    pub async fn place_order(
        &mut self,
        request: CheckoutRequest,
        cancel: &CancellationToken,
    ) -> CheckoutResult<Order> {
        let pending = self.storefront.begin_checkout(request)?;
        let settled = pending.settle(cancel).await?;
        self.storefront.complete_checkout(settled)
    }

    /// Refill the cart with a copy of a past order's items and show the cart.
    pub fn reorder(&mut self, order_id: &str) -> StorefrontResult<()> {
        let order = self
            .storefront
            .order(order_id)
            .ok_or_else(|| StorefrontError::OrderNotFound(order_id.to_string()))?;
        let items = order.items.clone();

        self.storefront.cart.replace_with(&items);
        self.storefront.navigate(ViewState::Cart)?;
        info!(order_id, lines = items.len(), "Reorder copied into cart");
        Ok(())
    }

    /// Select an order: delivered orders open the smart-pack view, others the
    /// tracking dashboard.
    pub fn view_order(&mut self, order_id: &str) -> StorefrontResult<ViewState> {
        let status = self
            .storefront
            .order(order_id)
            .map(|o| o.status)
            .ok_or_else(|| StorefrontError::OrderNotFound(order_id.to_string()))?;

        self.storefront.selected_order = Some(order_id.to_string());
        let target = if status == OrderStatus::Delivered {
            ViewState::SmartPack
        } else {
            ViewState::UserDashboard
        };
        Ok(self.storefront.navigate(target)?)
    }

    pub fn orders(&self) -> &[Order] {
        &self.storefront.orders
    }

    /// Orders still moving through fulfilment.
    pub fn active_orders(&self) -> impl Iterator<Item = &Order> {
        self.storefront
            .orders
            .iter()
            .filter(|o| crate::lifecycle::is_active(o.status))
    }
}
