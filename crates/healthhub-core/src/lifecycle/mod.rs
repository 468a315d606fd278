//! Order status lifecycle.
//!
//! ```text
//! prescription_pending → confirmed → packed → out_for_delivery → delivered
//!          │                 │
//!          └──────┬──────────┘
//!                 ▼
//!             cancelled
//! ```
//!
//! Any forward jump is allowed (dispensing a confirmed order goes straight to
//! `delivered`). Nothing moves backward and nothing leaves a terminal state.

mod timeline;

pub use timeline::*;

use thiserror::Error;

use crate::models::{Order, OrderStatus};

/// Rejected status change. The order is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Order {order_id} cannot move from {from} to {to}")]
    NotPermitted {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },
}

/// Position in the forward progression. `None` for `cancelled`.
pub fn canonical_index(status: OrderStatus) -> Option<usize> {
    match status {
        OrderStatus::PrescriptionPending => Some(0),
        OrderStatus::Confirmed => Some(1),
        OrderStatus::Packed => Some(2),
        OrderStatus::OutForDelivery => Some(3),
        OrderStatus::Delivered => Some(4),
        OrderStatus::Cancelled => None,
    }
}

/// Whether `from -> to` is a legal staff transition.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    if is_terminal(from) {
        return false;
    }
    match (canonical_index(from), canonical_index(to)) {
        (Some(current), Some(target)) => target > current,
        (_, None) => matches!(
            from,
            OrderStatus::PrescriptionPending | OrderStatus::Confirmed
        ),
        (None, Some(_)) => false,
    }
}

/// `delivered` and `cancelled` accept no further transitions.
pub fn is_terminal(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Delivered | OrderStatus::Cancelled)
}

/// Orders the customer sees as "in progress" on the dashboard.
pub fn is_active(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Confirmed | OrderStatus::Packed | OrderStatus::OutForDelivery
    )
}

/// Human-readable status label for dashboards and exports.
pub fn status_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::PrescriptionPending => "Prescription Pending",
        OrderStatus::Confirmed => "Confirmed",
        OrderStatus::Packed => "Packed",
        OrderStatus::OutForDelivery => "Out for Delivery",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Cancelled => "Cancelled",
    }
}

/// Validate and apply a status change. Returns the previous status.
pub fn apply_transition(order: &mut Order, to: OrderStatus) -> Result<OrderStatus, TransitionError> {
    let from = order.status;
    if !can_transition(from, to) {
        return Err(TransitionError::NotPermitted {
            order_id: order.id.clone(),
            from,
            to,
        });
    }
    order.status = to;
    Ok(from)
}
