//! Tracking timeline shown on the order dashboard.

use serde::{Deserialize, Serialize};

use crate::models::OrderStatus;

/// Step labels in display order.
pub const TIMELINE_LABELS: [&str; 4] = ["Received", "Verified", "Dispatched", "Delivered"];

/// Rendering state of one timeline step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Completed,
    Current,
    Pending,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TimelineStep {
    pub label: &'static str,
    pub state: StepState,
}

/// Either the four-step progress bar or the cancelled banner.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "steps", rename_all = "snake_case")]
pub enum Timeline {
    Cancelled,
    Steps([TimelineStep; 4]),
}

impl Timeline {
    /// Index of the current step, if any.
    pub fn current_step(&self) -> Option<usize> {
        match self {
            Timeline::Cancelled => None,
            Timeline::Steps(steps) => steps.iter().position(|s| s.state == StepState::Current),
        }
    }
}

/// Step the status belongs to. `confirmed` and `packed` both sit on "Verified".
fn step_index(status: OrderStatus) -> Option<usize> {
    match status {
        OrderStatus::PrescriptionPending => Some(0),
        OrderStatus::Confirmed | OrderStatus::Packed => Some(1),
        OrderStatus::OutForDelivery => Some(2),
        OrderStatus::Delivered => Some(3),
        OrderStatus::Cancelled => None,
    }
}

/// State of step `index` for an order currently at `status`.
pub fn step_state(status: OrderStatus, index: usize) -> Option<StepState> {
    let current = step_index(status)?;
    Some(if index < current {
        StepState::Completed
    } else if index == current {
        StepState::Current
    } else {
        StepState::Pending
    })
}

/// Build the timeline for a status. Exactly one step is current.
pub fn timeline_for(status: OrderStatus) -> Timeline {
    if step_index(status).is_none() {
        return Timeline::Cancelled;
    }

    let steps = std::array::from_fn(|index| TimelineStep {
        label: TIMELINE_LABELS[index],
        state: step_state(status, index).unwrap_or(StepState::Pending),
    });
    Timeline::Steps(steps)
}
