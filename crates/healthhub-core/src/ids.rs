//! Short display identifiers.

/// Nine upper-case alphanumeric characters drawn from a fresh v4 UUID.
pub fn short_token() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect::<String>()
        .to_uppercase()
}

/// Order identifier, e.g. `TRX-4A7F09C2E`.
pub fn order_id() -> String {
    format!("TRX-{}", short_token())
}

/// Purchase order identifier, e.g. `PO-4A7F09C2E`.
pub fn purchase_order_id() -> String {
    format!("PO-{}", short_token())
}
