//! Persisted key names. These match the storefront's existing profile layout.

pub const LAST_VIEW: &str = "healthhub_last_view";
pub const LARGE_FONT: &str = "healthhub_large_font";
pub const ASSISTED_MODE: &str = "healthhub_assisted_mode";
pub const ACCESSIBILITY: &str = "healthhub_accessibility";
pub const LANGUAGE: &str = "healthhub_lang";
pub const AUTH: &str = "healthhub_auth";
pub const ORDERS: &str = "healthhub_orders";
pub const AUDIT_LOGS: &str = "healthhub_audit_logs";
pub const REMEMBERED_EMAIL: &str = "healthhub_remembered_email";

pub const ALL: [&str; 9] = [
    LAST_VIEW,
    LARGE_FONT,
    ASSISTED_MODE,
    ACCESSIBILITY,
    LANGUAGE,
    AUTH,
    ORDERS,
    AUDIT_LOGS,
    REMEMBERED_EMAIL,
];
