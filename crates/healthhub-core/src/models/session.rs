//! Session-level models: screens, roles, and UI language.

use serde::{Deserialize, Serialize};

/// The screen currently rendered. There is exactly one at a time; no history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ViewState {
    #[default]
    Home,
    Shop,
    Cart,
    Checkout,
    UserDashboard,
    StaffDashboard,
    AiAssistant,
    Login,
    Policy,
    Services,
    About,
    Privacy,
    Terms,
    Returns,
    Blog,
    Manufacturer,
    Tracking,
    Guides,
    Consult,
    Clinics,
    Labs,
    Corporate,
    ProductDetails,
    SmartPack,
}

impl ViewState {
    pub const ALL: [ViewState; 24] = [
        ViewState::Home,
        ViewState::Shop,
        ViewState::Cart,
        ViewState::Checkout,
        ViewState::UserDashboard,
        ViewState::StaffDashboard,
        ViewState::AiAssistant,
        ViewState::Login,
        ViewState::Policy,
        ViewState::Services,
        ViewState::About,
        ViewState::Privacy,
        ViewState::Terms,
        ViewState::Returns,
        ViewState::Blog,
        ViewState::Manufacturer,
        ViewState::Tracking,
        ViewState::Guides,
        ViewState::Consult,
        ViewState::Clinics,
        ViewState::Labs,
        ViewState::Corporate,
        ViewState::ProductDetails,
        ViewState::SmartPack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewState::Home => "home",
            ViewState::Shop => "shop",
            ViewState::Cart => "cart",
            ViewState::Checkout => "checkout",
            ViewState::UserDashboard => "user-dashboard",
            ViewState::StaffDashboard => "staff-dashboard",
            ViewState::AiAssistant => "ai-assistant",
            ViewState::Login => "login",
            ViewState::Policy => "policy",
            ViewState::Services => "services",
            ViewState::About => "about",
            ViewState::Privacy => "privacy",
            ViewState::Terms => "terms",
            ViewState::Returns => "returns",
            ViewState::Blog => "blog",
            ViewState::Manufacturer => "manufacturer",
            ViewState::Tracking => "tracking",
            ViewState::Guides => "guides",
            ViewState::Consult => "consult",
            ViewState::Clinics => "clinics",
            ViewState::Labs => "labs",
            ViewState::Corporate => "corporate",
            ViewState::ProductDetails => "product-details",
            ViewState::SmartPack => "smart-pack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == s)
    }
}

/// Which side of the app a session is using.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Landing screen after login.
    pub fn dashboard(&self) -> ViewState {
        match self {
            Role::User => ViewState::UserDashboard,
            Role::Staff => ViewState::StaffDashboard,
        }
    }
}

/// Persisted login state. There is no credential check behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub is_logged_in: bool,
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AuthState {
    pub fn logged_in(role: Role) -> Self {
        Self {
            is_logged_in: true,
            role: Some(role),
            user_id: None,
        }
    }
}

/// UI string table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "en" => Some(Language::En),
            "hi" => Some(Language::Hi),
            _ => None,
        }
    }
}
