//! Typed preference store over the profile's key-value table.
//!
//! Each key is written independently the moment it changes. Scalars are stored
//! as plain strings, structured values as JSON. A value that no longer parses is
//! dropped and the documented default is returned instead.

pub mod keys;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::db::{Database, DbResult};
use crate::models::{AuditLog, AuthState, Language, Order, ViewState};

/// Display toggles loaded together at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayPreferences {
    pub large_font: bool,
    pub assisted_mode: bool,
    pub accessibility: bool,
    pub language: Language,
}

/// Typed accessors for every persisted key.
pub struct PreferenceStore<'a> {
    db: &'a Database,
}

impl<'a> PreferenceStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    /// Last rendered view; `home` when unset or unknown.
    pub fn last_view(&self) -> DbResult<ViewState> {
        Ok(self
            .db
            .get_preference(keys::LAST_VIEW)?
            .and_then(|v| ViewState::parse(&v))
            .unwrap_or_default())
    }

    pub fn set_last_view(&self, view: ViewState) -> DbResult<()> {
        self.db.set_preference(keys::LAST_VIEW, view.as_str())
    }

    pub fn large_font(&self) -> DbResult<bool> {
        self.read_flag(keys::LARGE_FONT)
    }

    pub fn set_large_font(&self, enabled: bool) -> DbResult<()> {
        self.write_flag(keys::LARGE_FONT, enabled)
    }

    pub fn assisted_mode(&self) -> DbResult<bool> {
        self.read_flag(keys::ASSISTED_MODE)
    }

    pub fn set_assisted_mode(&self, enabled: bool) -> DbResult<()> {
        self.write_flag(keys::ASSISTED_MODE, enabled)
    }

    pub fn accessibility(&self) -> DbResult<bool> {
        self.read_flag(keys::ACCESSIBILITY)
    }

    pub fn set_accessibility(&self, enabled: bool) -> DbResult<()> {
        self.write_flag(keys::ACCESSIBILITY, enabled)
    }

    /// UI language; `en` when unset or unknown.
    pub fn language(&self) -> DbResult<Language> {
        Ok(self
            .db
            .get_preference(keys::LANGUAGE)?
            .and_then(|v| Language::parse(&v))
            .unwrap_or_default())
    }

    pub fn set_language(&self, language: Language) -> DbResult<()> {
        self.db.set_preference(keys::LANGUAGE, language.as_str())
    }

    pub fn remembered_email(&self) -> DbResult<Option<String>> {
        Ok(self
            .db
            .get_preference(keys::REMEMBERED_EMAIL)?
            .filter(|email| !email.is_empty()))
    }

    /// `None` forgets the remembered email.
    pub fn set_remembered_email(&self, email: Option<&str>) -> DbResult<()> {
        match email {
            Some(email) => self.db.set_preference(keys::REMEMBERED_EMAIL, email),
            None => self.db.remove_preference(keys::REMEMBERED_EMAIL).map(|_| ()),
        }
    }

    pub fn display(&self) -> DbResult<DisplayPreferences> {
        Ok(DisplayPreferences {
            large_font: self.large_font()?,
            assisted_mode: self.assisted_mode()?,
            accessibility: self.accessibility()?,
            language: self.language()?,
        })
    }

    // =========================================================================
    // JSON values
    // =========================================================================

    pub fn auth(&self) -> DbResult<AuthState> {
        self.read_json(keys::AUTH)
    }

    pub fn set_auth(&self, auth: &AuthState) -> DbResult<()> {
        self.write_json(keys::AUTH, auth)
    }

    /// Sign-out removes the key rather than writing a logged-out state.
    pub fn clear_auth(&self) -> DbResult<()> {
        self.db.remove_preference(keys::AUTH).map(|_| ())
    }

    /// Order history, newest first.
    pub fn orders(&self) -> DbResult<Vec<Order>> {
        self.read_json(keys::ORDERS)
    }

    pub fn set_orders(&self, orders: &[Order]) -> DbResult<()> {
        self.write_json(keys::ORDERS, orders)
    }

    /// Audit trail, newest first.
    pub fn audit_logs(&self) -> DbResult<Vec<AuditLog>> {
        self.read_json(keys::AUDIT_LOGS)
    }

    pub fn set_audit_logs(&self, logs: &[AuditLog]) -> DbResult<()> {
        self.write_json(keys::AUDIT_LOGS, logs)
    }

    /// Wipe every persisted key.
    pub fn clear(&self) -> DbResult<()> {
        for key in keys::ALL {
            self.db.remove_preference(key)?;
        }
        debug!("Cleared persisted storefront state");
        Ok(())
    }

    // =========================================================================
    // Encoding helpers
    // =========================================================================

    fn read_flag(&self, key: &str) -> DbResult<bool> {
        Ok(self.db.get_preference(key)?.as_deref() == Some("true"))
    }

    fn write_flag(&self, key: &str, enabled: bool) -> DbResult<()> {
        self.db
            .set_preference(key, if enabled { "true" } else { "false" })
    }

    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> DbResult<T> {
        let Some(raw) = self.db.get_preference(key)? else {
            return Ok(T::default());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt persisted value");
                self.db.remove_preference(key)?;
                Ok(T::default())
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let json = serde_json::to_string(value)?;
        self.db.set_preference(key, &json)
    }
}
