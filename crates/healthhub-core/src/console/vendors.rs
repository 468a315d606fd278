//! Vendor registry kept by the staff console.

use tracing::info;

use crate::ids::short_token;
use crate::models::{Vendor, VendorStatus};

const DEFAULT_RELIABILITY: f64 = 5.0;

/// Vendor form as submitted from the registry modal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorForm {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Raw reliability field; blank or unparsable means 5.0
    pub reliability_score: String,
    /// Comma-separated category list
    pub categories: String,
}

/// In-memory supplier list. Deleting a vendor leaves its purchase orders alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorRegistry {
    vendors: Vec<Vendor>,
}

impl VendorRegistry {
    pub fn new(vendors: Vec<Vendor>) -> Self {
        Self { vendors }
    }

    pub fn list(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn get(&self, id: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    /// Insert a new vendor (`editing == None`) or replace the one being edited.
    ///
    /// Saved vendors are always `active`.
    pub fn save(&mut self, editing: Option<&str>, form: VendorForm) -> &Vendor {
        let id = editing
            .filter(|id| self.get(id).is_some())
            .map(str::to_string)
            .unwrap_or_else(short_token);

        let reliability_score = form
            .reliability_score
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|s| *s != 0.0 && s.is_finite())
            .unwrap_or(DEFAULT_RELIABILITY);

        let vendor = Vendor {
            id: id.clone(),
            name: form.name,
            contact_person: form.contact_person,
            email: form.email,
            phone: form.phone,
            address: form.address,
            reliability_score,
            categories: parse_categories(&form.categories),
            status: VendorStatus::Active,
        };

        let index = match self.vendors.iter().position(|v| v.id == id) {
            Some(index) => {
                info!(vendor_id = %id, "Vendor updated");
                self.vendors[index] = vendor;
                index
            }
            None => {
                info!(vendor_id = %id, "Vendor added");
                self.vendors.push(vendor);
                self.vendors.len() - 1
            }
        };
        &self.vendors[index]
    }

    /// Remove a vendor. Returns whether it existed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.vendors.len();
        self.vendors.retain(|v| v.id != id);
        let removed = self.vendors.len() != before;
        if removed {
            info!(vendor_id = id, "Vendor removed");
        }
        removed
    }

    pub fn active_count(&self) -> usize {
        self.vendors
            .iter()
            .filter(|v| v.status == VendorStatus::Active)
            .count()
    }
}

fn parse_categories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
