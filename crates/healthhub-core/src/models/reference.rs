//! Read-only reference data shown on informational screens.
//!
//! These are plain records. Nothing in the storefront mutates them or enforces
//! references between them.

use serde::{Deserialize, Serialize};

/// A partner clinic offering appointments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clinic {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub doctor_name: String,
    pub address: String,
    pub rating: f64,
    pub available_slots: Vec<String>,
    pub image: String,
    pub description: String,
}

/// A diagnostic test bookable through a lab partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabTest {
    pub id: String,
    pub name: String,
    pub price: f64,
    /// e.g. "Blood", "Urine"
    pub sample_type: String,
    pub fasting_required: bool,
    /// e.g. "24 Hours"
    pub report_time: String,
    pub partner_id: String,
    pub partner_name: String,
    pub description: String,
}

/// A pharmacist available for consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacist {
    pub id: String,
    pub name: String,
    pub registration_number: String,
    pub experience: String,
    pub specialty: String,
    pub certifications: Vec<String>,
    pub image: String,
    pub phone: String,
    pub available: bool,
    pub rating: f64,
    pub bio: String,
}

/// A knowledge-base article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticle {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub author: String,
    pub date: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
}

impl BlogArticle {
    /// Author initials for the byline avatar ("Dr. Sarah Varma" -> "DSV").
    pub fn author_initials(&self) -> String {
        self.author
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}
