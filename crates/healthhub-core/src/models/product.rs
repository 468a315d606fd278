//! Product catalog models.

use serde::{Deserialize, Serialize};

/// A medicine or wellness product sold in the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Brand / marketer
    pub brand: String,
    /// Active ingredient ("salt"), used for substitutes
    pub active_ingredient: String,
    /// Shelf category
    pub category: ProductCategory,
    /// Unit price in rupees
    pub price: f64,
    pub description: String,
    pub image: String,
    /// Units on hand
    pub stock: u32,
    /// Whether dispensing needs a verified prescription
    pub requires_prescription: bool,
    pub expiry_date: String,
    pub batch_number: String,
    /// Average review rating (0-5)
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contraindications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage_guidelines: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub side_effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall_status: Option<RecallStatus>,
}

/// Shelf category of a product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    #[serde(rename = "Pain Relief")]
    PainRelief,
    Vitamins,
    Skincare,
    Allergy,
    #[serde(rename = "First Aid")]
    FirstAid,
    Prescription,
    #[serde(rename = "Chronic Care")]
    ChronicCare,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::PainRelief => "Pain Relief",
            ProductCategory::Vitamins => "Vitamins",
            ProductCategory::Skincare => "Skincare",
            ProductCategory::Allergy => "Allergy",
            ProductCategory::FirstAid => "First Aid",
            ProductCategory::Prescription => "Prescription",
            ProductCategory::ChronicCare => "Chronic Care",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pain Relief" => Some(ProductCategory::PainRelief),
            "Vitamins" => Some(ProductCategory::Vitamins),
            "Skincare" => Some(ProductCategory::Skincare),
            "Allergy" => Some(ProductCategory::Allergy),
            "First Aid" => Some(ProductCategory::FirstAid),
            "Prescription" => Some(ProductCategory::Prescription),
            "Chronic Care" => Some(ProductCategory::ChronicCare),
            _ => None,
        }
    }
}

/// Manufacturer or regulator recall notice attached to a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecallStatus {
    pub is_recalled: bool,
    pub reason: String,
    pub date: String,
}

impl Product {
    /// Create a product with required fields; everything else takes a neutral default.
    pub fn new(id: String, name: String, active_ingredient: String, price: f64) -> Self {
        Self {
            id,
            name,
            brand: String::new(),
            active_ingredient,
            category: ProductCategory::PainRelief,
            price,
            description: String::new(),
            image: String::new(),
            stock: 0,
            requires_prescription: false,
            expiry_date: String::new(),
            batch_number: String::new(),
            rating: 0.0,
            contraindications: Vec::new(),
            dosage_guidelines: None,
            side_effects: Vec::new(),
            recall_status: None,
        }
    }

    /// Whether an active recall blocks the product from sale.
    pub fn is_recalled(&self) -> bool {
        self.recall_status
            .as_ref()
            .map(|r| r.is_recalled)
            .unwrap_or(false)
    }

    /// Whether stock is under the given threshold.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock < threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_product() {
        let product = Product::new("1".into(), "Dolo 650".into(), "Paracetamol".into(), 30.0);
        assert_eq!(product.name, "Dolo 650");
        assert!(!product.is_recalled());
        assert!(product.is_low_stock(50));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ProductCategory::ChronicCare).unwrap();
        assert_eq!(json, r#""Chronic Care""#);
        assert_eq!(ProductCategory::parse("First Aid"), Some(ProductCategory::FirstAid));
        assert_eq!(ProductCategory::parse("Toys"), None);
    }

    #[test]
    fn test_camel_case_fields() {
        let product = Product::new("1".into(), "Dolo 650".into(), "Paracetamol".into(), 30.0);
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("activeIngredient").is_some());
        assert!(json.get("requiresPrescription").is_some());
        // Optional fields are omitted when empty
        assert!(json.get("recallStatus").is_none());
    }
}
