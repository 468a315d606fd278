//! Shop catalog search.
//!
//! Exact search is a case-insensitive substring match over name and active
//! ingredient. When that finds nothing (typically a misheard voice query),
//! `suggest` ranks products by Jaro-Winkler similarity instead.

use strsim::jaro_winkler;

use crate::db::{Database, DbResult};
use crate::models::{Product, ProductCategory};

/// Minimum similarity for a "did you mean" suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Default number of suggestions returned.
const SUGGESTION_LIMIT: usize = 5;

/// A fuzzy match with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub product: Product,
    pub score: f64,
}

pub struct Catalog<'a> {
    db: &'a Database,
}

impl<'a> Catalog<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get(&self, product_id: &str) -> DbResult<Option<Product>> {
        self.db.get_product(product_id)
    }

    /// Substring search; an empty query lists the whole catalog.
    pub fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        self.db.search_products(query)
    }

    /// Search restricted to one shelf category.
    pub fn search_in(&self, query: &str, category: ProductCategory) -> DbResult<Vec<Product>> {
        Ok(self
            .search(query)?
            .into_iter()
            .filter(|p| p.category == category)
            .collect())
    }

    /// Generic substitutes sharing the active ingredient, cheapest first.
    pub fn alternatives(&self, product_id: &str) -> DbResult<Vec<Product>> {
        self.db.list_alternatives(product_id)
    }

    /// Fuzzy "did you mean" matches, best first.
    pub fn suggest(&self, query: &str) -> DbResult<Vec<Suggestion>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut suggestions: Vec<Suggestion> = self
            .db
            .list_products()?
            .into_iter()
            .filter_map(|product| {
                let score = similarity(&needle, &product);
                (score >= SUGGESTION_THRESHOLD).then_some(Suggestion { product, score })
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(SUGGESTION_LIMIT);
        Ok(suggestions)
    }

    /// Exact results when there are any, otherwise fuzzy suggestions.
    pub fn search_or_suggest(&self, query: &str) -> DbResult<Vec<Product>> {
        let exact = self.search(query)?;
        if !exact.is_empty() {
            return Ok(exact);
        }
        Ok(self
            .suggest(query)?
            .into_iter()
            .map(|s| s.product)
            .collect())
    }
}

/// Best score of the query against the full name, each name word, and the
/// active ingredient.
fn similarity(needle: &str, product: &Product) -> f64 {
    let name = product.name.to_lowercase();
    let ingredient = product.active_ingredient.to_lowercase();

    name.split_whitespace()
        .chain([name.as_str(), ingredient.as_str()])
        .map(|candidate| jaro_winkler(needle, candidate))
        .fold(0.0, f64::max)
}
