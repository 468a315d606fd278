//! Product catalog database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Product, ProductCategory, RecallStatus};

const PRODUCT_COLUMNS: &str = r#"
    id, name, brand, active_ingredient, category, price, description, image,
    stock, requires_prescription, expiry_date, batch_number, rating,
    contraindications, dosage_guidelines, side_effects, recall_status
"#;

impl Database {
    /// Insert or update a product.
    pub fn upsert_product(&self, product: &Product) -> DbResult<()> {
        let contraindications_json = serde_json::to_string(&product.contraindications)?;
        let side_effects_json = serde_json::to_string(&product.side_effects)?;
        let recall_json = product
            .recall_status
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            r#"
            INSERT INTO products (
                id, name, brand, active_ingredient, category, price, description, image,
                stock, requires_prescription, expiry_date, batch_number, rating,
                contraindications, dosage_guidelines, side_effects, recall_status, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                active_ingredient = excluded.active_ingredient,
                category = excluded.category,
                price = excluded.price,
                description = excluded.description,
                image = excluded.image,
                stock = excluded.stock,
                requires_prescription = excluded.requires_prescription,
                expiry_date = excluded.expiry_date,
                batch_number = excluded.batch_number,
                rating = excluded.rating,
                contraindications = excluded.contraindications,
                dosage_guidelines = excluded.dosage_guidelines,
                side_effects = excluded.side_effects,
                recall_status = excluded.recall_status,
                updated_at = datetime('now')
            "#,
            params![
                product.id,
                product.name,
                product.brand,
                product.active_ingredient,
                product.category.as_str(),
                product.price,
                product.description,
                product.image,
                product.stock,
                product.requires_prescription,
                product.expiry_date,
                product.batch_number,
                product.rating,
                contraindications_json,
                product.dosage_guidelines,
                side_effects_json,
                recall_json,
            ],
        )?;
        Ok(())
    }

    /// Get a product by ID.
    pub fn get_product(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        self.conn
            .query_row(&sql, [id], ProductRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// All products ordered by name.
    pub fn list_products(&self) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name");
        self.query_products(&sql, params![])
    }

    /// Case-insensitive substring match on name or active ingredient.
    /// An empty query matches everything.
    pub fn search_products(&self, query: &str) -> DbResult<Vec<Product>> {
        let needle = query.trim().to_lowercase();
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE instr(lower(name), ?1) > 0 OR instr(lower(active_ingredient), ?1) > 0
            ORDER BY name
            "#
        );
        self.query_products(&sql, params![needle])
    }

    /// Other products with the same active ingredient (generic substitutes).
    pub fn list_alternatives(&self, product_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE active_ingredient = (SELECT active_ingredient FROM products WHERE id = ?1)
            AND id != ?1
            ORDER BY price
            "#
        );
        self.query_products(&sql, params![product_id])
    }

    /// Products with stock strictly below `threshold`.
    pub fn list_low_stock(&self, threshold: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < ? ORDER BY stock");
        self.query_products(&sql, params![threshold])
    }

    /// Add `quantity` units to stock. Returns the new stock level.
    pub fn restock_product(&self, product_id: &str, quantity: u32) -> DbResult<u32> {
        let rows_affected = self.conn.execute(
            "UPDATE products SET stock = stock + ?2, updated_at = datetime('now') WHERE id = ?1",
            params![product_id, quantity],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("product {}", product_id)));
        }

        let stock: u32 = self.conn.query_row(
            "SELECT stock FROM products WHERE id = ?",
            [product_id],
            |row| row.get(0),
        )?;
        Ok(stock)
    }

    /// Attach or clear a recall notice.
    pub fn set_recall_status(
        &self,
        product_id: &str,
        recall: Option<&RecallStatus>,
    ) -> DbResult<bool> {
        let recall_json = recall.map(serde_json::to_string).transpose()?;
        let rows_affected = self.conn.execute(
            "UPDATE products SET recall_status = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![product_id, recall_json],
        )?;
        Ok(rows_affected > 0)
    }

    fn query_products(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> DbResult<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, ProductRow::from_row)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?.try_into()?);
        }
        Ok(products)
    }
}

/// Intermediate row struct for database mapping.
struct ProductRow {
    id: String,
    name: String,
    brand: String,
    active_ingredient: String,
    category: String,
    price: f64,
    description: String,
    image: String,
    stock: u32,
    requires_prescription: bool,
    expiry_date: String,
    batch_number: String,
    rating: f64,
    contraindications: String,
    dosage_guidelines: Option<String>,
    side_effects: String,
    recall_status: Option<String>,
}

impl ProductRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            brand: row.get(2)?,
            active_ingredient: row.get(3)?,
            category: row.get(4)?,
            price: row.get(5)?,
            description: row.get(6)?,
            image: row.get(7)?,
            stock: row.get(8)?,
            requires_prescription: row.get(9)?,
            expiry_date: row.get(10)?,
            batch_number: row.get(11)?,
            rating: row.get(12)?,
            contraindications: row.get(13)?,
            dosage_guidelines: row.get(14)?,
            side_effects: row.get(15)?,
            recall_status: row.get(16)?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = ProductCategory::parse(&row.category).ok_or_else(|| {
            DbError::Constraint(format!("Unknown product category: {}", row.category))
        })?;

        Ok(Product {
            id: row.id,
            name: row.name,
            brand: row.brand,
            active_ingredient: row.active_ingredient,
            category,
            price: row.price,
            description: row.description,
            image: row.image,
            stock: row.stock,
            requires_prescription: row.requires_prescription,
            expiry_date: row.expiry_date,
            batch_number: row.batch_number,
            rating: row.rating,
            contraindications: serde_json::from_str(&row.contraindications)?,
            dosage_guidelines: row.dosage_guidelines,
            side_effects: serde_json::from_str(&row.side_effects)?,
            recall_status: row
                .recall_status
                .map(|s| serde_json::from_str(&s))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn product(id: &str, name: &str, ingredient: &str, price: f64, stock: u32) -> Product {
        let mut p = Product::new(id.into(), name.into(), ingredient.into(), price);
        p.stock = stock;
        p
    }

    #[test]
    fn test_upsert_and_get() {
        let db = setup_db();

        let mut item = product("1", "Dolo 650", "Paracetamol", 30.0, 120);
        item.side_effects = vec!["Nausea".into()];
        item.category = ProductCategory::PainRelief;
        db.upsert_product(&item).unwrap();

        let retrieved = db.get_product("1").unwrap().unwrap();
        assert_eq!(retrieved, item);
        assert!(db.get_product("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_updates() {
        let db = setup_db();

        let mut item = product("1", "Original Name", "Paracetamol", 30.0, 10);
        db.upsert_product(&item).unwrap();

        item.name = "Updated Name".into();
        db.upsert_product(&item).unwrap();

        let retrieved = db.get_product("1").unwrap().unwrap();
        assert_eq!(retrieved.name, "Updated Name");
        assert_eq!(db.list_products().unwrap().len(), 1);
    }

    #[test]
    fn test_search_by_name_or_ingredient() {
        let db = setup_db();
        db.upsert_product(&product("1", "Dolo 650", "Paracetamol", 30.0, 100))
            .unwrap();
        db.upsert_product(&product("2", "Allegra 120", "Fexofenadine", 180.0, 40))
            .unwrap();

        let results = db.search_products("dolo").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "1");

        // Ingredient match, case-insensitive
        let results = db.search_products("FEXO").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "2");

        // Empty query lists everything
        assert_eq!(db.search_products("").unwrap().len(), 2);
        assert!(db.search_products("insulin").unwrap().is_empty());
    }

    #[test]
    fn test_alternatives_share_ingredient() {
        let db = setup_db();
        db.upsert_product(&product("1", "Dolo 650", "Paracetamol", 30.0, 100))
            .unwrap();
        db.upsert_product(&product("2", "Crocin Advance", "Paracetamol", 25.0, 100))
            .unwrap();
        db.upsert_product(&product("3", "Allegra 120", "Fexofenadine", 180.0, 40))
            .unwrap();

        let alternatives = db.list_alternatives("1").unwrap();
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].id, "2");
    }

    #[test]
    fn test_low_stock_and_restock() {
        let db = setup_db();
        db.upsert_product(&product("1", "Dolo 650", "Paracetamol", 30.0, 100))
            .unwrap();
        db.upsert_product(&product("2", "Allegra 120", "Fexofenadine", 180.0, 40))
            .unwrap();

        let low = db.list_low_stock(50).unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, "2");

        assert_eq!(db.restock_product("2", 60).unwrap(), 100);
        assert!(db.list_low_stock(50).unwrap().is_empty());

        assert!(matches!(
            db.restock_product("missing", 1),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn test_recall_status_persistence() {
        let db = setup_db();
        db.upsert_product(&product("1", "Dolo 650", "Paracetamol", 30.0, 100))
            .unwrap();

        let recall = RecallStatus {
            is_recalled: true,
            reason: "Contaminated batch".into(),
            date: "2024-05-01".into(),
        };
        assert!(db.set_recall_status("1", Some(&recall)).unwrap());

        let retrieved = db.get_product("1").unwrap().unwrap();
        assert!(retrieved.is_recalled());
        assert_eq!(retrieved.recall_status.unwrap().reason, "Contaminated batch");

        db.set_recall_status("1", None).unwrap();
        assert!(!db.get_product("1").unwrap().unwrap().is_recalled());
    }
}
