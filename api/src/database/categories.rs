use super::types::Database;
use anyhow::{bail, Result};
use assetdesk_common::Category;
use sqlx::Row;

impl Database {
    pub async fn insert_category(&self, category: &Category) -> Result<()> {
        if category.category_code.trim().is_empty() || category.category_name.trim().is_empty() {
            bail!("category_code and category_name are required");
        }
        sqlx::query("INSERT INTO categories (category_code, category_name) VALUES (?, ?)")
            .bind(category.category_code.trim().to_uppercase())
            .bind(category.category_name.trim())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn category_exists(&self, category_code: &str) -> Result<bool> {
        let exists: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE category_code = ?)")
                .bind(category_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists != 0)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT category_code, category_name FROM categories ORDER BY category_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                Ok(Category {
                    category_code: row.try_get("category_code")?,
                    category_name: row.try_get("category_name")?,
                })
            })
            .collect()
    }
}
