use super::query::enum_column;
use super::types::Database;
use crate::search::{EntityKind, Predicate};
use anyhow::{bail, Result};
use assetdesk_common::{
    Asset, AssetState, CategoryReport, EditAsset, NewAsset, Page, PageRequest, SortOrder,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const ASSET_COLUMNS: &str = "asset_code, asset_name, category_code, state, install_date, specification, location_id, is_deleted";

fn asset_from_row(row: &SqliteRow) -> Result<Asset> {
    Ok(Asset {
        asset_code: row.try_get("asset_code")?,
        asset_name: row.try_get("asset_name")?,
        category_code: row.try_get("category_code")?,
        state: enum_column(row, "state")?,
        install_date: row.try_get("install_date")?,
        specification: row.try_get("specification")?,
        location_id: row.try_get("location_id")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

impl Database {
    /// Insert a new asset, generating its code from the category prefix and the
    /// highest number already used in that category
    pub async fn insert_asset(&self, params: &NewAsset, location_id: i64) -> Result<Asset> {
        if params.asset_name.trim().is_empty() {
            bail!("asset_name is required");
        }

        let mut tx = self.pool.begin().await?;

        let highest: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(CAST(SUBSTR(asset_code, ?) AS INTEGER)), 0) FROM assets WHERE category_code = ?",
        )
        .bind(params.category_code.len() as i64 + 1)
        .bind(&params.category_code)
        .fetch_one(&mut *tx)
        .await?;
        let asset_code = format!("{}{:06}", params.category_code, highest + 1);

        sqlx::query(
            "INSERT INTO assets (asset_code, asset_name, category_code, state, install_date, specification, location_id, is_deleted) VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&asset_code)
        .bind(params.asset_name.trim())
        .bind(&params.category_code)
        .bind(params.state.as_ref())
        .bind(params.install_date)
        .bind(&params.specification)
        .bind(location_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Asset {
            asset_code,
            asset_name: params.asset_name.trim().to_string(),
            category_code: params.category_code.clone(),
            state: params.state,
            install_date: params.install_date,
            specification: params.specification.clone(),
            location_id,
            is_deleted: false,
        })
    }

    /// Get a non-deleted asset by code
    pub async fn get_asset(&self, asset_code: &str) -> Result<Option<Asset>> {
        let sql = format!(
            "SELECT {} FROM assets WHERE asset_code = ? AND is_deleted = 0",
            ASSET_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(asset_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(asset_from_row).transpose()
    }

    /// Page through assets matching a predicate, by asset name unless told otherwise
    pub async fn find_assets(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<Asset>> {
        self.fetch_page(
            EntityKind::Asset.schema(),
            ASSET_COLUMNS,
            predicate,
            request,
            &[SortOrder::asc("assetName")],
            asset_from_row,
        )
        .await
    }

    pub async fn count_assets(&self, predicate: &Predicate) -> Result<u64> {
        self.count_matching(EntityKind::Asset.schema(), predicate)
            .await
    }

    /// Rewrite the editable fields of an asset that is not currently ASSIGNED
    pub async fn update_asset(&self, asset_code: &str, edit: &EditAsset) -> Result<Asset> {
        if edit.asset_name.trim().is_empty() {
            bail!("asset_name is required");
        }

        let result = sqlx::query(
            "UPDATE assets SET asset_name = ?, specification = ?, install_date = ?, state = ? WHERE asset_code = ? AND state <> ? AND is_deleted = 0",
        )
        .bind(edit.asset_name.trim())
        .bind(&edit.specification)
        .bind(edit.install_date)
        .bind(edit.state.as_ref())
        .bind(asset_code)
        .bind(AssetState::Assigned.as_ref())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            bail!("Asset {} not found or assigned", asset_code);
        }

        match self.get_asset(asset_code).await? {
            Some(asset) => Ok(asset),
            None => bail!("Asset not found: {}", asset_code),
        }
    }

    pub async fn update_asset_state(&self, asset_code: &str, state: AssetState) -> Result<()> {
        let result = sqlx::query("UPDATE assets SET state = ? WHERE asset_code = ? AND is_deleted = 0")
            .bind(state.as_ref())
            .bind(asset_code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("Asset not found: {}", asset_code);
        }
        Ok(())
    }

    pub async fn soft_delete_asset(&self, asset_code: &str) -> Result<()> {
        let result = sqlx::query("UPDATE assets SET is_deleted = 1 WHERE asset_code = ? AND is_deleted = 0")
            .bind(asset_code)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("Asset not found: {}", asset_code);
        }
        Ok(())
    }

    /// Whether the asset shows up in any assignment, including historical ones
    pub async fn asset_has_assignments(&self, asset_code: &str) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE asset_code = ?)",
        )
        .bind(asset_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists != 0)
    }

    /// Asset counts per category and state for one location
    pub async fn category_report(&self, location_id: i64) -> Result<Vec<CategoryReport>> {
        let rows = sqlx::query(
            r#"SELECT c.category_name AS category,
                      SUM(CASE WHEN a.state = 'AVAILABLE' THEN 1 ELSE 0 END) AS available,
                      SUM(CASE WHEN a.state = 'NOT_AVAILABLE' THEN 1 ELSE 0 END) AS not_available,
                      SUM(CASE WHEN a.state = 'ASSIGNED' THEN 1 ELSE 0 END) AS assigned,
                      SUM(CASE WHEN a.state = 'WAITING_FOR_RECYCLE' THEN 1 ELSE 0 END) AS waiting_for_recycle,
                      SUM(CASE WHEN a.state = 'RECYCLED' THEN 1 ELSE 0 END) AS recycled
               FROM categories c
               LEFT JOIN assets a
                 ON a.category_code = c.category_code AND a.location_id = ? AND a.is_deleted = 0
               GROUP BY c.category_code, c.category_name
               ORDER BY c.category_name ASC"#,
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let mut report = CategoryReport {
                    category: row.try_get("category")?,
                    available: row.try_get("available")?,
                    not_available: row.try_get("not_available")?,
                    assigned: row.try_get("assigned")?,
                    waiting_for_recycle: row.try_get("waiting_for_recycle")?,
                    recycled: row.try_get("recycled")?,
                    total: 0,
                };
                report.count_total();
                Ok(report)
            })
            .collect()
    }
}
