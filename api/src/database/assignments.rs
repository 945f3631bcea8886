use super::query::enum_column;
use super::types::Database;
use crate::search::{EntityKind, Predicate};
use anyhow::{bail, Result};
use assetdesk_common::{
    AssetState, Assignment, AssignmentState, NewAssignment, Page, PageRequest, SortOrder,
};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use strum::IntoEnumIterator;

const ASSIGNMENT_COLUMNS: &str = "assignment_id, asset_code, assigned_to, assigned_by, assigned_date, state, note, location_id, is_deleted";

fn assignment_from_row(row: &SqliteRow) -> Result<Assignment> {
    Ok(Assignment {
        assignment_id: row.try_get("assignment_id")?,
        asset_code: row.try_get("asset_code")?,
        assigned_to: row.try_get("assigned_to")?,
        assigned_by: row.try_get("assigned_by")?,
        assigned_date: row.try_get("assigned_date")?,
        state: enum_column(row, "state")?,
        note: row.try_get("note")?,
        location_id: row.try_get("location_id")?,
        is_deleted: row.try_get("is_deleted")?,
    })
}

impl Database {
    /// Insert an assignment and mark its asset ASSIGNED in one transaction
    pub async fn insert_assignment(
        &self,
        params: &NewAssignment,
        assigned_by: &str,
        location_id: i64,
    ) -> Result<Assignment> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE assets SET state = ? WHERE asset_code = ? AND state = ? AND is_deleted = 0",
        )
        .bind(AssetState::Assigned.as_ref())
        .bind(&params.asset_code)
        .bind(AssetState::Available.as_ref())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("Asset {} is not available", params.asset_code);
        }

        let assignment_id: i64 = sqlx::query_scalar(
            "INSERT INTO assignments (asset_code, assigned_to, assigned_by, assigned_date, state, note, location_id, is_deleted) VALUES (?, ?, ?, ?, ?, ?, ?, 0) RETURNING assignment_id",
        )
        .bind(&params.asset_code)
        .bind(&params.assigned_to)
        .bind(assigned_by)
        .bind(params.assigned_date)
        .bind(AssignmentState::WaitingForAcceptance.as_ref())
        .bind(&params.note)
        .bind(location_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Assignment {
            assignment_id,
            asset_code: params.asset_code.clone(),
            assigned_to: params.assigned_to.clone(),
            assigned_by: assigned_by.to_string(),
            assigned_date: params.assigned_date,
            state: AssignmentState::WaitingForAcceptance,
            note: params.note.clone(),
            location_id,
            is_deleted: false,
        })
    }

    pub async fn get_assignment(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        let sql = format!(
            "SELECT {} FROM assignments WHERE assignment_id = ? AND is_deleted = 0",
            ASSIGNMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(assignment_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(assignment_from_row).transpose()
    }

    /// Page through assignments matching a predicate, newest first unless told otherwise
    pub async fn find_assignments(
        &self,
        predicate: &Predicate,
        request: &PageRequest,
    ) -> Result<Page<Assignment>> {
        self.fetch_page(
            EntityKind::Assignment.schema(),
            ASSIGNMENT_COLUMNS,
            predicate,
            request,
            &[SortOrder::desc("assignedDate")],
            assignment_from_row,
        )
        .await
    }

    pub async fn count_assignments(&self, predicate: &Predicate) -> Result<u64> {
        self.count_matching(EntityKind::Assignment.schema(), predicate)
            .await
    }

    /// Rewrites a waiting assignment. When the asset changes, the old asset goes
    /// back to AVAILABLE and the new one must be AVAILABLE; it becomes ASSIGNED.
    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        params: &NewAssignment,
    ) -> Result<Assignment> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT asset_code FROM assignments WHERE assignment_id = ? AND state = ? AND is_deleted = 0",
        )
        .bind(assignment_id)
        .bind(AssignmentState::WaitingForAcceptance.as_ref())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(current_asset) = current else {
            bail!("Assignment {} is not waiting for acceptance", assignment_id);
        };

        if current_asset != params.asset_code {
            sqlx::query("UPDATE assets SET state = ? WHERE asset_code = ?")
                .bind(AssetState::Available.as_ref())
                .bind(&current_asset)
                .execute(&mut *tx)
                .await?;

            let result = sqlx::query(
                "UPDATE assets SET state = ? WHERE asset_code = ? AND state = ? AND is_deleted = 0",
            )
            .bind(AssetState::Assigned.as_ref())
            .bind(&params.asset_code)
            .bind(AssetState::Available.as_ref())
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                bail!("Asset {} is not available", params.asset_code);
            }
        }

        sqlx::query(
            "UPDATE assignments SET asset_code = ?, assigned_to = ?, assigned_date = ?, note = ? WHERE assignment_id = ?",
        )
        .bind(&params.asset_code)
        .bind(&params.assigned_to)
        .bind(params.assigned_date)
        .bind(&params.note)
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        match self.get_assignment(assignment_id).await? {
            Some(assignment) => Ok(assignment),
            None => bail!("Assignment not found: {}", assignment_id),
        }
    }

    /// Moves an assignment from `from` to `to`, optionally setting its asset's state.
    /// Fails if the assignment is no longer in `from`.
    pub async fn transition_assignment(
        &self,
        assignment_id: i64,
        from: AssignmentState,
        to: AssignmentState,
        asset_state: Option<AssetState>,
    ) -> Result<()> {
        if !from.can_transition_to(to) {
            bail!("Invalid assignment transition {} -> {}", from, to);
        }

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE assignments SET state = ? WHERE assignment_id = ? AND state = ? AND is_deleted = 0",
        )
        .bind(to.as_ref())
        .bind(assignment_id)
        .bind(from.as_ref())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("Assignment {} is not {}", assignment_id, from);
        }

        if let Some(state) = asset_state {
            sqlx::query(
                "UPDATE assets SET state = ? WHERE asset_code = (SELECT asset_code FROM assignments WHERE assignment_id = ?)",
            )
            .bind(state.as_ref())
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Soft-deletes an assignment, optionally setting its asset's state
    pub async fn soft_delete_assignment(
        &self,
        assignment_id: i64,
        asset_state: Option<AssetState>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE assignments SET is_deleted = 1 WHERE assignment_id = ? AND is_deleted = 0",
        )
        .bind(assignment_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            bail!("Assignment not found: {}", assignment_id);
        }

        if let Some(state) = asset_state {
            sqlx::query(
                "UPDATE assets SET state = ? WHERE asset_code = (SELECT asset_code FROM assignments WHERE assignment_id = ?)",
            )
            .bind(state.as_ref())
            .bind(assignment_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Whether the user still holds an assignment in a valid state
    pub async fn has_valid_assignment(&self, username: &str) -> Result<bool> {
        let valid: Vec<AssignmentState> =
            AssignmentState::iter().filter(|s| s.is_valid()).collect();
        let placeholders = vec!["?"; valid.len()].join(", ");
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM assignments WHERE assigned_to = ? AND is_deleted = 0 AND state IN ({}))",
            placeholders
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(username);
        for state in &valid {
            query = query.bind(state.as_ref());
        }
        let exists = query.fetch_one(&self.pool).await?;
        Ok(exists != 0)
    }
}
