use super::types::Database;
use crate::search::{order_by_clause, EntitySchema, FieldValue, Predicate};
use anyhow::{anyhow, Result};
use assetdesk_common::{Page, PageRequest, SortOrder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite};
use std::str::FromStr;

pub(crate) type SqliteQuery<'q> =
    sqlx::query::Query<'q, Sqlite, <Sqlite as sqlx::Database>::Arguments<'q>>;

/// Binds predicate values in placeholder order
pub(crate) fn bind_values<'q>(mut query: SqliteQuery<'q>, values: &[FieldValue]) -> SqliteQuery<'q> {
    for value in values {
        query = match value {
            FieldValue::Text(s) => query.bind(s.clone()),
            FieldValue::Integer(i) => query.bind(*i),
            FieldValue::Boolean(b) => query.bind(*b),
            FieldValue::Date(d) => query.bind(*d),
            FieldValue::DateTime(dt) => query.bind(*dt),
        };
    }
    query
}

fn where_clause(predicate: &Predicate) -> (String, Vec<FieldValue>) {
    let (sql, values) = predicate.to_sql();
    if sql.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", sql), values)
    }
}

/// Decodes a text column into one of the strum-backed enums
pub(crate) fn enum_column<T>(row: &SqliteRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("Invalid value '{}' in column {}: {}", raw, column, e))
}

impl Database {
    /// Runs a filtered, sorted, paginated SELECT plus the matching COUNT(*)
    pub(crate) async fn fetch_page<T>(
        &self,
        schema: &EntitySchema,
        columns: &str,
        predicate: &Predicate,
        request: &PageRequest,
        default_sort: &[SortOrder],
        map_row: fn(&SqliteRow) -> Result<T>,
    ) -> Result<Page<T>> {
        let order_by = order_by_clause(schema, &request.sort, default_sort)?;
        let (filter, values) = where_clause(predicate);

        let mut select = format!("SELECT {} FROM {}{}", columns, schema.table(), filter);
        if !order_by.is_empty() {
            select.push_str(" ORDER BY ");
            select.push_str(&order_by);
        }
        select.push_str(" LIMIT ? OFFSET ?");
        tracing::debug!("Page query: {} with {} bound values", select, values.len());

        let rows = bind_values(sqlx::query(&select), &values)
            .bind(i64::from(request.size))
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;
        let items = rows.iter().map(map_row).collect::<Result<Vec<_>>>()?;

        let total = self.count_matching(schema, predicate).await?;
        Ok(Page::new(items, total, request.size))
    }

    pub(crate) async fn count_matching(
        &self,
        schema: &EntitySchema,
        predicate: &Predicate,
    ) -> Result<u64> {
        let (filter, values) = where_clause(predicate);
        let sql = format!("SELECT COUNT(*) AS total FROM {}{}", schema.table(), filter);
        let row = bind_values(sqlx::query(&sql), &values)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("total")? as u64)
    }
}
