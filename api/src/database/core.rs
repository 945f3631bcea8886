use super::types::Database;
use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;

const SCHEMA: &str = include_str!("../../migrations/001_schema.sql");

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        // Every connection to `sqlite::memory:` is its own database, so keep exactly one alive.
        let in_memory = database_url.contains(":memory:");
        let mut options = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }
        let pool = options.connect(database_url).await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        tracing::debug!("Schema applied to {}", database_url);
        Ok(Self { pool })
    }
}
