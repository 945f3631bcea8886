use sqlx::SqlitePool;

#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}
