/// Default database URL for local development
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./assetdesk.db?mode=rwc";

pub mod assets;
pub mod assignments;
pub mod categories;
pub mod core;
pub(crate) mod query;
pub mod types;
pub mod users;

pub use types::Database;

#[cfg(test)]
pub mod test_helpers;
