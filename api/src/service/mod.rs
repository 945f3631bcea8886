pub mod assets;
pub mod assignments;
pub mod error;
pub mod users;

pub use error::ApiError;
pub use users::generate_username;

use crate::database::Database;
use crate::search::{normalize_page, EntityKind, OperatorKind, Predicate, Specification};
use assetdesk_common::{ErrorCode, PageRequest, ResponseEnvelope, Role, SuccessCode};
use std::sync::Arc;

/// Identity of the caller, resolved by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerScope {
    pub username: String,
    pub location_id: i64,
    pub role: Role,
}

impl CallerScope {
    pub fn new(username: impl Into<String>, location_id: i64, role: Role) -> Self {
        Self {
            username: username.into(),
            location_id,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Rejects callers without the ADMIN role
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            return Ok(());
        }
        Err(ApiError::Forbidden(
            ErrorCode::ErrAccessDenied,
            format!("{} is not an admin", self.username),
        ))
    }

    /// Rows the caller may see: its location, not soft-deleted, and for plain
    /// users only the assignments addressed to them
    fn predicate(&self, entity: EntityKind) -> Result<Predicate, ApiError> {
        let mut scope = Specification::new()
            .with("location", OperatorKind::Equals, self.location_id.to_string())
            .with("isDeleted", OperatorKind::Equals, "false");
        if entity == EntityKind::Assignment && !self.is_admin() {
            scope = scope.with("assignedTo", OperatorKind::Equals, self.username.as_str());
        }
        Ok(scope.build(entity.schema())?)
    }
}

/// Use cases over assets, users and assignments
pub struct AssetDeskService {
    database: Arc<Database>,
    max_page_size: u32,
}

impl AssetDeskService {
    pub fn new(database: Arc<Database>, max_page_size: u32) -> Self {
        Self {
            database,
            max_page_size,
        }
    }

    /// Binds a raw client filter and ANDs it onto the caller's scope
    fn scoped_filter(
        &self,
        caller: &CallerScope,
        entity: EntityKind,
        filter: &str,
    ) -> Result<Predicate, ApiError> {
        let client = Specification::parse(filter).build(entity.schema())?;
        Ok(caller.predicate(entity)?.and(client))
    }

    fn page(&self, request: &PageRequest) -> Result<PageRequest, ApiError> {
        Ok(normalize_page(request, self.max_page_size)?)
    }
}

/// Wraps a use-case result into the response envelope sent to clients
pub fn respond<T>(code: SuccessCode, result: Result<T, ApiError>) -> ResponseEnvelope<T> {
    match result {
        Ok(data) => ResponseEnvelope::ok(code, data),
        Err(e) => {
            tracing::warn!("Request rejected: {}", e);
            e.into_envelope()
        }
    }
}

#[cfg(test)]
mod tests;
