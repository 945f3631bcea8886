use crate::search::SearchError;
use assetdesk_common::{ErrorCode, ResponseEnvelope};

/// Failure of a use case, carrying the code reported to clients
#[derive(Debug)]
pub enum ApiError {
    Search(SearchError),
    NotFound(ErrorCode, String),
    InvalidRequest(ErrorCode, String),
    Conflict(ErrorCode, String),
    Forbidden(ErrorCode, String),
    Storage(anyhow::Error),
}

impl ApiError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ApiError::Search(e) => e.error_code(),
            ApiError::NotFound(code, _)
            | ApiError::InvalidRequest(code, _)
            | ApiError::Conflict(code, _)
            | ApiError::Forbidden(code, _) => *code,
            ApiError::Storage(_) => ErrorCode::ErrInternal,
        }
    }

    pub fn status(&self) -> u16 {
        self.error_code().http_status()
    }

    pub fn into_envelope<T>(self) -> ResponseEnvelope<T> {
        if let ApiError::Storage(e) = &self {
            tracing::error!("Storage failure: {:#}", e);
        }
        let message = match &self {
            ApiError::Storage(_) => "Internal error".to_string(),
            other => other.to_string(),
        };
        ResponseEnvelope::error(self.error_code(), message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Search(e) => write!(f, "{}", e),
            ApiError::NotFound(_, msg) => write!(f, "Not found: {}", msg),
            ApiError::InvalidRequest(_, msg) => write!(f, "Invalid request: {}", msg),
            ApiError::Conflict(_, msg) => write!(f, "Conflict: {}", msg),
            ApiError::Forbidden(_, msg) => write!(f, "Forbidden: {}", msg),
            ApiError::Storage(e) => write!(f, "Storage error: {:#}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        ApiError::Search(e)
    }
}

/// Search failures raised under the data store (sort keys) stay client errors.
/// Unique-constraint violations become conflicts.
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        let e = match e.downcast::<SearchError>() {
            Ok(search) => return ApiError::Search(search),
            Err(other) => other,
        };
        let duplicate = e
            .downcast_ref::<sqlx::Error>()
            .and_then(|db| db.as_database_error())
            .is_some_and(|db| db.is_unique_violation());
        if duplicate {
            return ApiError::Conflict(ErrorCode::ErrDuplicateRecord, format!("{:#}", e));
        }
        ApiError::Storage(e)
    }
}
