use assetdesk_common::ErrorCode;

/// Failures raised while binding a specification to a schema or evaluating it.
/// Parsing itself never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchError {
    UnknownField {
        entity: &'static str,
        field: String,
    },
    TypeMismatch {
        field: String,
        detail: String,
    },
    InvalidPage(String),
}

impl SearchError {
    pub(crate) fn type_mismatch(field: &str, detail: impl Into<String>) -> Self {
        SearchError::TypeMismatch {
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            SearchError::UnknownField { .. } => ErrorCode::ErrSearchUnknownField,
            SearchError::TypeMismatch { .. } => ErrorCode::ErrSearchTypeMismatch,
            SearchError::InvalidPage(_) => ErrorCode::ErrInvalidPage,
        }
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::UnknownField { entity, field } => {
                write!(f, "Unknown field '{}' for {}", field, entity)
            }
            SearchError::TypeMismatch { field, detail } => {
                write!(f, "Type mismatch on field '{}': {}", field, detail)
            }
            SearchError::InvalidPage(msg) => write!(f, "Invalid page request: {}", msg),
        }
    }
}

impl std::error::Error for SearchError {}
