use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// Client-facing failure codes carried in the response envelope
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ErrSearchUnknownField,
    ErrSearchTypeMismatch,
    ErrInvalidPage,
    ErrRequiredFieldMissing,
    ErrUserNotFound,
    ErrUserIsDisabled,
    ErrUserHasValidAssignment,
    ErrCreateUserFail,
    ErrUpdateUserFail,
    ErrAssetNotFound,
    ErrAssetStateNotCorrect,
    ErrAssetNotAvailable,
    ErrAssetHasAssignment,
    ErrCategoryNotFound,
    ErrLocationMismatch,
    ErrAssignmentNotFound,
    ErrAssignedDateInPast,
    ErrAssignmentNotWaiting,
    ErrAssignmentAccepted,
    ErrNotAssignee,
    ErrAccessDenied,
    ErrDuplicateRecord,
    ErrInternal,
}

impl ErrorCode {
    /// HTTP status the code maps to at the request boundary
    pub fn http_status(&self) -> u16 {
        use ErrorCode::*;
        match self {
            ErrUserNotFound | ErrAssetNotFound | ErrCategoryNotFound | ErrAssignmentNotFound => {
                404
            }
            ErrNotAssignee | ErrLocationMismatch | ErrAccessDenied => 403,
            ErrUserHasValidAssignment
            | ErrAssetHasAssignment
            | ErrAssignmentAccepted
            | ErrDuplicateRecord => 409,
            ErrInternal => 500,
            _ => 400,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SuccessCode {
    AssetLoadedSuccess,
    AssetCountSuccess,
    AssetCreatedSuccess,
    AssetCanBeDeleted,
    AssetDeletedSuccess,
    ReportLoadedSuccess,
    UserLoadedSuccess,
    UserCountSuccess,
    UserCreatedSuccess,
    UserDisabledSuccess,
    AssignmentLoadedSuccess,
    AssignmentCountSuccess,
    CreateAssignmentSuccess,
    AssignmentAcceptedSuccess,
    AssignmentDeclinedSuccess,
    AssignmentDeletedSuccess,
}

impl std::fmt::Display for SuccessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
