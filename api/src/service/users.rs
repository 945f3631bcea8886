use super::{ApiError, AssetDeskService, CallerScope};
use crate::search::EntityKind;
use assetdesk_common::{ErrorCode, NewUser, Page, PageRequest, UpdateUser, User};

/// Login name derived from a person's names: the first name followed by the
/// initial of each word of the last name, all lowercase.
///
/// `("Binh", "Nguyen Van")` becomes `binhnv`.
pub fn generate_username(first_name: &str, last_name: &str) -> String {
    let mut username: String = first_name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    for word in last_name.split_whitespace() {
        if let Some(initial) = word.chars().next() {
            username.extend(initial.to_lowercase());
        }
    }
    username
}

impl AssetDeskService {
    pub async fn search_users(
        &self,
        caller: &CallerScope,
        filter: &str,
        request: &PageRequest,
    ) -> Result<Page<User>, ApiError> {
        caller.require_admin()?;
        let predicate = self.scoped_filter(caller, EntityKind::User, filter)?;
        let request = self.page(request)?;
        Ok(self.database.find_users(&predicate, &request).await?)
    }

    pub async fn count_users(&self, caller: &CallerScope, filter: &str) -> Result<u64, ApiError> {
        caller.require_admin()?;
        let predicate = self.scoped_filter(caller, EntityKind::User, filter)?;
        Ok(self.database.count_users(&predicate).await?)
    }

    /// Creates a user in the caller's location with a generated username and staff code
    pub async fn create_user(&self, caller: &CallerScope, params: NewUser) -> Result<User, ApiError> {
        caller.require_admin()?;
        if params.first_name.trim().is_empty() || params.last_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrRequiredFieldMissing,
                "first and last name are required".to_string(),
            ));
        }
        if params.joined_date < params.date_of_birth {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrCreateUserFail,
                "joined date is before date of birth".to_string(),
            ));
        }

        let params = NewUser {
            first_name: params.first_name.trim().to_string(),
            last_name: params.last_name.trim().to_string(),
            ..params
        };
        let base = generate_username(&params.first_name, &params.last_name);
        let user = self
            .database
            .insert_new_user(&base, &params, caller.location_id)
            .await?;
        tracing::info!(
            "User {} ({}) created by {}",
            user.username,
            user.staff_code,
            caller.username
        );
        Ok(user)
    }

    /// Loads a user in the caller's location. Plain users may only load themselves.
    pub async fn get_user(&self, caller: &CallerScope, staff_code: &str) -> Result<User, ApiError> {
        let user = self
            .database
            .get_user_by_staff_code(staff_code)
            .await?
            .ok_or_else(|| ApiError::NotFound(ErrorCode::ErrUserNotFound, staff_code.to_string()))?;
        if !caller.is_admin() && user.username != caller.username {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrAccessDenied,
                format!("{} may not view user {}", caller.username, staff_code),
            ));
        }
        if user.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("user {} belongs to another location", staff_code),
            ));
        }
        Ok(user)
    }

    /// Changes date of birth, joined date, gender and role of an active user
    pub async fn update_user(
        &self,
        caller: &CallerScope,
        staff_code: &str,
        update: UpdateUser,
    ) -> Result<User, ApiError> {
        caller.require_admin()?;
        let user = self.get_user(caller, staff_code).await?;
        if user.is_deleted {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrUserIsDisabled,
                format!("user {} is disabled", staff_code),
            ));
        }
        if update.joined_date < update.date_of_birth {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrUpdateUserFail,
                "joined date is before date of birth".to_string(),
            ));
        }

        let updated = self.database.update_user(staff_code, &update).await?;
        tracing::info!("User {} updated by {}", staff_code, caller.username);
        Ok(updated)
    }

    /// Succeeds when the user is active, in scope and holds no valid assignment
    pub async fn check_disable_user(
        &self,
        caller: &CallerScope,
        staff_code: &str,
    ) -> Result<User, ApiError> {
        caller.require_admin()?;
        let user = self.get_user(caller, staff_code).await?;
        if user.is_deleted {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrUserIsDisabled,
                format!("user {} is already disabled", staff_code),
            ));
        }
        if self.database.has_valid_assignment(&user.username).await? {
            return Err(ApiError::Conflict(
                ErrorCode::ErrUserHasValidAssignment,
                format!("user {} still holds a valid assignment", staff_code),
            ));
        }
        Ok(user)
    }

    pub async fn disable_user(&self, caller: &CallerScope, staff_code: &str) -> Result<(), ApiError> {
        self.check_disable_user(caller, staff_code).await?;
        self.database.disable_user(staff_code).await?;
        tracing::info!("User {} disabled by {}", staff_code, caller.username);
        Ok(())
    }
}
