use super::{ApiError, AssetDeskService, CallerScope};
use crate::search::EntityKind;
use assetdesk_common::{
    Asset, AssetState, Assignment, AssignmentState, ErrorCode, NewAssignment, Page, PageRequest,
    User,
};
use chrono::{NaiveDateTime, Utc};

fn check_not_in_past(assigned_date: NaiveDateTime) -> Result<(), ApiError> {
    if assigned_date.date() < Utc::now().date_naive() {
        return Err(ApiError::InvalidRequest(
            ErrorCode::ErrAssignedDateInPast,
            format!("assigned date {} is in the past", assigned_date),
        ));
    }
    Ok(())
}

impl AssetDeskService {
    /// Lists assignments in the caller's location. Plain users only see their own.
    pub async fn search_assignments(
        &self,
        caller: &CallerScope,
        filter: &str,
        request: &PageRequest,
    ) -> Result<Page<Assignment>, ApiError> {
        let predicate = self.scoped_filter(caller, EntityKind::Assignment, filter)?;
        let request = self.page(request)?;
        Ok(self.database.find_assignments(&predicate, &request).await?)
    }

    pub async fn count_assignments(
        &self,
        caller: &CallerScope,
        filter: &str,
    ) -> Result<u64, ApiError> {
        let predicate = self.scoped_filter(caller, EntityKind::Assignment, filter)?;
        Ok(self.database.count_assignments(&predicate).await?)
    }

    /// An AVAILABLE asset in the caller's location
    async fn assignable_asset(&self, caller: &CallerScope, asset_code: &str) -> Result<Asset, ApiError> {
        let asset = self
            .database
            .get_asset(asset_code)
            .await?
            .ok_or_else(|| ApiError::NotFound(ErrorCode::ErrAssetNotFound, asset_code.to_string()))?;
        if asset.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("asset {} belongs to another location", asset.asset_code),
            ));
        }
        if asset.state != AssetState::Available {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssetNotAvailable,
                format!("asset {} is {}", asset.asset_code, asset.state),
            ));
        }
        Ok(asset)
    }

    /// An active user in the caller's location
    async fn active_assignee(&self, caller: &CallerScope, username: &str) -> Result<User, ApiError> {
        let assignee = self
            .database
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ApiError::NotFound(ErrorCode::ErrUserNotFound, username.to_string()))?;
        if assignee.is_deleted {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrUserIsDisabled,
                format!("user {} is disabled", assignee.username),
            ));
        }
        if assignee.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("user {} belongs to another location", assignee.username),
            ));
        }
        Ok(assignee)
    }

    /// Assigns an available asset to an active user; the asset becomes ASSIGNED
    pub async fn create_assignment(
        &self,
        caller: &CallerScope,
        params: NewAssignment,
    ) -> Result<Assignment, ApiError> {
        caller.require_admin()?;
        check_not_in_past(params.assigned_date)?;
        self.assignable_asset(caller, &params.asset_code).await?;
        self.active_assignee(caller, &params.assigned_to).await?;

        let assignment = self
            .database
            .insert_assignment(&params, &caller.username, caller.location_id)
            .await?;
        tracing::info!(
            "Assignment {} created: {} -> {} by {}",
            assignment.assignment_id,
            assignment.asset_code,
            assignment.assigned_to,
            caller.username
        );
        Ok(assignment)
    }

    /// Loads an assignment in the caller's location. Plain users may only load their own.
    pub async fn get_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
    ) -> Result<Assignment, ApiError> {
        let assignment = self.load_assignment(assignment_id).await?;
        if assignment.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("assignment {} belongs to another location", assignment_id),
            ));
        }
        if !caller.is_admin() && assignment.assigned_to != caller.username {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrAccessDenied,
                format!("assignment {} is not assigned to {}", assignment_id, caller.username),
            ));
        }
        Ok(assignment)
    }

    /// Rewrites asset, assignee, date and note of an assignment still waiting for acceptance
    pub async fn edit_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
        params: NewAssignment,
    ) -> Result<Assignment, ApiError> {
        caller.require_admin()?;
        let assignment = self.get_assignment(caller, assignment_id).await?;
        if assignment.state.is_terminal() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssignmentNotWaiting,
                format!("assignment {} is {}", assignment_id, assignment.state),
            ));
        }
        check_not_in_past(params.assigned_date)?;
        if params.asset_code != assignment.asset_code {
            self.assignable_asset(caller, &params.asset_code).await?;
        }
        self.active_assignee(caller, &params.assigned_to).await?;

        let updated = self
            .database
            .update_assignment(assignment_id, &params)
            .await?;
        tracing::info!("Assignment {} edited by {}", assignment_id, caller.username);
        Ok(updated)
    }

    async fn load_assignment(&self, assignment_id: i64) -> Result<Assignment, ApiError> {
        self.database
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(ErrorCode::ErrAssignmentNotFound, assignment_id.to_string())
            })
    }

    /// Moves a waiting assignment to `target` on behalf of its assignee
    async fn respond_to_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
        target: AssignmentState,
        asset_state: Option<AssetState>,
    ) -> Result<(), ApiError> {
        let assignment = self.load_assignment(assignment_id).await?;
        if assignment.assigned_to != caller.username {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrNotAssignee,
                format!("assignment {} is not assigned to {}", assignment_id, caller.username),
            ));
        }
        if !assignment.state.can_transition_to(target) {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssignmentNotWaiting,
                format!("assignment {} is {}", assignment_id, assignment.state),
            ));
        }

        self.database
            .transition_assignment(assignment_id, assignment.state, target, asset_state)
            .await?;
        tracing::info!(
            "Assignment {} {} by {}",
            assignment_id,
            target,
            caller.username
        );
        Ok(())
    }

    pub async fn accept_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
    ) -> Result<(), ApiError> {
        self.respond_to_assignment(caller, assignment_id, AssignmentState::Accepted, None)
            .await
    }

    /// Declining hands the asset back as AVAILABLE
    pub async fn decline_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
    ) -> Result<(), ApiError> {
        self.respond_to_assignment(
            caller,
            assignment_id,
            AssignmentState::Declined,
            Some(AssetState::Available),
        )
        .await
    }

    pub async fn delete_assignment(
        &self,
        caller: &CallerScope,
        assignment_id: i64,
    ) -> Result<(), ApiError> {
        caller.require_admin()?;
        let assignment = self.load_assignment(assignment_id).await?;
        if assignment.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("assignment {} belongs to another location", assignment_id),
            ));
        }
        let asset_state = match assignment.state {
            AssignmentState::Accepted => {
                return Err(ApiError::Conflict(
                    ErrorCode::ErrAssignmentAccepted,
                    format!("assignment {} was already accepted", assignment_id),
                ));
            }
            AssignmentState::WaitingForAcceptance => Some(AssetState::Available),
            AssignmentState::Declined => None,
        };

        self.database
            .soft_delete_assignment(assignment_id, asset_state)
            .await?;
        tracing::info!("Assignment {} deleted by {}", assignment_id, caller.username);
        Ok(())
    }
}
