use super::{ApiError, AssetDeskService, CallerScope};
use crate::search::EntityKind;
use assetdesk_common::{
    Asset, AssetState, CategoryReport, EditAsset, ErrorCode, NewAsset, Page, PageRequest,
};

impl AssetDeskService {
    pub async fn search_assets(
        &self,
        caller: &CallerScope,
        filter: &str,
        request: &PageRequest,
    ) -> Result<Page<Asset>, ApiError> {
        caller.require_admin()?;
        let predicate = self.scoped_filter(caller, EntityKind::Asset, filter)?;
        let request = self.page(request)?;
        Ok(self.database.find_assets(&predicate, &request).await?)
    }

    pub async fn count_assets(&self, caller: &CallerScope, filter: &str) -> Result<u64, ApiError> {
        caller.require_admin()?;
        let predicate = self.scoped_filter(caller, EntityKind::Asset, filter)?;
        Ok(self.database.count_assets(&predicate).await?)
    }

    /// Registers an asset in the caller's location
    pub async fn create_asset(
        &self,
        caller: &CallerScope,
        params: NewAsset,
    ) -> Result<Asset, ApiError> {
        caller.require_admin()?;
        if !params.state.is_initial() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssetStateNotCorrect,
                format!("new assets must be AVAILABLE or NOT_AVAILABLE, got {}", params.state),
            ));
        }
        if params.asset_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrRequiredFieldMissing,
                "asset name is required".to_string(),
            ));
        }

        let params = NewAsset {
            category_code: params.category_code.trim().to_uppercase(),
            ..params
        };
        if !self.database.category_exists(&params.category_code).await? {
            return Err(ApiError::NotFound(
                ErrorCode::ErrCategoryNotFound,
                format!("category {}", params.category_code),
            ));
        }

        let asset = self.database.insert_asset(&params, caller.location_id).await?;
        tracing::info!(
            "Asset {} created by {} at location {}",
            asset.asset_code,
            caller.username,
            caller.location_id
        );
        Ok(asset)
    }

    /// Loads an asset the caller may act on
    async fn asset_in_scope(&self, caller: &CallerScope, asset_code: &str) -> Result<Asset, ApiError> {
        let asset = self
            .database
            .get_asset(asset_code)
            .await?
            .ok_or_else(|| ApiError::NotFound(ErrorCode::ErrAssetNotFound, asset_code.to_string()))?;
        if asset.location_id != caller.location_id {
            return Err(ApiError::Forbidden(
                ErrorCode::ErrLocationMismatch,
                format!("asset {} belongs to another location", asset_code),
            ));
        }
        Ok(asset)
    }

    pub async fn get_asset(&self, caller: &CallerScope, asset_code: &str) -> Result<Asset, ApiError> {
        caller.require_admin()?;
        self.asset_in_scope(caller, asset_code).await
    }

    /// Edits name, specification, install date and state of an asset that is not ASSIGNED
    pub async fn edit_asset(
        &self,
        caller: &CallerScope,
        asset_code: &str,
        edit: EditAsset,
    ) -> Result<Asset, ApiError> {
        caller.require_admin()?;
        if edit.asset_name.trim().is_empty() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrRequiredFieldMissing,
                "asset name is required".to_string(),
            ));
        }
        if !edit.state.is_editable_target() {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssetStateNotCorrect,
                format!("an asset cannot be edited into {}", edit.state),
            ));
        }

        let asset = self.asset_in_scope(caller, asset_code).await?;
        if asset.state == AssetState::Assigned {
            return Err(ApiError::InvalidRequest(
                ErrorCode::ErrAssetStateNotCorrect,
                format!("asset {} is assigned", asset_code),
            ));
        }

        let updated = self.database.update_asset(asset_code, &edit).await?;
        tracing::info!("Asset {} edited by {}", asset_code, caller.username);
        Ok(updated)
    }

    /// Succeeds when the asset exists in scope and has no assignment history
    pub async fn check_delete_asset(
        &self,
        caller: &CallerScope,
        asset_code: &str,
    ) -> Result<Asset, ApiError> {
        caller.require_admin()?;
        let asset = self.asset_in_scope(caller, asset_code).await?;
        if self.database.asset_has_assignments(asset_code).await? {
            return Err(ApiError::Conflict(
                ErrorCode::ErrAssetHasAssignment,
                format!("asset {} has assignment history", asset_code),
            ));
        }
        Ok(asset)
    }

    pub async fn delete_asset(&self, caller: &CallerScope, asset_code: &str) -> Result<(), ApiError> {
        self.check_delete_asset(caller, asset_code).await?;
        self.database.soft_delete_asset(asset_code).await?;
        tracing::info!("Asset {} deleted by {}", asset_code, caller.username);
        Ok(())
    }

    pub async fn asset_report(&self, caller: &CallerScope) -> Result<Vec<CategoryReport>, ApiError> {
        caller.require_admin()?;
        Ok(self.database.category_report(caller.location_id).await?)
    }
}
