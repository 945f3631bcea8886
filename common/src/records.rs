use crate::AssignmentState;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, VariantNames};

macro_rules! display_as_ref {
    ($($ty:ty),+) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_ref())
            }
        })+
    };
}

/// Lifecycle of a physical asset
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AssetState {
    Available,
    NotAvailable,
    Assigned,
    WaitingForRecycle,
    Recycled,
}

impl AssetState {
    /// States an admin may pick when registering a new asset
    pub fn is_initial(&self) -> bool {
        matches!(self, AssetState::Available | AssetState::NotAvailable)
    }

    /// ASSIGNED is only reached through an assignment, never by editing
    pub fn is_editable_target(&self) -> bool {
        !matches!(self, AssetState::Assigned)
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    Admin,
    User,
}

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    AsRefStr,
    EnumIter,
    EnumString,
    VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
    Other,
}

display_as_ref!(AssetState, Role, Gender);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_code: String,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub asset_code: String,
    pub asset_name: String,
    pub category_code: String,
    pub state: AssetState,
    pub install_date: NaiveDate,
    pub specification: Option<String>,
    pub location_id: i64,
    pub is_deleted: bool,
}

/// Admin input for registering an asset; code and location are assigned server-side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub asset_name: String,
    pub category_code: String,
    pub state: AssetState,
    pub install_date: NaiveDate,
    pub specification: Option<String>,
}

/// Admin edit of an existing asset; code, category and location never change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditAsset {
    pub asset_name: String,
    pub specification: Option<String>,
    pub install_date: NaiveDate,
    pub state: AssetState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub staff_code: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub joined_date: NaiveDate,
    pub gender: Gender,
    pub role: Role,
    pub location_id: i64,
    pub is_deleted: bool,
    pub first_login: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub joined_date: NaiveDate,
    pub gender: Gender,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub date_of_birth: NaiveDate,
    pub joined_date: NaiveDate,
    pub gender: Gender,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub assignment_id: i64,
    pub asset_code: String,
    pub assigned_to: String,
    pub assigned_by: String,
    pub assigned_date: NaiveDateTime,
    pub state: AssignmentState,
    pub note: Option<String>,
    pub location_id: i64,
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub asset_code: String,
    /// Username of the assignee
    pub assigned_to: String,
    pub assigned_date: NaiveDateTime,
    pub note: Option<String>,
}

/// Per-category asset counts for one location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub category: String,
    pub total: i64,
    pub available: i64,
    pub not_available: i64,
    pub assigned: i64,
    pub waiting_for_recycle: i64,
    pub recycled: i64,
}

impl CategoryReport {
    pub fn count_total(&mut self) {
        self.total = self.available
            + self.not_available
            + self.assigned
            + self.waiting_for_recycle
            + self.recycled;
    }
}
