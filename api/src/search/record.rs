use super::types::FieldValue;
use assetdesk_common::{Asset, Assignment, User};
use std::collections::HashMap;

/// Read access to a record's fields by their client-facing names
pub trait Record {
    fn value_of(&self, field: &str) -> Option<FieldValue>;
}

impl Record for HashMap<String, FieldValue> {
    fn value_of(&self, field: &str) -> Option<FieldValue> {
        self.get(field).cloned()
    }
}

fn text(s: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(s.to_string()))
}

impl Record for Asset {
    fn value_of(&self, field: &str) -> Option<FieldValue> {
        match field {
            "assetCode" => text(&self.asset_code),
            "assetName" => text(&self.asset_name),
            "categoryCode" => text(&self.category_code),
            "state" => text(self.state.as_ref()),
            "installDate" => Some(FieldValue::Date(self.install_date)),
            "location" => Some(FieldValue::Integer(self.location_id)),
            "isDeleted" => Some(FieldValue::Boolean(self.is_deleted)),
            _ => None,
        }
    }
}

impl Record for User {
    fn value_of(&self, field: &str) -> Option<FieldValue> {
        match field {
            "staffCode" => text(&self.staff_code),
            "username" => text(&self.username),
            "firstName" => text(&self.first_name),
            "lastName" => text(&self.last_name),
            "dateOfBirth" => Some(FieldValue::Date(self.date_of_birth)),
            "joinedDate" => Some(FieldValue::Date(self.joined_date)),
            "gender" => text(self.gender.as_ref()),
            "role" => text(self.role.as_ref()),
            "location" => Some(FieldValue::Integer(self.location_id)),
            "isDeleted" => Some(FieldValue::Boolean(self.is_deleted)),
            _ => None,
        }
    }
}

impl Record for Assignment {
    fn value_of(&self, field: &str) -> Option<FieldValue> {
        match field {
            "assignmentId" => Some(FieldValue::Integer(self.assignment_id)),
            "assetCode" => text(&self.asset_code),
            "assignedTo" => text(&self.assigned_to),
            "assignedBy" => text(&self.assigned_by),
            "assignedDate" => Some(FieldValue::DateTime(self.assigned_date)),
            "state" => text(self.state.as_ref()),
            "location" => Some(FieldValue::Integer(self.location_id)),
            "isDeleted" => Some(FieldValue::Boolean(self.is_deleted)),
            _ => None,
        }
    }
}
