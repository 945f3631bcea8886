use super::error::SearchError;
use super::types::FieldValue;
use assetdesk_common::{AssetState, AssignmentState, Gender, Role};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::sync::OnceLock;
use strum::VariantNames;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Text,
    Integer,
    Boolean,
    Date,
    DateTime,
    /// Closed set of canonical names, stored as text
    Enum(&'static [&'static str]),
}

const DATE_FORMATS: &[&str] = &["%Y%m%d", "%Y-%m-%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

impl FieldType {
    /// Only these types accept `<` and `>`
    pub fn is_orderable(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Date | FieldType::DateTime
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Enum(_) => "enum",
        }
    }

    /// Converts raw filter text to a value of this type
    pub fn coerce(&self, field: &str, raw: &str) -> Result<FieldValue, SearchError> {
        let mismatch = || {
            SearchError::type_mismatch(
                field,
                format!("'{}' is not a valid {} value", raw, self.name()),
            )
        };

        match self {
            FieldType::Text => Ok(FieldValue::Text(raw.to_string())),
            FieldType::Integer => raw
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| mismatch()),
            FieldType::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(FieldValue::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(FieldValue::Boolean(false))
                } else {
                    Err(mismatch())
                }
            }
            FieldType::Date => parse_date(raw).map(FieldValue::Date).ok_or_else(mismatch),
            FieldType::DateTime => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
                .map(FieldValue::DateTime)
                .ok_or_else(mismatch),
            FieldType::Enum(variants) => variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(raw))
                .map(|v| FieldValue::Text(v.to_string()))
                .ok_or_else(|| {
                    SearchError::type_mismatch(
                        field,
                        format!("'{}' is not one of {}", raw, variants.join(", ")),
                    )
                }),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub column: &'static str,
    pub field_type: FieldType,
}

impl FieldSpec {
    fn new(column: &'static str, field_type: FieldType) -> Self {
        Self { column, field_type }
    }
}

/// Explicit mapping from client-facing field names to typed columns of one table
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: &'static str,
    table: &'static str,
    fields: HashMap<&'static str, FieldSpec>,
}

impl EntitySchema {
    pub fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            fields: HashMap::new(),
        }
    }

    pub fn field(mut self, name: &'static str, column: &'static str, field_type: FieldType) -> Self {
        self.fields.insert(name, FieldSpec::new(column, field_type));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn get(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.get(field)
    }

    pub fn resolve(&self, field: &str) -> Result<&FieldSpec, SearchError> {
        self.get(field).ok_or_else(|| SearchError::UnknownField {
            entity: self.name,
            field: field.to_string(),
        })
    }

    /// Sorted field names, for help output and error messages
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.fields.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Asset,
    User,
    Assignment,
}

static ASSET_SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
static USER_SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
static ASSIGNMENT_SCHEMA: OnceLock<EntitySchema> = OnceLock::new();

impl EntityKind {
    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityKind::Asset => ASSET_SCHEMA.get_or_init(asset_schema),
            EntityKind::User => USER_SCHEMA.get_or_init(user_schema),
            EntityKind::Assignment => ASSIGNMENT_SCHEMA.get_or_init(assignment_schema),
        }
    }
}

fn asset_schema() -> EntitySchema {
    EntitySchema::new("asset", "assets")
        .field("assetCode", "asset_code", FieldType::Text)
        .field("assetName", "asset_name", FieldType::Text)
        .field("categoryCode", "category_code", FieldType::Text)
        .field("state", "state", FieldType::Enum(AssetState::VARIANTS))
        .field("installDate", "install_date", FieldType::Date)
        .field("location", "location_id", FieldType::Integer)
        .field("isDeleted", "is_deleted", FieldType::Boolean)
}

fn user_schema() -> EntitySchema {
    EntitySchema::new("user", "users")
        .field("staffCode", "staff_code", FieldType::Text)
        .field("username", "username", FieldType::Text)
        .field("firstName", "first_name", FieldType::Text)
        .field("lastName", "last_name", FieldType::Text)
        .field("dateOfBirth", "date_of_birth", FieldType::Date)
        .field("joinedDate", "joined_date", FieldType::Date)
        .field("gender", "gender", FieldType::Enum(Gender::VARIANTS))
        .field("role", "role", FieldType::Enum(Role::VARIANTS))
        .field("location", "location_id", FieldType::Integer)
        .field("isDeleted", "is_deleted", FieldType::Boolean)
}

fn assignment_schema() -> EntitySchema {
    EntitySchema::new("assignment", "assignments")
        .field("assignmentId", "assignment_id", FieldType::Integer)
        .field("assetCode", "asset_code", FieldType::Text)
        .field("assignedTo", "assigned_to", FieldType::Text)
        .field("assignedBy", "assigned_by", FieldType::Text)
        .field("assignedDate", "assigned_date", FieldType::DateTime)
        .field("state", "state", FieldType::Enum(AssignmentState::VARIANTS))
        .field("location", "location_id", FieldType::Integer)
        .field("isDeleted", "is_deleted", FieldType::Boolean)
}
