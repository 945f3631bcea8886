/// AST types for the filter expression
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Equals,      // field:value
    LessThan,    // field<value
    GreaterThan, // field>value
}

impl OperatorKind {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ":" => Some(OperatorKind::Equals),
            "<" => Some(OperatorKind::LessThan),
            ">" => Some(OperatorKind::GreaterThan),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorKind::Equals => ":",
            OperatorKind::LessThan => "<",
            OperatorKind::GreaterThan => ">",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, OperatorKind::Equals)
    }

    pub(crate) fn sql(&self) -> &'static str {
        match self {
            OperatorKind::Equals => "=",
            OperatorKind::LessThan => "<",
            OperatorKind::GreaterThan => ">",
        }
    }
}

/// One `field-operator-value` clause of a filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    pub field: String,
    pub operator: OperatorKind,
    pub value: String,
}

impl FilterTerm {
    pub fn new(field: impl Into<String>, operator: OperatorKind, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field, self.operator.symbol(), self.value)
    }
}

/// A value bound to a typed field, both for SQL binding and in-process evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
        }
    }

    /// Ordering between two values of the same type; `None` across types
    pub(crate) fn compare(&self, other: &FieldValue) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}
