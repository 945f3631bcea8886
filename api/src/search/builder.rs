use super::error::SearchError;
use super::parser::parse_filter;
use super::record::Record;
use super::schema::EntitySchema;
use super::types::{FieldValue, FilterTerm, OperatorKind};
use std::cmp::Ordering;

/// Ordered, conjunctive list of filter terms requested by a client.
///
/// Built once per request, either from a raw filter string or by chaining
/// [`Specification::with`], then consumed by [`Specification::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    terms: Vec<FilterTerm>,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Self {
        parse_filter(raw)
    }

    pub(crate) fn from_terms(terms: Vec<FilterTerm>) -> Self {
        Self { terms }
    }

    pub fn with(mut self, field: impl Into<String>, operator: OperatorKind, value: impl Into<String>) -> Self {
        self.terms.push(FilterTerm::new(field, operator, value));
        self
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Binds every term against `schema`.
    ///
    /// Fails on unknown fields, on values that do not coerce to the field's
    /// declared type, and on `<`/`>` applied to a non-orderable field.
    pub fn build(&self, schema: &EntitySchema) -> Result<Predicate, SearchError> {
        let terms = self
            .terms
            .iter()
            .map(|term| bind_term(term, schema))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate { terms })
    }
}

fn bind_term(term: &FilterTerm, schema: &EntitySchema) -> Result<BoundTerm, SearchError> {
    let spec = schema.resolve(&term.field)?;
    if term.operator.is_ordering() && !spec.field_type.is_orderable() {
        return Err(SearchError::type_mismatch(
            &term.field,
            format!(
                "operator '{}' requires an orderable field, but {} is {}",
                term.operator.symbol(),
                term.field,
                spec.field_type.name()
            ),
        ));
    }
    let value = spec.field_type.coerce(&term.field, &term.value)?;
    Ok(BoundTerm {
        field: term.field.clone(),
        column: spec.column,
        operator: term.operator,
        value,
    })
}

#[derive(Debug, Clone, PartialEq)]
struct BoundTerm {
    field: String,
    column: &'static str,
    operator: OperatorKind,
    value: FieldValue,
}

impl BoundTerm {
    fn matches(&self, record: &dyn Record) -> Result<bool, SearchError> {
        let Some(actual) = record.value_of(&self.field) else {
            return Ok(false);
        };
        let ordering = actual.compare(&self.value).ok_or_else(|| {
            SearchError::type_mismatch(
                &self.field,
                format!(
                    "record holds {} but the filter value is {}",
                    actual.type_name(),
                    self.value.type_name()
                ),
            )
        })?;
        Ok(match self.operator {
            OperatorKind::Equals => ordering == Ordering::Equal,
            OperatorKind::LessThan => ordering == Ordering::Less,
            OperatorKind::GreaterThan => ordering == Ordering::Greater,
        })
    }
}

/// A schema-bound conjunction of typed comparisons.
///
/// The same predicate can be evaluated in-process with [`Predicate::matches`]
/// or rendered as a SQL `WHERE` fragment with [`Predicate::to_sql`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    terms: Vec<BoundTerm>,
}

impl Predicate {
    /// The unrestricted predicate
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn and(mut self, other: Predicate) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn matches(&self, record: &dyn Record) -> Result<bool, SearchError> {
        for term in &self.terms {
            if !term.matches(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Renders the predicate as a `WHERE` fragment with `?` placeholders.
    /// Returns an empty string for the unrestricted predicate.
    pub fn to_sql(&self) -> (String, Vec<FieldValue>) {
        let sql = self
            .terms
            .iter()
            .map(|t| format!("{} {} ?", t.column, t.operator.sql()))
            .collect::<Vec<_>>()
            .join(" AND ");
        let values = self.terms.iter().map(|t| t.value.clone()).collect();
        (sql, values)
    }
}
