mod builder;
mod error;
mod parser;
mod record;
mod schema;
mod sort;
mod types;

pub use builder::{Predicate, Specification};
pub use error::SearchError;
pub use parser::parse_filter;
pub use record::Record;
pub use schema::{EntityKind, EntitySchema, FieldSpec, FieldType};
pub use sort::{normalize_page, order_by_clause};
pub use types::{FieldValue, FilterTerm, OperatorKind};
