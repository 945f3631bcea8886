use super::error::SearchError;
use super::schema::EntitySchema;
use assetdesk_common::{PageRequest, SortDirection, SortOrder};

/// Renders `ORDER BY` keys for the requested sort, falling back to `default`
/// when the request names none.
pub fn order_by_clause(
    schema: &EntitySchema,
    sort: &[SortOrder],
    default: &[SortOrder],
) -> Result<String, SearchError> {
    let keys = if sort.is_empty() { default } else { sort };
    let rendered = keys
        .iter()
        .map(|order| {
            let spec = schema.resolve(&order.field)?;
            let dir = match order.direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            Ok(format!("{} {}", spec.column, dir))
        })
        .collect::<Result<Vec<_>, SearchError>>()?;
    Ok(rendered.join(", "))
}

/// Rejects empty pages and clamps oversized ones to `max_size`
pub fn normalize_page(request: &PageRequest, max_size: u32) -> Result<PageRequest, SearchError> {
    if request.size == 0 {
        return Err(SearchError::InvalidPage(
            "page size must be at least 1".to_string(),
        ));
    }
    let mut normalized = request.clone();
    if normalized.size > max_size {
        tracing::debug!(
            "Clamping page size {} to maximum {}",
            normalized.size,
            max_size
        );
        normalized.size = max_size;
    }
    Ok(normalized)
}
