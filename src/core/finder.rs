//! Query executor: the shared post-filter / sort / paginate pipeline.
//!
//! Every paginating query mode selects its own candidate set at the store and
//! then flows through [`find`]. Keeping one pipeline means pagination and
//! sorting behave identically across modes.

use crate::core::error::CatalogError;
use crate::core::query::ComponentQuery;
use crate::core::resource::Resource;
use rustc_hash::FxHashSet;

/// One result page plus the match count before pagination (callers render
/// page controls from `total_count`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub items: Vec<Resource>,
    pub total_count: usize,
}

/// Apply the compiled query to a store-selected candidate set.
///
/// Key filter is exact match; name filter is exact, case-sensitive match.
/// Sorting is stable, so an unset `sort` (and ties under a set one) preserve
/// store order. The page slice is `(page_index-1)*page_size ..
/// page_index*page_size`.
pub fn find(
    query: &ComponentQuery,
    candidates: Vec<Resource>,
) -> Result<QueryResult, CatalogError> {
    if query.qualifiers.is_empty() {
        return Err(CatalogError::EmptyQualifierSet);
    }
    if query.page_index <= 0 || query.page_size <= 0 {
        return Err(CatalogError::InvalidPaging);
    }

    let keys: FxHashSet<&str> = query.keys.iter().map(String::as_str).collect();
    let names: FxHashSet<&str> = query.names.iter().map(String::as_str).collect();
    let mut matches: Vec<Resource> = candidates
        .into_iter()
        .filter(|r| keys.is_empty() || keys.contains(r.key.as_str()))
        .filter(|r| names.is_empty() || names.contains(r.name.as_str()))
        .collect();

    // Descending sorts invert the comparator rather than reversing after an
    // ascending sort: reversal would also flip tied elements and lose
    // stability.
    if let Some(field) = query.sort.as_deref() {
        match (field, query.asc) {
            ("name", true) => matches.sort_by(|a, b| a.name.cmp(&b.name)),
            ("name", false) => matches.sort_by(|a, b| b.name.cmp(&a.name)),
            ("key", true) => matches.sort_by(|a, b| a.key.cmp(&b.key)),
            ("key", false) => matches.sort_by(|a, b| b.key.cmp(&a.key)),
            // The compiler validates against SORTABLE_FIELDS; anything else
            // slipped past the coercion boundary.
            (other, _) => return Err(CatalogError::InvalidParameter(format!("sort={other}"))),
        }
    }

    let total_count = matches.len();
    // Both factors are validated positive but otherwise caller-controlled;
    // an offset past i64 (or past the candidate list) is just an empty page.
    let offset = (query.page_index - 1)
        .checked_mul(query.page_size)
        .and_then(|o| usize::try_from(o).ok());
    let items = match offset {
        Some(offset) if offset < matches.len() => matches
            .into_iter()
            .skip(offset)
            .take(usize::try_from(query.page_size).unwrap_or(usize::MAX))
            .collect(),
        _ => Vec::new(),
    };
    Ok(QueryResult { items, total_count })
}
