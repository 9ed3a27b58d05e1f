//! Query compiler: the single boundary between loosely-typed parameter maps
//! and the strict query descriptor the finder consumes.
//!
//! Callers hand over a `serde_json::Map` (the shape transports naturally
//! produce); [`ComponentQuery::compile`] coerces it, rejecting anything that
//! cannot be interpreted with `InvalidParameter` naming the offending key.
//! Unknown keys are ignored. The compiler never touches the store.

use crate::core::error::CatalogError;
use serde_json::{Map, Value as JsonValue};

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const DEFAULT_PAGE_INDEX: i64 = 1;

/// Sort fields the finder knows how to order by.
pub const SORTABLE_FIELDS: &[&str] = &["name", "key"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentQuery {
    /// Exact-match key filter; empty means no key filter.
    pub keys: Vec<String>,
    /// Exact-match name filter; empty means no name filter.
    pub names: Vec<String>,
    /// Primary filter axis. Paginating modes require at least one entry.
    pub qualifiers: Vec<String>,
    pub page_size: i64,
    /// 1-based.
    pub page_index: i64,
    /// One of [`SORTABLE_FIELDS`]; `None` preserves store order.
    pub sort: Option<String>,
    /// Only meaningful when `sort` is set.
    pub asc: bool,
}

impl Default for ComponentQuery {
    fn default() -> Self {
        ComponentQuery {
            keys: Vec::new(),
            names: Vec::new(),
            qualifiers: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            page_index: DEFAULT_PAGE_INDEX,
            sort: None,
            asc: true,
        }
    }
}

impl ComponentQuery {
    /// Compile a raw parameter map into a query descriptor.
    pub fn compile(params: &Map<String, JsonValue>) -> Result<ComponentQuery, CatalogError> {
        let mut query = ComponentQuery {
            keys: to_strings(params.get("keys"), "keys")?,
            names: to_strings(params.get("names"), "names")?,
            qualifiers: to_strings(params.get("qualifiers"), "qualifiers")?,
            ..ComponentQuery::default()
        };
        if let Some(size) = to_integer(params.get("pageSize"), "pageSize")? {
            query.page_size = size;
        }
        if let Some(index) = to_integer(params.get("pageIndex"), "pageIndex")? {
            query.page_index = index;
        }
        // `asc` is only read when a non-empty sort is requested.
        let sort = to_string(params.get("sort"), "sort")?;
        if let Some(field) = sort.filter(|s| !s.is_empty()) {
            if !SORTABLE_FIELDS.contains(&field.as_str()) {
                return Err(CatalogError::InvalidParameter("sort".to_string()));
            }
            query.sort = Some(field);
            if let Some(asc) = to_boolean(params.get("asc"), "asc")? {
                query.asc = asc;
            }
        }
        Ok(query)
    }

    /// Inverse of [`compile`](Self::compile): emit the exact parameter shape
    /// the compiler accepts. Lossless for well-formed queries.
    pub fn to_params(&self) -> Map<String, JsonValue> {
        let mut params = Map::new();
        params.insert("keys".to_string(), string_list(&self.keys));
        params.insert("names".to_string(), string_list(&self.names));
        params.insert("qualifiers".to_string(), string_list(&self.qualifiers));
        params.insert("pageSize".to_string(), JsonValue::from(self.page_size));
        params.insert("pageIndex".to_string(), JsonValue::from(self.page_index));
        if let Some(sort) = &self.sort {
            params.insert("sort".to_string(), JsonValue::from(sort.clone()));
            params.insert("asc".to_string(), JsonValue::from(self.asc));
        }
        params
    }
}

fn string_list(values: &[String]) -> JsonValue {
    JsonValue::from(values.to_vec())
}

/// Missing/null -> empty. A JSON array of scalars becomes one string per
/// element; a plain string is split on commas (the form query strings take).
fn to_strings(value: Option<&JsonValue>, param: &str) -> Result<Vec<String>, CatalogError> {
    match value {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => Ok(s.clone()),
                JsonValue::Number(n) => Ok(n.to_string()),
                _ => Err(CatalogError::InvalidParameter(param.to_string())),
            })
            .collect(),
        Some(_) => Err(CatalogError::InvalidParameter(param.to_string())),
    }
}

fn to_string(value: Option<&JsonValue>, param: &str) -> Result<Option<String>, CatalogError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(CatalogError::InvalidParameter(param.to_string())),
    }
}

fn to_integer(value: Option<&JsonValue>, param: &str) -> Result<Option<i64>, CatalogError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| CatalogError::InvalidParameter(param.to_string())),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| CatalogError::InvalidParameter(param.to_string())),
        Some(_) => Err(CatalogError::InvalidParameter(param.to_string())),
    }
}

fn to_boolean(value: Option<&JsonValue>, param: &str) -> Result<Option<bool>, CatalogError> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Bool(b)) => Ok(Some(*b)),
        Some(JsonValue::String(s)) => match s.trim() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            _ => Err(CatalogError::InvalidParameter(param.to_string())),
        },
        Some(_) => Err(CatalogError::InvalidParameter(param.to_string())),
    }
}
