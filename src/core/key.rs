//! Module-key grammar.
//!
//! A valid key is non-empty, contains only alphanumerics, '-', '_', '.' and
//! ':', and has at least one non-digit character (an all-digit key would be
//! ambiguous with a surrogate id). Both write paths go through
//! [`check_key_format`]; the rule lives here and nowhere else.

use crate::core::error::CatalogError;
use regex::Regex;
use std::sync::LazyLock;

static MODULE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z\-_.:]*[A-Za-z\-_.:][0-9A-Za-z\-_.:]*$").unwrap()
});

/// Pure predicate: does `key` satisfy the module-key grammar?
pub fn is_valid_module_key(key: &str) -> bool {
    MODULE_KEY_RE.is_match(key)
}

/// Gate used by the write paths. No I/O, no store access.
pub fn check_key_format(key: &str) -> Result<(), CatalogError> {
    if is_valid_module_key(key) {
        Ok(())
    } else {
        Err(CatalogError::MalformedKey(key.to_string()))
    }
}
