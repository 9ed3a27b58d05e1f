use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("SQLite error: {0}")]
    RusqliteError(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Malformed key: '{0}' (allowed characters are alphanumeric, '-', '_', '.' and ':', with at least one non-digit)")]
    MalformedKey(String),
    #[error("Key already exists: {0}")]
    DuplicateKey(String),
    #[error("Component not found: id {0}")]
    NotFound(i64),
    #[error("Component not persisted after write: {0}")]
    WriteNotPersisted(String),
    #[error("Invalid value for parameter '{0}'")]
    InvalidParameter(String),
    #[error("Page index and page size must be strictly positive")]
    InvalidPaging,
    #[error("At least one qualifier is required")]
    EmptyQualifierSet,
    #[error("Indexing failed for component id {id}: {reason}")]
    IndexingFailed { id: i64, reason: String },
}

impl CatalogError {
    /// True for errors the caller can fix by correcting its input; false for
    /// internal faults (store inconsistency, SQLite or I/O failures).
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CatalogError::MalformedKey(_)
                | CatalogError::DuplicateKey(_)
                | CatalogError::NotFound(_)
                | CatalogError::InvalidParameter(_)
                | CatalogError::InvalidPaging
                | CatalogError::EmptyQualifierSet
        )
    }
}
