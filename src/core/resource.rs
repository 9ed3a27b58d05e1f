//! The catalog's unit of storage.
//!
//! A [`Resource`] is any cataloged organizational unit: a project, a module
//! inside a project, a directory, a file. The `qualifier` tag is the primary
//! filter axis for queries; `scope` is the coarse tree position.

use serde::{Deserialize, Serialize};

/// Qualifier tags. The catalog layer treats qualifiers as opaque strings;
/// these constants name the ones the default tooling knows about.
pub mod qualifiers {
    /// Top-level project.
    pub const PROJECT: &str = "TRK";
    /// Module inside a project.
    pub const MODULE: &str = "BRC";
    /// Directory.
    pub const DIRECTORY: &str = "DIR";
    /// Source file.
    pub const FILE: &str = "FIL";
}

/// Scope tags: coarse position in the component tree.
pub mod scopes {
    /// Project-tree position (projects, modules).
    pub const PROJECT: &str = "PRJ";
    /// Directory-tree position.
    pub const DIRECTORY: &str = "DIR";
    /// File-tree position (leaves).
    pub const FILE: &str = "FIL";
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Store-assigned surrogate id; `None` until the first successful insert.
    pub id: Option<i64>,
    pub key: String,
    pub name: String,
    pub long_name: String,
    pub scope: String,
    pub qualifier: String,
    /// Epoch-seconds timestamp (`{secs}Z`), set once at creation.
    pub created_at: String,
}

impl Resource {
    /// A fresh, unpersisted resource. `long_name` defaults to `name`.
    pub fn new(key: &str, name: &str, scope: &str, qualifier: &str, created_at: String) -> Self {
        Resource {
            id: None,
            key: key.to_string(),
            name: name.to_string(),
            long_name: name.to_string(),
            scope: scope.to_string(),
            qualifier: qualifier.to_string(),
            created_at,
        }
    }
}
