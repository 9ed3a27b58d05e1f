//! Search indexer: maintains the searchable representation of one resource.
//!
//! The index stores every suffix of the lowercased resource name (minimum
//! three characters), so a prefix search over `resource_index.kee` answers
//! search-as-you-type over any part of the name. `index` replaces a
//! resource's rows wholesale; it is invoked synchronously after a successful
//! create so store and index never disagree for longer than that step.

use crate::core::db;
use crate::core::error::CatalogError;
use rusqlite::params;
use std::path::{Path, PathBuf};

/// Shortest indexed (and searchable) token.
pub const MINIMUM_KEY_SIZE: usize = 3;

/// Contract consumed by the catalog writer.
pub trait SearchIndexer {
    /// (Re)build the searchable representation of the resource with this id.
    fn index(&self, resource_id: i64) -> Result<(), CatalogError>;
}

/// SQLite-backed indexer writing name-suffix rows next to the catalog.
pub struct SqliteSearchIndexer {
    db_path: PathBuf,
}

impl SqliteSearchIndexer {
    pub fn new(db_path: &Path) -> Self {
        SqliteSearchIndexer {
            db_path: db_path.to_path_buf(),
        }
    }

    /// Resource ids whose indexed name matches `prefix`, shortest-name first.
    /// Prefixes below [`MINIMUM_KEY_SIZE`] match nothing by construction.
    pub fn search(&self, prefix: &str) -> Result<Vec<i64>, CatalogError> {
        let normalized = prefix.trim().to_lowercase();
        // Counted in chars, matching what the index side stores.
        if normalized.chars().count() < MINIMUM_KEY_SIZE {
            return Ok(Vec::new());
        }
        let conn = db::db_connect(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT resource_id, name_size FROM resource_index
             WHERE kee LIKE ?1 ESCAPE '\\'
             ORDER BY name_size, resource_id",
        )?;
        let pattern = format!("{}%", escape_like(&normalized));
        let rows = stmt.query_map(params![pattern], |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            let id = row?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl SearchIndexer for SqliteSearchIndexer {
    fn index(&self, resource_id: i64) -> Result<(), CatalogError> {
        let conn = db::db_connect(&self.db_path)?;
        let name: String = conn
            .query_row(
                "SELECT name FROM resources WHERE id = ?1",
                params![resource_id],
                |row| row.get(0),
            )
            .map_err(|err| match err {
                rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(resource_id),
                other => other.into(),
            })?;

        conn.execute(
            "DELETE FROM resource_index WHERE resource_id = ?1",
            params![resource_id],
        )?;

        let key: Vec<char> = name.to_lowercase().chars().collect();
        let name_size = key.len() as i64;
        // Names shorter than the minimum token stay unindexed.
        if key.len() < MINIMUM_KEY_SIZE {
            return Ok(());
        }
        let mut stmt = conn.prepare(
            "INSERT INTO resource_index(kee, position, name_size, resource_id)
             VALUES(?1, ?2, ?3, ?4)",
        )?;
        for position in 0..=(key.len() - MINIMUM_KEY_SIZE) {
            let suffix: String = key[position..].iter().collect();
            stmt.execute(params![suffix, position as i64, name_size, resource_id])?;
        }
        Ok(())
    }
}
