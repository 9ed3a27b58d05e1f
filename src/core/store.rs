//! Catalog store: the narrow DAO contract plus the default SQLite store.
//!
//! The writer and the finder only see [`CatalogStore`]. The SQLite
//! implementation opens a fresh connection per operation (WAL keeps readers
//! and the single writer out of each other's way) and owns the one uniqueness
//! constraint that is the real source of truth for keys: a violation during
//! insert is normalized to `DuplicateKey` so racing creates surface the same
//! error the pre-check would have produced.

use crate::core::db;
use crate::core::error::CatalogError;
use crate::core::resource::Resource;
use crate::core::time;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// Which candidate set a query selects before the shared pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Completed, currently visible projects.
    Standard,
    /// Standard plus projects whose latest analysis has not finished.
    IncludingIncomplete,
    /// Historical records with no current valid counterpart.
    Ghosts,
    /// Created but never analyzed.
    Provisioned,
}

/// Analysis outcome recorded against a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// Analysis started but not finished.
    Unprocessed,
    /// Analysis completed.
    Processed,
}

impl SnapshotStatus {
    fn as_str(self) -> &'static str {
        match self {
            SnapshotStatus::Unprocessed => "U",
            SnapshotStatus::Processed => "P",
        }
    }
}

/// Narrow DAO contract consumed by the writer and the finder.
pub trait CatalogStore {
    fn find_by_key(&self, key: &str) -> Result<Option<Resource>, CatalogError>;
    fn find_by_id(&self, id: i64) -> Result<Option<Resource>, CatalogError>;
    /// Insert (id `None`) or update (id `Some`) one resource. A unique-key
    /// collision is reported as `DuplicateKey`, never as a raw SQLite error.
    fn insert_or_update(&self, resource: &Resource) -> Result<(), CatalogError>;
    /// Qualifier-filtered candidate set for `mode`, in stable store order.
    fn select_by_qualifiers(
        &self,
        qualifiers: &[String],
        mode: SelectionMode,
    ) -> Result<Vec<Resource>, CatalogError>;
}

/// SQLite-backed catalog store.
pub struct SqliteCatalogStore {
    db_path: PathBuf,
}

const RESOURCE_COLUMNS: &str = "id, kee, name, long_name, scope, qualifier, created_at";

fn resource_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Resource> {
    Ok(Resource {
        id: Some(row.get(0)?),
        key: row.get(1)?,
        name: row.get(2)?,
        long_name: row.get(3)?,
        scope: row.get(4)?,
        qualifier: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn is_unique_key_violation(err: &rusqlite::Error) -> bool {
    err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
        && err.to_string().contains("resources.kee")
}

impl SqliteCatalogStore {
    pub fn new(db_path: &Path) -> Self {
        SqliteCatalogStore {
            db_path: db_path.to_path_buf(),
        }
    }

    pub fn initialize(&self) -> Result<(), CatalogError> {
        db::initialize_catalog_db(&self.db_path)
    }

    fn connect(&self) -> Result<Connection, CatalogError> {
        db::db_connect(&self.db_path)
    }

    /// Analyzer-side hook: record one analysis outcome for a resource. The
    /// analyzer itself lives outside this crate; the derived views
    /// (provisioned/ghost/incomplete) key off these rows.
    pub fn record_snapshot(
        &self,
        resource_id: i64,
        status: SnapshotStatus,
        islast: bool,
    ) -> Result<(), CatalogError> {
        let conn = self.connect()?;
        if islast {
            // At most one current snapshot per resource.
            conn.execute(
                "UPDATE snapshots SET islast = 0 WHERE resource_id = ?1",
                params![resource_id],
            )?;
        }
        conn.execute(
            "INSERT INTO snapshots(resource_id, status, islast, created_at) VALUES(?1, ?2, ?3, ?4)",
            params![
                resource_id,
                status.as_str(),
                islast as i64,
                time::now_epoch_z()
            ],
        )?;
        Ok(())
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn find_by_key(&self, key: &str) -> Result<Option<Resource>, CatalogError> {
        let conn = self.connect()?;
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE kee = ?1");
        let found = conn
            .query_row(&sql, params![key], resource_from_row)
            .optional()?;
        Ok(found)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Resource>, CatalogError> {
        let conn = self.connect()?;
        let sql = format!("SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ?1");
        let found = conn
            .query_row(&sql, params![id], resource_from_row)
            .optional()?;
        Ok(found)
    }

    fn insert_or_update(&self, resource: &Resource) -> Result<(), CatalogError> {
        let conn = self.connect()?;
        let result = match resource.id {
            Some(id) => conn.execute(
                "UPDATE resources SET kee = ?1, name = ?2, long_name = ?3, scope = ?4,
                 qualifier = ?5, created_at = ?6 WHERE id = ?7",
                params![
                    resource.key,
                    resource.name,
                    resource.long_name,
                    resource.scope,
                    resource.qualifier,
                    resource.created_at,
                    id
                ],
            ),
            None => conn.execute(
                "INSERT INTO resources(kee, name, long_name, scope, qualifier, created_at)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    resource.key,
                    resource.name,
                    resource.long_name,
                    resource.scope,
                    resource.qualifier,
                    resource.created_at
                ],
            ),
        };
        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_key_violation(&err) => {
                Err(CatalogError::DuplicateKey(resource.key.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn select_by_qualifiers(
        &self,
        qualifiers: &[String],
        mode: SelectionMode,
    ) -> Result<Vec<Resource>, CatalogError> {
        // IN () matches nothing; callers that consider that an error guard
        // before reaching the store.
        if qualifiers.is_empty() {
            return Ok(Vec::new());
        }
        let predicate = match mode {
            SelectionMode::Standard => {
                "EXISTS (SELECT 1 FROM snapshots s
                  WHERE s.resource_id = r.id AND s.status = 'P' AND s.islast = 1)"
            }
            SelectionMode::IncludingIncomplete => {
                "EXISTS (SELECT 1 FROM snapshots s
                  WHERE s.resource_id = r.id
                    AND ((s.status = 'P' AND s.islast = 1) OR s.status = 'U'))"
            }
            SelectionMode::Ghosts => {
                "EXISTS (SELECT 1 FROM snapshots s WHERE s.resource_id = r.id)
                 AND NOT EXISTS (SELECT 1 FROM snapshots s
                  WHERE s.resource_id = r.id AND s.status = 'P' AND s.islast = 1)"
            }
            SelectionMode::Provisioned => {
                "NOT EXISTS (SELECT 1 FROM snapshots s WHERE s.resource_id = r.id)"
            }
        };
        let placeholders = (1..=qualifiers.len())
            .map(|n| format!("?{n}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM resources r
             WHERE r.qualifier IN ({placeholders}) AND {predicate}
             ORDER BY r.id",
            RESOURCE_COLUMNS
                .split(", ")
                .map(|c| format!("r.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(qualifiers.iter()),
            resource_from_row,
        )?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
