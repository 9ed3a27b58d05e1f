//! Centralized database schema definitions for the catalog store.
//!
//! One SQLite database holds three tables:
//! 1. resources: the primary catalog (unique natural key, rowid surrogate id).
//! 2. snapshots: per-resource analysis history written by the analyzer side.
//! 3. resource_index: searchable name-suffix rows maintained by the indexer.

pub const CATALOG_DB_NAME: &str = "catalog.db";

pub const CATALOG_DB_SCHEMA_RESOURCES: &str = "
    CREATE TABLE IF NOT EXISTS resources (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kee TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        long_name TEXT NOT NULL,
        scope TEXT NOT NULL,
        qualifier TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
";
pub const CATALOG_DB_SCHEMA_RESOURCES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_resources_qualifier ON resources(qualifier)";

pub const CATALOG_DB_SCHEMA_SNAPSHOTS: &str = "
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        resource_id INTEGER NOT NULL,
        status TEXT NOT NULL,
        islast INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        FOREIGN KEY(resource_id) REFERENCES resources(id)
    )
";
pub const CATALOG_DB_SCHEMA_SNAPSHOTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_snapshots_resource ON snapshots(resource_id)";

pub const CATALOG_DB_SCHEMA_RESOURCE_INDEX: &str = "
    CREATE TABLE IF NOT EXISTS resource_index (
        kee TEXT NOT NULL,
        position INTEGER NOT NULL,
        name_size INTEGER NOT NULL,
        resource_id INTEGER NOT NULL,
        FOREIGN KEY(resource_id) REFERENCES resources(id)
    )
";
pub const CATALOG_DB_SCHEMA_RESOURCE_INDEX_KEE: &str =
    "CREATE INDEX IF NOT EXISTS idx_resource_index_kee ON resource_index(kee)";
pub const CATALOG_DB_SCHEMA_RESOURCE_INDEX_RID: &str =
    "CREATE INDEX IF NOT EXISTS idx_resource_index_rid ON resource_index(resource_id)";

/// All statements needed to bring an empty database up to the current schema.
pub const CATALOG_DB_STATEMENTS: &[&str] = &[
    CATALOG_DB_SCHEMA_RESOURCES,
    CATALOG_DB_SCHEMA_RESOURCES_INDEX,
    CATALOG_DB_SCHEMA_SNAPSHOTS,
    CATALOG_DB_SCHEMA_SNAPSHOTS_INDEX,
    CATALOG_DB_SCHEMA_RESOURCE_INDEX,
    CATALOG_DB_SCHEMA_RESOURCE_INDEX_KEE,
    CATALOG_DB_SCHEMA_RESOURCE_INDEX_RID,
];
