use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &Path) -> Result<Connection, error::CatalogError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::CatalogError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::CatalogError::RusqliteError)?;
    conn.execute("PRAGMA foreign_keys=ON;", [])
        .map_err(error::CatalogError::RusqliteError)?;
    Ok(conn)
}

pub fn catalog_db_path(root: &Path) -> PathBuf {
    root.join(schemas::CATALOG_DB_NAME)
}

pub fn initialize_catalog_db(db_path: &Path) -> Result<(), error::CatalogError> {
    if let Some(parent_dir) = db_path.parent()
        && !parent_dir.as_os_str().is_empty()
    {
        fs::create_dir_all(parent_dir).map_err(error::CatalogError::IoError)?;
    }

    let conn = db_connect(db_path)?;
    for stmt in schemas::CATALOG_DB_STATEMENTS {
        conn.execute(stmt, [])?;
    }
    Ok(())
}
