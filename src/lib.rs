//! Corral: a keyed component catalog.
//!
//! Corral maintains a catalog of hierarchical, uniquely-keyed organizational
//! resources (projects, modules, files — "components"), creates and renames
//! them under strict key-format and uniqueness rules, and answers filtered,
//! paginated, sorted queries over subsets of the catalog.
//!
//! # Architecture
//!
//! - **Key validator** ([`core::key`]): one reusable grammar rule shared by
//!   both write paths.
//! - **Catalog store** ([`core::store`]): narrow DAO trait plus the default
//!   SQLite store; the store's UNIQUE constraint on keys is the source of
//!   truth for uniqueness.
//! - **Search indexer** ([`core::indexer`]): name-suffix index rebuilt
//!   synchronously after every successful create.
//! - **Query compiler** ([`core::query`]): the single boundary coercing
//!   loosely-typed parameter maps into strict query descriptors.
//! - **Query executor** ([`core::finder`]): one shared filter/sort/paginate
//!   pipeline across all query modes.
//! - **Writer/facade** ([`core::service`]): create, rename, and the four
//!   query modes (standard, including-incomplete, ghosts, provisioned).
//!
//! # Example
//!
//! ```no_run
//! use corral::core::indexer::SqliteSearchIndexer;
//! use corral::core::service::ComponentService;
//! use corral::core::store::SqliteCatalogStore;
//! use corral::core::resource::{qualifiers, scopes};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), corral::core::error::CatalogError> {
//! let db = Path::new("catalog.db");
//! let store = SqliteCatalogStore::new(db);
//! store.initialize()?;
//! let indexer = SqliteSearchIndexer::new(db);
//! let service = ComponentService::new(&store, &indexer);
//!
//! let created = service.create_component(
//!     "org.corral:core",
//!     "Corral Core",
//!     scopes::PROJECT,
//!     qualifiers::PROJECT,
//! )?;
//! assert!(created.id.is_some());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
