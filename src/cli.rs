//! CLI struct definitions and dispatch for the `corral` binary.
//!
//! The CLI is a thin caller: it assembles the same loosely-typed parameter
//! maps a transport would hand the service and renders the results. All
//! catalog semantics live in [`crate::core`].

use crate::core::db;
use crate::core::error::CatalogError;
use crate::core::indexer::SqliteSearchIndexer;
use crate::core::resource::{Resource, qualifiers, scopes};
use crate::core::service::ComponentService;
use crate::core::store::{SnapshotStatus, SqliteCatalogStore};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::{Map, Value as JsonValue, json};
use std::path::PathBuf;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum FindMode {
    /// Completed, currently visible components.
    Standard,
    /// Standard plus components whose latest analysis is unfinished.
    Incomplete,
    /// Components with history but no current live counterpart.
    Ghosts,
    /// Components created but never analyzed (flat list, no paging).
    Provisioned,
}

#[derive(Parser, Debug)]
#[clap(
    name = "corral",
    version = env!("CARGO_PKG_VERSION"),
    about = "Keyed component catalog: create, rename, index and query uniquely-keyed components."
)]
pub struct Cli {
    /// Path to the catalog database (falls back to $CORRAL_DB, then ./catalog.db).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,
    /// Output format for command results.
    #[clap(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the catalog database.
    Init,
    /// Create a component.
    Create {
        /// Unique component key (module-key grammar).
        #[clap(long)]
        key: String,
        /// Display name.
        #[clap(long)]
        name: String,
        #[clap(long, default_value = scopes::PROJECT)]
        scope: String,
        #[clap(long, default_value = qualifiers::PROJECT)]
        qualifier: String,
    },
    /// Rename a component's key and display name.
    Update {
        #[clap(long)]
        id: i64,
        #[clap(long)]
        key: String,
        #[clap(long)]
        name: String,
    },
    /// Show one component by key.
    Show {
        #[clap(long)]
        key: String,
    },
    /// Query the catalog.
    Find {
        /// Selection mode.
        #[clap(long, value_enum, default_value = "standard")]
        mode: FindMode,
        /// Comma-separated exact key filter.
        #[clap(long)]
        keys: Option<String>,
        /// Comma-separated exact name filter.
        #[clap(long)]
        names: Option<String>,
        /// Comma-separated qualifier tags.
        #[clap(long, default_value = qualifiers::PROJECT)]
        qualifiers: String,
        #[clap(long)]
        page_size: Option<i64>,
        #[clap(long)]
        page_index: Option<i64>,
        /// Sort field (name or key).
        #[clap(long)]
        sort: Option<String>,
        /// Sort descending (only with --sort).
        #[clap(long)]
        desc: bool,
    },
    /// Search indexed component names by prefix.
    Search {
        #[clap(value_name = "PREFIX")]
        prefix: String,
    },
    /// Record an analysis snapshot for a component (analyzer-side hook).
    Snapshot {
        #[clap(long)]
        id: i64,
        /// Mark the analysis as finished.
        #[clap(long)]
        processed: bool,
        /// Mark this snapshot as the current one.
        #[clap(long)]
        last: bool,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = cli
        .db
        .or_else(|| std::env::var_os("CORRAL_DB").map(PathBuf::from))
        .unwrap_or_else(|| db::catalog_db_path(std::path::Path::new(".")));

    let store = SqliteCatalogStore::new(&db_path);
    let indexer = SqliteSearchIndexer::new(&db_path);
    let service = ComponentService::new(&store, &indexer);
    let format = cli.format;

    match cli.command {
        Command::Init => {
            store.initialize()?;
            emit(
                format,
                json!({ "status": "ok", "db": db_path.display().to_string() }),
                || {
                    println!(
                        "{} catalog initialized at {}",
                        "ok:".green().bold(),
                        db_path.display()
                    );
                },
            );
        }
        Command::Create {
            key,
            name,
            scope,
            qualifier,
        } => {
            let created = service
                .create_component(&key, &name, &scope, &qualifier)
                .context("create failed")?;
            emit(format, json!({ "status": "ok", "component": &created }), || {
                println!(
                    "{} created {} (id {})",
                    "ok:".green().bold(),
                    created.key,
                    created.id.unwrap_or_default()
                );
            });
        }
        Command::Update { id, key, name } => {
            let updated = service
                .update_component(id, &key, &name)
                .context("update failed")?;
            emit(format, json!({ "status": "ok", "component": &updated }), || {
                println!("{} updated id {} -> {}", "ok:".green().bold(), id, updated.key);
            });
        }
        Command::Show { key } => match service.find_by_key(&key)? {
            Some(resource) => emit(format, json!({ "component": &resource }), || {
                print_resource(&resource);
            }),
            None => {
                emit(format, json!({ "component": JsonValue::Null }), || {
                    println!("{} no component with key {}", "miss:".yellow().bold(), key);
                });
            }
        },
        Command::Find {
            mode,
            keys,
            names,
            qualifiers,
            page_size,
            page_index,
            sort,
            desc,
        } => {
            let mut params = Map::new();
            params.insert("qualifiers".to_string(), JsonValue::from(qualifiers));
            if let Some(keys) = keys {
                params.insert("keys".to_string(), JsonValue::from(keys));
            }
            if let Some(names) = names {
                params.insert("names".to_string(), JsonValue::from(names));
            }
            if let Some(size) = page_size {
                params.insert("pageSize".to_string(), JsonValue::from(size));
            }
            if let Some(index) = page_index {
                params.insert("pageIndex".to_string(), JsonValue::from(index));
            }
            if let Some(sort) = sort {
                params.insert("sort".to_string(), JsonValue::from(sort));
                params.insert("asc".to_string(), JsonValue::from(!desc));
            }

            if mode == FindMode::Provisioned {
                let items = service.find_provisioned(&params)?;
                emit(
                    format,
                    json!({ "items": &items, "totalCount": items.len() }),
                    || {
                        for resource in &items {
                            print_resource(resource);
                        }
                        println!("{} provisioned", items.len());
                    },
                );
                return Ok(());
            }

            let result = match mode {
                FindMode::Standard => service.find(&params)?,
                FindMode::Incomplete => service.find_including_incomplete(&params)?,
                FindMode::Ghosts => service.find_ghosts(&params)?,
                FindMode::Provisioned => unreachable!(),
            };
            emit(
                format,
                json!({ "items": &result.items, "totalCount": result.total_count }),
                || {
                    for resource in &result.items {
                        print_resource(resource);
                    }
                    println!("{}/{} matches", result.items.len(), result.total_count);
                },
            );
        }
        Command::Search { prefix } => {
            let ids = indexer.search(&prefix)?;
            let mut items = Vec::new();
            for id in ids {
                if let Some(resource) = lookup(&store, id)? {
                    items.push(resource);
                }
            }
            emit(format, json!({ "items": &items }), || {
                for resource in &items {
                    print_resource(resource);
                }
                println!("{} matches", items.len());
            });
        }
        Command::Snapshot {
            id,
            processed,
            last,
        } => {
            let status = if processed {
                SnapshotStatus::Processed
            } else {
                SnapshotStatus::Unprocessed
            };
            store.record_snapshot(id, status, last)?;
            emit(format, json!({ "status": "ok", "id": id }), || {
                println!("{} snapshot recorded for id {}", "ok:".green().bold(), id);
            });
        }
    }
    Ok(())
}

fn lookup(store: &SqliteCatalogStore, id: i64) -> Result<Option<Resource>, CatalogError> {
    use crate::core::store::CatalogStore;
    store.find_by_id(id)
}

fn emit(format: OutputFormat, payload: JsonValue, text: impl FnOnce()) {
    match format {
        OutputFormat::Json => println!("{}", payload),
        OutputFormat::Text => text(),
    }
}

fn print_resource(resource: &Resource) {
    println!(
        "{:>6}  {:<4} {:<4} {}  {}",
        resource.id.unwrap_or_default(),
        resource.qualifier,
        resource.scope,
        resource.key.bold(),
        resource.name
    );
}
