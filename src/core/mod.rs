pub mod db;
pub mod error;
pub mod finder;
pub mod indexer;
pub mod key;
pub mod query;
pub mod resource;
pub mod schemas;
pub mod service;
pub mod store;
pub mod time;
