//! Catalog writer and caller-facing facade.
//!
//! [`ComponentService`] orchestrates creates and renames against the store,
//! enforcing the key grammar and uniqueness before any mutation, and answers
//! the four query modes through one compile/select/pipeline path.
//!
//! The uniqueness pre-check in `create_component` is check-then-act: two
//! racing creates can both pass it. The store's UNIQUE constraint is the
//! source of truth; the loser's constraint violation is normalized to the
//! same `DuplicateKey` the pre-check produces, so callers see one error kind
//! either way.

use crate::core::error::CatalogError;
use crate::core::finder::{self, QueryResult};
use crate::core::indexer::SearchIndexer;
use crate::core::key;
use crate::core::query::ComponentQuery;
use crate::core::resource::Resource;
use crate::core::store::{CatalogStore, SelectionMode};
use crate::core::time;
use serde_json::{Map, Value as JsonValue};

pub struct ComponentService<'a> {
    store: &'a dyn CatalogStore,
    indexer: &'a dyn SearchIndexer,
}

impl<'a> ComponentService<'a> {
    pub fn new(store: &'a dyn CatalogStore, indexer: &'a dyn SearchIndexer) -> Self {
        ComponentService { store, indexer }
    }

    /// Direct key lookup, bypassing the query pipeline.
    pub fn find_by_key(&self, key: &str) -> Result<Option<Resource>, CatalogError> {
        self.store.find_by_key(key)
    }

    /// Create a new component. Fails before any store write on a malformed
    /// or already-taken key; fails after the write if the store cannot hand
    /// the row back (`WriteNotPersisted`, an internal fault). The new id is
    /// indexed synchronously before this returns.
    pub fn create_component(
        &self,
        key: &str,
        name: &str,
        scope: &str,
        qualifier: &str,
    ) -> Result<Resource, CatalogError> {
        if self.store.find_by_key(key)?.is_some() {
            return Err(CatalogError::DuplicateKey(key.to_string()));
        }
        key::check_key_format(key)?;

        self.store
            .insert_or_update(&Resource::new(key, name, scope, qualifier, time::now_epoch_z()))?;
        let created = self
            .store
            .find_by_key(key)?
            .ok_or_else(|| CatalogError::WriteNotPersisted(key.to_string()))?;
        let id = created
            .id
            .ok_or_else(|| CatalogError::WriteNotPersisted(key.to_string()))?;

        self.indexer
            .index(id)
            .map_err(|err| CatalogError::IndexingFailed {
                id,
                reason: err.to_string(),
            })?;
        Ok(created)
    }

    /// Rename a component's key and display name. `long_name` is left
    /// untouched, and the index is not rebuilt: create indexes, update does
    /// not. That asymmetry matches the observed behavior this catalog
    /// replaces and is pinned by tests; rebuilding here would be a deliberate
    /// behavior change, not a cleanup.
    ///
    /// Uniqueness is not re-checked at this layer; a rename onto a taken key
    /// still surfaces `DuplicateKey` through the store constraint.
    pub fn update_component(
        &self,
        id: i64,
        key: &str,
        name: &str,
    ) -> Result<Resource, CatalogError> {
        let mut resource = self
            .store
            .find_by_id(id)?
            .ok_or(CatalogError::NotFound(id))?;
        key::check_key_format(key)?;

        resource.key = key.to_string();
        resource.name = name.to_string();
        self.store.insert_or_update(&resource)?;
        Ok(resource)
    }

    /// Completed, currently visible components matching the params.
    pub fn find(&self, params: &Map<String, JsonValue>) -> Result<QueryResult, CatalogError> {
        self.find_with_mode(params, SelectionMode::Standard)
    }

    /// As [`find`](Self::find), plus components whose latest analysis has
    /// not finished.
    pub fn find_including_incomplete(
        &self,
        params: &Map<String, JsonValue>,
    ) -> Result<QueryResult, CatalogError> {
        self.find_with_mode(params, SelectionMode::IncludingIncomplete)
    }

    /// Components with historical records but no current live counterpart.
    pub fn find_ghosts(
        &self,
        params: &Map<String, JsonValue>,
    ) -> Result<QueryResult, CatalogError> {
        self.find_with_mode(params, SelectionMode::Ghosts)
    }

    /// Components created but never analyzed. Flat list: no secondary
    /// filters, no sorting, no pagination. An empty qualifier set selects
    /// nothing rather than erroring (this mode does not paginate).
    pub fn find_provisioned(
        &self,
        params: &Map<String, JsonValue>,
    ) -> Result<Vec<Resource>, CatalogError> {
        let query = ComponentQuery::compile(params)?;
        self.store
            .select_by_qualifiers(&query.qualifiers, SelectionMode::Provisioned)
    }

    fn find_with_mode(
        &self,
        params: &Map<String, JsonValue>,
        mode: SelectionMode,
    ) -> Result<QueryResult, CatalogError> {
        let query = ComponentQuery::compile(params)?;
        if query.qualifiers.is_empty() {
            return Err(CatalogError::EmptyQualifierSet);
        }
        let candidates = self.store.select_by_qualifiers(&query.qualifiers, mode)?;
        finder::find(&query, candidates)
    }
}
