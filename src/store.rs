//! Caller-facing store facade over an engine backend.
//!
//! [`SearchStore`] ties the compilers and the executor to a concrete engine
//! adapter. Searching needs only [`EngineClient`]; the CRUD and collection
//! admin pass-throughs need the full [`DocumentBackend`]. Multi-item writes
//! batch into a single atomic bulk request instead of issuing one request per
//! item.

use std::collections::HashMap;

use ahash::AHashSet;
use serde_json::{Map, Value};

use crate::engine::client::{BulkOperation, DocumentBackend, EngineClient};
use crate::engine::query::InlineScript;
use crate::error::Result;
use crate::execute;
use crate::request::SearchQuery;
use crate::result::SearchResult;

/// A search store bound to one engine-backed document collection.
#[derive(Debug)]
pub struct SearchStore<E> {
    engine: E,
}

impl<E> SearchStore<E> {
    /// Create a store over the given engine adapter.
    pub fn new(engine: E) -> Self {
        SearchStore { engine }
    }

    /// The underlying engine adapter.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: EngineClient> SearchStore<E> {
    /// Execute a search and materialize its result.
    ///
    /// Compile errors propagate; transport failures degrade per the query's
    /// strict flag (see [`execute::run`]).
    pub fn search(&self, search_query: &SearchQuery) -> Result<SearchResult> {
        execute::run(&self.engine, search_query)
    }

    /// Execute a search and return only the matching document identifiers.
    ///
    /// Transport failures degrade to the empty set; compile errors propagate.
    pub fn search_ids(&self, search_query: &SearchQuery) -> Result<AHashSet<String>> {
        execute::ids(&self.engine, search_query)
    }
}

impl<E: DocumentBackend> SearchStore<E> {
    /// Index one document, visible to search on return.
    pub fn index(&self, id: &str, document: Map<String, Value>) -> Result<()> {
        self.engine.index(id, document, true)
    }

    /// Index many documents in one atomic batch.
    pub fn index_all<I>(&self, documents: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Map<String, Value>)>,
    {
        let operations = documents
            .into_iter()
            .map(|(id, document)| BulkOperation::Index { id, document })
            .collect();
        self.engine.bulk(operations)
    }

    /// Merge field values into one document, visible to search on return.
    pub fn update(&self, id: &str, document: Map<String, Value>) -> Result<()> {
        self.engine.update(id, document, true)
    }

    /// Merge the same field values into several documents in one atomic batch.
    pub fn update_all<I>(&self, ids: I, document: Map<String, Value>) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let operations = ids
            .into_iter()
            .map(|id| BulkOperation::Update {
                id,
                document: document.clone(),
            })
            .collect();
        self.engine.bulk(operations)
    }

    /// Merge per-document field values in one atomic batch.
    pub fn update_each<I>(&self, updates: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, Map<String, Value>)>,
    {
        let operations = updates
            .into_iter()
            .map(|(id, document)| BulkOperation::Update { id, document })
            .collect();
        self.engine.bulk(operations)
    }

    /// Update one document by running a script against it.
    pub fn update_by_script(&self, id: &str, script: &InlineScript) -> Result<()> {
        self.engine.update_by_script(id, script, true)
    }

    /// Run the same update script against several documents in one atomic
    /// batch.
    pub fn update_all_by_script<I>(&self, ids: I, script: &InlineScript) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let operations = ids
            .into_iter()
            .map(|id| BulkOperation::UpdateScript {
                id,
                script: script.clone(),
            })
            .collect();
        self.engine.bulk(operations)
    }

    /// Remove one document.
    pub fn remove(&self, id: &str) -> Result<()> {
        self.engine.delete(id, true)
    }

    /// Remove several documents in one atomic batch.
    pub fn remove_all<I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        let operations = ids
            .into_iter()
            .map(|id| BulkOperation::Delete { id })
            .collect();
        self.engine.bulk(operations)
    }

    /// Whether a document with the given identifier exists.
    pub fn contains(&self, id: &str) -> Result<bool> {
        self.engine.exists(id)
    }

    /// Fetch one stored document; `None` when missing or empty.
    pub fn get(&self, id: &str) -> Result<Option<Map<String, Value>>> {
        self.engine.get(id)
    }

    /// Fetch several stored documents, skipping missing and empty ones.
    pub fn get_all(&self, ids: &[String]) -> Result<Vec<Map<String, Value>>> {
        self.engine.multi_get(ids)
    }

    /// Create the underlying collection from settings and mapping payloads.
    pub fn create_collection(&self, settings: &HashMap<String, String>) -> Result<()> {
        self.engine.create_collection(settings)
    }

    /// Drop and recreate the collection, preserving its mapping.
    pub fn clear_collection(&self) -> Result<()> {
        self.engine.clear_collection()
    }

    /// Drop the collection.
    pub fn drop_collection(&self) -> Result<()> {
        self.engine.drop_collection()
    }
}
