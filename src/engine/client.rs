//! Client traits the engine adapter implements.
//!
//! [`EngineClient`] is the single seam the search executor needs: issue one
//! page request, get back hits, the total count, and the aggregation tree.
//! [`DocumentBackend`] adds the document CRUD and collection admin operations
//! the store facade passes through; those are engine plumbing, not search
//! logic, and stay behind this trait.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::engine::query::InlineScript;
use crate::engine::request::EngineRequest;
use crate::engine::response::EngineResponse;
use crate::error::Result;

/// Issues one page request against the engine.
pub trait EngineClient {
    /// Execute a single page request.
    ///
    /// Transport failures (engine unreachable, malformed response, timeout)
    /// are reported as errors; the executor decides whether to degrade or
    /// rethrow.
    fn execute(&self, request: &EngineRequest) -> Result<EngineResponse>;
}

/// One item of an atomic multi-operation request.
///
/// A partial failure inside a batch surfaces as a failure of the whole batch;
/// per-item retry is the engine client's concern.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Index (create or replace) a document.
    Index {
        /// The document identifier.
        id: String,
        /// The document content.
        document: Map<String, Value>,
    },
    /// Partially update a document with new field values.
    Update {
        /// The document identifier.
        id: String,
        /// The fields to merge in.
        document: Map<String, Value>,
    },
    /// Partially update a document by running a script against it.
    UpdateScript {
        /// The document identifier.
        id: String,
        /// The update script.
        script: InlineScript,
    },
    /// Delete a document.
    Delete {
        /// The document identifier.
        id: String,
    },
}

/// Document CRUD and collection admin operations on the engine.
pub trait DocumentBackend: EngineClient {
    /// Index (create or replace) one document. `refresh` makes the write
    /// visible to search before returning.
    fn index(&self, id: &str, document: Map<String, Value>, refresh: bool) -> Result<()>;

    /// Merge field values into one document.
    fn update(&self, id: &str, document: Map<String, Value>, refresh: bool) -> Result<()>;

    /// Update one document by running a script against it.
    fn update_by_script(&self, id: &str, script: &InlineScript, refresh: bool) -> Result<()>;

    /// Delete one document.
    fn delete(&self, id: &str, refresh: bool) -> Result<()>;

    /// Execute a batch of operations as one atomic request, refreshed on
    /// completion.
    fn bulk(&self, operations: Vec<BulkOperation>) -> Result<()>;

    /// Whether a document with the given identifier exists.
    fn exists(&self, id: &str) -> Result<bool>;

    /// Fetch one stored document; `None` when missing or empty.
    fn get(&self, id: &str) -> Result<Option<Map<String, Value>>>;

    /// Fetch several stored documents, skipping missing and empty ones.
    fn multi_get(&self, ids: &[String]) -> Result<Vec<Map<String, Value>>>;

    /// Create the underlying collection from settings and mapping payloads.
    /// A no-op when the collection already exists.
    fn create_collection(&self, settings: &HashMap<String, String>) -> Result<()>;

    /// Drop and recreate the collection, preserving its mapping.
    fn clear_collection(&self) -> Result<()>;

    /// Drop the collection. A no-op when it does not exist.
    fn drop_collection(&self) -> Result<()>;
}
