//! The caller-facing search result shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregation::AggregationResult;

/// Result metadata computed once per logical search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultInfo {
    /// Number of accumulated hits in this result.
    pub count: u64,
    /// Total number of matches reported by the engine.
    pub total_count: u64,
    /// The requested page.
    pub current_page: usize,
    /// The requested page size.
    pub page_size: usize,
    /// `ceil(total_count / page_size)`; unset when the page size is zero.
    pub page_count: Option<usize>,
}

/// Accumulated hits, aggregation results, and metadata for one search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Materialized hits in engine order.
    pub data: Vec<Map<String, Value>>,
    /// Materialized aggregation results.
    pub aggregations: Vec<AggregationResult>,
    /// Result metadata.
    pub info: ResultInfo,
}
