//! Aggregation requests and typed aggregation results.

use serde::{Deserialize, Serialize};

/// An aggregation request attached to a search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchAggregation {
    /// Bucket all distinct values of a field.
    Terms {
        /// Name the result is reported under.
        name: String,
        /// The aggregated field path.
        field: String,
    },
    /// Bucket a field into ordered `[lower, upper)` ranges; either end of a
    /// range may be open.
    Range {
        /// Name the result is reported under.
        name: String,
        /// The aggregated field path.
        field: String,
        /// Ordered bucket boundaries.
        ranges: Vec<(Option<f64>, Option<f64>)>,
    },
}

impl SearchAggregation {
    /// Create a terms aggregation request.
    pub fn terms<N, F>(name: N, field: F) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        SearchAggregation::Terms {
            name: name.into(),
            field: field.into(),
        }
    }

    /// Create a range aggregation request.
    pub fn range<N, F>(name: N, field: F, ranges: Vec<(Option<f64>, Option<f64>)>) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        SearchAggregation::Range {
            name: name.into(),
            field: field.into(),
            ranges,
        }
    }

    /// The name the result is reported under.
    pub fn name(&self) -> &str {
        match self {
            SearchAggregation::Terms { name, .. } => name,
            SearchAggregation::Range { name, .. } => name,
        }
    }

    /// The aggregated field path.
    pub fn field(&self) -> &str {
        match self {
            SearchAggregation::Terms { field, .. } => field,
            SearchAggregation::Range { field, .. } => field,
        }
    }
}

/// The kind an aggregation result was mapped back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationKind {
    /// A terms aggregation.
    Term,
    /// A range aggregation.
    Range,
    /// An aggregation kind the bridge does not interpret.
    Unknown,
}

/// One bucket of an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationEntry {
    /// The bucket key.
    pub key: String,
    /// Documents in the bucket; reverse-nested counts substituted when present.
    pub doc_count: u64,
    /// `[from, to]` bounds carried by range buckets.
    pub range: Option<(Option<f64>, Option<f64>)>,
}

impl AggregationEntry {
    /// Create a plain bucket entry.
    pub fn new<K: Into<String>>(key: K, doc_count: u64) -> Self {
        AggregationEntry {
            key: key.into(),
            doc_count,
            range: None,
        }
    }

    /// Create a range bucket entry carrying its bounds.
    pub fn with_range<K: Into<String>>(
        key: K,
        doc_count: u64,
        range: (Option<f64>, Option<f64>),
    ) -> Self {
        AggregationEntry {
            key: key.into(),
            doc_count,
            range: Some(range),
        }
    }
}

/// A materialized aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// The aggregation name.
    pub name: String,
    /// The mapped kind.
    pub kind: AggregationKind,
    /// Sum of all bucket counts.
    pub total_count: u64,
    /// Ordered bucket entries.
    pub entries: Vec<AggregationEntry>,
}
