//! One page of engine response: hits, total count, and the aggregation tree.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// One hit returned by the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineHit {
    /// The document identifier.
    pub id: String,
    /// The complete stored document, when the engine returned it.
    pub source: Option<Map<String, Value>>,
    /// Per-field value lists from the projection response.
    pub fields: HashMap<String, Vec<Value>>,
}

impl EngineHit {
    /// Create a hit with only an identifier.
    pub fn new<I: Into<String>>(id: I) -> Self {
        EngineHit {
            id: id.into(),
            source: None,
            fields: HashMap::new(),
        }
    }

    /// Attach the stored document, builder-style.
    pub fn with_source(mut self, source: Map<String, Value>) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach a projected field value list, builder-style.
    pub fn with_field<F: Into<String>>(mut self, field: F, values: Vec<Value>) -> Self {
        self.fields.insert(field.into(), values);
        self
    }
}

/// A node of the aggregation tree in an engine response.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationReply {
    /// Terms buckets.
    Terms {
        /// The aggregation name.
        name: String,
        /// The buckets, in engine order.
        buckets: Vec<TermsBucket>,
    },
    /// Range buckets.
    Range {
        /// The aggregation name.
        name: String,
        /// The buckets, in request order.
        buckets: Vec<RangeBucket>,
    },
    /// A nested wrapper; transparent to result materialization.
    Nested {
        /// The aggregation name.
        name: String,
        /// The wrapped child aggregations.
        children: Vec<AggregationReply>,
    },
    /// A reverse-nested count of owning parent documents.
    ReverseNested {
        /// The aggregation name.
        name: String,
        /// The parent-document count.
        doc_count: u64,
    },
    /// An aggregation kind the bridge does not interpret.
    Unknown {
        /// The aggregation name.
        name: String,
    },
}

/// One bucket of a terms aggregation reply.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsBucket {
    /// The bucket key.
    pub key: String,
    /// Documents in the bucket (nested sub-documents for nested fields).
    pub doc_count: u64,
    /// Sub-aggregation replies.
    pub aggregations: Vec<AggregationReply>,
}

impl TermsBucket {
    /// Create a bucket without sub-aggregations.
    pub fn new<K: Into<String>>(key: K, doc_count: u64) -> Self {
        TermsBucket {
            key: key.into(),
            doc_count,
            aggregations: Vec::new(),
        }
    }

    /// Attach a sub-aggregation reply, builder-style.
    pub fn with_reply(mut self, reply: AggregationReply) -> Self {
        self.aggregations.push(reply);
        self
    }
}

/// One bucket of a range aggregation reply.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBucket {
    /// The bucket key.
    pub key: String,
    /// Inclusive lower bound; absent for unbounded-to buckets.
    pub from: Option<f64>,
    /// Exclusive upper bound; absent for unbounded-from buckets.
    pub to: Option<f64>,
    /// Documents in the bucket.
    pub doc_count: u64,
    /// Sub-aggregation replies.
    pub aggregations: Vec<AggregationReply>,
}

impl RangeBucket {
    /// Create a bucket without sub-aggregations.
    pub fn new<K: Into<String>>(
        key: K,
        from: Option<f64>,
        to: Option<f64>,
        doc_count: u64,
    ) -> Self {
        RangeBucket {
            key: key.into(),
            from,
            to,
            doc_count,
            aggregations: Vec::new(),
        }
    }

    /// Attach a sub-aggregation reply, builder-style.
    pub fn with_reply(mut self, reply: AggregationReply) -> Self {
        self.aggregations.push(reply);
        self
    }
}

/// One page of engine response.
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    /// The hits on this page.
    pub hits: Vec<EngineHit>,
    /// Total number of matches across all pages.
    pub total_hits: u64,
    /// The aggregation reply tree.
    pub aggregations: Vec<AggregationReply>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_builder() {
        let hit = EngineHit::new("doc-1").with_field("title", vec![json!("a title")]);

        assert_eq!(hit.id, "doc-1");
        assert_eq!(hit.fields["title"], vec![json!("a title")]);
        assert!(hit.source.is_none());
    }

    #[test]
    fn test_bucket_builders() {
        let bucket = TermsBucket::new("books", 4).with_reply(AggregationReply::ReverseNested {
            name: "categories-r".to_string(),
            doc_count: 2,
        });

        assert_eq!(bucket.doc_count, 4);
        assert_eq!(bucket.aggregations.len(), 1);
    }
}
