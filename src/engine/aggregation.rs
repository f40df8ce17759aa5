//! Typed aggregation definitions for the engine's search DSL.

use serde_json::{Map, Value, json};

/// Effectively unbounded bucket size for terms aggregations: request all
/// distinct values.
pub const UNBOUNDED_TERMS_SIZE: u64 = 2_147_483_647;

/// An aggregation definition in the engine's DSL.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineAggregation {
    /// Bucket all distinct values of a field.
    Terms {
        /// The aggregation name.
        name: String,
        /// The aggregated field path.
        field: String,
        /// Maximum number of buckets.
        size: u64,
        /// Sub-aggregations.
        subs: Vec<EngineAggregation>,
    },
    /// Bucket a field into ordered ranges.
    Range {
        /// The aggregation name.
        name: String,
        /// The aggregated field path.
        field: String,
        /// Ordered bucket boundaries; either end may be open.
        ranges: Vec<(Option<f64>, Option<f64>)>,
        /// Sub-aggregations.
        subs: Vec<EngineAggregation>,
    },
    /// Nested-object wrapper scoping child aggregations to a parent path.
    Nested {
        /// The aggregation name.
        name: String,
        /// The parent path of the nested objects.
        path: String,
        /// Sub-aggregations.
        subs: Vec<EngineAggregation>,
    },
    /// Re-associates nested bucket counts back to owning parent documents.
    ReverseNested {
        /// The aggregation name.
        name: String,
    },
}

impl EngineAggregation {
    /// Create a terms aggregation with an effectively unbounded bucket count.
    pub fn terms<N, F>(name: N, field: F) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        EngineAggregation::Terms {
            name: name.into(),
            field: field.into(),
            size: UNBOUNDED_TERMS_SIZE,
            subs: Vec::new(),
        }
    }

    /// Create a range aggregation.
    pub fn range<N, F>(name: N, field: F, ranges: Vec<(Option<f64>, Option<f64>)>) -> Self
    where
        N: Into<String>,
        F: Into<String>,
    {
        EngineAggregation::Range {
            name: name.into(),
            field: field.into(),
            ranges,
            subs: Vec::new(),
        }
    }

    /// Create a nested wrapper around a child aggregation.
    pub fn nested<N, P>(name: N, path: P, child: EngineAggregation) -> Self
    where
        N: Into<String>,
        P: Into<String>,
    {
        EngineAggregation::Nested {
            name: name.into(),
            path: path.into(),
            subs: vec![child],
        }
    }

    /// Create a reverse-nested aggregation.
    pub fn reverse_nested<N: Into<String>>(name: N) -> Self {
        EngineAggregation::ReverseNested { name: name.into() }
    }

    /// The aggregation name.
    pub fn name(&self) -> &str {
        match self {
            EngineAggregation::Terms { name, .. }
            | EngineAggregation::Range { name, .. }
            | EngineAggregation::Nested { name, .. }
            | EngineAggregation::ReverseNested { name } => name,
        }
    }

    /// Attach a sub-aggregation. Reverse-nested nodes carry none.
    pub fn add_sub(&mut self, sub: EngineAggregation) {
        match self {
            EngineAggregation::Terms { subs, .. }
            | EngineAggregation::Range { subs, .. }
            | EngineAggregation::Nested { subs, .. } => subs.push(sub),
            EngineAggregation::ReverseNested { .. } => {}
        }
    }

    /// Render the aggregation body (without its name key).
    pub fn body(&self) -> Value {
        match self {
            EngineAggregation::Terms {
                field, size, subs, ..
            } => {
                let mut body = Map::new();
                body.insert(
                    "terms".to_string(),
                    json!({ "field": field, "size": size }),
                );
                append_subs(&mut body, subs);
                Value::Object(body)
            }
            EngineAggregation::Range {
                field, ranges, subs, ..
            } => {
                let buckets: Vec<Value> = ranges
                    .iter()
                    .map(|(from, to)| {
                        let mut bucket = Map::new();
                        if let Some(from) = from {
                            bucket.insert("from".to_string(), json!(from));
                        }
                        if let Some(to) = to {
                            bucket.insert("to".to_string(), json!(to));
                        }
                        Value::Object(bucket)
                    })
                    .collect();
                let mut body = Map::new();
                body.insert(
                    "range".to_string(),
                    json!({ "field": field, "ranges": buckets }),
                );
                append_subs(&mut body, subs);
                Value::Object(body)
            }
            EngineAggregation::Nested { path, subs, .. } => {
                let mut body = Map::new();
                body.insert("nested".to_string(), json!({ "path": path }));
                append_subs(&mut body, subs);
                Value::Object(body)
            }
            EngineAggregation::ReverseNested { .. } => json!({ "reverse_nested": {} }),
        }
    }

    /// Render keyed by name, as it appears under an `aggs` object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(self.name().to_string(), self.body());
        Value::Object(object)
    }
}

fn append_subs(body: &mut Map<String, Value>, subs: &[EngineAggregation]) {
    if subs.is_empty() {
        return;
    }
    let mut aggs = Map::new();
    for sub in subs {
        aggs.insert(sub.name().to_string(), sub.body());
    }
    body.insert("aggs".to_string(), Value::Object(aggs));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_aggregation_json() {
        let aggregation = EngineAggregation::terms("categories", "category");
        assert_eq!(
            aggregation.to_json(),
            json!({
                "categories": {
                    "terms": { "field": "category", "size": UNBOUNDED_TERMS_SIZE }
                }
            })
        );
    }

    #[test]
    fn test_range_aggregation_open_buckets() {
        let aggregation = EngineAggregation::range(
            "prices",
            "price",
            vec![(None, Some(10.0)), (Some(10.0), Some(50.0)), (Some(50.0), None)],
        );

        assert_eq!(
            aggregation.body()["range"]["ranges"],
            json!([
                { "to": 10.0 },
                { "from": 10.0, "to": 50.0 },
                { "from": 50.0 },
            ])
        );
    }

    #[test]
    fn test_nested_wrapper_json() {
        let mut inner = EngineAggregation::terms("names", "tags.name");
        inner.add_sub(EngineAggregation::reverse_nested("names-r"));
        let wrapped = EngineAggregation::nested("names-n", "tags", inner);

        assert_eq!(
            wrapped.to_json(),
            json!({
                "names-n": {
                    "nested": { "path": "tags" },
                    "aggs": {
                        "names": {
                            "terms": { "field": "tags.name", "size": UNBOUNDED_TERMS_SIZE },
                            "aggs": { "names-r": { "reverse_nested": {} } },
                        }
                    }
                }
            })
        );
    }
}
