//! One page request against the engine.

use serde_json::{Map, Value, json};

use crate::engine::aggregation::EngineAggregation;
use crate::engine::query::EngineQuery;
use crate::request::SortOrder;

/// Accumulates the paging, sorting, aggregation, query, and projection
/// parameters of a single page request, and renders the engine's search body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineRequest {
    /// The compiled query; absent means the engine default (match all).
    pub query: Option<EngineQuery>,
    /// Start offset into the match list.
    pub from: Option<usize>,
    /// Page size.
    pub size: Option<usize>,
    /// Sort keys in insertion order.
    pub sort: Vec<(String, SortOrder)>,
    /// Aggregation definitions.
    pub aggregations: Vec<EngineAggregation>,
    /// Stored-field projection list.
    pub fields: Vec<String>,
}

impl EngineRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        EngineRequest::default()
    }

    /// Set the start offset.
    pub fn set_from(&mut self, from: usize) {
        self.from = Some(from);
    }

    /// Set the page size.
    pub fn set_size(&mut self, size: usize) {
        self.size = Some(size);
    }

    /// Append a sort key.
    pub fn add_sort<F: Into<String>>(&mut self, field: F, order: SortOrder) {
        self.sort.push((field.into(), order));
    }

    /// Append an aggregation definition.
    pub fn add_aggregation(&mut self, aggregation: EngineAggregation) {
        self.aggregations.push(aggregation);
    }

    /// Set the query.
    pub fn set_query(&mut self, query: EngineQuery) {
        self.query = Some(query);
    }

    /// Append a stored field to the projection list.
    pub fn add_field<F: Into<String>>(&mut self, field: F) {
        self.fields.push(field.into());
    }

    /// Render the full search body.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.to_json());
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|(field, order)| {
                    let order = match order {
                        SortOrder::Asc => "asc",
                        SortOrder::Desc => "desc",
                    };
                    json!({ field: { "order": order } })
                })
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }
        if !self.aggregations.is_empty() {
            let mut aggs = Map::new();
            for aggregation in &self.aggregations {
                aggs.insert(aggregation.name().to_string(), aggregation.body());
            }
            body.insert("aggs".to_string(), Value::Object(aggs));
        }
        if !self.fields.is_empty() {
            let fields: Vec<Value> = self
                .fields
                .iter()
                .map(|field| Value::String(field.clone()))
                .collect();
            body.insert("fields".to_string(), Value::Array(fields));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_rendering() {
        let mut request = EngineRequest::new();
        request.set_query(EngineQuery::MatchAll);
        request.set_from(20);
        request.set_size(10);
        request.add_sort("title", SortOrder::Asc);
        request.add_sort("price", SortOrder::Desc);
        request.add_field("title");

        assert_eq!(
            request.to_body(),
            json!({
                "query": { "match_all": {} },
                "from": 20,
                "size": 10,
                "sort": [
                    { "title": { "order": "asc" } },
                    { "price": { "order": "desc" } },
                ],
                "fields": ["title"],
            })
        );
    }

    #[test]
    fn test_empty_request_body() {
        assert_eq!(EngineRequest::new().to_body(), json!({}));
    }

    #[test]
    fn test_aggregations_keyed_by_name() {
        let mut request = EngineRequest::new();
        request.add_aggregation(EngineAggregation::terms("categories", "category"));

        let body = request.to_body();
        assert!(body["aggs"]["categories"]["terms"].is_object());
    }
}
