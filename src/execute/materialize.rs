//! Conversion of raw engine hits and aggregation replies into the caller's
//! result shape.

use serde_json::{Map, Value};

use crate::aggregation::{AggregationEntry, AggregationKind, AggregationResult};
use crate::engine::response::{AggregationReply, EngineHit, EngineResponse};
use crate::request::SearchQuery;

/// Key used for the id-only projection when no output fields were requested.
pub const DOCUMENT_ID_KEY: &str = "documentId";

/// Convert one hit into the caller's map shape.
pub fn hit(hit: &EngineHit, search_query: &SearchQuery) -> Map<String, Value> {
    if search_query.full_result {
        return hit.source.clone().unwrap_or_default();
    }
    if search_query.fields.is_empty() {
        let mut map = Map::new();
        map.insert(DOCUMENT_ID_KEY.to_string(), Value::String(hit.id.clone()));
        return map;
    }
    let mut map = Map::new();
    for field in &search_query.fields {
        let Some(values) = hit.fields.get(&field.name) else {
            continue;
        };
        put_field_value(&mut map, &field.name, values, field.array);
    }
    map
}

/// Write a field's value list into the map, expanding dotted paths into
/// nested maps and per-position sub-map lists.
pub fn put_field_value(map: &mut Map<String, Value>, field: &str, values: &[Value], array: bool) {
    let Some(split) = field.find('.') else {
        if array {
            map.insert(field.to_string(), Value::Array(values.to_vec()));
        } else {
            map.insert(
                field.to_string(),
                values.first().cloned().unwrap_or(Value::Null),
            );
        }
        return;
    };
    let first = &field[..split];
    let rest = &field[split + 1..];
    if array {
        if !matches!(map.get(first), Some(Value::Array(_))) {
            let list: Vec<Value> = values.iter().map(|_| Value::Object(Map::new())).collect();
            map.insert(first.to_string(), Value::Array(list));
        }
        if let Some(Value::Array(list)) = map.get_mut(first) {
            for (i, value) in values.iter().enumerate() {
                if let Some(Value::Object(sub)) = list.get_mut(i) {
                    put_field_value(sub, rest, std::slice::from_ref(value), false);
                }
            }
        }
    } else {
        if !matches!(map.get(first), Some(Value::Object(_))) {
            map.insert(first.to_string(), Value::Object(Map::new()));
        }
        if let Some(Value::Object(sub)) = map.get_mut(first) {
            put_field_value(sub, rest, values, false);
        }
    }
}

/// Convert a response's aggregation tree into typed aggregation results.
/// Nested wrappers are unwrapped and reported as if flat.
pub fn aggregations(response: &EngineResponse) -> Vec<AggregationResult> {
    collect(&response.aggregations)
}

fn collect(replies: &[AggregationReply]) -> Vec<AggregationResult> {
    let mut results = Vec::new();
    for reply in replies {
        match reply {
            AggregationReply::Nested { children, .. } => results.extend(collect(children)),
            other => results.push(result_of(other)),
        }
    }
    results
}

fn result_of(reply: &AggregationReply) -> AggregationResult {
    match reply {
        AggregationReply::Terms { name, buckets } => {
            let mut entries = Vec::new();
            let mut total_count = 0;
            for bucket in buckets {
                let count = effective_count(bucket.doc_count, &bucket.aggregations);
                total_count += count;
                entries.push(AggregationEntry::new(bucket.key.clone(), count));
            }
            AggregationResult {
                name: name.clone(),
                kind: AggregationKind::Term,
                total_count,
                entries,
            }
        }
        AggregationReply::Range { name, buckets } => {
            let mut entries = Vec::new();
            let mut total_count = 0;
            for bucket in buckets {
                let count = effective_count(bucket.doc_count, &bucket.aggregations);
                total_count += count;
                entries.push(AggregationEntry::with_range(
                    bucket.key.clone(),
                    count,
                    (bucket.from, bucket.to),
                ));
            }
            AggregationResult {
                name: name.clone(),
                kind: AggregationKind::Range,
                total_count,
                entries,
            }
        }
        AggregationReply::Nested { name, .. }
        | AggregationReply::ReverseNested { name, .. }
        | AggregationReply::Unknown { name } => AggregationResult {
            name: name.clone(),
            kind: AggregationKind::Unknown,
            total_count: 0,
            entries: Vec::new(),
        },
    }
}

/// The reverse-nested doc count when a reverse-nested sub-aggregation is
/// present, else the raw bucket count.
fn effective_count(doc_count: u64, replies: &[AggregationReply]) -> u64 {
    for reply in replies {
        if let AggregationReply::ReverseNested { doc_count, .. } = reply {
            return *doc_count;
        }
    }
    doc_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::response::{RangeBucket, TermsBucket};
    use crate::request::SearchField;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_full_result_echoes_source() {
        let source = as_map(json!({ "title": "a", "tags": [1, 2] }));
        let engine_hit = EngineHit::new("doc-1").with_source(source.clone());
        let query = SearchQuery::new().with_full_result();

        assert_eq!(hit(&engine_hit, &query), source);
    }

    #[test]
    fn test_no_fields_yields_id_only_map() {
        let engine_hit =
            EngineHit::new("doc-1").with_field("title", vec![json!("ignored")]);
        let query = SearchQuery::new();

        let map = hit(&engine_hit, &query);
        assert_eq!(map.len(), 1);
        assert_eq!(map["documentId"], json!("doc-1"));
    }

    #[test]
    fn test_scalar_field_takes_first_value() {
        let engine_hit = EngineHit::new("doc-1").with_field("title", vec![json!("a"), json!("b")]);
        let query = SearchQuery::new().with_field(SearchField::scalar("title"));

        let map = hit(&engine_hit, &query);
        assert_eq!(map["title"], json!("a"));
    }

    #[test]
    fn test_scalar_field_empty_list_becomes_null() {
        let engine_hit = EngineHit::new("doc-1").with_field("title", vec![]);
        let query = SearchQuery::new().with_field(SearchField::scalar("title"));

        let map = hit(&engine_hit, &query);
        assert_eq!(map["title"], Value::Null);
    }

    #[test]
    fn test_array_field_keeps_raw_list() {
        let engine_hit = EngineHit::new("doc-1").with_field("tags", vec![json!("x"), json!("y")]);
        let query = SearchQuery::new().with_field(SearchField::array("tags"));

        let map = hit(&engine_hit, &query);
        assert_eq!(map["tags"], json!(["x", "y"]));
    }

    #[test]
    fn test_missing_field_is_skipped() {
        let engine_hit = EngineHit::new("doc-1");
        let query = SearchQuery::new().with_field(SearchField::scalar("title"));

        assert!(hit(&engine_hit, &query).is_empty());
    }

    #[test]
    fn test_dotted_array_field_expands_per_position() {
        let engine_hit =
            EngineHit::new("doc-1").with_field("tags.name", vec![json!("x"), json!("y")]);
        let query = SearchQuery::new().with_field(SearchField::array("tags.name"));

        let map = hit(&engine_hit, &query);
        assert_eq!(map["tags"], json!([{ "name": "x" }, { "name": "y" }]));
    }

    #[test]
    fn test_dotted_array_fields_share_position_maps() {
        let engine_hit = EngineHit::new("doc-1")
            .with_field("tags.name", vec![json!("x"), json!("y")])
            .with_field("tags.weight", vec![json!(1), json!(2)]);
        let query = SearchQuery::new()
            .with_field(SearchField::array("tags.name"))
            .with_field(SearchField::array("tags.weight"));

        let map = hit(&engine_hit, &query);
        assert_eq!(
            map["tags"],
            json!([
                { "name": "x", "weight": 1 },
                { "name": "y", "weight": 2 },
            ])
        );
    }

    #[test]
    fn test_dotted_scalar_field_recurses_into_sub_map() {
        let engine_hit = EngineHit::new("doc-1").with_field("address.geo.city", vec![json!("Oslo")]);
        let query = SearchQuery::new().with_field(SearchField::scalar("address.geo.city"));

        let map = hit(&engine_hit, &query);
        assert_eq!(map["address"], json!({ "geo": { "city": "Oslo" } }));
    }

    #[test]
    fn test_term_buckets_use_raw_counts_without_reverse_nested() {
        let response = EngineResponse {
            hits: Vec::new(),
            total_hits: 0,
            aggregations: vec![AggregationReply::Terms {
                name: "categories".to_string(),
                buckets: vec![TermsBucket::new("books", 4), TermsBucket::new("games", 2)],
            }],
        };

        let results = aggregations(&response);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, AggregationKind::Term);
        assert_eq!(results[0].total_count, 6);
        assert_eq!(results[0].entries[0], AggregationEntry::new("books", 4));
    }

    #[test]
    fn test_reverse_nested_count_substitutes_bucket_count() {
        let response = EngineResponse {
            hits: Vec::new(),
            total_hits: 0,
            aggregations: vec![AggregationReply::Terms {
                name: "names".to_string(),
                buckets: vec![TermsBucket::new("x", 9).with_reply(
                    AggregationReply::ReverseNested {
                        name: "names-r".to_string(),
                        doc_count: 3,
                    },
                )],
            }],
        };

        let results = aggregations(&response);
        assert_eq!(results[0].entries[0].doc_count, 3);
        assert_eq!(results[0].total_count, 3);
    }

    #[test]
    fn test_nested_wrapper_is_transparent() {
        let response = EngineResponse {
            hits: Vec::new(),
            total_hits: 0,
            aggregations: vec![AggregationReply::Nested {
                name: "names-n".to_string(),
                children: vec![AggregationReply::Terms {
                    name: "names".to_string(),
                    buckets: vec![TermsBucket::new("x", 1)],
                }],
            }],
        };

        let results = aggregations(&response);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "names");
    }

    #[test]
    fn test_range_buckets_carry_bounds() {
        let response = EngineResponse {
            hits: Vec::new(),
            total_hits: 0,
            aggregations: vec![AggregationReply::Range {
                name: "prices".to_string(),
                buckets: vec![
                    RangeBucket::new("*-10.0", None, Some(10.0), 5),
                    RangeBucket::new("10.0-*", Some(10.0), None, 7),
                ],
            }],
        };

        let results = aggregations(&response);
        assert_eq!(results[0].kind, AggregationKind::Range);
        assert_eq!(results[0].entries[0].range, Some((None, Some(10.0))));
        assert_eq!(results[0].entries[1].range, Some((Some(10.0), None)));
        assert_eq!(results[0].total_count, 12);
    }

    #[test]
    fn test_unknown_aggregation_reported_without_entries() {
        let response = EngineResponse {
            hits: Vec::new(),
            total_hits: 0,
            aggregations: vec![AggregationReply::Unknown {
                name: "histogram".to_string(),
            }],
        };

        let results = aggregations(&response);
        assert_eq!(results[0].kind, AggregationKind::Unknown);
        assert!(results[0].entries.is_empty());
    }
}
