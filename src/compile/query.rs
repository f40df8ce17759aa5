//! Compilation of the filter model into the engine's boolean query tree.
//!
//! Filters are ANDed together; each filter's value set is combined under its
//! own conjunction; multi-field filters OR their per-field sub-queries before
//! joining the top level. Boolean wrappers holding a single clause are elided
//! and an empty tree compiles to match-all.

use serde_json::Value;

use crate::compile::script;
use crate::engine::query::{BoolQuery, EngineQuery, ScoreFunction};
use crate::error::{Result, SearchBridgeError};
use crate::filter::{Conjunction, FilterKind, FilterValue, MultiFieldFilter};
use crate::request::SearchQuery;

/// Compile the full boolean query for a search request.
pub fn compile(search_query: &SearchQuery) -> Result<EngineQuery> {
    let mut bool_query = BoolQuery::new();
    for filter in &search_query.filters {
        if let Some(query) = field_query(&filter.field, filter.conjunction, &filter.values)? {
            bool_query.append(query, Conjunction::And);
        }
    }
    for filter in &search_query.multi_filters {
        if let Some(query) = multi_field_query(filter)? {
            bool_query.append(query, Conjunction::And);
        }
    }
    let query = bool_query.simplify().unwrap_or(EngineQuery::MatchAll);
    Ok(score(query, search_query))
}

/// Compile one filter's value set against a single field.
fn field_query(
    field: &str,
    conjunction: Conjunction,
    values: &[FilterValue],
) -> Result<Option<EngineQuery>> {
    if values.is_empty() {
        return Ok(None);
    }
    let mut bool_query = BoolQuery::new();
    for value in values {
        if let Some(query) = value_query(field, value)? {
            bool_query.append(query, conjunction);
        }
    }
    Ok(bool_query.simplify())
}

/// Compile a multi-field filter: per-field sub-queries ORed together.
fn multi_field_query(filter: &MultiFieldFilter) -> Result<Option<EngineQuery>> {
    if filter.values.is_empty() {
        return Ok(None);
    }
    let mut bool_query = BoolQuery::new();
    for field in &filter.fields {
        if let Some(query) = field_query(field, filter.conjunction, &filter.values)? {
            bool_query.append(query, Conjunction::Or);
        }
    }
    Ok(bool_query.simplify())
}

/// Compile one filter value and decorate it with boost and nesting.
fn value_query(field: &str, value: &FilterValue) -> Result<Option<EngineQuery>> {
    let Some(query) = leaf_query(field, value)? else {
        return Ok(None);
    };
    Ok(Some(decorate(query, field, value)))
}

/// Compile one filter value to a leaf query, or `None` when the payload
/// carries no constraint.
fn leaf_query(field: &str, value: &FilterValue) -> Result<Option<EngineQuery>> {
    if is_empty_scalar(&value.value) {
        return Ok(None);
    }
    match value.kind {
        FilterKind::Term => Ok(terms_query(field, &value.value)),
        FilterKind::Phrase => Ok(phrase_query(field, &value.value)),
        FilterKind::Wildcard => Ok(Some(EngineQuery::wildcard(field, literal(&value.value)))),
        FilterKind::Range => range_query(field, &value.value).map(Some),
    }
}

fn terms_query(field: &str, value: &Value) -> Option<EngineQuery> {
    let mut terms = scalars(value);
    match terms.len() {
        0 => None,
        1 => terms.pop().map(|term| EngineQuery::term(field, term)),
        _ => Some(EngineQuery::terms(field, terms)),
    }
}

fn phrase_query(field: &str, value: &Value) -> Option<EngineQuery> {
    let mut phrases = scalars(value);
    match phrases.len() {
        0 => None,
        1 => phrases
            .pop()
            .map(|phrase| EngineQuery::match_phrase(field, phrase)),
        _ => {
            let mut bool_query = BoolQuery::new();
            for phrase in phrases {
                bool_query.append(EngineQuery::match_phrase(field, phrase), Conjunction::Or);
            }
            Some(EngineQuery::Bool(bool_query))
        }
    }
}

fn range_query(field: &str, value: &Value) -> Result<EngineQuery> {
    let Value::Array(bounds) = value else {
        return Err(SearchBridgeError::query(format!(
            "range filter on '{field}' expects a [lower, upper] pair"
        )));
    };
    if bounds.len() != 2 {
        return Err(SearchBridgeError::query(format!(
            "range filter on '{field}' expects exactly 2 bounds, got {}",
            bounds.len()
        )));
    }
    let from = (!bounds[0].is_null()).then(|| bounds[0].clone());
    let to = (!bounds[1].is_null()).then(|| bounds[1].clone());
    Ok(EngineQuery::range(field, from, to))
}

/// Normalize a payload into its non-empty scalar values.
fn scalars(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !is_empty_scalar(item))
            .cloned()
            .collect(),
        other if is_empty_scalar(other) => Vec::new(),
        other => vec![other.clone()],
    }
}

fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// The literal string form of a scalar, unquoted for strings.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply the value's boost and wrap dotted field paths in nested-object
/// wrappers, innermost first.
fn decorate(mut query: EngineQuery, field: &str, value: &FilterValue) -> EngineQuery {
    if let Some(boost) = value.boost {
        query.set_boost(boost);
    }
    if field.contains('.') {
        query = nest(query, field);
    }
    query
}

/// Peel the trailing path segment and wrap, repeating while the remaining
/// prefix is still dotted.
fn nest(mut query: EngineQuery, field: &str) -> EngineQuery {
    let mut path = field;
    while let Some(split) = path.rfind('.') {
        path = &path[..split];
        query = EngineQuery::nested(path, query);
    }
    query
}

/// Wrap the compiled query in a function-score decorator when scoring rules
/// or decay functions are present.
fn score(query: EngineQuery, search_query: &SearchQuery) -> EngineQuery {
    if search_query.scores.is_empty() && search_query.functions.is_empty() {
        return query;
    }
    let mut functions = Vec::new();
    for rule_set in &search_query.scores {
        functions.push(ScoreFunction::Script {
            script: script::compile(rule_set),
        });
    }
    for function in &search_query.functions {
        functions.push(ScoreFunction::LinearDecay {
            field: function.field.clone(),
            origin: function.origin.clone(),
            scale: function.scale.clone(),
            offset: function.offset.clone(),
            decay: function.decay,
        });
    }
    EngineQuery::FunctionScore {
        query: Box::new(query),
        functions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Filter;
    use crate::score::Score;
    use serde_json::json;

    fn term_filter(field: &str, values: &[&str]) -> Filter {
        let mut filter = Filter::new(field, Conjunction::Or);
        for value in values {
            filter.add_value(FilterValue::term(*value));
        }
        filter
    }

    #[test]
    fn test_empty_query_compiles_to_match_all() {
        let query = compile(&SearchQuery::new()).unwrap();
        assert_eq!(query, EngineQuery::MatchAll);
    }

    #[test]
    fn test_empty_value_set_is_absent() {
        let search_query = SearchQuery::new().with_filter(Filter::new("category", Conjunction::Or));
        let query = compile(&search_query).unwrap();
        assert_eq!(query, EngineQuery::MatchAll);
    }

    #[test]
    fn test_null_and_empty_values_are_dropped() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("category", Conjunction::Or)
                .with_value(FilterValue::term(Value::Null))
                .with_value(FilterValue::term("")),
        );
        let query = compile(&search_query).unwrap();
        assert_eq!(query, EngineQuery::MatchAll);
    }

    #[test]
    fn test_single_term_compiles_to_term_query() {
        let search_query = SearchQuery::new().with_filter(term_filter("category", &["books"]));
        let query = compile(&search_query).unwrap();
        assert_eq!(query, EngineQuery::term("category", json!("books")));
    }

    #[test]
    fn test_term_list_compiles_to_membership_query() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("category", Conjunction::Or)
                .with_value(FilterValue::term(json!(["books", "games"]))),
        );
        let query = compile(&search_query).unwrap();
        assert_eq!(
            query,
            EngineQuery::terms("category", vec![json!("books"), json!("games")])
        );
    }

    #[test]
    fn test_multiple_phrases_become_should_clauses() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("title", Conjunction::Or)
                .with_value(FilterValue::phrase(json!(["red bike", "blue bike"]))),
        );
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::Bool(bool_query) => {
                assert!(bool_query.must.is_empty());
                assert_eq!(bool_query.should.len(), 2);
            }
            other => panic!("expected boolean node, got {other:?}"),
        }
    }

    #[test]
    fn test_wildcard_uses_literal_string_form() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("code", Conjunction::Or).with_value(FilterValue::wildcard(json!(42))),
        );
        let query = compile(&search_query).unwrap();
        assert_eq!(query, EngineQuery::wildcard("code", "42"));
    }

    #[test]
    fn test_range_open_bounds() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("price", Conjunction::Or)
                .with_value(FilterValue::range(Some(json!(10)), None)),
        );
        let query = compile(&search_query).unwrap();
        assert_eq!(query, EngineQuery::range("price", Some(json!(10)), None));
    }

    #[test]
    fn test_malformed_range_payload_is_an_error() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("price", Conjunction::Or).with_value(FilterValue {
                kind: FilterKind::Range,
                value: json!([1, 2, 3]),
                boost: None,
            }),
        );
        assert!(compile(&search_query).is_err());
    }

    #[test]
    fn test_dotted_field_wraps_once_per_parent_segment() {
        let search_query = SearchQuery::new().with_filter(term_filter("a.b", &["x"]));
        let query = compile(&search_query).unwrap();
        assert_eq!(
            query,
            EngineQuery::nested("a", EngineQuery::term("a.b", json!("x")))
        );

        let search_query = SearchQuery::new().with_filter(term_filter("a.b.c", &["x"]));
        let query = compile(&search_query).unwrap();
        assert_eq!(
            query,
            EngineQuery::nested(
                "a",
                EngineQuery::nested("a.b", EngineQuery::term("a.b.c", json!("x")))
            )
        );
    }

    #[test]
    fn test_boost_is_applied_before_nesting() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("tags.name", Conjunction::Or)
                .with_value(FilterValue::term("new").with_boost(3.0)),
        );
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::Nested { path, query, .. } => {
                assert_eq!(path, "tags");
                match *query {
                    EngineQuery::Term { boost, .. } => assert_eq!(boost, Some(3.0)),
                    other => panic!("expected term query, got {other:?}"),
                }
            }
            other => panic!("expected nested query, got {other:?}"),
        }
    }

    #[test]
    fn test_filters_are_anded_together() {
        let search_query = SearchQuery::new()
            .with_filter(term_filter("category", &["books"]))
            .with_filter(term_filter("language", &["en"]));
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::Bool(bool_query) => {
                assert_eq!(bool_query.must.len(), 2);
                assert!(bool_query.should.is_empty());
            }
            other => panic!("expected boolean node, got {other:?}"),
        }
    }

    #[test]
    fn test_value_conjunction_controls_clause_list() {
        let search_query = SearchQuery::new().with_filter(
            Filter::new("category", Conjunction::And)
                .with_value(FilterValue::term("a"))
                .with_value(FilterValue::term("b")),
        );
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::Bool(bool_query) => {
                assert_eq!(bool_query.must.len(), 2);
                assert!(bool_query.should.is_empty());
            }
            other => panic!("expected boolean node, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_field_filter_ors_fields() {
        let search_query = SearchQuery::new().with_multi_filter(
            MultiFieldFilter::new(["title", "description"], Conjunction::And)
                .with_value(FilterValue::term("bike")),
        );
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::Bool(bool_query) => {
                assert!(bool_query.must.is_empty());
                assert_eq!(bool_query.should.len(), 2);
            }
            other => panic!("expected boolean node, got {other:?}"),
        }
    }

    #[test]
    fn test_scores_wrap_in_function_score() {
        let search_query = SearchQuery::new()
            .with_filter(term_filter("category", &["books"]))
            .with_score(Score::new(1.0));
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::FunctionScore { query, functions } => {
                assert_eq!(*query, EngineQuery::term("category", json!("books")));
                assert_eq!(functions.len(), 1);
            }
            other => panic!("expected function-score node, got {other:?}"),
        }
    }

    #[test]
    fn test_decay_function_alone_wraps_in_function_score() {
        use crate::score::DecayFunction;

        let search_query = SearchQuery::new().with_function(DecayFunction::new(
            "published",
            json!("now"),
            json!("30d"),
            json!("7d"),
            0.5,
        ));
        let query = compile(&search_query).unwrap();

        match query {
            EngineQuery::FunctionScore { query, functions } => {
                assert_eq!(*query, EngineQuery::MatchAll);
                assert_eq!(functions.len(), 1);
            }
            other => panic!("expected function-score node, got {other:?}"),
        }
    }
}
