//! Compilation of aggregation requests into engine aggregation definitions.
//!
//! Dotted fields are wrapped bottom-up in nested aggregations and get a
//! reverse-nested sub-aggregation directly under the innermost node, so bucket
//! counts can be mapped back to owning parent documents instead of nested
//! sub-documents.

use crate::aggregation::SearchAggregation;
use crate::engine::aggregation::EngineAggregation;

/// Compile one aggregation request.
pub fn compile(aggregation: &SearchAggregation) -> EngineAggregation {
    let built = match aggregation {
        SearchAggregation::Terms { name, field } => EngineAggregation::terms(name, field),
        SearchAggregation::Range {
            name,
            field,
            ranges,
        } => EngineAggregation::range(name, field, ranges.clone()),
    };
    if aggregation.field().contains('.') {
        nest(built, aggregation)
    } else {
        built
    }
}

/// Attach the reverse-nested sub-aggregation and wrap the definition in
/// nested aggregations, innermost path first.
fn nest(mut built: EngineAggregation, aggregation: &SearchAggregation) -> EngineAggregation {
    built.add_sub(EngineAggregation::reverse_nested(format!(
        "{}-r",
        aggregation.name()
    )));
    let mut name = aggregation.name().to_string();
    let mut path = aggregation.field();
    while let Some(split) = path.rfind('.') {
        name.push_str("-n");
        path = &path[..split];
        built = EngineAggregation::nested(name.clone(), path, built);
    }
    built
}
