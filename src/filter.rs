//! Filter model for structured search requests.
//!
//! A [`Filter`] constrains a single (possibly dotted) field path with a set of
//! [`FilterValue`]s combined under a [`Conjunction`]; a [`MultiFieldFilter`]
//! applies one value set across several field paths. Filters are plain data:
//! they are compiled into the engine query tree by [`crate::compile::query`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Combination rule applied across a filter's value set or across a
/// multi-field filter's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conjunction {
    /// All clauses must match.
    And,
    /// At least one clause should match.
    Or,
}

/// The query kind a filter value compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    /// Exact term match (one value) or term-set membership (many values).
    Term,
    /// Phrase match; multiple values become an OR of phrase matches.
    Phrase,
    /// Pattern match on the literal string form of the value.
    Wildcard,
    /// Inclusive-bounds range over a `[lower, upper]` pair, either end open.
    Range,
}

/// A single tagged filter value.
///
/// The payload is a scalar, a list of scalars, or (for [`FilterKind::Range`])
/// a 2-element `[lower, upper]` array with nullable ends. A null or empty
/// payload compiles to "no constraint" and is dropped, never to an
/// always-false clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterValue {
    /// The query kind this value compiles to.
    pub kind: FilterKind,
    /// The payload.
    pub value: Value,
    /// Optional positive multiplier on the relevance score.
    pub boost: Option<f32>,
}

impl FilterValue {
    /// Create a term value.
    pub fn term<V: Into<Value>>(value: V) -> Self {
        FilterValue {
            kind: FilterKind::Term,
            value: value.into(),
            boost: None,
        }
    }

    /// Create a phrase value.
    pub fn phrase<V: Into<Value>>(value: V) -> Self {
        FilterValue {
            kind: FilterKind::Phrase,
            value: value.into(),
            boost: None,
        }
    }

    /// Create a wildcard value.
    pub fn wildcard<V: Into<Value>>(value: V) -> Self {
        FilterValue {
            kind: FilterKind::Wildcard,
            value: value.into(),
            boost: None,
        }
    }

    /// Create a range value with inclusive bounds; `None` leaves that end open.
    pub fn range(lower: Option<Value>, upper: Option<Value>) -> Self {
        FilterValue {
            kind: FilterKind::Range,
            value: Value::Array(vec![
                lower.unwrap_or(Value::Null),
                upper.unwrap_or(Value::Null),
            ]),
            boost: None,
        }
    }

    /// Set the boost factor for this value.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.boost = Some(boost);
        self
    }
}

/// A constraint on a single field path.
///
/// The field path is dot-separated for nested objects. Values are unique by
/// equality; insertion order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// The field path, dot-separated for nested objects.
    pub field: String,
    /// Conjunction applied across the value set.
    pub conjunction: Conjunction,
    /// The value set, unique by equality.
    pub values: Vec<FilterValue>,
}

impl Filter {
    /// Create a new filter with an empty value set.
    pub fn new<F: Into<String>>(field: F, conjunction: Conjunction) -> Self {
        Filter {
            field: field.into(),
            conjunction,
            values: Vec::new(),
        }
    }

    /// Add a value; duplicates (by equality) are ignored.
    pub fn add_value(&mut self, value: FilterValue) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Add a value, builder-style.
    pub fn with_value(mut self, value: FilterValue) -> Self {
        self.add_value(value);
        self
    }
}

/// One value set applied across several field paths.
///
/// The per-field sub-queries are combined with OR across fields; the inner
/// per-field conjunction is user-specified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiFieldFilter {
    /// The field paths, OR-combined.
    pub fields: Vec<String>,
    /// Conjunction applied across the value set within each field.
    pub conjunction: Conjunction,
    /// The shared value set, unique by equality.
    pub values: Vec<FilterValue>,
}

impl MultiFieldFilter {
    /// Create a new multi-field filter with an empty value set.
    pub fn new<I, F>(fields: I, conjunction: Conjunction) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        MultiFieldFilter {
            fields: fields.into_iter().map(Into::into).collect(),
            conjunction,
            values: Vec::new(),
        }
    }

    /// Add a value; duplicates (by equality) are ignored.
    pub fn add_value(&mut self, value: FilterValue) {
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    /// Add a value, builder-style.
    pub fn with_value(mut self, value: FilterValue) -> Self {
        self.add_value(value);
        self
    }
}
