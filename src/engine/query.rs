//! Typed query tree for the engine's search DSL.
//!
//! Each node renders itself to the engine's JSON query language via
//! [`EngineQuery::to_json`], so compiled queries are testable without a live
//! engine.

use serde_json::{Map, Value, json};

use crate::filter::Conjunction;

/// Language tag for inline scripts submitted to the engine.
pub const SCRIPT_LANG: &str = "painless";

/// An inline script: language tag, source text, and parameter map.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineScript {
    /// The script language tag.
    pub lang: String,
    /// The script source text.
    pub source: String,
    /// Named parameters passed to the script.
    pub params: Map<String, Value>,
}

impl InlineScript {
    /// Create an inline script in the default language.
    pub fn new<S: Into<String>>(source: S) -> Self {
        InlineScript {
            lang: SCRIPT_LANG.to_string(),
            source: source.into(),
            params: Map::new(),
        }
    }

    /// Add a named parameter, builder-style.
    pub fn with_param<N: Into<String>>(mut self, name: N, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Render to the engine's script object.
    pub fn to_json(&self) -> Value {
        let mut script = Map::new();
        script.insert("lang".to_string(), Value::String(self.lang.clone()));
        script.insert("source".to_string(), Value::String(self.source.clone()));
        if !self.params.is_empty() {
            script.insert("params".to_string(), Value::Object(self.params.clone()));
        }
        Value::Object(script)
    }
}

/// How nested sub-document scores combine into the parent score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// Sum the scores of matching sub-documents.
    Sum,
    /// Average the scores.
    Avg,
    /// Take the highest score.
    Max,
    /// Take the lowest score.
    Min,
    /// Ignore sub-document scores.
    None,
}

impl ScoreMode {
    /// The engine's wire name for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::Sum => "sum",
            ScoreMode::Avg => "avg",
            ScoreMode::Max => "max",
            ScoreMode::Min => "min",
            ScoreMode::None => "none",
        }
    }
}

/// An auxiliary scored function inside a function-score wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreFunction {
    /// A per-document script evaluated by the engine.
    Script {
        /// The inline script.
        script: InlineScript,
    },
    /// A linear decay on a field.
    LinearDecay {
        /// The field the decay is computed on.
        field: String,
        /// The point of full score.
        origin: Value,
        /// Distance from origin at which the score is `decay`.
        scale: Value,
        /// Distance from origin within which no decay applies.
        offset: Value,
        /// Score multiplier at distance `scale`.
        decay: f64,
    },
}

impl ScoreFunction {
    /// Render to the engine's function object.
    pub fn to_json(&self) -> Value {
        match self {
            ScoreFunction::Script { script } => {
                json!({ "script_score": { "script": script.to_json() } })
            }
            ScoreFunction::LinearDecay {
                field,
                origin,
                scale,
                offset,
                decay,
            } => json!({
                "linear": {
                    field: {
                        "origin": origin,
                        "scale": scale,
                        "offset": offset,
                        "decay": decay,
                    }
                }
            }),
        }
    }
}

/// A node in the engine's boolean query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineQuery {
    /// Matches every document.
    MatchAll,
    /// Exact equality on a field.
    Term {
        /// The field path.
        field: String,
        /// The matched value.
        value: Value,
        /// Optional relevance multiplier.
        boost: Option<f32>,
    },
    /// Membership in a value set.
    Terms {
        /// The field path.
        field: String,
        /// The matched values.
        values: Vec<Value>,
        /// Optional relevance multiplier.
        boost: Option<f32>,
    },
    /// Phrase match.
    MatchPhrase {
        /// The field path.
        field: String,
        /// The matched phrase.
        query: Value,
        /// Optional relevance multiplier.
        boost: Option<f32>,
    },
    /// Pattern match on the literal string form of a value.
    Wildcard {
        /// The field path.
        field: String,
        /// The wildcard pattern.
        pattern: String,
        /// Optional relevance multiplier.
        boost: Option<f32>,
    },
    /// Inclusive-bounds range; either end may be open.
    Range {
        /// The field path.
        field: String,
        /// Inclusive lower bound.
        from: Option<Value>,
        /// Inclusive upper bound.
        to: Option<Value>,
        /// Optional relevance multiplier.
        boost: Option<f32>,
    },
    /// Boolean combinator with must/should clauses.
    Bool(BoolQuery),
    /// Nested-object wrapper binding a sub-query to a parent path.
    Nested {
        /// The parent path of the nested objects.
        path: String,
        /// The wrapped query.
        query: Box<EngineQuery>,
        /// How sub-document scores combine.
        score_mode: ScoreMode,
    },
    /// Function-score decoration around a base query.
    FunctionScore {
        /// The base query.
        query: Box<EngineQuery>,
        /// The scored functions, in insertion order.
        functions: Vec<ScoreFunction>,
    },
}

impl EngineQuery {
    /// Create a term query.
    pub fn term<F: Into<String>>(field: F, value: Value) -> Self {
        EngineQuery::Term {
            field: field.into(),
            value,
            boost: None,
        }
    }

    /// Create a terms membership query.
    pub fn terms<F: Into<String>>(field: F, values: Vec<Value>) -> Self {
        EngineQuery::Terms {
            field: field.into(),
            values,
            boost: None,
        }
    }

    /// Create a phrase-match query.
    pub fn match_phrase<F: Into<String>>(field: F, query: Value) -> Self {
        EngineQuery::MatchPhrase {
            field: field.into(),
            query,
            boost: None,
        }
    }

    /// Create a wildcard query.
    pub fn wildcard<F: Into<String>, P: Into<String>>(field: F, pattern: P) -> Self {
        EngineQuery::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
            boost: None,
        }
    }

    /// Create an inclusive range query.
    pub fn range<F: Into<String>>(field: F, from: Option<Value>, to: Option<Value>) -> Self {
        EngineQuery::Range {
            field: field.into(),
            from,
            to,
            boost: None,
        }
    }

    /// Wrap a query in a nested-object wrapper summing sub-document scores.
    pub fn nested<P: Into<String>>(path: P, query: EngineQuery) -> Self {
        EngineQuery::Nested {
            path: path.into(),
            query: Box::new(query),
            score_mode: ScoreMode::Sum,
        }
    }

    /// Set the boost factor on leaf and boolean nodes; wrapper nodes are
    /// unaffected.
    pub fn set_boost(&mut self, value: f32) {
        match self {
            EngineQuery::Term { boost, .. }
            | EngineQuery::Terms { boost, .. }
            | EngineQuery::MatchPhrase { boost, .. }
            | EngineQuery::Wildcard { boost, .. }
            | EngineQuery::Range { boost, .. } => *boost = Some(value),
            EngineQuery::Bool(bool_query) => bool_query.boost = Some(value),
            EngineQuery::MatchAll
            | EngineQuery::Nested { .. }
            | EngineQuery::FunctionScore { .. } => {}
        }
    }

    /// Render to the engine's JSON query language.
    pub fn to_json(&self) -> Value {
        match self {
            EngineQuery::MatchAll => json!({ "match_all": {} }),
            EngineQuery::Term {
                field,
                value,
                boost,
            } => {
                let mut body = Map::new();
                body.insert("value".to_string(), value.clone());
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "term": { field: body } })
            }
            EngineQuery::Terms {
                field,
                values,
                boost,
            } => {
                let mut body = Map::new();
                body.insert(field.clone(), Value::Array(values.clone()));
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "terms": body })
            }
            EngineQuery::MatchPhrase {
                field,
                query,
                boost,
            } => {
                let mut body = Map::new();
                body.insert("query".to_string(), query.clone());
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "match_phrase": { field: body } })
            }
            EngineQuery::Wildcard {
                field,
                pattern,
                boost,
            } => {
                let mut body = Map::new();
                body.insert("value".to_string(), Value::String(pattern.clone()));
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "wildcard": { field: body } })
            }
            EngineQuery::Range {
                field,
                from,
                to,
                boost,
            } => {
                let mut body = Map::new();
                if let Some(from) = from {
                    body.insert("gte".to_string(), from.clone());
                }
                if let Some(to) = to {
                    body.insert("lte".to_string(), to.clone());
                }
                if let Some(boost) = boost {
                    body.insert("boost".to_string(), json!(boost));
                }
                json!({ "range": { field: body } })
            }
            EngineQuery::Bool(bool_query) => bool_query.to_json(),
            EngineQuery::Nested {
                path,
                query,
                score_mode,
            } => json!({
                "nested": {
                    "path": path,
                    "score_mode": score_mode.as_str(),
                    "query": query.to_json(),
                }
            }),
            EngineQuery::FunctionScore { query, functions } => {
                let functions: Vec<Value> = functions.iter().map(ScoreFunction::to_json).collect();
                json!({
                    "function_score": {
                        "query": query.to_json(),
                        "functions": functions,
                    }
                })
            }
        }
    }
}

/// Accumulator for must/should clauses with the wrapper-elision rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Clauses that must match.
    pub must: Vec<EngineQuery>,
    /// Clauses that should match.
    pub should: Vec<EngineQuery>,
    /// Optional relevance multiplier.
    pub boost: Option<f32>,
}

impl BoolQuery {
    /// Create an empty boolean accumulator.
    pub fn new() -> Self {
        BoolQuery::default()
    }

    /// Append a clause under the given conjunction.
    pub fn append(&mut self, query: EngineQuery, conjunction: Conjunction) {
        match conjunction {
            Conjunction::And => self.must.push(query),
            Conjunction::Or => self.should.push(query),
        }
    }

    /// Collapse to the simplest equivalent query.
    ///
    /// Zero clauses compile to absent; a single clause under a pure must or
    /// pure should list replaces the wrapper; anything else stays a boolean
    /// node.
    pub fn simplify(mut self) -> Option<EngineQuery> {
        match (self.must.len(), self.should.len()) {
            (0, 0) => None,
            (0, 1) => self.should.pop(),
            (1, 0) => self.must.pop(),
            _ => Some(EngineQuery::Bool(self)),
        }
    }

    /// Render to the engine's JSON query language.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if !self.must.is_empty() {
            let must: Vec<Value> = self.must.iter().map(EngineQuery::to_json).collect();
            body.insert("must".to_string(), Value::Array(must));
        }
        if !self.should.is_empty() {
            let should: Vec<Value> = self.should.iter().map(EngineQuery::to_json).collect();
            body.insert("should".to_string(), Value::Array(should));
        }
        if let Some(boost) = self.boost {
            body.insert("boost".to_string(), json!(boost));
        }
        json!({ "bool": body })
    }
}
