//! Scoring rule model.
//!
//! A [`Score`] is an ordered list of weighted [`Case`]s evaluated first-match
//! per document, a default weight used when no case matches, and the
//! [`ScoreField`] definitions the cases read. The rule set is compiled into an
//! engine-side script by [`crate::compile::script`]. A [`DecayFunction`]
//! describes a linear decay on a numeric or date field and needs no
//! compilation step.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A literal or expression fragment used in scoring rules.
///
/// Rendering differs by position: stored as a field literal, strings are
/// quoted; used as a condition operand, strings are emitted verbatim (they are
/// expressions such as `values[0]`). Longs carry an `L` suffix in both forms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// A string literal or expression fragment.
    Str(String),
    /// A 32-bit integer literal.
    Int(i32),
    /// A 64-bit integer literal, rendered with an `L` suffix.
    Long(i64),
    /// A floating point literal.
    Double(f64),
}

impl ScriptValue {
    /// Render as a literal stored into a script variable.
    pub fn literal(&self) -> String {
        match self {
            ScriptValue::Str(s) => format!("\"{s}\""),
            ScriptValue::Int(v) => v.to_string(),
            ScriptValue::Long(v) => format!("{v}L"),
            ScriptValue::Double(v) => format!("{v:?}"),
        }
    }

    /// Render as an operand inside a condition expression.
    pub fn operand(&self) -> String {
        match self {
            ScriptValue::Str(s) => s.clone(),
            ScriptValue::Int(v) => v.to_string(),
            ScriptValue::Long(v) => format!("{v}L"),
            ScriptValue::Double(v) => format!("{v:?}"),
        }
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::Str(value.to_string())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::Str(value)
    }
}

impl From<i32> for ScriptValue {
    fn from(value: i32) -> Self {
        ScriptValue::Int(value)
    }
}

impl From<i64> for ScriptValue {
    fn from(value: i64) -> Self {
        ScriptValue::Long(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Double(value)
    }
}

/// Comparison operator between two condition operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    /// Identity comparison, compiled to `==`.
    Is,
    /// Null-safe object equality.
    Equals,
    /// Compiled to `<`.
    LessThan,
    /// Compiled to `<=`.
    LessOrEqual,
    /// Compiled to `>`.
    GreaterThan,
    /// Compiled to `>=`.
    GreaterOrEqual,
}

impl Comparator {
    /// The relational operator this comparator compiles to.
    ///
    /// [`Comparator::Equals`] compiles to a null-safe equals call instead and
    /// falls back to `==` here.
    pub fn op(&self) -> &'static str {
        match self {
            Comparator::LessThan => "<",
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterThan => ">",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Is | Comparator::Equals => "==",
        }
    }
}

/// A single comparison between two operand expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Left operand expression.
    pub left: ScriptValue,
    /// The comparison operator.
    pub comparator: Comparator,
    /// Right operand expression.
    pub right: ScriptValue,
}

impl Condition {
    /// Create a new condition.
    pub fn new<L, R>(left: L, comparator: Comparator, right: R) -> Self
    where
        L: Into<ScriptValue>,
        R: Into<ScriptValue>,
    {
        Condition {
            left: left.into(),
            comparator,
            right: right.into(),
        }
    }
}

/// A weighted case: AND-joined conditions and the weight returned when they
/// all hold. A case with no conditions is an unconditional "else".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// AND-joined conditions; empty means unconditional.
    pub conditions: Vec<Condition>,
    /// The weight returned when this case matches.
    pub weight: f64,
}

impl Case {
    /// Create an unconditional case with the given weight.
    pub fn new(weight: f64) -> Self {
        Case {
            conditions: Vec::new(),
            weight,
        }
    }

    /// Add a condition, builder-style.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// A field read by the scoring script, with an optional literal comparison
/// value and optional inclusive bounds used as short-circuit guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreField {
    /// The document field name.
    pub name: String,
    /// The literal value stored into the script's scratch slot.
    pub value: ScriptValue,
    /// Inclusive lower bound; a document value below it short-circuits to the
    /// default weight.
    pub lower_limit: Option<f64>,
    /// Inclusive upper bound; a document value above it short-circuits to the
    /// default weight.
    pub upper_limit: Option<f64>,
}

impl ScoreField {
    /// Create a new score field without bounds.
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<ScriptValue>,
    {
        ScoreField {
            name: name.into(),
            value: value.into(),
            lower_limit: None,
            upper_limit: None,
        }
    }

    /// Set the inclusive lower bound.
    pub fn with_lower_limit(mut self, limit: f64) -> Self {
        self.lower_limit = Some(limit);
        self
    }

    /// Set the inclusive upper bound.
    pub fn with_upper_limit(mut self, limit: f64) -> Self {
        self.upper_limit = Some(limit);
        self
    }
}

/// An ordered scoring rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Field definitions, in declaration order.
    pub fields: Vec<ScoreField>,
    /// Cases, evaluated first-match in declaration order.
    pub cases: Vec<Case>,
    /// Weight returned when no case matches or a field guard fires.
    pub default_weight: f64,
}

impl Score {
    /// Create a new rule set with the given default weight.
    pub fn new(default_weight: f64) -> Self {
        Score {
            fields: Vec::new(),
            cases: Vec::new(),
            default_weight,
        }
    }

    /// Add a field definition, builder-style.
    pub fn with_field(mut self, field: ScoreField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a case, builder-style.
    pub fn with_case(mut self, case: Case) -> Self {
        self.cases.push(case);
        self
    }
}

/// A linear decay function on a field: full score within `offset` of
/// `origin`, decaying to `decay` at distance `scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayFunction {
    /// The field the decay is computed on.
    pub field: String,
    /// The point of full score.
    pub origin: Value,
    /// Distance from origin at which the score is `decay`.
    pub scale: Value,
    /// Distance from origin within which no decay applies.
    pub offset: Value,
    /// Score multiplier at distance `scale`.
    pub decay: f64,
}

impl DecayFunction {
    /// Create a new linear decay function.
    pub fn new<F: Into<String>>(
        field: F,
        origin: Value,
        scale: Value,
        offset: Value,
        decay: f64,
    ) -> Self {
        DecayFunction {
            field: field.into(),
            origin,
            scale,
            offset,
            decay,
        }
    }
}
