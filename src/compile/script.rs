//! Compilation of scoring rule sets into per-document engine scripts.
//!
//! The emitted program reads the declared fields into scratch arrays, applies
//! the field bound guards, then evaluates the cases strictly first-match. A
//! condition-less case terminates the chain; with no match the default weight
//! is returned. Field names and string literals are emitted verbatim, so rule
//! inputs must be validated by the caller before compilation.

use crate::engine::query::InlineScript;
use crate::score::{Case, Comparator, Score};

/// Compile a scoring rule set into an inline script.
pub fn compile(score: &Score) -> InlineScript {
    InlineScript::new(source(score))
}

/// Render the script source text for a scoring rule set.
pub fn source(score: &Score) -> String {
    if score.cases.is_empty() {
        return format!("return {};", weight(score.default_weight));
    }
    let default_weight = weight(score.default_weight);
    let mut s = helpers();
    s.push_str(&format!(
        "def[] fieldValues = new def[{}];",
        score.fields.len()
    ));
    s.push_str(&format!("def[] values = new def[{}];", score.fields.len()));
    for (i, field) in score.fields.iter().enumerate() {
        s.push_str(&format!(
            "fieldValues[{i}] = doc['{}'].getValue();",
            field.name
        ));
        if let Some(lower) = field.lower_limit {
            s.push_str(&format!(
                "if (fieldValues[{i}] < {}) {{ return {default_weight}; }}",
                weight(lower)
            ));
        }
        if let Some(upper) = field.upper_limit {
            s.push_str(&format!(
                "if (fieldValues[{i}] > {}) {{ return {default_weight}; }}",
                weight(upper)
            ));
        }
        s.push_str(&format!("values[{i}] = {};", field.value.literal()));
    }
    s.push_str(&cases(score));
    s
}

/// Render the case chain. A condition-less case is a terminating else; cases
/// after it are unreachable and emitted as nothing.
fn cases(score: &Score) -> String {
    let mut s = String::new();
    let mut had_else = false;
    for case in &score.cases {
        if case.conditions.is_empty() {
            s.push_str(&format!("return {};", weight(case.weight)));
            had_else = true;
            break;
        }
        s.push_str(&conditions(case));
    }
    if !had_else {
        s.push_str(&format!("return {};", weight(score.default_weight)));
    }
    s
}

/// Render one case as an AND-joined guard returning its weight.
fn conditions(case: &Case) -> String {
    let mut s = String::from("if (");
    for (i, condition) in case.conditions.iter().enumerate() {
        if i > 0 {
            s.push_str(" && ");
        }
        let left = condition.left.operand();
        let right = condition.right.operand();
        match condition.comparator {
            Comparator::Equals => {
                s.push_str(&format!("({left}) != null && {left}.equals({right})"));
            }
            other => {
                s.push_str(&format!("{left} {} {right}", other.op()));
            }
        }
    }
    s.push_str(&format!(") {{ return {}; }} ", weight(case.weight)));
    s
}

/// Render a weight or bound so integral values keep a decimal point.
fn weight(value: f64) -> String {
    format!("{value:?}")
}

/// The helper expression library available to conditions and weights.
fn helpers() -> String {
    let mut s = String::new();
    s.push_str("double toRad(double degree) { return degree * Math.PI / 180; }");
    s.push_str("double getDistance(double lat1, double lon1, double lat2, double lon2) { ");
    s.push_str("double earthRadius = 6371;");
    s.push_str("double rdLat = toRad(lat2-lat1);");
    s.push_str("double rdLon = toRad(lon2-lon1);");
    s.push_str("double rLat1 = toRad(lat1);");
    s.push_str("double rLat2 = toRad(lat2);");
    s.push_str(
        "double a = Math.sin(rdLat/2) * Math.sin(rdLat/2) + Math.sin(rdLon/2) * Math.sin(rdLon/2) * Math.cos(rLat1) * Math.cos(rLat2);",
    );
    s.push_str("double b = 2 * Math.atan2(Math.sqrt(a), Math.sqrt(1-a));");
    s.push_str("return earthRadius * b;");
    s.push_str("}");
    s.push_str(
        "String substring(String value, int from, int to) { if (value == null || from == -1 || to == -1) { return null; } return value.substring(from, to); }",
    );
    s.push_str(
        "int indexOf(String value, String phrase) { if (value == null || phrase == null) { return -1; } return value.indexOf(phrase); }",
    );
    s.push_str(
        "int lastIndexOf(String value, String phrase) { if (value == null || phrase == null) { return -1; } return value.lastIndexOf(phrase); }",
    );
    s.push_str("double abs(double value) { return Math.abs(value); }");
    s.push_str("double min(double v1, double v2) { return Math.min(v1, v2); }");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{Case, Condition, ScoreField};

    #[test]
    fn test_no_cases_returns_default_verbatim() {
        let score = Score::new(1.0);
        assert_eq!(source(&score), "return 1.0;");

        let score = Score::new(0.25);
        assert_eq!(source(&score), "return 0.25;");
    }

    #[test]
    fn test_field_prelude_declares_scratch_arrays() {
        let score = Score::new(1.0)
            .with_field(ScoreField::new("price", 100i64))
            .with_field(ScoreField::new("rating", 5))
            .with_case(Case::new(2.0));
        let text = source(&score);

        assert!(text.contains("def[] fieldValues = new def[2];"));
        assert!(text.contains("def[] values = new def[2];"));
        assert!(text.contains("fieldValues[0] = doc['price'].getValue();"));
        assert!(text.contains("values[0] = 100L;"));
    }

    #[test]
    fn test_string_field_literal_is_quoted() {
        let score = Score::new(1.0)
            .with_field(ScoreField::new("city", "Berlin"))
            .with_case(Case::new(2.0));
        let text = source(&score);

        assert!(text.contains("values[0] = \"Berlin\";"));
    }

    #[test]
    fn test_bound_guards_short_circuit_in_declaration_order() {
        let score = Score::new(0.5)
            .with_field(
                ScoreField::new("price", 100i64)
                    .with_lower_limit(10.0)
                    .with_upper_limit(500.0),
            )
            .with_case(Case::new(2.0));
        let text = source(&score);

        let lower = "if (fieldValues[0] < 10.0) { return 0.5; }";
        let upper = "if (fieldValues[0] > 500.0) { return 0.5; }";
        assert!(text.contains(lower));
        assert!(text.contains(upper));
        assert!(text.find(lower).unwrap() < text.find(upper).unwrap());
        // Guards run before any case is evaluated.
        assert!(text.find(upper).unwrap() < text.find("return 2.0;").unwrap());
    }

    #[test]
    fn test_first_match_chain_with_default_fallthrough() {
        let score = Score::new(1.0)
            .with_case(Case::new(3.0).with_condition(Condition::new(
                "values[0]",
                Comparator::GreaterThan,
                "fieldValues[0]",
            )))
            .with_case(Case::new(2.0).with_condition(Condition::new(
                "values[0]",
                Comparator::Is,
                "fieldValues[0]",
            )));
        let text = source(&score);

        assert!(text.contains("if (values[0] > fieldValues[0]) { return 3.0; }"));
        assert!(text.contains("if (values[0] == fieldValues[0]) { return 2.0; }"));
        assert!(text.ends_with("return 1.0;"));
    }

    #[test]
    fn test_unconditional_else_terminates_chain() {
        let score = Score::new(1.0)
            .with_case(Case::new(3.0).with_condition(Condition::new(
                "values[0]",
                Comparator::Is,
                "fieldValues[0]",
            )))
            .with_case(Case::new(2.0))
            .with_case(Case::new(9.0).with_condition(Condition::new(
                "values[0]",
                Comparator::LessThan,
                "fieldValues[0]",
            )));
        let text = source(&score);

        // The else case ends the program; the case after it is dead code and
        // the default weight is never emitted.
        assert!(text.ends_with("return 2.0;"));
        assert!(!text.contains("9.0"));
        assert!(!text.ends_with("return 1.0;"));
    }

    #[test]
    fn test_equals_compiles_null_safe() {
        let score = Score::new(1.0).with_case(Case::new(2.0).with_condition(Condition::new(
            "values[0]",
            Comparator::Equals,
            "fieldValues[0]",
        )));
        let text = source(&score);

        assert!(
            text.contains("if ((values[0]) != null && values[0].equals(fieldValues[0])) { return 2.0; }")
        );
    }

    #[test]
    fn test_conditions_are_and_joined() {
        let score = Score::new(1.0).with_case(
            Case::new(2.0)
                .with_condition(Condition::new("values[0]", Comparator::Is, "fieldValues[0]"))
                .with_condition(Condition::new(
                    "values[1]",
                    Comparator::LessOrEqual,
                    "fieldValues[1]",
                )),
        );
        let text = source(&score);

        assert!(text.contains(
            "if (values[0] == fieldValues[0] && values[1] <= fieldValues[1]) { return 2.0; }"
        ));
    }

    #[test]
    fn test_long_operands_carry_suffix() {
        let score = Score::new(1.0).with_case(Case::new(2.0).with_condition(Condition::new(
            "fieldValues[0]",
            Comparator::GreaterOrEqual,
            1000i64,
        )));
        let text = source(&score);

        assert!(text.contains("if (fieldValues[0] >= 1000L) { return 2.0; }"));
    }

    #[test]
    fn test_helper_library_present_with_cases() {
        let score = Score::new(1.0).with_case(Case::new(2.0));
        let text = source(&score);

        assert!(text.contains("double earthRadius = 6371;"));
        assert!(text.contains("String substring(String value, int from, int to)"));
        assert!(text.contains("double min(double v1, double v2)"));
    }

    #[test]
    fn test_compile_uses_default_language() {
        let script = compile(&Score::new(1.0));
        assert_eq!(script.lang, "painless");
        assert_eq!(script.source, "return 1.0;");
    }
}
