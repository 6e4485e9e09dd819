//! The two admission-specific primitives: `not-equal` and `not-matching-pattern`.

use regex::Regex;
use serde_json::Value;

use super::args;
use super::value::{canonical_text, is_empty, number_text};
use super::{ErrorCode, Primitive, SpecError};

/// Rejects a value whose canonical text equals `forbidden`.
///
/// Comparison is textual, so `8000` and `"8000"` are the same value.
#[derive(Debug, Clone)]
pub struct NotEqual {
    forbidden: String,
}

impl NotEqual {
    pub fn new(forbidden: impl Into<String>) -> Self {
        Self {
            forbidden: forbidden.into(),
        }
    }

    pub fn apply(&self, value: Value) -> Result<Value, ErrorCode> {
        if is_empty(&value) {
            return Ok(value);
        }
        match canonical_text(&value) {
            None => Err(ErrorCode::FormatError),
            Some(text) if text == self.forbidden => Err(ErrorCode::NotAllowedValue),
            Some(_) => Ok(value),
        }
    }
}

/// Rejects a value that matches `pattern` anywhere (unanchored search).
#[derive(Debug, Clone)]
pub struct NotMatchingPattern {
    pattern: Regex,
}

impl NotMatchingPattern {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn apply(&self, value: Value) -> Result<Value, ErrorCode> {
        let matched = match &value {
            v if is_empty(v) => false,
            Value::String(s) => self.pattern.is_match(s),
            Value::Number(n) => self.pattern.is_match(&number_text(n)),
            _ => return Err(ErrorCode::FormatError),
        };
        if matched {
            Err(ErrorCode::WrongFormat)
        } else {
            Ok(value)
        }
    }
}

pub(super) fn not_equal(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::NotEqual(NotEqual::new(args::scalar(name, a)?)))
}

pub(super) fn not_matching_pattern(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::NotMatchingPattern(NotMatchingPattern::new(
        args::pattern(name, a)?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::compile_primitive;
    use serde_json::json;

    fn pattern(source: &str) -> NotMatchingPattern {
        NotMatchingPattern::new(Regex::new(source).unwrap())
    }

    #[test]
    fn not_equal_rejects_forbidden_value() {
        let p = NotEqual::new("authnetes");
        assert_eq!(p.apply(json!("authnetes")), Err(ErrorCode::NotAllowedValue));
        assert_eq!(p.apply(json!("nginx")), Ok(json!("nginx")));
    }

    #[test]
    fn not_equal_compares_numbers_as_text() {
        let p = NotEqual::new("8000");
        assert_eq!(p.apply(json!(8000)), Err(ErrorCode::NotAllowedValue));
        assert_eq!(p.apply(json!("8000")), Err(ErrorCode::NotAllowedValue));
        assert_eq!(p.apply(json!(8001)), Ok(json!(8001)));
    }

    #[test]
    fn not_equal_passes_empty_values() {
        let p = NotEqual::new("");
        assert_eq!(p.apply(Value::Null), Ok(Value::Null));
        assert_eq!(p.apply(json!("")), Ok(json!("")));
    }

    #[test]
    fn not_equal_rejects_non_scalars() {
        let p = NotEqual::new("x");
        assert_eq!(p.apply(json!({"a": 1})), Err(ErrorCode::FormatError));
        assert_eq!(p.apply(json!(["x"])), Err(ErrorCode::FormatError));
    }

    #[test]
    fn not_matching_pattern_is_unanchored() {
        let p = pattern("latest");
        assert_eq!(p.apply(json!("nginx:latest")), Err(ErrorCode::WrongFormat));
        assert_eq!(p.apply(json!("nginx:1.25")), Ok(json!("nginx:1.25")));
    }

    #[test]
    fn not_matching_pattern_matches_numbers_as_text() {
        let p = pattern("^80");
        assert_eq!(p.apply(json!(8080)), Err(ErrorCode::WrongFormat));
        assert_eq!(p.apply(json!(443)), Ok(json!(443)));
    }

    #[test]
    fn not_matching_pattern_edge_values() {
        let p = pattern(".*");
        assert_eq!(p.apply(Value::Null), Ok(Value::Null));
        assert_eq!(p.apply(json!("")), Ok(json!("")));
        assert_eq!(p.apply(json!(true)), Err(ErrorCode::FormatError));
        assert_eq!(p.apply(json!([])), Err(ErrorCode::FormatError));
    }

    #[test]
    fn case_insensitive_pattern_through_registry() {
        let p = compile_primitive("not-matching-pattern", &json!(["^a", "i"])).unwrap();
        assert_eq!(p.apply(json!("Apple")), Err(ErrorCode::WrongFormat));
        assert_eq!(p.apply(json!("apple")), Err(ErrorCode::WrongFormat));
        assert_eq!(p.apply(json!("banana")), Ok(json!("banana")));

        let p = compile_primitive("not-matching-pattern", &json!(["^a"])).unwrap();
        assert_eq!(p.apply(json!("Apple")), Ok(json!("Apple")));
    }

    #[test]
    fn constructors_decode_arguments() {
        assert!(matches!(
            not_equal("not-equal", &json!(8000)).unwrap(),
            Primitive::NotEqual(_)
        ));
        assert!(not_equal("not-equal", &json!({"a": 1})).is_err());
        assert!(matches!(
            not_matching_pattern("not-matching-pattern", &json!("(oops")),
            Err(SpecError::InvalidPattern { .. })
        ));
    }
}
