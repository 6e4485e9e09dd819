//! Typed decoding of primitive arguments.
//!
//! Arguments arrive as YAML-decoded JSON values. LIVR lets a single argument
//! be written bare (`max_length: 10`) or wrapped (`max_length: [10]`); both
//! decode the same way here.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::value::{canonical_text, numeric};
use super::SpecError;

pub(super) fn invalid(name: &str, reason: impl Into<String>) -> SpecError {
    SpecError::InvalidArgs {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Unwrap a one-element list.
fn single(args: &Value) -> &Value {
    match args {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// Nullary primitives accept `~`, `true` or `[]`.
pub(super) fn none(name: &str, args: &Value) -> Result<(), SpecError> {
    match args {
        Value::Null | Value::Bool(true) => Ok(()),
        Value::Array(items) if items.is_empty() => Ok(()),
        other => Err(invalid(name, format!("takes no arguments, got {other}"))),
    }
}

/// One scalar argument, as canonical text.
pub(super) fn scalar(name: &str, args: &Value) -> Result<String, SpecError> {
    canonical_text(single(args))
        .ok_or_else(|| invalid(name, "expected a string, number or boolean argument"))
}

/// A non-empty list of scalars (`one_of: [a, b]` or `one_of: [[a, b]]`).
pub(super) fn scalar_list(name: &str, args: &Value) -> Result<Vec<String>, SpecError> {
    let items = match args {
        Value::Array(items) => match items.as_slice() {
            [Value::Array(inner)] => inner,
            _ => items,
        },
        _ => return Err(invalid(name, "expected a list of allowed values")),
    };
    if items.is_empty() {
        return Err(invalid(name, "list of allowed values must not be empty"));
    }
    items
        .iter()
        .map(|item| {
            canonical_text(item)
                .ok_or_else(|| invalid(name, format!("allowed value {item} is not a scalar")))
        })
        .collect()
}

pub(super) fn length(name: &str, args: &Value) -> Result<usize, SpecError> {
    single(args)
        .as_u64()
        .map(|n| n as usize)
        .ok_or_else(|| invalid(name, "expected a non-negative integer length"))
}

pub(super) fn number(name: &str, args: &Value) -> Result<f64, SpecError> {
    numeric(single(args)).ok_or_else(|| invalid(name, "expected a numeric argument"))
}

fn pair<'v>(name: &str, args: &'v Value) -> Result<(&'v Value, &'v Value), SpecError> {
    match args {
        Value::Array(items) if items.len() == 2 => Ok((&items[0], &items[1])),
        _ => Err(invalid(name, "expected a [min, max] pair")),
    }
}

pub(super) fn length_range(name: &str, args: &Value) -> Result<(usize, usize), SpecError> {
    let (min, max) = pair(name, args)?;
    let min = length(name, min)?;
    let max = length(name, max)?;
    if min > max {
        return Err(invalid(name, format!("min {min} is greater than max {max}")));
    }
    Ok((min, max))
}

pub(super) fn number_range(name: &str, args: &Value) -> Result<(f64, f64), SpecError> {
    let (min, max) = pair(name, args)?;
    let min = number(name, min)?;
    let max = number(name, max)?;
    if min > max {
        return Err(invalid(name, format!("min {min} is greater than max {max}")));
    }
    Ok((min, max))
}

/// `pattern`, `[pattern]` or `[pattern, flags]`; the only flag is `i`.
///
/// A pattern that fails to compile is an error, never a match-everything fallback.
pub(super) fn pattern(name: &str, args: &Value) -> Result<Regex, SpecError> {
    let (source, flags) = match args {
        Value::String(s) => (s.as_str(), None),
        Value::Array(items) => match items.as_slice() {
            [Value::String(s)] | [Value::String(s), Value::Null] => (s.as_str(), None),
            [Value::String(s), Value::String(f)] => (s.as_str(), Some(f.as_str())),
            _ => return Err(invalid(name, "expected a pattern string or [pattern, flags]")),
        },
        _ => return Err(invalid(name, "expected a pattern string or [pattern, flags]")),
    };

    let case_insensitive = match flags {
        None | Some("") => false,
        Some("i") => true,
        Some(other) => {
            return Err(invalid(
                name,
                format!("unsupported flags '{other}', only 'i' is allowed"),
            ))
        }
    };

    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|err| SpecError::InvalidPattern {
            name: name.to_string(),
            pattern: source.to_string(),
            source: err,
        })
}
