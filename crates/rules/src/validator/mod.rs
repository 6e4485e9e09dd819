//! Validation primitives compiled from a rule's `primitive -> args` mapping.
//!
//! A [`Validator`] is built once at load time and then only read. Each step
//! either passes a (possibly normalized) value on to the next step or stops
//! with an [`ErrorCode`].

mod args;
mod builtin;
mod custom;
mod registry;
pub mod value;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::schema::ValidationSpec;
use crate::validation::fuzzy::fuzzy_match;

pub use builtin::Builtin;
pub use custom::{NotEqual, NotMatchingPattern};

// ── Error codes ─────────────────────────────────────────────────────

/// Machine-readable reason a value failed a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Required,
    CannotBeEmpty,
    FormatError,
    NotAllowedValue,
    WrongFormat,
    TooLong,
    TooShort,
    NotInteger,
    NotPositiveInteger,
    NotDecimal,
    NotPositiveDecimal,
    NotNumber,
    TooHigh,
    TooLow,
    WrongEmail,
    WrongUrl,
    WrongDate,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "REQUIRED",
            ErrorCode::CannotBeEmpty => "CANNOT_BE_EMPTY",
            ErrorCode::FormatError => "FORMAT_ERROR",
            ErrorCode::NotAllowedValue => "NOT_ALLOWED_VALUE",
            ErrorCode::WrongFormat => "WRONG_FORMAT",
            ErrorCode::TooLong => "TOO_LONG",
            ErrorCode::TooShort => "TOO_SHORT",
            ErrorCode::NotInteger => "NOT_INTEGER",
            ErrorCode::NotPositiveInteger => "NOT_POSITIVE_INTEGER",
            ErrorCode::NotDecimal => "NOT_DECIMAL",
            ErrorCode::NotPositiveDecimal => "NOT_POSITIVE_DECIMAL",
            ErrorCode::NotNumber => "NOT_NUMBER",
            ErrorCode::TooHigh => "TOO_HIGH",
            ErrorCode::TooLow => "TOO_LOW",
            ErrorCode::WrongEmail => "WRONG_EMAIL",
            ErrorCode::WrongUrl => "WRONG_URL",
            ErrorCode::WrongDate => "WRONG_DATE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A value at `field` failed one primitive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{code}")]
pub struct ValidationError {
    pub field: String,
    pub code: ErrorCode,
}

/// A `primitive -> args` mapping that cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("unknown primitive '{name}'{}", suggestion_hint(.suggestion))]
    UnknownPrimitive {
        name: String,
        suggestion: Option<String>,
    },

    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArgs { name: String, reason: String },

    #[error("invalid pattern '{pattern}' for '{name}': {source}")]
    InvalidPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean '{s}'?)"),
        None => String::new(),
    }
}

// ── Primitives ──────────────────────────────────────────────────────

/// One compiled primitive with its decoded arguments.
#[derive(Debug, Clone)]
pub enum Primitive {
    Builtin(Builtin),
    NotEqual(NotEqual),
    NotMatchingPattern(NotMatchingPattern),
}

impl Primitive {
    /// Check `value`, returning it (possibly normalized) or the failure code.
    pub fn apply(&self, value: Value) -> Result<Value, ErrorCode> {
        match self {
            Primitive::Builtin(b) => b.apply(value),
            Primitive::NotEqual(p) => p.apply(value),
            Primitive::NotMatchingPattern(p) => p.apply(value),
        }
    }
}

#[derive(Debug, Clone)]
struct Step {
    name: String,
    primitive: Primitive,
}

/// An ordered chain of primitives.
///
/// An empty chain accepts every value.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    steps: Vec<Step>,
}

impl Validator {
    /// Run every step in declaration order, feeding each normalized value
    /// to the next. Stops at the first failure.
    pub fn apply(&self, field: &str, value: &Value) -> Result<Value, ValidationError> {
        let mut current = value.clone();
        for step in &self.steps {
            current = step.primitive.apply(current).map_err(|code| ValidationError {
                field: field.to_string(),
                code,
            })?;
        }
        Ok(current)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Primitive names, in the order they run.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.name.as_str())
    }
}

// ── Compilation ─────────────────────────────────────────────────────

/// Compile one primitive by name.
pub fn compile_primitive(name: &str, args: &Value) -> Result<Primitive, SpecError> {
    match registry::lookup(name) {
        Some(constructor) => constructor(name, args),
        None => {
            let known = registry::known_names();
            Err(SpecError::UnknownPrimitive {
                name: name.to_string(),
                suggestion: fuzzy_match(name, &known).map(str::to_string),
            })
        }
    }
}

/// Compile a whole mapping, keeping declaration order.
pub fn compile(spec: &ValidationSpec) -> Result<Validator, SpecError> {
    let steps = spec
        .rule
        .iter()
        .map(|(name, args)| {
            Ok(Step {
                name: name.clone(),
                primitive: compile_primitive(name, args)?,
            })
        })
        .collect::<Result<Vec<_>, SpecError>>()?;
    Ok(Validator { steps })
}
