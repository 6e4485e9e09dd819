//! Built-in primitives: a typed subset of the LIVR rule catalog.
//!
//! Names and error codes follow LIVR. Every primitive except `required`,
//! `not_empty` and `not_empty_list` lets `null` and `""` through untouched.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use url::{Host, Url};

use super::args;
use super::value::{canonical_text, is_empty, numeric};
use super::{ErrorCode, Primitive, SpecError};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_+\-]+(\.[a-z0-9_+\-]+)*@([a-z0-9\-]+\.)+[a-z]{2,}$").unwrap()
});

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// An absolute http(s) URL with a host and no empty domain labels.
fn is_web_url(text: &str) -> bool {
    let Ok(parsed) = Url::parse(text) else {
        return false;
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    match parsed.host() {
        Some(Host::Domain(domain)) => domain.split('.').all(|label| !label.is_empty()),
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => true,
        None => false,
    }
}

/// A built-in primitive with its decoded arguments.
#[derive(Debug, Clone)]
pub enum Builtin {
    Required,
    NotEmpty,
    NotEmptyList,
    AnyObject,
    String,
    Integer,
    PositiveInteger,
    Decimal,
    PositiveDecimal,
    Email,
    Url,
    IsoDate,
    Trim,
    ToLc,
    ToUc,
    Eq(String),
    OneOf(Vec<String>),
    MaxLength(usize),
    MinLength(usize),
    LengthEqual(usize),
    LengthBetween { min: usize, max: usize },
    Like(Regex),
    MinNumber(f64),
    MaxNumber(f64),
    NumberBetween { min: f64, max: f64 },
}

impl Builtin {
    pub fn apply(&self, value: Value) -> Result<Value, ErrorCode> {
        match self {
            Builtin::Required => {
                if is_empty(&value) {
                    Err(ErrorCode::Required)
                } else {
                    Ok(value)
                }
            }
            Builtin::NotEmpty => match &value {
                Value::String(s) if s.is_empty() => Err(ErrorCode::CannotBeEmpty),
                _ => Ok(value),
            },
            Builtin::NotEmptyList => match &value {
                Value::Array(items) if items.is_empty() => Err(ErrorCode::CannotBeEmpty),
                Value::Array(_) => Ok(value),
                v if is_empty(v) => Err(ErrorCode::CannotBeEmpty),
                _ => Err(ErrorCode::FormatError),
            },
            _ if is_empty(&value) => Ok(value),
            other => other.apply_present(value),
        }
    }

    fn apply_present(&self, value: Value) -> Result<Value, ErrorCode> {
        match self {
            Builtin::AnyObject => match value {
                Value::Object(_) => Ok(value),
                _ => Err(ErrorCode::FormatError),
            },
            Builtin::String => match value {
                Value::String(_) => Ok(value),
                ref scalar @ (Value::Number(_) | Value::Bool(_)) => {
                    Ok(Value::String(canonical_text(scalar).unwrap_or_default()))
                }
                _ => Err(ErrorCode::FormatError),
            },
            Builtin::Integer => {
                match number_of(&value)? {
                    Some(n) if n.fract() == 0.0 => Ok(value),
                    _ => Err(ErrorCode::NotInteger),
                }
            }
            Builtin::PositiveInteger => match number_of(&value)? {
                Some(n) if n.fract() == 0.0 && n > 0.0 => Ok(value),
                _ => Err(ErrorCode::NotPositiveInteger),
            },
            Builtin::Decimal => match number_of(&value)? {
                Some(_) => Ok(value),
                None => Err(ErrorCode::NotDecimal),
            },
            Builtin::PositiveDecimal => match number_of(&value)? {
                Some(n) if n > 0.0 => Ok(value),
                _ => Err(ErrorCode::NotPositiveDecimal),
            },
            Builtin::Email => check_text(value, |t| EMAIL_RE.is_match(t) && !t.contains(".."), ErrorCode::WrongEmail),
            Builtin::Url => check_text(value, is_web_url, ErrorCode::WrongUrl),
            Builtin::IsoDate => check_text(
                value,
                |t| ISO_DATE_RE.is_match(t) && NaiveDate::parse_from_str(t, "%Y-%m-%d").is_ok(),
                ErrorCode::WrongDate,
            ),
            Builtin::Trim => Ok(map_string(value, |s| s.trim().to_string())),
            Builtin::ToLc => Ok(map_string(value, |s| s.to_lowercase())),
            Builtin::ToUc => Ok(map_string(value, |s| s.to_uppercase())),
            Builtin::Eq(allowed) => check_text(value, |t| t == allowed, ErrorCode::NotAllowedValue),
            Builtin::OneOf(allowed) => check_text(
                value,
                |t| allowed.iter().any(|a| a == t),
                ErrorCode::NotAllowedValue,
            ),
            Builtin::MaxLength(max) => {
                check_text(value, |t| t.chars().count() <= *max, ErrorCode::TooLong)
            }
            Builtin::MinLength(min) => {
                check_text(value, |t| t.chars().count() >= *min, ErrorCode::TooShort)
            }
            Builtin::LengthEqual(len) => check_length(value, *len, *len),
            Builtin::LengthBetween { min, max } => check_length(value, *min, *max),
            Builtin::Like(re) => check_text(value, |t| re.is_match(t), ErrorCode::WrongFormat),
            Builtin::MinNumber(min) => check_number(value, *min, f64::INFINITY),
            Builtin::MaxNumber(max) => check_number(value, f64::NEG_INFINITY, *max),
            Builtin::NumberBetween { min, max } => check_number(value, *min, *max),
            // Handled before any emptiness short-circuit in `apply`.
            Builtin::Required | Builtin::NotEmpty | Builtin::NotEmptyList => Ok(value),
        }
    }
}

/// Numeric reading of a scalar; objects and arrays are a format error.
fn number_of(value: &Value) -> Result<Option<f64>, ErrorCode> {
    match value {
        Value::Object(_) | Value::Array(_) => Err(ErrorCode::FormatError),
        other => Ok(numeric(other)),
    }
}

fn check_text(
    value: Value,
    accept: impl Fn(&str) -> bool,
    code: ErrorCode,
) -> Result<Value, ErrorCode> {
    let text = canonical_text(&value).ok_or(ErrorCode::FormatError)?;
    if accept(&text) {
        Ok(value)
    } else {
        Err(code)
    }
}

fn check_length(value: Value, min: usize, max: usize) -> Result<Value, ErrorCode> {
    let text = canonical_text(&value).ok_or(ErrorCode::FormatError)?;
    let len = text.chars().count();
    if len < min {
        Err(ErrorCode::TooShort)
    } else if len > max {
        Err(ErrorCode::TooLong)
    } else {
        Ok(value)
    }
}

fn check_number(value: Value, min: f64, max: f64) -> Result<Value, ErrorCode> {
    let n = number_of(&value)?.ok_or(ErrorCode::NotNumber)?;
    if n < min {
        Err(ErrorCode::TooLow)
    } else if n > max {
        Err(ErrorCode::TooHigh)
    } else {
        Ok(value)
    }
}

fn map_string(value: Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}

// ── Constructors ────────────────────────────────────────────────────

macro_rules! nullary {
    ($($fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            pub(super) fn $fn_name(name: &str, a: &Value) -> Result<Primitive, SpecError> {
                args::none(name, a)?;
                Ok(Primitive::Builtin(Builtin::$variant))
            }
        )*
    };
}

nullary! {
    required => Required,
    not_empty => NotEmpty,
    not_empty_list => NotEmptyList,
    any_object => AnyObject,
    string => String,
    integer => Integer,
    positive_integer => PositiveInteger,
    decimal => Decimal,
    positive_decimal => PositiveDecimal,
    email => Email,
    url => Url,
    iso_date => IsoDate,
    trim => Trim,
    to_lc => ToLc,
    to_uc => ToUc,
}

pub(super) fn eq(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::Eq(args::scalar(name, a)?)))
}

pub(super) fn one_of(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::OneOf(args::scalar_list(name, a)?)))
}

pub(super) fn max_length(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::MaxLength(args::length(name, a)?)))
}

pub(super) fn min_length(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::MinLength(args::length(name, a)?)))
}

pub(super) fn length_equal(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::LengthEqual(args::length(name, a)?)))
}

pub(super) fn length_between(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    let (min, max) = args::length_range(name, a)?;
    Ok(Primitive::Builtin(Builtin::LengthBetween { min, max }))
}

pub(super) fn like(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::Like(args::pattern(name, a)?)))
}

pub(super) fn min_number(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::MinNumber(args::number(name, a)?)))
}

pub(super) fn max_number(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    Ok(Primitive::Builtin(Builtin::MaxNumber(args::number(name, a)?)))
}

pub(super) fn number_between(name: &str, a: &Value) -> Result<Primitive, SpecError> {
    let (min, max) = args::number_range(name, a)?;
    Ok(Primitive::Builtin(Builtin::NumberBetween { min, max }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builtin(ctor: fn(&str, &Value) -> Result<Primitive, SpecError>, a: Value) -> Builtin {
        match ctor("test", &a).unwrap() {
            Primitive::Builtin(b) => b,
            other => panic!("expected builtin, got {other:?}"),
        }
    }

    #[test]
    fn required_rejects_null_and_empty_string() {
        let b = builtin(required, Value::Null);
        assert_eq!(b.apply(Value::Null), Err(ErrorCode::Required));
        assert_eq!(b.apply(json!("")), Err(ErrorCode::Required));
        assert_eq!(b.apply(json!(0)), Ok(json!(0)));
    }

    #[test]
    fn not_empty_only_rejects_empty_string() {
        let b = builtin(not_empty, Value::Null);
        assert_eq!(b.apply(json!("")), Err(ErrorCode::CannotBeEmpty));
        assert_eq!(b.apply(Value::Null), Ok(Value::Null));
    }

    #[test]
    fn not_empty_list_rejects_empty() {
        let b = builtin(not_empty_list, Value::Null);
        assert_eq!(b.apply(json!([])), Err(ErrorCode::CannotBeEmpty));
        assert_eq!(b.apply(Value::Null), Err(ErrorCode::CannotBeEmpty));
        assert_eq!(b.apply(json!("x")), Err(ErrorCode::FormatError));
        assert_eq!(b.apply(json!([1])), Ok(json!([1])));
    }

    #[test]
    fn empty_values_pass_other_primitives() {
        let b = builtin(eq, json!("x"));
        assert_eq!(b.apply(Value::Null), Ok(Value::Null));
        assert_eq!(b.apply(json!("")), Ok(json!("")));
        let b = builtin(integer, Value::Null);
        assert_eq!(b.apply(Value::Null), Ok(Value::Null));
    }

    #[test]
    fn string_normalizes_scalars() {
        let b = builtin(string, Value::Null);
        assert_eq!(b.apply(json!(8000)), Ok(json!("8000")));
        assert_eq!(b.apply(json!({"a": 1})), Err(ErrorCode::FormatError));
    }

    #[test]
    fn integers_and_decimals() {
        let int = builtin(integer, Value::Null);
        assert_eq!(int.apply(json!(3)), Ok(json!(3)));
        assert_eq!(int.apply(json!("3")), Ok(json!("3")));
        assert_eq!(int.apply(json!(3.5)), Err(ErrorCode::NotInteger));
        assert_eq!(int.apply(json!("abc")), Err(ErrorCode::NotInteger));
        assert_eq!(int.apply(json!([3])), Err(ErrorCode::FormatError));

        let pos = builtin(positive_integer, Value::Null);
        assert_eq!(pos.apply(json!(0)), Err(ErrorCode::NotPositiveInteger));
        assert_eq!(pos.apply(json!(2)), Ok(json!(2)));

        let dec = builtin(decimal, Value::Null);
        assert_eq!(dec.apply(json!(1.5)), Ok(json!(1.5)));
        assert_eq!(dec.apply(json!("x")), Err(ErrorCode::NotDecimal));

        let pos_dec = builtin(positive_decimal, Value::Null);
        assert_eq!(pos_dec.apply(json!(-0.5)), Err(ErrorCode::NotPositiveDecimal));
    }

    #[test]
    fn eq_and_one_of_compare_text() {
        let b = builtin(eq, json!("Always"));
        assert_eq!(b.apply(json!("Always")), Ok(json!("Always")));
        assert_eq!(b.apply(json!("Never")), Err(ErrorCode::NotAllowedValue));
        assert_eq!(b.apply(json!({})), Err(ErrorCode::FormatError));

        let b = builtin(one_of, json!(["TCP", "UDP"]));
        assert_eq!(b.apply(json!("UDP")), Ok(json!("UDP")));
        assert_eq!(b.apply(json!("SCTP")), Err(ErrorCode::NotAllowedValue));
    }

    #[test]
    fn lengths() {
        let max = builtin(max_length, json!(3));
        assert_eq!(max.apply(json!("abcd")), Err(ErrorCode::TooLong));
        assert_eq!(max.apply(json!("abc")), Ok(json!("abc")));

        let min = builtin(min_length, json!([2]));
        assert_eq!(min.apply(json!("a")), Err(ErrorCode::TooShort));

        let eq_len = builtin(length_equal, json!(2));
        assert_eq!(eq_len.apply(json!("a")), Err(ErrorCode::TooShort));
        assert_eq!(eq_len.apply(json!("abc")), Err(ErrorCode::TooLong));

        let between = builtin(length_between, json!([1, 2]));
        assert_eq!(between.apply(json!(123)), Err(ErrorCode::TooLong));
    }

    #[test]
    fn like_requires_match() {
        let b = builtin(like, json!(["^v\\d+", "i"]));
        assert_eq!(b.apply(json!("V2")), Ok(json!("V2")));
        assert_eq!(b.apply(json!("latest")), Err(ErrorCode::WrongFormat));
    }

    #[test]
    fn number_bounds() {
        let min = builtin(min_number, json!(1));
        assert_eq!(min.apply(json!(0)), Err(ErrorCode::TooLow));
        assert_eq!(min.apply(json!("abc")), Err(ErrorCode::NotNumber));

        let max = builtin(max_number, json!(10));
        assert_eq!(max.apply(json!(11)), Err(ErrorCode::TooHigh));

        let between = builtin(number_between, json!([1, 3]));
        assert_eq!(between.apply(json!(2)), Ok(json!(2)));
        assert_eq!(between.apply(json!(4)), Err(ErrorCode::TooHigh));
    }

    #[test]
    fn formats() {
        let e = builtin(email, Value::Null);
        assert!(e.apply(json!("ops@example.com")).is_ok());
        assert_eq!(e.apply(json!("ops@@example")), Err(ErrorCode::WrongEmail));

        let u = builtin(url, Value::Null);
        assert!(u.apply(json!("https://example.com/path")).is_ok());
        assert!(u.apply(json!("http://10.0.0.1:8080/healthz?x=1")).is_ok());
        assert!(u.apply(json!("https://[::1]/")).is_ok());
        assert_eq!(u.apply(json!("ftp://example.com")), Err(ErrorCode::WrongUrl));
        assert_eq!(u.apply(json!("example.com/path")), Err(ErrorCode::WrongUrl));
        for bad in ["http://[::1", "http://host:99999999/x", "http://exa%zzmple.com", "https://a..b"] {
            assert_eq!(u.apply(json!(bad)), Err(ErrorCode::WrongUrl), "{bad}");
        }

        let d = builtin(iso_date, Value::Null);
        assert!(d.apply(json!("2019-06-18")).is_ok());
        assert_eq!(d.apply(json!("2019-02-30")), Err(ErrorCode::WrongDate));
        assert_eq!(d.apply(json!("2019-6-18")), Err(ErrorCode::WrongDate));
    }

    #[test]
    fn modifiers_normalize_strings() {
        assert_eq!(builtin(trim, Value::Null).apply(json!("  x ")), Ok(json!("x")));
        assert_eq!(builtin(to_lc, Value::Null).apply(json!("TCP")), Ok(json!("tcp")));
        assert_eq!(builtin(to_uc, Value::Null).apply(json!("tcp")), Ok(json!("TCP")));
        assert_eq!(builtin(trim, Value::Null).apply(json!(5)), Ok(json!(5)));
    }

    #[test]
    fn nullary_rejects_arguments() {
        assert!(required("required", &json!("yes")).is_err());
    }
}
