//! Name -> constructor table for every primitive a rule file may use.

use serde_json::Value;

use super::{builtin, custom, Primitive, SpecError};

type Constructor = fn(&str, &Value) -> Result<Primitive, SpecError>;

const REGISTRY: &[(&str, Constructor)] = &[
    // Custom primitives, with their underscore aliases.
    ("not-equal", custom::not_equal),
    ("neq", custom::not_equal),
    ("not-matching-pattern", custom::not_matching_pattern),
    ("not_like", custom::not_matching_pattern),
    // Common
    ("required", builtin::required),
    ("not_empty", builtin::not_empty),
    ("not_empty_list", builtin::not_empty_list),
    ("any_object", builtin::any_object),
    // String
    ("string", builtin::string),
    ("eq", builtin::eq),
    ("one_of", builtin::one_of),
    ("max_length", builtin::max_length),
    ("min_length", builtin::min_length),
    ("length_equal", builtin::length_equal),
    ("length_between", builtin::length_between),
    ("like", builtin::like),
    // Numeric
    ("integer", builtin::integer),
    ("positive_integer", builtin::positive_integer),
    ("decimal", builtin::decimal),
    ("positive_decimal", builtin::positive_decimal),
    ("min_number", builtin::min_number),
    ("max_number", builtin::max_number),
    ("number_between", builtin::number_between),
    // Special
    ("email", builtin::email),
    ("url", builtin::url),
    ("iso_date", builtin::iso_date),
    // Modifiers
    ("trim", builtin::trim),
    ("to_lc", builtin::to_lc),
    ("to_uc", builtin::to_uc),
];

pub(super) fn lookup(name: &str) -> Option<Constructor> {
    REGISTRY
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, constructor)| *constructor)
}

pub(super) fn known_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(name, _)| *name).collect()
}
