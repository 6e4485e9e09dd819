//! Field-definition checks: path syntax and every primitive in the mapping.

use super::ValidationResult;
use crate::path::FieldPath;
use crate::schema::*;
use crate::validator::{compile_primitive, SpecError};

pub(super) fn validate_definition(def: &RuleDefinition, path: &str, result: &mut ValidationResult) {
    if let Err(e) = def.field.parse::<FieldPath>() {
        result.error(format!("{path}.field"), format!("Invalid field path: {e}"));
    }

    let rule_path = format!("{path}.livr_rule.rule");
    if def.livr_rule.rule.is_empty() {
        result.warn(
            &rule_path,
            "No primitives configured; every value at this path passes",
        );
    }

    for (name, args) in &def.livr_rule.rule {
        let primitive_path = format!("{rule_path}.{name}");
        match compile_primitive(name, args) {
            Ok(_) => {}
            Err(SpecError::UnknownPrimitive {
                suggestion: Some(suggestion),
                ..
            }) => {
                result.error_with_suggestion(
                    primitive_path,
                    format!("Unknown primitive '{name}'"),
                    suggestion,
                );
            }
            Err(e) => result.error(primitive_path, e.to_string()),
        }
    }
}
