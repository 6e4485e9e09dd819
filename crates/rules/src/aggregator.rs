//! Per-field violation aggregation.
//!
//! One [`FieldRule`] applied to one resource yields zero or more violations:
//! at most one "required" violation when nothing resolves, otherwise one per
//! resolved value that fails the validator.

use serde_json::{Map, Value};

use crate::path::resolve;
use crate::schema::Violation;
use crate::store::FieldRule;

/// Evaluate one field rule against a resource.
///
/// The returned violations carry description, path, object and message;
/// rule name and notification channel are stamped on by the caller.
pub fn evaluate(resource: &Value, field_rule: &FieldRule) -> Vec<Violation> {
    let path = field_rule.path.as_str();
    let values = resolve(resource, &field_rule.path);

    let missing = match values.as_slice() {
        [] => true,
        [only] => matches!(only.as_ref(), Value::Array(items) if items.is_empty()),
        _ => false,
    };
    if missing && !field_rule.optional {
        return vec![violation(
            field_rule,
            Map::new(),
            format!("Field: {path} is required"),
        )];
    }

    let key = field_rule.path.last_segment();
    values
        .into_iter()
        .filter_map(|value| {
            let err = field_rule.validator.apply(key, &value).err()?;
            let mut object = Map::new();
            object.insert(key.to_string(), value.into_owned());
            Some(violation(field_rule, object, err.to_string()))
        })
        .collect()
}

fn violation(field_rule: &FieldRule, object: Map<String, Value>, message: String) -> Violation {
    Violation {
        rule_name: String::new(),
        description: field_rule.description.clone(),
        path: field_rule.path.as_str().to_string(),
        object,
        message,
        notification_channel: None,
    }
}
