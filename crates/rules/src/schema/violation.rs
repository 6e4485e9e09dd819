//! Structured record of one failed check.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One failed validation against one resource.
///
/// Self-describing: carries copies of everything needed to render or
/// forward it, so it can outlive the rule that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub rule_name: String,
    pub description: String,
    /// The configured field path (not a per-element path).
    #[serde(rename = "json_path")]
    pub path: String,
    /// `{last_path_segment: offending_value}`; empty when the field is missing.
    #[serde(default)]
    pub object: Map<String, Value>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_channel: Option<String>,
}

impl Violation {
    /// Render as one explanation line, as shown in an admission denial.
    pub fn explain(&self) -> String {
        format!(
            "\trule name: '{}', field: '{}', description: '{}', message: {}",
            self.rule_name, self.path, self.description, self.message
        )
    }
}
