//! Raw rule configuration types deserialized from YAML.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level rules document.
///
/// ```yaml
/// rules:
///   - name: forbid-authnetes
///     namespace: platform
///     resource_type: Pod
///     rules_definitions: [...]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// A named rule applied to one resource kind in one namespace (or `*`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    pub name: String,
    /// Literal namespace, or `*` for every namespace not exempted.
    pub namespace: String,
    /// Resource kind, e.g. `Pod` or `Deployment`.
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack_notification_channel: Option<String>,
    #[serde(default)]
    pub rules_definitions: Vec<RuleDefinition>,
}

/// One field check: a dotted path plus the validation applied to every value it resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    /// Dotted path; `#` expands every element of an array.
    pub field: String,
    #[serde(default)]
    pub field_is_optional: bool,
    pub livr_rule: ValidationSpec,
}

/// Description plus the primitives to run, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ValidationSpec {
    #[serde(default)]
    pub description: String,
    pub rule: IndexMap<String, serde_json::Value>,
}
