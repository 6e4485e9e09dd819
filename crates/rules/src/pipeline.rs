//! The allow/deny decision for one admission request.
//!
//! [`decide`] is pure: no I/O, no shared mutable state, same output for the
//! same inputs. [`PolicyEngine`] bundles the index with the skip-namespace
//! policy so callers only pass the request.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::aggregator::evaluate;
use crate::schema::Violation;
use crate::store::RuleIndex;

/// Prefix of every denial message returned to the API server.
pub const DENIAL_PREFIX: &str =
    "We found violations in your request. The following rules were violated: \n ";

/// Verdict plus every violation found, in rule, field-rule, value order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub violations: Vec<Violation>,
}

impl Decision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            allowed: violations.is_empty(),
            violations,
        }
    }

    /// One explanation line per violation, newline-separated.
    pub fn explanation(&self) -> String {
        self.violations
            .iter()
            .map(Violation::explain)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The status message of a deny response; `None` when allowed.
    pub fn denial_message(&self) -> Option<String> {
        if self.allowed {
            None
        } else {
            Some(format!("{DENIAL_PREFIX}{}", self.explanation()))
        }
    }
}

/// Evaluate every applicable rule against `resource`.
///
/// Wildcard rules are skipped for namespaces in `skip_namespaces`;
/// namespace-specific rules always apply.
pub fn decide(
    index: &RuleIndex,
    resource: &Value,
    namespace: &str,
    kind: &str,
    skip_namespaces: &HashSet<String>,
) -> Decision {
    let skipped = skip_namespaces.contains(namespace);
    let mut violations = Vec::new();

    for rule in index.lookup(namespace, kind) {
        if rule.is_wildcard() && skipped {
            debug!(rule = %rule.name, namespace, "skipping wildcard rule for exempt namespace");
            continue;
        }
        for field_rule in &rule.field_rules {
            violations.extend(evaluate(resource, field_rule).into_iter().map(|mut v| {
                v.rule_name = rule.name.clone();
                v.notification_channel = rule.notification_channel.clone();
                v
            }));
        }
    }

    debug!(
        namespace,
        kind,
        violations = violations.len(),
        "evaluated admission request"
    );
    Decision::from_violations(violations)
}

/// A loaded rule index plus the namespaces exempt from wildcard rules.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    index: RuleIndex,
    skip_namespaces: HashSet<String>,
}

impl PolicyEngine {
    pub fn new(index: RuleIndex, skip_namespaces: impl IntoIterator<Item = String>) -> Self {
        Self {
            index,
            skip_namespaces: skip_namespaces
                .into_iter()
                .map(|ns| ns.trim().to_string())
                .filter(|ns| !ns.is_empty())
                .collect(),
        }
    }

    pub fn decide(&self, resource: &Value, namespace: &str, kind: &str) -> Decision {
        decide(&self.index, resource, namespace, kind, &self.skip_namespaces)
    }

    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    pub fn skip_namespaces(&self) -> &HashSet<String> {
        &self.skip_namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RuleLoader;
    use serde_json::json;

    const RULES: &str = r##"
rules:
  - name: forbid-authnetes
    namespace: platform
    resource_type: Pod
    slack_notification_channel: "#platform"
    rules_definitions:
      - field: spec.containers.#.name
        livr_rule:
          description: Container name must not be authnetes
          rule:
            not-equal: authnetes
  - name: team-label
    namespace: "*"
    resource_type: Pod
    rules_definitions:
      - field: metadata.labels.team
        livr_rule:
          description: Every pod needs a team label
          rule:
            required: ~
"##;

    fn engine(skip: &[&str]) -> PolicyEngine {
        let set = RuleLoader::from_yaml_str(RULES).unwrap();
        PolicyEngine::new(
            RuleIndex::build(set),
            skip.iter().map(|s| s.to_string()),
        )
    }

    fn pod(name: &str, team: Option<&str>) -> Value {
        let mut pod = json!({
            "metadata": {"name": "web", "labels": {}},
            "spec": {"containers": [{"name": name, "image": "nginx"}]}
        });
        if let Some(team) = team {
            pod["metadata"]["labels"]["team"] = json!(team);
        }
        pod
    }

    #[test]
    fn compliant_resource_is_allowed() {
        let decision = engine(&[]).decide(&pod("web", Some("core")), "platform", "Pod");
        assert!(decision.allowed);
        assert!(decision.violations.is_empty());
        assert!(decision.denial_message().is_none());
    }

    #[test]
    fn violations_are_ordered_and_stamped() {
        let decision = engine(&[]).decide(&pod("authnetes", None), "platform", "Pod");
        assert!(!decision.allowed);
        assert_eq!(decision.violations.len(), 2);

        let first = &decision.violations[0];
        assert_eq!(first.rule_name, "forbid-authnetes");
        assert_eq!(first.message, "NOT_ALLOWED_VALUE");
        assert_eq!(first.notification_channel.as_deref(), Some("#platform"));

        let second = &decision.violations[1];
        assert_eq!(second.rule_name, "team-label");
        assert_eq!(second.message, "Field: metadata.labels.team is required");
        assert!(second.notification_channel.is_none());
    }

    #[test]
    fn denial_message_lists_every_violation() {
        let decision = engine(&[]).decide(&pod("authnetes", None), "platform", "Pod");
        let message = decision.denial_message().unwrap();
        assert!(message.starts_with(DENIAL_PREFIX));
        assert_eq!(
            message,
            format!(
                "{DENIAL_PREFIX}\trule name: 'forbid-authnetes', field: 'spec.containers.#.name', \
                 description: 'Container name must not be authnetes', message: NOT_ALLOWED_VALUE\n\
                 \trule name: 'team-label', field: 'metadata.labels.team', \
                 description: 'Every pod needs a team label', message: Field: metadata.labels.team is required"
            )
        );
    }

    #[test]
    fn skip_namespaces_only_suppresses_wildcard_rules() {
        let decision = engine(&["platform"]).decide(&pod("authnetes", None), "platform", "Pod");
        assert_eq!(decision.violations.len(), 1);
        assert_eq!(decision.violations[0].rule_name, "forbid-authnetes");

        let decision = engine(&["kube-system"]).decide(&pod("web", None), "kube-system", "Pod");
        assert!(decision.allowed);
    }

    #[test]
    fn other_kinds_are_allowed() {
        let decision = engine(&[]).decide(&json!({}), "platform", "Deployment");
        assert!(decision.allowed);
    }

    #[test]
    fn decide_is_deterministic() {
        let engine = engine(&[]);
        let resource = pod("authnetes", None);
        let first = engine.decide(&resource, "platform", "Pod");
        let second = engine.decide(&resource, "platform", "Pod");
        assert_eq!(first, second);
    }

    #[test]
    fn skip_list_entries_are_trimmed() {
        let engine = engine(&[" kube-system ", ""]);
        assert_eq!(engine.skip_namespaces().len(), 1);
        assert!(engine.skip_namespaces().contains("kube-system"));
    }
}
