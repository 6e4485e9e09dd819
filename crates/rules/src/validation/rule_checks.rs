//! Rule-level checks: identity fields, duplicates, namespace and kind shape.

use std::collections::HashMap;

use super::fuzzy::{fuzzy_match, is_kebab_case};
use super::ValidationResult;
use crate::schema::*;
use crate::store::WILDCARD_NAMESPACE;

/// Built-in kinds most admission rules target. Anything else is allowed
/// (custom resources), but a near miss gets a hint.
const COMMON_KINDS: &[&str] = &[
    "Pod",
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "CronJob",
    "Service",
    "Ingress",
    "ConfigMap",
    "Secret",
    "Namespace",
    "ServiceAccount",
    "PersistentVolumeClaim",
    "Role",
    "RoleBinding",
    "ClusterRole",
    "ClusterRoleBinding",
    "NetworkPolicy",
    "HorizontalPodAutoscaler",
];

const MAX_NAMESPACE_LEN: usize = 63;

pub(super) fn validate_unique_names(file: &RulesFile, result: &mut ValidationResult) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, rule) in file.rules.iter().enumerate() {
        if rule.name.is_empty() {
            continue;
        }
        if let Some(first) = seen.get(rule.name.as_str()) {
            result.warn(
                format!("rules[{i}].name"),
                format!(
                    "Rule name '{}' is already used by rules[{first}]; violations will be indistinguishable",
                    rule.name
                ),
            );
        } else {
            seen.insert(&rule.name, i);
        }
    }
}

pub(super) fn validate_rule(rule: &RuleConfig, path: &str, result: &mut ValidationResult) {
    if rule.name.trim().is_empty() {
        result.error(format!("{path}.name"), "Rule name must not be empty");
    } else if !is_kebab_case(&rule.name) {
        result.warn(
            format!("{path}.name"),
            format!("Rule name '{}' is not kebab-case", rule.name),
        );
    }

    validate_namespace(&rule.namespace, &format!("{path}.namespace"), result);
    validate_kind(&rule.resource_type, &format!("{path}.resource_type"), result);

    if let Some(channel) = &rule.slack_notification_channel {
        if channel.trim().is_empty() {
            result.warn(
                format!("{path}.slack_notification_channel"),
                "Empty notification channel; no notification will be sent",
            );
        }
    }

    if rule.rules_definitions.is_empty() {
        result.warn(
            format!("{path}.rules_definitions"),
            "Rule has no definitions and will never produce a violation",
        );
    }
}

fn validate_namespace(namespace: &str, path: &str, result: &mut ValidationResult) {
    if namespace.is_empty() {
        result.error(path, format!("Namespace must not be empty; use '{WILDCARD_NAMESPACE}' for all namespaces"));
        return;
    }
    if namespace == WILDCARD_NAMESPACE {
        return;
    }
    if !is_kebab_case(namespace) || namespace.len() > MAX_NAMESPACE_LEN {
        result.warn(
            path,
            format!("'{namespace}' is not a valid namespace name; this rule will never match"),
        );
    }
}

fn validate_kind(kind: &str, path: &str, result: &mut ValidationResult) {
    if kind.trim().is_empty() {
        result.error(path, "Resource type must not be empty");
        return;
    }
    if COMMON_KINDS.contains(&kind) {
        return;
    }
    if let Some(suggestion) = fuzzy_match(kind, COMMON_KINDS) {
        result.warn(
            path,
            format!("Unfamiliar resource type '{kind}'. Did you mean '{suggestion}'?"),
        );
    }
}
