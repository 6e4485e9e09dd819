//! Compiled rules and the `(namespace, kind)` index used at admission time.
//!
//! A [`RuleSet`] is built once from a [`RulesFile`] and never mutated; the
//! [`RuleIndex`] over it is shared read-only by every request.

use std::collections::HashMap;

use crate::path::{FieldPath, PathError};
use crate::schema::{RuleConfig, RuleDefinition, RulesFile};
use crate::validator::{compile, SpecError, Validator};

/// Namespace value that applies a rule to every namespace not skipped.
pub const WILDCARD_NAMESPACE: &str = "*";

/// A rule definition that passed validation but failed to compile.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("rule '{rule}': invalid field path: {source}")]
    Path {
        rule: String,
        #[source]
        source: PathError,
    },

    #[error("rule '{rule}', field '{field}': {source}")]
    Spec {
        rule: String,
        field: String,
        #[source]
        source: SpecError,
    },
}

/// One compiled field check.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub path: FieldPath,
    pub optional: bool,
    pub description: String,
    pub validator: Validator,
}

/// A named set of field checks for one namespace (or `*`) and one kind.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub namespace: String,
    pub resource_kind: String,
    pub field_rules: Vec<FieldRule>,
    pub notification_channel: Option<String>,
}

impl Rule {
    pub fn is_wildcard(&self) -> bool {
        self.namespace == WILDCARD_NAMESPACE
    }

    fn compile(config: RuleConfig) -> Result<Self, CompileError> {
        let field_rules = config
            .rules_definitions
            .into_iter()
            .map(|def| compile_definition(&config.name, def))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name,
            namespace: config.namespace,
            resource_kind: config.resource_type,
            field_rules,
            notification_channel: config
                .slack_notification_channel
                .filter(|c| !c.trim().is_empty()),
        })
    }
}

fn compile_definition(rule: &str, def: RuleDefinition) -> Result<FieldRule, CompileError> {
    let path = FieldPath::parse(&def.field).map_err(|source| CompileError::Path {
        rule: rule.to_string(),
        source,
    })?;
    let validator = compile(&def.livr_rule).map_err(|source| CompileError::Spec {
        rule: rule.to_string(),
        field: def.field.clone(),
        source,
    })?;
    Ok(FieldRule {
        path,
        optional: def.field_is_optional,
        description: def.livr_rule.description,
        validator,
    })
}

/// Every compiled rule, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(file: RulesFile) -> Result<Self, CompileError> {
        let rules = file
            .rules
            .into_iter()
            .map(Rule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

/// Rules grouped by `"{namespace}/{kind}"`, declaration order kept per bucket.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    buckets: HashMap<String, Vec<Rule>>,
    len: usize,
}

fn bucket_key(namespace: &str, kind: &str) -> String {
    format!("{namespace}/{kind}")
}

impl RuleIndex {
    pub fn build(set: RuleSet) -> Self {
        let len = set.len();
        let mut buckets: HashMap<String, Vec<Rule>> = HashMap::new();
        for rule in set.rules {
            buckets
                .entry(bucket_key(&rule.namespace, &rule.resource_kind))
                .or_default()
                .push(rule);
        }
        Self { buckets, len }
    }

    /// Rules for `namespace` and `kind`: namespace-specific rules first, then
    /// wildcard rules. Kind matching is exact.
    pub fn lookup(&self, namespace: &str, kind: &str) -> Vec<&Rule> {
        let specific = self.buckets.get(&bucket_key(namespace, kind));
        let wildcard = if namespace == WILDCARD_NAMESPACE {
            None
        } else {
            self.buckets.get(&bucket_key(WILDCARD_NAMESPACE, kind))
        };

        specific
            .into_iter()
            .chain(wildcard)
            .flat_map(|rules| rules.iter())
            .collect()
    }

    /// Total number of indexed rules.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules_file(yaml: &str) -> RulesFile {
        serde_yaml::from_str(yaml).unwrap()
    }

    const YAML: &str = r#"
rules:
  - name: wild-pod-1
    namespace: "*"
    resource_type: Pod
  - name: platform-pod-1
    namespace: platform
    resource_type: Pod
  - name: platform-deploy
    namespace: platform
    resource_type: Deployment
  - name: wild-pod-2
    namespace: "*"
    resource_type: Pod
  - name: platform-pod-2
    namespace: platform
    resource_type: Pod
    slack_notification_channel: ""
"#;

    fn names(rules: &[&Rule]) -> Vec<String> {
        rules.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn lookup_returns_namespace_rules_then_wildcard() {
        let index = RuleIndex::build(RuleSet::compile(rules_file(YAML)).unwrap());
        assert_eq!(index.len(), 5);
        assert_eq!(
            names(&index.lookup("platform", "Pod")),
            vec!["platform-pod-1", "platform-pod-2", "wild-pod-1", "wild-pod-2"]
        );
    }

    #[test]
    fn lookup_other_namespace_gets_only_wildcard() {
        let index = RuleIndex::build(RuleSet::compile(rules_file(YAML)).unwrap());
        assert_eq!(names(&index.lookup("default", "Pod")), vec!["wild-pod-1", "wild-pod-2"]);
        assert!(index.lookup("default", "Service").is_empty());
    }

    #[test]
    fn lookup_wildcard_namespace_is_not_duplicated() {
        let index = RuleIndex::build(RuleSet::compile(rules_file(YAML)).unwrap());
        assert_eq!(names(&index.lookup("*", "Pod")), vec!["wild-pod-1", "wild-pod-2"]);
    }

    #[test]
    fn kind_matching_is_exact() {
        let index = RuleIndex::build(RuleSet::compile(rules_file(YAML)).unwrap());
        assert!(index.lookup("platform", "pod").is_empty());
    }

    #[test]
    fn empty_channel_becomes_none() {
        let set = RuleSet::compile(rules_file(YAML)).unwrap();
        assert!(set.rules()[4].notification_channel.is_none());
    }

    #[test]
    fn compile_error_names_rule_and_field() {
        let file = rules_file(
            r#"
rules:
  - name: bad
    namespace: default
    resource_type: Pod
    rules_definitions:
      - field: metadata.name
        livr_rule:
          rule:
            max_length: lots
"#,
        );
        let err = RuleSet::compile(file).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rule 'bad'"), "{msg}");
        assert!(msg.contains("metadata.name"), "{msg}");
    }
}
