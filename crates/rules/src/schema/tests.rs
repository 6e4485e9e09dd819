//! Tests for schema types.

use super::*;

const PLATFORM_RULES_YAML: &str = r##"
rules:
  - name: forbid-authnetes
    namespace: platform
    resource_type: Pod
    slack_notification_channel: "#platform-alerts"
    rules_definitions:
      - field: spec.containers.#.name
        field_is_optional: false
        livr_rule:
          description: Container name must not be authnetes
          rule:
            required: ~
            not-equal: authnetes
      - field: spec.containers.#.image
        livr_rule:
          description: Images must not use the latest tag
          rule:
            not-matching-pattern: [":latest$", "i"]
  - name: labels-everywhere
    namespace: "*"
    resource_type: Deployment
    rules_definitions: []
"##;

#[test]
fn parse_rules_file() {
    let file: RulesFile = serde_yaml::from_str(PLATFORM_RULES_YAML).unwrap();
    assert_eq!(file.rules.len(), 2);

    let rule = &file.rules[0];
    assert_eq!(rule.name, "forbid-authnetes");
    assert_eq!(rule.namespace, "platform");
    assert_eq!(rule.resource_type, "Pod");
    assert_eq!(rule.slack_notification_channel.as_deref(), Some("#platform-alerts"));
    assert_eq!(rule.rules_definitions.len(), 2);

    let def = &rule.rules_definitions[0];
    assert_eq!(def.field, "spec.containers.#.name");
    assert!(!def.field_is_optional);
    assert_eq!(def.livr_rule.description, "Container name must not be authnetes");
    assert_eq!(def.livr_rule.rule.len(), 2);

    assert_eq!(file.rules[1].namespace, "*");
    assert!(file.rules[1].slack_notification_channel.is_none());
}

#[test]
fn primitive_order_is_preserved() {
    let file: RulesFile = serde_yaml::from_str(PLATFORM_RULES_YAML).unwrap();
    let names: Vec<&str> = file.rules[0].rules_definitions[0]
        .livr_rule
        .rule
        .keys()
        .map(|k| k.as_str())
        .collect();
    assert_eq!(names, vec!["required", "not-equal"]);
}

#[test]
fn field_is_optional_defaults_to_false() {
    let file: RulesFile = serde_yaml::from_str(PLATFORM_RULES_YAML).unwrap();
    assert!(!file.rules[0].rules_definitions[1].field_is_optional);
}

#[test]
fn pattern_args_decode_as_list() {
    let file: RulesFile = serde_yaml::from_str(PLATFORM_RULES_YAML).unwrap();
    let args = &file.rules[0].rules_definitions[1].livr_rule.rule["not-matching-pattern"];
    assert_eq!(args, &serde_json::json!([":latest$", "i"]));
}

#[test]
fn unknown_rule_key_is_rejected() {
    let yaml = r#"
rules:
  - name: typo
    namespace: default
    resource_type: Pod
    rule_definitions: []
"#;
    assert!(serde_yaml::from_str::<RulesFile>(yaml).is_err());
}

#[test]
fn missing_livr_rule_is_rejected() {
    let yaml = r#"
rules:
  - name: incomplete
    namespace: default
    resource_type: Pod
    rules_definitions:
      - field: metadata.name
"#;
    assert!(serde_yaml::from_str::<RulesFile>(yaml).is_err());
}

#[test]
fn violation_serializes_path_as_json_path() {
    let violation = Violation {
        rule_name: "r".to_string(),
        description: "d".to_string(),
        path: "metadata.name".to_string(),
        object: serde_json::Map::new(),
        message: "Field: metadata.name is required".to_string(),
        notification_channel: None,
    };
    let json = serde_json::to_value(&violation).unwrap();
    assert_eq!(json["json_path"], "metadata.name");
    assert!(json.get("notification_channel").is_none());
}

#[test]
fn violation_explain_line() {
    let violation = Violation {
        rule_name: "forbid-authnetes".to_string(),
        description: "Container name must not be authnetes".to_string(),
        path: "spec.containers.#.name".to_string(),
        object: serde_json::Map::new(),
        message: "NOT_ALLOWED_VALUE".to_string(),
        notification_channel: None,
    };
    assert_eq!(
        violation.explain(),
        "\trule name: 'forbid-authnetes', field: 'spec.containers.#.name', \
         description: 'Container name must not be authnetes', message: NOT_ALLOWED_VALUE"
    );
}
