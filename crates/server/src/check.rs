//! `aegir check`: offline rule validation and evaluation.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;

use aegir_core::config::split_list;
use aegir_core::Config;
use aegir_rules::loader::RuleLoader;
use aegir_rules::validation::{validate_rules_file, ValidationResult};
use aegir_rules::{Decision, PolicyEngine, RuleIndex, RuleSet};

use crate::cli::CheckArgs;

/// Returns `Ok(false)` when the rules are invalid or the resource is denied.
pub fn run(args: &CheckArgs, config: &Config) -> anyhow::Result<bool> {
    let raw = RuleLoader::new(&args.rules_file)
        .load_raw()
        .with_context(|| format!("failed to read rules from {}", args.rules_file.display()))?;

    let result = validate_rules_file(&raw);
    print_validation(&result);
    if !result.valid {
        println!("{}: INVALID", args.rules_file.display());
        return Ok(false);
    }

    let set = RuleSet::compile(raw).context("failed to compile rules")?;
    println!("{}: {} rule(s) OK", args.rules_file.display(), set.len());

    let Some(resource_path) = &args.resource else {
        return Ok(true);
    };
    let resource = read_resource(resource_path)?;

    let namespace = args
        .namespace
        .clone()
        .or_else(|| string_at(&resource, &["metadata", "namespace"]))
        .unwrap_or_default();
    let kind = args
        .kind
        .clone()
        .or_else(|| string_at(&resource, &["kind"]))
        .context("resource has no `kind`; pass --kind")?;
    let skip = match &args.skip_namespaces {
        Some(raw) => split_list(raw, ','),
        None => config.rules.skip_namespaces.clone(),
    };

    let engine = PolicyEngine::new(RuleIndex::build(set), skip);
    let decision = engine.decide(&resource, &namespace, &kind);
    print_decision(&decision, &namespace, &kind);
    Ok(decision.allowed)
}

fn read_resource(path: &Path) -> anyhow::Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn string_at(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .try_fold(value, |v, k| v.get(k))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn print_validation(result: &ValidationResult) {
    for e in &result.errors {
        match &e.suggestion {
            Some(s) => println!("error   {}: {} (did you mean '{s}'?)", e.path, e.message),
            None => println!("error   {}: {}", e.path, e.message),
        }
    }
    for w in &result.warnings {
        println!("warning {}: {}", w.path, w.message);
    }
}

fn print_decision(decision: &Decision, namespace: &str, kind: &str) {
    match decision.denial_message() {
        None => println!("{kind} in '{namespace}': ALLOWED"),
        Some(message) => {
            println!(
                "{kind} in '{namespace}': DENIED ({} violation(s))",
                decision.violations.len()
            );
            println!("{message}");
        }
    }
}
