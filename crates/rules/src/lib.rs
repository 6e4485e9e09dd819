//! Admission policy rule engine.
//!
//! This crate provides:
//! - YAML rule definitions with serde deserialization (`schema`)
//! - Dotted JSON path resolution with `#` array wildcards (`path`)
//! - Typed validation primitives compiled once at load time (`validator`)
//! - Rule-file checks with "did you mean" suggestions (`validation`)
//! - File/directory loader producing an immutable rule set (`loader`)
//! - Namespace/kind rule index (`store`)
//! - Per-field violation aggregation and the allow/deny pipeline

pub mod aggregator;
pub mod loader;
pub mod path;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod validation;
pub mod validator;

pub use pipeline::{decide, Decision, PolicyEngine, DENIAL_PREFIX};
pub use schema::Violation;
pub use store::{CompileError, FieldRule, Rule, RuleIndex, RuleSet, WILDCARD_NAMESPACE};
