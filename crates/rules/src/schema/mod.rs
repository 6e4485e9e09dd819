//! YAML rule file schema and the violation record produced by evaluation.
//!
//! Defines the raw, as-written configuration types:
//! - `RulesFile`: top-level `rules:` list
//! - `RuleConfig`: one named rule scoped to a namespace and resource kind
//! - `RuleDefinition`: one path-scoped check within a rule
//! - `ValidationSpec`: description plus ordered `primitive -> args` mapping
//!
//! Compiled, ready-to-evaluate forms live in [`crate::store`].

mod rules_file;
mod violation;

pub use rules_file::*;
pub use violation::*;

#[cfg(test)]
mod tests;
