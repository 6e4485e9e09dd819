//! Error types for the rule loader.

use std::path::PathBuf;

use crate::store::CompileError;
use crate::validation::ValidationResult;

/// Errors that can occur while loading a rule set. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// The rules source could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse/deserialization error.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The rules parsed but failed validation.
    #[error("invalid rules in {}: {result}", path.display())]
    Invalid {
        path: PathBuf,
        result: ValidationResult,
    },

    /// A rule passed validation but could not be compiled.
    #[error("failed to compile rules: {0}")]
    Compile(#[from] CompileError),
}

/// Result alias for rule loading.
pub type Result<T> = std::result::Result<T, RuleError>;
