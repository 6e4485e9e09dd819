//! Rule loading from a single YAML file or a directory of them.
//!
//! Loading is all-or-nothing: a file that cannot be read, parsed, validated
//! or compiled fails the whole load, so a half-configured rule set is never
//! served. Directories are scanned recursively in sorted order; dotfiles and
//! non-YAML files are skipped.

mod core;
mod error;


pub use self::core::RuleLoader;
pub use self::error::{Result, RuleError};
