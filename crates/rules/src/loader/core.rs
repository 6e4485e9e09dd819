//! Core [`RuleLoader`] struct: filesystem-backed rule loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::schema::RulesFile;
use crate::store::RuleSet;
use crate::validation::{validate_rules_file, ValidationResult};

use super::error::{Result, RuleError};

/// Loads a [`RuleSet`] from a YAML file or a directory of YAML files.
///
/// Every file holds a `rules:` list; a directory load concatenates the lists
/// in sorted path order, which is also the lookup order of the resulting set.
#[derive(Debug, Clone)]
pub struct RuleLoader {
    /// A rules file, or a directory scanned recursively for `*.yml` / `*.yaml`.
    source: PathBuf,
}

impl RuleLoader {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read, validate and compile every rule under the source.
    pub fn load(&self) -> Result<RuleSet> {
        let file = self.load_raw()?;
        let rule_set = Self::compile(file, &self.source)?;
        info!(
            source = %self.source.display(),
            rules = rule_set.len(),
            "loaded rule set"
        );
        Ok(rule_set)
    }

    /// Read and merge the raw rule documents without validating them.
    pub fn load_raw(&self) -> Result<RulesFile> {
        let metadata = fs::metadata(&self.source).map_err(|source| RuleError::Read {
            path: self.source.clone(),
            source,
        })?;

        if !metadata.is_dir() {
            return Self::load_file(&self.source);
        }

        let mut files = Vec::new();
        collect_yaml_files(&self.source, &mut files)?;
        files.sort();

        let mut merged = RulesFile::default();
        for path in &files {
            let file = Self::load_file(path)?;
            debug!(path = %path.display(), rules = file.rules.len(), "read rules file");
            merged.rules.extend(file.rules);
        }
        if files.is_empty() {
            warn!(source = %self.source.display(), "rules directory contains no YAML files");
        }
        Ok(merged)
    }

    /// Parse a single YAML rules file.
    pub fn load_file(path: &Path) -> Result<RulesFile> {
        let contents = fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&contents, path)
    }

    /// Parse, validate and compile rules held in memory.
    pub fn from_yaml_str(yaml: &str) -> Result<RuleSet> {
        let origin = Path::new("<inline>");
        Self::compile(parse(yaml, origin)?, origin)
    }

    fn compile(file: RulesFile, origin: &Path) -> Result<RuleSet> {
        let result = validate_rules_file(&file);
        log_warnings(&result, origin);
        if !result.valid {
            return Err(RuleError::Invalid {
                path: origin.to_path_buf(),
                result,
            });
        }
        Ok(RuleSet::compile(file)?)
    }
}

fn parse(contents: &str, path: &Path) -> Result<RulesFile> {
    // An empty document is an empty rule list, not a parse error.
    if contents.trim().is_empty() {
        return Ok(RulesFile::default());
    }
    serde_yaml::from_str(contents).map_err(|source| RuleError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn log_warnings(result: &ValidationResult, origin: &Path) {
    for w in &result.warnings {
        warn!(source = %origin.display(), path = %w.path, "{}", w.message);
    }
}

/// Recursively collect YAML files, skipping dotfiles and dot-directories.
fn collect_yaml_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| RuleError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| RuleError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                debug!(path = %path.display(), "skipping dotfile");
                continue;
            }
        }

        if path.is_dir() {
            collect_yaml_files(&path, files)?;
            continue;
        }

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e == "yml" || e == "yaml")
            .unwrap_or(false);

        if is_yaml {
            files.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-YAML file");
        }
    }

    Ok(())
}
