use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AegirError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Split a separated list, trimming entries and dropping empty ones.
///
/// `"kube-system, monitoring,,"` → `["kube-system", "monitoring"]`.
pub fn split_list(raw: &str, sep: char) -> Vec<String> {
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub rules: RulesConfig,
    pub slack: SlackConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AEGIR_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("AEGIR_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
            slack: SlackConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Reject configurations the admission server cannot start with.
    pub fn validate(&self) -> Result<(), AegirError> {
        if self.rules.rules_file.is_none() {
            return Err(AegirError::Config(
                "a rules file path is required (set RULES_FILE or pass --rules-file)".to_string(),
            ));
        }
        if self.server.tls_cert_file.is_some() != self.server.tls_key_file.is_some() {
            return Err(AegirError::Config(
                "TLS_CERT_FILE and TLS_KEY_FILE must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:  {}:{}, tls={}", self.server.host, self.server.port, self.server.tls_enabled());
        tracing::info!(
            "  rules:   file={}, skip_namespaces={:?}",
            self.rules
                .rules_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".to_string()),
            self.rules.skip_namespaces
        );
        tracing::info!(
            "  slack:   configured={}, custom_template={}",
            self.slack.is_configured(),
            self.slack.message_template.is_some()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": {
                "host": self.server.host,
                "port": self.server.port,
                "tls": self.server.tls_enabled(),
            },
            "rules": {
                "rules_file": self.rules.rules_file,
                "skip_namespaces": self.rules.skip_namespaces,
            },
            "slack": { "configured": self.slack.is_configured() },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls_cert_file: Option<PathBuf>,
    pub tls_key_file: Option<PathBuf>,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 8443),
            tls_cert_file: profiled_env_opt(p, "TLS_CERT_FILE").map(PathBuf::from),
            tls_key_file: profiled_env_opt(p, "TLS_KEY_FILE").map(PathBuf::from),
        }
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_cert_file.is_some() && self.tls_key_file.is_some()
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// YAML rules file, or a directory of rule files.
    pub rules_file: Option<PathBuf>,
    /// Namespaces exempt from `*` rules.
    pub skip_namespaces: Vec<String>,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rules_file: profiled_env_opt(p, "RULES_FILE").map(PathBuf::from),
            skip_namespaces: profiled_env_opt(p, "SKIP_NAMESPACES")
                .map(|raw| split_list(&raw, ','))
                .unwrap_or_default(),
        }
    }
}

// ── Slack ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub token: Option<String>,
    pub color: String,
    pub api_url: String,
    /// Minijinja template for the message body; the built-in one when unset.
    pub message_template: Option<String>,
}

impl SlackConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            token: profiled_env_opt(p, "SLACK_TOKEN"),
            color: profiled_env_or(p, "SLACK_COLOR", "#FD0D0D"),
            api_url: profiled_env_or(p, "SLACK_API_URL", "https://slack.com/api"),
            message_template: profiled_env_opt(p, "SLACK_MESSAGE_TEMPLATE"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }
}
