//! CLI argument parsing.

use std::path::PathBuf;

use aegir_core::config::split_list;
use aegir_core::Config;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "aegir",
    version,
    about = "Kubernetes admission controller that enforces declarative field rules"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the admission webhook server.
    Server(ServerArgs),
    /// Validate a rules file and optionally evaluate a resource against it.
    Check(CheckArgs),
}

/// Flags override the matching environment variables.
#[derive(Args, Debug, Default)]
pub struct ServerArgs {
    /// Rules file, or a directory of rule files.
    #[arg(long)]
    pub rules_file: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port to listen on.
    #[arg(long)]
    pub port: Option<u16>,

    /// Path to the TLS certificate (PEM).
    #[arg(long)]
    pub tls_cert_file: Option<PathBuf>,

    /// Path to the TLS private key (PEM).
    #[arg(long)]
    pub tls_key_file: Option<PathBuf>,

    /// Slack API token; enables violation notifications.
    #[arg(long)]
    pub slack_token: Option<String>,

    /// Comma-separated namespaces exempt from wildcard rules.
    #[arg(long)]
    pub skip_namespaces: Option<String>,
}

impl ServerArgs {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.rules_file {
            config.rules.rules_file = Some(path.clone());
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(cert) = &self.tls_cert_file {
            config.server.tls_cert_file = Some(cert.clone());
        }
        if let Some(key) = &self.tls_key_file {
            config.server.tls_key_file = Some(key.clone());
        }
        if let Some(token) = &self.slack_token {
            config.slack.token = Some(token.clone()).filter(|t| !t.is_empty());
        }
        if let Some(raw) = &self.skip_namespaces {
            config.rules.skip_namespaces = split_list(raw, ',');
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rules file, or a directory of rule files.
    #[arg(long)]
    pub rules_file: PathBuf,

    /// JSON resource to evaluate against the rules.
    #[arg(long)]
    pub resource: Option<PathBuf>,

    /// Namespace to evaluate in (defaults to the resource's `metadata.namespace`).
    #[arg(long)]
    pub namespace: Option<String>,

    /// Resource kind (defaults to the resource's `kind`).
    #[arg(long)]
    pub kind: Option<String>,

    /// Comma-separated namespaces exempt from wildcard rules.
    #[arg(long)]
    pub skip_namespaces: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn server_flags_override_config() {
        let cli = Cli::parse_from([
            "aegir",
            "server",
            "--rules-file",
            "/etc/aegir/rules.yaml",
            "--port",
            "9443",
            "--skip-namespaces",
            "kube-system, monitoring",
        ]);
        let Command::Server(args) = cli.command else {
            panic!("expected server command");
        };

        let mut config = Config::for_profile("AEGIR_CLI_TEST_UNUSED");
        args.apply(&mut config);
        assert_eq!(
            config.rules.rules_file,
            Some(PathBuf::from("/etc/aegir/rules.yaml"))
        );
        assert_eq!(config.server.port, 9443);
        assert_eq!(config.rules.skip_namespaces, vec!["kube-system", "monitoring"]);
    }

    #[test]
    fn check_requires_rules_file() {
        assert!(Cli::try_parse_from(["aegir", "check"]).is_err());
        let cli = Cli::try_parse_from([
            "aegir",
            "check",
            "--rules-file",
            "rules.yaml",
            "--resource",
            "pod.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Check(CheckArgs { resource: Some(_), .. })));
    }
}
