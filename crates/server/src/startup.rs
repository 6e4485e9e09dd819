//! Server startup: rule loading, notifier wiring and the listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{debug, info, warn};

use aegir_core::Config;
use aegir_notify::{Dispatcher, SlackNotifier};
use aegir_rules::loader::RuleLoader;
use aegir_rules::{PolicyEngine, RuleIndex};

use crate::router::build_router;
use crate::state::AppState;

/// Load rules and build the shared state. Any rule error is fatal.
pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let rules_file = config
        .rules
        .rules_file
        .as_ref()
        .context("no rules file configured")?;

    let rule_set = RuleLoader::new(rules_file)
        .load()
        .with_context(|| format!("failed to load rules from {}", rules_file.display()))?;
    let index = RuleIndex::build(rule_set);
    info!(rules = index.len(), "rule index built");

    let engine = PolicyEngine::new(index, config.rules.skip_namespaces.iter().cloned());
    let dispatcher = build_dispatcher(config)?;
    Ok(AppState::new(engine, dispatcher))
}

fn build_dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let Some(token) = config.slack.token.as_deref() else {
        info!("no Slack token configured, notifications disabled");
        return Ok(Dispatcher::disabled());
    };
    let notifier = SlackNotifier::new(
        token,
        Some(config.slack.color.clone()),
        Some(config.slack.api_url.clone()),
    )
    .context("invalid Slack configuration")?;

    let mut dispatcher = Dispatcher::new(Arc::new(notifier));
    if let Some(template) = &config.slack.message_template {
        dispatcher = dispatcher
            .with_template(template.as_str())
            .context("invalid SLACK_MESSAGE_TEMPLATE")?;
    }
    info!(
        custom_template = config.slack.message_template.is_some(),
        "Slack notifications enabled"
    );
    Ok(dispatcher)
}

/// Serve until SIGINT/SIGTERM, over TLS when a certificate is configured.
pub async fn serve(config: &Config, state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    debug!(config = %config.redacted_summary(), "effective configuration");

    let app = build_router(Arc::new(state));

    match (&config.server.tls_cert_file, &config.server.tls_key_file) {
        (Some(cert), Some(key)) => {
            use axum_server::tls_rustls::RustlsConfig;

            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .with_context(|| {
                    format!(
                        "failed to load TLS material from {} / {}",
                        cert.display(),
                        key.display()
                    )
                })?;

            let handle = axum_server::Handle::new();
            let shutdown = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!(%addr, "admission webhook listening with TLS");
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("webhook server failed")?;
        }
        _ => {
            warn!(%addr, "no TLS certificate configured, serving plain HTTP");
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("webhook server failed")?;
        }
    }

    info!("admission webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
