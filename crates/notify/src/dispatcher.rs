//! Fire-and-forget delivery of violation notices.
//!
//! The admission path hands every violation to [`Dispatcher::notify_all`]
//! and moves on. Each notice that names a channel is rendered and sent on
//! its own tokio task; delivery failures are logged, never returned.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::templating::{TemplateContext, TemplateRenderer, DEFAULT_MESSAGE_TEMPLATE};
use crate::traits::{Notification, Notifier, NotifyError};

/// What the dispatcher needs to know about one violation.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ViolationNotice {
    pub rule_name: String,
    pub description: String,
    pub path: String,
    pub message: String,
    /// Destination channel; notices without one are not sent.
    pub channel: Option<String>,
    pub resource_type: String,
    pub namespace: String,
}

/// Renders and sends violation notices through one notifier.
#[derive(Clone)]
pub struct Dispatcher {
    /// `None` disables notifications entirely.
    notifier: Option<Arc<dyn Notifier>>,
    renderer: Arc<TemplateRenderer>,
    template: String,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("channel", &self.notifier.as_ref().map(|n| n.channel_name().to_string()))
            .field("template", &self.template)
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher that sends through `notifier` using the default template.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier: Some(notifier),
            renderer: Arc::new(TemplateRenderer::new()),
            template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }

    /// Create a dispatcher that drops every notice.
    pub fn disabled() -> Self {
        Self {
            notifier: None,
            renderer: Arc::new(TemplateRenderer::new()),
            template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }

    /// Replace the message template, checking it renders first.
    pub fn with_template(mut self, template: impl Into<String>) -> Result<Self, NotifyError> {
        let template = template.into();
        self.renderer.validate(&template)?;
        self.template = template;
        Ok(self)
    }

    pub fn is_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Build the notification for one notice. `None` when it has no channel.
    pub fn render(&self, notice: &ViolationNotice) -> Result<Option<Notification>, NotifyError> {
        let Some(channel) = notice.channel.as_deref().filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        let ctx = TemplateContext {
            rule_name: notice.rule_name.clone(),
            description: notice.description.clone(),
            path: notice.path.clone(),
            message: notice.message.clone(),
            resource_type: notice.resource_type.clone(),
            namespace: notice.namespace.clone(),
            now: chrono::Utc::now().to_rfc3339(),
        };
        let body = self.renderer.render(&self.template, &ctx)?;

        Ok(Some(Notification {
            channel: channel.to_string(),
            body,
            fields: vec![
                ("ResourceType".to_string(), notice.resource_type.clone()),
                ("Namespace".to_string(), notice.namespace.clone()),
            ],
        }))
    }

    /// Spawn one delivery task per notice that names a channel.
    ///
    /// Returns the task handles so callers (and tests) may await them; the
    /// admission path drops them.
    pub fn notify_all(&self, notices: Vec<ViolationNotice>) -> Vec<JoinHandle<()>> {
        let Some(notifier) = &self.notifier else {
            tracing::debug!(count = notices.len(), "Notifications disabled, dropping notices");
            return Vec::new();
        };

        let mut handles = Vec::new();
        for notice in notices {
            let notification = match self.render(&notice) {
                Ok(Some(n)) => n,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(rule = %notice.rule_name, error = %e, "Failed to render notification");
                    continue;
                }
            };

            let notifier = Arc::clone(notifier);
            handles.push(tokio::spawn(async move {
                let start = std::time::Instant::now();
                match notifier.send(&notification).await {
                    Ok(()) => tracing::info!(
                        rule = %notice.rule_name,
                        channel = %notification.channel,
                        notifier = notifier.channel_name(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Notification delivered"
                    ),
                    Err(e) => tracing::warn!(
                        rule = %notice.rule_name,
                        channel = %notification.channel,
                        notifier = notifier.channel_name(),
                        error = %e,
                        "Notification delivery failed"
                    ),
                }
            }));
        }
        handles
    }
}
