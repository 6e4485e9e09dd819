//! Slack notifier.
//!
//! Posts each notification to `chat.postMessage` as a single attachment
//! with the rendered message, a footer and the labelled fields.

use serde::{Deserialize, Serialize};

use crate::traits::{Notification, Notifier, NotifyError};

/// Default Slack Web API base URL.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Default attachment color.
pub const DEFAULT_COLOR: &str = "#FD0D0D";

const FALLBACK: &str = "A rule violation has occurred.";
const PRETEXT: &str = "The following rules violations has been occurred:";
const FOOTER: &str = "Aegir";

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    attachments: Vec<Attachment<'a>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    fallback: &'a str,
    pretext: &'a str,
    text: &'a str,
    color: &'a str,
    footer: &'a str,
    ts: i64,
    fields: Vec<Field<'a>>,
    mrkdwn_in: [&'a str; 1],
}

#[derive(Debug, Serialize)]
struct Field<'a> {
    title: &'a str,
    value: &'a str,
    short: bool,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Delivers notifications through the Slack Web API with a bot token.
#[derive(Debug)]
pub struct SlackNotifier {
    token: String,
    color: String,
    /// Base URL; `chat.postMessage` is appended.
    api_url: String,
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Create a notifier. An empty token is a configuration error.
    pub fn new(
        token: impl Into<String>,
        color: Option<String>,
        api_url: Option<String>,
    ) -> Result<Self, NotifyError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(NotifyError::Config("Slack token must not be empty".to_string()));
        }
        Ok(Self {
            token,
            color: color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            api_url: api_url
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat.postMessage", self.api_url)
    }

    fn payload<'a>(&'a self, notification: &'a Notification, ts: i64) -> PostMessage<'a> {
        PostMessage {
            channel: &notification.channel,
            attachments: vec![Attachment {
                fallback: FALLBACK,
                pretext: PRETEXT,
                text: &notification.body,
                color: &self.color,
                footer: FOOTER,
                ts,
                fields: notification
                    .fields
                    .iter()
                    .map(|(title, value)| Field {
                        title,
                        value,
                        short: true,
                    })
                    .collect(),
                mrkdwn_in: ["text"],
            }],
        }
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = self.payload(notification, chrono::Utc::now().timestamp());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(NotifyError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(%status, body = %body_text, "Slack returned non-2xx status");
            return Err(NotifyError::Slack(format!("{status}: {body_text}")));
        }

        let body: SlackResponse = response.json().await?;
        if !body.ok {
            return Err(NotifyError::Slack(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        tracing::debug!(channel = %notification.channel, "Slack notification delivered");
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "slack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            channel: "#platform-alerts".to_string(),
            body: "Rule name: *forbid-authnetes*\n".to_string(),
            fields: vec![
                ("ResourceType".to_string(), "Pod".to_string()),
                ("Namespace".to_string(), "platform".to_string()),
            ],
        }
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = SlackNotifier::new("  ", None, None).unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)));
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let notifier =
            SlackNotifier::new("xoxb-test", None, Some("http://localhost:9000/api/".into())).unwrap();
        assert_eq!(notifier.endpoint(), "http://localhost:9000/api/chat.postMessage");
    }

    #[test]
    fn payload_shape() {
        let notifier = SlackNotifier::new("xoxb-test", None, None).unwrap();
        let n = notification();
        let payload = serde_json::to_value(notifier.payload(&n, 1_700_000_000)).unwrap();

        assert_eq!(payload["channel"], "#platform-alerts");
        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["fallback"], FALLBACK);
        assert_eq!(attachment["pretext"], PRETEXT);
        assert_eq!(attachment["footer"], "Aegir");
        assert_eq!(attachment["color"], DEFAULT_COLOR);
        assert_eq!(attachment["ts"], 1_700_000_000);
        assert_eq!(attachment["text"], "Rule name: *forbid-authnetes*\n");
        assert_eq!(attachment["fields"][0]["title"], "ResourceType");
        assert_eq!(attachment["fields"][0]["value"], "Pod");
        assert_eq!(attachment["fields"][1]["title"], "Namespace");
        assert_eq!(attachment["fields"][1]["short"], true);
    }

    #[test]
    fn custom_color() {
        let notifier = SlackNotifier::new("xoxb-test", Some("#00FF00".into()), None).unwrap();
        let n = notification();
        let payload = serde_json::to_value(notifier.payload(&n, 0)).unwrap();
        assert_eq!(payload["attachments"][0]["color"], "#00FF00");
    }

    #[test]
    fn slack_response_decodes_errors() {
        let body: SlackResponse =
            serde_json::from_str(r#"{"ok": false, "error": "channel_not_found"}"#).unwrap();
        assert!(!body.ok);
        assert_eq!(body.error.as_deref(), Some("channel_not_found"));
    }
}
