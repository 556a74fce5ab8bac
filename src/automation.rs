use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::util::truncate_chars;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const BODY_PREVIEW_CHARS: usize = 500;
const PAYLOAD_PREVIEW_CHARS: usize = 300;

/// Outcome of forwarding the analysis to the automation webhook. Network
/// failure is a value here, never a fatal error of the run.
#[derive(Debug, Clone)]
pub enum WebhookAck {
    /// The webhook answered; `text` holds the start of its response body
    Delivered { status: u16, text: String },
    /// The request could not be completed; status is fixed at 0
    Failed { status: u16, error: String },
    /// No URL configured; nothing was sent
    DryRun {
        status: String,
        payload_preview: String,
    },
}

/// Forwards the analysis payload to a webhook (Slack, Make, n8n, ...).
pub struct AutomationDispatcher {
    client: Client,
    webhook_url: Option<String>,
}

impl AutomationDispatcher {
    pub fn new(webhook_url: Option<String>) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    /// POST the payload when a URL is configured, otherwise acknowledge a
    /// dry run with a truncated preview of what would have been sent.
    pub async fn dispatch(&self, payload: &Value) -> WebhookAck {
        match &self.webhook_url {
            Some(url) => self.post_to_webhook(payload, url).await,
            None => {
                info!("No webhook URL configured, dry-run");
                WebhookAck::DryRun {
                    status: "dry-run".to_string(),
                    payload_preview: truncate_chars(&payload.to_string(), PAYLOAD_PREVIEW_CHARS),
                }
            }
        }
    }

    async fn post_to_webhook(&self, payload: &Value, url: &str) -> WebhookAck {
        info!("Posting analysis to webhook");
        let response = match self.client.post(url).json(payload).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Webhook request failed: {}", e);
                return WebhookAck::Failed {
                    status: 0,
                    error: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => WebhookAck::Delivered {
                status,
                text: truncate_chars(&body, BODY_PREVIEW_CHARS),
            },
            Err(e) => WebhookAck::Failed {
                status: 0,
                error: e.to_string(),
            },
        }
    }
}
