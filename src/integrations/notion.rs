use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use crate::config::NotionConfig;
use crate::util::truncate_chars;

const NOTION_VERSION: &str = "2022-06-28";
const NOTION_TIMEOUT: Duration = Duration::from_secs(15);
const BODY_PREVIEW_CHARS: usize = 800;
// Notion caps rich-text content length per block
const MARKDOWN_MAX_CHARS: usize = 1900;

/// Outcome of the page-creation call, mirroring [`crate::automation::WebhookAck`]:
/// failures are reported, never raised.
#[derive(Debug, Clone)]
pub enum NotionAck {
    Created { status: u16, text: String },
    Failed { status: u16, error: String },
}

/// Creates a Notion page holding the Markdown report inside a code block.
pub struct NotionExporter {
    client: Client,
    config: NotionConfig,
}

impl NotionExporter {
    pub fn new(config: NotionConfig) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(NOTION_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// The export only runs when a parent page was configured.
    pub fn parent_page_id(&self) -> Option<&str> {
        self.config.parent_page_id.as_deref()
    }

    /// Create a page under `parent_page_id` titled `title`, with the first
    /// 1900 characters of the Markdown in a `markdown` code block. A missing
    /// token short-circuits to a failure value without any network call.
    pub async fn create_page_markdown(
        &self,
        parent_page_id: &str,
        title: &str,
        markdown_text: &str,
    ) -> NotionAck {
        let Some(token) = self.config.token.as_deref() else {
            warn!("Notion export requested but no token configured");
            return NotionAck::Failed {
                status: 0,
                error: "Notion token not configured".to_string(),
            };
        };

        let payload = json!({
            "parent": {"page_id": parent_page_id},
            "properties": {
                "title": {"title": [{"text": {"content": title}}]}
            },
            "children": [{
                "object": "block",
                "type": "code",
                "code": {
                    "language": "markdown",
                    "rich_text": [{
                        "type": "text",
                        "text": {"content": truncate_chars(markdown_text, MARKDOWN_MAX_CHARS)}
                    }]
                }
            }]
        });

        info!("Creating Notion page under {}", parent_page_id);
        let response = match self
            .client
            .post(format!("{}/v1/pages", self.config.base_url))
            .header("Authorization", format!("Bearer {}", token))
            .header("Notion-Version", NOTION_VERSION)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Notion request failed: {}", e);
                return NotionAck::Failed {
                    status: 0,
                    error: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => NotionAck::Created {
                status,
                text: truncate_chars(&body, BODY_PREVIEW_CHARS),
            },
            Err(e) => NotionAck::Failed {
                status: 0,
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String, token: Option<&str>) -> NotionConfig {
        NotionConfig {
            token: token.map(str::to_string),
            parent_page_id: Some("page-123".to_string()),
            base_url,
        }
    }

    #[tokio::test]
    async fn missing_token_fails_without_network_call() {
        let exporter = NotionExporter::new(config("http://127.0.0.1:9".to_string(), None)).unwrap();
        match exporter
            .create_page_markdown("page-123", "Financial Analysis Report", "# md")
            .await
        {
            NotionAck::Failed { status, error } => {
                assert_eq!(status, 0);
                assert!(error.contains("token"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn page_creation_sends_versioned_request_and_truncates_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .and(header("Notion-Version", NOTION_VERSION))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"object\":\"page\"}"))
            .mount(&server)
            .await;

        let exporter = NotionExporter::new(config(server.uri(), Some("secret"))).unwrap();
        let long_markdown = "y".repeat(5000);
        match exporter
            .create_page_markdown("page-123", "Financial Analysis Report", &long_markdown)
            .await
        {
            NotionAck::Created { status, text } => {
                assert_eq!(status, 200);
                assert!(text.contains("page"));
            }
            other => panic!("expected creation, got {:?}", other),
        }

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let content = body["children"][0]["code"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(content.chars().count(), 1900);
    }

    #[tokio::test]
    async fn http_error_status_is_still_reported_as_created_ack() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/pages"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let exporter = NotionExporter::new(config(server.uri(), Some("secret"))).unwrap();
        match exporter
            .create_page_markdown("page-123", "Financial Analysis Report", "# md")
            .await
        {
            NotionAck::Created { status, text } => {
                assert_eq!(status, 403);
                assert_eq!(text, "forbidden");
            }
            other => panic!("expected status passthrough, got {:?}", other),
        }
    }
}
