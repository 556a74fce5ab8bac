use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{RunMetrics, Synthesizer};
use crate::automation::{AutomationDispatcher, WebhookAck};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::integrations::NotionExporter;
use crate::integrations::notion::NotionAck;
use crate::kpi::{self, Kpis};
use crate::{agents, metrics, report};

const REPORT_TITLE: &str = "Financial Analysis Report";

/// Everything one run produced, in order of production.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub run_id: Uuid,
    pub kpis: Kpis,
    pub narrative: String,
    pub recommendations: Vec<String>,
    pub metrics: RunMetrics,
}

/// Artifacts and acknowledgments handed back to the entry point for display.
#[derive(Debug)]
pub struct RunOutcome {
    pub analysis: Analysis,
    pub report_path: PathBuf,
    pub webhook_ack: WebhookAck,
    pub notion_ack: Option<NotionAck>,
}

/// Wires the pipeline: summarize → synthesize → render → write → forward.
/// Strictly sequential; each stage consumes the previous stage's value.
pub struct Orchestrator {
    synthesizer: Box<dyn Synthesizer>,
    dispatcher: AutomationDispatcher,
    notion: NotionExporter,
}

impl Orchestrator {
    pub fn new(config: Config) -> Result<Self> {
        let synthesizer = agents::select_synthesizer(config.openai)?;
        let dispatcher = AutomationDispatcher::new(config.webhook_url)
            .context("failed to build webhook client")?;
        let notion =
            NotionExporter::new(config.notion).context("failed to build Notion client")?;
        Ok(Self {
            synthesizer,
            dispatcher,
            notion,
        })
    }

    pub async fn run(
        &self,
        dataset: &Dataset,
        out_dir: &Path,
        status_file: &Path,
    ) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        info!("Run {}: summarizing {} records", run_id, dataset.records.len());
        let kpis = kpi::summarize(dataset);

        let synthesis = self.synthesizer.synthesize(&kpis).await?;
        info!(
            "Run {}: synthesis by '{}' in {} ms",
            run_id, synthesis.metrics.provider, synthesis.metrics.latency_ms
        );

        let analysis = Analysis {
            run_id,
            kpis,
            narrative: synthesis.narrative,
            recommendations: synthesis.recommendations,
            metrics: synthesis.metrics,
        };

        let metrics_map = analysis.metrics.to_map();
        let markdown = report::render(
            &analysis.kpis,
            &analysis.narrative,
            &analysis.recommendations,
        );
        let markdown = report::append_metrics(&markdown, &metrics_map);

        // The report file is the run's sole hard requirement
        tokio::fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
        let report_path = out_dir.join("report.md");
        tokio::fs::write(&report_path, &markdown)
            .await
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        info!("Run {}: report saved to {}", run_id, report_path.display());

        let payload = webhook_payload(&analysis)?;
        let webhook_ack = self.dispatcher.dispatch(&payload).await;

        let notion_ack = match self.notion.parent_page_id() {
            Some(page_id) => {
                let page_id = page_id.to_string();
                Some(
                    self.notion
                        .create_page_markdown(&page_id, REPORT_TITLE, &markdown)
                        .await,
                )
            }
            None => None,
        };

        if let Err(e) = metrics::append_run_metrics(status_file, &metrics_map).await {
            warn!(
                "Could not append run metrics to {}: {}",
                status_file.display(),
                e
            );
        }

        Ok(RunOutcome {
            analysis,
            report_path,
            webhook_ack,
            notion_ack,
        })
    }
}

/// Analysis fields flattened next to a fixed `type` tag.
fn webhook_payload(analysis: &Analysis) -> Result<Value> {
    let mut payload = serde_json::Map::new();
    payload.insert("type".to_string(), Value::String("financial_report".to_string()));
    let fields = serde_json::to_value(analysis)?
        .as_object()
        .cloned()
        .unwrap_or_default();
    payload.extend(fields);
    Ok(Value::Object(payload))
}
