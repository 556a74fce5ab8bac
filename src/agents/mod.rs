use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::OpenAiConfig;
use crate::kpi::Kpis;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Llm(#[from] crate::openai::OpenAiError),
}

/// Accounting for one synthesis call.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub latency_ms: u64,
    pub tokens_input: u32,
    pub tokens_output: u32,
    pub provider: String,
}

impl RunMetrics {
    /// Flatten into an ordered key/value map, the shape the renderer and the
    /// status file consume.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("latency_ms".to_string(), json!(self.latency_ms));
        map.insert("tokens_input".to_string(), json!(self.tokens_input));
        map.insert("tokens_output".to_string(), json!(self.tokens_output));
        map.insert("provider".to_string(), json!(self.provider));
        map
    }
}

/// Narrative plus recommendations produced from a KPI set.
/// `recommendations` always holds exactly three entries.
#[derive(Debug, Clone, Serialize)]
pub struct Synthesis {
    pub narrative: String,
    pub recommendations: Vec<String>,
    pub metrics: RunMetrics,
}

/// Strategy seam between the deterministic template and the delegated
/// LLM-backed narrative generation.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, kpis: &Kpis) -> Result<Synthesis, SynthesisError>;
}

pub mod llm;
pub mod template;

pub use llm::LlmSynthesizer;
pub use template::TemplateSynthesizer;

/// Pick the synthesis strategy once, at construction time: delegated when an
/// API credential is configured, template otherwise. Call sites never branch
/// on credentials again.
pub fn select_synthesizer(
    openai: Option<OpenAiConfig>,
) -> Result<Box<dyn Synthesizer>, SynthesisError> {
    match openai {
        Some(cfg) => {
            tracing::info!("OpenAI credential present, using delegated synthesis");
            Ok(Box::new(LlmSynthesizer::new(cfg)?))
        }
        None => {
            tracing::info!("No OpenAI credential, using template synthesis");
            Ok(Box::new(TemplateSynthesizer))
        }
    }
}
