use std::time::Instant;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::config::OpenAiConfig;
use crate::kpi::Kpis;
use crate::openai::{ChatMessage, OpenAiClient};

use super::template::{FALLBACK_RECOMMENDATIONS, template_synthesis};
use super::{RunMetrics, Synthesis, SynthesisError, Synthesizer};

const NARRATIVE_MAX_CHARS: usize = 1000;
const MAX_NARRATIVE_LINES: usize = 2;
const MAX_RECOMMENDATIONS: usize = 3;

/// Delegated synthesis: asks an OpenAI-compatible chat endpoint for the
/// narrative and recommendations, and falls back to the template when the
/// call fails, so a flaky service never kills the run.
pub struct LlmSynthesizer {
    client: OpenAiClient,
    provider: String,
}

impl LlmSynthesizer {
    pub fn new(config: OpenAiConfig) -> Result<Self, SynthesisError> {
        let client = OpenAiClient::new(config)?;
        Ok(Self {
            client,
            provider: "openai+reqwest".to_string(),
        })
    }

    fn build_messages(&self, kpis: &Kpis) -> Vec<ChatMessage> {
        let system = "You are a senior financial analyst. Given KPIs, write a concise \
                      business narrative in French and 3 tactical recommendations for \
                      management. Keep it factual.";
        let user = format!(
            "KPIs JSON:\n{}\n\nWrite:\n- A 2-3 sentence narrative\n- 3 bullet recommendations",
            json!(kpis)
        );
        vec![ChatMessage::system(system), ChatMessage::user(user)]
    }
}

/// Split a freeform completion into narrative sentences and recommendations.
/// Up to two leading non-bulleted lines form the narrative; everything after
/// that (and every bulleted line) is a recommendation with its marker
/// stripped. An empty recommendation list falls back to the fixed trio.
pub(super) fn parse_completion(text: &str) -> (String, Vec<String>) {
    let mut narrative_lines: Vec<&str> = Vec::new();
    let mut recommendations: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let stripped = line
            .trim_start_matches(['-', '•', '*', ' '])
            .trim()
            .to_string();
        let bulleted = line.starts_with(['-', '•', '*']);
        if narrative_lines.len() < MAX_NARRATIVE_LINES && !bulleted {
            narrative_lines.push(line);
        } else {
            recommendations.push(stripped);
        }
    }

    if recommendations.is_empty() {
        recommendations = FALLBACK_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect();
    }
    recommendations.truncate(MAX_RECOMMENDATIONS);

    let narrative: String = narrative_lines
        .join(" ")
        .chars()
        .take(NARRATIVE_MAX_CHARS)
        .collect();
    (narrative, recommendations)
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(&self, kpis: &Kpis) -> Result<Synthesis, SynthesisError> {
        let messages = self.build_messages(kpis);

        info!("LlmSynthesizer: requesting narrative from {}", self.client.model());
        let started = Instant::now();
        let completion = match self.client.send_messages(messages).await {
            Ok(c) => c,
            Err(e) => {
                warn!("LlmSynthesizer: chat call failed ({}), falling back to template", e);
                return Ok(template_synthesis(kpis));
            }
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        let usage = completion.usage.unwrap_or_default();
        let (narrative, recommendations) = parse_completion(&completion.content);

        Ok(Synthesis {
            narrative,
            recommendations,
            metrics: RunMetrics {
                latency_ms,
                tokens_input: usage.prompt_tokens,
                tokens_output: usage.completion_tokens,
                provider: self.provider.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> OpenAiConfig {
        OpenAiConfig {
            api_key: "test-key".to_string(),
            base_url,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 1024,
            timeout: 5,
        }
    }

    #[test]
    fn leading_lines_become_narrative_and_bullets_become_recommendations() {
        let text = "La rentabilité progresse.\nLa marge reste saine.\n- Investir\n• Réduire\n* Suivre";
        let (narrative, recs) = parse_completion(text);
        assert_eq!(narrative, "La rentabilité progresse. La marge reste saine.");
        assert_eq!(recs, vec!["Investir", "Réduire", "Suivre"]);
    }

    #[test]
    fn third_plain_line_counts_as_recommendation() {
        let text = "Phrase un.\nPhrase deux.\nPhrase trois.";
        let (narrative, recs) = parse_completion(text);
        assert_eq!(narrative, "Phrase un. Phrase deux.");
        assert_eq!(recs, vec!["Phrase trois."]);
    }

    #[test]
    fn no_bullets_falls_back_to_fixed_recommendations() {
        let (_, recs) = parse_completion("Une seule phrase.");
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0], "Optimiser le mix produit.");
    }

    #[test]
    fn recommendations_are_capped_at_three() {
        let (_, recs) = parse_completion("Intro.\n- a\n- b\n- c\n- d\n- e");
        assert_eq!(recs, vec!["a", "b", "c"]);
    }

    #[test]
    fn narrative_is_truncated_to_1000_chars() {
        let long = "x".repeat(3000);
        let (narrative, _) = parse_completion(&long);
        assert_eq!(narrative.chars().count(), 1000);
    }

    #[tokio::test]
    async fn delegated_synthesis_measures_usage_and_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": "Le profit est solide.\n- Continuer\n- Surveiller\n- Investir"
                }}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 35}
            })))
            .mount(&server)
            .await;

        let synthesizer = LlmSynthesizer::new(test_config(server.uri())).unwrap();
        let synthesis = synthesizer.synthesize(&Kpis::default()).await.unwrap();

        assert_eq!(synthesis.narrative, "Le profit est solide.");
        assert_eq!(synthesis.recommendations.len(), 3);
        assert_eq!(synthesis.metrics.provider, "openai+reqwest");
        assert_eq!(synthesis.metrics.tokens_input, 120);
        assert_eq!(synthesis.metrics.tokens_output, 35);
    }

    #[tokio::test]
    async fn service_failure_falls_back_to_template() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let synthesizer = LlmSynthesizer::new(test_config(server.uri())).unwrap();
        let synthesis = synthesizer.synthesize(&Kpis::default()).await.unwrap();
        assert_eq!(synthesis.metrics.provider, "stub");
        assert_eq!(synthesis.recommendations.len(), 3);
    }
}
