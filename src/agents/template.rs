use async_trait::async_trait;

use crate::kpi::Kpis;
use crate::util::{PLACEHOLDER, fmt_opt};

use super::{RunMetrics, Synthesis, SynthesisError, Synthesizer};

/// Deterministic fallback narrative, used whenever no LLM credential is
/// configured. Tolerates any partial KPI set: missing values render as the
/// `n/a` placeholder instead of failing.
pub struct TemplateSynthesizer;

pub(super) const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Optimiser le mix produit.",
    "Améliorer la prévision de trésorerie.",
    "Accélérer le cycle de vente.",
];

pub(super) fn template_synthesis(kpis: &Kpis) -> Synthesis {
    let narrative = format!(
        "Sur la période {} → {}, le chiffre d'affaires total est {}, \
         les dépenses {}, soit un profit de {} et une marge de {}%.",
        kpis.period_start.as_deref().unwrap_or(PLACEHOLDER),
        kpis.period_end.as_deref().unwrap_or(PLACEHOLDER),
        fmt_opt(kpis.revenue_total, 2),
        fmt_opt(kpis.expenses_total, 2),
        fmt_opt(kpis.profit_total, 2),
        fmt_opt(kpis.margin_pct, 1),
    );

    let recommendations = vec![
        "Prioriser les canaux à forte marge.".to_string(),
        "Rationaliser les coûts variables.".to_string(),
        "Automatiser un reporting hebdomadaire (Slack/Notion).".to_string(),
    ];

    Synthesis {
        narrative,
        recommendations,
        metrics: RunMetrics {
            latency_ms: 0,
            tokens_input: 0,
            tokens_output: 0,
            provider: "stub".to_string(),
        },
    }
}

#[async_trait]
impl Synthesizer for TemplateSynthesizer {
    async fn synthesize(&self, kpis: &Kpis) -> Result<Synthesis, SynthesisError> {
        Ok(template_synthesis(kpis))
    }
}
