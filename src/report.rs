use serde_json::{Map, Value};

use crate::kpi::Kpis;
use crate::util::fmt_opt;

/// Render the Markdown report. Fixed section order, fixed numeric formatting,
/// no timestamps: identical inputs always produce byte-identical output.
/// KPI values the summarizer omitted render as `n/a`.
pub fn render(kpis: &Kpis, narrative: &str, recommendations: &[String]) -> String {
    let mut lines = vec![
        "# Financial Analysis Report\n".to_string(),
        "## KPIs\n".to_string(),
        format!("- Revenue total: {}", fmt_opt(kpis.revenue_total, 2)),
        format!("- Expenses total: {}", fmt_opt(kpis.expenses_total, 2)),
        format!("- Profit total: {}", fmt_opt(kpis.profit_total, 2)),
        format!("- Margin: {}%\n", fmt_opt(kpis.margin_pct, 1)),
        "## Narrative\n".to_string(),
        format!("{}\n", narrative),
        "## Recommendations\n".to_string(),
    ];
    for (i, rec) in recommendations.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, rec));
    }
    lines.join("\n") + "\n"
}

/// Append a `## Metrics` section, one bullet per entry in map order.
/// An empty map is the identity.
pub fn append_metrics(markdown: &str, metrics: &Map<String, Value>) -> String {
    if metrics.is_empty() {
        return markdown.to_string();
    }
    let mut lines = vec![
        markdown.to_string(),
        String::new(),
        "## Metrics".to_string(),
        String::new(),
    ];
    for (key, value) in metrics {
        let shown = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        lines.push(format!("- {}: {}", key, shown));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_kpis() -> Kpis {
        Kpis {
            revenue_total: Some(1000.0),
            expenses_total: Some(400.0),
            profit_total: Some(600.0),
            margin_pct: Some(60.0),
            period_start: Some("2024-01-01".to_string()),
            period_end: Some("2024-01-31".to_string()),
        }
    }

    fn sample_recs() -> Vec<String> {
        vec!["Un.".to_string(), "Deux.".to_string(), "Trois.".to_string()]
    }

    #[test]
    fn report_has_fixed_sections_in_order() {
        let md = render(&sample_kpis(), "Une narration.", &sample_recs());
        let title = md.find("# Financial Analysis Report").unwrap();
        let kpis = md.find("## KPIs").unwrap();
        let narrative = md.find("## Narrative").unwrap();
        let recs = md.find("## Recommendations").unwrap();
        assert!(title < kpis && kpis < narrative && narrative < recs);
        assert!(md.contains("- Revenue total: 1000.00"));
        assert!(md.contains("- Margin: 60.0%"));
        assert!(md.contains("1. Un."));
        assert!(md.contains("3. Trois."));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let a = render(&sample_kpis(), "Une narration.", &sample_recs());
        let b = render(&sample_kpis(), "Une narration.", &sample_recs());
        assert_eq!(a, b);
    }

    #[test]
    fn missing_kpis_render_as_placeholder() {
        let md = render(&Kpis::default(), "Rien.", &sample_recs());
        assert!(md.contains("- Revenue total: n/a"));
        assert!(md.contains("- Margin: n/a%"));
    }

    #[test]
    fn append_metrics_on_empty_map_is_identity() {
        let md = render(&sample_kpis(), "Une narration.", &sample_recs());
        let out = append_metrics(&md, &Map::new());
        assert_eq!(out, md);
    }

    #[test]
    fn append_metrics_adds_one_section_in_map_order() {
        let md = render(&sample_kpis(), "Une narration.", &sample_recs());
        let mut metrics = Map::new();
        metrics.insert("latency_ms".to_string(), json!(0));
        metrics.insert("provider".to_string(), json!("stub"));
        let out = append_metrics(&md, &metrics);

        assert!(out.len() > md.len());
        assert_eq!(out.matches("## Metrics").count(), 1);
        let latency = out.find("- latency_ms: 0").unwrap();
        let provider = out.find("- provider: stub").unwrap();
        assert!(latency < provider);
    }
}
