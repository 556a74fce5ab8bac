use colored::*;

use crate::automation::WebhookAck;
use crate::integrations::notion::NotionAck;
use crate::orchestrator::RunOutcome;

pub fn display_outcome(outcome: &RunOutcome) {
    let analysis = &outcome.analysis;

    println!("\n{}", "📊 Financial Analysis Report".bright_blue().bold());
    println!(
        "{} {}",
        "│ 🆔 Run:".blue(),
        analysis.run_id.to_string().white()
    );
    if let (Some(start), Some(end)) = (&analysis.kpis.period_start, &analysis.kpis.period_end) {
        println!(
            "{} {} → {}",
            "│ 📅 Period:".blue(),
            start.white(),
            end.white()
        );
    }
    if let Some(profit) = analysis.kpis.profit_total {
        println!(
            "{} {}",
            "│ 💰 Profit:".blue(),
            format!("{:.2}", profit).bright_white().bold()
        );
    }
    println!("{} {}", "│ 📝 Narrative:".blue(), analysis.narrative.white());
    for (i, rec) in analysis.recommendations.iter().enumerate() {
        println!("{} {}. {}", "│ 💡".blue(), i + 1, rec.white());
    }
    println!(
        "{} {}",
        "│ ⏱️  Synthesis:".blue(),
        format!(
            "{} ({} ms, {}/{} tokens)",
            analysis.metrics.provider,
            analysis.metrics.latency_ms,
            analysis.metrics.tokens_input,
            analysis.metrics.tokens_output
        )
        .white()
    );

    println!(
        "\n{} {}",
        "💾 Report saved to".green(),
        outcome.report_path.display().to_string().bright_white()
    );
    display_webhook_ack(&outcome.webhook_ack);
    if let Some(ack) = &outcome.notion_ack {
        display_notion_ack(ack);
    }
}

fn display_webhook_ack(ack: &WebhookAck) {
    match ack {
        WebhookAck::Delivered { status, .. } => {
            println!("{} {}", "📨 Webhook delivered, status".green(), status);
        }
        WebhookAck::Failed { error, .. } => {
            println!("{} {}", "📨 Webhook failed:".yellow(), error.yellow());
        }
        WebhookAck::DryRun {
            payload_preview, ..
        } => {
            println!(
                "{} {}",
                "📨 Webhook dry-run, payload preview:".blue(),
                payload_preview.white()
            );
        }
    }
}

fn display_notion_ack(ack: &NotionAck) {
    match ack {
        NotionAck::Created { status, .. } => {
            println!("{} {}", "📄 Notion page request, status".green(), status);
        }
        NotionAck::Failed { error, .. } => {
            println!("{} {}", "📄 Notion export failed:".yellow(), error.yellow());
        }
    }
}
