use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Append the run's metrics to the status file as a fenced JSON block.
/// Always appends, so the file grows by one section per run. I/O failure is
/// returned to the caller, which logs it and moves on; it never aborts a run.
pub async fn append_run_metrics(path: &Path, metrics: &Map<String, Value>) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(&Value::Object(metrics.clone()))?;
    let section = format!("\n---\n### Latest run metrics\n\n```json\n{}\n```\n", rendered);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(section.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_status_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("finana-status-{}.md", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn appends_a_fenced_json_section() {
        let path = temp_status_path();
        let mut metrics = Map::new();
        metrics.insert("latency_ms".to_string(), json!(0));
        metrics.insert("provider".to_string(), json!("stub"));

        append_run_metrics(&path, &metrics).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(content.contains("### Latest run metrics"));
        assert!(content.contains("```json"));
        assert!(content.contains("\"provider\": \"stub\""));
    }

    #[tokio::test]
    async fn successive_runs_grow_the_file() {
        let path = temp_status_path();
        let mut metrics = Map::new();
        metrics.insert("provider".to_string(), json!("stub"));

        append_run_metrics(&path, &metrics).await.unwrap();
        let first = std::fs::read_to_string(&path).unwrap().len();
        append_run_metrics(&path, &metrics).await.unwrap();
        let second = std::fs::read_to_string(&path).unwrap().len();
        std::fs::remove_file(&path).ok();

        assert_eq!(second, first * 2);
    }
}
