//! Batch results: JSON record file, job summary table, PR comment.
//!
//! Pure formatting and transport; one `ConversionResult` per
//! successfully processed file, serialized as a JSON array and rendered
//! as a Markdown table for the GitHub job summary / review comment.

use std::fs;
use std::io::Write;
use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};

/// Record of one converted file, matching the workflow artifact format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub source_file: String,
    pub audio_file: String,
    pub voice_id: String,
    pub character_count: usize,
    pub s3_key: String,
    pub s3_url: String,
}

/// Write the batch to the results file, overwriting any previous run.
pub fn write_results(path: &Path, results: &[ConversionResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results).expect("results serialize");
    fs::write(path, json)?;
    info!("Wrote {} result(s) to {}", results.len(), path.display());
    Ok(())
}

/// Render the batch as a Markdown summary table.
pub fn render_summary(results: &[ConversionResult]) -> String {
    let mut lines = vec![
        "## Text-to-Speech Conversion".to_string(),
        String::new(),
        format!("{} file(s) converted and uploaded.", results.len()),
        String::new(),
        "| Source | Voice | Characters | Audio |".to_string(),
        "|--------|-------|-----------:|-------|".to_string(),
    ];

    for r in results {
        lines.push(format!(
            "| {} | {} | {} | [{}]({}) |",
            r.source_file, r.voice_id, r.character_count, r.s3_key, r.s3_url
        ));
    }

    lines.join("\n")
}

/// Append the summary table to the GitHub job summary file when the
/// runner provides one. Missing or unwritable summary files only warn;
/// the conversion itself already succeeded.
pub fn append_job_summary(results: &[ConversionResult]) {
    let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") else {
        return;
    };
    append_summary_to(Path::new(&path), results);
}

fn append_summary_to(path: &Path, results: &[ConversionResult]) {
    match fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(mut file) => {
            if let Err(e) = writeln!(file, "{}\n", render_summary(results)) {
                warn!("Failed to write job summary: {e}");
            }
        }
        Err(e) => warn!("Failed to open job summary {}: {e}", path.display()),
    }
}

/// Post the summary table as a comment on the triggering pull request.
pub async fn post_pr_comment(
    repo: &str,
    pr_number: u64,
    token: &str,
    results: &[ConversionResult],
) -> Result<()> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client");

    let url = format!("https://api.github.com/repos/{repo}/issues/{pr_number}/comments");
    let resp = client
        .post(&url)
        .header("Authorization", format!("Bearer {token}"))
        .header("Accept", "application/vnd.github+json")
        .header("User-Agent", "polly-pipeline-rs")
        .json(&json!({ "body": render_summary(results) }))
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(PipelineError::Api {
            service: "GitHub",
            status: status.as_u16(),
            message,
        });
    }

    info!("Posted conversion summary to {repo}#{pr_number}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConversionResult {
        ConversionResult {
            source_file: "text/welcome.txt".into(),
            audio_file: "audio/welcome.mp3".into(),
            voice_id: "Joanna".into(),
            character_count: 42,
            s3_key: "audio/welcome.mp3".into(),
            s3_url: "https://b.s3.us-east-1.amazonaws.com/audio/welcome.mp3".into(),
        }
    }

    #[test]
    fn results_file_holds_one_entry_per_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversion-results.json");

        write_results(&path, &[sample(), sample()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ConversionResult> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].voice_id, "Joanna");
        assert_eq!(parsed[0].character_count, 42);
    }

    #[test]
    fn results_file_is_overwritten_each_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversion-results.json");

        write_results(&path, &[sample(), sample()]).unwrap();
        write_results(&path, &[sample()]).unwrap();

        let parsed: Vec<ConversionResult> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn summary_table_lists_every_result() {
        let summary = render_summary(&[sample()]);
        assert!(summary.contains("1 file(s) converted"));
        assert!(summary.contains("| text/welcome.txt | Joanna | 42 |"));
        assert!(summary.contains("(https://b.s3.us-east-1.amazonaws.com/audio/welcome.mp3)"));
    }

    #[test]
    fn job_summary_appends_rather_than_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        std::fs::write(&path, "# Earlier step\n").unwrap();

        append_summary_to(&path, &[sample()]);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Earlier step"));
        assert!(content.contains("## Text-to-Speech Conversion"));
    }
}
