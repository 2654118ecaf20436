//! JSON output for scrape batch reports.
//!
//! The report lists which URLs were scraped and which failed, so a partial
//! run can be inspected and retried by hand.

use crate::models::BatchReport;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`BatchReport`] as pretty-printed JSON, creating parent directories.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(report: &BatchReport, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create report dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(attempted = report.attempted, failed = report.failed(), "Wrote batch report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UrlFailure;
    use chrono::Utc;

    #[tokio::test]
    async fn test_write_report_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let now = Utc::now();
        let report = BatchReport {
            started_at: now,
            finished_at: now,
            attempted: 2,
            succeeded: 1,
            failures: vec![UrlFailure {
                url: "https://down.example".to_string(),
                error: "connection refused".to_string(),
            }],
        };

        write_report(&report, &path).await.unwrap();

        let back: BatchReport = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.attempted, 2);
        assert_eq!(back.failures[0].url, "https://down.example");
    }
}
