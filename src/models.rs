//! Data models for scraped, cleaned, and served outbreak records.
//!
//! Records move through the pipeline in one direction:
//! - [`RawRecord`]: heuristic output of the extractor, every field textual
//! - [`CleanRecord`]: validated, typed row written by the normalizer
//! - [`Outbreak`]: the JSON shape returned by `GET /outbreaks`
//!
//! [`BatchReport`] summarizes a single scrape run, including the URLs
//! that failed to fetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record as scraped from a single news article.
///
/// Absent signals are empty strings, never missing, so the raw table keeps
/// a stable column layout. `year` and `total_infected` are not validated
/// at this stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(default)]
pub struct RawRecord {
    /// The article URL this record was scraped from.
    pub url: String,
    /// Trimmed text of the document `<title>`.
    pub url_title: String,
    /// First `<h1>` text, or `url_title` when there is no usable heading.
    pub news_title: String,
    /// First four-digit year (1900-2099) found in the page text.
    pub year: String,
    /// Infection count with thousands separators removed.
    pub total_infected: String,
    /// First gazetteer city present in the page text.
    pub city: String,
}

/// A validated row of the clean table.
///
/// Column order matches the persisted layout: url, url_title, news_title,
/// year, total_infected, city.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct CleanRecord {
    pub url: String,
    pub url_title: String,
    pub news_title: String,
    pub year: i64,
    pub total_infected: i64,
    pub city: String,
}

/// An outbreak report as returned by the query API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Outbreak {
    pub url: String,
    pub url_title: String,
    pub news_title: String,
    pub year: i64,
    pub total_infected: i64,
    pub city: String,
}

impl From<CleanRecord> for Outbreak {
    fn from(row: CleanRecord) -> Self {
        Self {
            url: row.url,
            url_title: row.url_title,
            news_title: row.news_title,
            year: row.year,
            total_infected: row.total_infected,
            city: row.city,
        }
    }
}

impl From<&CleanRecord> for RawRecord {
    /// Re-stringify a clean row so it can be fed back through the normalizer.
    fn from(row: &CleanRecord) -> Self {
        Self {
            url: row.url.clone(),
            url_title: row.url_title.clone(),
            news_title: row.news_title.clone(),
            year: row.year.to_string(),
            total_infected: row.total_infected.to_string(),
            city: row.city.clone(),
        }
    }
}

/// A URL that could not be scraped during a batch run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UrlFailure {
    pub url: String,
    pub error: String,
}

/// Outcome of one extractor batch run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of URLs the run attempted.
    pub attempted: usize,
    /// Number of raw records written to the raw table.
    pub succeeded: usize,
    pub failures: Vec<UrlFailure>,
}

impl BatchReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_row() -> CleanRecord {
        CleanRecord {
            url: "https://example.com/dengue".to_string(),
            url_title: "Dengue update".to_string(),
            news_title: "Dengue cases rise".to_string(),
            year: 2024,
            total_infected: 1234,
            city: "Manila".to_string(),
        }
    }

    #[test]
    fn test_outbreak_from_clean_record() {
        let outbreak = Outbreak::from(clean_row());
        assert_eq!(outbreak.year, 2024);
        assert_eq!(outbreak.total_infected, 1234);
        assert_eq!(outbreak.city, "Manila");
    }

    #[test]
    fn test_outbreak_json_field_names() {
        let json = serde_json::to_value(Outbreak::from(clean_row())).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        for key in ["url", "url_title", "news_title", "year", "total_infected", "city"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(json["total_infected"], 1234);
    }

    #[test]
    fn test_raw_record_from_clean_record() {
        let raw = RawRecord::from(&clean_row());
        assert_eq!(raw.year, "2024");
        assert_eq!(raw.total_infected, "1234");
        assert_eq!(raw.news_title, "Dengue cases rise");
    }

    #[test]
    fn test_raw_record_defaults_to_empty_strings() {
        let raw: RawRecord = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(raw.url, "https://example.com");
        assert_eq!(raw.year, "");
        assert_eq!(raw.city, "");
    }

    #[test]
    fn test_batch_report_failed_count() {
        let now = Utc::now();
        let report = BatchReport {
            started_at: now,
            finished_at: now,
            attempted: 3,
            succeeded: 2,
            failures: vec![UrlFailure {
                url: "https://bad.example".to_string(),
                error: "timed out".to_string(),
            }],
        };
        assert_eq!(report.failed(), 1);
    }
}
