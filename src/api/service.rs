//! Credential-gated access to the clean table.

use crate::error::QueryError;
use crate::models::Outbreak;
use crate::outputs::table::read_clean_table;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, instrument, warn};

/// Serves every row of the clean table to holders of the shared secret.
///
/// Holds no data between calls: each query re-reads the table.
#[derive(Clone)]
pub struct OutbreakService {
    clean_table: PathBuf,
    api_key: String,
}

impl OutbreakService {
    pub fn new(clean_table: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            clean_table: clean_table.into(),
            api_key: api_key.into(),
        }
    }

    pub fn authorize(&self, credential: Option<&str>) -> Result<(), QueryError> {
        match credential {
            Some(key) if key == self.api_key => Ok(()),
            Some(_) => {
                warn!("Rejected request with invalid API key");
                Err(QueryError::Unauthorized)
            }
            None => {
                warn!("Rejected request without API key");
                Err(QueryError::Unauthorized)
            }
        }
    }

    /// All outbreaks in table order, or an error if the caller is not
    /// authorized or the table cannot be read and validated.
    #[instrument(level = "debug", skip_all)]
    pub fn list_outbreaks(&self, credential: Option<&str>) -> Result<Vec<Outbreak>, QueryError> {
        self.authorize(credential)?;
        let rows = read_clean_table(&self.clean_table).map_err(|e| {
            error!(error = %e, "Failed to load clean table");
            QueryError::from(e)
        })?;
        Ok(rows.into_iter().map(Outbreak::from).collect())
    }

    pub fn clean_table(&self) -> &std::path::Path {
        &self.clean_table
    }
}

impl fmt::Debug for OutbreakService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutbreakService")
            .field("clean_table", &self.clean_table)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CleanRecord;
    use crate::outputs::table::write_clean_table;

    const KEY: &str = "clean-data-api";

    fn row(url: &str, city: &str) -> CleanRecord {
        CleanRecord {
            url: url.to_string(),
            url_title: "Title".to_string(),
            news_title: "Headline".to_string(),
            year: 2023,
            total_infected: 42,
            city: city.to_string(),
        }
    }

    #[test]
    fn test_valid_key_returns_rows_in_table_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_clean_table(&path, &[row("https://b.example", "Pasig"), row("https://a.example", "Manila")]).unwrap();
        let service = OutbreakService::new(&path, KEY);

        let outbreaks = service.list_outbreaks(Some(KEY)).unwrap();

        assert_eq!(outbreaks.len(), 2);
        assert_eq!(outbreaks[0].url, "https://b.example");
        assert_eq!(outbreaks[1].city, "Manila");
    }

    #[test]
    fn test_wrong_or_missing_key_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_clean_table(&path, &[row("https://a.example", "Manila")]).unwrap();
        let service = OutbreakService::new(&path, KEY);

        assert!(matches!(service.list_outbreaks(Some("nope")), Err(QueryError::Unauthorized)));
        assert!(matches!(service.list_outbreaks(Some("")), Err(QueryError::Unauthorized)));
        assert!(matches!(service.list_outbreaks(None), Err(QueryError::Unauthorized)));
    }

    #[test]
    fn test_key_comparison_is_exact() {
        let service = OutbreakService::new("unused.csv", KEY);
        assert!(service.authorize(Some(" clean-data-api")).is_err());
        assert!(service.authorize(Some("CLEAN-DATA-API")).is_err());
        assert!(service.authorize(Some(KEY)).is_ok());
    }

    #[test]
    fn test_unauthorized_checked_before_table_read() {
        let dir = tempfile::tempdir().unwrap();
        let service = OutbreakService::new(dir.path().join("absent.csv"), KEY);
        assert!(matches!(service.list_outbreaks(Some("bad")), Err(QueryError::Unauthorized)));
    }

    #[test]
    fn test_empty_table_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        write_clean_table(&path, &[]).unwrap();
        let service = OutbreakService::new(&path, KEY);

        assert!(service.list_outbreaks(Some(KEY)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_table_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let service = OutbreakService::new(dir.path().join("absent.csv"), KEY);
        assert!(matches!(service.list_outbreaks(Some(KEY)), Err(QueryError::DataUnavailable(_))));
    }

    #[test]
    fn test_malformed_row_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.csv");
        std::fs::write(
            &path,
            "url,url_title,news_title,year,total_infected,city\nhttps://a.example,T,N,2020,lots,Manila\n",
        )
        .unwrap();
        let service = OutbreakService::new(&path, KEY);

        assert!(matches!(service.list_outbreaks(Some(KEY)), Err(QueryError::DataUnavailable(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let service = OutbreakService::new("clean.csv", KEY);
        assert!(!format!("{service:?}").contains(KEY));
    }
}
