//! Scrape batch configuration loaded from YAML.
//!
//! ```yaml
//! urls:
//!   - https://example.com/news/dengue-outbreak
//! timeout_secs: 20
//! user_agent: outbreak_news/0.1
//! ```
//!
//! Every field is optional; omitted fields fall back to [`ScrapeConfig::default`].

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Articles scraped when neither `--url` nor a config file names any.
pub const DEFAULT_URLS: &[&str] = &[
    "https://quezoncity.gov.ph/quezon-city-leads-fight-against-hiv-aids-amid-national-surge-in-cases/",
];

/// Settings for one extractor batch run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Ordered list of article URLs to scrape.
    pub urls: Vec<String>,
    /// Per-request timeout; expiry counts as a fetch failure for that URL.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_URLS.iter().map(|u| u.to_string()).collect(),
            timeout_secs: 30,
            user_agent: format!("outbreak_news/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScrapeConfig {
    /// Load a config file. A missing or malformed file is an error.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
        info!(urls = config.urls.len(), timeout_secs = config.timeout_secs, "Loaded scrape config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
