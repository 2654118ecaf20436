//! Error types for each stage of the pipeline.
//!
//! Extraction never fails on page content; only fetching does. Rows that
//! fail validation in the normalizer are dropped and counted rather than
//! raised. What remains are the failures a caller has to act on.

use thiserror::Error;

/// Failure to obtain a page for a single URL.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to fetch `{url}`: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure reading or writing a persisted table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table `{path}`: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Failure loading the YAML scrape configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config `{path}`: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failure answering an outbreak query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid API key")]
    Unauthorized,

    #[error("outbreak data unavailable: {0}")]
    DataUnavailable(String),
}

impl From<TableError> for QueryError {
    fn from(e: TableError) -> Self {
        QueryError::DataUnavailable(e.to_string())
    }
}
