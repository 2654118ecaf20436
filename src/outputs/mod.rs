//! Persisted outputs of the pipeline.
//!
//! # Submodules
//!
//! - [`table`]: CSV raw and clean tables
//! - [`json`]: JSON scrape batch reports
//!
//! # Output Structure
//!
//! ```text
//! scraped_outbreak.news.csv   # raw table, rewritten after every scraped URL
//! clean_data.csv              # clean table, rebuilt by every `clean` run
//! report.json                 # optional scrape batch report
//! ```

pub mod json;
pub mod table;
