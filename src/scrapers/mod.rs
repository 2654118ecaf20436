//! Outbreak news scraping.
//!
//! Scraping is split along the network boundary:
//!
//! - [`fetch`]: the [`fetch::FetchPage`] seam and its `reqwest` implementation
//! - [`outbreak`]: the text heuristics and the sequential batch driver
//!
//! # Common Patterns
//!
//! - One request per URL, no retries, a per-request timeout
//! - A failed URL is logged, reported, and skipped
//! - Absent page signals degrade to empty strings, never errors

pub mod fetch;
pub mod outbreak;
