//! Normalization of the raw scrape table into the clean table.
//!
//! Steps, in order:
//! 1. Trim `url`, `url_title`, `news_title`, `city`
//! 2. Drop exact-duplicate rows, keeping the first
//! 3. Drop rows with an empty `year`, `total_infected`, or `city`
//! 4. Parse `year` and `total_infected` leniently as integers
//! 5. Drop rows where either parse failed
//! 6. Emit columns in table order
//!
//! Rows are dropped, never defaulted. Drops at each step are counted in
//! [`CleanStats`] and logged, so a shrinking table is visible.

use crate::error::TableError;
use crate::models::{CleanRecord, RawRecord};
use crate::outputs::table::{read_raw_table, write_clean_table};
use itertools::Itertools;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Row counts through one normalizer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    pub input: usize,
    /// Exact duplicates removed in step 2.
    pub duplicates: usize,
    /// Rows missing year, count, or city in step 3.
    pub missing_required: usize,
    /// Rows whose year or count was not an integer in step 5.
    pub unparseable: usize,
    pub output: usize,
}

/// Parse an integer the way a lenient numeric coercion would.
///
/// Accepts surrounding whitespace, thousands commas, a leading sign, and an
/// integral float spelling such as `2020.0`. Anything else is `None`.
pub fn parse_lenient_int(value: &str) -> Option<i64> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    let f = cleaned.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn trim_text_fields(mut row: RawRecord) -> RawRecord {
    row.url = row.url.trim().to_string();
    row.url_title = row.url_title.trim().to_string();
    row.news_title = row.news_title.trim().to_string();
    row.city = row.city.trim().to_string();
    row
}

fn has_required(row: &RawRecord) -> bool {
    !row.year.trim().is_empty() && !row.total_infected.trim().is_empty() && !row.city.is_empty()
}

fn coerce(row: RawRecord) -> Option<CleanRecord> {
    let year = parse_lenient_int(&row.year);
    let total_infected = parse_lenient_int(&row.total_infected);
    match (year, total_infected) {
        (Some(year), Some(total_infected)) => Some(CleanRecord {
            url: row.url,
            url_title: row.url_title,
            news_title: row.news_title,
            year,
            total_infected,
            city: row.city,
        }),
        _ => {
            debug!(url = %row.url, year = %row.year, total_infected = %row.total_infected, "Dropping row with non-integer fields");
            None
        }
    }
}

/// Run steps 1-6 over an in-memory raw table.
pub fn normalize(rows: Vec<RawRecord>) -> (Vec<CleanRecord>, CleanStats) {
    let mut stats = CleanStats {
        input: rows.len(),
        ..CleanStats::default()
    };

    let unique: Vec<RawRecord> = rows.into_iter().map(trim_text_fields).unique().collect();
    stats.duplicates = stats.input - unique.len();

    let complete: Vec<RawRecord> = unique.into_iter().filter(has_required).collect();
    stats.missing_required = stats.input - stats.duplicates - complete.len();

    let before_parse = complete.len();
    let clean: Vec<CleanRecord> = complete.into_iter().filter_map(coerce).collect();
    stats.unparseable = before_parse - clean.len();
    stats.output = clean.len();

    (clean, stats)
}

/// Rebuild the clean table from whatever raw table is on disk.
#[instrument(level = "info", skip_all, fields(raw = %raw_path.display(), clean = %clean_path.display()))]
pub fn clean_table(raw_path: &Path, clean_path: &Path) -> Result<CleanStats, TableError> {
    let raw = read_raw_table(raw_path)?;
    let (clean, stats) = normalize(raw);

    if stats.missing_required + stats.unparseable > 0 {
        warn!(
            missing_required = stats.missing_required,
            unparseable = stats.unparseable,
            "Dropped invalid rows"
        );
    }
    info!(
        input = stats.input,
        duplicates = stats.duplicates,
        missing_required = stats.missing_required,
        unparseable = stats.unparseable,
        output = stats.output,
        "Normalized raw table"
    );

    write_clean_table(clean_path, &clean)?;
    for row in &clean {
        debug!(url = %row.url, year = row.year, total_infected = row.total_infected, city = %row.city, "Clean row");
    }
    info!(path = %clean_path.display(), rows = clean.len(), "Clean table saved");
    Ok(stats)
}
