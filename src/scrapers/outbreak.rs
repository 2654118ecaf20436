//! Outbreak article scraper.
//!
//! Turns an arbitrary news page into a flat [`RawRecord`] using text
//! heuristics. Nothing here fails on page content: a missing title,
//! heading, year, count, or city becomes an empty string.
//!
//! # Heuristics
//!
//! | Field | Rule |
//! |-------|------|
//! | `url_title` | trimmed `<title>` text |
//! | `news_title` | first non-empty `<h1>`, else `url_title` |
//! | `year` | first `19xx`/`20xx` token in the page text |
//! | `total_infected` | first number followed by case/cases/infected/patient(s) |
//! | `city` | first [`GAZETTEER`] entry, in list order, found as a whole word |
//!
//! The year and count rules live in [`EXTRACTION_RULES`] and are applied
//! in order; the first rule that matches a field sets it.

use crate::error::{ScrapeError, TableError};
use crate::models::{BatchReport, RawRecord, UrlFailure};
use crate::outputs::table::write_raw_table;
use crate::scrapers::fetch::FetchPage;
use crate::utils::truncate_for_log;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use tracing::{debug, error, info, instrument};

/// Known city names, in precedence order.
///
/// The first entry that occurs anywhere in the text wins, regardless of
/// where in the text it occurs. "Manila" beats "Pasig" even when "Pasig"
/// appears first in the article. Matching is case-sensitive and whole-word.
pub const GAZETTEER: &[&str] = &[
    "Manila",
    "Quezon City",
    "Cebu City",
    "Davao City",
    "Zamboanga City",
    "Taguig",
    "Pasig",
    "Caloocan",
    "Makati",
    "Pasay",
    "Baguio",
    "Iloilo City",
    "Cagayan de Oro",
    "Bacolod",
    "Mandaluyong",
];

/// Elements whose text is never visible on the rendered page.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line of text. Inline elements (a, b, span, sup, ...)
/// are concatenated with their neighbours without a separator.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "caption", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "title", "tr", "ul",
];

/// Record field a text rule fills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    TotalInfected,
}

/// A regex over the page text plus how to turn its match into a field value.
#[derive(Debug)]
pub struct ExtractionRule {
    pub field: Field,
    pub pattern: &'static str,
    /// Capture group holding the value.
    pub group: usize,
    pub post: fn(&str) -> String,
}

fn keep(s: &str) -> String {
    s.to_string()
}

fn strip_thousands(s: &str) -> String {
    s.replace(',', "")
}

pub const EXTRACTION_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        field: Field::Year,
        pattern: r"\b((?:19|20)\d{2})\b",
        group: 1,
        post: keep,
    },
    ExtractionRule {
        field: Field::TotalInfected,
        pattern: r"(?i)(\d[\d,]*)\s+(?:cases?|infected|patients?)\b",
        group: 1,
        post: strip_thousands,
    },
];

static COMPILED_RULES: Lazy<Vec<(&'static ExtractionRule, Regex)>> = Lazy::new(|| {
    EXTRACTION_RULES
        .iter()
        .map(|rule| (rule, Regex::new(rule.pattern).unwrap()))
        .collect()
});

static GAZETTEER_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    GAZETTEER
        .iter()
        .map(|city| (*city, Regex::new(&format!(r"\b{}\b", regex::escape(city))).unwrap()))
        .collect()
});

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static H1_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());

/// The parts of a parsed page the heuristics look at.
#[derive(Debug, Default)]
pub struct PageView {
    pub title: Option<String>,
    pub heading: Option<String>,
    /// Visible text with whitespace collapsed; block boundaries become spaces.
    pub text: String,
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if HIDDEN_ELEMENTS.contains(&name) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push(' ');
            }
            push_visible_text(child_el, out);
            if block {
                out.push(' ');
            }
        }
    }
}

impl PageView {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string());

        let heading = document
            .select(&H1_SELECTOR)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()));

        let mut raw_text = String::new();
        push_visible_text(document.root_element(), &mut raw_text);
        let text = collapse_whitespace(&raw_text);

        Self { title, heading, text }
    }
}

/// Apply the rules for `field` in order; the first match wins.
pub fn extract_field(field: Field, text: &str) -> String {
    COMPILED_RULES
        .iter()
        .filter(|(rule, _)| rule.field == field)
        .find_map(|(rule, re)| {
            re.captures(text)
                .and_then(|caps| caps.get(rule.group))
                .map(|m| (rule.post)(m.as_str()))
        })
        .unwrap_or_default()
}

/// First gazetteer city, in list order, that occurs in `text`.
pub fn find_city(text: &str) -> Option<&'static str> {
    GAZETTEER_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(city, _)| *city)
}

/// Build a record from an already-fetched HTML document.
pub fn extract_record(url: &str, html: &str) -> RawRecord {
    let page = PageView::parse(html);

    let url_title = page.title.unwrap_or_default();
    let news_title = page
        .heading
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| url_title.clone());

    RawRecord {
        url: url.to_string(),
        url_title,
        news_title,
        year: extract_field(Field::Year, &page.text),
        total_infected: extract_field(Field::TotalInfected, &page.text),
        city: find_city(&page.text).unwrap_or_default().to_string(),
    }
}

/// Fetch one article and extract its record.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn scrape_article<F: FetchPage>(fetcher: &F, url: &str) -> Result<RawRecord, ScrapeError> {
    let html = fetcher.fetch_page(url).await?;
    let record = extract_record(url, &html);
    info!(
        news_title = %truncate_for_log(&record.news_title, 120),
        year = %record.year,
        total_infected = %record.total_infected,
        city = %record.city,
        "Extracted outbreak record"
    );
    Ok(record)
}

/// Scrape `urls` in order, rewriting the raw table after every URL.
///
/// A URL that fails to fetch is recorded in the report and skipped; it
/// never stops the rest of the batch. Only a failure to write the raw
/// table aborts the run. Records already written stay on disk.
#[instrument(level = "info", skip_all, fields(urls = urls.len(), raw_table = %raw_path.display()))]
pub async fn scrape_batch<F: FetchPage>(
    fetcher: &F,
    urls: &[String],
    raw_path: &Path,
) -> Result<BatchReport, TableError> {
    let started_at = Utc::now();
    let mut records: Vec<RawRecord> = Vec::with_capacity(urls.len());
    let mut failures = Vec::new();

    if urls.is_empty() {
        write_raw_table(raw_path, &records)?;
    }

    for (i, url) in urls.iter().enumerate() {
        match scrape_article(fetcher, url).await {
            Ok(record) => records.push(record),
            Err(e) => {
                error!(index = i, %url, error = %e, "Scrape failed; continuing with next URL");
                failures.push(UrlFailure {
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
        write_raw_table(raw_path, &records)?;
        debug!(index = i, rows = records.len(), "Raw table flushed");
    }

    let report = BatchReport {
        started_at,
        finished_at: Utc::now(),
        attempted: urls.len(),
        succeeded: records.len(),
        failures,
    };
    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed(),
        "Scrape batch complete"
    );
    Ok(report)
}
