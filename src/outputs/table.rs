//! CSV persistence for the raw and clean tables.
//!
//! Both tables share one column layout, [`COLUMNS`]. The header is written
//! explicitly so an empty table is still a readable, header-only file.
//!
//! Writes go to a hidden temporary file beside the target and are renamed
//! into place, so a reader never observes a half-written table.

use crate::error::TableError;
use crate::models::{CleanRecord, RawRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Column order of both persisted tables.
pub const COLUMNS: [&str; 6] = ["url", "url_title", "news_title", "year", "total_infected", "city"];

fn io_err(path: &Path, source: std::io::Error) -> TableError {
    TableError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_err(path: &Path, source: csv::Error) -> TableError {
    TableError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn write_rows<T: Serialize>(tmp: &Path, rows: &[T]) -> Result<(), TableError> {
    let file = File::create(tmp).map_err(|e| io_err(tmp, e))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    writer.write_record(COLUMNS).map_err(|e| csv_err(tmp, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| csv_err(tmp, e))?;
    }
    writer.flush().map_err(|e| io_err(tmp, e))
}

/// Write rows under the canonical header, replacing any existing file.
///
/// On failure the temporary file is removed and the previous table is left as it was.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), TableError> {
    let tmp = temp_path_for(path);
    let result = write_rows(&tmp, rows)
        .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| io_err(path, e)));
    if let Err(e) = &result {
        let _ = std::fs::remove_file(&tmp);
        warn!(error = %e, "Table write failed");
    } else {
        debug!("Table written");
    }
    result
}

fn read_table<T: DeserializeOwned>(path: &Path, builder: &csv::ReaderBuilder) -> Result<Vec<T>, TableError> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = builder.from_reader(file);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| csv_err(path, e))
}

/// Read the raw table. Missing columns and short rows read as empty strings.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_raw_table(path: &Path) -> Result<Vec<RawRecord>, TableError> {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true);
    let rows: Vec<RawRecord> = read_table(path, &builder)?;
    info!(rows = rows.len(), "Loaded raw table");
    Ok(rows)
}

pub fn write_raw_table(path: &Path, rows: &[RawRecord]) -> Result<(), TableError> {
    write_table(path, rows)
}

/// Read and re-validate the clean table; a non-integer year or count is an error.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn read_clean_table(path: &Path) -> Result<Vec<CleanRecord>, TableError> {
    let mut builder = csv::ReaderBuilder::new();
    builder.trim(csv::Trim::Fields);
    read_table(path, &builder)
}

pub fn write_clean_table(path: &Path, rows: &[CleanRecord]) -> Result<(), TableError> {
    write_table(path, rows)
}
