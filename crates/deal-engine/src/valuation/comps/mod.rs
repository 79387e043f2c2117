//! Comparable-sale ingestion: raw search payloads and CSV exports in, canonical
//! [`CompRecord`]s out.

mod normalizer;
mod parser;

use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use super::domain::CompRecord;

/// Status code reported when a search produced nothing usable.
pub const NO_COMPS_FOUND: &str = "NO_COMPS_FOUND";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestStatus {
    CompsFound,
    NoCompsFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompIngestion {
    pub status: IngestStatus,
    pub comps: Vec<CompRecord>,
}

impl CompIngestion {
    fn from_comps(comps: Vec<CompRecord>) -> Self {
        let status = if comps.is_empty() {
            IngestStatus::NoCompsFound
        } else {
            IngestStatus::CompsFound
        };
        Self { status, comps }
    }
}

/// Normalizes raw search entries, keeping search order and at most `max_comps`.
///
/// Non-object entries are skipped; everything else is coerced, including
/// zero-priced entries, which the quality validator deals with downstream.
pub fn normalize_comps(raw: &[Value], max_comps: usize) -> CompIngestion {
    let comps: Vec<CompRecord> = raw
        .iter()
        .filter_map(|entry| match entry.as_object() {
            Some(object) => Some(normalizer::normalize_entry(object)),
            None => {
                debug!(entry = %entry, "skipping non-object comp entry");
                None
            }
        })
        .take(max_comps)
        .collect();

    CompIngestion::from_comps(comps)
}

/// Folds a fallible comp search into an ingestion result.
///
/// A failed fetch is indistinguishable from an empty search: both route to the
/// fallback path and neither is surfaced as an error.
pub fn ingest_search<E: Display>(
    result: Result<Vec<Value>, E>,
    max_comps: usize,
) -> CompIngestion {
    match result {
        Ok(raw) => normalize_comps(&raw, max_comps),
        Err(err) => {
            warn!(error = %err, "comp search failed; treating as no comps found");
            CompIngestion::from_comps(Vec::new())
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompImportError {
    #[error("failed to read comp export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid comp CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Loads comps (typically operator-entered) from a CSV file or stream.
pub struct CompCsvImporter;

impl CompCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CompRecord>, CompImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CompRecord>, CompImportError> {
        Ok(parser::parse_records(reader)?)
    }
}
