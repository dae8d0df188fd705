// Flat-file history persistence (CSV, UTF-8 with BOM)
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::history::retain_priced;
use crate::model::{Observation, RawObservation, StorageError};
use crate::normalizer::normalize_batch;

const BOM: &str = "\u{feff}";

/// Logical columns the history schema cannot do without.
const REQUIRED_COLUMNS: [&str; 5] = [
    "category",
    "collected_at",
    "product_url",
    "product_name",
    "price",
];

/// History store backed by one CSV file. Load and persist are the only
/// stateful boundary calls; everything between them is pure.
pub struct CsvHistoryStore {
    path: PathBuf,
}

impl CsvHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the full history. A missing or empty file is an empty
    /// history; a header lacking a required column is fatal. Rows are
    /// re-validated through the normalizer, so a damaged row degrades
    /// that row only, not the whole load.
    pub fn load(&self) -> Result<Vec<Observation>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        let content = content.strip_prefix(BOM).unwrap_or(&content);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        for required in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == required) {
                return Err(StorageError::MissingRequiredColumn(required.to_string()));
            }
        }

        let mut raw_rows: Vec<RawObservation> = Vec::new();
        let mut unreadable = 0usize;
        for row in reader.deserialize() {
            match row {
                Ok(raw) => raw_rows.push(raw),
                Err(e) => {
                    unreadable += 1;
                    warn!("Skipping unreadable history row: {}", e);
                }
            }
        }
        if unreadable > 0 {
            warn!("{} history rows could not be read", unreadable);
        }

        let batch = normalize_batch(&raw_rows);
        if !batch.rejections.is_empty() {
            warn!(
                "{} history rows failed validation on load",
                batch.rejections.len()
            );
        }
        let (rows, unpriced) = retain_priced(batch.accepted);
        if unpriced > 0 {
            warn!("{} unpriced history rows dropped on load", unpriced);
        }
        Ok(rows)
    }

    /// Rewrites the history file. I/O failure is surfaced immediately;
    /// retrying is the caller's policy, not ours.
    pub fn persist(&self, history: &[Observation]) -> Result<(), StorageError> {
        write_csv(&self.path, history)
    }
}

/// Writes rows as a BOM-prefixed UTF-8 CSV with a header row derived
/// from the record's field names. Shared by the history store and the
/// report exports.
pub fn write_csv<S: Serialize>(path: &Path, rows: &[S]) -> Result<(), StorageError> {
    let mut file = fs::File::create(path)?;
    file.write_all(BOM.as_bytes())?;
    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(StorageError::Unavailable)?;
    Ok(())
}
