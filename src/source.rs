// Input boundary: raw observation batches from the external collector.
use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::warn;

use crate::model::{RawObservation, SourceError};

/// Seam for whatever produces raw observations (a page fetcher, a
/// fixture file). The pipeline only sees this trait.
pub trait RecordSource {
    fn collect(&self) -> Result<Vec<RawObservation>, SourceError>;
}

/// Reads a JSON array of raw observation objects, as handed over by the
/// page-fetching collaborator.
pub struct JsonBatchSource {
    path: PathBuf,
}

impl JsonBatchSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonBatchSource {
    /// An unreadable file or a non-array document is fatal; a single
    /// element of the wrong shape is skipped with a warning.
    fn collect(&self) -> Result<Vec<RawObservation>, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        let values: Vec<Value> = serde_json::from_str(content)?;

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<RawObservation>(value) {
                Ok(raw) => records.push(raw),
                Err(e) => warn!("Skipping batch element {}: {}", index, e),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_for(json: &str) -> (NamedTempFile, JsonBatchSource) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let source = JsonBatchSource::new(file.path());
        (file, source)
    }

    #[test]
    fn reads_an_array_of_records() {
        let (_file, src) = source_for(
            r#"[
                {"category": "GPU", "collected_at": "2026-01-22T10:00:00+00:00",
                 "product_url": "/p/1", "product_name": "RTX", "price": 499.99},
                {"category": "GPU", "collected_at": "2026-01-22T10:00:00+00:00",
                 "product_url": "/p/2", "product_name": "RX", "price": "389.99",
                 "rating_count": "12", "page": 1, "rank": 2}
            ]"#,
        );
        let records = src.collect().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, Some(499.99));
        assert_eq!(records[1].price, Some(389.99)); // numeric string coerces
        assert_eq!(records[1].rating_count, Some(12));
    }

    #[test]
    fn null_and_missing_fields_are_absent() {
        let (_file, src) = source_for(r#"[{"product_url": "/p/1", "price": null}]"#);
        let records = src.collect().unwrap();
        assert_eq!(records[0].price, None);
        assert_eq!(records[0].collected_at, None);
    }

    #[test]
    fn wrong_shaped_elements_are_skipped() {
        let (_file, src) = source_for(r#"[{"product_url": "/p/1"}, 42, "nope"]"#);
        let records = src.collect().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn a_non_array_document_is_fatal() {
        let (_file, src) = source_for(r#"{"product_url": "/p/1"}"#);
        assert!(matches!(src.collect(), Err(SourceError::Json(_))));
    }

    #[test]
    fn a_missing_file_is_fatal() {
        let src = JsonBatchSource::new("/definitely/not/here.json");
        assert!(matches!(src.collect(), Err(SourceError::Io(_))));
    }
}
