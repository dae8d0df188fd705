// Raw record validation and coercion
use crate::model::{Availability, NormalizeError, Observation, RawObservation};
use crate::utils::parse_datetime;

/// Outcome of normalizing one batch: canonical records plus indexed
/// rejections, so accepted/rejected counts stay observable.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub accepted: Vec<Observation>,
    pub rejections: Vec<Rejection>,
}

#[derive(Debug)]
pub struct Rejection {
    pub index: usize,
    pub reason: NormalizeError,
}

pub fn normalize_batch(raw: &[RawObservation]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, record) in raw.iter().enumerate() {
        match normalize_record(record) {
            Ok(obs) => batch.accepted.push(obs),
            Err(reason) => batch.rejections.push(Rejection { index, reason }),
        }
    }
    batch
}

/// Validates and coerces one raw record. Pure: no logging, no I/O.
pub fn normalize_record(raw: &RawObservation) -> Result<Observation, NormalizeError> {
    let collected_at = raw
        .collected_at
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_datetime)
        .ok_or_else(|| NormalizeError::MalformedTimestamp(raw.collected_at.clone()))?;

    // The URL is the product identity; without it the row is untrackable.
    let product_url = trimmed(&raw.product_url).ok_or(NormalizeError::MissingIdentity)?;

    let price = raw.price.filter(|p| p.is_finite() && *p >= 0.0);
    let rating_avg = raw.rating_avg.filter(|r| (0.0..=5.0).contains(r));

    Ok(Observation {
        category: trimmed(&raw.category).unwrap_or_default(),
        collected_at,
        product_url,
        product_name: trimmed(&raw.product_name).unwrap_or_else(|| "Unknown".to_string()),
        brand: trimmed(&raw.brand).unwrap_or_else(|| "Unknown".to_string()),
        price,
        rating_avg,
        rating_count: raw.rating_count,
        availability: raw
            .availability
            .as_deref()
            .map(Availability::parse)
            .unwrap_or_default(),
        page: raw.page.filter(|p| *p > 0),
        rank: raw.rank.filter(|r| *r > 0),
    })
}

fn trimmed(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
