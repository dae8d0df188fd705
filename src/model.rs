// Core structs: Observation, DailyStat, DropRecord
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::{de_loose_f64, de_loose_u64};

/// One product observation as delivered by the external collector.
/// Everything is optional and loosely typed; the normalizer decides
/// what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawObservation {
    pub category: Option<String>,
    pub collected_at: Option<String>,
    pub product_url: Option<String>,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "de_loose_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "de_loose_f64")]
    pub rating_avg: Option<f64>,
    #[serde(default, deserialize_with = "de_loose_u64")]
    pub rating_count: Option<u64>,
    pub availability: Option<String>,
    #[serde(default, deserialize_with = "de_loose_u64")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "de_loose_u64")]
    pub rank: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Availability {
    #[serde(rename = "In stock")]
    InStock,
    #[serde(rename = "Out of stock")]
    OutOfStock,
    #[default]
    Unknown,
}

impl Availability {
    pub fn parse(text: &str) -> Self {
        let t = text.trim().to_lowercase();
        if t == "in stock" {
            Availability::InStock
        } else if t == "out of stock" || t == "sold out" {
            Availability::OutOfStock
        } else {
            Availability::Unknown
        }
    }
}

/// Canonical observation: one product's state at one collection instant.
/// (product_url, collected_at) is the composite identity key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub category: String,
    pub collected_at: DateTime<Utc>,
    pub product_url: String,
    pub product_name: String,
    pub brand: String,
    pub price: Option<f64>,
    pub rating_avg: Option<f64>,
    pub rating_count: Option<u64>,
    pub availability: Availability,
    pub page: Option<u64>,
    pub rank: Option<u64>,
}

impl Observation {
    /// UTC calendar day of the collection instant.
    pub fn day(&self) -> NaiveDate {
        self.collected_at.date_naive()
    }

    /// True when the row carries a usable price (> 0).
    pub fn has_price(&self) -> bool {
        matches!(self.price, Some(p) if p > 0.0)
    }
}

/// Per-day summary for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStat {
    pub day: NaiveDate,
    pub avg_price: f64,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub products_count: usize,
    pub observations: usize,
    pub avg_price_ma7: f64,
}

/// First-vs-last price comparison for one product within a query window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropRecord {
    pub product_name: String,
    pub product_url: String,
    pub day_first: NaiveDate,
    pub price_first: f64,
    pub day_last: NaiveDate,
    pub price_last: f64,
    pub drop_abs: f64,
    pub drop_pct: f64,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("malformed or missing collection timestamp: {0:?}")]
    MalformedTimestamp(Option<String>),
    #[error("missing product URL")]
    MissingIdentity,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("batch file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("batch is not a JSON array of records: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("history storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("required column '{0}' missing from history header")]
    MissingRequiredColumn(String),
    #[error("malformed history file: {0}")]
    Malformed(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no rows for category '{category}'; available categories: {available:?}")]
    UnknownCategory {
        category: String,
        available: Vec<String>,
    },
    #[error("no rows left after date filtering; widen the window")]
    EmptyResultSet,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file invalid: {0}")]
    Json(#[from] serde_json::Error),
}
