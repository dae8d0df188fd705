// History module: pure merge plus the CSV persistence boundary.

pub mod csv_store;

pub use csv_store::CsvHistoryStore;

use std::cmp::Ordering;

use crate::model::Observation;

/// Merges a new batch into the existing history.
///
/// Pure set union on the composite key (product_url, collected_at):
/// concatenate, stable-sort by key, then collapse equal-key runs keeping
/// the last-inserted record. Re-merging the same batch is a no-op.
pub fn merge(existing: Vec<Observation>, batch: Vec<Observation>) -> Vec<Observation> {
    let mut all = existing;
    all.extend(batch);
    all.sort_by(compare_key); // stable: insertion order survives within a key
    let mut merged: Vec<Observation> = Vec::with_capacity(all.len());
    for obs in all {
        match merged.last_mut() {
            Some(prev) if compare_key(prev, &obs) == Ordering::Equal => *prev = obs,
            _ => merged.push(obs),
        }
    }
    merged
}

fn compare_key(a: &Observation, b: &Observation) -> Ordering {
    a.product_url
        .cmp(&b.product_url)
        .then(a.collected_at.cmp(&b.collected_at))
}

/// Keeps only rows usable for price analytics, the same shape the
/// reference history holds. Returns the kept rows and the dropped count.
pub fn retain_priced(batch: Vec<Observation>) -> (Vec<Observation>, usize) {
    let before = batch.len();
    let priced: Vec<Observation> = batch.into_iter().filter(Observation::has_price).collect();
    let dropped = before - priced.len();
    (priced, dropped)
}
