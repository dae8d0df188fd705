// Per-day price statistics with a trailing moving average.
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::model::{DailyStat, Observation};

/// Aggregates the filtered set into one `DailyStat` per calendar day
/// present, ascending by day. Statistics run over priced rows only.
///
/// `avg_price_ma7` is a trailing mean over the current and up to six
/// preceding entries of the daily sequence. Days with no data are
/// absent from the sequence and contribute nothing.
pub fn daily_stats(rows: &[Observation]) -> Vec<DailyStat> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&Observation>> = BTreeMap::new();
    for obs in rows.iter().filter(|o| o.has_price()) {
        by_day.entry(obs.day()).or_default().push(obs);
    }

    let mut daily: Vec<DailyStat> = Vec::with_capacity(by_day.len());
    for (day, group) in by_day {
        let mut prices: Vec<f64> = group.iter().filter_map(|o| o.price).collect();
        prices.sort_by(f64::total_cmp);
        let products: HashSet<&str> = group.iter().map(|o| o.product_url.as_str()).collect();

        daily.push(DailyStat {
            day,
            avg_price: mean(&prices),
            median_price: median_sorted(&prices),
            min_price: prices[0],
            max_price: prices[prices.len() - 1],
            products_count: products.len(),
            observations: group.len(),
            avg_price_ma7: 0.0,
        });
    }

    let avgs: Vec<f64> = daily.iter().map(|d| d.avg_price).collect();
    for (i, stat) in daily.iter_mut().enumerate() {
        stat.avg_price_ma7 = mean(&avgs[i.saturating_sub(6)..=i]);
    }

    daily
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of an already sorted slice; an even count averages the two
/// middle values.
fn median_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
