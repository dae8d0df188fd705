// First-vs-last price-drop ranking per product.
use std::collections::{HashMap, HashSet};

use crate::model::{DropRecord, Observation};

/// Ranks the steepest first-vs-last price decreases per product within
/// the filtered set, at most `top_n` records.
///
/// First and last are positional by collection time, never extremal by
/// price: an intermediate spike below the last price is not reported.
/// Only strictly positive drops qualify; increases and no-change rows
/// are a different report.
pub fn rank_drops(rows: &[Observation], top_n: usize) -> Vec<DropRecord> {
    if top_n == 0 {
        return Vec::new();
    }

    let priced: Vec<&Observation> = rows.iter().filter(|o| o.price.is_some()).collect();

    // A single collection day cannot show a drop.
    let days: HashSet<_> = priced.iter().map(|o| o.day()).collect();
    if days.len() < 2 {
        return Vec::new();
    }

    let mut span: HashMap<&str, (&Observation, &Observation)> = HashMap::new();
    for &obs in &priced {
        let entry = span.entry(obs.product_url.as_str()).or_insert((obs, obs));
        if obs.collected_at < entry.0.collected_at {
            entry.0 = obs;
        }
        if obs.collected_at >= entry.1.collected_at {
            entry.1 = obs;
        }
    }

    let mut drops: Vec<DropRecord> = Vec::new();
    for (url, (first, last)) in span {
        let (Some(price_first), Some(price_last)) = (first.price, last.price) else {
            continue;
        };
        if price_first <= 0.0 {
            continue; // percentage undefined at a zero baseline
        }
        let drop_abs = price_first - price_last;
        if drop_abs <= 0.0 {
            continue;
        }
        drops.push(DropRecord {
            product_name: first.product_name.clone(),
            product_url: url.to_string(),
            day_first: first.day(),
            price_first,
            day_last: last.day(),
            price_last,
            drop_abs,
            drop_pct: drop_abs / price_first * 100.0,
        });
    }

    drops.sort_by(|a, b| {
        b.drop_pct
            .total_cmp(&a.drop_pct)
            .then(b.drop_abs.total_cmp(&a.drop_abs))
            .then_with(|| a.product_url.cmp(&b.product_url))
    });
    drops.truncate(top_n);
    drops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Availability;
    use chrono::{TimeZone, Utc};

    fn obs(url: &str, day: u32, price: f64) -> Observation {
        Observation {
            category: "GPU".into(),
            collected_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            product_url: url.into(),
            product_name: format!("product {url}"),
            brand: "Unknown".into(),
            price: Some(price),
            rating_avg: None,
            rating_count: None,
            availability: Availability::Unknown,
            page: None,
            rank: None,
        }
    }

    #[test]
    fn reports_a_simple_drop() {
        // 100 on day 1, 80 on day 2.
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 80.0)];
        let drops = rank_drops(&rows, 5);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].drop_abs, 20.0);
        assert_eq!(drops[0].drop_pct, 20.0);
        assert_eq!(drops[0].price_first, 100.0);
        assert_eq!(drops[0].price_last, 80.0);
    }

    #[test]
    fn increases_are_excluded() {
        // The price went up.
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 120.0)];
        assert!(rank_drops(&rows, 5).is_empty());
    }

    #[test]
    fn unchanged_prices_are_excluded() {
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 100.0)];
        assert!(rank_drops(&rows, 5).is_empty());
    }

    #[test]
    fn single_day_yields_empty() {
        let rows = vec![obs("/a", 1, 100.0), obs("/b", 1, 50.0), obs("/a", 1, 90.0)];
        assert!(rank_drops(&rows, 100).is_empty());
    }

    #[test]
    fn zero_top_n_yields_empty() {
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 80.0)];
        assert!(rank_drops(&rows, 0).is_empty());
    }

    #[test]
    fn first_and_last_are_positional_not_extremal() {
        // The day-2 dip never shows; first=100, last=90.
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 40.0), obs("/a", 3, 90.0)];
        let drops = rank_drops(&rows, 5);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].drop_abs, 10.0);
        assert_eq!(drops[0].price_last, 90.0);
    }

    #[test]
    fn zero_baseline_rows_are_excluded() {
        let rows = vec![obs("/a", 1, 0.0), obs("/a", 2, 0.0), obs("/b", 1, 50.0), obs("/b", 2, 25.0)];
        let drops = rank_drops(&rows, 5);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].product_url, "/b");
    }

    #[test]
    fn ranking_is_monotone_and_truncated() {
        let rows = vec![
            obs("/a", 1, 100.0),
            obs("/a", 2, 90.0), // 10%
            obs("/b", 1, 100.0),
            obs("/b", 2, 50.0), // 50%
            obs("/c", 1, 100.0),
            obs("/c", 2, 75.0), // 25%
        ];
        let drops = rank_drops(&rows, 2);
        assert_eq!(drops.len(), 2);
        assert_eq!(drops[0].product_url, "/b");
        assert_eq!(drops[1].product_url, "/c");
        for pair in drops.windows(2) {
            assert!(pair[0].drop_pct >= pair[1].drop_pct);
        }
    }

    #[test]
    fn ties_break_by_abs_then_url() {
        let rows = vec![
            // Both 50%; /big has the larger absolute drop.
            obs("/big", 1, 200.0),
            obs("/big", 2, 100.0),
            obs("/small", 1, 100.0),
            obs("/small", 2, 50.0),
            // Identical pct and abs as /small: url decides.
            obs("/also-small", 1, 100.0),
            obs("/also-small", 2, 50.0),
        ];
        let drops = rank_drops(&rows, 5);
        let urls: Vec<&str> = drops.iter().map(|d| d.product_url.as_str()).collect();
        assert_eq!(urls, vec!["/big", "/also-small", "/small"]);
    }

    #[test]
    fn products_without_two_observations_still_rank_via_first_equals_last() {
        // One observation: first == last, drop 0, excluded.
        let rows = vec![obs("/a", 1, 100.0), obs("/a", 2, 80.0), obs("/once", 1, 30.0)];
        let drops = rank_drops(&rows, 5);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].product_url, "/a");
    }
}
