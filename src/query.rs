// Category and date-window selection feeding both analytics components.
use chrono::NaiveDate;

use crate::model::{Observation, QueryError};

/// Sorted distinct categories present in the history. Rows that carry
/// no category are invisible here.
pub fn available_categories(history: &[Observation]) -> Vec<String> {
    let mut cats: Vec<String> = history
        .iter()
        .map(|o| o.category.clone())
        .filter(|c| !c.is_empty())
        .collect();
    cats.sort();
    cats.dedup();
    cats
}

/// Selects rows for one category within an inclusive UTC-day window.
///
/// A category with zero rows anywhere in the history is `UnknownCategory`
/// (with the valid alternatives); a category that exists but has no rows
/// inside the window is `EmptyResultSet`.
pub fn select(
    history: &[Observation],
    category: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Observation>, QueryError> {
    let mut rows: Vec<Observation> = history
        .iter()
        .filter(|o| o.category == category)
        .cloned()
        .collect();

    if rows.is_empty() {
        return Err(QueryError::UnknownCategory {
            category: category.to_string(),
            available: available_categories(history),
        });
    }

    if let Some(start) = start {
        rows.retain(|o| o.day() >= start);
    }
    if let Some(end) = end {
        rows.retain(|o| o.day() <= end);
    }

    if rows.is_empty() {
        return Err(QueryError::EmptyResultSet);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Availability;
    use chrono::{TimeZone, Utc};

    fn obs(category: &str, day: u32) -> Observation {
        Observation {
            category: category.into(),
            collected_at: Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap(),
            product_url: format!("/{category}/{day}"),
            product_name: "thing".into(),
            brand: "Unknown".into(),
            price: Some(100.0),
            rating_avg: None,
            rating_count: None,
            availability: Availability::Unknown,
            page: None,
            rank: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn selects_exact_category() {
        let history = vec![obs("GPU", 1), obs("SSD", 1), obs("GPU", 2)];
        let rows = select(&history, "GPU", None, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|o| o.category == "GPU"));
    }

    #[test]
    fn unknown_category_lists_alternatives() {
        // Querying GPU against a Monitor/SSD history.
        let history = vec![obs("Monitor", 1), obs("SSD", 1)];
        let err = select(&history, "GPU", None, None).unwrap_err();
        match err {
            QueryError::UnknownCategory {
                category,
                available,
            } => {
                assert_eq!(category, "GPU");
                assert_eq!(available, vec!["Monitor".to_string(), "SSD".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let history = vec![obs("GPU", 1), obs("GPU", 2), obs("GPU", 3), obs("GPU", 4)];
        let rows = select(&history, "GPU", Some(day(2)), Some(day(3))).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day(), day(2));
        assert_eq!(rows[1].day(), day(3));
    }

    #[test]
    fn open_ended_bounds() {
        let history = vec![obs("GPU", 1), obs("GPU", 2), obs("GPU", 3)];
        assert_eq!(
            select(&history, "GPU", Some(day(2)), None).unwrap().len(),
            2
        );
        assert_eq!(
            select(&history, "GPU", None, Some(day(2))).unwrap().len(),
            2
        );
    }

    #[test]
    fn empty_window_is_distinct_from_unknown_category() {
        let history = vec![obs("GPU", 1)];
        let err = select(&history, "GPU", Some(day(10)), None).unwrap_err();
        assert!(matches!(err, QueryError::EmptyResultSet));
    }
}
