// Report rendering and CSV export.
use std::path::{Path, PathBuf};

use crate::history::csv_store::write_csv;
use crate::model::{DailyStat, DropRecord, StorageError};
use crate::utils::category_slug;

/// How many trailing daily rows the console preview shows; the CSV
/// export always carries the full table.
pub const DAILY_PREVIEW_ROWS: usize = 15;

/// Renders the tail of the daily table as aligned text.
pub fn format_daily_stats(daily: &[DailyStat]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>9} {:>12} {:>14}\n",
        "day", "avg", "median", "min", "max", "products", "observations", "avg_ma7"
    ));
    let skip = daily.len().saturating_sub(DAILY_PREVIEW_ROWS);
    for stat in &daily[skip..] {
        out.push_str(&format!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>9} {:>12} {:>14.2}\n",
            stat.day.to_string(),
            stat.avg_price,
            stat.median_price,
            stat.min_price,
            stat.max_price,
            stat.products_count,
            stat.observations,
            stat.avg_price_ma7,
        ));
    }
    if skip > 0 {
        out.push_str(&format!("({} earlier days in the export)\n", skip));
    }
    out
}

/// Renders the ranked drops as aligned text.
pub fn format_top_drops(drops: &[DropRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<40} {:>10} {:>10} {:>10} {:>9} {:>12} {:>12}\n",
        "product", "first", "last", "drop", "drop %", "first day", "last day"
    ));
    for d in drops {
        let mut name = d.product_name.clone();
        if name.chars().count() > 40 {
            name = name.chars().take(37).collect::<String>() + "...";
        }
        out.push_str(&format!(
            "{:<40} {:>10.2} {:>10.2} {:>10.2} {:>8.1}% {:>12} {:>12}\n",
            name,
            d.price_first,
            d.price_last,
            d.drop_abs,
            d.drop_pct,
            d.day_first.to_string(),
            d.day_last.to_string(),
        ));
    }
    out
}

pub fn daily_stats_export_path(dir: &Path, category: &str) -> PathBuf {
    dir.join(format!("daily_stats_{}.csv", category_slug(category)))
}

pub fn top_drops_export_path(dir: &Path, category: &str) -> PathBuf {
    dir.join(format!("top_drops_{}.csv", category_slug(category)))
}

/// Exports both report tables in the same flat format as the history.
pub fn export_reports(
    dir: &Path,
    category: &str,
    daily: &[DailyStat],
    drops: &[DropRecord],
) -> Result<(PathBuf, PathBuf), StorageError> {
    let daily_path = daily_stats_export_path(dir, category);
    let drops_path = top_drops_export_path(dir, category);
    write_csv(&daily_path, daily)?;
    write_csv(&drops_path, drops)?;
    Ok((daily_path, drops_path))
}
