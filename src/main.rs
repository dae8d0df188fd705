mod analyzer;
mod config;
mod history;
mod model;
mod normalizer;
mod query;
mod report;
mod source;
mod utils;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use analyzer::{daily_stats, rank_drops};
use config::{AppConfig, load_config};
use history::{CsvHistoryStore, merge, retain_priced};
use normalizer::normalize_batch;
use query::select;
use report::{export_reports, format_daily_stats, format_top_drops};
use source::{JsonBatchSource, RecordSource};

const DEFAULT_CONFIG: &str = "pricewatch.json";

#[derive(Parser)]
#[command(
    name = "pricewatch",
    version,
    about = "Track product prices across collection runs and report daily stats and top drops"
)]
struct Cli {
    /// JSON config file; built-in defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a collected batch and merge it into the history file.
    Ingest {
        /// JSON array of raw observation records.
        #[arg(long)]
        batch: PathBuf,

        /// History CSV path (overrides config).
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Compute daily statistics and top price drops for one category.
    Report {
        /// Category, exact match (e.g. GPU, SSD, Monitor).
        #[arg(long)]
        category: String,

        /// Inclusive start day, YYYY-MM-DD.
        #[arg(long, value_parser = parse_day)]
        start: Option<NaiveDate>,

        /// Inclusive end day, YYYY-MM-DD.
        #[arg(long, value_parser = parse_day)]
        end: Option<NaiveDate>,

        /// How many drops to keep; non-positive keeps none.
        #[arg(long)]
        top: Option<i64>,

        /// Also write daily_stats_<category>.csv and top_drops_<category>.csv.
        #[arg(long)]
        export: bool,

        /// History CSV path (overrides config).
        #[arg(long)]
        history: Option<PathBuf>,
    },
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None if Path::new(DEFAULT_CONFIG).exists() => match load_config(DEFAULT_CONFIG) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Ingest { batch, history } => run_ingest(&config, &batch, history),
        Command::Report {
            category,
            start,
            end,
            top,
            export,
            history,
        } => run_report(&config, &category, start, end, top, export, history),
    }
}

/// Reads a raw batch, normalizes it, and merges the priced rows into
/// the history file. Per-record problems are logged and skipped; batch,
/// load, and persist failures are fatal.
fn run_ingest(config: &AppConfig, batch: &Path, history_override: Option<PathBuf>) -> ExitCode {
    let history_path = history_override.unwrap_or_else(|| config.history_csv.clone());
    let store = CsvHistoryStore::new(&history_path);

    info!("Reading batch from {}", batch.display());
    let raw = match JsonBatchSource::new(batch).collect() {
        Ok(raw) => raw,
        Err(e) => {
            error!("Batch read error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("Collected {} raw records", raw.len());

    let normalized = normalize_batch(&raw);
    for rejection in &normalized.rejections {
        warn!("Record {} rejected: {}", rejection.index, rejection.reason);
    }
    info!(
        "Accepted {} records, rejected {}",
        normalized.accepted.len(),
        normalized.rejections.len()
    );

    let (priced, unpriced) = retain_priced(normalized.accepted);
    if unpriced > 0 {
        info!("Dropped {} records without a usable price", unpriced);
    }
    if priced.is_empty() {
        warn!("Nothing to ingest; history left untouched");
        return ExitCode::SUCCESS;
    }

    let existing = match store.load() {
        Ok(history) => history,
        Err(e) => {
            error!("History load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let before = existing.len();
    let merged = merge(existing, priced);

    if let Err(e) = store.persist(&merged) {
        error!("History persist error: {}", e);
        return ExitCode::FAILURE;
    }
    info!(
        "📦 History now holds {} rows ({} new) in {}",
        merged.len(),
        merged.len() - before,
        history_path.display()
    );
    ExitCode::SUCCESS
}

/// Loads the history, filters it, and prints both report tables.
fn run_report(
    config: &AppConfig,
    category: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    top: Option<i64>,
    export: bool,
    history_override: Option<PathBuf>,
) -> ExitCode {
    let history_path = history_override.unwrap_or_else(|| config.history_csv.clone());
    let store = CsvHistoryStore::new(&history_path);

    let history = match store.load() {
        Ok(history) => history,
        Err(e) => {
            error!("History load error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if history.is_empty() {
        error!(
            "History {} is empty; ingest a batch first",
            history_path.display()
        );
        return ExitCode::FAILURE;
    }

    let rows = match select(&history, category, start, end) {
        Ok(rows) => rows,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("{} rows selected for category {}", rows.len(), category);

    let daily = daily_stats(&rows);
    let top_n = usize::try_from(top.unwrap_or(config.default_top_n as i64)).unwrap_or(0);
    let drops = rank_drops(&rows, top_n);

    println!("\n=== Daily statistics: {category} ===");
    print!("{}", format_daily_stats(&daily));
    println!("\n=== Top price drops: {category} ===");
    if drops.is_empty() {
        println!("No drops detected (often means a single collection day).");
    } else {
        print!("{}", format_top_drops(&drops));
    }

    if export {
        match export_reports(&config.export_dir, category, &daily, &drops) {
            Ok((daily_path, drops_path)) => {
                info!("✅ Export OK: {}", daily_path.display());
                info!("✅ Export OK: {}", drops_path.display());
            }
            Err(e) => {
                error!("Export error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
