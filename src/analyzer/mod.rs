// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod daily_stats;
pub mod top_drops;

pub use daily_stats::daily_stats;
pub use top_drops::rank_drops;
