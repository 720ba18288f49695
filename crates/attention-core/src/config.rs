use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Default ticker universe: the 2014-2019 retail-attention study names.
pub const DEFAULT_TICKERS: &[&str] = &[
    "TSLA", "NVDA", "AAPL", "MSFT", "AMZN", "GOOGL", "NFLX", "ADBE", "NKE", "SBUX", "INTC",
    "TTWO", "QCOM", "GME", "EBAY",
];

/// Tunables for the whole pipeline. Every constant the algorithms depend on
/// lives here rather than at a call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Weekly score at or above which a week counts as a spike.
    pub threshold: u32,
    /// Minimum calendar days between consecutive anchors of one ticker.
    pub min_spacing_days: i64,
    /// Maximum trading days in a window.
    pub window_length: usize,
    /// Calendar days before the anchor week start at which the window begins.
    pub window_offset_days: i64,
    pub benchmark: String,
    pub tickers: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
    pub output_root: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 85,
            min_spacing_days: 21,
            window_length: 15,
            window_offset_days: 7,
            benchmark: "SPY".to_string(),
            tickers: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
            start_year: 2014,
            end_year: 2019,
            output_root: PathBuf::from("data"),
        }
    }
}

impl PipelineConfig {
    pub fn years(&self) -> RangeInclusive<i32> {
        self.start_year..=self.end_year
    }
}
