use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One week of search-interest data for a ticker (score is the 0-100
/// relative-interest value for that week within its calendar year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyObservation {
    pub ticker: String,
    /// Week start date (Sunday).
    pub week_start: NaiveDate,
    pub score: u32,
    /// The upstream service marks the most recent week as partial.
    pub is_partial: bool,
}

/// A spike week retained after overlap resolution. Consecutive anchors of the
/// same ticker are guaranteed to be at least `min_spacing_days` apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeAnchor {
    pub ticker: String,
    pub week_start: NaiveDate,
    pub score: u32,
    pub is_partial: bool,
}

impl SpikeAnchor {
    pub fn year(&self) -> i32 {
        self.week_start.year()
    }
}

impl From<WeeklyObservation> for SpikeAnchor {
    fn from(obs: WeeklyObservation) -> Self {
        Self {
            ticker: obs.ticker,
            week_start: obs.week_start,
            score: obs.score,
            is_partial: obs.is_partial,
        }
    }
}

/// One trading day's raw returns for a ticker against the benchmark.
/// All three values are decimals (0.0123 = 1.23%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub ticker_return: f64,
    pub benchmark_return: f64,
    pub excess_return: f64,
}

/// Trading-day window surrounding one anchor, ordered by date.
/// Positions within the window are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradingWindow {
    pub days: Vec<DailyReturn>,
}

impl TradingWindow {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Measurement of excess-return behavior around one anchor.
///
/// The positive-move fields are `None` when no day in the window had a
/// strictly positive excess return; the absolute-move fields are always
/// defined for a non-empty window. Percent fields are scaled (1.23 = 1.23%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionRecord {
    pub ticker: String,
    pub year: i32,
    pub anchor_week_start: NaiveDate,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub max_abs_date: NaiveDate,
    pub max_abs_excess_pct: f64,
    pub max_abs_position: usize,
    pub max_positive_date: Option<NaiveDate>,
    pub max_positive_excess_pct: Option<f64>,
    pub max_positive_position: Option<usize>,
    /// Consecutive days with excess return >= 0, counted forward from the
    /// max-positive day. Zero iff no positive day exists.
    pub nonneg_streak_length: usize,
    pub trading_days: usize,
}

/// Per-ticker averages over all of that ticker's conjunction records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    /// Mean of defined max-positive positions; `None` when every record
    /// lacked a positive day (or there are no records).
    pub avg_max_positive_position: Option<f64>,
    pub avg_nonneg_streak: Option<f64>,
    pub events: usize,
}
