use attention_core::{DailyReturn, SpikeAnchor, TradingWindow};
use chrono::Duration;

/// Extract the trading window around one anchor from the ticker's full
/// excess-return series (assumed date-sorted).
///
/// The window starts at the first trading day on or after
/// `week_start - offset_days` and walks forward through the series for up to
/// `window_length` consecutive trading days. Holidays never leave holes: the
/// window is built from the days the venue actually traded, so it can be
/// calendar-irregular. At the end of available history it simply truncates.
pub fn align_window(
    anchor: &SpikeAnchor,
    series: &[DailyReturn],
    offset_days: i64,
    window_length: usize,
) -> TradingWindow {
    let window_open = anchor.week_start - Duration::days(offset_days);
    let start = series.partition_point(|day| day.date < window_open);
    let end = (start + window_length).min(series.len());
    TradingWindow {
        days: series[start..end].to_vec(),
    }
}
