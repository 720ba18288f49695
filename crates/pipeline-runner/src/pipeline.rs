//! Per-ticker pipeline: weekly scores -> spikes -> anchors -> excess-return
//! windows -> conjunction records -> summary. Every stage hand-off is also
//! written to its flat file so stages can be re-run from disk.

use std::collections::BTreeMap;
use std::sync::Arc;

use attention_core::{
    AttentionScoreSource, ConjunctionRecord, DailyReturn, PipelineConfig, PipelineError,
    ReturnSource, SpikeAnchor, TickerSummary, WeeklyObservation,
};
use chrono::{Datelike, Duration, NaiveDate};
use conjunction::{align_window, build_record, excess_series, summarize};
use csv_store::{conjunction as conjunction_files, excess as excess_files, paths, weekly};
use spike_detection::{filter_spikes, resolve_overlaps};

/// Calendar range of daily returns one ticker needs: enough lead before the
/// first possible anchor and enough tail after the last one for a full window.
pub fn return_range(config: &PipelineConfig) -> (NaiveDate, NaiveDate) {
    let from = NaiveDate::from_ymd_opt(config.start_year, 1, 1).unwrap()
        - Duration::days(config.window_offset_days);
    // Window days are trading days; three calendar days per trading day is a
    // generous upper bound for the tail.
    let tail = config.window_offset_days + 3 * config.window_length as i64;
    let to = NaiveDate::from_ymd_opt(config.end_year, 12, 31).unwrap() + Duration::days(tail);
    (from, to)
}

/// Gather weekly observations for every year, writing (or in offline mode
/// reading) the per-year weekly files.
async fn weekly_observations(
    config: &PipelineConfig,
    trends: &dyn AttentionScoreSource,
    ticker: &str,
    offline: bool,
) -> Result<Vec<WeeklyObservation>, PipelineError> {
    let mut all = Vec::new();
    for year in config.years() {
        let path = paths::weekly_path(&config.output_root, ticker, year);
        let observations = if offline {
            weekly::read_weekly(&path, ticker)?
        } else {
            match trends.fetch_weekly(ticker, year).await {
                Ok(fetched) => {
                    weekly::write_weekly(&path, ticker, &fetched)?;
                    fetched
                }
                // One year's exhausted retries must not sink the ticker: the
                // ticker-year is the unit of failure. A header-only file
                // keeps the year auditable on disk.
                Err(PipelineError::Upstream(reason)) => {
                    tracing::warn!(
                        ticker = %ticker,
                        year,
                        reason = %reason,
                        "weekly fetch failed, writing header-only file and skipping year"
                    );
                    weekly::write_weekly(&path, ticker, &[])?;
                    Vec::new()
                }
                Err(e) => return Err(e),
            }
        };
        all.extend(observations);
    }
    Ok(all)
}

/// Detect spikes and resolve overlaps across the ticker's full year range.
/// Spacing is enforced across year boundaries, so resolution runs over the
/// concatenated candidate list, and the per-year files are split afterwards.
fn detect_anchors(
    config: &PipelineConfig,
    ticker: &str,
    observations: &[WeeklyObservation],
) -> Result<Vec<SpikeAnchor>, PipelineError> {
    let candidates = filter_spikes(observations, config.threshold);
    for year in config.years() {
        let of_year: Vec<WeeklyObservation> = candidates
            .iter()
            .filter(|c| c.week_start.year() == year)
            .cloned()
            .collect();
        let path = paths::filtered_path(&config.output_root, ticker, year, config.threshold);
        weekly::write_weekly(&path, ticker, &of_year)?;
    }

    let anchors = resolve_overlaps(&candidates, config.min_spacing_days);
    for year in config.years() {
        let of_year: Vec<SpikeAnchor> = anchors
            .iter()
            .filter(|a| a.year() == year)
            .cloned()
            .collect();
        let path = paths::anchors_path(&config.output_root, ticker, year, config.threshold);
        weekly::write_anchors(&path, ticker, &of_year)?;
    }
    tracing::info!(
        ticker,
        candidates = candidates.len(),
        anchors = anchors.len(),
        "resolved spike anchors"
    );
    Ok(anchors)
}

/// Build the full excess-return series for a ticker, writing the per-year
/// excess files (online) or reassembling the series from them (offline).
///
/// The in-memory series extends past the year range on both sides (window
/// lead-in and tail), and an offline re-run must see exactly the same days.
/// Out-of-range days are therefore bucketed into the nearest in-range year's
/// file instead of being dropped.
async fn excess_returns(
    config: &PipelineConfig,
    market: &dyn ReturnSource,
    benchmark_returns: &BTreeMap<NaiveDate, f64>,
    ticker: &str,
    offline: bool,
) -> Result<Vec<DailyReturn>, PipelineError> {
    if offline {
        let mut series = Vec::new();
        for year in config.years() {
            let path = paths::excess_path(&config.output_root, ticker, year);
            series.extend(excess_files::read_excess(&path)?);
        }
        series.sort_by_key(|day| day.date);
        return Ok(series);
    }

    let (from, to) = return_range(config);
    let ticker_returns = market.fetch_daily_returns(ticker, from, to).await?;
    let series = excess_series(&ticker_returns, benchmark_returns);
    let bucket_year =
        |date: NaiveDate| date.year().clamp(config.start_year, config.end_year);
    for year in config.years() {
        let of_year: Vec<DailyReturn> = series
            .iter()
            .filter(|day| bucket_year(day.date) == year)
            .copied()
            .collect();
        let path = paths::excess_path(&config.output_root, ticker, year);
        excess_files::write_excess(&path, ticker, &config.benchmark, &of_year)?;
    }
    Ok(series)
}

/// Run the whole pipeline for one ticker and return its summary. Each ticker
/// is an independent unit of failure; the caller decides what a failure
/// means for the batch.
pub async fn run_ticker(
    config: Arc<PipelineConfig>,
    trends: Arc<dyn AttentionScoreSource>,
    market: Arc<dyn ReturnSource>,
    benchmark_returns: Arc<BTreeMap<NaiveDate, f64>>,
    ticker: String,
    offline: bool,
) -> Result<TickerSummary, PipelineError> {
    let observations = weekly_observations(&config, trends.as_ref(), &ticker, offline).await?;
    let anchors = detect_anchors(&config, &ticker, &observations)?;
    let series = excess_returns(&config, market.as_ref(), &benchmark_returns, &ticker, offline)
        .await?;

    let mut records: Vec<ConjunctionRecord> = Vec::new();
    for anchor in &anchors {
        let window = align_window(
            anchor,
            &series,
            config.window_offset_days,
            config.window_length,
        );
        match build_record(anchor, &window) {
            Some(record) => records.push(record),
            None => tracing::warn!(
                ticker = %ticker,
                anchor = %anchor.week_start,
                "no trading days in window, skipping anchor"
            ),
        }
    }

    conjunction_files::write_conjunctions(
        &paths::conjunction_path(&config.output_root, &ticker),
        &records,
    )?;
    let summary = summarize(&ticker, &records);
    conjunction_files::write_summaries(
        &paths::ticker_summary_path(&config.output_root, &ticker),
        std::slice::from_ref(&summary),
    )?;
    tracing::info!(
        ticker = %ticker,
        events = records.len(),
        avg_position = ?summary.avg_max_positive_position,
        avg_streak = ?summary.avg_nonneg_streak,
        "ticker complete"
    );
    Ok(summary)
}
