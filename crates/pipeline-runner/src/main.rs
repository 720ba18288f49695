//! pipeline-runner: batch driver for the search-attention conjunction study.
//!
//! For each ticker it pulls weekly attention scores and daily returns,
//! detects spike anchors, measures excess-return behavior in the trading
//! window around each anchor, and writes every stage plus the final
//! summaries to CSV files under the output root.
//!
//! Usage:
//!   cargo run -p pipeline-runner -- --tickers TSLA,NVDA --years 2014-2019
//!   cargo run -p pipeline-runner -- --offline --out data
//!   cargo run -p pipeline-runner -- --dry-run

mod pipeline;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use attention_core::{AttentionScoreSource, PipelineConfig, ReturnSource};
use csv_store::{conjunction as conjunction_files, paths};
use market_client::MarketClient;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use trends_client::TrendsClient;

const DEFAULT_CONCURRENCY: usize = 4;

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_years(raw: &str) -> Option<(i32, i32)> {
    if let Some((start, end)) = raw.split_once('-') {
        let start = start.trim().parse().ok()?;
        let end = end.trim().parse().ok()?;
        (start <= end).then_some((start, end))
    } else {
        let year = raw.trim().parse().ok()?;
        Some((year, year))
    }
}

fn config_from_args(args: &[String]) -> anyhow::Result<PipelineConfig> {
    let mut config = PipelineConfig::default();

    if let Some(tickers) = flag_value(args, "--tickers") {
        config.tickers = tickers
            .split(',')
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .collect();
    }
    if let Some(years) = flag_value(args, "--years").or_else(|| flag_value(args, "--year")) {
        let (start, end) =
            parse_years(&years).with_context(|| format!("invalid year range: {years}"))?;
        config.start_year = start;
        config.end_year = end;
    }
    if let Some(threshold) = flag_value(args, "--threshold") {
        config.threshold = threshold.parse().context("invalid --threshold")?;
    }
    if let Some(days) = flag_value(args, "--min-gap-days") {
        config.min_spacing_days = days.parse().context("invalid --min-gap-days")?;
    }
    if let Some(len) = flag_value(args, "--window-len") {
        config.window_length = len.parse().context("invalid --window-len")?;
    }
    if let Some(offset) = flag_value(args, "--window-offset-days") {
        config.window_offset_days = offset.parse().context("invalid --window-offset-days")?;
    }
    if let Some(benchmark) = flag_value(args, "--benchmark") {
        config.benchmark = benchmark.to_uppercase();
    }
    if let Some(out) = flag_value(args, "--out") {
        config.output_root = PathBuf::from(out);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pipeline_runner=info,trends_client=warn,market_client=warn".into()
            }),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let offline = args.iter().any(|a| a == "--offline");
    let concurrency: usize = flag_value(&args, "--concurrency")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CONCURRENCY);

    let config = Arc::new(config_from_args(&args)?);
    tracing::info!(
        tickers = config.tickers.len(),
        years = ?(config.start_year..=config.end_year),
        threshold = config.threshold,
        min_spacing_days = config.min_spacing_days,
        window_length = config.window_length,
        window_offset_days = config.window_offset_days,
        offline,
        "starting conjunction pipeline"
    );

    if dry_run {
        for ticker in &config.tickers {
            tracing::info!(
                ticker = %ticker,
                years = format!("{}-{}", config.start_year, config.end_year),
                "would process"
            );
        }
        return Ok(());
    }

    let trends: Arc<dyn AttentionScoreSource> = Arc::new(TrendsClient::new());
    let market: Arc<dyn ReturnSource> = {
        let api_key = std::env::var("MARKET_API_KEY").unwrap_or_default();
        if api_key.is_empty() && !offline {
            anyhow::bail!("MARKET_API_KEY is not set (required unless --offline)");
        }
        Arc::new(MarketClient::new(api_key))
    };

    // The benchmark series is shared by every ticker, so one failed fetch
    // here would fail the whole run; fetch it once up front.
    let benchmark_returns = if offline {
        Arc::new(BTreeMap::new())
    } else {
        let (from, to) = pipeline::return_range(&config);
        Arc::new(
            market
                .fetch_daily_returns(&config.benchmark, from, to)
                .await
                .with_context(|| format!("fetching benchmark returns for {}", config.benchmark))?,
        )
    };

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();
    for ticker in config.tickers.clone() {
        let config = Arc::clone(&config);
        let trends = Arc::clone(&trends);
        let market = Arc::clone(&market);
        let benchmark_returns = Arc::clone(&benchmark_returns);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let result = pipeline::run_ticker(
                config,
                trends,
                market,
                benchmark_returns,
                ticker.clone(),
                offline,
            )
            .await;
            (ticker, result)
        });
    }

    let mut summaries = Vec::new();
    let mut skipped = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(summary))) => summaries.push(summary),
            Ok((ticker, Err(e))) => {
                tracing::error!(ticker = %ticker, error = %e, "ticker failed, skipping");
                skipped += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "ticker task panicked");
                skipped += 1;
            }
        }
    }

    conjunction_files::write_summaries(
        &paths::overall_summary_path(&config.output_root),
        &summaries,
    )?;

    let events: usize = summaries.iter().map(|s| s.events).sum();
    tracing::info!(
        tickers = summaries.len(),
        skipped,
        events,
        out = %config.output_root.display(),
        "pipeline complete"
    );
    Ok(())
}
