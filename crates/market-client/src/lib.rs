//! Daily price client for the aggregates API, reduced to what the pipeline
//! needs: adjusted daily closes turned into simple returns for a symbol over
//! a date range. The benchmark instrument goes through the same path.

use async_trait::async_trait;
use attention_core::{PipelineError, ReturnSource};
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
const MAX_ATTEMPTS: u32 = 4;

/// Sliding-window rate limiter: at most `max_requests` per `window`.
#[derive(Clone)]
struct RateLimiter {
    sent: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            sent: Arc::new(Mutex::new(VecDeque::new())),
            max_requests,
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let wait = {
                let mut sent = self.sent.lock().await;
                let now = Instant::now();
                while sent
                    .front()
                    .is_some_and(|&t| now.duration_since(t) >= self.window)
                {
                    sent.pop_front();
                }
                if sent.len() < self.max_requests {
                    sent.push_back(now);
                    return;
                }
                // Oldest in-window request decides how long until a slot opens.
                self.window - now.duration_since(*sent.front().unwrap())
                    + Duration::from_millis(50)
            };
            tracing::debug!(
                "market API rate limiter: waiting {:.1}s for a slot",
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    #[serde(default)]
    results: Vec<AggregateBar>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Bar timestamp, epoch milliseconds.
    t: i64,
    /// Adjusted close.
    c: f64,
}

#[derive(Clone)]
pub struct MarketClient {
    api_key: String,
    base_url: String,
    client: Client,
    rate_limiter: RateLimiter,
}

impl MarketClient {
    pub fn new(api_key: String) -> Self {
        let base_url =
            std::env::var("MARKET_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        // Free tier allows 5 req/min; default stays conservative.
        let per_minute: usize = std::env::var("MARKET_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            base_url,
            client,
            rate_limiter: RateLimiter::new(per_minute, Duration::from_secs(60)),
        }
    }

    async fn get_daily_closes(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, PipelineError> {
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            self.base_url, symbol, from, to
        );

        for attempt in 1..=MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;

            let response = self
                .client
                .get(&url)
                .query(&[
                    ("adjusted", "true"),
                    ("sort", "asc"),
                    ("apiKey", self.api_key.as_str()),
                ])
                .send()
                .await
                .map_err(|e| PipelineError::Upstream(e.to_string()))?;

            if response.status().as_u16() == 429 {
                let cooloff = Duration::from_secs(15 * attempt as u64);
                tracing::warn!(
                    symbol,
                    attempt,
                    "market API rate limited, backing off {}s",
                    cooloff.as_secs()
                );
                tokio::time::sleep(cooloff).await;
                continue;
            }

            if !response.status().is_success() {
                return Err(PipelineError::Upstream(format!(
                    "market API HTTP {} for {}",
                    response.status(),
                    symbol
                )));
            }

            let parsed: AggregatesResponse = response
                .json()
                .await
                .map_err(|e| PipelineError::Upstream(e.to_string()))?;

            let mut closes: Vec<(NaiveDate, f64)> = parsed
                .results
                .iter()
                .filter_map(|bar| {
                    DateTime::from_timestamp_millis(bar.t).map(|ts| (ts.date_naive(), bar.c))
                })
                .collect();
            closes.sort_by_key(|(date, _)| *date);
            return Ok(closes);
        }

        Err(PipelineError::Upstream(format!(
            "market API rate limited for {symbol} after {MAX_ATTEMPTS} attempts"
        )))
    }
}

/// Simple returns from a date-ordered close series: `close[t]/close[t-1] - 1`.
/// The first close only seeds the series and produces no return; non-positive
/// closes (bad prints) break the chain rather than produce a bogus return.
fn returns_from_closes(closes: &[(NaiveDate, f64)]) -> BTreeMap<NaiveDate, f64> {
    closes
        .windows(2)
        .filter_map(|pair| {
            let (_, prev_close) = pair[0];
            let (date, close) = pair[1];
            if prev_close > 0.0 && close > 0.0 {
                Some((date, close / prev_close - 1.0))
            } else {
                None
            }
        })
        .collect()
}

#[async_trait]
impl ReturnSource for MarketClient {
    async fn fetch_daily_returns(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, PipelineError> {
        // Pull a lead-in week so the first requested day still has a prior
        // close to compute its return against.
        let closes = self
            .get_daily_closes(symbol, from - ChronoDuration::days(7), to)
            .await?;
        let mut returns = returns_from_closes(&closes);
        returns.retain(|date, _| *date >= from);
        tracing::info!(
            symbol,
            %from,
            %to,
            days = returns.len(),
            "fetched daily returns"
        );
        Ok(returns)
    }
}
