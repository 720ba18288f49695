//! HTTP client for the weekly search-interest service.
//!
//! The service reports, for one search term and one calendar year, the 0-100
//! relative-interest value of each week plus a partial-week marker for the
//! most recent week. The upstream is aggressively rate limited, so requests
//! are paced with a minimum gap and retried with a long cool-off on 429.

use async_trait::async_trait;
use attention_core::{AttentionScoreSource, PipelineError, WeeklyObservation};
use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_BASE_URL: &str = "https://trends-api.internal/v1/interest_over_time";
const MAX_ATTEMPTS: u32 = 5;
const RATE_LIMIT_COOLOFF: Duration = Duration::from_secs(60);

/// Minimum-gap pacer: never issues two requests closer together than
/// `min_gap`. Cruder than a sliding window but it is what the upstream's
/// informal quota tolerates.
struct RequestPacer {
    last_request: Mutex<Option<Instant>>,
    min_gap: Duration,
}

impl RequestPacer {
    fn new(min_gap: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_gap,
        }
    }

    async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_gap {
                let wait = self.min_gap - elapsed;
                tracing::debug!("pacing trends request, waiting {:.1}s", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    /// Week start date, `YYYY-MM-DD`.
    date: String,
    /// Interest value. The service emits `null` for weeks it could not
    /// score; those are treated as zero, matching its CSV export.
    value: Option<f64>,
    #[serde(default, rename = "isPartial")]
    is_partial: bool,
}

pub struct TrendsClient {
    base_url: String,
    geo: String,
    client: Client,
    pacer: RequestPacer,
}

impl TrendsClient {
    pub fn new() -> Self {
        let base_url =
            std::env::var("TRENDS_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let geo = std::env::var("TRENDS_GEO").unwrap_or_else(|_| "US".to_string());
        // Pace well under the informal quota; override for paid tiers.
        let gap_ms: u64 = std::env::var("TRENDS_REQUEST_GAP_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1500);

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url,
            geo,
            client,
            pacer: RequestPacer::new(Duration::from_millis(gap_ms)),
        }
    }

    async fn get_timeline(&self, term: &str, year: i32) -> Result<TimelineResponse, PipelineError> {
        let timeframe = format!("{year}-01-01 {year}-12-31");

        for attempt in 1..=MAX_ATTEMPTS {
            self.pacer.acquire().await;

            let result = self
                .client
                .get(&self.base_url)
                .query(&[
                    ("term", term),
                    ("timeframe", timeframe.as_str()),
                    ("geo", self.geo.as_str()),
                ])
                .send()
                .await;

            let retry_delay = match result {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json()
                        .await
                        .map_err(|e| PipelineError::Upstream(e.to_string()));
                }
                Ok(response) if response.status().as_u16() == 429 => {
                    tracing::warn!(
                        term,
                        year,
                        attempt,
                        "trends API rate limited, cooling off {}s",
                        RATE_LIMIT_COOLOFF.as_secs()
                    );
                    RATE_LIMIT_COOLOFF
                }
                Ok(response) => {
                    tracing::warn!(
                        term,
                        year,
                        attempt,
                        status = %response.status(),
                        "trends API returned an error status"
                    );
                    Duration::from_secs(2 * attempt as u64).min(Duration::from_secs(6))
                }
                Err(e) => {
                    tracing::warn!(term, year, attempt, error = %e, "trends request failed");
                    Duration::from_secs(2 * attempt as u64).min(Duration::from_secs(6))
                }
            };

            if attempt < MAX_ATTEMPTS {
                tokio::time::sleep(retry_delay).await;
            }
        }

        Err(PipelineError::Upstream(format!(
            "trends API failed for {term} {year} after {MAX_ATTEMPTS} attempts"
        )))
    }
}

impl Default for TrendsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a raw timeline into weekly observations for exactly the requested
/// year. The upstream spills edge weeks across year boundaries; those rows
/// are dropped. Unparseable dates are skipped, missing values become zero,
/// and scores clamp into 0-100.
fn observations_from_timeline(
    ticker: &str,
    year: i32,
    timeline: &[TimelinePoint],
) -> Vec<WeeklyObservation> {
    timeline
        .iter()
        .filter_map(|point| {
            let week_start = NaiveDate::parse_from_str(&point.date, "%Y-%m-%d").ok()?;
            if week_start.year() != year {
                return None;
            }
            let score = point.value.unwrap_or(0.0).round().clamp(0.0, 100.0) as u32;
            Some(WeeklyObservation {
                ticker: ticker.to_string(),
                week_start,
                score,
                is_partial: point.is_partial,
            })
        })
        .collect()
}

#[async_trait]
impl AttentionScoreSource for TrendsClient {
    async fn fetch_weekly(
        &self,
        ticker: &str,
        year: i32,
    ) -> Result<Vec<WeeklyObservation>, PipelineError> {
        let response = self.get_timeline(ticker, year).await?;
        let observations = observations_from_timeline(ticker, year, &response.timeline);
        tracing::info!(
            ticker,
            year,
            weeks = observations.len(),
            "fetched weekly attention scores"
        );
        Ok(observations)
    }
}
