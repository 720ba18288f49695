use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::{PipelineError, WeeklyObservation};

/// Source of weekly search-interest observations for one (ticker, year).
#[async_trait]
pub trait AttentionScoreSource: Send + Sync {
    async fn fetch_weekly(
        &self,
        ticker: &str,
        year: i32,
    ) -> Result<Vec<WeeklyObservation>, PipelineError>;
}

/// Source of raw daily simple returns, keyed by trading date. Dates the
/// venue was closed are simply absent from the map.
#[async_trait]
pub trait ReturnSource: Send + Sync {
    async fn fetch_daily_returns(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, PipelineError>;
}
