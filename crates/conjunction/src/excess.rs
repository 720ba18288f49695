use attention_core::DailyReturn;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Join the ticker and benchmark return series into a per-day excess-return
/// series over the intersection of their trading dates. A date missing from
/// either side is absent from the result, never assumed zero.
pub fn excess_series(
    ticker_returns: &BTreeMap<NaiveDate, f64>,
    benchmark_returns: &BTreeMap<NaiveDate, f64>,
) -> Vec<DailyReturn> {
    ticker_returns
        .iter()
        .filter_map(|(date, ticker_return)| {
            benchmark_returns.get(date).map(|benchmark_return| DailyReturn {
                date: *date,
                ticker_return: *ticker_return,
                benchmark_return: *benchmark_return,
                excess_return: ticker_return - benchmark_return,
            })
        })
        .collect()
}
