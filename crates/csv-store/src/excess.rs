//! Daily excess-return files: raw decimal columns (4 dp) plus percent-scaled
//! display duplicates (3 dp with a `%` suffix).

use attention_core::{DailyReturn, PipelineError};
use chrono::NaiveDate;
use std::path::Path;

use crate::paths::ensure_parent;

fn fmt_pct(raw: f64) -> String {
    format!("{:.3}%", raw * 100.0)
}

pub fn write_excess(
    path: &Path,
    ticker: &str,
    benchmark: &str,
    days: &[DailyReturn],
) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Date".to_string(),
        format!("{ticker} Daily Return"),
        format!("{benchmark} Daily Return"),
        "Excess Daily Return".to_string(),
        format!("{ticker} Daily Return (%)"),
        format!("{benchmark} Daily Return (%)"),
        "Excess Daily Return (%)".to_string(),
    ])?;
    for day in days {
        writer.write_record([
            day.date.format("%Y-%m-%d").to_string(),
            format!("{:.4}", day.ticker_return),
            format!("{:.4}", day.benchmark_return),
            format!("{:.4}", day.excess_return),
            fmt_pct(day.ticker_return),
            fmt_pct(day.benchmark_return),
            fmt_pct(day.excess_return),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the raw-decimal columns back (the percent columns are display-only).
/// Rows with unparseable dates or values are dropped.
pub fn read_excess(path: &Path) -> Result<Vec<DailyReturn>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut days = Vec::new();
    for result in reader.records() {
        let record = result?;
        let Ok(date) =
            NaiveDate::parse_from_str(record.get(0).unwrap_or("").trim(), "%Y-%m-%d")
        else {
            continue;
        };
        let parse = |i: usize| record.get(i).and_then(|v| v.trim().parse::<f64>().ok());
        let (Some(ticker_return), Some(benchmark_return), Some(excess_return)) =
            (parse(1), parse(2), parse(3))
        else {
            continue;
        };
        days.push(DailyReturn {
            date,
            ticker_return,
            benchmark_return,
            excess_return,
        });
    }
    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("csv-store-excess-{}-{}", std::process::id(), name))
    }

    fn day(d: u32, ticker: f64, bench: f64) -> DailyReturn {
        DailyReturn {
            date: NaiveDate::from_ymd_opt(2019, 7, d).unwrap(),
            ticker_return: ticker,
            benchmark_return: bench,
            excess_return: ticker - bench,
        }
    }

    #[test]
    fn round_trips_at_four_decimal_places() {
        let path = temp_path("roundtrip.csv");
        let days = vec![day(1, 0.0212, 0.0034), day(2, -0.013, 0.0001)];
        write_excess(&path, "NVDA", "SPY", &days).unwrap();
        let back = read_excess(&path).unwrap();
        assert_eq!(back.len(), 2);
        for (a, b) in back.iter().zip(&days) {
            assert_eq!(a.date, b.date);
            assert!((a.ticker_return - b.ticker_return).abs() < 5e-5);
            assert!((a.excess_return - b.excess_return).abs() < 5e-5);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn header_names_the_ticker_and_benchmark() {
        let path = temp_path("header.csv");
        write_excess(&path, "NVDA", "SPY", &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(
            "Date,NVDA Daily Return,SPY Daily Return,Excess Daily Return,\
             NVDA Daily Return (%),SPY Daily Return (%),Excess Daily Return (%)"
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn percent_columns_are_formatted_with_sign_and_suffix() {
        assert_eq!(fmt_pct(-0.0417), "-4.170%");
        assert_eq!(fmt_pct(0.01234), "1.234%");
    }
}
