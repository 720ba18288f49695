//! Per-anchor conjunction files and the per-ticker / overall summary tables.
//!
//! Summary tables extend the baseline two-column schema (average position,
//! average streak length) with leading `Ticker` and trailing `Events`
//! columns so the per-ticker and overall files share one shape; readers
//! keying on the baseline column names are unaffected.

use attention_core::{ConjunctionRecord, PipelineError, TickerSummary};
use std::path::Path;

use crate::paths::ensure_parent;

fn fmt_date(date: &chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn fmt_pct(pct: f64) -> String {
    format!("{pct:.3}%")
}

/// Write one ticker's conjunction records, most recent year first and anchors
/// ascending within a year. Positive-move fields are blank when the window
/// held no positive day.
pub fn write_conjunctions(path: &Path, records: &[ConjunctionRecord]) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    let mut sorted: Vec<&ConjunctionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then(a.anchor_week_start.cmp(&b.anchor_week_start))
    });

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Ticker",
        "Year",
        "Anchor Week Start",
        "Window Start",
        "Window End",
        "Max Abs Excess Return Date",
        "Max Abs Excess Return (%)",
        "Max Abs Position (1-15)",
        "Max Positive Excess Return Date",
        "Max Positive Excess Return (%)",
        "Max Positive Position (1-15)",
        "Nonneg Streak Length",
        "Trading Days",
    ])?;
    for record in sorted {
        writer.write_record([
            record.ticker.clone(),
            record.year.to_string(),
            fmt_date(&record.anchor_week_start),
            fmt_date(&record.window_start),
            fmt_date(&record.window_end),
            fmt_date(&record.max_abs_date),
            fmt_pct(record.max_abs_excess_pct),
            record.max_abs_position.to_string(),
            record.max_positive_date.as_ref().map(fmt_date).unwrap_or_default(),
            record
                .max_positive_excess_pct
                .map(fmt_pct)
                .unwrap_or_default(),
            record
                .max_positive_position
                .map(|p| p.to_string())
                .unwrap_or_default(),
            record.nonneg_streak_length.to_string(),
            record.trading_days.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Summary table: one row per ticker, `N/A` where an average is undefined.
/// Used both for the single-row per-ticker file and the overall table.
pub fn write_summaries(path: &Path, summaries: &[TickerSummary]) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    let mut sorted: Vec<&TickerSummary> = summaries.iter().collect();
    sorted.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    let fmt_avg = |avg: Option<f64>| match avg {
        Some(v) => format!("{v:.2}"),
        None => "N/A".to_string(),
    };

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        "Ticker",
        "Average Position (1-15)",
        "Average Streak Length",
        "Events",
    ])?;
    for summary in sorted {
        writer.write_record([
            summary.ticker.clone(),
            fmt_avg(summary.avg_max_positive_position),
            fmt_avg(summary.avg_nonneg_streak),
            summary.events.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("csv-store-conjunction-{}-{}", std::process::id(), name))
    }

    fn record(year: i32, month: u32, position: Option<usize>) -> ConjunctionRecord {
        let date = NaiveDate::from_ymd_opt(year, month, 7).unwrap();
        ConjunctionRecord {
            ticker: "AMZN".to_string(),
            year,
            anchor_week_start: date,
            window_start: date,
            window_end: date,
            max_abs_date: date,
            max_abs_excess_pct: -4.17,
            max_abs_position: 3,
            max_positive_date: position.map(|_| date),
            max_positive_excess_pct: position.map(|_| 2.5),
            max_positive_position: position,
            nonneg_streak_length: if position.is_some() { 2 } else { 0 },
            trading_days: 15,
        }
    }

    #[test]
    fn rows_sort_year_descending_then_anchor_ascending() {
        let path = temp_path("order.csv");
        let records = vec![
            record(2018, 3, Some(4)),
            record(2019, 9, Some(1)),
            record(2019, 2, Some(2)),
        ];
        write_conjunctions(&path, &records).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let years: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(1).unwrap())
            .collect();
        assert_eq!(years, vec!["2019", "2019", "2018"]);
        let anchors: Vec<&str> = contents
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(2).unwrap())
            .collect();
        assert!(anchors[0] < anchors[1]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn degenerate_windows_leave_positive_fields_blank() {
        let path = temp_path("blank.csv");
        write_conjunctions(&path, &[record(2019, 5, None)]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let row = contents.lines().nth(1).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields[8], "");
        assert_eq!(fields[9], "");
        assert_eq!(fields[10], "");
        assert_eq!(fields[11], "0");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn summaries_report_na_for_undefined_averages() {
        let path = temp_path("summary.csv");
        let summaries = vec![
            TickerSummary {
                ticker: "TSLA".to_string(),
                avg_max_positive_position: Some(5.0),
                avg_nonneg_streak: Some(2.25),
                events: 4,
            },
            TickerSummary {
                ticker: "EBAY".to_string(),
                avg_max_positive_position: None,
                avg_nonneg_streak: None,
                events: 0,
            },
        ];
        write_summaries(&path, &summaries).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        // Sorted by ticker: EBAY before TSLA.
        assert_eq!(lines[1], "EBAY,N/A,N/A,0");
        assert_eq!(lines[2], "TSLA,5.00,2.25,4");
        std::fs::remove_file(&path).ok();
    }
}
