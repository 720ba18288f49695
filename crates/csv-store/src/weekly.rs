//! `Week,<TICKER>,isPartial` files: raw weekly observations, the filtered
//! spike candidates, and the overlap-resolved anchors all share this shape.

use attention_core::{PipelineError, SpikeAnchor, WeeklyObservation};
use chrono::NaiveDate;
use std::path::Path;

use crate::paths::ensure_parent;

fn write_week_rows<'a>(
    path: &Path,
    ticker: &str,
    rows: impl Iterator<Item = (&'a NaiveDate, u32, bool)>,
) -> Result<(), PipelineError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Week", ticker, "isPartial"])?;
    for (week, score, is_partial) in rows {
        writer.write_record([
            week.format("%Y-%m-%d").to_string(),
            score.to_string(),
            is_partial.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write weekly observations. An empty slice still produces a header-only
/// file so a failed or empty fetch leaves an auditable artifact.
pub fn write_weekly(
    path: &Path,
    ticker: &str,
    rows: &[WeeklyObservation],
) -> Result<(), PipelineError> {
    write_week_rows(
        path,
        ticker,
        rows.iter().map(|r| (&r.week_start, r.score, r.is_partial)),
    )
}

/// Anchors use the same three-column shape as raw observations.
pub fn write_anchors(
    path: &Path,
    ticker: &str,
    anchors: &[SpikeAnchor],
) -> Result<(), PipelineError> {
    write_week_rows(
        path,
        ticker,
        anchors.iter().map(|a| (&a.week_start, a.score, a.is_partial)),
    )
}

/// Read a `Week,<TICKER>,isPartial` file back into observations.
///
/// Forgiving on purpose: the value column is whichever header is neither
/// `Week` nor `isPartial` (exports sometimes decorate the ticker label),
/// `<1` counts as zero, and rows with unparseable dates are dropped.
pub fn read_weekly(path: &Path, ticker: &str) -> Result<Vec<WeeklyObservation>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    let week_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("week"))
        .ok_or_else(|| {
            PipelineError::InvalidData(format!("{}: no Week column", path.display()))
        })?;
    let partial_col = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("ispartial"));
    let value_col = headers
        .iter()
        .position(|h| !h.eq_ignore_ascii_case("week") && !h.eq_ignore_ascii_case("ispartial"))
        .ok_or_else(|| {
            PipelineError::InvalidData(format!("{}: no value column", path.display()))
        })?;

    let mut observations = Vec::new();
    for result in reader.records() {
        let record = result?;
        let week = record.get(week_col).unwrap_or("").trim();
        let Ok(week_start) = NaiveDate::parse_from_str(week, "%Y-%m-%d") else {
            continue;
        };
        let raw_value = record.get(value_col).unwrap_or("0").trim();
        let score = if raw_value == "<1" {
            0
        } else {
            raw_value.parse::<f64>().unwrap_or(0.0).round().max(0.0) as u32
        };
        let is_partial = partial_col
            .and_then(|i| record.get(i))
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        observations.push(WeeklyObservation {
            ticker: ticker.to_string(),
            week_start,
            score,
            is_partial,
        });
    }
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("csv-store-weekly-{}-{}", std::process::id(), name))
    }

    fn obs(date: (i32, u32, u32), score: u32, is_partial: bool) -> WeeklyObservation {
        WeeklyObservation {
            ticker: "TSLA".to_string(),
            week_start: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            score,
            is_partial,
        }
    }

    #[test]
    fn round_trips_observations() {
        let path = temp_path("roundtrip.csv");
        let rows = vec![obs((2019, 1, 6), 90, false), obs((2019, 12, 29), 77, true)];
        write_weekly(&path, "TSLA", &rows).unwrap();
        let back = read_weekly(&path, "TSLA").unwrap();
        assert_eq!(back, rows);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn empty_write_leaves_a_header_only_file() {
        let path = temp_path("empty.csv");
        write_weekly(&path, "TSLA", &[]).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Week,TSLA,isPartial"));
        assert!(read_weekly(&path, "TSLA").unwrap().is_empty());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn sub_one_scores_and_bad_dates_are_tolerated() {
        let path = temp_path("forgiving.csv");
        std::fs::write(&path, "Week,TSLA: (US),isPartial\n2019-01-06,<1,false\ngarbage,50,false\n")
            .unwrap();
        let back = read_weekly(&path, "TSLA").unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].score, 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn anchors_share_the_weekly_shape() {
        let path = temp_path("anchors.csv");
        let anchor = SpikeAnchor {
            ticker: "TSLA".to_string(),
            week_start: NaiveDate::from_ymd_opt(2019, 1, 6).unwrap(),
            score: 91,
            is_partial: false,
        };
        write_anchors(&path, "TSLA", &[anchor]).unwrap();
        let back = read_weekly(&path, "TSLA").unwrap();
        assert_eq!(back[0].score, 91);
        std::fs::remove_file(&path).ok();
    }
}
