use attention_core::{ConjunctionRecord, TickerSummary};

/// Reduce one ticker's conjunction records to the two scalar averages.
///
/// Records with no positive day contribute nothing to the position average
/// (excluded from numerator and denominator, so they never drag it toward
/// zero); their zero-length streaks do count toward the streak average.
pub fn summarize(ticker: &str, records: &[ConjunctionRecord]) -> TickerSummary {
    let positions: Vec<usize> = records
        .iter()
        .filter_map(|r| r.max_positive_position)
        .collect();

    let avg_max_positive_position = if positions.is_empty() {
        None
    } else {
        Some(positions.iter().sum::<usize>() as f64 / positions.len() as f64)
    };

    let avg_nonneg_streak = if records.is_empty() {
        None
    } else {
        Some(
            records.iter().map(|r| r.nonneg_streak_length).sum::<usize>() as f64
                / records.len() as f64,
        )
    };

    TickerSummary {
        ticker: ticker.to_string(),
        avg_max_positive_position,
        avg_nonneg_streak,
        events: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(position: Option<usize>, streak: usize) -> ConjunctionRecord {
        let date = NaiveDate::from_ymd_opt(2019, 6, 9).unwrap();
        ConjunctionRecord {
            ticker: "GME".to_string(),
            year: 2019,
            anchor_week_start: date,
            window_start: date,
            window_end: date,
            max_abs_date: date,
            max_abs_excess_pct: -1.0,
            max_abs_position: 1,
            max_positive_date: position.map(|_| date),
            max_positive_excess_pct: position.map(|_| 0.5),
            max_positive_position: position,
            nonneg_streak_length: streak,
            trading_days: 15,
        }
    }

    #[test]
    fn undefined_positions_are_excluded_from_the_position_average() {
        let records = vec![record(Some(3), 2), record(Some(7), 4), record(None, 0)];
        let summary = summarize("GME", &records);
        // Mean over the two defined positions, not over three records.
        assert_eq!(summary.avg_max_positive_position, Some(5.0));
        assert_eq!(summary.events, 3);
    }

    #[test]
    fn streak_average_runs_over_all_records() {
        let records = vec![record(Some(1), 3), record(None, 0)];
        let summary = summarize("GME", &records);
        assert_eq!(summary.avg_nonneg_streak, Some(1.5));
    }

    #[test]
    fn no_records_reports_no_averages() {
        let summary = summarize("GME", &[]);
        assert_eq!(summary.avg_max_positive_position, None);
        assert_eq!(summary.avg_nonneg_streak, None);
        assert_eq!(summary.events, 0);
    }

    #[test]
    fn all_none_positions_reports_no_position_average() {
        let records = vec![record(None, 0), record(None, 0)];
        let summary = summarize("GME", &records);
        assert_eq!(summary.avg_max_positive_position, None);
        assert_eq!(summary.avg_nonneg_streak, Some(0.0));
    }
}
