use attention_core::{ConjunctionRecord, SpikeAnchor, TradingWindow};

/// Measure one window: locate the strongest positive excess-return day, count
/// the non-negative run that follows it, and record the largest-magnitude
/// move with its sign. Returns `None` for an empty window (no usable days at
/// that point of history).
///
/// Ties on either extremum resolve to the earliest day in the window.
pub fn build_record(anchor: &SpikeAnchor, window: &TradingWindow) -> Option<ConjunctionRecord> {
    if window.is_empty() {
        return None;
    }
    let days = &window.days;

    // Largest absolute move, sign kept. Strict comparison keeps the first of
    // equal magnitudes.
    let mut abs_idx = 0;
    for (i, day) in days.iter().enumerate() {
        if day.excess_return.abs() > days[abs_idx].excess_return.abs() {
            abs_idx = i;
        }
    }

    // Strongest strictly positive day, if any.
    let mut pos_idx: Option<usize> = None;
    for (i, day) in days.iter().enumerate() {
        if day.excess_return > 0.0 {
            match pos_idx {
                Some(best) if days[best].excess_return >= day.excess_return => {}
                _ => pos_idx = Some(i),
            }
        }
    }

    // Non-negative run forward from the strongest positive day. The positive
    // day itself always counts, so the streak is at least 1 when defined.
    let streak = match pos_idx {
        None => 0,
        Some(start) => days[start..]
            .iter()
            .take_while(|day| day.excess_return >= 0.0)
            .count(),
    };

    Some(ConjunctionRecord {
        ticker: anchor.ticker.clone(),
        year: anchor.year(),
        anchor_week_start: anchor.week_start,
        window_start: days[0].date,
        window_end: days[days.len() - 1].date,
        max_abs_date: days[abs_idx].date,
        max_abs_excess_pct: days[abs_idx].excess_return * 100.0,
        max_abs_position: abs_idx + 1,
        max_positive_date: pos_idx.map(|i| days[i].date),
        max_positive_excess_pct: pos_idx.map(|i| days[i].excess_return * 100.0),
        max_positive_position: pos_idx.map(|i| i + 1),
        nonneg_streak_length: streak,
        trading_days: days.len(),
    })
}
