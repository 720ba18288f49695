use attention_core::{SpikeAnchor, WeeklyObservation};

/// Reduce spike candidates to anchors spaced at least `min_spacing_days`
/// apart, greedily keeping the earliest candidate in each cluster.
///
/// Single forward pass over the candidates sorted by week start: a candidate
/// is kept iff it starts `min_spacing_days` or more after the last kept one.
/// Later candidates in a cluster are dropped even when their score is higher;
/// that earliest-wins policy is deliberate and observable in the output.
pub fn resolve_overlaps(
    candidates: &[WeeklyObservation],
    min_spacing_days: i64,
) -> Vec<SpikeAnchor> {
    let mut sorted: Vec<&WeeklyObservation> = candidates.iter().collect();
    sorted.sort_by_key(|c| c.week_start);
    sorted.dedup_by_key(|c| c.week_start);

    let mut anchors: Vec<SpikeAnchor> = Vec::new();
    let mut last_kept: Option<chrono::NaiveDate> = None;

    for candidate in sorted {
        let far_enough = match last_kept {
            None => true,
            Some(prev) => (candidate.week_start - prev).num_days() >= min_spacing_days,
        };
        if far_enough {
            last_kept = Some(candidate.week_start);
            anchors.push(SpikeAnchor::from(candidate.clone()));
        } else {
            tracing::debug!(
                ticker = %candidate.ticker,
                week = %candidate.week_start,
                "dropping spike within spacing window of previous anchor"
            );
        }
    }

    anchors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(date: (i32, u32, u32), score: u32) -> WeeklyObservation {
        WeeklyObservation {
            ticker: "NVDA".to_string(),
            week_start: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            score,
            is_partial: false,
        }
    }

    #[test]
    fn drops_candidates_inside_spacing_window() {
        // Weekly scores [70, 90, 88, 60, 95] with threshold 85 leave weeks
        // 2, 3 and 5; week 3 is only 7 days after week 2 and must go.
        let candidates = vec![
            obs((2019, 1, 13), 90),
            obs((2019, 1, 20), 88),
            obs((2019, 2, 3), 95),
        ];
        let anchors = resolve_overlaps(&candidates, 21);
        let weeks: Vec<NaiveDate> = anchors.iter().map(|a| a.week_start).collect();
        assert_eq!(
            weeks,
            vec![
                NaiveDate::from_ymd_opt(2019, 1, 13).unwrap(),
                NaiveDate::from_ymd_opt(2019, 2, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn earliest_wins_even_over_higher_scores() {
        let candidates = vec![obs((2019, 3, 3), 86), obs((2019, 3, 10), 100)];
        let anchors = resolve_overlaps(&candidates, 21);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].score, 86);
    }

    #[test]
    fn exact_spacing_is_kept() {
        let candidates = vec![obs((2019, 1, 6), 90), obs((2019, 1, 27), 90)];
        let anchors = resolve_overlaps(&candidates, 21);
        assert_eq!(anchors.len(), 2);
    }

    #[test]
    fn spacing_invariant_holds_for_adjacent_pairs() {
        let candidates: Vec<WeeklyObservation> = (0..52)
            .map(|w| {
                let d = NaiveDate::from_ymd_opt(2019, 1, 6).unwrap()
                    + chrono::Duration::days(7 * w);
                WeeklyObservation {
                    ticker: "NVDA".to_string(),
                    week_start: d,
                    score: 90,
                    is_partial: false,
                }
            })
            .collect();
        let anchors = resolve_overlaps(&candidates, 21);
        for pair in anchors.windows(2) {
            assert!((pair[1].week_start - pair[0].week_start).num_days() >= 21);
        }
    }

    #[test]
    fn output_is_an_ordered_subsequence_of_input() {
        let candidates = vec![
            obs((2019, 5, 5), 91),
            obs((2019, 1, 6), 88),
            obs((2019, 2, 10), 99),
        ];
        let anchors = resolve_overlaps(&candidates, 21);
        let input_weeks: Vec<NaiveDate> = {
            let mut w: Vec<NaiveDate> = candidates.iter().map(|c| c.week_start).collect();
            w.sort();
            w
        };
        let mut cursor = 0;
        for anchor in &anchors {
            let pos = input_weeks[cursor..]
                .iter()
                .position(|w| *w == anchor.week_start);
            assert!(pos.is_some(), "anchor not found in sorted input order");
            cursor += pos.unwrap() + 1;
        }
    }

    #[test]
    fn duplicate_weeks_collapse_before_the_pass() {
        let candidates = vec![obs((2019, 1, 6), 90), obs((2019, 1, 6), 90)];
        let anchors = resolve_overlaps(&candidates, 21);
        assert_eq!(anchors.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(resolve_overlaps(&[], 21).is_empty());
    }
}
