use attention_core::WeeklyObservation;

/// Keep the weeks whose score meets the threshold. Order-preserving; partial
/// weeks are not treated specially (the flag rides along for audit).
pub fn filter_spikes(observations: &[WeeklyObservation], threshold: u32) -> Vec<WeeklyObservation> {
    observations
        .iter()
        .filter(|obs| obs.score >= threshold)
        .cloned()
        .collect()
}
