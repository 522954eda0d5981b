//! Deterministic max-score selection.

/// Picks the candidate with the highest score; ties break toward the
/// higher secondary value, then the lowest id, so selection is
/// reproducible for a fixed candidate set.
pub fn pick_best<'a, T>(
    candidates: &[&'a T],
    score_of: impl Fn(&T) -> f64,
    secondary_of: impl Fn(&T) -> f64,
    id_of: impl Fn(&T) -> u64,
) -> Option<&'a T> {
    let mut best: Option<(&'a T, f64, f64, u64)> = None;
    for candidate in candidates {
        let score = score_of(candidate);
        let secondary = secondary_of(candidate);
        let id = id_of(candidate);
        let better = match &best {
            None => true,
            Some((_, best_score, best_secondary, best_id)) => {
                score > *best_score
                    || (score == *best_score && secondary > *best_secondary)
                    || (score == *best_score && secondary == *best_secondary && id < *best_id)
            }
        };
        if better {
            best = Some((candidate, score, secondary, id));
        }
    }
    best.map(|(candidate, _, _, _)| candidate)
}
