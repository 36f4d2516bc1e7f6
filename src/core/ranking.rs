use std::cmp::Ordering;

use crate::models::MatchScore;

/// Drop scores below `min_confidence`, order by total score and keep the top
/// `max_results`.
///
/// Equal scores are ordered by parcel id, then building id (parcel-only
/// candidates first), so results are reproducible. Applying `rank` to its own
/// output with the same arguments returns the same list.
pub fn rank(scores: Vec<MatchScore>, min_confidence: f64, max_results: usize) -> Vec<MatchScore> {
    let mut ranked: Vec<MatchScore> = scores
        .into_iter()
        .filter(|score| score.confidence >= min_confidence)
        .collect();

    ranked.sort_by(compare_scores);
    ranked.truncate(max_results);

    ranked
}

/// Total score descending, then parcel id and building id ascending
fn compare_scores(a: &MatchScore, b: &MatchScore) -> Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a.parcel.id.cmp(&b.parcel.id))
        .then_with(|| {
            let a_building = a.building.as_ref().map(|building| building.id);
            let b_building = b.building.as_ref().map(|building| building.id);
            a_building.cmp(&b_building)
        })
}
