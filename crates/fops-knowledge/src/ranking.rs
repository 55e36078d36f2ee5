//! Deterministic ranking of retrieval hits.

use std::cmp::Ordering;

use fops_core::models::RetrievalHit;

/// Sort hits by descending score and truncate to `top_k`.
///
/// Scores within `tie_epsilon` of the first score of their run are ties;
/// ties go to the most recently updated source, then to the smaller id.
pub fn rank(mut hits: Vec<RetrievalHit>, tie_epsilon: f64, top_k: usize) -> Vec<RetrievalHit> {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| tie_break(a, b))
    });

    let mut start = 0;
    while start < hits.len() {
        let head = hits[start].score;
        let mut end = start + 1;
        while end < hits.len() && (head - hits[end].score).abs() <= tie_epsilon {
            end += 1;
        }
        hits[start..end].sort_by(tie_break);
        start = end;
    }

    hits.truncate(top_k);
    hits
}

/// Rank hits but cut at the tie band of the `top_k`-th hit instead of at
/// `top_k` itself.
///
/// Every hit within `tie_epsilon` of the `top_k`-th score is kept, so a
/// later [`rank`] with the same epsilon can still promote a more recent
/// source across the cutoff.
pub fn rank_with_ties(hits: Vec<RetrievalHit>, tie_epsilon: f64, top_k: usize) -> Vec<RetrievalHit> {
    if top_k == 0 {
        return Vec::new();
    }
    let mut scores: Vec<f64> = hits.iter().map(|h| h.score).collect();
    scores.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    let Some(&cutoff) = scores.get(top_k - 1) else {
        let len = hits.len();
        return rank(hits, tie_epsilon, len);
    };
    let kept: Vec<RetrievalHit> = hits
        .into_iter()
        .filter(|h| h.score >= cutoff - tie_epsilon)
        .collect();
    let len = kept.len();
    rank(kept, tie_epsilon, len)
}

fn tie_break(a: &RetrievalHit, b: &RetrievalHit) -> Ordering {
    b.item
        .updated_at
        .cmp(&a.item.updated_at)
        .then_with(|| a.item.id.cmp(&b.item.id))
}
