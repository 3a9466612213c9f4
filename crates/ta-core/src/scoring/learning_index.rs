//! Learning-index composite over the cognitive sub-scales.

use crate::stats::{raw_to_sten, sten_to_percentile};

use super::ScoreDraft;

/// Legacy calibration bounds, kept for streams where per-scale item
/// counts are unavailable (seeded historical profiles).
pub const FALLBACK_BOUNDS: (f64, f64) = (80.0, 400.0);

/// Sums the sub-scale raw scores and standardizes against bounds derived
/// from the actual administered item counts. Returns `None` when no
/// sub-scale produced a score.
pub fn score_composite(composite_scale_id: &str, sub_scores: &[&ScoreDraft]) -> Option<ScoreDraft> {
    if sub_scores.is_empty() {
        return None;
    }

    let raw: f64 = sub_scores.iter().map(|s| s.raw_score).sum();
    let total_items: u32 = sub_scores.iter().map(|s| s.item_count).sum();

    let (min, max) = if total_items > 0 {
        (0.0, total_items as f64)
    } else {
        FALLBACK_BOUNDS
    };

    let sten = raw_to_sten(raw, min, max);

    Some(ScoreDraft {
        scale_id: composite_scale_id.to_string(),
        raw_score: raw,
        sten,
        percentile: sten_to_percentile(sten),
        theta: None,
        item_count: total_items,
    })
}
