//! Cognitive scale scoring: correctness vector → θ estimate → STEN.

use crate::irt::{
    estimate_ability_lenient, theta_to_sten, EstimateOptions, NormalPrior,
};
use crate::schema::IrtParams;
use crate::stats::sten_to_percentile;

use super::ScoreDraft;

/// Below this many administered items the Bayesian MAP variant is used;
/// the prior keeps short patterns (including degenerate ones) estimable.
pub const MAP_ITEM_THRESHOLD: usize = 5;

fn options_for(count: usize) -> EstimateOptions {
    if count < MAP_ITEM_THRESHOLD {
        EstimateOptions::map(NormalPrior::default())
    } else {
        EstimateOptions::mle()
    }
}

/// Running θ̂ over the administered items of one scale. Used for next-item
/// selection and the per-response θ snapshot. Empty input sits at the
/// prior mean.
pub fn running_theta(administered: &[(IrtParams, bool)]) -> f64 {
    if administered.is_empty() {
        return 0.0;
    }

    let (params, correctness): (Vec<_>, Vec<_>) = administered.iter().copied().unzip();
    estimate_ability_lenient(&correctness, &params, &options_for(administered.len()))
        .map(|estimate| estimate.theta)
        .unwrap_or(0.0)
}

/// Scores one cognitive scale from its administered (params, correct)
/// pairs. Returns `None` when nothing was administered.
pub fn score_scale(scale_id: &str, administered: &[(IrtParams, bool)]) -> Option<ScoreDraft> {
    if administered.is_empty() {
        return None;
    }

    let (params, correctness): (Vec<_>, Vec<_>) = administered.iter().copied().unzip();
    let estimate =
        estimate_ability_lenient(&correctness, &params, &options_for(administered.len())).ok()?;

    let sten = theta_to_sten(estimate.theta);
    let raw = correctness.iter().filter(|c| **c).count() as f64;

    Some(ScoreDraft {
        scale_id: scale_id.to_string(),
        raw_score: raw,
        sten,
        percentile: sten_to_percentile(sten),
        theta: Some(estimate.theta),
        item_count: administered.len() as u32,
    })
}
