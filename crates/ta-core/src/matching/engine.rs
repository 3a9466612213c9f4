//! Fit computation: profile × performance model → overall percentage with
//! per-domain breakdown and per-scale diagnostics.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ENGINE_VERSION;
use crate::schema::{Domain, PerformanceModel, Scale, ScaleScore, ScaleType};
use crate::scoring::distortion::ValidityCategory;
use crate::scoring::interests::top_interests;

use super::penalty::{deviation_for, distance_penalty, Deviation};
use super::weights::DOMAIN_WEIGHTS;

/// Baseline interests fit with zero positional matches, and the credit
/// added per match; three matches land at 100.
const INTEREST_FIT_BASE: f64 = 33.33;
const INTEREST_FIT_STEP: f64 = 22.22;

/// Selection-report result for one (assessment, model) pairing. Derived,
/// not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub assessment_id: String,
    pub model_id: String,

    /// Weighted overall fit, 0..=100.
    pub overall: u8,
    pub cognitive_fit: f64,
    pub behavioral_fit: f64,
    /// Rank-order fit: one of 33, 56, 78, 100.
    pub interests_fit: f64,

    pub deviations: Vec<Deviation>,
    /// Model scales the profile had no score for. Diagnostics, not an
    /// error: a weakly-specified model simply contributes fewer scales.
    pub missing_scales: Vec<String>,

    /// Distortion verdict carried onto the report. Callers SHOULD refuse
    /// to base decisions on an `invalid` profile.
    pub validity: Option<ValidityCategory>,

    pub engine_version: String,
    pub matched_at: DateTime<Utc>,
}

/// Computes the fit of a scored profile against a performance model.
///
/// Missing scale scores reduce the contributing weight instead of
/// failing; they are listed in `missing_scales`.
pub fn compute_match(
    assessment_id: &str,
    model: &PerformanceModel,
    scores: &[ScaleScore],
    scales: &[Scale],
) -> JobMatch {
    let scale_map: HashMap<&str, &Scale> = scales.iter().map(|s| (s.id.as_str(), s)).collect();
    let score_map: HashMap<&str, &ScaleScore> =
        scores.iter().map(|s| (s.scale_id.as_str(), s)).collect();

    let mut accum: HashMap<Domain, (f64, f64)> = HashMap::new();
    let mut deviations = Vec::new();
    let mut missing_scales = Vec::new();

    for range in &model.ranges {
        let Some(scale) = scale_map.get(range.scale_id.as_str()) else {
            missing_scales.push(range.scale_id.clone());
            continue;
        };
        let Some(score) = score_map.get(range.scale_id.as_str()) else {
            missing_scales.push(range.scale_id.clone());
            continue;
        };

        let deviation = deviation_for(&range.scale_id, score.sten, range);

        if scale.domain != Domain::Interests {
            let (weighted, weight) = accum.entry(scale.domain).or_insert((0.0, 0.0));
            *weighted += distance_penalty(deviation.distance) * range.weight;
            *weight += range.weight;
        }

        deviations.push(deviation);
    }

    let cognitive_fit = domain_fit(&accum, Domain::Cognitive);
    let behavioral_fit = domain_fit(&accum, Domain::Behavioral);
    let interests_fit = interests_fit(model, scores, &scale_map);

    let validity = scores
        .iter()
        .find(|score| {
            scale_map
                .get(score.scale_id.as_str())
                .map(|s| s.scale_type == ScaleType::Distortion)
                .unwrap_or(false)
        })
        .map(|score| ValidityCategory::from_sten(score.sten));

    JobMatch {
        assessment_id: assessment_id.to_string(),
        model_id: model.id.clone(),
        overall: aggregate_overall(cognitive_fit, behavioral_fit, interests_fit),
        cognitive_fit,
        behavioral_fit,
        interests_fit,
        deviations,
        missing_scales,
        validity,
        engine_version: ENGINE_VERSION.to_string(),
        matched_at: Utc::now(),
    }
}

fn domain_fit(accum: &HashMap<Domain, (f64, f64)>, domain: Domain) -> f64 {
    match accum.get(&domain) {
        Some((weighted, weight)) if *weight > 0.0 => weighted / weight * 100.0,
        _ => 0.0,
    }
}

/// Interests are matched by rank order, not distance: the candidate's
/// top-three interests against the model's three highest bands.
fn interests_fit(
    model: &PerformanceModel,
    scores: &[ScaleScore],
    scale_map: &HashMap<&str, &Scale>,
) -> f64 {
    let interest_scores: Vec<&ScaleScore> = scores
        .iter()
        .filter(|score| {
            scale_map
                .get(score.scale_id.as_str())
                .map(|s| s.scale_type == ScaleType::Interest)
                .unwrap_or(false)
        })
        .collect();
    let candidate_top = top_interests(&interest_scores);

    let mut model_ranges: Vec<_> = model
        .ranges
        .iter()
        .filter(|range| {
            scale_map
                .get(range.scale_id.as_str())
                .map(|s| s.scale_type == ScaleType::Interest)
                .unwrap_or(false)
        })
        .collect();
    model_ranges.sort_by(|a, b| {
        b.midpoint()
            .partial_cmp(&a.midpoint())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.scale_id.cmp(&b.scale_id))
    });

    let matches = (0..3)
        .filter(|i| {
            match (candidate_top.get(*i), model_ranges.get(*i)) {
                (Some(candidate), Some(range)) => candidate.scale_id == range.scale_id,
                _ => false,
            }
        })
        .count();

    (INTEREST_FIT_BASE + matches as f64 * INTEREST_FIT_STEP).round()
}

/// Weighted overall fit on the 0..=100 scale.
pub fn aggregate_overall(cognitive_fit: f64, behavioral_fit: f64, interests_fit: f64) -> u8 {
    let overall = DOMAIN_WEIGHTS.cognitive * cognitive_fit
        + DOMAIN_WEIGHTS.behavioral * behavioral_fit
        + DOMAIN_WEIGHTS.interests * interests_fit;
    overall.round().clamp(0.0, 100.0) as u8
}
