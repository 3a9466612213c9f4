//! Validity layer: distortion ("faking good") scoring, response-pattern
//! checks over the behavioral stream, and the combined recommendation.

use serde::{Deserialize, Serialize};

use crate::stats::likert_sum_to_sten;

/// Minimum stream length before any pattern check fires.
const PATTERN_MIN_RESPONSES: usize = 5;
/// Share of stride-2 repeats that flags an alternating pattern.
const ALTERNATING_THRESHOLD: f64 = 0.8;
/// Relative window around the expected runs count that flags randomness.
const RANDOM_RUNS_TOLERANCE: f64 = 0.3;

/// High endorsement of "too good to be true" items is the distorted
/// direction: high STEN invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidityCategory {
    Valid,
    Warning,
    Invalid,
}

impl ValidityCategory {
    pub fn from_sten(sten: u8) -> Self {
        match sten {
            7..=10 => ValidityCategory::Invalid,
            4..=6 => ValidityCategory::Warning,
            _ => ValidityCategory::Valid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidityCategory::Valid => "valid",
            ValidityCategory::Warning => "warning",
            ValidityCategory::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRecommendation {
    Use,
    Interview,
    Discard,
}

impl MatchRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRecommendation::Use => "use",
            MatchRecommendation::Interview => "interview",
            MatchRecommendation::Discard => "discard",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePatterns {
    pub straight_line: bool,
    pub alternating: bool,
    pub random: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistortionReport {
    pub sten: u8,
    pub category: ValidityCategory,
    /// min(100, σ/1.5 · 100) over the behavioral stream; low values mean
    /// suspiciously uniform responding.
    pub consistency_score: f64,
    pub patterns: ResponsePatterns,
    pub recommendation: MatchRecommendation,
}

/// Evaluates the validity layer. `distortion_values` are the Likert
/// ratings on the distortion items; `behavioral_stream` is every
/// behavioral Likert rating in arrival order (distortion items included).
/// Returns `None` when no distortion items were administered.
pub fn evaluate(distortion_values: &[f64], behavioral_stream: &[f64]) -> Option<DistortionReport> {
    if distortion_values.is_empty() {
        return None;
    }

    let sten = likert_sum_to_sten(distortion_values);
    let category = ValidityCategory::from_sten(sten);
    let patterns = detect_patterns(behavioral_stream);

    let recommendation = if category == ValidityCategory::Invalid || patterns.random {
        MatchRecommendation::Discard
    } else if category == ValidityCategory::Warning
        || patterns.straight_line
        || patterns.alternating
    {
        MatchRecommendation::Interview
    } else {
        MatchRecommendation::Use
    };

    Some(DistortionReport {
        sten,
        category,
        consistency_score: consistency_score(behavioral_stream),
        patterns,
        recommendation,
    })
}

pub fn consistency_score(stream: &[f64]) -> f64 {
    if stream.is_empty() {
        return 0.0;
    }

    let n = stream.len() as f64;
    let mean = stream.iter().sum::<f64>() / n;
    let variance = stream.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sigma = variance.sqrt();

    (sigma / 1.5 * 100.0).min(100.0)
}

pub fn detect_patterns(stream: &[f64]) -> ResponsePatterns {
    if stream.len() < PATTERN_MIN_RESPONSES {
        return ResponsePatterns::default();
    }

    ResponsePatterns {
        straight_line: stream.windows(2).all(|w| w[0] == w[1]),
        alternating: is_alternating(stream),
        random: is_random_runs(stream),
    }
}

fn is_alternating(stream: &[f64]) -> bool {
    let comparisons = stream.len() - 2;
    if comparisons == 0 {
        return false;
    }

    let repeats = (0..comparisons)
        .filter(|i| stream[*i] == stream[*i + 2])
        .count();
    repeats as f64 / comparisons as f64 >= ALTERNATING_THRESHOLD
}

/// Runs-up-and-down test: for a random stream the expected number of
/// monotone runs is (2n − 1) / 3; landing inside the tolerance window is
/// the signature of effortless random clicking.
fn is_random_runs(stream: &[f64]) -> bool {
    let signs: Vec<i8> = stream
        .windows(2)
        .filter_map(|w| {
            let diff = w[1] - w[0];
            if diff > 0.0 {
                Some(1)
            } else if diff < 0.0 {
                Some(-1)
            } else {
                None
            }
        })
        .collect();

    if signs.is_empty() {
        return false;
    }

    let runs = 1 + signs.windows(2).filter(|w| w[0] != w[1]).count();
    let expected = (2.0 * stream.len() as f64 - 1.0) / 3.0;

    (runs as f64 - expected).abs() < RANDOM_RUNS_TOLERANCE * expected
}
