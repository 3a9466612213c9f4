//! Three-parameter-logistic IRT engine: response probability, item
//! information, Newton–Raphson ability estimation (MLE and Bayesian MAP),
//! maximum-information item selection and the CAT stopping rule.

use thiserror::Error;
use tracing::warn;

use crate::schema::{IrtParams, Item};

/// Hard bounds on the ability scale. Estimates are clamped here on every
/// iteration and degenerate patterns substitute the matching bound.
pub const THETA_MIN: f64 = -4.0;
pub const THETA_MAX: f64 = 4.0;

/// P(correct | θ) under the 3PL model.
pub fn probability(theta: f64, params: &IrtParams) -> f64 {
    params.c + (1.0 - params.c) / (1.0 + (-params.a * (theta - params.b)).exp())
}

/// Fisher information contributed by one item at ability θ. Non-negative,
/// and for c = 0 it peaks at θ = b.
pub fn information(theta: f64, params: &IrtParams) -> f64 {
    let u = (params.a * (theta - params.b)).exp();
    let one_plus = 1.0 + u;
    params.a * params.a * (1.0 - params.c) * u * u / (one_plus * one_plus * (params.c + u))
}

/// Normal prior on θ for the Bayesian MAP variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalPrior {
    pub mean: f64,
    pub variance: f64,
}

impl Default for NormalPrior {
    fn default() -> Self {
        Self {
            mean: 0.0,
            variance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EstimateOptions {
    /// When set, prior terms are added to both derivatives (MAP). The prior
    /// also regularizes degenerate all-correct / all-incorrect patterns,
    /// which plain MLE rejects.
    pub prior: Option<NormalPrior>,
    pub max_iterations: u32,
    pub convergence: f64,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            prior: None,
            max_iterations: 50,
            convergence: 1e-3,
        }
    }
}

impl EstimateOptions {
    pub fn mle() -> Self {
        Self::default()
    }

    pub fn map(prior: NormalPrior) -> Self {
        Self {
            prior: Some(prior),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityEstimate {
    pub theta: f64,
    /// 1/√(ΣI(θ̂)); infinite when no information was collected.
    pub sem: f64,
    pub iterations: u32,
    pub used_prior: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimationError {
    #[error("no responses to estimate from")]
    Empty,
    #[error("response and parameter vectors differ in length")]
    LengthMismatch,
    /// All-correct or all-incorrect MLE input. Recoverable: the caller
    /// substitutes the matching θ bound.
    #[error("estimation diverged on a degenerate response pattern")]
    Diverged { all_correct: bool },
}

/// Newton–Raphson estimate of θ from a 0/1 correctness vector.
pub fn estimate_ability(
    responses: &[bool],
    params: &[IrtParams],
    options: &EstimateOptions,
) -> Result<AbilityEstimate, EstimationError> {
    if responses.is_empty() {
        return Err(EstimationError::Empty);
    }
    if responses.len() != params.len() {
        return Err(EstimationError::LengthMismatch);
    }

    if options.prior.is_none() {
        if responses.iter().all(|r| *r) {
            return Err(EstimationError::Diverged { all_correct: true });
        }
        if responses.iter().all(|r| !*r) {
            return Err(EstimationError::Diverged { all_correct: false });
        }
    }

    let mut theta = options.prior.map(|p| p.mean).unwrap_or(0.0);
    let mut iterations = 0;

    while iterations < options.max_iterations {
        let mut slope = 0.0;
        let mut curvature = 0.0;

        for (correct, item) in responses.iter().zip(params) {
            let p = probability(theta, item);
            let u = if *correct { 1.0 } else { 0.0 };
            slope += (u - p) * item.a * (1.0 - item.c) / (1.0 - p);
            curvature -= information(theta, item);
        }

        if let Some(prior) = options.prior {
            slope -= (theta - prior.mean) / prior.variance;
            curvature -= 1.0 / prior.variance;
        }

        if curvature.abs() < 1e-10 {
            break;
        }

        let delta = slope / curvature;
        theta = (theta - delta).clamp(THETA_MIN, THETA_MAX);
        iterations += 1;

        if delta.abs() < options.convergence {
            break;
        }
    }

    Ok(AbilityEstimate {
        theta,
        sem: sem_at(theta, params),
        iterations,
        used_prior: options.prior.is_some(),
    })
}

/// Like [`estimate_ability`] but recovers degenerate patterns with the
/// sentinel θ bound instead of failing. `Empty`/`LengthMismatch` still
/// propagate — those are caller violations, not data properties.
pub fn estimate_ability_lenient(
    responses: &[bool],
    params: &[IrtParams],
    options: &EstimateOptions,
) -> Result<AbilityEstimate, EstimationError> {
    match estimate_ability(responses, params, options) {
        Err(EstimationError::Diverged { all_correct }) => {
            let theta = if all_correct { THETA_MAX } else { THETA_MIN };
            warn!(
                item_count = responses.len(),
                all_correct, theta, "degenerate response pattern, substituting sentinel theta"
            );
            Ok(AbilityEstimate {
                theta,
                sem: sem_at(theta, params),
                iterations: 0,
                used_prior: false,
            })
        }
        other => other,
    }
}

fn sem_at(theta: f64, params: &[IrtParams]) -> f64 {
    let total: f64 = params.iter().map(|p| information(theta, p)).sum();
    if total > 0.0 {
        1.0 / total.sqrt()
    } else {
        f64::INFINITY
    }
}

/// θ on the STEN scale: round(5.5 + 2θ) clamped to [1, 10].
pub fn theta_to_sten(theta: f64) -> u8 {
    (5.5 + 2.0 * theta).round().clamp(1.0, 10.0) as u8
}

/// Picks the not-yet-administered item with maximum information at θ̂.
/// Ties break on the lexically smaller item id so selection is stable.
pub fn select_next_item<'a, I>(theta: f64, candidates: I) -> Option<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut best: Option<(&Item, f64)> = None;

    for item in candidates {
        let info = information(theta, &item.irt);
        match best {
            None => best = Some((item, info)),
            Some((current, current_info)) => {
                if info > current_info || (info == current_info && item.id < current.id) {
                    best = Some((item, info));
                }
            }
        }
    }

    best.map(|(item, _)| item)
}

/// CAT stopping rule: stop at the item ceiling, or once the floor is met
/// and the measurement error is small enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoppingRule {
    pub min_items: usize,
    pub max_items: usize,
    pub target_sem: f64,
}

impl Default for StoppingRule {
    fn default() -> Self {
        Self {
            min_items: 5,
            max_items: 20,
            target_sem: 0.35,
        }
    }
}

impl StoppingRule {
    pub fn sem(total_information: f64) -> f64 {
        if total_information > 0.0 {
            1.0 / total_information.sqrt()
        } else {
            f64::INFINITY
        }
    }

    pub fn should_stop(&self, administered: usize, total_information: f64) -> bool {
        if administered >= self.max_items {
            return true;
        }
        administered >= self.min_items && Self::sem(total_information) <= self.target_sem
    }
}
