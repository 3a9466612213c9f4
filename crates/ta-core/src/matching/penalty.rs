//! Distance-decay penalty for a STEN landing outside a model band.

use serde::{Deserialize, Serialize};

use crate::schema::ModelScaleRange;

/// Quadratic decay coefficients: one step outside the band keeps 80% of
/// the credit, three steps keep 10%, five or more keep nothing.
const DECAY_LINEAR: f64 = 0.15;
const DECAY_QUADRATIC: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
    In,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::High => "high",
            Direction::Low => "low",
            Direction::In => "in",
        }
    }
}

/// Per-scale diagnostic for reporting and interview generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub scale_id: String,
    pub sten: u8,
    pub target_min: u8,
    pub target_max: u8,
    pub distance: u32,
    pub direction: Direction,
}

/// Integer STEN steps outside the band `[target_min, target_max]`; zero
/// inside.
pub fn band_distance(sten: u8, target_min: u8, target_max: u8) -> u32 {
    let below = target_min.saturating_sub(sten) as u32;
    let above = sten.saturating_sub(target_max) as u32;
    below + above
}

/// Credit retained at `distance` steps outside the band, in [0, 1].
pub fn distance_penalty(distance: u32) -> f64 {
    let d = distance as f64;
    (1.0 - (DECAY_LINEAR * d + DECAY_QUADRATIC * d * d)).max(0.0)
}

pub fn deviation_for(scale_id: &str, sten: u8, range: &ModelScaleRange) -> Deviation {
    let direction = if sten > range.target_max {
        Direction::High
    } else if sten < range.target_min {
        Direction::Low
    } else {
        Direction::In
    };

    Deviation {
        scale_id: scale_id.to_string(),
        sten,
        target_min: range.target_min,
        target_max: range.target_max,
        distance: band_distance(sten, range.target_min, range.target_max),
        direction,
    }
}
