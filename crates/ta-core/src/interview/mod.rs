//! Interview-question generation from job-match deviations.
//!
//! Pure lookup: each out-of-band deviation becomes one block of curated
//! probes from the catalog, or generic templates for scales the catalog
//! does not know.

pub mod catalog;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::matching::penalty::{Deviation, Direction};
use crate::schema::Scale;

use catalog::{GENERIC_HIGH_TEMPLATES, GENERIC_LOW_TEMPLATES, QUESTION_CATALOG};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: String,
    pub text: String,
    pub category: String,
}

/// One block per out-of-band deviation: the scale context plus its probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviationBlock {
    pub scale_id: String,
    pub scale_name: String,
    pub direction: Direction,
    pub sten: u8,
    pub target_min: u8,
    pub target_max: u8,
    pub distance: u32,
    pub questions: Vec<InterviewQuestion>,
}

/// Builds interview blocks for every deviation with direction high or low.
/// In-band deviations are skipped; unknown scales fall back to two generic
/// templates interpolating the scale name.
pub fn generate(deviations: &[Deviation], scales: &[Scale]) -> Vec<DeviationBlock> {
    let names: HashMap<&str, &str> = scales
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();

    deviations
        .iter()
        .filter(|d| d.direction != Direction::In)
        .map(|deviation| {
            let scale_name = names
                .get(deviation.scale_id.as_str())
                .map(|name| name.to_string())
                .unwrap_or_else(|| deviation.scale_id.replace('_', " "));

            DeviationBlock {
                scale_id: deviation.scale_id.clone(),
                scale_name: scale_name.clone(),
                direction: deviation.direction,
                sten: deviation.sten,
                target_min: deviation.target_min,
                target_max: deviation.target_max,
                distance: deviation.distance,
                questions: questions_for(&deviation.scale_id, deviation.direction, &scale_name),
            }
        })
        .collect()
}

fn questions_for(scale_id: &str, direction: Direction, scale_name: &str) -> Vec<InterviewQuestion> {
    if let Some(probes) = QUESTION_CATALOG.get(&(scale_id, direction)) {
        return probes
            .iter()
            .map(|q| InterviewQuestion {
                id: q.id.to_string(),
                text: q.text.to_string(),
                category: q.category.to_string(),
            })
            .collect();
    }

    let templates = match direction {
        Direction::Low => &GENERIC_LOW_TEMPLATES,
        _ => &GENERIC_HIGH_TEMPLATES,
    };

    templates
        .iter()
        .map(|(id, template)| InterviewQuestion {
            id: id.to_string(),
            text: template.replace("{scale}", scale_name),
            category: "generic".to_string(),
        })
        .collect()
}
