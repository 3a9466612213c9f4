//! Profile finalization: turns the full response stream of a completed
//! assessment into its set of persisted `ScaleScore` rows.

use chrono::Utc;
use tracing::info;

use crate::config::{CoreConfig, ENGINE_VERSION};
use crate::ids;
use crate::schema::{
    Assessment, Domain, Item, ResponseRecord, Scale, ScaleScore, ScaleType, Section,
};
use crate::stats::{likert_sum_to_sten, sten_to_percentile};

use super::behavioral::{self, BehavioralScorerConfig, ForcedChoiceLoad, LikertResponse};
use super::cognitive;
use super::distortion::{self, DistortionReport};
use super::interests;
use super::learning_index;
use super::ScoreDraft;

pub struct ProfileScorer {
    behavioral: BehavioralScorerConfig,
}

impl ProfileScorer {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            behavioral: BehavioralScorerConfig {
                likert_weight: config.likert_weight,
            },
        }
    }

    /// Produces one row per active non-composite scale of each administered
    /// section, plus the learning-index composite, plus a distortion row
    /// when distortion items were answered.
    pub fn finalize(
        &self,
        assessment: &Assessment,
        scales: &[Scale],
        items: &[Item],
        responses: &[ResponseRecord],
    ) -> Vec<ScaleScore> {
        let joined = join_responses(items, responses);
        let sections = assessment.assessment_type.sections();
        let mut drafts: Vec<ScoreDraft> = Vec::new();

        if sections.contains(&Section::Cognitive) {
            let cognitive_drafts = self.score_cognitive(scales, &joined);
            self.score_learning_index(scales, &cognitive_drafts, &mut drafts);
            drafts.extend(cognitive_drafts);
        }

        if sections.contains(&Section::Behavioral) {
            drafts.extend(self.score_behavioral(scales, &joined));
            drafts.extend(self.score_distortion(scales, &joined));
        }

        if sections.contains(&Section::Interests) {
            let interest_scales: Vec<&Scale> = scales
                .iter()
                .filter(|s| s.active && s.scale_type == ScaleType::Interest)
                .collect();
            let pairs: Vec<_> = joined
                .iter()
                .filter(|(item, _)| item.domain == Domain::Interests)
                .filter_map(|(item, response)| {
                    response.value.as_choice().map(|choice| (*item, choice))
                })
                .collect();
            drafts.extend(interests::score_interests(&interest_scales, &pairs));
        }

        info!(
            assessment_id = %assessment.id,
            scale_count = drafts.len(),
            engine_version = ENGINE_VERSION,
            "profile finalized"
        );

        let computed_at = Utc::now();
        drafts
            .into_iter()
            .map(|draft| ScaleScore {
                id: ids::generate(),
                assessment_id: assessment.id.clone(),
                scale_id: draft.scale_id,
                raw_score: draft.raw_score,
                sten: draft.sten,
                percentile: draft.percentile,
                theta: draft.theta,
                item_count: draft.item_count,
                engine_version: ENGINE_VERSION.to_string(),
                scoring_run_id: ids::scoring_run().to_string(),
                computed_at,
            })
            .collect()
    }

    fn score_cognitive(
        &self,
        scales: &[Scale],
        joined: &[(&Item, &ResponseRecord)],
    ) -> Vec<ScoreDraft> {
        let mut cognitive_scales: Vec<&Scale> = scales
            .iter()
            .filter(|s| s.active && !s.is_composite() && s.scale_type == ScaleType::Cognitive)
            .collect();
        cognitive_scales.sort_by(|a, b| a.id.cmp(&b.id));

        cognitive_scales
            .iter()
            .filter_map(|scale| {
                let administered: Vec<_> = joined
                    .iter()
                    .filter(|(item, _)| {
                        item.domain == Domain::Cognitive && item.scale_id == scale.id
                    })
                    .map(|(item, response)| (item.irt, response.is_correct.unwrap_or(false)))
                    .collect();
                cognitive::score_scale(&scale.id, &administered)
            })
            .collect()
    }

    fn score_learning_index(
        &self,
        scales: &[Scale],
        cognitive_drafts: &[ScoreDraft],
        out: &mut Vec<ScoreDraft>,
    ) {
        let Some(composite) = scales
            .iter()
            .find(|s| s.active && s.is_composite() && s.domain == Domain::Cognitive)
        else {
            return;
        };

        let subs: Vec<&ScoreDraft> = cognitive_drafts
            .iter()
            .filter(|d| composite.composite_of.contains(&d.scale_id))
            .collect();

        if let Some(draft) = learning_index::score_composite(&composite.id, &subs) {
            out.push(draft);
        }
    }

    fn score_behavioral(
        &self,
        scales: &[Scale],
        joined: &[(&Item, &ResponseRecord)],
    ) -> Vec<ScoreDraft> {
        let mut trait_scales: Vec<&Scale> = scales
            .iter()
            .filter(|s| s.active && !s.is_composite() && s.scale_type == ScaleType::Trait)
            .collect();
        trait_scales.sort_by(|a, b| a.id.cmp(&b.id));

        trait_scales
            .iter()
            .filter_map(|scale| {
                let likert: Vec<LikertResponse> = joined
                    .iter()
                    .filter(|(item, _)| {
                        item.domain == Domain::Behavioral
                            && !item.is_distortion
                            && item.scale_id == scale.id
                    })
                    .filter_map(|(item, response)| {
                        response.value.as_numeric().map(|value| LikertResponse {
                            value,
                            reverse_keyed: item.reverse_keyed,
                        })
                    })
                    .collect();

                let forced: Vec<ForcedChoiceLoad> = joined
                    .iter()
                    .filter(|(item, _)| {
                        item.domain == Domain::Behavioral
                            && item.trait_loadings.contains_key(&scale.id)
                    })
                    .filter_map(|(item, response)| {
                        response.value.as_choice().map(|choice| ForcedChoiceLoad {
                            loading: item.trait_loadings[&scale.id],
                            chose_a: choice == crate::schema::Choice::A,
                        })
                    })
                    .collect();

                behavioral::score_scale(&scale.id, &likert, &forced, &self.behavioral)
            })
            .collect()
    }

    fn score_distortion(
        &self,
        scales: &[Scale],
        joined: &[(&Item, &ResponseRecord)],
    ) -> Option<ScoreDraft> {
        let answered: Vec<(&Item, f64)> = joined
            .iter()
            .filter(|(item, _)| item.is_distortion)
            .filter_map(|(item, response)| response.value.as_numeric().map(|v| (*item, v)))
            .collect();

        if answered.is_empty() {
            return None;
        }

        let scale_id = scales
            .iter()
            .find(|s| s.scale_type == ScaleType::Distortion)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| answered[0].0.scale_id.clone());

        let values: Vec<f64> = answered.iter().map(|(_, v)| *v).collect();
        let raw: f64 = values.iter().sum();
        let sten = likert_sum_to_sten(&values);

        Some(ScoreDraft {
            scale_id,
            raw_score: raw,
            sten,
            percentile: sten_to_percentile(sten),
            theta: None,
            item_count: values.len() as u32,
        })
    }
}

/// Validity report over the same response stream the scorers see.
pub fn distortion_report(
    items: &[Item],
    responses: &[ResponseRecord],
) -> Option<DistortionReport> {
    let joined = join_responses(items, responses);

    let distortion_values: Vec<f64> = joined
        .iter()
        .filter(|(item, _)| item.is_distortion)
        .filter_map(|(_, response)| response.value.as_numeric())
        .collect();

    let behavioral_stream: Vec<f64> = joined
        .iter()
        .filter(|(item, _)| item.domain == Domain::Behavioral)
        .filter_map(|(_, response)| response.value.as_numeric())
        .collect();

    distortion::evaluate(&distortion_values, &behavioral_stream)
}

/// Pairs each response with its item, preserving arrival order and
/// dropping responses to unknown items.
fn join_responses<'a>(
    items: &'a [Item],
    responses: &'a [ResponseRecord],
) -> Vec<(&'a Item, &'a ResponseRecord)> {
    responses
        .iter()
        .filter_map(|response| {
            items
                .iter()
                .find(|item| item.id == response.item_id)
                .map(|item| (item, response))
        })
        .collect()
}
