//! Section-aware next-item selection.
//!
//! Pure logic over the catalog and the response stream so far: the
//! cognitive section runs an adaptive test per scale, the behavioral and
//! interest sections walk their item banks in a fixed order. Section
//! boundaries come back as explicit transitions; the driver decides
//! whether to ask again immediately.

use serde::{Deserialize, Serialize};

use crate::irt::{information, select_next_item, StoppingRule};
use crate::schema::{
    Assessment, Domain, Item, ResponseRecord, Scale, ScaleType, Section,
};
use crate::scoring::cognitive::running_theta;

/// What the examinee sees next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextOutcome {
    Item {
        item: Item,
        section: Section,
        item_index: u32,
    },
    SectionComplete {
        next_section: Option<Section>,
    },
}

/// Selects the next item for an in-progress assessment, or signals that
/// the current section is exhausted.
pub fn select_next(
    assessment: &Assessment,
    section: Section,
    scales: &[Scale],
    items: &[Item],
    responses: &[ResponseRecord],
    cat: &StoppingRule,
) -> NextOutcome {
    let answered: Vec<&str> = responses.iter().map(|r| r.item_id.as_str()).collect();

    let next = match section {
        Section::Cognitive => next_cognitive(scales, items, responses, &answered, cat),
        Section::Behavioral => next_behavioral(items, &answered),
        Section::Interests => next_interests(items, &answered),
    };

    match next {
        Some(item) => NextOutcome::Item {
            item: item.clone(),
            section,
            item_index: assessment.current_item_index,
        },
        None => NextOutcome::SectionComplete {
            next_section: assessment.next_section(section),
        },
    }
}

/// Per-scale CAT: cognitive scales run in stable id order; within the
/// current scale the maximum-information item is chosen until the stopping
/// rule (or the item bank) ends it, then the next scale begins.
fn next_cognitive<'a>(
    scales: &[Scale],
    items: &'a [Item],
    responses: &[ResponseRecord],
    answered: &[&str],
    cat: &StoppingRule,
) -> Option<&'a Item> {
    let mut cognitive_scales: Vec<&Scale> = scales
        .iter()
        .filter(|s| s.active && !s.is_composite() && s.scale_type == ScaleType::Cognitive)
        .collect();
    cognitive_scales.sort_by(|a, b| a.id.cmp(&b.id));

    for scale in cognitive_scales {
        let administered: Vec<_> = responses
            .iter()
            .filter_map(|response| {
                items
                    .iter()
                    .find(|item| {
                        item.id == response.item_id
                            && item.scale_id == scale.id
                            && item.domain == Domain::Cognitive
                    })
                    .map(|item| (item.irt, response.is_correct.unwrap_or(false)))
            })
            .collect();

        let theta = running_theta(&administered);
        let total_information: f64 = administered
            .iter()
            .map(|(params, _)| information(theta, params))
            .sum();

        if cat.should_stop(administered.len(), total_information) {
            continue;
        }

        let remaining = items.iter().filter(|item| {
            item.active
                && item.domain == Domain::Cognitive
                && item.scale_id == scale.id
                && !answered.contains(&item.id.as_str())
        });

        if let Some(item) = select_next_item(theta, remaining) {
            return Some(item);
        }
        // Item bank exhausted before the stopping rule fired: fall through
        // to the next scale.
    }

    None
}

/// Deterministic sequence over the unanswered behavioral bank, ordered by
/// scale then authored order. Distortion items ride along interleaved;
/// their flag lets the scorers separate them later.
fn next_behavioral<'a>(items: &'a [Item], answered: &[&str]) -> Option<&'a Item> {
    items
        .iter()
        .filter(|item| {
            item.active
                && item.domain == Domain::Behavioral
                && !answered.contains(&item.id.as_str())
        })
        .min_by(|a, b| {
            a.scale_id
                .cmp(&b.scale_id)
                .then(a.order.cmp(&b.order))
                .then(a.id.cmp(&b.id))
        })
}

/// Deterministic sweep over the forced-choice interest pairs.
fn next_interests<'a>(items: &'a [Item], answered: &[&str]) -> Option<&'a Item> {
    items
        .iter()
        .filter(|item| {
            item.active
                && item.domain == Domain::Interests
                && !answered.contains(&item.id.as_str())
        })
        .min_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use chrono::Utc;

    use crate::schema::{
        AssessmentStatus, AssessmentType, IrtParams, ItemFormat, PairScales, ResponseValue,
    };

    fn assessment(section: Section) -> Assessment {
        Assessment {
            id: "a-1".into(),
            candidate_id: "c-1".into(),
            assessment_type: AssessmentType::Full,
            status: AssessmentStatus::InProgress,
            current_section: Some(section),
            current_item_index: 0,
            started_at: Some(Utc::now()),
            completed_at: None,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn scale(id: &str, domain: Domain, scale_type: ScaleType) -> Scale {
        Scale {
            id: id.into(),
            name: id.into(),
            domain,
            scale_type,
            composite_of: vec![],
            active: true,
        }
    }

    fn item(id: &str, scale_id: &str, domain: Domain, b: f64, order: i32) -> Item {
        Item {
            id: id.into(),
            scale_id: scale_id.into(),
            text: String::new(),
            format: match domain {
                Domain::Cognitive => ItemFormat::MultipleChoice,
                Domain::Behavioral => ItemFormat::Likert,
                Domain::Interests => ItemFormat::ForcedChoice,
            },
            options: vec![],
            correct_answer: (domain == Domain::Cognitive).then(|| "x".to_string()),
            irt: IrtParams { a: 1.0, b, c: 0.2 },
            domain,
            is_distortion: false,
            active: true,
            order,
            reverse_keyed: false,
            pair_scales: (domain == Domain::Interests).then(|| PairScales {
                option_a: "realistic".into(),
                option_b: "social".into(),
            }),
            trait_loadings: HashMap::new(),
        }
    }

    fn response(item_id: &str, is_correct: Option<bool>) -> ResponseRecord {
        ResponseRecord {
            id: format!("r-{item_id}"),
            assessment_id: "a-1".into(),
            item_id: item_id.into(),
            value: ResponseValue::Likert(3),
            response_time_ms: 700,
            is_correct,
            theta_snapshot: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn cognitive_selection_picks_most_informative() {
        let scales = vec![scale("numeric_reasoning", Domain::Cognitive, ScaleType::Cognitive)];
        let items = vec![
            item("i-easy", "numeric_reasoning", Domain::Cognitive, -2.0, 0),
            item("i-mid", "numeric_reasoning", Domain::Cognitive, 0.0, 1),
            item("i-hard", "numeric_reasoning", Domain::Cognitive, 2.0, 2),
        ];

        let outcome = select_next(
            &assessment(Section::Cognitive),
            Section::Cognitive,
            &scales,
            &items,
            &[],
            &StoppingRule::default(),
        );

        // No responses yet: θ̂ = 0, so the mid-difficulty item wins.
        match outcome {
            NextOutcome::Item { item, section, .. } => {
                assert_eq!(item.id, "i-mid");
                assert_eq!(section, Section::Cognitive);
            }
            other => panic!("expected an item, got {other:?}"),
        }
    }

    #[test]
    fn cognitive_scales_run_in_id_order() {
        let scales = vec![
            scale("verbal_reasoning", Domain::Cognitive, ScaleType::Cognitive),
            scale("numeric_reasoning", Domain::Cognitive, ScaleType::Cognitive),
        ];
        let items = vec![
            item("n-1", "numeric_reasoning", Domain::Cognitive, 0.0, 0),
            item("v-1", "verbal_reasoning", Domain::Cognitive, 0.0, 0),
        ];

        let outcome = select_next(
            &assessment(Section::Cognitive),
            Section::Cognitive,
            &scales,
            &items,
            &[],
            &StoppingRule::default(),
        );

        match outcome {
            NextOutcome::Item { item, .. } => assert_eq!(item.scale_id, "numeric_reasoning"),
            other => panic!("expected an item, got {other:?}"),
        }
    }

    #[test]
    fn exhausted_cognitive_bank_advances_section() {
        let scales = vec![scale("numeric_reasoning", Domain::Cognitive, ScaleType::Cognitive)];
        let items = vec![item("n-1", "numeric_reasoning", Domain::Cognitive, 0.0, 0)];
        let responses = vec![response("n-1", Some(true))];

        let outcome = select_next(
            &assessment(Section::Cognitive),
            Section::Cognitive,
            &scales,
            &items,
            &responses,
            &StoppingRule::default(),
        );

        assert_eq!(
            outcome,
            NextOutcome::SectionComplete {
                next_section: Some(Section::Behavioral)
            }
        );
    }

    #[test]
    fn stopping_rule_ends_a_scale_at_the_ceiling() {
        let scales = vec![scale("numeric_reasoning", Domain::Cognitive, ScaleType::Cognitive)];
        let mut items: Vec<Item> = (0..25)
            .map(|i| item(&format!("n-{i:02}"), "numeric_reasoning", Domain::Cognitive, 0.0, i))
            .collect();
        // Unanswered spares remain in the bank.
        items.push(item("n-spare", "numeric_reasoning", Domain::Cognitive, 0.0, 99));

        let responses: Vec<ResponseRecord> = (0..20)
            .map(|i| response(&format!("n-{i:02}"), Some(i % 2 == 0)))
            .collect();

        let outcome = select_next(
            &assessment(Section::Cognitive),
            Section::Cognitive,
            &scales,
            &items,
            &responses,
            &StoppingRule::default(),
        );

        assert_eq!(
            outcome,
            NextOutcome::SectionComplete {
                next_section: Some(Section::Behavioral)
            }
        );
    }

    #[test]
    fn behavioral_walks_scale_then_order() {
        let items = vec![
            item("b-2", "sociability", Domain::Behavioral, 0.0, 0),
            item("b-1", "assertiveness", Domain::Behavioral, 0.0, 1),
            item("b-0", "assertiveness", Domain::Behavioral, 0.0, 0),
        ];

        let outcome = select_next(
            &assessment(Section::Behavioral),
            Section::Behavioral,
            &[],
            &items,
            &[],
            &StoppingRule::default(),
        );

        match outcome {
            NextOutcome::Item { item, .. } => assert_eq!(item.id, "b-0"),
            other => panic!("expected an item, got {other:?}"),
        }

        let outcome = select_next(
            &assessment(Section::Behavioral),
            Section::Behavioral,
            &[],
            &items,
            &[response("b-0", None), response("b-1", None)],
            &StoppingRule::default(),
        );

        match outcome {
            NextOutcome::Item { item, .. } => assert_eq!(item.id, "b-2"),
            other => panic!("expected an item, got {other:?}"),
        }
    }

    #[test]
    fn interests_sweep_ends_with_no_next_section() {
        let items = vec![
            item("p-0", "realistic", Domain::Interests, 0.0, 0),
            item("p-1", "realistic", Domain::Interests, 0.0, 1),
        ];
        let responses = vec![response("p-0", None), response("p-1", None)];

        let outcome = select_next(
            &assessment(Section::Interests),
            Section::Interests,
            &[],
            &items,
            &responses,
            &StoppingRule::default(),
        );

        assert_eq!(outcome, NextOutcome::SectionComplete { next_section: None });
    }

    #[test]
    fn inactive_items_are_never_served() {
        let mut inactive = item("b-inactive", "assertiveness", Domain::Behavioral, 0.0, 0);
        inactive.active = false;
        let items = vec![inactive];

        let outcome = select_next(
            &assessment(Section::Behavioral),
            Section::Behavioral,
            &[],
            &items,
            &[],
            &StoppingRule::default(),
        );

        assert_eq!(
            outcome,
            NextOutcome::SectionComplete {
                next_section: Some(Section::Interests)
            }
        );
    }
}
