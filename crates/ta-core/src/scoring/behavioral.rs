//! Behavioral trait scoring: Likert sums with reverse keying, forced-choice
//! loading integration, and the weighted combination of the two when a
//! scale has both kinds of evidence.

use crate::stats::{likert_sum_to_sten, sten_to_percentile};

use super::ScoreDraft;

#[derive(Debug, Clone, Copy)]
pub struct BehavioralScorerConfig {
    /// Share of the combined score carried by the Likert component; the
    /// remainder goes to forced choice. Exposed rather than hard-wired.
    pub likert_weight: f64,
}

impl Default for BehavioralScorerConfig {
    fn default() -> Self {
        Self { likert_weight: 0.7 }
    }
}

/// One Likert answer attributed to the scale being scored.
#[derive(Debug, Clone, Copy)]
pub struct LikertResponse {
    /// Raw rating 1..=5.
    pub value: f64,
    pub reverse_keyed: bool,
}

/// One forced-choice answer on a block that loads on the scale being
/// scored: the block's signed loading for this trait, and which side the
/// examinee picked (A counts positive, B negative).
#[derive(Debug, Clone, Copy)]
pub struct ForcedChoiceLoad {
    pub loading: f64,
    pub chose_a: bool,
}

/// Scores one behavioral scale. Returns `None` when the scale has no
/// evidence of either kind.
pub fn score_scale(
    scale_id: &str,
    likert: &[LikertResponse],
    forced: &[ForcedChoiceLoad],
    config: &BehavioralScorerConfig,
) -> Option<ScoreDraft> {
    let likert_part = score_likert(likert);
    let forced_part = score_forced_choice(forced);

    let (raw, sten) = match (likert_part, forced_part) {
        (Some((raw_l, sten_l)), Some((raw_f, sten_f))) => {
            let w = config.likert_weight;
            let raw = w * raw_l + (1.0 - w) * raw_f;
            let sten = (w * sten_l as f64 + (1.0 - w) * sten_f as f64)
                .round()
                .clamp(1.0, 10.0) as u8;
            (raw, sten)
        }
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => return None,
    };

    Some(ScoreDraft {
        scale_id: scale_id.to_string(),
        raw_score: raw,
        sten,
        percentile: sten_to_percentile(sten),
        theta: None,
        item_count: (likert.len() + forced.len()) as u32,
    })
}

fn score_likert(likert: &[LikertResponse]) -> Option<(f64, u8)> {
    if likert.is_empty() {
        return None;
    }

    let values: Vec<f64> = likert
        .iter()
        .map(|r| if r.reverse_keyed { 6.0 - r.value } else { r.value })
        .collect();
    let raw: f64 = values.iter().sum();

    Some((raw, likert_sum_to_sten(&values)))
}

/// Ipsative forced-choice evidence mapped onto the Likert [1, 5] range:
/// the accumulated signed loading is placed within its attainable span and
/// expressed as an equivalent per-item rating.
fn score_forced_choice(forced: &[ForcedChoiceLoad]) -> Option<(f64, u8)> {
    if forced.is_empty() {
        return None;
    }

    let total: f64 = forced
        .iter()
        .map(|f| if f.chose_a { f.loading } else { -f.loading })
        .sum();
    let span: f64 = forced.iter().map(|f| f.loading.abs()).sum();
    if span <= 0.0 {
        return None;
    }

    let proportion = ((total + span) / (2.0 * span)).clamp(0.0, 1.0);
    let per_item = 1.0 + 4.0 * proportion;
    let values = vec![per_item; forced.len()];
    let raw: f64 = values.iter().sum();

    Some((raw, likert_sum_to_sten(&values)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn likert(values: &[f64]) -> Vec<LikertResponse> {
        values
            .iter()
            .map(|v| LikertResponse {
                value: *v,
                reverse_keyed: false,
            })
            .collect()
    }

    #[test]
    fn no_evidence_produces_no_score() {
        let config = BehavioralScorerConfig::default();
        assert!(score_scale("assertiveness", &[], &[], &config).is_none());
    }

    #[test]
    fn likert_only_uses_sum_bounds() {
        let config = BehavioralScorerConfig::default();
        let draft = score_scale("assertiveness", &likert(&[5.0; 6]), &[], &config).unwrap();
        assert_eq!(draft.sten, 10);
        assert_eq!(draft.raw_score, 30.0);
        assert_eq!(draft.item_count, 6);

        let draft = score_scale("assertiveness", &likert(&[3.0; 6]), &[], &config).unwrap();
        assert_eq!(draft.sten, 6);
    }

    #[test]
    fn reverse_keyed_items_are_inverted() {
        let config = BehavioralScorerConfig::default();
        let responses = vec![
            LikertResponse {
                value: 5.0,
                reverse_keyed: true,
            },
            LikertResponse {
                value: 5.0,
                reverse_keyed: true,
            },
        ];
        let draft = score_scale("cooperativeness", &responses, &[], &config).unwrap();
        // 5s on reverse-keyed items count as 1s.
        assert_eq!(draft.raw_score, 2.0);
        assert_eq!(draft.sten, 1);
    }

    #[test]
    fn forced_choice_only_maps_onto_likert_range() {
        let config = BehavioralScorerConfig::default();
        let all_for = vec![
            ForcedChoiceLoad {
                loading: 1.0,
                chose_a: true,
            };
            4
        ];
        let draft = score_scale("assertiveness", &[], &all_for, &config).unwrap();
        assert_eq!(draft.sten, 10);

        let all_against = vec![
            ForcedChoiceLoad {
                loading: 1.0,
                chose_a: false,
            };
            4
        ];
        let draft = score_scale("assertiveness", &[], &all_against, &config).unwrap();
        assert_eq!(draft.sten, 1);
    }

    #[test]
    fn negative_loadings_flip_the_choice_direction() {
        let config = BehavioralScorerConfig::default();
        let forced = vec![
            ForcedChoiceLoad {
                loading: -1.0,
                chose_a: true,
            };
            4
        ];
        let draft = score_scale("manageability", &[], &forced, &config).unwrap();
        assert_eq!(draft.sten, 1);
    }

    #[test]
    fn combination_weights_both_sources() {
        let config = BehavioralScorerConfig::default();
        // Likert says ceiling, forced choice says floor.
        let forced = vec![
            ForcedChoiceLoad {
                loading: 1.0,
                chose_a: false,
            };
            4
        ];
        let draft = score_scale("assertiveness", &likert(&[5.0; 6]), &forced, &config).unwrap();

        // 0.7·10 + 0.3·1 = 7.3 → 7, rounded after combination.
        assert_eq!(draft.sten, 7);
        assert_eq!(draft.item_count, 10);
    }

    #[test]
    fn combination_respects_configured_weight() {
        let config = BehavioralScorerConfig { likert_weight: 0.5 };
        let forced = vec![
            ForcedChoiceLoad {
                loading: 1.0,
                chose_a: false,
            };
            4
        ];
        let draft = score_scale("assertiveness", &likert(&[5.0; 6]), &forced, &config).unwrap();
        // 0.5·10 + 0.5·1 = 5.5 → 6.
        assert_eq!(draft.sten, 6);
    }

    #[test]
    fn zero_span_forced_choice_is_ignored() {
        let config = BehavioralScorerConfig::default();
        let forced = vec![ForcedChoiceLoad {
            loading: 0.0,
            chose_a: true,
        }];
        assert!(score_scale("assertiveness", &[], &forced, &config).is_none());
        // With Likert present the Likert part alone carries the scale.
        let draft = score_scale("assertiveness", &likert(&[3.0; 4]), &forced, &config).unwrap();
        assert_eq!(draft.sten, 6);
    }
}
