//! Interest scoring: ipsative forced-choice win counts converted to a
//! normative STEN profile via mid-rank percentiles.

use std::collections::HashMap;

use crate::schema::{Choice, Item, Scale, ScaleScore};
use crate::stats::percentile_to_sten;

use super::ScoreDraft;

/// Scores the interest scales from forced-choice pair responses.
///
/// Every active interest scale gets a draft even with zero wins: the
/// ipsative ranking is over the whole scale set. Drafts come back in rank
/// order (most-endorsed first); ties in win count break on the lexically
/// smaller scale id.
pub fn score_interests(scales: &[&Scale], pair_responses: &[(&Item, Choice)]) -> Vec<ScoreDraft> {
    if scales.is_empty() {
        return Vec::new();
    }

    let mut wins: HashMap<&str, u32> = scales.iter().map(|s| (s.id.as_str(), 0)).collect();
    let mut appearances: HashMap<&str, u32> = scales.iter().map(|s| (s.id.as_str(), 0)).collect();

    for (item, choice) in pair_responses {
        let Some(pair) = item.pair_scales.as_ref() else {
            continue;
        };

        for side in [pair.option_a.as_str(), pair.option_b.as_str()] {
            if let Some(count) = appearances.get_mut(side) {
                *count += 1;
            }
        }

        let winner = match choice {
            Choice::A => pair.option_a.as_str(),
            Choice::B => pair.option_b.as_str(),
        };
        if let Some(count) = wins.get_mut(winner) {
            *count += 1;
        }
    }

    let mut ranked: Vec<(&str, u32)> = wins.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let n = ranked.len() as f64;
    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (scale_id, win_count))| {
            let rank = (idx + 1) as f64;
            let percentile = (n - rank + 0.5) / n * 100.0;

            ScoreDraft {
                scale_id: scale_id.to_string(),
                raw_score: win_count as f64,
                sten: percentile_to_sten(percentile),
                percentile: percentile.round().clamp(0.0, 100.0) as u8,
                theta: None,
                item_count: appearances.get(scale_id).copied().unwrap_or(0),
            }
        })
        .collect()
}

/// The candidate's top-three interests: STEN descending, then raw win
/// count descending, then scale id ascending.
pub fn top_interests<'a>(scores: &[&'a ScaleScore]) -> Vec<&'a ScaleScore> {
    let mut sorted: Vec<&ScaleScore> = scores.to_vec();
    sorted.sort_by(|a, b| {
        b.sten
            .cmp(&a.sten)
            .then(
                b.raw_score
                    .partial_cmp(&a.raw_score)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then(a.scale_id.cmp(&b.scale_id))
    });
    sorted.truncate(3);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    use chrono::Utc;

    use crate::schema::{Domain, IrtParams, ItemFormat, PairScales, ScaleType};

    const SCALE_IDS: [&str; 6] = [
        "artistic",
        "conventional",
        "enterprising",
        "investigative",
        "realistic",
        "social",
    ];

    fn scales() -> Vec<Scale> {
        SCALE_IDS
            .iter()
            .map(|id| Scale {
                id: (*id).into(),
                name: id.to_uppercase(),
                domain: Domain::Interests,
                scale_type: ScaleType::Interest,
                composite_of: vec![],
                active: true,
            })
            .collect()
    }

    fn pair_item(id: &str, a: &str, b: &str) -> Item {
        Item {
            id: id.into(),
            scale_id: a.into(),
            text: String::new(),
            format: ItemFormat::ForcedChoice,
            options: vec![],
            correct_answer: None,
            irt: IrtParams::default(),
            domain: Domain::Interests,
            is_distortion: false,
            active: true,
            order: 0,
            reverse_keyed: false,
            pair_scales: Some(PairScales {
                option_a: a.into(),
                option_b: b.into(),
            }),
            trait_loadings: StdHashMap::new(),
        }
    }

    fn score(scale_id: &str, sten: u8, raw: f64) -> ScaleScore {
        ScaleScore {
            id: format!("score-{scale_id}"),
            assessment_id: "a-1".into(),
            scale_id: scale_id.into(),
            raw_score: raw,
            sten,
            percentile: 50,
            theta: None,
            item_count: 5,
            engine_version: "test".into(),
            scoring_run_id: "run".into(),
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn wins_drive_the_ranking() {
        let scales = scales();
        let scale_refs: Vec<&Scale> = scales.iter().collect();

        let item = pair_item("p-1", "realistic", "social");
        let responses = vec![(&item, Choice::A), (&item, Choice::A), (&item, Choice::B)];

        let drafts = score_interests(&scale_refs, &responses);
        assert_eq!(drafts.len(), 6);
        assert_eq!(drafts[0].scale_id, "realistic");
        assert_eq!(drafts[0].raw_score, 2.0);
        assert_eq!(drafts[0].sten, 8);
        assert_eq!(drafts[0].item_count, 3);
        assert_eq!(drafts[1].scale_id, "social");
    }

    #[test]
    fn equal_wins_rank_deterministically_by_id() {
        let scales = scales();
        let scale_refs: Vec<&Scale> = scales.iter().collect();

        let drafts = score_interests(&scale_refs, &[]);
        let order: Vec<&str> = drafts.iter().map(|d| d.scale_id.as_str()).collect();
        assert_eq!(order, SCALE_IDS);

        // Mid-rank percentiles walk down from rank 1 to rank N.
        assert_eq!(drafts[0].percentile, 92);
        assert_eq!(drafts[5].percentile, 8);
        assert!(drafts[0].sten > drafts[5].sten);
    }

    #[test]
    fn rank_percentiles_map_through_inverse_normal() {
        let scales = scales();
        let scale_refs: Vec<&Scale> = scales.iter().collect();
        let drafts = score_interests(&scale_refs, &[]);

        let stens: Vec<u8> = drafts.iter().map(|d| d.sten).collect();
        assert_eq!(stens, vec![8, 7, 6, 5, 4, 3]);
    }

    #[test]
    fn top_interests_tiebreaks_are_documented_order() {
        let a = score("artistic", 8, 3.0);
        let b = score("enterprising", 8, 5.0);
        let c = score("social", 7, 9.0);
        let d = score("realistic", 8, 5.0);

        let refs = vec![&a, &b, &c, &d];
        let top = top_interests(&refs);

        let ids: Vec<&str> = top.iter().map(|s| s.scale_id.as_str()).collect();
        // Same STEN: higher raw first; same raw: lexical id.
        assert_eq!(ids, vec!["enterprising", "realistic", "artistic"]);
    }
}
