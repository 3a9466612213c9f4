//! Persisted entity shapes.
//!
//! These are the on-disk contract shared with the store and the HTTP layer;
//! JSON renderings map field names as-is. Validation helpers enforce the
//! seeding/authoring invariants so nothing structurally broken reaches the
//! scorers.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Test domain a scale or item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Cognitive,
    Behavioral,
    Interests,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Cognitive => "cognitive",
            Domain::Behavioral => "behavioral",
            Domain::Interests => "interests",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    Cognitive,
    Trait,
    Interest,
    Distortion,
}

impl ScaleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleType::Cognitive => "cognitive",
            ScaleType::Trait => "trait",
            ScaleType::Interest => "interest",
            ScaleType::Distortion => "distortion",
        }
    }
}

/// A measured dimension. Immutable after seeding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub id: String,
    pub name: String,
    pub domain: Domain,
    pub scale_type: ScaleType,
    /// Sub-scale ids for composites (e.g. the learning index); empty for
    /// directly administered scales.
    #[serde(default)]
    pub composite_of: Vec<String>,
    pub active: bool,
}

impl Scale {
    pub fn is_composite(&self) -> bool {
        !self.composite_of.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFormat {
    MultipleChoice,
    Likert,
    ForcedChoice,
    Binary,
}

impl ItemFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemFormat::MultipleChoice => "multiple_choice",
            ItemFormat::Likert => "likert",
            ItemFormat::ForcedChoice => "forced_choice",
            ItemFormat::Binary => "binary",
        }
    }
}

/// Three-parameter-logistic item parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrtParams {
    /// Discrimination, a > 0.
    pub a: f64,
    /// Difficulty, b in [-4, 4].
    pub b: f64,
    /// Guessing floor, c in [0, 0.35].
    pub c: f64,
}

impl Default for IrtParams {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
        }
    }
}

impl IrtParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.a > 0.0 && self.a.is_finite()) {
            return Err(CoreError::InputInvalid(format!(
                "irt discrimination must be positive, got {}",
                self.a
            )));
        }
        if !(-4.0..=4.0).contains(&self.b) {
            return Err(CoreError::InputInvalid(format!(
                "irt difficulty must be within [-4, 4], got {}",
                self.b
            )));
        }
        if !(0.0..=0.35).contains(&self.c) {
            return Err(CoreError::InputInvalid(format!(
                "irt guessing must be within [0, 0.35], got {}",
                self.c
            )));
        }
        Ok(())
    }
}

/// The two scales a forced-choice interest pair loads on: option A credits
/// the first, option B the second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScales {
    pub option_a: String,
    pub option_b: String,
}

/// An administered question. Immutable after authoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub scale_id: String,
    pub text: String,
    pub format: ItemFormat,
    #[serde(default)]
    pub options: Vec<String>,
    /// Cognitive items only.
    pub correct_answer: Option<String>,
    pub irt: IrtParams,
    pub domain: Domain,
    pub is_distortion: bool,
    pub active: bool,
    /// Presentation order within the scale for sequential sections.
    pub order: i32,
    /// Likert items whose agreement runs against the scale direction.
    #[serde(default)]
    pub reverse_keyed: bool,
    /// Interest forced-choice pairs only.
    pub pair_scales: Option<PairScales>,
    /// Behavioral forced-choice loadings: trait scale id → signed weight.
    #[serde(default)]
    pub trait_loadings: HashMap<String, f64>,
}

impl Item {
    /// Authoring invariants: cognitive items carry an answer key, no other
    /// format does; interest pairs name their two scales; IRT bounds hold.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.irt.validate()?;

        match self.domain {
            Domain::Cognitive => {
                if self.correct_answer.as_deref().unwrap_or("").is_empty() {
                    return Err(CoreError::InputInvalid(format!(
                        "cognitive item {} is missing a correct answer",
                        self.id
                    )));
                }
            }
            Domain::Behavioral | Domain::Interests => {
                if self.correct_answer.is_some() {
                    return Err(CoreError::InputInvalid(format!(
                        "item {} is not cognitive but carries a correct answer",
                        self.id
                    )));
                }
            }
        }

        if self.domain == Domain::Interests {
            if self.format != ItemFormat::ForcedChoice {
                return Err(CoreError::InputInvalid(format!(
                    "interest item {} must be a forced-choice pair",
                    self.id
                )));
            }
            if self.pair_scales.is_none() {
                return Err(CoreError::InputInvalid(format!(
                    "interest item {} does not name its two scales",
                    self.id
                )));
            }
        }

        Ok(())
    }
}

/// Wire form is the bare option letter, `"A"` or `"B"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
}

impl Choice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
        }
    }
}

/// Format-specific response payload, dispatched on by the scorers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ResponseValue {
    /// Agreement rating 1..=5.
    Likert(u8),
    /// Selected option text.
    MultipleChoice(String),
    /// Which side of a pair won.
    ForcedChoice(Choice),
    Binary(bool),
}

impl ResponseValue {
    pub fn matches_format(&self, format: ItemFormat) -> bool {
        matches!(
            (self, format),
            (ResponseValue::Likert(_), ItemFormat::Likert)
                | (ResponseValue::MultipleChoice(_), ItemFormat::MultipleChoice)
                | (ResponseValue::ForcedChoice(_), ItemFormat::ForcedChoice)
                | (ResponseValue::Binary(_), ItemFormat::Binary)
        )
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            ResponseValue::Likert(v) if !(1..=5).contains(v) => Err(CoreError::InputInvalid(
                format!("likert response must be within 1..=5, got {v}"),
            )),
            ResponseValue::MultipleChoice(text) if text.trim().is_empty() => Err(
                CoreError::InputInvalid("multiple choice response is empty".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Numeric view used by the Likert-based scorers.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            ResponseValue::Likert(v) => Some(*v as f64),
            ResponseValue::Binary(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseValue::MultipleChoice(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<Choice> {
        match self {
            ResponseValue::ForcedChoice(choice) => Some(*choice),
            _ => None,
        }
    }
}

/// Examinee. Demographic and contact attributes are opaque to the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    Full,
    CognitiveOnly,
    BehavioralOnly,
    InterestsOnly,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Full => "full",
            AssessmentType::CognitiveOnly => "cognitive_only",
            AssessmentType::BehavioralOnly => "behavioral_only",
            AssessmentType::InterestsOnly => "interests_only",
        }
    }

    /// Sections this assessment administers, in order.
    pub fn sections(&self) -> &'static [Section] {
        match self {
            AssessmentType::Full => {
                &[Section::Cognitive, Section::Behavioral, Section::Interests]
            }
            AssessmentType::CognitiveOnly => &[Section::Cognitive],
            AssessmentType::BehavioralOnly => &[Section::Behavioral],
            AssessmentType::InterestsOnly => &[Section::Interests],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Cognitive,
    Behavioral,
    Interests,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Cognitive => "cognitive",
            Section::Behavioral => "behavioral",
            Section::Interests => "interests",
        }
    }

    pub fn domain(&self) -> Domain {
        match self {
            Section::Cognitive => Domain::Cognitive,
            Section::Behavioral => Domain::Behavioral,
            Section::Interests => Domain::Interests,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    NotStarted,
    InProgress,
    Completed,
    Expired,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::NotStarted => "not_started",
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Expired => "expired",
        }
    }
}

/// One sitting of the test by one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: String,
    pub candidate_id: String,
    pub assessment_type: AssessmentType,
    pub status: AssessmentStatus,
    pub current_section: Option<Section>,
    pub current_item_index: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at < now).unwrap_or(false)
    }

    /// Section that follows `current` for this assessment type, if any.
    pub fn next_section(&self, current: Section) -> Option<Section> {
        let sections = self.assessment_type.sections();
        sections
            .iter()
            .position(|s| *s == current)
            .and_then(|idx| sections.get(idx + 1))
            .copied()
    }
}

/// One answer to one item. Append-only per assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    pub assessment_id: String,
    pub item_id: String,
    pub value: ResponseValue,
    pub response_time_ms: u32,
    /// Cognitive items only.
    pub is_correct: Option<bool>,
    /// Ability snapshot after this response; cognitive items only.
    pub theta_snapshot: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Finalized standardized score for one scale. Written once at completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleScore {
    pub id: String,
    pub assessment_id: String,
    pub scale_id: String,
    pub raw_score: f64,
    /// Integer STEN clamped to [1, 10].
    pub sten: u8,
    pub percentile: u8,
    pub theta: Option<f64>,
    pub item_count: u32,
    pub engine_version: String,
    pub scoring_run_id: String,
    pub computed_at: DateTime<Utc>,
}

/// Target STEN band for one scale of a performance model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScaleRange {
    pub scale_id: String,
    pub target_min: u8,
    pub target_max: u8,
    pub weight: f64,
}

impl ModelScaleRange {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=10).contains(&self.target_min) || !(1..=10).contains(&self.target_max) {
            return Err(CoreError::InputInvalid(format!(
                "model band for {} must sit within STEN [1, 10]",
                self.scale_id
            )));
        }
        if self.target_min > self.target_max {
            return Err(CoreError::InputInvalid(format!(
                "model band for {} has min above max",
                self.scale_id
            )));
        }
        if !(self.weight > 0.0 && self.weight.is_finite()) {
            return Err(CoreError::InputInvalid(format!(
                "model weight for {} must be strictly positive",
                self.scale_id
            )));
        }
        Ok(())
    }

    /// Band midpoint, used for rank-ordering interest scales.
    pub fn midpoint(&self) -> f64 {
        (self.target_min as f64 + self.target_max as f64) / 2.0
    }
}

/// Ideal-incumbent description a profile is matched against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceModel {
    pub id: String,
    pub name: String,
    pub category: String,
    pub is_template: bool,
    pub ranges: Vec<ModelScaleRange>,
}

impl PerformanceModel {
    pub fn validate(&self) -> Result<(), CoreError> {
        for range in &self.ranges {
            range.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cognitive_item() -> Item {
        Item {
            id: "item-1".into(),
            scale_id: "numeric_reasoning".into(),
            text: "12 + 30 = ?".into(),
            format: ItemFormat::MultipleChoice,
            options: vec!["24".into(), "42".into(), "52".into()],
            correct_answer: Some("42".into()),
            irt: IrtParams {
                a: 1.2,
                b: 0.5,
                c: 0.2,
            },
            domain: Domain::Cognitive,
            is_distortion: false,
            active: true,
            order: 1,
            reverse_keyed: false,
            pair_scales: None,
            trait_loadings: HashMap::new(),
        }
    }

    #[test]
    fn cognitive_item_requires_answer_key() {
        let mut item = cognitive_item();
        assert!(item.validate().is_ok());

        item.correct_answer = None;
        assert!(matches!(
            item.validate(),
            Err(CoreError::InputInvalid(msg)) if msg.contains("correct answer")
        ));
    }

    #[test]
    fn behavioral_item_rejects_answer_key() {
        let mut item = cognitive_item();
        item.domain = Domain::Behavioral;
        item.format = ItemFormat::Likert;
        assert!(item.validate().is_err());

        item.correct_answer = None;
        assert!(item.validate().is_ok());
    }

    #[test]
    fn interest_item_must_be_a_pair() {
        let mut item = cognitive_item();
        item.domain = Domain::Interests;
        item.correct_answer = None;
        item.format = ItemFormat::ForcedChoice;
        assert!(item.validate().is_err());

        item.pair_scales = Some(PairScales {
            option_a: "enterprising".into(),
            option_b: "investigative".into(),
        });
        assert!(item.validate().is_ok());
    }

    #[test]
    fn irt_bounds_are_enforced() {
        let bad = [
            IrtParams {
                a: 0.0,
                b: 0.0,
                c: 0.1,
            },
            IrtParams {
                a: 1.0,
                b: 4.5,
                c: 0.1,
            },
            IrtParams {
                a: 1.0,
                b: 0.0,
                c: 0.4,
            },
        ];
        for params in bad {
            assert!(params.validate().is_err(), "{params:?} should be rejected");
        }
    }

    #[test]
    fn response_value_format_dispatch() {
        assert!(ResponseValue::Likert(3).matches_format(ItemFormat::Likert));
        assert!(!ResponseValue::Likert(3).matches_format(ItemFormat::MultipleChoice));
        assert!(
            ResponseValue::ForcedChoice(Choice::A).matches_format(ItemFormat::ForcedChoice)
        );
        assert!(ResponseValue::Binary(true).matches_format(ItemFormat::Binary));
    }

    #[test]
    fn response_value_bounds() {
        assert!(ResponseValue::Likert(0).validate().is_err());
        assert!(ResponseValue::Likert(6).validate().is_err());
        assert!(ResponseValue::Likert(5).validate().is_ok());
        assert!(ResponseValue::MultipleChoice("  ".into()).validate().is_err());
    }

    #[test]
    fn response_value_serializes_tagged() {
        let json = serde_json::to_value(ResponseValue::ForcedChoice(Choice::B)).unwrap();
        assert_eq!(json["kind"], "forced_choice");
        assert_eq!(json["value"], "B");

        let json = serde_json::to_value(ResponseValue::Likert(4)).unwrap();
        assert_eq!(json["kind"], "likert");
        assert_eq!(json["value"], 4);
    }

    #[test]
    fn model_range_validation() {
        let mut range = ModelScaleRange {
            scale_id: "assertiveness".into(),
            target_min: 4,
            target_max: 7,
            weight: 1.0,
        };
        assert!(range.validate().is_ok());
        assert_eq!(range.midpoint(), 5.5);

        range.target_min = 8;
        assert!(range.validate().is_err());

        range.target_min = 4;
        range.weight = 0.0;
        assert!(range.validate().is_err());

        range.weight = 1.0;
        range.target_max = 11;
        assert!(range.validate().is_err());
    }

    #[test]
    fn assessment_sections_follow_type() {
        assert_eq!(
            AssessmentType::Full.sections(),
            &[Section::Cognitive, Section::Behavioral, Section::Interests]
        );
        assert_eq!(
            AssessmentType::InterestsOnly.sections(),
            &[Section::Interests]
        );
    }

    #[test]
    fn next_section_walks_the_type_order() {
        let assessment = Assessment {
            id: "a".into(),
            candidate_id: "c".into(),
            assessment_type: AssessmentType::Full,
            status: AssessmentStatus::InProgress,
            current_section: Some(Section::Cognitive),
            current_item_index: 0,
            started_at: None,
            completed_at: None,
            expires_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(
            assessment.next_section(Section::Cognitive),
            Some(Section::Behavioral)
        );
        assert_eq!(assessment.next_section(Section::Interests), None);
    }

    #[test]
    fn expiry_is_observed_not_scheduled() {
        let now = Utc::now();
        let mut assessment = Assessment {
            id: "a".into(),
            candidate_id: "c".into(),
            assessment_type: AssessmentType::Full,
            status: AssessmentStatus::InProgress,
            current_section: Some(Section::Cognitive),
            current_item_index: 0,
            started_at: Some(now),
            completed_at: None,
            expires_at: Some(now + chrono::Duration::hours(1)),
            created_at: now,
            updated_at: now,
        };

        assert!(!assessment.is_past_expiry(now));
        assessment.expires_at = Some(now - chrono::Duration::seconds(1));
        assert!(assessment.is_past_expiry(now));
    }
}
