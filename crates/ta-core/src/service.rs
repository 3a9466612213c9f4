//! In-process assessment API.
//!
//! One method per external operation; a thin HTTP layer maps onto these
//! 1:1. Every mutating operation serializes on a per-assessment lock so
//! racing calls cannot skip or duplicate items, and performs at most one
//! repository commit.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::config::CoreConfig;
use crate::error::CoreError;
use crate::ids;
use crate::interview::{self, DeviationBlock};
use crate::matching::{self, JobMatch};
use crate::repo::Repository;
use crate::schema::{
    Assessment, AssessmentStatus, AssessmentType, Item, ResponseRecord, ResponseValue,
    ScaleScore, Section,
};
use crate::scoring::cognitive::running_theta;
use crate::scoring::profile::ProfileScorer;
use crate::session::{self, NextOutcome};

pub struct AssessmentService<R: Repository> {
    repo: Arc<R>,
    config: CoreConfig,
    scorer: ProfileScorer,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<R: Repository> AssessmentService<R> {
    pub fn new(repo: Arc<R>, config: CoreConfig) -> Self {
        let scorer = ProfileScorer::new(&config);
        Self {
            repo,
            config,
            scorer,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    #[instrument(skip(self))]
    pub async fn create_assessment(
        &self,
        candidate_id: &str,
        assessment_type: AssessmentType,
    ) -> Result<Assessment, CoreError> {
        if candidate_id.trim().is_empty() {
            return Err(CoreError::InputInvalid("candidate id is empty".into()));
        }
        self.repo
            .fetch_candidate(candidate_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("candidate {candidate_id}")))?;

        let now = Utc::now();
        let assessment = Assessment {
            id: ids::generate(),
            candidate_id: candidate_id.to_string(),
            assessment_type,
            status: AssessmentStatus::NotStarted,
            current_section: None,
            current_item_index: 0,
            started_at: None,
            completed_at: None,
            expires_at: Some(now + Duration::hours(self.config.assessment_ttl_hours)),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_assessment(&assessment).await?;
        info!(assessment_id = %assessment.id, assessment_type = assessment_type.as_str(), "assessment created");
        Ok(assessment)
    }

    /// Moves a fresh assessment into its first section. Idempotent: calling
    /// again on an in-progress assessment returns the current state
    /// unchanged.
    #[instrument(skip(self))]
    pub async fn start_assessment(&self, assessment_id: &str) -> Result<Assessment, CoreError> {
        let lock = self.session_lock(assessment_id).await;
        let _guard = lock.lock().await;

        let mut assessment = self.load_live(assessment_id).await?;

        match assessment.status {
            AssessmentStatus::InProgress => Ok(assessment),
            AssessmentStatus::Completed => Err(CoreError::StateInvalid(format!(
                "assessment {assessment_id} is already completed"
            ))),
            AssessmentStatus::Expired => Err(CoreError::AssessmentExpired(assessment_id.into())),
            AssessmentStatus::NotStarted => {
                let now = Utc::now();
                assessment.status = AssessmentStatus::InProgress;
                assessment.started_at = Some(now);
                assessment.current_section =
                    assessment.assessment_type.sections().first().copied();
                assessment.current_item_index = 0;
                assessment.updated_at = now;

                self.repo.update_assessment(&assessment).await?;
                info!(
                    assessment_id,
                    section = assessment.current_section.map(|s| s.as_str()).unwrap_or("none"),
                    "assessment started"
                );
                Ok(assessment)
            }
        }
    }

    /// Next item for the current section, or an explicit section-boundary
    /// transition. The stored section cursor advances on the boundary; the
    /// caller decides whether to ask again immediately.
    #[instrument(skip(self))]
    pub async fn next_item(&self, assessment_id: &str) -> Result<NextOutcome, CoreError> {
        let lock = self.session_lock(assessment_id).await;
        let _guard = lock.lock().await;

        let mut assessment = self.load_in_progress(assessment_id).await?;
        let section = assessment.current_section.ok_or_else(|| {
            CoreError::StateInvalid(format!("assessment {assessment_id} has no current section"))
        })?;

        let scales = self.repo.fetch_scales().await?;
        let items = self.repo.fetch_items().await?;
        let responses = self.repo.fetch_responses(assessment_id).await?;

        let outcome = session::select_next(
            &assessment,
            section,
            &scales,
            &items,
            &responses,
            &self.config.cat,
        );

        if let NextOutcome::SectionComplete {
            next_section: Some(next),
        } = &outcome
        {
            let next = *next;
            assessment.current_section = Some(next);
            assessment.current_item_index = 0;
            assessment.updated_at = Utc::now();
            self.repo.update_assessment(&assessment).await?;
            info!(assessment_id, next_section = next.as_str(), "section advanced");
        }

        Ok(outcome)
    }

    /// Records one response. For cognitive items, correctness is derived by
    /// trimmed case-insensitive comparison against the answer key and the
    /// ability snapshot is recomputed over the scale's responses so far.
    #[instrument(skip(self, value))]
    pub async fn respond_item(
        &self,
        assessment_id: &str,
        item_id: &str,
        value: ResponseValue,
        response_time_ms: u32,
    ) -> Result<ResponseRecord, CoreError> {
        let lock = self.session_lock(assessment_id).await;
        let _guard = lock.lock().await;

        let mut assessment = self.load_in_progress(assessment_id).await?;
        value.validate()?;

        let items = self.repo.fetch_items().await?;
        let item = items
            .iter()
            .find(|i| i.id == item_id && i.active)
            .ok_or_else(|| CoreError::NotFound(format!("item {item_id}")))?;

        if !value.matches_format(item.format) {
            return Err(CoreError::InputInvalid(format!(
                "response kind does not match item format {}",
                item.format.as_str()
            )));
        }
        if let ResponseValue::MultipleChoice(text) = &value {
            if !item.options.is_empty()
                && !item
                    .options
                    .iter()
                    .any(|option| option.trim().eq_ignore_ascii_case(text.trim()))
            {
                return Err(CoreError::InputInvalid(format!(
                    "response is not one of the item's options: {text}"
                )));
            }
        }

        let responses = self.repo.fetch_responses(assessment_id).await?;
        if responses.iter().any(|r| r.item_id == item_id) {
            return Err(CoreError::StateInvalid(format!(
                "item {item_id} was already answered"
            )));
        }

        let (is_correct, theta_snapshot) = if item.domain == crate::schema::Domain::Cognitive {
            let correct = derive_correctness(item, &value);
            let mut administered: Vec<_> = responses
                .iter()
                .filter_map(|response| {
                    items
                        .iter()
                        .find(|i| i.id == response.item_id && i.scale_id == item.scale_id)
                        .map(|i| (i.irt, response.is_correct.unwrap_or(false)))
                })
                .collect();
            administered.push((item.irt, correct));

            (Some(correct), Some(running_theta(&administered)))
        } else {
            (None, None)
        };

        let record = ResponseRecord {
            id: ids::generate(),
            assessment_id: assessment_id.to_string(),
            item_id: item_id.to_string(),
            value,
            response_time_ms,
            is_correct,
            theta_snapshot,
            created_at: Utc::now(),
        };

        assessment.current_item_index += 1;
        assessment.updated_at = record.created_at;
        self.repo.append_response(&assessment, &record).await?;

        Ok(record)
    }

    /// Finalizes the profile. Idempotent: completing an already-completed
    /// assessment returns the stored scores unchanged.
    #[instrument(skip(self))]
    pub async fn complete_assessment(
        &self,
        assessment_id: &str,
    ) -> Result<HashMap<String, ScaleScore>, CoreError> {
        let lock = self.session_lock(assessment_id).await;
        let _guard = lock.lock().await;

        let mut assessment = self.load_live(assessment_id).await?;

        match assessment.status {
            AssessmentStatus::Completed => {
                let scores = self.repo.fetch_scale_scores(assessment_id).await?;
                Ok(score_map(scores))
            }
            AssessmentStatus::NotStarted => Err(CoreError::StateInvalid(format!(
                "assessment {assessment_id} was never started"
            ))),
            AssessmentStatus::Expired => Err(CoreError::AssessmentExpired(assessment_id.into())),
            AssessmentStatus::InProgress => {
                let scales = self.repo.fetch_scales().await?;
                let items = self.repo.fetch_items().await?;
                let responses = self.repo.fetch_responses(assessment_id).await?;

                let scores = self.scorer.finalize(&assessment, &scales, &items, &responses);
                self.repo.insert_scale_scores(&scores).await?;

                let now = Utc::now();
                assessment.status = AssessmentStatus::Completed;
                assessment.completed_at = Some(now);
                assessment.current_section = None;
                assessment.updated_at = now;
                self.repo.update_assessment(&assessment).await?;

                info!(assessment_id, scale_count = scores.len(), "assessment completed");
                Ok(score_map(scores))
            }
        }
    }

    /// Fit of a completed profile against a performance model.
    #[instrument(skip(self))]
    pub async fn compute_match(
        &self,
        assessment_id: &str,
        model_id: &str,
    ) -> Result<JobMatch, CoreError> {
        let assessment = self
            .repo
            .fetch_assessment(assessment_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("assessment {assessment_id}")))?;
        if assessment.status != AssessmentStatus::Completed {
            return Err(CoreError::StateInvalid(format!(
                "assessment {assessment_id} is not completed"
            )));
        }

        let model = self
            .repo
            .fetch_model(model_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("model {model_id}")))?;
        model.validate()?;

        let scores = self.repo.fetch_scale_scores(assessment_id).await?;
        let scales = self.repo.fetch_scales().await?;

        Ok(matching::compute_match(assessment_id, &model, &scores, &scales))
    }

    /// Interview blocks for every scale sitting outside the model band.
    #[instrument(skip(self))]
    pub async fn interview_questions(
        &self,
        assessment_id: &str,
        model_id: &str,
    ) -> Result<Vec<DeviationBlock>, CoreError> {
        let job_match = self.compute_match(assessment_id, model_id).await?;
        let scales = self.repo.fetch_scales().await?;
        Ok(interview::generate(&job_match.deviations, &scales))
    }

    async fn session_lock(&self, assessment_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(assessment_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Loads an assessment, transitioning it to `expired` first when its
    /// deadline has passed unnoticed.
    async fn load_live(&self, assessment_id: &str) -> Result<Assessment, CoreError> {
        let mut assessment = self
            .repo
            .fetch_assessment(assessment_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("assessment {assessment_id}")))?;

        if assessment.status != AssessmentStatus::Completed
            && assessment.status != AssessmentStatus::Expired
            && assessment.is_past_expiry(Utc::now())
        {
            assessment.status = AssessmentStatus::Expired;
            assessment.updated_at = Utc::now();
            self.repo.update_assessment(&assessment).await?;
            info!(assessment_id, "assessment observed expired");
        }

        Ok(assessment)
    }

    async fn load_in_progress(&self, assessment_id: &str) -> Result<Assessment, CoreError> {
        let assessment = self.load_live(assessment_id).await?;
        match assessment.status {
            AssessmentStatus::InProgress => Ok(assessment),
            AssessmentStatus::Expired => Err(CoreError::AssessmentExpired(assessment_id.into())),
            AssessmentStatus::NotStarted => Err(CoreError::StateInvalid(format!(
                "assessment {assessment_id} was never started"
            ))),
            AssessmentStatus::Completed => Err(CoreError::StateInvalid(format!(
                "assessment {assessment_id} is already completed"
            ))),
        }
    }
}

fn derive_correctness(item: &Item, value: &ResponseValue) -> bool {
    let Some(answer) = item.correct_answer.as_deref() else {
        return false;
    };

    match value {
        ResponseValue::MultipleChoice(text) => {
            text.trim().eq_ignore_ascii_case(answer.trim())
        }
        ResponseValue::Binary(b) => b.to_string().eq_ignore_ascii_case(answer.trim()),
        _ => false,
    }
}

fn score_map(scores: Vec<ScaleScore>) -> HashMap<String, ScaleScore> {
    scores
        .into_iter()
        .map(|score| (score.scale_id.clone(), score))
        .collect()
}

/// First section an assessment of this type will enter; surfaced so the
/// HTTP layer can echo it from `StartAssessment` without a second read.
pub fn first_section(assessment_type: AssessmentType) -> Option<Section> {
    assessment_type.sections().first().copied()
}
