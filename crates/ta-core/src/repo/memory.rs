//! In-memory reference implementation of the repository.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::schema::{
    Assessment, Candidate, Item, PerformanceModel, ResponseRecord, Scale, ScaleScore,
};

use super::Repository;

#[derive(Default)]
struct Store {
    candidates: HashMap<String, Candidate>,
    scales: Vec<Scale>,
    items: Vec<Item>,
    assessments: HashMap<String, Assessment>,
    responses: HashMap<String, Vec<ResponseRecord>>,
    scale_scores: HashMap<String, Vec<ScaleScore>>,
    models: HashMap<String, PerformanceModel>,
}

/// All state behind one `RwLock`, so every operation is atomic from the
/// caller's point of view; `append_response` in particular commits the
/// response and the cursor together.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store
            .candidates
            .insert(candidate.id.clone(), candidate.clone());
        Ok(())
    }

    async fn fetch_candidate(&self, id: &str) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.store.read().await.candidates.get(id).cloned())
    }

    async fn insert_scale(&self, scale: &Scale) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store.scales.retain(|s| s.id != scale.id);
        store.scales.push(scale.clone());
        Ok(())
    }

    async fn fetch_scales(&self) -> Result<Vec<Scale>, RepositoryError> {
        Ok(self.store.read().await.scales.clone())
    }

    async fn insert_item(&self, item: &Item) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store.items.retain(|i| i.id != item.id);
        store.items.push(item.clone());
        Ok(())
    }

    async fn fetch_items(&self) -> Result<Vec<Item>, RepositoryError> {
        Ok(self.store.read().await.items.clone())
    }

    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store
            .assessments
            .insert(assessment.id.clone(), assessment.clone());
        Ok(())
    }

    async fn fetch_assessment(&self, id: &str) -> Result<Option<Assessment>, RepositoryError> {
        Ok(self.store.read().await.assessments.get(id).cloned())
    }

    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        if !store.assessments.contains_key(&assessment.id) {
            return Err(RepositoryError::Storage(format!(
                "assessment {} vanished during update",
                assessment.id
            )));
        }
        store
            .assessments
            .insert(assessment.id.clone(), assessment.clone());
        Ok(())
    }

    async fn append_response(
        &self,
        assessment: &Assessment,
        response: &ResponseRecord,
    ) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store
            .assessments
            .insert(assessment.id.clone(), assessment.clone());
        store
            .responses
            .entry(response.assessment_id.clone())
            .or_default()
            .push(response.clone());
        Ok(())
    }

    async fn fetch_responses(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<ResponseRecord>, RepositoryError> {
        Ok(self
            .store
            .read()
            .await
            .responses
            .get(assessment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_scale_scores(&self, scores: &[ScaleScore]) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        for score in scores {
            store
                .scale_scores
                .entry(score.assessment_id.clone())
                .or_default()
                .push(score.clone());
        }
        Ok(())
    }

    async fn fetch_scale_scores(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<ScaleScore>, RepositoryError> {
        Ok(self
            .store
            .read()
            .await
            .scale_scores
            .get(assessment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_model(&self, model: &PerformanceModel) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        store.models.insert(model.id.clone(), model.clone());
        Ok(())
    }

    async fn fetch_model(&self, id: &str) -> Result<Option<PerformanceModel>, RepositoryError> {
        Ok(self.store.read().await.models.get(id).cloned())
    }
}
