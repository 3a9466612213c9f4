//! Repository abstraction over the §3 entities.
//!
//! The relational store is an external collaborator; the core only sees
//! this trait. [`MemoryRepository`] is the reference implementation used by
//! tests and by embedders that do not need durability.

pub mod memory;

use async_trait::async_trait;

pub use crate::error::RepositoryError;
pub use memory::MemoryRepository;

use crate::schema::{
    Assessment, Candidate, Item, PerformanceModel, ResponseRecord, Scale, ScaleScore,
};

#[async_trait]
pub trait Repository: Send + Sync {
    async fn insert_candidate(&self, candidate: &Candidate) -> Result<(), RepositoryError>;
    async fn fetch_candidate(&self, id: &str) -> Result<Option<Candidate>, RepositoryError>;

    async fn insert_scale(&self, scale: &Scale) -> Result<(), RepositoryError>;
    async fn fetch_scales(&self) -> Result<Vec<Scale>, RepositoryError>;

    async fn insert_item(&self, item: &Item) -> Result<(), RepositoryError>;
    async fn fetch_items(&self) -> Result<Vec<Item>, RepositoryError>;

    async fn insert_assessment(&self, assessment: &Assessment) -> Result<(), RepositoryError>;
    async fn fetch_assessment(&self, id: &str) -> Result<Option<Assessment>, RepositoryError>;
    async fn update_assessment(&self, assessment: &Assessment) -> Result<(), RepositoryError>;

    /// Persists the response and the assessment's advanced cursor as one
    /// commit, so a racing reader never sees one without the other.
    async fn append_response(
        &self,
        assessment: &Assessment,
        response: &ResponseRecord,
    ) -> Result<(), RepositoryError>;

    /// Responses in arrival (commit) order.
    async fn fetch_responses(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<ResponseRecord>, RepositoryError>;

    async fn insert_scale_scores(&self, scores: &[ScaleScore]) -> Result<(), RepositoryError>;
    async fn fetch_scale_scores(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<ScaleScore>, RepositoryError>;

    async fn insert_model(&self, model: &PerformanceModel) -> Result<(), RepositoryError>;
    async fn fetch_model(&self, id: &str) -> Result<Option<PerformanceModel>, RepositoryError>;
}
