use thiserror::Error;

/// Failure kinds surfaced by the in-process API.
///
/// Scoring primitives never construct these; they return defined values for
/// every in-contract input. The service layer maps precondition violations to
/// the first four kinds and lets repository failures pass through unchanged.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InputInvalid(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid state: {0}")]
    StateInvalid(String),
    #[error("assessment expired: {0}")]
    AssessmentExpired(String),
    #[error("repository failure: {0}")]
    Repository(#[from] RepositoryError),
}

/// Passthrough from the store. The core never interprets these beyond
/// surfacing them; callers may retry.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl CoreError {
    /// Stable machine-readable code for API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InputInvalid(_) => "input_invalid",
            CoreError::NotFound(_) => "not_found",
            CoreError::StateInvalid(_) => "state_invalid",
            CoreError::AssessmentExpired(_) => "assessment_expired",
            CoreError::Repository(_) => "repository_failure",
        }
    }
}
