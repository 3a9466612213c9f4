//! Scale scorers: per-domain conversion of raw response streams into
//! standardized STEN drafts, plus the finalization orchestrator that turns
//! drafts into persisted [`crate::schema::ScaleScore`] rows.

pub mod behavioral;
pub mod cognitive;
pub mod distortion;
pub mod interests;
pub mod learning_index;
pub mod profile;

/// Intermediate per-scale result, before ids/versions/timestamps are
/// stamped on at finalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreDraft {
    pub scale_id: String,
    pub raw_score: f64,
    pub sten: u8,
    pub percentile: u8,
    pub theta: Option<f64>,
    pub item_count: u32,
}
