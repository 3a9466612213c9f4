//! Psychometric assessment core: IRT adaptive testing, multi-format STEN
//! profiling, validity detection, and distance-decay job matching.
//!
//! The crate is the in-process engine behind the assessment platform; the
//! HTTP layer, relational store, UI and auth are external collaborators
//! that talk to it through [`service::AssessmentService`] and the
//! [`repo::Repository`] trait.

pub mod config;
pub mod error;
pub mod ids;
pub mod interview;
pub mod irt;
pub mod logging;
pub mod matching;
pub mod repo;
pub mod schema;
pub mod scoring;
pub mod service;
pub mod session;
pub mod stats;

pub use config::{CoreConfig, ENGINE_VERSION};
pub use error::{CoreError, RepositoryError};
pub use matching::{compute_match, JobMatch};
pub use repo::{MemoryRepository, Repository};
pub use schema::{
    Assessment, AssessmentStatus, AssessmentType, Candidate, Choice, Domain, IrtParams, Item,
    ItemFormat, ModelScaleRange, PairScales, PerformanceModel, ResponseRecord, ResponseValue,
    Scale, ScaleScore, ScaleType, Section,
};
pub use service::AssessmentService;
pub use session::NextOutcome;
