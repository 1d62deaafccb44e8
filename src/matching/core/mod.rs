//! Core matching types and identifiers.

pub mod config;
pub mod errors;
pub mod filters;
pub mod ids;
pub mod outcome;
pub mod records;

pub use config::{
    EmbeddingConfig, FuzzyConfig, InterpreterConfig, InterpreterMode, LlmConfig, MatchConfig,
    RetrievalConfig, ScoringConfig, ScoringWeights, StorageConfig,
};
pub use errors::{MatchError, MatchResult};
pub use filters::SearchFilters;
pub use ids::{JobId, SkillId, UserId};
pub use outcome::{FallbackReason, RetrievalTier, ScoredResult, SearchOutcome, sort_scored};
pub use records::{CandidateRecord, Experience, JobRecord, Rankable, SeekerProfile, split_skills};
