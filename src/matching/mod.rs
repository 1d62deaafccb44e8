//! Candidate and job matching: interpretation, scoring, storage and hybrid retrieval.

pub mod core;
pub mod embedding;
pub mod interpret;
pub mod normalize;
pub mod retrieval;
pub mod scoring;
pub mod storage;

pub use self::core::{
    CandidateRecord, FallbackReason, JobId, JobRecord, MatchConfig, MatchError, MatchResult,
    RetrievalTier, ScoredResult, SearchFilters, SearchOutcome, UserId,
};
pub use embedding::{Embedded, EmbeddingProvider, OllamaEmbedder};
pub use interpret::{LlmInterpreter, QueryInterpreter, RuleBasedInterpreter, SkillVocabulary};
pub use normalize::TextNormalizer;
pub use retrieval::{HybridRetriever, VectorIndexer};
pub use scoring::MatchScorer;
pub use storage::{JobBoardStore, SqliteJobBoardStore, SqliteVecIndex, VectorIndex};
