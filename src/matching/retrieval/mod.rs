//! Hybrid retrieval and vector indexing.

pub mod hybrid_retriever;
pub mod indexer;

pub use hybrid_retriever::{HybridRetriever, ScoringProfile, Searchable};
pub use indexer::VectorIndexer;
