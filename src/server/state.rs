//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::matching::core::config::{InterpreterMode, MatchConfig};
use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::embedding::embedder::{EmbeddingProvider, OllamaEmbedder};
use crate::matching::interpret::interpreter::QueryInterpreter;
use crate::matching::interpret::llm_interpreter::LlmInterpreter;
use crate::matching::interpret::rule_based::RuleBasedInterpreter;
use crate::matching::retrieval::hybrid_retriever::HybridRetriever;
use crate::matching::retrieval::indexer::VectorIndexer;
use crate::matching::storage::job_board_store::{JobBoardStore, SqliteJobBoardStore};
use crate::matching::storage::vector_index::{SqliteVecIndex, VectorIndex};

/// Shared application state.
pub struct AppState {
    /// Search and recommendation engine.
    pub retriever: HybridRetriever,
    /// Vector index maintenance.
    pub indexer: VectorIndexer,
    /// Deadline for a whole request.
    pub request_timeout: Duration,
}

impl AppState {
    /// Open storage and build providers from configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, storage cannot be opened, or a
    /// provider client cannot be built.
    pub async fn new(config: &MatchConfig) -> MatchResult<Arc<Self>> {
        config.validate()?;

        let store: Arc<dyn JobBoardStore> =
            Arc::new(SqliteJobBoardStore::new(&config.storage).await?);
        let index: Arc<dyn VectorIndex> =
            Arc::new(SqliteVecIndex::new(&config.storage, config.embedding.ndims).await?);
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embedding)?);
        let interpreter: Arc<dyn QueryInterpreter> = match config.interpreter.mode {
            InterpreterMode::Llm => Arc::new(LlmInterpreter::new(
                &config.llm,
                &config.interpreter,
                &config.fuzzy,
            )?),
            InterpreterMode::RuleBased => Arc::new(
                RuleBasedInterpreter::new(&config.interpreter, &config.fuzzy)
                    .map_err(|err| MatchError::InvalidConfig(err.to_string()))?,
            ),
        };
        tracing::info!(
            interpreter = interpreter.name(),
            db = %config.storage.sqlite_path.display(),
            "matching engine ready"
        );

        let retriever = HybridRetriever::new(
            config,
            Arc::clone(&store),
            Arc::clone(&index),
            Arc::clone(&embedder),
            interpreter,
        )?;
        let indexer = VectorIndexer::new(store, index, embedder);

        Ok(Arc::new(Self {
            retriever,
            indexer,
            request_timeout: config.retrieval.request_timeout(),
        }))
    }
}
