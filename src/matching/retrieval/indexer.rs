//! Keeps the vector index in sync with job postings and seeker profiles.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::core::ids::{JobId, UserId};
use crate::matching::embedding::embedder::{Embedded, EmbeddingProvider};
use crate::matching::storage::job_board_store::JobBoardStore;
use crate::matching::storage::vector_index::{Collection, VectorIndex};

/// Embeds records from the relational store and writes them to the vector index.
pub struct VectorIndexer {
    store: Arc<dyn JobBoardStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorIndexer {
    /// Create an indexer over shared collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn JobBoardStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
        }
    }

    /// Embed and store one job posting.
    ///
    /// # Errors
    /// Returns [`MatchError::NotFound`] for an unknown job,
    /// [`MatchError::ProviderUnavailable`] when no embedding can be produced, or a store error.
    pub async fn index_job(&self, job_id: JobId) -> MatchResult<()> {
        let job = self
            .store
            .job_by_id(job_id)
            .await?
            .ok_or(MatchError::NotFound {
                kind: "job",
                id: job_id.get(),
            })?;

        let text = job.embedding_text();
        let embedding = self.embed(&text).await?;
        let metadata = json!({
            "status": job.status,
            "title": job.title,
            "location": job.location,
            "recruiter_id": job.recruiter_id,
        });
        self.index
            .upsert(Collection::Jobs, job_id.get(), embedding, text, metadata)
            .await?;
        info!(job_id = %job_id, "indexed job posting");
        Ok(())
    }

    /// Embed and store one job seeker profile.
    ///
    /// # Errors
    /// Returns [`MatchError::NotFound`] for an unknown seeker,
    /// [`MatchError::ProviderUnavailable`] when no embedding can be produced, or a store error.
    pub async fn index_candidate(&self, user_id: UserId) -> MatchResult<()> {
        let candidate = self
            .store
            .candidate_by_id(user_id)
            .await?
            .ok_or(MatchError::NotFound {
                kind: "job seeker",
                id: user_id.get(),
            })?;

        let text = candidate.embedding_text();
        let embedding = self.embed(&text).await?;
        let metadata = json!({
            "location": candidate.location,
            "job_of_choice": candidate.job_of_choice,
        });
        self.index
            .upsert(Collection::Candidates, user_id.get(), embedding, text, metadata)
            .await?;
        info!(user_id = %user_id, "indexed job seeker");
        Ok(())
    }

    /// Drop a job posting from the index. Returns whether it was indexed.
    ///
    /// # Errors
    /// Returns an error if the index cannot be updated.
    pub async fn remove_job(&self, job_id: JobId) -> MatchResult<bool> {
        let removed = self.index.delete(Collection::Jobs, job_id.get()).await?;
        debug!(job_id = %job_id, removed, "removed job posting from index");
        Ok(removed)
    }

    /// Drop a job seeker from the index. Returns whether they were indexed.
    ///
    /// # Errors
    /// Returns an error if the index cannot be updated.
    pub async fn remove_candidate(&self, user_id: UserId) -> MatchResult<bool> {
        let removed = self.index.delete(Collection::Candidates, user_id.get()).await?;
        debug!(user_id = %user_id, removed, "removed job seeker from index");
        Ok(removed)
    }

    async fn embed(&self, text: &str) -> MatchResult<Vec<f32>> {
        match self.embedder.embed(text).await {
            Embedded::Vector(vector) => Ok(vector),
            Embedded::Unavailable(reason) => Err(MatchError::ProviderUnavailable(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::retrieval::hybrid_retriever::fakes::{
        CannedIndex, DownEmbedder, FixedEmbedder,
    };
    use crate::matching::storage::job_board_store::fixtures::demo_store;

    async fn indexer(
        index: Arc<CannedIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> VectorIndexer {
        VectorIndexer::new(Arc::new(demo_store().await), index, embedder)
    }

    #[tokio::test]
    async fn test_index_job_writes_text_and_metadata() {
        let index = Arc::new(CannedIndex::default());
        let indexer = indexer(Arc::clone(&index), Arc::new(FixedEmbedder)).await;
        indexer.index_job(JobId::new(11)).await.unwrap();

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let (collection, id, text, metadata) = &upserts[0];
        assert_eq!(*collection, Collection::Jobs);
        assert_eq!(*id, 11);
        assert!(text.starts_with("Cloud Engineer"));
        assert_eq!(metadata["status"], "active");
    }

    #[tokio::test]
    async fn test_index_candidate() {
        let index = Arc::new(CannedIndex::default());
        let indexer = indexer(Arc::clone(&index), Arc::new(FixedEmbedder)).await;
        indexer.index_candidate(UserId::new(2)).await.unwrap();

        let upserts = index.upserts.lock().unwrap();
        let (collection, id, text, _) = &upserts[0];
        assert_eq!(*collection, Collection::Candidates);
        assert_eq!(*id, 2);
        assert!(text.contains("Backend Developer"));
        assert!(text.contains("Python"));
    }

    #[tokio::test]
    async fn test_unknown_records_are_not_found() {
        let indexer = indexer(Arc::new(CannedIndex::default()), Arc::new(FixedEmbedder)).await;
        let err = indexer.index_job(JobId::new(404)).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound { kind: "job", id: 404 }));

        let err = indexer.index_candidate(UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, MatchError::NotFound { id: 1, .. }));
    }

    #[tokio::test]
    async fn test_unavailable_embedding_is_an_error() {
        let index = Arc::new(CannedIndex::default());
        let indexer = indexer(Arc::clone(&index), Arc::new(DownEmbedder)).await;
        let err = indexer.index_job(JobId::new(10)).await.unwrap_err();
        assert!(matches!(err, MatchError::ProviderUnavailable(_)));
        assert!(index.upserts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove() {
        let index = Arc::new(CannedIndex::default());
        let indexer = indexer(Arc::clone(&index), Arc::new(FixedEmbedder)).await;
        assert!(indexer.remove_job(JobId::new(10)).await.unwrap());
        assert!(indexer.remove_candidate(UserId::new(2)).await.unwrap());
        assert_eq!(
            *index.deletes.lock().unwrap(),
            [(Collection::Jobs, 10), (Collection::Candidates, 2)]
        );
    }
}
