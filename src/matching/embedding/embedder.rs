//! Embedding provider wrapper for Rig + Ollama.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use rig::client::{EmbeddingsClient, Nothing};
use rig::embeddings::EmbeddingModel;
use rig::providers::ollama;
use tracing::warn;

use crate::matching::core::config::EmbeddingConfig;
use crate::matching::core::errors::{MatchError, MatchResult};

/// Boxed future type for embedding operations.
pub type EmbedFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of one embedding call.
///
/// `Unavailable` is a normal answer, not an error: it tells the retriever to skip the vector
/// tier.
#[derive(Clone, Debug, PartialEq)]
pub enum Embedded {
    /// A vector of the provider's dimensionality.
    Vector(Vec<f32>),
    /// The provider failed, timed out, or is rate limited.
    Unavailable(String),
}

impl Embedded {
    /// True for the `Unavailable` sentinel.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Trait abstraction over embedding providers.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string. Never fails; failures come back as
    /// [`Embedded::Unavailable`].
    fn embed(&self, text: &str) -> EmbedFuture<'_, Embedded>;
    /// Return embedding dimensionality.
    fn ndims(&self) -> usize;
}

type OllamaEmbeddingModel = ollama::EmbeddingModel<ReqwestClient>;

/// Ollama embedder using the Rig provider.
#[derive(Clone)]
pub struct OllamaEmbedder {
    model: OllamaEmbeddingModel,
    ndims: usize,
    timeout: Duration,
}

impl OllamaEmbedder {
    /// Create a new Ollama embedder from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &EmbeddingConfig) -> MatchResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(MatchError::from)?;
        let model = client.embedding_model_with_ndims(config.model.clone(), config.ndims);
        Ok(Self {
            model,
            ndims: config.ndims,
            timeout: config.timeout(),
        })
    }

    /// Embed `text`, surfacing the failure cause.
    ///
    /// # Errors
    /// Returns an error on provider failure, timeout, or a dimension mismatch.
    pub async fn try_embed(&self, text: &str) -> MatchResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(MatchError::ProviderUnavailable(
                "nothing to embed".to_string(),
            ));
        }

        let embedding = tokio::time::timeout(self.timeout, self.model.embed_text(text))
            .await
            .map_err(|_| MatchError::timeout("embedding", self.timeout))??;

        if embedding.vec.len() != self.ndims {
            return Err(MatchError::ProviderUnavailable(format!(
                "expected {} dimensions, provider returned {}",
                self.ndims,
                embedding.vec.len()
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        let vector = embedding.vec.iter().map(|value| *value as f32).collect();
        Ok(vector)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed(&self, text: &str) -> EmbedFuture<'_, Embedded> {
        let text = text.to_string();
        Box::pin(async move {
            match self.try_embed(&text).await {
                Ok(vector) => Embedded::Vector(vector),
                Err(err) => {
                    warn!(error = %err, "embedding provider unavailable");
                    Embedded::Unavailable(err.to_string())
                }
            }
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_embedder() -> OllamaEmbedder {
        OllamaEmbedder::new(&EmbeddingConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_ms: 500,
            ..EmbeddingConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_unavailable() {
        let embedded = unreachable_embedder().embed("python developer").await;
        assert!(embedded.is_unavailable());
    }

    #[tokio::test]
    async fn test_blank_text_is_unavailable() {
        let embedder = unreachable_embedder();
        assert_eq!(embedder.ndims(), 768);
        assert!(matches!(
            embedder.try_embed("   ").await,
            Err(MatchError::ProviderUnavailable(_))
        ));
    }
}
