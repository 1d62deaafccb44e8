//! Embedding provider modules.

pub mod embedder;

pub use embedder::{EmbedFuture, Embedded, EmbeddingProvider, OllamaEmbedder};
