//! Query text normalization.

pub mod text_normalizer;

pub use text_normalizer::TextNormalizer;
