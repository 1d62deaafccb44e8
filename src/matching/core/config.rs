//! Configuration for the matching subsystem.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::matching::core::errors::{MatchError, MatchResult};

/// Top-level configuration for the matching engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Storage settings.
    pub storage: StorageConfig,
    /// Embedding model settings.
    pub embedding: EmbeddingConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// Query interpretation settings.
    pub interpreter: InterpreterConfig,
    /// Fuzzy matching thresholds.
    pub fuzzy: FuzzyConfig,
    /// Ranking weights.
    pub scoring: ScoringConfig,
    /// Retrieval and fallback settings.
    pub retrieval: RetrievalConfig,
}

impl MatchConfig {
    /// Build a configuration from defaults overlaid with `HIREMATCH_*` environment variables.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed, or if the resulting
    /// configuration is invalid.
    pub fn from_env() -> MatchResult<Self> {
        let mut config = Self::default();

        if let Some(path) = env_var("HIREMATCH_DB_PATH") {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(url) = env_var("HIREMATCH_OLLAMA_URL") {
            config.embedding.base_url = Some(url.clone());
            config.llm.base_url = Some(url);
        }
        if let Some(model) = env_var("HIREMATCH_EMBED_MODEL") {
            config.embedding.model = model;
        }
        if let Some(ndims) = env_parse::<usize>("HIREMATCH_EMBED_NDIMS")? {
            config.embedding.ndims = ndims;
        }
        if let Some(model) = env_var("HIREMATCH_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(mode) = env_var("HIREMATCH_INTERPRETER") {
            config.interpreter.mode = match mode.to_ascii_lowercase().as_str() {
                "llm" => InterpreterMode::Llm,
                "rule_based" | "rules" => InterpreterMode::RuleBased,
                other => {
                    return Err(MatchError::InvalidConfig(format!(
                        "HIREMATCH_INTERPRETER must be `llm` or `rule_based`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(ms) = env_parse::<u64>("HIREMATCH_REQUEST_TIMEOUT_MS")? {
            config.retrieval.request_timeout_ms = ms;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> MatchResult<()> {
        if self.embedding.ndims == 0 {
            return Err(MatchError::InvalidConfig(
                "embedding.ndims must be > 0".to_string(),
            ));
        }

        for (name, value) in [
            ("fuzzy.correction_threshold", self.fuzzy.correction_threshold),
            ("fuzzy.partial_skill_threshold", self.fuzzy.partial_skill_threshold),
            ("fuzzy.token_scan_threshold", self.fuzzy.token_scan_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MatchError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.scoring.neutral_score) {
            return Err(MatchError::InvalidConfig(
                "scoring.neutral_score must be within [0, 100]".to_string(),
            ));
        }

        self.scoring.candidate_weights.validate("scoring.candidate_weights")?;
        self.scoring.job_weights.validate("scoring.job_weights")?;

        if self.retrieval.vector_overfetch == 0 {
            return Err(MatchError::InvalidConfig(
                "retrieval.vector_overfetch must be > 0".to_string(),
            ));
        }

        if self.retrieval.default_limit == 0 || self.retrieval.max_limit == 0 {
            return Err(MatchError::InvalidConfig(
                "retrieval limits must be > 0".to_string(),
            ));
        }

        if self.retrieval.default_limit > self.retrieval.max_limit {
            return Err(MatchError::InvalidConfig(
                "retrieval.default_limit must not exceed retrieval.max_limit".to_string(),
            ));
        }

        for (name, ms) in [
            ("embedding.timeout_ms", self.embedding.timeout_ms),
            ("llm.timeout_ms", self.llm.timeout_ms),
            ("retrieval.vector_timeout_ms", self.retrieval.vector_timeout_ms),
            ("retrieval.store_timeout_ms", self.retrieval.store_timeout_ms),
            ("retrieval.request_timeout_ms", self.retrieval.request_timeout_ms),
        ] {
            if ms == 0 {
                return Err(MatchError::InvalidConfig(format!("{name} must be > 0")));
            }
        }

        if let Some(base_url) = &self.embedding.base_url {
            Url::parse(base_url)?;
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> MatchResult<Option<T>> {
    env_var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| MatchError::InvalidConfig(format!("{name} has an invalid value")))
        })
        .transpose()
}

/// Storage configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Seed the default skill vocabulary when the schema is created.
    pub seed_skills: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("hirematch.sqlite"),
            seed_skills: true,
        }
    }
}

/// Embedding model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama embedding model name.
    pub model: String,
    /// Embedding vector dimensions.
    pub ndims: usize,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
}

impl EmbeddingConfig {
    /// Deadline for one embedding call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            ndims: 768,
            base_url: None,
            timeout_ms: 4_000,
        }
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Deadline for one completion call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "ministral-3:8b-instruct-2512-q8_0".to_string(),
            temperature: 0.0,
            base_url: None,
            timeout_ms: 8_000,
        }
    }
}

/// Interpreter selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpreterMode {
    /// Deterministic rule-based parsing only.
    RuleBased,
    /// Language model first, rule-based on failure.
    Llm,
}

/// Query interpretation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Which interpreter to use.
    pub mode: InterpreterMode,
    /// Years implied by "senior".
    pub senior_years: i64,
    /// Years implied by "experienced".
    pub experienced_years: i64,
    /// Years implied by "mid".
    pub mid_years: i64,
    /// Years implied by "junior" or "entry".
    pub junior_years: i64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            mode: InterpreterMode::RuleBased,
            senior_years: 5,
            experienced_years: 3,
            mid_years: 2,
            junior_years: 0,
        }
    }
}

/// Fuzzy matching thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FuzzyConfig {
    /// Minimum ratio for correcting a skill name against the vocabulary.
    pub correction_threshold: f64,
    /// Minimum ratio for partial skill credit in the scorer.
    pub partial_skill_threshold: f64,
    /// Minimum ratio for the rule-based technology token scan.
    pub token_scan_threshold: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            correction_threshold: 0.6,
            partial_skill_threshold: 0.7,
            token_scan_threshold: 0.8,
        }
    }
}

/// Weight profile for one scorer variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Skills factor weight.
    pub skills: f64,
    /// Role factor weight.
    pub role: f64,
    /// Location factor weight.
    pub location: f64,
    /// Experience factor weight.
    pub experience: f64,
    /// Completeness factor weight.
    pub completeness: f64,
}

impl ScoringWeights {
    /// Weights used when ranking candidates for a recruiter query.
    #[must_use]
    pub const fn candidate_search() -> Self {
        Self {
            skills: 50.0,
            role: 25.0,
            location: 15.0,
            experience: 15.0,
            completeness: 10.0,
        }
    }

    /// Weights used when ranking job postings.
    #[must_use]
    pub const fn job_search() -> Self {
        Self {
            skills: 40.0,
            role: 0.0,
            location: 20.0,
            experience: 30.0,
            completeness: 10.0,
        }
    }

    fn validate(&self, name: &str) -> MatchResult<()> {
        let all = [
            self.skills,
            self.role,
            self.location,
            self.experience,
            self.completeness,
        ];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::InvalidConfig(format!(
                "{name} weights must be finite and non-negative"
            )));
        }
        Ok(())
    }
}

/// Ranking settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Candidate-search weight profile.
    pub candidate_weights: ScoringWeights,
    /// Job-search weight profile.
    pub job_weights: ScoringWeights,
    /// Score returned when no factor applies.
    pub neutral_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            candidate_weights: ScoringWeights::candidate_search(),
            job_weights: ScoringWeights::job_search(),
            neutral_score: 50.0,
        }
    }
}

/// Retrieval and fallback settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Vector hits fetched per requested result.
    pub vector_overfetch: usize,
    /// Deadline for one vector index call in milliseconds.
    pub vector_timeout_ms: u64,
    /// Deadline for one relational query in milliseconds.
    pub store_timeout_ms: u64,
    /// Deadline for a whole search request in milliseconds.
    pub request_timeout_ms: u64,
    /// Limit used when a caller does not provide one.
    pub default_limit: usize,
    /// Upper bound applied to caller limits.
    pub max_limit: usize,
}

impl RetrievalConfig {
    /// Deadline for one vector index call.
    #[must_use]
    pub const fn vector_timeout(&self) -> Duration {
        Duration::from_millis(self.vector_timeout_ms)
    }

    /// Deadline for one relational query.
    #[must_use]
    pub const fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Deadline for a whole request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Clamp a caller-supplied limit into `1..=max_limit`.
    #[must_use]
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_overfetch: 2,
            vector_timeout_ms: 2_000,
            store_timeout_ms: 5_000,
            request_timeout_ms: 20_000,
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let mut config = MatchConfig::default();
        config.fuzzy.correction_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(MatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let mut config = MatchConfig::default();
        config.llm.base_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(MatchError::Url(_))));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = MatchConfig::default();
        config.scoring.job_weights.location = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_limit() {
        let retrieval = RetrievalConfig::default();
        assert_eq!(retrieval.clamp_limit(None), 10);
        assert_eq!(retrieval.clamp_limit(Some(0)), 1);
        assert_eq!(retrieval.clamp_limit(Some(10_000)), 100);
    }

    #[test]
    fn test_weight_profiles() {
        let candidate = ScoringWeights::candidate_search();
        assert!((candidate.skills - 50.0).abs() < f64::EPSILON);
        assert!((candidate.role - 25.0).abs() < f64::EPSILON);
        let job = ScoringWeights::job_search();
        assert!((job.experience - 30.0).abs() < f64::EPSILON);
        assert!(job.role.abs() < f64::EPSILON);
    }
}
