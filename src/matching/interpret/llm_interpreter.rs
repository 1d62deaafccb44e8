//! Language-model query interpretation with rule-based fallback.

use std::time::Duration;

use regex::Regex;
use reqwest::Client as ReqwestClient;
use rig::client::{CompletionClient, Nothing};
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;
use serde_json::Value;
use tracing::{debug, warn};

use crate::matching::core::config::{FuzzyConfig, InterpreterConfig, LlmConfig};
use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::core::filters::SearchFilters;
use crate::matching::interpret::interpreter::{InterpretFuture, QueryInterpreter, correct_skills};
use crate::matching::interpret::rule_based::RuleBasedInterpreter;
use crate::matching::interpret::vocabulary::SkillVocabulary;

const SYSTEM_PROMPT: &str = "You parse job search queries into structured filters. The query may contain typos; interpret them. Return ONLY a JSON object with these fields, using null for missing values: {\"skills\": [\"skill\"], \"location\": \"place\", \"min_experience\": number, \"job_of_choice\": \"role\", \"keywords\": [\"keyword\"]}. Do not include any explanation.";

/// Interpreter that asks an Ollama completion model first.
pub struct LlmInterpreter {
    model: ollama::CompletionModel,
    temperature: f64,
    timeout: Duration,
    fallback: RuleBasedInterpreter,
    json_block: Regex,
    correction_threshold: f64,
}

impl LlmInterpreter {
    /// Create a new interpreter using the completion model config.
    ///
    /// # Errors
    /// Returns an error if the Ollama client cannot be built or a pattern fails to compile.
    pub fn new(
        llm: &LlmConfig,
        interpreter: &InterpreterConfig,
        fuzzy: &FuzzyConfig,
    ) -> MatchResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &llm.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(MatchError::from)?;
        let model = client.completion_model(llm.model.clone());
        let fallback = RuleBasedInterpreter::new(interpreter, fuzzy)
            .map_err(|err| MatchError::InvalidConfig(err.to_string()))?;
        let json_block =
            Regex::new(r"(?s)\{.*\}").map_err(|err| MatchError::InvalidConfig(err.to_string()))?;

        Ok(Self {
            model,
            temperature: llm.temperature,
            timeout: llm.timeout(),
            fallback,
            json_block,
            correction_threshold: fuzzy.correction_threshold,
        })
    }

    async fn ask_model(&self, query: &str) -> MatchResult<SearchFilters> {
        let request = self
            .model
            .completion_request(format!("Query: \"{query}\""))
            .preamble(SYSTEM_PROMPT.to_string())
            .temperature(self.temperature)
            .build();

        let response = tokio::time::timeout(self.timeout, self.model.completion(request))
            .await
            .map_err(|_| MatchError::timeout("query interpretation", self.timeout))??;
        let text = extract_text(&response.choice);
        parse_model_reply(&self.json_block, &text)
    }

    async fn interpret_query(&self, query: &str, vocabulary: &SkillVocabulary) -> SearchFilters {
        match self.ask_model(query).await {
            Ok(filters) => self.finish_model_filters(filters, query, vocabulary),
            Err(err) => {
                warn!(error = %err, "model interpretation failed, using rule-based interpreter");
                self.fallback.parse(query, vocabulary)
            }
        }
    }

    /// Fill a missing role from the rules and correct the model's skill names.
    fn finish_model_filters(
        &self,
        filters: SearchFilters,
        query: &str,
        vocabulary: &SkillVocabulary,
    ) -> SearchFilters {
        let filters = if filters.role().is_none() {
            match self.fallback.extract_role(query, vocabulary) {
                Some(role) => {
                    debug!(%role, "supplementing model interpretation with rule-based role");
                    filters.with_role(role)
                }
                None => filters,
            }
        } else {
            filters
        };
        correct_skills(filters, vocabulary, self.correction_threshold)
    }
}

impl QueryInterpreter for LlmInterpreter {
    fn interpret<'a>(
        &'a self,
        query: &'a str,
        vocabulary: &'a SkillVocabulary,
    ) -> InterpretFuture<'a> {
        Box::pin(self.interpret_query(query, vocabulary))
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}

/// Parse the first `{...}` block of a model reply into filters.
///
/// Individual ill-typed fields are dropped; a reply without a JSON object is an error.
fn parse_model_reply(json_block: &Regex, text: &str) -> MatchResult<SearchFilters> {
    let block = json_block
        .find(text)
        .ok_or_else(|| MatchError::ParseFailure("reply contains no JSON object".to_string()))?;
    let value: Value = serde_json::from_str(block.as_str())?;
    if !value.is_object() {
        return Err(MatchError::ParseFailure(
            "reply JSON is not an object".to_string(),
        ));
    }
    Ok(SearchFilters::from_caller_json(&value))
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_block() -> Regex {
        Regex::new(r"(?s)\{.*\}").unwrap()
    }

    #[test]
    fn test_parse_reply_with_prose_around_json() {
        let reply = "Sure! Here you go:\n```json\n{\"skills\": [\"Python\"],\n \"location\": null, \"min_experience\": 5, \"job_of_choice\": \"developer\", \"keywords\": []}\n```";
        let filters = parse_model_reply(&json_block(), reply).unwrap();
        assert_eq!(filters.skills(), ["Python"]);
        assert_eq!(filters.min_experience(), Some(5));
        assert_eq!(filters.role(), Some("developer"));
        assert_eq!(filters.location(), None);
    }

    #[test]
    fn test_parse_reply_drops_ill_typed_fields() {
        let reply = r#"{"skills": ["Go"], "min_experience": "several"}"#;
        let filters = parse_model_reply(&json_block(), reply).unwrap();
        assert_eq!(filters.skills(), ["Go"]);
        assert_eq!(filters.min_experience(), None);
    }

    #[test]
    fn test_parse_reply_without_json_fails() {
        let err = parse_model_reply(&json_block(), "I cannot help with that.").unwrap_err();
        assert!(matches!(err, MatchError::ParseFailure(_)));
    }

    #[test]
    fn test_parse_reply_with_broken_json_fails() {
        let err = parse_model_reply(&json_block(), "{\"skills\": [\"Python\",}").unwrap_err();
        assert!(matches!(err, MatchError::Serialization(_)));
    }

    fn offline_interpreter() -> LlmInterpreter {
        let llm = LlmConfig {
            base_url: Some("http://127.0.0.1:9".to_string()),
            timeout_ms: 500,
            ..LlmConfig::default()
        };
        LlmInterpreter::new(&llm, &InterpreterConfig::default(), &FuzzyConfig::default()).unwrap()
    }

    #[test]
    fn test_model_role_is_kept() {
        let interpreter = offline_interpreter();
        let vocab = SkillVocabulary::builtin();
        let reply = SearchFilters::new().with_role("data scientist");
        let filters =
            interpreter.finish_model_filters(reply, "python developer with 5 year experience", &vocab);
        assert_eq!(filters.role(), Some("data scientist"));
    }

    #[test]
    fn test_missing_model_role_comes_from_rules() {
        let interpreter = offline_interpreter();
        let vocab = SkillVocabulary::builtin();
        let reply = SearchFilters::new().with_skills(["Python"]);
        let filters =
            interpreter.finish_model_filters(reply, "python developer with 5 year experience", &vocab);
        assert_eq!(filters.role(), Some("developer"));
        assert_eq!(filters.skills(), ["Python"]);
    }

    #[test]
    fn test_model_skills_are_corrected() {
        let interpreter = offline_interpreter();
        let vocab = SkillVocabulary::builtin();
        let reply = SearchFilters::new()
            .with_skills(["Javascrpt", "kubernetes"])
            .with_role("engineer");
        let filters = interpreter.finish_model_filters(reply, "frontend work", &vocab);
        assert_eq!(filters.skills(), ["JavaScript", "Kubernetes"]);
        assert_eq!(filters.role(), Some("engineer"));
    }

    #[tokio::test]
    async fn test_unreachable_model_falls_back_to_rules() {
        let interpreter = offline_interpreter();
        let vocab = SkillVocabulary::builtin();
        let filters = interpreter
            .interpret("python developer with 5 year experience", &vocab)
            .await;
        assert_eq!(filters.skills(), ["Python"]);
        assert_eq!(filters.role(), Some("developer"));
        assert_eq!(filters.min_experience(), Some(5));
    }
}
