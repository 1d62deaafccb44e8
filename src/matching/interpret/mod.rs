//! Query interpretation: fuzzy correction, skill vocabulary, and the two interpreters.

pub mod fuzzy;
pub mod interpreter;
pub mod llm_interpreter;
pub mod rule_based;
pub mod vocabulary;

pub use fuzzy::{best_ratio, correct, similarity_ratio};
pub use interpreter::{InterpretFuture, QueryInterpreter};
pub use llm_interpreter::LlmInterpreter;
pub use rule_based::RuleBasedInterpreter;
pub use vocabulary::{DEFAULT_SKILLS, SkillVocabulary};
