//! Query interpreter capability.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::matching::core::filters::SearchFilters;
use crate::matching::interpret::vocabulary::SkillVocabulary;

/// Boxed future type for interpreter operations.
pub type InterpretFuture<'a> = Pin<Box<dyn Future<Output = SearchFilters> + Send + 'a>>;

/// Turns a normalized natural-language query into structured filters.
///
/// Implementations never fail: a degraded path yields fewer filters, not an error.
pub trait QueryInterpreter: Send + Sync {
    /// Interpret `query`, correcting extracted skills against `vocabulary`.
    fn interpret<'a>(
        &'a self,
        query: &'a str,
        vocabulary: &'a SkillVocabulary,
    ) -> InterpretFuture<'a>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Pass every extracted skill through fuzzy correction.
#[must_use]
pub(crate) fn correct_skills(
    filters: SearchFilters,
    vocabulary: &SkillVocabulary,
    threshold: f64,
) -> SearchFilters {
    if filters.skills().is_empty() || vocabulary.is_empty() {
        return filters;
    }
    let corrected: Vec<String> = filters
        .skills()
        .iter()
        .map(|skill| {
            let fixed = vocabulary.correct(skill, threshold);
            if fixed != *skill {
                debug!(from = %skill, to = %fixed, "corrected skill name");
            }
            fixed
        })
        .collect();
    filters.replace_skills(corrected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_skills_uses_vocabulary_spelling() {
        let vocab = SkillVocabulary::new(["Python", "Docker"]);
        let filters = SearchFilters::new()
            .with_skills(["pyhton", "docker", "Zig"])
            .with_location("Austin");
        let corrected = correct_skills(filters, &vocab, 0.6);
        assert_eq!(corrected.skills(), ["Python", "Docker", "Zig"]);
        assert_eq!(corrected.location(), Some("Austin"));
    }

    #[test]
    fn test_correct_skills_merges_duplicates_after_correction() {
        let vocab = SkillVocabulary::new(["Python"]);
        let filters = SearchFilters::new().with_skills(["python", "pyhton"]);
        assert_eq!(correct_skills(filters, &vocab, 0.6).skills(), ["Python"]);
    }
}
