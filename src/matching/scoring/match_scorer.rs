//! Weighted, renormalized compatibility scoring.

use crate::matching::core::config::{MatchConfig, ScoringWeights};
use crate::matching::core::filters::SearchFilters;
use crate::matching::core::records::{Experience, Rankable};
use crate::matching::interpret::fuzzy::best_ratio;

/// Credit for a query skill that shares a long word with a record skill.
const SHARED_WORD_CREDIT: f64 = 0.8;
/// Words must be longer than this to count as shared.
const SHARED_WORD_MIN_CHARS: usize = 3;
/// Role credit when one role string contains the other.
const ROLE_CONTAINMENT_CREDIT: f64 = 0.88;
/// Location credit for partial containment.
const LOCATION_PARTIAL_CREDIT: f64 = 2.0 / 3.0;
/// Fields counted by the completeness factor.
const COMPLETENESS_FIELDS: u32 = 5;

/// Earned points per factor; `None` means the factor did not contribute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Skills factor.
    pub skills: Option<f64>,
    /// Role factor.
    pub role: Option<f64>,
    /// Location factor.
    pub location: Option<f64>,
    /// Experience factor.
    pub experience: Option<f64>,
    /// Completeness factor.
    pub completeness: Option<f64>,
    /// Sum of the weights of contributing factors.
    pub max_possible: f64,
}

impl ScoreBreakdown {
    /// Sum of earned points.
    #[must_use]
    pub fn earned(&self) -> f64 {
        [
            self.skills,
            self.role,
            self.location,
            self.experience,
            self.completeness,
        ]
        .into_iter()
        .flatten()
        .sum()
    }
}

/// One parameterizable scorer for both the candidate-search and the job-search profile.
#[derive(Clone, Debug)]
pub struct MatchScorer {
    weights: ScoringWeights,
    partial_skill_threshold: f64,
    neutral_score: f64,
}

impl MatchScorer {
    /// Create a scorer from an explicit weight profile.
    #[must_use]
    pub const fn new(
        weights: ScoringWeights,
        partial_skill_threshold: f64,
        neutral_score: f64,
    ) -> Self {
        Self {
            weights,
            partial_skill_threshold,
            neutral_score,
        }
    }

    /// Scorer for ranking candidates against a recruiter query.
    #[must_use]
    pub fn candidate_search(config: &MatchConfig) -> Self {
        Self::new(
            config.scoring.candidate_weights.clone(),
            config.fuzzy.partial_skill_threshold,
            config.scoring.neutral_score,
        )
    }

    /// Scorer for ranking job postings for a seeker.
    #[must_use]
    pub fn job_search(config: &MatchConfig) -> Self {
        Self::new(
            config.scoring.job_weights.clone(),
            config.fuzzy.partial_skill_threshold,
            config.scoring.neutral_score,
        )
    }

    /// Score returned when no criterion applies.
    #[must_use]
    pub const fn neutral_score(&self) -> f64 {
        self.neutral_score
    }

    /// Compatibility score in `[0, 100]`.
    #[must_use]
    pub fn score<R: Rankable>(&self, record: &R, filters: &SearchFilters) -> f64 {
        let breakdown = self.breakdown(record, filters);
        if breakdown.max_possible <= 0.0 {
            return self.neutral_score;
        }
        (100.0 * breakdown.earned() / breakdown.max_possible).clamp(0.0, 100.0)
    }

    /// Convert a skill-overlap count into a score comparable with [`Self::score`].
    #[must_use]
    pub fn overlap_score(&self, matching: usize, total_required: usize) -> f64 {
        if total_required == 0 {
            return self.neutral_score;
        }
        (100.0 * as_f64(matching) / as_f64(total_required)).clamp(0.0, 100.0)
    }

    /// Per-factor earned points.
    #[must_use]
    pub fn breakdown<R: Rankable>(&self, record: &R, filters: &SearchFilters) -> ScoreBreakdown {
        let w = &self.weights;
        let mut out = ScoreBreakdown::default();

        if !filters.skills().is_empty() && w.skills > 0.0 {
            out.skills = Some(w.skills * self.skill_ratio(&record.skill_names(), filters.skills()));
            out.max_possible += w.skills;
        }

        if let Some(role) = filters.role().filter(|_| w.role > 0.0) {
            out.role = Some(w.role * role_ratio(role, record.role()));
            out.max_possible += w.role;
        }

        if let Some(location) = filters.location().filter(|_| w.location > 0.0) {
            out.location = Some(
                w.location * location_ratio(location, record.location(), record.address()),
            );
            out.max_possible += w.location;
        }

        if let Some(years) = filters.min_experience().filter(|_| w.experience > 0.0) {
            out.experience = Some(w.experience * experience_ratio(record.experience(), years));
            out.max_possible += w.experience;
        }

        if out.max_possible > 0.0 && w.completeness > 0.0 {
            let filled = u32::try_from(record.populated_fields())
                .unwrap_or(u32::MAX)
                .min(COMPLETENESS_FIELDS);
            out.completeness =
                Some(w.completeness * f64::from(filled) / f64::from(COMPLETENESS_FIELDS));
            out.max_possible += w.completeness;
        }

        out
    }

    fn skill_ratio(&self, record_skills: &[String], query_skills: &[String]) -> f64 {
        let have: Vec<String> = record_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if have.is_empty() {
            return 0.0;
        }

        let credits: f64 = query_skills
            .iter()
            .map(|skill| self.skill_credit(&skill.trim().to_lowercase(), &have))
            .sum();
        (credits / as_f64(query_skills.len())).min(1.0)
    }

    fn skill_credit(&self, wanted: &str, have: &[String]) -> f64 {
        // short names ("r", "go") only match exactly
        let short = wanted.chars().count() <= 2;
        if have.iter().any(|skill| {
            if short || skill.chars().count() <= 2 {
                skill == wanted
            } else {
                skill.contains(wanted) || wanted.contains(skill.as_str())
            }
        }) {
            return 1.0;
        }

        let ratio = best_ratio(wanted, have.iter().map(String::as_str));
        if ratio >= self.partial_skill_threshold {
            return ratio;
        }

        let shares_word = long_words(wanted).any(|word| {
            have.iter()
                .any(|skill| long_words(skill).any(|other| other == word))
        });
        if shares_word { SHARED_WORD_CREDIT } else { 0.0 }
    }
}

fn role_ratio(wanted: &str, actual: Option<&str>) -> f64 {
    let wanted = wanted.trim().to_lowercase();
    let Some(actual) = actual.map(|a| a.trim().to_lowercase()).filter(|a| !a.is_empty()) else {
        return 0.0;
    };
    if wanted == actual {
        return 1.0;
    }
    if actual.contains(&wanted) || wanted.contains(&actual) {
        return ROLE_CONTAINMENT_CREDIT;
    }

    let left: std::collections::HashSet<&str> = wanted.split_whitespace().collect();
    let right: std::collections::HashSet<&str> = actual.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    as_f64(left.intersection(&right).count()) / as_f64(union)
}

fn location_ratio(wanted: &str, location: Option<&str>, address: Option<&str>) -> f64 {
    let wanted = wanted.trim().to_lowercase();
    let location = location.unwrap_or_default().trim().to_lowercase();
    let address = address.unwrap_or_default().trim().to_lowercase();

    if (!location.is_empty() && location.contains(&wanted))
        || (!address.is_empty() && address.contains(&wanted))
    {
        return 1.0;
    }

    let combined = format!("{location} {address}");
    let combined = combined.trim();
    if combined.is_empty() {
        return 0.0;
    }
    let partial = (!location.is_empty() && wanted.contains(&location))
        || wanted
            .split(|ch: char| !ch.is_alphanumeric())
            .filter(|word| word.chars().count() >= 3)
            .any(|word| combined.contains(word));
    if partial { LOCATION_PARTIAL_CREDIT } else { 0.0 }
}

/// `filter_years` is the requirement for candidates and what the seeker offers for jobs.
fn experience_ratio(experience: Experience, filter_years: i64) -> f64 {
    let (have, need) = match experience {
        Experience::Offered(years) => (years, filter_years),
        Experience::Required(years) => (filter_years, years.unwrap_or(0)),
    };
    if need <= 0 || have >= need {
        return 1.0;
    }
    if have <= 0 {
        return 0.0;
    }
    years_f64(have) / years_f64(need)
}

fn long_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| word.chars().count() > SHARED_WORD_MIN_CHARS)
}

fn as_f64(n: usize) -> f64 {
    f64::from(u32::try_from(n).unwrap_or(u32::MAX))
}

fn years_f64(years: i64) -> f64 {
    f64::from(i32::try_from(years).unwrap_or(i32::MAX))
}
