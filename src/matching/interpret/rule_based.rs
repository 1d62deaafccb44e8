//! Deterministic rule-based query interpretation.
//!
//! Works on normalized text. Extraction order: technology scan, role window, experience
//! (numbers first, seniority words second), location phrase.

use std::cmp::Reverse;

use regex::Regex;
use tracing::debug;

use crate::matching::core::config::{FuzzyConfig, InterpreterConfig};
use crate::matching::core::filters::SearchFilters;
use crate::matching::interpret::fuzzy::similarity_ratio;
use crate::matching::interpret::interpreter::{InterpretFuture, QueryInterpreter, correct_skills};
use crate::matching::interpret::vocabulary::SkillVocabulary;

/// Technology names recognised even when the store vocabulary is empty.
const TECH_TERMS: &[&str] = &[
    "Python", "JavaScript", "TypeScript", "Java", "C++", "C#", "Rust", "Ruby", "PHP", "Swift",
    "Kotlin", "Scala", "React", "Angular", "Vue.js", "Node.js", "Django", "Flask", "FastAPI",
    "Spring Boot", "Rails", "Laravel", "HTML", "CSS", "SQL", "MySQL", "PostgreSQL", "MongoDB",
    "Redis", "AWS", "Azure", "Google Cloud Platform", "Docker", "Kubernetes", "Terraform",
    "Jenkins", "Git", "Linux", "GraphQL", "Machine Learning", "Deep Learning", "Data Science",
    "Data Analysis", "TensorFlow", "PyTorch", "Pandas", "NumPy", "Tableau", "Power BI", "Excel",
    "Figma", "Flutter", "React Native",
];

/// Short forms mapped to canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("golang", "Go"),
    ("k8s", "Kubernetes"),
    ("postgres", "PostgreSQL"),
    ("node", "Node.js"),
    ("nodejs", "Node.js"),
    ("reactjs", "React"),
    ("react.js", "React"),
    ("vue", "Vue.js"),
    ("vuejs", "Vue.js"),
    ("ml", "Machine Learning"),
    ("gcp", "Google Cloud Platform"),
    ("android", "Android Development"),
    ("ios", "iOS Development"),
    ("dotnet", "ASP.NET"),
    (".net", "ASP.NET"),
    ("sklearn", "Scikit-learn"),
];

/// Role keyword → role name. Plural tokens (`keyword + "s"`) also match.
const ROLE_KEYWORDS: &[(&str, &str)] = &[
    ("developer", "developer"),
    ("dev", "developer"),
    ("engineer", "engineer"),
    ("programmer", "programmer"),
    ("analyst", "analyst"),
    ("manager", "manager"),
    ("designer", "designer"),
    ("architect", "architect"),
    ("scientist", "scientist"),
    ("administrator", "administrator"),
    ("admin", "administrator"),
    ("consultant", "consultant"),
    ("specialist", "specialist"),
    ("tester", "tester"),
    ("lead", "lead"),
    ("intern", "intern"),
    ("recruiter", "recruiter"),
    ("coordinator", "coordinator"),
    ("technician", "technician"),
];

/// Words that never join a role window and are never fuzzy-matched to a technology.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "any", "at", "experience", "experienced", "find", "for", "from", "good",
    "hire", "hiring", "i", "in", "junior", "jr", "knows", "level", "looking", "mid", "near",
    "need", "needs", "of", "or", "reach", "remote", "scale", "seeking", "senior", "someone",
    "sr", "strong", "team", "the", "to", "want", "we", "who", "with", "year", "years", "yr",
    "yrs",
];

/// Maximum number of words taken in front of a role keyword.
const ROLE_WINDOW: usize = 2;

/// A scannable technology term.
#[derive(Clone, Debug)]
struct TechTerm {
    words: Vec<String>,
    canonical: String,
}

impl TechTerm {
    fn new(pattern: &str, canonical: &str) -> Self {
        Self {
            words: pattern.split_whitespace().map(str::to_lowercase).collect(),
            canonical: canonical.to_string(),
        }
    }
}

/// A seniority word mapped to implied years.
struct SeniorityRule {
    pattern: Regex,
    years: i64,
}

/// A query token with surrounding punctuation removed.
#[derive(Debug)]
struct Token {
    lower: String,
}

/// Result of the technology scan.
struct SkillScan {
    /// `(token position, canonical name)` in query order.
    found: Vec<(usize, String)>,
    /// Tokens claimed by a technology term.
    consumed: Vec<bool>,
}

/// Rule-based interpreter; always available.
pub struct RuleBasedInterpreter {
    terms: Vec<TechTerm>,
    experience_rules: Vec<Regex>,
    seniority_rules: Vec<SeniorityRule>,
    location_rule: Regex,
    correction_threshold: f64,
    token_scan_threshold: f64,
}

impl RuleBasedInterpreter {
    /// Create the interpreter and compile its patterns.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new(interpreter: &InterpreterConfig, fuzzy: &FuzzyConfig) -> Result<Self, regex::Error> {
        let terms = TECH_TERMS
            .iter()
            .map(|name| TechTerm::new(name, name))
            .chain(ALIASES.iter().map(|(alias, name)| TechTerm::new(alias, name)))
            .collect();

        let experience_rules = vec![
            // "5 years", "10+ yrs"
            Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?)\b")?,
            // "experience of 4", "exp: 3"
            Regex::new(r"(?i)\b(?:experience|exp)\s*(?:of\s*)?:?\s*(\d{1,2})\b")?,
            // "at least 3", "minimum 2"
            Regex::new(r"(?i)\b(?:at least|minimum|min)\s+(\d{1,2})\b")?,
        ];

        let seniority_rules = vec![
            SeniorityRule {
                pattern: Regex::new(r"(?i)\b(?:senior|sr)\b")?,
                years: interpreter.senior_years,
            },
            SeniorityRule {
                pattern: Regex::new(r"(?i)\b(?:experienced|seasoned|veteran)\b")?,
                years: interpreter.experienced_years,
            },
            SeniorityRule {
                pattern: Regex::new(r"(?i)\b(?:mid(?:-?level)?|intermediate)\b")?,
                years: interpreter.mid_years,
            },
            SeniorityRule {
                pattern: Regex::new(r"(?i)\b(?:junior|jr|entry(?:-?level)?|graduate|fresher)\b")?,
                years: interpreter.junior_years,
            },
        ];

        let location_rule = Regex::new(
            r"(?i)\b(?:in|at|near|from)\s+(\p{L}[\p{L}.'-]*(?:\s+\p{L}[\p{L}.'-]*){0,2}?)\s*(?:$|[,;]|\s(?:with|and|for|who|having|that|looking|developers?|engineers?)\b)",
        )?;

        Ok(Self {
            terms,
            experience_rules,
            seniority_rules,
            location_rule,
            correction_threshold: fuzzy.correction_threshold,
            token_scan_threshold: fuzzy.token_scan_threshold,
        })
    }

    /// Interpret a normalized query synchronously.
    #[must_use]
    pub fn parse(&self, query: &str, vocabulary: &SkillVocabulary) -> SearchFilters {
        let tokens = tokenize(query);
        let scan = self.scan_skills(&tokens, vocabulary);

        let mut filters = SearchFilters::new();
        if !scan.found.is_empty() {
            filters = filters.with_skills(scan.found.iter().map(|(_, name)| name.clone()));
        }
        if let Some(role) = role_window(&tokens, &scan.consumed) {
            filters = filters.with_role(role);
        }
        if let Some(years) = self.extract_experience(query) {
            filters = filters.with_min_experience(years);
        }
        if let Some(location) = self.extract_location(query, vocabulary) {
            filters = filters.with_location(location);
        }

        debug!(
            skills = filters.skills().len(),
            role = ?filters.role(),
            min_experience = ?filters.min_experience(),
            location = ?filters.location(),
            "rule-based interpretation"
        );
        correct_skills(filters, vocabulary, self.correction_threshold)
    }

    /// Role keyword scan on its own, used to supplement a model interpretation.
    #[must_use]
    pub fn extract_role(&self, query: &str, vocabulary: &SkillVocabulary) -> Option<String> {
        let tokens = tokenize(query);
        let scan = self.scan_skills(&tokens, vocabulary);
        role_window(&tokens, &scan.consumed)
    }

    /// Years of experience; explicit numbers win over seniority words.
    #[must_use]
    pub fn extract_experience(&self, query: &str) -> Option<i64> {
        let numeric = self.experience_rules.iter().find_map(|rule| {
            rule.captures(query)
                .and_then(|caps| caps.get(1))
                .and_then(|years| years.as_str().parse::<i64>().ok())
        });
        numeric.or_else(|| {
            self.seniority_rules
                .iter()
                .find(|rule| rule.pattern.is_match(query))
                .map(|rule| rule.years)
        })
    }

    fn extract_location(&self, query: &str, vocabulary: &SkillVocabulary) -> Option<String> {
        self.location_rule.captures_iter(query).find_map(|caps| {
            let place = caps.get(1)?.as_str().trim();
            let first = place.split_whitespace().next()?.to_lowercase();
            let rejected = STOPWORDS.contains(&first.as_str())
                || role_keyword(&first).is_some()
                || self.terms.iter().any(|term| term.words.first() == Some(&first))
                || vocabulary.lookup(&first).is_some();
            (!rejected).then(|| place.to_string())
        })
    }

    fn scan_skills(&self, tokens: &[Token], vocabulary: &SkillVocabulary) -> SkillScan {
        let mut consumed = vec![false; tokens.len()];
        let mut found = Vec::new();

        let mut terms: Vec<TechTerm> = self
            .terms
            .iter()
            .cloned()
            .chain(
                vocabulary
                    .iter()
                    .filter(|entry| {
                        entry.chars().count() >= 3 || !entry.chars().all(char::is_alphanumeric)
                    })
                    .map(|entry| TechTerm::new(entry, entry)),
            )
            .collect();
        terms.sort_by_key(|term| Reverse(term.words.len()));

        for term in &terms {
            let width = term.words.len();
            if width == 0 || width > tokens.len() {
                continue;
            }
            for start in 0..=tokens.len() - width {
                let span = start..start + width;
                if consumed[span.clone()].iter().any(|taken| *taken) {
                    continue;
                }
                let hit = tokens[span.clone()]
                    .iter()
                    .zip(&term.words)
                    .all(|(token, word)| token.lower == *word);
                if hit {
                    consumed[span].fill(true);
                    found.push((start, term.canonical.clone()));
                }
            }
        }

        for (idx, token) in tokens.iter().enumerate() {
            if consumed[idx]
                || token.lower.chars().count() < 4
                || STOPWORDS.contains(&token.lower.as_str())
                || role_keyword(&token.lower).is_some()
            {
                continue;
            }
            let best = self
                .terms
                .iter()
                .filter(|term| term.words.len() == 1)
                .map(|term| (similarity_ratio(&token.lower, &term.words[0]), term))
                .max_by(|a, b| a.0.total_cmp(&b.0));
            match best {
                Some((ratio, term)) if ratio >= self.token_scan_threshold => {
                    debug!(token = %token.lower, skill = %term.canonical, ratio, "fuzzy technology token");
                    consumed[idx] = true;
                    found.push((idx, term.canonical.clone()));
                }
                _ => {}
            }
        }

        found.sort_by_key(|(position, _)| *position);
        SkillScan { found, consumed }
    }
}

impl QueryInterpreter for RuleBasedInterpreter {
    fn interpret<'a>(
        &'a self,
        query: &'a str,
        vocabulary: &'a SkillVocabulary,
    ) -> InterpretFuture<'a> {
        Box::pin(std::future::ready(self.parse(query, vocabulary)))
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}

fn tokenize(query: &str) -> Vec<Token> {
    query
        .split_whitespace()
        .map(|raw| {
            raw.trim_matches(|ch: char| {
                matches!(ch, ',' | ';' | ':' | '(' | ')' | '!' | '?' | '"' | '\'' | '[' | ']')
            })
            .trim_end_matches('.')
            .to_lowercase()
        })
        .filter(|lower| !lower.is_empty())
        .map(|lower| Token { lower })
        .collect()
}

fn role_keyword(lower: &str) -> Option<&'static str> {
    ROLE_KEYWORDS.iter().find_map(|(keyword, role)| {
        let plural = lower.strip_suffix('s').is_some_and(|stem| stem == *keyword);
        (lower == *keyword || plural).then_some(*role)
    })
}

/// First role keyword plus up to [`ROLE_WINDOW`] plain words in front of it.
fn role_window(tokens: &[Token], consumed: &[bool]) -> Option<String> {
    let (idx, role) = tokens
        .iter()
        .enumerate()
        .find_map(|(idx, token)| role_keyword(&token.lower).map(|role| (idx, role)))?;

    let mut start = idx;
    while start > 0 && idx - start < ROLE_WINDOW {
        let prev = &tokens[start - 1];
        let plain = prev.lower.chars().all(|ch| ch.is_alphabetic() || ch == '-');
        if !plain
            || consumed[start - 1]
            || STOPWORDS.contains(&prev.lower.as_str())
            || role_keyword(&prev.lower).is_some()
        {
            break;
        }
        start -= 1;
    }

    let mut words: Vec<&str> = tokens[start..idx].iter().map(|t| t.lower.as_str()).collect();
    words.push(role);
    Some(words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter() -> RuleBasedInterpreter {
        RuleBasedInterpreter::new(&InterpreterConfig::default(), &FuzzyConfig::default()).unwrap()
    }

    #[test]
    fn test_normalized_scenario_query() {
        let filters = interpreter().parse(
            "python developer with 5 year experience",
            &SkillVocabulary::builtin(),
        );
        assert_eq!(filters.skills(), ["Python"]);
        assert_eq!(filters.role(), Some("developer"));
        assert_eq!(filters.min_experience(), Some(5));
        assert_eq!(filters.location(), None);
    }

    #[test]
    fn test_qualitative_experience_and_location() {
        let filters = interpreter().parse(
            "experienced Python developers in New York",
            &SkillVocabulary::builtin(),
        );
        assert_eq!(filters.skills(), ["Python"]);
        assert_eq!(filters.role(), Some("developer"));
        assert_eq!(filters.min_experience(), Some(3));
        assert_eq!(filters.location(), Some("New York"));
    }

    #[test]
    fn test_number_beats_seniority_word() {
        let rules = interpreter();
        assert_eq!(
            rules.extract_experience("senior java engineer with 10+ years"),
            Some(10)
        );
        assert_eq!(rules.extract_experience("senior java engineer"), Some(5));
        assert_eq!(rules.extract_experience("mid-level designer"), Some(2));
        assert_eq!(rules.extract_experience("entry level analyst"), Some(0));
        assert_eq!(rules.extract_experience("looking for a designer"), None);
    }

    #[test]
    fn test_role_window_keeps_plain_words() {
        let vocab = SkillVocabulary::builtin();
        let rules = interpreter();
        assert_eq!(
            rules.extract_role("senior data analyst near Chicago", &vocab),
            Some("data analyst".to_string())
        );
        assert_eq!(
            rules.extract_role("full stack developer", &vocab),
            Some("full stack developer".to_string())
        );
        assert_eq!(
            rules.extract_role("machine learning engineer", &vocab),
            Some("engineer".to_string())
        );
        assert_eq!(rules.extract_role("python and docker", &vocab), None);
    }

    #[test]
    fn test_multi_word_and_alias_skills() {
        let filters = interpreter().parse(
            "machine learning engineer k8s and react native",
            &SkillVocabulary::builtin(),
        );
        assert_eq!(
            filters.skills(),
            ["Machine Learning", "Kubernetes", "React Native"]
        );
    }

    #[test]
    fn test_fuzzy_token_scan() {
        let filters = interpreter().parse("kubernets admin", &SkillVocabulary::builtin());
        assert_eq!(filters.skills(), ["Kubernetes"]);
        assert_eq!(filters.role(), Some("administrator"));
    }

    #[test]
    fn test_location_rejects_technology_words() {
        let vocab = SkillVocabulary::builtin();
        let filters = interpreter().parse("experience in python", &vocab);
        assert_eq!(filters.location(), None);

        let filters = interpreter().parse("designer from Berlin with 3 years", &vocab);
        assert_eq!(filters.location(), Some("Berlin"));
        assert_eq!(filters.min_experience(), Some(3));
    }

    #[test]
    fn test_empty_query() {
        assert!(interpreter().parse("", &SkillVocabulary::default()).is_empty());
    }

    #[tokio::test]
    async fn test_trait_path_matches_parse() {
        let rules = interpreter();
        let vocab = SkillVocabulary::builtin();
        let via_trait = rules.interpret("rust engineer in Oslo", &vocab).await;
        assert_eq!(via_trait, rules.parse("rust engineer in Oslo", &vocab));
        assert_eq!(via_trait.location(), Some("Oslo"));
    }
}
