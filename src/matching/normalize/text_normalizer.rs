//! Spelling and merged-word cleanup for free-text search queries.
//!
//! The pipeline runs in a fixed order: merged-word rewrites, token dictionary, digit/unit
//! separation, whitespace collapse. No step produces input for an earlier step, so a second
//! pass over normalized text is a no-op.

use std::collections::HashMap;

use regex::Regex;

/// Role-like word stems, including the misspellings the dictionary repairs afterwards.
const ROLE_STEMS: &str = r"developers?|develope?r|develpr|devloper|develper|devlopr|developper|deveolper|dev|engineers?|enginer|engeneer|enginner|programmers?|programer|analysts?|analist|anaylst|architects?|designers?|desinger|managers?|manger|consultants?|administrators?|admin";

/// Technology stems that users glue onto a role word ("pythondeveloper").
const SKILL_STEMS: &str = r"python|pyhton|javascript|typescript|java|react|angular|vue|node|nodejs|rust|golang|go|php|ruby|rails|django|flask|android|ios|flutter|kotlin|swift|frontend|backend|fullstack|web|data|devops|cloud|sql|dotnet|qa|ml|ai|ux|ui";

/// Lowercase misspelling → canonical replacement.
const DICTIONARY: &[(&str, &str)] = &[
    // roles
    ("develpr", "developer"),
    ("devloper", "developer"),
    ("developr", "developer"),
    ("develper", "developer"),
    ("devlopr", "developer"),
    ("develoepr", "developer"),
    ("developper", "developer"),
    ("deveolper", "developer"),
    ("devlopers", "developers"),
    ("enginer", "engineer"),
    ("engeneer", "engineer"),
    ("enginner", "engineer"),
    ("engineeer", "engineer"),
    ("engg", "engineer"),
    ("programer", "programmer"),
    ("analist", "analyst"),
    ("anaylst", "analyst"),
    ("analyts", "analyst"),
    ("manger", "manager"),
    ("manegar", "manager"),
    ("managr", "manager"),
    ("desinger", "designer"),
    ("desginer", "designer"),
    ("designr", "designer"),
    ("architecht", "architect"),
    ("archtect", "architect"),
    ("sientist", "scientist"),
    ("scientst", "scientist"),
    // experience
    ("expreance", "experience"),
    ("experiance", "experience"),
    ("expirience", "experience"),
    ("experince", "experience"),
    ("exprience", "experience"),
    ("expereince", "experience"),
    ("experence", "experience"),
    ("expeirence", "experience"),
    ("experiene", "experience"),
    ("exp", "experience"),
    ("expierienced", "experienced"),
    ("experianced", "experienced"),
    ("yera", "year"),
    ("yeras", "years"),
    ("yaers", "years"),
    ("yeaars", "years"),
    // connectors
    ("wiht", "with"),
    ("whit", "with"),
    ("wtih", "with"),
    ("adn", "and"),
    ("nad", "and"),
    ("fro", "for"),
    // frequent technology slips
    ("pyhton", "python"),
    ("pyton", "python"),
    ("pythn", "python"),
    ("phyton", "python"),
    ("javscript", "javascript"),
    ("javasript", "javascript"),
    ("javascirpt", "javascript"),
    ("typscript", "typescript"),
    ("dokcer", "docker"),
    ("docekr", "docker"),
    ("kubernets", "kubernetes"),
    ("kubernates", "kubernetes"),
    ("djnago", "django"),
    ("nodjs", "node.js"),
];

/// A regex rewrite applied to the whole query.
struct RewriteRule {
    pattern: Regex,
    replacement: &'static str,
}

/// Query text normalizer.
pub struct TextNormalizer {
    rewrites: Vec<RewriteRule>,
    dictionary: HashMap<&'static str, &'static str>,
    unit_rule: Regex,
}

impl TextNormalizer {
    /// Build the normalizer and compile its rewrite rules.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let rewrites = vec![
            // "develprwith" → "develpr with"
            RewriteRule {
                pattern: Regex::new(&format!(r"(?i)({ROLE_STEMS})(with)\b"))?,
                replacement: "$1 $2",
            },
            // "pythondeveloper" → "python developer"
            RewriteRule {
                pattern: Regex::new(&format!(r"(?i)\b({SKILL_STEMS})({ROLE_STEMS})\b"))?,
                replacement: "$1 $2",
            },
            // "yearsexperience" → "years experience"
            RewriteRule {
                pattern: Regex::new(r"(?i)(years?|yrs?)(experience|exp|of)\b")?,
                replacement: "$1 $2",
            },
        ];

        let dictionary = DICTIONARY.iter().copied().collect();

        Ok(Self {
            rewrites,
            dictionary,
            unit_rule: Regex::new(r"(?i)\b(\d+)(\+?)\s*(years|year|yrs|yr)\b")?,
        })
    }

    /// Normalize a raw query. Never fails; unknown words pass through untouched.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.rewrites {
            text = rule
                .pattern
                .replace_all(&text, rule.replacement)
                .into_owned();
        }

        let text = text
            .split_whitespace()
            .map(|token| self.correct_token(token))
            .collect::<Vec<_>>()
            .join(" ");

        self.unit_rule
            .replace_all(&text, "$1$2 $3")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn correct_token(&self, token: &str) -> String {
        let Some((start, end)) = core_span(token) else {
            return token.to_string();
        };
        let core = &token[start..end];
        match self.dictionary.get(core.to_lowercase().as_str()) {
            Some(fixed) => format!("{}{fixed}{}", &token[..start], &token[end..]),
            None => token.to_string(),
        }
    }
}

/// Byte span of the alphanumeric core of a token, without surrounding punctuation.
fn core_span(token: &str) -> Option<(usize, usize)> {
    let start = token.find(char::is_alphanumeric)?;
    let end = token
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_alphanumeric())
        .map(|(idx, ch)| idx + ch.len_utf8())?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new().unwrap()
    }

    #[test]
    fn test_scenario_query() {
        let out = normalizer().normalize("pyhton develprwith 5 year expreance");
        assert_eq!(out, "python developer with 5 year experience");
    }

    #[test]
    fn test_merged_skill_and_role() {
        assert_eq!(
            normalizer().normalize("Senior javadeveloper in Berlin"),
            "Senior java developer in Berlin"
        );
        assert_eq!(
            normalizer().normalize("pythondevelprwith django"),
            "python developer with django"
        );
    }

    #[test]
    fn test_digit_unit_separation() {
        let n = normalizer();
        assert_eq!(n.normalize("5years"), "5 years");
        assert_eq!(n.normalize("3+yrs backend"), "3+ yrs backend");
        assert_eq!(n.normalize("10   years"), "10 years");
        assert_eq!(n.normalize("5yearsexperience"), "5 years experience");
    }

    #[test]
    fn test_punctuation_is_preserved() {
        assert_eq!(
            normalizer().normalize("(pyhton, dokcer)"),
            "(python, docker)"
        );
    }

    #[test]
    fn test_unknown_words_untouched() {
        let n = normalizer();
        assert_eq!(n.normalize("Zyxwv Qrst"), "Zyxwv Qrst");
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
    }

    #[test]
    fn test_idempotent_over_samples() {
        let n = normalizer();
        let samples = [
            "pyhton develprwith 5 year expreance",
            "Senior reactdeveloper 3yrs NYC",
            "data analist wiht 2+years exp",
            "pythondevelprwith",
            "devopsengineer kubernets",
            "5yeras of experiance",
            "ML engineer, 7 yrs",
            "fullstack dev with node.js",
            "  weird   spacing\tand\nnewlines ",
            "forthwith 12yr",
        ];
        for sample in samples {
            let once = n.normalize(sample);
            let twice = n.normalize(&once);
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }
}
