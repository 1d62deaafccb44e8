//! Structured search filters.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Structured filters produced by query interpretation and consumed by retrieval and scoring.
///
/// Built once through the `with_*` methods and then only read. Skill and keyword lists are
/// sets: duplicates are dropped case-insensitively, first spelling wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SearchFilters {
    skills: Vec<String>,
    location: Option<String>,
    min_experience: Option<i64>,
    role: Option<String>,
    keywords: Vec<String>,
    employment_type: Option<String>,
    min_salary: Option<f64>,
    max_salary: Option<f64>,
}

impl SearchFilters {
    /// Create an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the skill list.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = dedupe_case_insensitive(skills.into_iter().map(Into::into));
        self
    }

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }

    /// Set the minimum years of experience.
    #[must_use]
    pub fn with_min_experience(mut self, years: i64) -> Self {
        self.min_experience = Some(years.max(0));
        self
    }

    /// Set the role / job of choice.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = non_empty(role.into());
        self
    }

    /// Set free-text keywords.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = dedupe_case_insensitive(keywords.into_iter().map(Into::into));
        self
    }

    /// Set the employment type (job search only).
    #[must_use]
    pub fn with_employment_type(mut self, employment_type: impl Into<String>) -> Self {
        self.employment_type = non_empty(employment_type.into());
        self
    }

    /// Set the salary bounds (job search only).
    #[must_use]
    pub const fn with_salary_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_salary = min;
        self.max_salary = max;
        self
    }

    /// Skill names.
    #[must_use]
    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Minimum years of experience, if any.
    #[must_use]
    pub const fn min_experience(&self) -> Option<i64> {
        self.min_experience
    }

    /// Role, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Free-text keywords.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Employment type, if any.
    #[must_use]
    pub fn employment_type(&self) -> Option<&str> {
        self.employment_type.as_deref()
    }

    /// Minimum salary, if any.
    #[must_use]
    pub const fn min_salary(&self) -> Option<f64> {
        self.min_salary
    }

    /// Maximum salary, if any.
    #[must_use]
    pub const fn max_salary(&self) -> Option<f64> {
        self.max_salary
    }

    /// True when no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
            && self.location.is_none()
            && self.min_experience.is_none()
            && self.role.is_none()
            && self.keywords.is_empty()
            && self.employment_type.is_none()
            && self.min_salary.is_none()
            && self.max_salary.is_none()
    }

    /// Apply caller-supplied filters on top of derived ones.
    ///
    /// Every key the caller sets replaces the derived value; keys the caller leaves unset keep
    /// the derived value.
    #[must_use]
    pub fn overridden_by(mut self, caller: &Self) -> Self {
        if !caller.skills.is_empty() {
            self.skills.clone_from(&caller.skills);
        }
        if caller.location.is_some() {
            self.location.clone_from(&caller.location);
        }
        if caller.min_experience.is_some() {
            self.min_experience = caller.min_experience;
        }
        if caller.role.is_some() {
            self.role.clone_from(&caller.role);
        }
        if !caller.keywords.is_empty() {
            self.keywords.clone_from(&caller.keywords);
        }
        if caller.employment_type.is_some() {
            self.employment_type.clone_from(&caller.employment_type);
        }
        if caller.min_salary.is_some() {
            self.min_salary = caller.min_salary;
        }
        if caller.max_salary.is_some() {
            self.max_salary = caller.max_salary;
        }
        self
    }

    /// Replace the skill list, keeping every other key.
    #[must_use]
    pub(crate) fn replace_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = dedupe_case_insensitive(skills.into_iter());
        self
    }

    /// Parse a loosely typed caller filter object.
    ///
    /// Values of the wrong type are dropped one by one; the remaining filters still apply.
    #[must_use]
    pub fn from_caller_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                debug!("ignoring caller filters that are not an object");
            }
            return Self::new();
        };

        let mut filters = Self::new();
        for (key, raw) in map {
            match key.as_str() {
                "skills" => match string_list(raw) {
                    Some(list) => filters = filters.with_skills(list),
                    None => drop_filter(key, raw),
                },
                "keywords" => match string_list(raw) {
                    Some(list) => filters = filters.with_keywords(list),
                    None => drop_filter(key, raw),
                },
                "location" => match raw.as_str() {
                    Some(text) => filters = filters.with_location(text),
                    None => drop_filter(key, raw),
                },
                "role" | "job_of_choice" => match raw.as_str() {
                    Some(text) => filters = filters.with_role(text),
                    None => drop_filter(key, raw),
                },
                "employment_type" => match raw.as_str() {
                    Some(text) => filters = filters.with_employment_type(text),
                    None => drop_filter(key, raw),
                },
                "min_experience" => match whole_years(raw) {
                    Some(years) => filters = filters.with_min_experience(years),
                    None => drop_filter(key, raw),
                },
                "min_salary" => match number(raw) {
                    Some(amount) => filters.min_salary = Some(amount),
                    None => drop_filter(key, raw),
                },
                "max_salary" => match number(raw) {
                    Some(amount) => filters.max_salary = Some(amount),
                    None => drop_filter(key, raw),
                },
                _ => debug!(filter = %key, "ignoring unknown caller filter"),
            }
        }
        filters
    }
}

fn drop_filter(key: &str, raw: &Value) {
    debug!(filter = %key, value = %raw, "dropping caller filter with invalid value");
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn dedupe_case_insensitive(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_string());
        }
    }
    out
}

fn string_list(raw: &Value) -> Option<Vec<String>> {
    match raw {
        Value::String(text) => Some(text.split(',').map(str::to_string).collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

/// Accept integers, integral floats, and numeric strings.
pub(crate) fn whole_years(raw: &Value) -> Option<i64> {
    let years = match raw {
        Value::Number(num) => num.as_i64().or_else(|| {
            num.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f < 100.0)
                .map(|f| {
                    #[allow(clippy::cast_possible_truncation)]
                    let years = f as i64;
                    years
                })
        }),
        Value::String(text) => text.trim().trim_end_matches('+').trim().parse::<i64>().ok(),
        _ => None,
    };
    years.filter(|years| *years >= 0)
}

fn number(raw: &Value) -> Option<f64> {
    let amount = match raw {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|amount| amount.is_finite() && *amount >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_by_default() {
        assert!(SearchFilters::new().is_empty());
        assert!(SearchFilters::new().with_location("   ").is_empty());
    }

    #[test]
    fn test_skills_are_deduplicated() {
        let filters = SearchFilters::new().with_skills(["Python", "python", " AWS ", ""]);
        assert_eq!(filters.skills(), ["Python", "AWS"]);
    }

    #[test]
    fn test_caller_overrides_matching_keys_only() {
        let derived = SearchFilters::new()
            .with_skills(["Python"])
            .with_location("Boston")
            .with_min_experience(3);
        let caller = SearchFilters::new().with_location("New York");

        let merged = derived.overridden_by(&caller);
        assert_eq!(merged.location(), Some("New York"));
        assert_eq!(merged.skills(), ["Python"]);
        assert_eq!(merged.min_experience(), Some(3));
    }

    #[test]
    fn test_caller_json_drops_invalid_experience() {
        let filters = SearchFilters::from_caller_json(&json!({
            "location": "Austin",
            "min_experience": "lots",
            "skills": ["Rust", "Go"]
        }));
        assert_eq!(filters.location(), Some("Austin"));
        assert_eq!(filters.min_experience(), None);
        assert_eq!(filters.skills(), ["Rust", "Go"]);
    }

    #[test]
    fn test_caller_json_accepts_numeric_strings() {
        let filters = SearchFilters::from_caller_json(&json!({
            "min_experience": "4",
            "min_salary": "50000",
            "job_of_choice": "Data Analyst",
            "skills": "SQL, Tableau"
        }));
        assert_eq!(filters.min_experience(), Some(4));
        assert_eq!(filters.min_salary(), Some(50_000.0));
        assert_eq!(filters.role(), Some("Data Analyst"));
        assert_eq!(filters.skills(), ["SQL", "Tableau"]);
    }

    #[test]
    fn test_caller_json_non_object_is_empty() {
        assert!(SearchFilters::from_caller_json(&json!(["python"])).is_empty());
        assert!(SearchFilters::from_caller_json(&Value::Null).is_empty());
    }

    #[test]
    fn test_whole_years_rejects_fractions() {
        assert_eq!(whole_years(&json!(5.0)), Some(5));
        assert_eq!(whole_years(&json!(2.5)), None);
        assert_eq!(whole_years(&json!("5+")), Some(5));
        assert_eq!(whole_years(&json!(-1)), None);
    }
}
