//! Known skill names used for fuzzy correction.

use std::collections::HashSet;

use crate::matching::interpret::fuzzy;

/// Skill names seeded into a fresh store and used when the store vocabulary cannot be read.
pub const DEFAULT_SKILLS: &[&str] = &[
    // languages
    "Python", "JavaScript", "Java", "C++", "C#", "Go", "Rust", "Swift", "Kotlin", "PHP", "Ruby",
    "TypeScript", "Scala", "R", "MATLAB", "Perl", "Dart", "Haskell", "Elixir",
    // web
    "HTML", "CSS", "React", "Vue.js", "Angular", "Node.js", "Express.js", "Django", "Flask",
    "Spring Boot", "ASP.NET", "Laravel", "Rails", "Next.js", "Svelte", "jQuery", "Bootstrap",
    "Tailwind CSS", "FastAPI",
    // data stores
    "SQL", "MySQL", "PostgreSQL", "MongoDB", "Redis", "SQLite", "Oracle", "SQL Server",
    "Cassandra", "Elasticsearch", "DynamoDB", "Firebase",
    // cloud and operations
    "AWS", "Azure", "Google Cloud Platform", "Docker", "Kubernetes", "Jenkins", "CI/CD",
    "Terraform", "Ansible", "Git", "GitHub", "GitLab", "Linux", "Bash Scripting", "Nginx",
    // mobile
    "iOS Development", "Android Development", "React Native", "Flutter", "SwiftUI",
    // data and machine learning
    "Machine Learning", "Deep Learning", "Data Analysis", "Data Science", "TensorFlow",
    "PyTorch", "Scikit-learn", "Pandas", "NumPy", "Natural Language Processing",
    "Computer Vision", "Big Data", "Hadoop", "Spark", "Tableau", "Power BI", "Excel",
    // services
    "REST API", "GraphQL", "Microservices", "gRPC", "WebSocket",
    // testing
    "Unit Testing", "Integration Testing", "Jest", "Pytest", "Selenium", "Cypress", "JUnit",
    "QA Testing", "Automated Testing",
    // design
    "UI/UX Design", "Figma", "Adobe XD", "Sketch", "Prototyping", "User Research",
    // process
    "Agile", "Scrum", "Kanban", "JIRA", "Project Management",
    // soft skills
    "Communication", "Leadership", "Teamwork", "Problem Solving", "Time Management",
    // business
    "Digital Marketing", "SEO", "Content Marketing", "Google Analytics", "Business Analysis",
    "Salesforce",
    // other
    "Blockchain", "Solidity", "Cybersecurity", "Network Security", "System Design",
    "Technical Writing", "Serverless",
];

/// Read-only set of canonical skill names, loaded at the start of a call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SkillVocabulary {
    names: Vec<String>,
}

impl SkillVocabulary {
    /// Build a vocabulary, dropping blanks and case-insensitive duplicates.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty() && seen.insert(name.to_lowercase()))
            .collect();
        Self { names }
    }

    /// Vocabulary built from [`DEFAULT_SKILLS`].
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(DEFAULT_SKILLS.iter().copied())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the vocabulary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over canonical names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Canonical spelling of `name` if it is in the vocabulary (ignoring case).
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        let folded = name.trim().to_lowercase();
        self.iter().find(|entry| entry.to_lowercase() == folded)
    }

    /// Correct `name` against this vocabulary; see [`fuzzy::correct`].
    #[must_use]
    pub fn correct(&self, name: &str, threshold: f64) -> String {
        fuzzy::correct(name, self.iter(), threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_dedupes_and_trims() {
        let vocab = SkillVocabulary::new(["Python", " python ", "", "AWS"]);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), ["Python", "AWS"]);
    }

    #[test]
    fn test_builtin_has_no_duplicates() {
        assert_eq!(SkillVocabulary::builtin().len(), DEFAULT_SKILLS.len());
    }

    #[test]
    fn test_lookup_and_correct() {
        let vocab = SkillVocabulary::builtin();
        assert_eq!(vocab.lookup("kubernetes"), Some("Kubernetes"));
        assert_eq!(vocab.correct("pyhton", 0.6), "Python");
        assert_eq!(vocab.correct("Quasarix", 0.6), "Quasarix");
    }
}
