//! Read-only record projections from the relational store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matching::core::ids::{JobId, UserId};

/// How a record relates to a years-of-experience filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Experience {
    /// The record offers this many years (a candidate); the filter is the requirement.
    Offered(i64),
    /// The record requires this many years (a job); the filter is what the seeker offers.
    Required(Option<i64>),
}

/// Behaviour shared by every record the scorer can rank.
pub trait Rankable: Clone + Send + Sync + 'static {
    /// Stable numeric identity, used for exclusion and vector intersection.
    fn record_id(&self) -> i64;
    /// Skill names attached to the record.
    fn skill_names(&self) -> Vec<String>;
    /// Role the record is about (job title or job of choice).
    fn role(&self) -> Option<&str>;
    /// Primary location.
    fn location(&self) -> Option<&str>;
    /// Secondary address text.
    fn address(&self) -> Option<&str>;
    /// Experience relation for the experience factor.
    fn experience(&self) -> Experience;
    /// Number of populated profile fields counted by the completeness factor.
    fn populated_fields(&self) -> usize;
    /// Timestamp used to break score ties (newer first).
    fn recency(&self) -> DateTime<Utc>;
}

/// Job seeker projection used in recruiter searches.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CandidateRecord {
    /// User id.
    pub id: UserId,
    /// Account email.
    pub email: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Profile location.
    pub location: Option<String>,
    /// Street address.
    pub address: Option<String>,
    /// Free-text bio.
    pub bio: Option<String>,
    /// Years of professional experience.
    pub years_experience: i64,
    /// Resume link.
    pub resume_url: Option<String>,
    /// `LinkedIn` profile link.
    pub linkedin_url: Option<String>,
    /// Portfolio link.
    pub portfolio_url: Option<String>,
    /// Desired role.
    pub job_of_choice: Option<String>,
    /// Comma-joined skill names.
    pub skills: Option<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl CandidateRecord {
    /// Text used to embed this candidate in the vector index.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        join_present(&[
            self.job_of_choice.as_deref(),
            self.skills.as_deref().map(|s| s.replace(',', " ")).as_deref(),
            self.bio.as_deref(),
            self.location.as_deref(),
        ])
    }
}

impl Rankable for CandidateRecord {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn skill_names(&self) -> Vec<String> {
        split_skills(self.skills.as_deref())
    }

    fn role(&self) -> Option<&str> {
        self.job_of_choice.as_deref()
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn experience(&self) -> Experience {
        Experience::Offered(self.years_experience)
    }

    fn populated_fields(&self) -> usize {
        let link = present(self.resume_url.as_deref())
            || present(self.linkedin_url.as_deref())
            || present(self.portfolio_url.as_deref());
        [
            present(self.bio.as_deref()),
            present(self.skills.as_deref()),
            link,
            present(self.job_of_choice.as_deref()),
            present(self.address.as_deref()),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    fn recency(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Job posting projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobRecord {
    /// Job id.
    pub id: JobId,
    /// Owning recruiter.
    pub recruiter_id: UserId,
    /// Posting title.
    pub title: String,
    /// Hiring company.
    pub company: String,
    /// Free-text description.
    pub description: String,
    /// Job location.
    pub location: Option<String>,
    /// Employment type (full-time, part-time, contract, internship).
    pub employment_type: Option<String>,
    /// Lower salary bound.
    pub min_salary: Option<f64>,
    /// Upper salary bound.
    pub max_salary: Option<f64>,
    /// Years of experience the posting asks for.
    pub min_experience: Option<i64>,
    /// Required skill names.
    pub required_skills: Vec<String>,
    /// Posting status.
    pub status: String,
    /// Posting time.
    pub posted_date: DateTime<Utc>,
    /// Recruiter contact email.
    pub recruiter_email: Option<String>,
}

impl JobRecord {
    /// Text used to embed this job in the vector index.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        join_present(&[
            Some(self.title.as_str()),
            Some(self.description.as_str()),
            Some(self.company.as_str()),
            self.location.as_deref(),
        ])
    }
}

impl Rankable for JobRecord {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn skill_names(&self) -> Vec<String> {
        self.required_skills.clone()
    }

    fn role(&self) -> Option<&str> {
        Some(self.title.as_str())
    }

    fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn address(&self) -> Option<&str> {
        Some(self.company.as_str())
    }

    fn experience(&self) -> Experience {
        Experience::Required(self.min_experience)
    }

    fn populated_fields(&self) -> usize {
        [
            present(Some(self.description.as_str())),
            !self.required_skills.is_empty(),
            self.min_salary.is_some() || self.max_salary.is_some(),
            present(Some(self.title.as_str())),
            present(self.location.as_deref()),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    fn recency(&self) -> DateTime<Utc> {
        self.posted_date
    }
}

/// A job seeker's own profile, used to build recommendations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeekerProfile {
    /// User id.
    pub user_id: UserId,
    /// Skill names.
    pub skills: Vec<String>,
    /// Preferred location.
    pub location: Option<String>,
    /// Years of experience.
    pub years_experience: i64,
    /// Desired role.
    pub job_of_choice: Option<String>,
}

/// Split a comma-joined skill column.
#[must_use]
pub fn split_skills(joined: Option<&str>) -> Vec<String> {
    joined
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn join_present(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub(crate) fn candidate(id: i64) -> CandidateRecord {
        CandidateRecord {
            id: UserId::new(id),
            email: format!("user{id}@example.com"),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            location: None,
            address: None,
            bio: None,
            years_experience: 0,
            resume_url: None,
            linkedin_url: None,
            portfolio_url: None,
            job_of_choice: None,
            skills: None,
            created_at: Utc.timestamp_millis_opt(1_700_000_000_000 + id).unwrap(),
        }
    }

    pub(crate) fn job(id: i64, title: &str, skills: &[&str]) -> JobRecord {
        JobRecord {
            id: JobId::new(id),
            recruiter_id: UserId::new(1),
            title: title.to_string(),
            company: "Acme".to_string(),
            description: format!("{title} role"),
            location: None,
            employment_type: Some("full-time".to_string()),
            min_salary: None,
            max_salary: None,
            min_experience: None,
            required_skills: skills.iter().map(|s| (*s).to_string()).collect(),
            status: "active".to_string(),
            posted_date: Utc.timestamp_millis_opt(1_700_000_000_000 + id).unwrap(),
            recruiter_email: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{candidate, job};
    use super::*;

    #[test]
    fn test_split_skills_trims_and_drops_empty() {
        assert_eq!(
            split_skills(Some("Python, AWS,,Docker ")),
            ["Python", "AWS", "Docker"]
        );
        assert!(split_skills(None).is_empty());
    }

    #[test]
    fn test_candidate_populated_fields() {
        let mut record = candidate(1);
        assert_eq!(record.populated_fields(), 0);
        record.bio = Some("Backend engineer".to_string());
        record.skills = Some("Rust".to_string());
        record.linkedin_url = Some("https://linkedin.com/in/x".to_string());
        record.job_of_choice = Some("Engineer".to_string());
        record.address = Some("  ".to_string());
        assert_eq!(record.populated_fields(), 4);
    }

    #[test]
    fn test_job_experience_is_required_side() {
        let mut record = job(1, "Data Engineer", &["Python"]);
        record.min_experience = Some(3);
        assert_eq!(record.experience(), Experience::Required(Some(3)));
        assert_eq!(record.role(), Some("Data Engineer"));
    }

    #[test]
    fn test_embedding_text_skips_missing_parts() {
        let mut record = candidate(2);
        record.skills = Some("Python,AWS".to_string());
        record.location = Some("Denver".to_string());
        assert_eq!(record.embedding_text(), "Python AWS Denver");
    }
}
