//! Read access to candidates, job postings and skills.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Value;
use rusqlite::{OptionalExtension, Row, params_from_iter};
use tokio_rusqlite::Connection;

use crate::matching::core::config::StorageConfig;
use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::core::filters::SearchFilters;
use crate::matching::core::ids::{JobId, UserId};
use crate::matching::core::records::{CandidateRecord, JobRecord, SeekerProfile, split_skills};
use crate::matching::storage::schema::init_schema;

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A filtered record query.
///
/// `filters` become hard SQL constraints for skills, location, keywords, employment type and
/// salary. Role and experience are left to the scorer.
#[derive(Clone, Debug, Default)]
pub struct RecordQuery {
    /// Filters to apply.
    pub filters: SearchFilters,
    /// Only return these ids (vector intersection).
    pub restrict_to: Option<Vec<i64>>,
    /// Never return these ids.
    pub exclude: Vec<i64>,
    /// Row limit.
    pub limit: usize,
}

/// A skill-overlap query for the last recommendation tier.
#[derive(Clone, Debug, Default)]
pub struct OverlapQuery {
    /// Seeker skills to overlap with job requirements.
    pub skills: Vec<String>,
    /// Optional location constraint.
    pub location: Option<String>,
    /// Jobs to leave out.
    pub exclude: Vec<i64>,
    /// Row limit.
    pub limit: usize,
}

/// A job with its overlap count.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlapHit {
    /// Matching job.
    pub job: JobRecord,
    /// Number of seeker skills the job requires.
    pub matching_skills: usize,
    /// Number of skills the job requires.
    pub total_required: usize,
}

/// Relational store abstraction consumed by the retriever and indexer.
pub trait JobBoardStore: Send + Sync {
    /// Load every known skill name.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn skill_vocabulary(&self) -> StoreFuture<'_, MatchResult<Vec<String>>>;
    /// Search job seekers, newest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn search_candidates(
        &self,
        query: RecordQuery,
    ) -> StoreFuture<'_, MatchResult<Vec<CandidateRecord>>>;
    /// Search active job postings, newest first.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn search_jobs(&self, query: RecordQuery) -> StoreFuture<'_, MatchResult<Vec<JobRecord>>>;
    /// Load a job seeker's own profile.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn seeker_profile(
        &self,
        user_id: UserId,
    ) -> StoreFuture<'_, MatchResult<Option<SeekerProfile>>>;
    /// Ids of jobs the user already applied to.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn applied_job_ids(&self, user_id: UserId) -> StoreFuture<'_, MatchResult<Vec<JobId>>>;
    /// Active jobs sharing at least one skill, by overlap count then recency.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn jobs_by_skill_overlap(
        &self,
        query: OverlapQuery,
    ) -> StoreFuture<'_, MatchResult<Vec<OverlapHit>>>;
    /// Load one job posting.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn job_by_id(&self, id: JobId) -> StoreFuture<'_, MatchResult<Option<JobRecord>>>;
    /// Load one job seeker.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn candidate_by_id(&self, id: UserId)
    -> StoreFuture<'_, MatchResult<Option<CandidateRecord>>>;
}

const CANDIDATE_SELECT: &str = "SELECT u.id, u.email, p.first_name, p.last_name, p.location,
        p.address, p.bio, COALESCE(p.years_experience, 0), p.resume_url, p.linkedin_url,
        p.portfolio_url, p.job_of_choice,
        (SELECT GROUP_CONCAT(s.name, ',' ORDER BY s.name)
            FROM user_skills us JOIN skills s ON s.id = us.skill_id WHERE us.user_id = u.id),
        u.created_at
    FROM users u LEFT JOIN user_profiles p ON p.user_id = u.id";

const JOB_COLUMNS: &str = "j.id AS id, j.recruiter_id AS recruiter_id, j.title AS title,
        j.company AS company, j.description AS description, j.location AS location,
        j.employment_type AS employment_type, j.min_salary AS min_salary,
        j.max_salary AS max_salary, j.min_experience AS min_experience,
        (SELECT GROUP_CONCAT(s.name, ',' ORDER BY s.name)
            FROM job_skills js JOIN skills s ON s.id = js.skill_id WHERE js.job_id = j.id)
            AS required_skills,
        j.status AS status, j.posted_date AS posted_date, u.email AS recruiter_email";

const JOB_FROM: &str = "FROM job_postings j LEFT JOIN users u ON u.id = j.recruiter_id";

/// `SQLite` implementation of the job board store.
pub struct SqliteJobBoardStore {
    conn: Connection,
}

impl SqliteJobBoardStore {
    /// Open the database at the configured path and ensure the schema exists.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn new(config: &StorageConfig) -> MatchResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::from_connection(conn, config.seed_skills).await
    }

    /// Wrap an open connection and ensure the schema exists.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub async fn from_connection(conn: Connection, seed_skills: bool) -> MatchResult<Self> {
        init_schema(&conn, seed_skills).await?;
        Ok(Self { conn })
    }

    async fn load_candidates(&self, sql: String, params: Vec<Value>) -> MatchResult<Vec<CandidateRecord>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(params.iter()), candidate_from_row)?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }

    async fn load_jobs(&self, sql: String, params: Vec<Value>) -> MatchResult<Vec<JobRecord>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params_from_iter(params.iter()), job_from_row)?
                    .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}

impl JobBoardStore for SqliteJobBoardStore {
    fn skill_vocabulary(&self) -> StoreFuture<'_, MatchResult<Vec<String>>> {
        Box::pin(async move {
            let names = self
                .conn
                .call(|conn| {
                    let mut stmt = conn.prepare("SELECT name FROM skills ORDER BY name")?;
                    let names = stmt
                        .query_map([], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(names)
                })
                .await?;
            Ok(names)
        })
    }

    fn search_candidates(
        &self,
        query: RecordQuery,
    ) -> StoreFuture<'_, MatchResult<Vec<CandidateRecord>>> {
        Box::pin(async move {
            let mut sql = SqlFilter::new("u.role = 'jobseeker'");
            let filters = &query.filters;

            if let Some(location) = filters.location() {
                sql.any_like(&["p.location", "p.address"], &[location.to_string()]);
            }
            if !filters.skills().is_empty() {
                sql.exists_skill(
                    "SELECT 1 FROM user_skills us JOIN skills s ON s.id = us.skill_id
                     WHERE us.user_id = u.id",
                    filters.skills(),
                );
            }
            if !filters.keywords().is_empty() {
                sql.any_like(
                    &["p.bio", "p.first_name", "p.last_name", "p.job_of_choice"],
                    filters.keywords(),
                );
            }
            sql.ids("u.id", query.restrict_to.as_deref(), &query.exclude);

            let (where_sql, mut params) = sql.finish();
            params.push(limit_param(query.limit)?);
            let statement = format!(
                "{CANDIDATE_SELECT} WHERE {where_sql} ORDER BY u.created_at DESC, u.id ASC LIMIT ?"
            );
            self.load_candidates(statement, params).await
        })
    }

    fn search_jobs(&self, query: RecordQuery) -> StoreFuture<'_, MatchResult<Vec<JobRecord>>> {
        Box::pin(async move {
            let mut sql = SqlFilter::new("j.status = 'active'");
            let filters = &query.filters;

            if let Some(location) = filters.location() {
                sql.any_like(&["j.location"], &[location.to_string()]);
            }
            if let Some(employment_type) = filters.employment_type() {
                sql.push(
                    "j.employment_type = ? COLLATE NOCASE",
                    [Value::Text(employment_type.to_string())],
                );
            }
            if let Some(min_salary) = filters.min_salary() {
                sql.push(
                    "(j.max_salary >= ? OR j.min_salary >= ?)",
                    [Value::Real(min_salary), Value::Real(min_salary)],
                );
            }
            if let Some(max_salary) = filters.max_salary() {
                sql.push(
                    "(j.min_salary <= ? OR j.max_salary <= ?)",
                    [Value::Real(max_salary), Value::Real(max_salary)],
                );
            }
            if !filters.skills().is_empty() {
                sql.skills_or_text(
                    "SELECT 1 FROM job_skills js JOIN skills s ON s.id = js.skill_id
                     WHERE js.job_id = j.id",
                    &["j.title", "j.description"],
                    filters.skills(),
                );
            }
            if !filters.keywords().is_empty() {
                sql.any_like(&["j.title", "j.description", "j.company"], filters.keywords());
            }
            sql.ids("j.id", query.restrict_to.as_deref(), &query.exclude);

            let (where_sql, mut params) = sql.finish();
            params.push(limit_param(query.limit)?);
            let statement = format!(
                "SELECT {JOB_COLUMNS} {JOB_FROM} WHERE {where_sql}
                 ORDER BY j.posted_date DESC, j.id ASC LIMIT ?"
            );
            self.load_jobs(statement, params).await
        })
    }

    fn seeker_profile(
        &self,
        user_id: UserId,
    ) -> StoreFuture<'_, MatchResult<Option<SeekerProfile>>> {
        Box::pin(async move {
            let profile = self
                .conn
                .call(move |conn| {
                    let row = conn
                        .query_row(
                            "SELECT p.location, COALESCE(p.years_experience, 0), p.job_of_choice
                             FROM users u LEFT JOIN user_profiles p ON p.user_id = u.id
                             WHERE u.id = ?1 AND u.role = 'jobseeker'",
                            [user_id],
                            |row| {
                                Ok((
                                    row.get::<_, Option<String>>(0)?,
                                    row.get::<_, i64>(1)?,
                                    row.get::<_, Option<String>>(2)?,
                                ))
                            },
                        )
                        .optional()?;
                    let Some((location, years_experience, job_of_choice)) = row else {
                        return Ok(None);
                    };

                    let mut stmt = conn.prepare(
                        "SELECT s.name FROM user_skills us JOIN skills s ON s.id = us.skill_id
                         WHERE us.user_id = ?1 ORDER BY s.name",
                    )?;
                    let skills = stmt
                        .query_map([user_id], |row| row.get::<_, String>(0))?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

                    Ok(Some(SeekerProfile {
                        user_id,
                        skills,
                        location,
                        years_experience,
                        job_of_choice,
                    }))
                })
                .await?;
            Ok(profile)
        })
    }

    fn applied_job_ids(&self, user_id: UserId) -> StoreFuture<'_, MatchResult<Vec<JobId>>> {
        Box::pin(async move {
            let ids = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(
                        "SELECT job_id FROM applications WHERE jobseeker_id = ?1 ORDER BY job_id",
                    )?;
                    let ids = stmt
                        .query_map([user_id], |row| row.get::<_, JobId>(0))?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(ids)
                })
                .await?;
            Ok(ids)
        })
    }

    fn jobs_by_skill_overlap(
        &self,
        query: OverlapQuery,
    ) -> StoreFuture<'_, MatchResult<Vec<OverlapHit>>> {
        Box::pin(async move {
            let wanted: Vec<String> = query
                .skills
                .iter()
                .map(|skill| skill.trim().to_lowercase())
                .filter(|skill| !skill.is_empty())
                .collect();
            if wanted.is_empty() {
                return Ok(Vec::new());
            }

            let mut params: Vec<Value> = wanted.into_iter().map(Value::Text).collect();
            let values = vec!["(?)"; params.len()].join(", ");

            let mut sql = SqlFilter::new("j.status = 'active'");
            if let Some(location) = &query.location {
                sql.any_like(&["j.location"], std::slice::from_ref(location));
            }
            sql.ids("j.id", None, &query.exclude);
            let (where_sql, filter_params) = sql.finish();
            params.extend(filter_params);
            params.push(limit_param(query.limit)?);

            let statement = format!(
                "WITH wanted(name) AS (VALUES {values})
                 SELECT * FROM (
                     SELECT {JOB_COLUMNS},
                         (SELECT COUNT(*) FROM job_skills js JOIN skills s ON s.id = js.skill_id
                          WHERE js.job_id = j.id
                            AND LOWER(s.name) IN (SELECT name FROM wanted)) AS matching,
                         (SELECT COUNT(*) FROM job_skills js WHERE js.job_id = j.id) AS total
                     {JOB_FROM}
                     WHERE {where_sql}
                 )
                 WHERE matching > 0
                 ORDER BY matching DESC, posted_date DESC, id ASC
                 LIMIT ?"
            );

            let hits = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&statement)?;
                    let hits = stmt
                        .query_map(params_from_iter(params.iter()), |row| {
                            Ok(OverlapHit {
                                job: job_from_row(row)?,
                                matching_skills: row.get(14)?,
                                total_required: row.get(15)?,
                            })
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(hits)
                })
                .await?;
            Ok(hits)
        })
    }

    fn job_by_id(&self, id: JobId) -> StoreFuture<'_, MatchResult<Option<JobRecord>>> {
        Box::pin(async move {
            let job = self
                .conn
                .call(move |conn| {
                    let job = conn
                        .query_row(
                            &format!("SELECT {JOB_COLUMNS} {JOB_FROM} WHERE j.id = ?1"),
                            [id],
                            job_from_row,
                        )
                        .optional()?;
                    Ok(job)
                })
                .await?;
            Ok(job)
        })
    }

    fn candidate_by_id(
        &self,
        id: UserId,
    ) -> StoreFuture<'_, MatchResult<Option<CandidateRecord>>> {
        Box::pin(async move {
            let candidate = self
                .conn
                .call(move |conn| {
                    let candidate = conn
                        .query_row(
                            &format!("{CANDIDATE_SELECT} WHERE u.id = ?1 AND u.role = 'jobseeker'"),
                            [id],
                            candidate_from_row,
                        )
                        .optional()?;
                    Ok(candidate)
                })
                .await?;
            Ok(candidate)
        })
    }
}

/// Accumulates `AND`-joined clauses and their positional parameters.
struct SqlFilter {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl SqlFilter {
    fn new(base: &str) -> Self {
        Self {
            clauses: vec![base.to_string()],
            params: Vec::new(),
        }
    }

    fn push(&mut self, clause: impl Into<String>, params: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.params.extend(params);
    }

    /// `(c1 LIKE t1 OR c2 LIKE t1 OR c1 LIKE t2 ...)`
    fn any_like(&mut self, columns: &[&str], terms: &[String]) {
        let mut parts = Vec::new();
        for term in terms {
            for column in columns {
                parts.push(format!("{column} LIKE ? ESCAPE '\\'"));
                self.params.push(Value::Text(like_pattern(term)));
            }
        }
        if !parts.is_empty() {
            self.clauses.push(format!("({})", parts.join(" OR ")));
        }
    }

    fn skill_match(&mut self, terms: &[String]) -> String {
        let parts: Vec<String> = terms
            .iter()
            .map(|term| {
                if is_short_skill(term) {
                    self.params.push(Value::Text(term.trim().to_string()));
                    "s.name = ? COLLATE NOCASE".to_string()
                } else {
                    self.params.push(Value::Text(like_pattern(term)));
                    "s.name LIKE ? ESCAPE '\\'".to_string()
                }
            })
            .collect();
        parts.join(" OR ")
    }

    /// `EXISTS (<subquery> AND (s.name LIKE ...))`
    fn exists_skill(&mut self, subquery: &str, skills: &[String]) {
        let matcher = self.skill_match(skills);
        self.clauses
            .push(format!("EXISTS ({subquery} AND ({matcher}))"));
    }

    /// Required skill match, or the skill named in free-text columns.
    fn skills_or_text(&mut self, subquery: &str, columns: &[&str], skills: &[String]) {
        let matcher = self.skill_match(skills);
        let mut parts = vec![format!("EXISTS ({subquery} AND ({matcher}))")];
        for skill in skills.iter().filter(|skill| !is_short_skill(skill)) {
            for column in columns {
                parts.push(format!("{column} LIKE ? ESCAPE '\\'"));
                self.params.push(Value::Text(like_pattern(skill)));
            }
        }
        self.clauses.push(format!("({})", parts.join(" OR ")));
    }

    fn ids(&mut self, column: &str, restrict_to: Option<&[i64]>, exclude: &[i64]) {
        if let Some(ids) = restrict_to {
            if ids.is_empty() {
                self.clauses.push("0".to_string());
            } else {
                self.push(
                    format!("{column} IN ({})", placeholders(ids.len())),
                    ids.iter().copied().map(Value::Integer),
                );
            }
        }
        if !exclude.is_empty() {
            self.push(
                format!("{column} NOT IN ({})", placeholders(exclude.len())),
                exclude.iter().copied().map(Value::Integer),
            );
        }
    }

    fn finish(self) -> (String, Vec<Value>) {
        (self.clauses.join(" AND "), self.params)
    }
}

/// Names like "R" or "Go" only match exactly.
fn is_short_skill(term: &str) -> bool {
    term.trim().chars().count() <= 2
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn limit_param(limit: usize) -> MatchResult<Value> {
    i64::try_from(limit)
        .map(Value::Integer)
        .map_err(|_| MatchError::InvalidConfig("limit exceeds i64".to_string()))
}

fn timestamp(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<CandidateRecord> {
    Ok(CandidateRecord {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        location: row.get(4)?,
        address: row.get(5)?,
        bio: row.get(6)?,
        years_experience: row.get(7)?,
        resume_url: row.get(8)?,
        linkedin_url: row.get(9)?,
        portfolio_url: row.get(10)?,
        job_of_choice: row.get(11)?,
        skills: row.get(12)?,
        created_at: timestamp(13, row.get(13)?)?,
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<JobRecord> {
    let required: Option<String> = row.get(10)?;
    Ok(JobRecord {
        id: row.get(0)?,
        recruiter_id: row.get(1)?,
        title: row.get(2)?,
        company: row.get(3)?,
        description: row.get(4)?,
        location: row.get(5)?,
        employment_type: row.get(6)?,
        min_salary: row.get(7)?,
        max_salary: row.get(8)?,
        min_experience: row.get(9)?,
        required_skills: split_skills(required.as_deref()),
        status: row.get(11)?,
        posted_date: timestamp(12, row.get(12)?)?,
        recruiter_email: row.get(13)?,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Base timestamp for fixture rows; later ids are newer.
    pub(crate) const T0: i64 = 1_700_000_000_000;

    pub(crate) struct Seeker<'a> {
        pub id: i64,
        pub first_name: &'a str,
        pub location: Option<&'a str>,
        pub years: i64,
        pub job_of_choice: Option<&'a str>,
        pub skills: &'a [&'a str],
    }

    pub(crate) struct Posting<'a> {
        pub id: i64,
        pub title: &'a str,
        pub location: Option<&'a str>,
        pub min_experience: Option<i64>,
        pub status: &'a str,
        pub skills: &'a [&'a str],
    }

    pub(crate) async fn empty_store() -> SqliteJobBoardStore {
        let conn = Connection::open_in_memory().await.unwrap();
        let store = SqliteJobBoardStore::from_connection(conn, true).await.unwrap();
        store
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, email, role, company_name, created_at)
                     VALUES (1, 'recruiter@acme.test', 'recruiter', 'Acme', ?1)",
                    [T0],
                )?;
                Ok(())
            })
            .await
            .unwrap();
        store
    }

    pub(crate) async fn add_seeker(store: &SqliteJobBoardStore, seeker: Seeker<'_>) {
        let id = seeker.id;
        let first_name = seeker.first_name.to_string();
        let location = seeker.location.map(str::to_string);
        let years = seeker.years;
        let job_of_choice = seeker.job_of_choice.map(str::to_string);
        let skills: Vec<String> = seeker.skills.iter().map(|s| (*s).to_string()).collect();
        store
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, email, role, created_at)
                     VALUES (?1, ?2, 'jobseeker', ?3)",
                    rusqlite::params![id, format!("{}@seekers.test", first_name.to_lowercase()), T0 + id],
                )?;
                conn.execute(
                    "INSERT INTO user_profiles
                     (user_id, first_name, location, years_experience, job_of_choice, bio)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    rusqlite::params![
                        id,
                        first_name,
                        location,
                        years,
                        job_of_choice,
                        format!("{first_name} builds things")
                    ],
                )?;
                for skill in skills {
                    conn.execute("INSERT OR IGNORE INTO skills (name) VALUES (?1)", [&skill])?;
                    conn.execute(
                        "INSERT INTO user_skills (user_id, skill_id)
                         SELECT ?1, id FROM skills WHERE name = ?2",
                        rusqlite::params![id, skill],
                    )?;
                }
                Ok(())
            })
            .await
            .unwrap();
    }

    pub(crate) async fn add_posting(store: &SqliteJobBoardStore, posting: Posting<'_>) {
        let id = posting.id;
        let title = posting.title.to_string();
        let location = posting.location.map(str::to_string);
        let min_experience = posting.min_experience;
        let status = posting.status.to_string();
        let skills: Vec<String> = posting.skills.iter().map(|s| (*s).to_string()).collect();
        store
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO job_postings
                     (id, recruiter_id, title, company, description, location, employment_type,
                      min_salary, max_salary, min_experience, status, posted_date)
                     VALUES (?1, 1, ?2, 'Acme', ?3, ?4, 'full-time', 50000, 90000, ?5, ?6, ?7)",
                    rusqlite::params![
                        id,
                        title,
                        format!("We are hiring a {title}"),
                        location,
                        min_experience,
                        status,
                        T0 + id
                    ],
                )?;
                for skill in skills {
                    conn.execute("INSERT OR IGNORE INTO skills (name) VALUES (?1)", [&skill])?;
                    conn.execute(
                        "INSERT INTO job_skills (job_id, skill_id)
                         SELECT ?1, id FROM skills WHERE name = ?2",
                        rusqlite::params![id, skill],
                    )?;
                }
                Ok(())
            })
            .await
            .unwrap();
    }

    pub(crate) async fn apply(store: &SqliteJobBoardStore, seeker_id: i64, job_id: i64) {
        store
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO applications (job_id, jobseeker_id, applied_at) VALUES (?1, ?2, ?3)",
                    rusqlite::params![job_id, seeker_id, T0],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    /// Recruiter 1, seekers 2..=5, postings 10..=13 (13 is closed), seeker 2 applied to 10.
    pub(crate) async fn demo_store() -> SqliteJobBoardStore {
        let store = empty_store().await;
        for seeker in [
            Seeker {
                id: 2,
                first_name: "Ada",
                location: Some("Boston"),
                years: 6,
                job_of_choice: Some("Backend Developer"),
                skills: &["Python", "AWS", "Docker"],
            },
            Seeker {
                id: 3,
                first_name: "Grace",
                location: Some("New York"),
                years: 2,
                job_of_choice: Some("Java Developer"),
                skills: &["Java"],
            },
            Seeker {
                id: 4,
                first_name: "Linus",
                location: Some("Austin"),
                years: 10,
                job_of_choice: Some("Systems Engineer"),
                skills: &["Rust", "Linux"],
            },
            Seeker {
                id: 5,
                first_name: "Ken",
                location: Some("New York"),
                years: 1,
                job_of_choice: None,
                skills: &["Python", "AWS"],
            },
        ] {
            add_seeker(&store, seeker).await;
        }
        for posting in [
            Posting {
                id: 10,
                title: "Python Developer",
                location: Some("Boston"),
                min_experience: Some(3),
                status: "active",
                skills: &["Python", "Django"],
            },
            Posting {
                id: 11,
                title: "Cloud Engineer",
                location: Some("Denver"),
                min_experience: Some(5),
                status: "active",
                skills: &["Python", "Docker", "AWS"],
            },
            Posting {
                id: 12,
                title: "Frontend Developer",
                location: Some("Remote"),
                min_experience: None,
                status: "active",
                skills: &["JavaScript", "React"],
            },
            Posting {
                id: 13,
                title: "Data Analyst",
                location: Some("Boston"),
                min_experience: Some(1),
                status: "closed",
                skills: &["SQL", "Python"],
            },
        ] {
            add_posting(&store, posting).await;
        }
        apply(&store, 2, 10).await;
        store
    }
}
