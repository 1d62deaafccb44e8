//! Relational schema for the job board tables the matching core reads.
//!
//! Timestamps are stored as Unix milliseconds.

use tokio_rusqlite::Connection;

use crate::matching::core::errors::MatchResult;
use crate::matching::interpret::vocabulary::DEFAULT_SKILLS;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('jobseeker', 'recruiter', 'admin')),
    company_name TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS user_profiles (
    user_id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    first_name TEXT,
    last_name TEXT,
    phone TEXT,
    location TEXT,
    bio TEXT,
    resume_url TEXT,
    linkedin_url TEXT,
    portfolio_url TEXT,
    years_experience INTEGER NOT NULL DEFAULT 0,
    address TEXT,
    job_of_choice TEXT
);
CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);
CREATE TABLE IF NOT EXISTS user_skills (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, skill_id)
);
CREATE TABLE IF NOT EXISTS job_postings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    recruiter_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    description TEXT NOT NULL,
    location TEXT,
    employment_type TEXT,
    min_salary REAL,
    max_salary REAL,
    min_experience INTEGER,
    status TEXT NOT NULL DEFAULT 'active',
    posted_date INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS job_skills (
    job_id INTEGER NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    PRIMARY KEY (job_id, skill_id)
);
CREATE TABLE IF NOT EXISTS applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id INTEGER NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
    jobseeker_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'pending',
    applied_at INTEGER NOT NULL,
    UNIQUE (jobseeker_id, job_id)
);
CREATE INDEX IF NOT EXISTS idx_job_postings_status_posted
    ON job_postings (status, posted_date);
CREATE INDEX IF NOT EXISTS idx_users_role_created
    ON users (role, created_at);
";

/// Create the job board tables if missing, optionally seeding the skill vocabulary.
///
/// # Errors
/// Returns an error if any statement fails.
pub async fn init_schema(conn: &Connection, seed_skills: bool) -> MatchResult<()> {
    conn.call(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        if seed_skills {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare("INSERT OR IGNORE INTO skills (name) VALUES (?1)")?;
                for name in DEFAULT_SKILLS {
                    stmt.execute([*name])?;
                }
            }
            tx.commit()?;
        }
        Ok(())
    })
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent_and_seeds_once() {
        let conn = Connection::open_in_memory().await.unwrap();
        init_schema(&conn, true).await.unwrap();
        init_schema(&conn, true).await.unwrap();

        let count: usize = conn
            .call(|conn| {
                let count = conn.query_row("SELECT COUNT(*) FROM skills", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .unwrap();
        assert_eq!(count, DEFAULT_SKILLS.len());
    }

    #[tokio::test]
    async fn test_schema_without_seed() {
        let conn = Connection::open_in_memory().await.unwrap();
        init_schema(&conn, false).await.unwrap();
        let count: i64 = conn
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM skills", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
