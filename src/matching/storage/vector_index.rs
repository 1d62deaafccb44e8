//! Vector index over job and candidate embeddings, backed by sqlite-vec.

use std::fmt;

use chrono::Utc;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;

use crate::matching::core::config::StorageConfig;
use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::storage::job_board_store::StoreFuture;
use crate::matching::storage::sqlite_vec_loader::init_sqlite_vec_extension;

/// Largest `k` sqlite-vec accepts in a KNN query.
const KNN_MAX_K: usize = 4096;

/// A vector namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Job posting embeddings, keyed by job id.
    Jobs,
    /// Job seeker embeddings, keyed by user id.
    Candidates,
}

impl Collection {
    /// Both collections.
    pub const ALL: [Self; 2] = [Self::Jobs, Self::Candidates];

    const fn table(self) -> &'static str {
        match self {
            Self::Jobs => "vec_jobs",
            Self::Candidates => "vec_candidates",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jobs => write!(f, "jobs"),
            Self::Candidates => write!(f, "candidates"),
        }
    }
}

/// One nearest-neighbour hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorHit {
    /// Record id in the relational store.
    pub id: i64,
    /// Distance from the query vector (smaller is closer).
    pub distance: f64,
}

impl VectorHit {
    /// Distance converted to a similarity in (0, 1].
    #[must_use]
    pub fn similarity(&self) -> f64 {
        1.0 / (1.0 + self.distance.max(0.0))
    }
}

/// Equality constraints on document metadata fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VectorFilter {
    equals: Vec<(String, String)>,
}

impl VectorFilter {
    /// Create an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `metadata[key] == value`.
    #[must_use]
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.equals.push((key.into(), value.into()));
        self
    }

    /// True when nothing is constrained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equals.is_empty()
    }
}

/// Vector index abstraction consumed by the retriever and indexer.
pub trait VectorIndex: Send + Sync {
    /// Nearest neighbours of `embedding`, closest first, at most `k`.
    ///
    /// # Errors
    /// Returns an error if the index cannot be queried.
    fn search(
        &self,
        collection: Collection,
        embedding: Vec<f32>,
        k: usize,
        filter: VectorFilter,
    ) -> StoreFuture<'_, MatchResult<Vec<VectorHit>>>;
    /// Insert or replace the vector and document for `id`.
    ///
    /// # Errors
    /// Returns an error if the row cannot be written.
    fn upsert(
        &self,
        collection: Collection,
        id: i64,
        embedding: Vec<f32>,
        text: String,
        metadata: serde_json::Value,
    ) -> StoreFuture<'_, MatchResult<()>>;
    /// Remove `id`. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns an error if the row cannot be deleted.
    fn delete(&self, collection: Collection, id: i64) -> StoreFuture<'_, MatchResult<bool>>;
}

/// sqlite-vec implementation: one `vec0` table plus a document table per collection.
pub struct SqliteVecIndex {
    conn: Connection,
    ndims: usize,
}

impl SqliteVecIndex {
    /// Open the configured database and create the vector tables.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or sqlite-vec is not available.
    pub async fn new(config: &StorageConfig, ndims: usize) -> MatchResult<Self> {
        init_sqlite_vec_extension();
        let conn = Connection::open(&config.sqlite_path).await?;
        Self::from_connection(conn, ndims).await
    }

    /// Wrap a connection opened after [`init_sqlite_vec_extension`].
    ///
    /// # Errors
    /// Returns an error if sqlite-vec is not loaded or the tables cannot be created.
    pub async fn from_connection(conn: Connection, ndims: usize) -> MatchResult<Self> {
        if ndims == 0 {
            return Err(MatchError::InvalidConfig(
                "vector index needs at least one dimension".to_string(),
            ));
        }

        let loaded = conn
            .call(|conn| {
                Ok(conn
                    .query_row("SELECT vec_version()", [], |row| row.get::<_, String>(0))
                    .is_ok())
            })
            .await?;
        if !loaded {
            return Err(MatchError::SqliteVecUnavailable);
        }

        conn.call(move |conn| {
            for collection in Collection::ALL {
                let table = collection.table();
                conn.execute_batch(&format!(
                    "CREATE VIRTUAL TABLE IF NOT EXISTS {table} USING vec0(embedding float[{ndims}]);
                     CREATE TABLE IF NOT EXISTS {table}_docs (
                         id INTEGER PRIMARY KEY,
                         text TEXT NOT NULL,
                         metadata TEXT NOT NULL DEFAULT '{{}}',
                         updated_at INTEGER NOT NULL
                     );"
                ))?;
            }
            Ok(())
        })
        .await?;

        Ok(Self { conn, ndims })
    }

    /// Number of indexed documents in `collection`.
    ///
    /// # Errors
    /// Returns an error if the count query fails.
    pub async fn len(&self, collection: Collection) -> MatchResult<usize> {
        let table = collection.table();
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&format!("SELECT COUNT(*) FROM {table}_docs"), [], |row| {
                        row.get(0)
                    })?;
                Ok(count)
            })
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn check_dims(&self, embedding: &[f32]) -> MatchResult<()> {
        if embedding.len() == self.ndims {
            Ok(())
        } else {
            Err(MatchError::InvalidRecord(format!(
                "embedding has {} dimensions, index expects {}",
                embedding.len(),
                self.ndims
            )))
        }
    }
}

impl VectorIndex for SqliteVecIndex {
    fn search(
        &self,
        collection: Collection,
        embedding: Vec<f32>,
        k: usize,
        filter: VectorFilter,
    ) -> StoreFuture<'_, MatchResult<Vec<VectorHit>>> {
        Box::pin(async move {
            self.check_dims(&embedding)?;
            if k == 0 {
                return Ok(Vec::new());
            }

            let table = collection.table();
            let query = serde_json::to_string(&embedding)?;
            let mut conditions = String::new();
            let mut values = Vec::new();
            for (key, value) in filter.equals {
                conditions.push_str(" AND json_extract(metadata, ?) = ?");
                values.push(Value::Text(format!("$.{key}")));
                values.push(Value::Text(value));
            }

            let hits = self
                .conn
                .call(move |conn| {
                    let knn_sql = format!(
                        "SELECT rowid, distance FROM {table}
                         WHERE embedding MATCH ?1 AND k = ?2
                         ORDER BY distance"
                    );
                    let doc_sql =
                        format!("SELECT 1 FROM {table}_docs WHERE id = ?{conditions}");

                    // Metadata constraints apply after the KNN cut, so widen the
                    // neighbourhood until enough rows survive or the table is exhausted.
                    let mut fetch = if values.is_empty() { k } else { k.saturating_mul(4) };
                    fetch = fetch.min(KNN_MAX_K);
                    loop {
                        let mut knn = conn.prepare_cached(&knn_sql)?;
                        let mut neighbours = knn
                            .query_map(
                                rusqlite::params![query, i64::try_from(fetch).unwrap_or(i64::MAX)],
                                |row| {
                                    Ok(VectorHit {
                                        id: row.get(0)?,
                                        distance: row.get(1)?,
                                    })
                                },
                            )?
                            .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                        let exhausted = neighbours.len() < fetch || fetch >= KNN_MAX_K;

                        if !values.is_empty() {
                            let mut doc = conn.prepare_cached(&doc_sql)?;
                            let mut kept = Vec::with_capacity(neighbours.len());
                            for hit in neighbours {
                                let mut params = Vec::with_capacity(values.len() + 1);
                                params.push(Value::Integer(hit.id));
                                params.extend(values.iter().cloned());
                                if doc.exists(params_from_iter(params.iter()))? {
                                    kept.push(hit);
                                }
                            }
                            neighbours = kept;
                        }

                        if neighbours.len() >= k || exhausted {
                            neighbours.sort_by(|a, b| {
                                a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id))
                            });
                            neighbours.truncate(k);
                            return Ok(neighbours);
                        }
                        fetch = fetch.saturating_mul(2).min(KNN_MAX_K);
                    }
                })
                .await?;
            Ok(hits)
        })
    }

    fn upsert(
        &self,
        collection: Collection,
        id: i64,
        embedding: Vec<f32>,
        text: String,
        metadata: serde_json::Value,
    ) -> StoreFuture<'_, MatchResult<()>> {
        Box::pin(async move {
            self.check_dims(&embedding)?;
            let table = collection.table();
            let vector = serde_json::to_string(&embedding)?;
            let metadata = serde_json::to_string(&metadata)?;
            let now = Utc::now().timestamp_millis();

            self.conn
                .call(move |conn| {
                    let tx = conn.transaction()?;
                    tx.execute(&format!("DELETE FROM {table} WHERE rowid = ?1"), [id])?;
                    tx.execute(
                        &format!("INSERT INTO {table} (rowid, embedding) VALUES (?1, ?2)"),
                        rusqlite::params![id, vector],
                    )?;
                    tx.execute(
                        &format!(
                            "INSERT INTO {table}_docs (id, text, metadata, updated_at)
                             VALUES (?1, ?2, ?3, ?4)
                             ON CONFLICT(id) DO UPDATE SET
                                 text = excluded.text,
                                 metadata = excluded.metadata,
                                 updated_at = excluded.updated_at"
                        ),
                        rusqlite::params![id, text, metadata, now],
                    )?;
                    tx.commit()?;
                    Ok(())
                })
                .await?;
            Ok(())
        })
    }

    fn delete(&self, collection: Collection, id: i64) -> StoreFuture<'_, MatchResult<bool>> {
        Box::pin(async move {
            let table = collection.table();
            let removed = self
                .conn
                .call(move |conn| {
                    let tx = conn.transaction()?;
                    let vectors = tx.execute(&format!("DELETE FROM {table} WHERE rowid = ?1"), [id])?;
                    let docs =
                        tx.execute(&format!("DELETE FROM {table}_docs WHERE id = ?1"), [id])?;
                    tx.commit()?;
                    Ok(vectors + docs > 0)
                })
                .await?;
            Ok(removed)
        })
    }
}
