//! Hybrid retrieval: vector search intersected with SQL filters, with SQL-only and
//! skill-overlap fallbacks.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::matching::core::config::{MatchConfig, RetrievalConfig};
use crate::matching::core::errors::{MatchError, MatchResult};
use crate::matching::core::filters::SearchFilters;
use crate::matching::core::ids::UserId;
use crate::matching::core::outcome::{
    FallbackReason, RetrievalTier, ScoredResult, SearchOutcome, sort_scored,
};
use crate::matching::core::records::{CandidateRecord, JobRecord, Rankable};
use crate::matching::embedding::embedder::{Embedded, EmbeddingProvider};
use crate::matching::interpret::interpreter::QueryInterpreter;
use crate::matching::interpret::vocabulary::SkillVocabulary;
use crate::matching::normalize::text_normalizer::TextNormalizer;
use crate::matching::scoring::match_scorer::MatchScorer;
use crate::matching::storage::job_board_store::{
    JobBoardStore, OverlapQuery, RecordQuery, StoreFuture,
};
use crate::matching::storage::vector_index::{Collection, VectorFilter, VectorIndex};

/// Which weight profile ranks a record type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringProfile {
    /// Recruiter searching job seekers.
    Candidate,
    /// Job seeker searching postings.
    Job,
}

/// A record type the retriever can search for.
pub trait Searchable: Rankable {
    /// Vector collection holding this record type.
    const COLLECTION: Collection;
    /// Weight profile used to score this record type.
    const PROFILE: ScoringProfile;

    /// Run a filtered relational query for this record type.
    fn fetch(store: &dyn JobBoardStore, query: RecordQuery) -> StoreFuture<'_, MatchResult<Vec<Self>>>;

    /// Metadata constraint applied to vector hits.
    fn vector_filter() -> VectorFilter {
        VectorFilter::new()
    }
}

impl Searchable for CandidateRecord {
    const COLLECTION: Collection = Collection::Candidates;
    const PROFILE: ScoringProfile = ScoringProfile::Candidate;

    fn fetch(store: &dyn JobBoardStore, query: RecordQuery) -> StoreFuture<'_, MatchResult<Vec<Self>>> {
        store.search_candidates(query)
    }
}

impl Searchable for JobRecord {
    const COLLECTION: Collection = Collection::Jobs;
    const PROFILE: ScoringProfile = ScoringProfile::Job;

    fn fetch(store: &dyn JobBoardStore, query: RecordQuery) -> StoreFuture<'_, MatchResult<Vec<Self>>> {
        store.search_jobs(query)
    }

    fn vector_filter() -> VectorFilter {
        VectorFilter::new().eq("status", "active")
    }
}

/// What one tier run needs.
struct SearchPlan {
    text: String,
    filters: SearchFilters,
    exclude: Vec<i64>,
    limit: usize,
}

/// Search and recommendation entry point.
///
/// Holds immutable configuration and shared collaborators only; every call is independent.
pub struct HybridRetriever {
    store: Arc<dyn JobBoardStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    interpreter: Arc<dyn QueryInterpreter>,
    normalizer: TextNormalizer,
    candidate_scorer: MatchScorer,
    job_scorer: MatchScorer,
    retrieval: RetrievalConfig,
}

impl HybridRetriever {
    /// Assemble a retriever from its collaborators.
    ///
    /// # Errors
    /// Returns an error if the normalizer patterns fail to compile.
    pub fn new(
        config: &MatchConfig,
        store: Arc<dyn JobBoardStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        interpreter: Arc<dyn QueryInterpreter>,
    ) -> MatchResult<Self> {
        let normalizer =
            TextNormalizer::new().map_err(|err| MatchError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            store,
            index,
            embedder,
            interpreter,
            normalizer,
            candidate_scorer: MatchScorer::candidate_search(config),
            job_scorer: MatchScorer::job_search(config),
            retrieval: config.retrieval.clone(),
        })
    }

    /// Retrieval limits and deadlines in effect.
    #[must_use]
    pub const fn retrieval_config(&self) -> &RetrievalConfig {
        &self.retrieval
    }

    /// Recruiter search over job seekers.
    ///
    /// # Errors
    /// Returns an error only when the relational store fails on the SQL-only tier.
    pub async fn search_candidates(
        &self,
        query: &str,
        caller_filters: Option<&SearchFilters>,
        limit: Option<usize>,
    ) -> MatchResult<SearchOutcome<CandidateRecord>> {
        self.search::<CandidateRecord>(query, caller_filters, limit).await
    }

    /// Job seeker search over active postings.
    ///
    /// # Errors
    /// Returns an error only when the relational store fails on the SQL-only tier.
    pub async fn search_jobs(
        &self,
        query: &str,
        caller_filters: Option<&SearchFilters>,
        limit: Option<usize>,
    ) -> MatchResult<SearchOutcome<JobRecord>> {
        self.search::<JobRecord>(query, caller_filters, limit).await
    }

    /// Natural-language search for any searchable record type.
    ///
    /// Caller filters override interpreted ones key by key.
    ///
    /// # Errors
    /// Returns an error only when the relational store fails on the SQL-only tier.
    pub async fn search<R: Searchable>(
        &self,
        query: &str,
        caller_filters: Option<&SearchFilters>,
        limit: Option<usize>,
    ) -> MatchResult<SearchOutcome<R>> {
        let started = Instant::now();
        let limit = self.retrieval.clamp_limit(limit);
        let vocabulary = self.load_vocabulary().await;

        let normalized = self.normalizer.normalize(query);
        let derived = self.interpreter.interpret(&normalized, &vocabulary).await;
        let filters = match caller_filters {
            Some(caller) => derived.overridden_by(caller),
            None => derived,
        };
        debug!(
            interpreter = self.interpreter.name(),
            query = %normalized,
            ?filters,
            "interpreted search query"
        );

        let plan = SearchPlan {
            text: normalized,
            filters,
            exclude: Vec::new(),
            limit,
        };

        let (results, tier, fallback_reason) = match self.vector_tier::<R>(&plan).await {
            Ok(results) => (results, RetrievalTier::Vector, None),
            Err(reason) => {
                info!(
                    collection = %R::COLLECTION,
                    ?reason,
                    "leaving vector tier for SQL-only search"
                );
                (self.sql_tier::<R>(&plan).await?, RetrievalTier::SqlOnly, Some(reason))
            }
        };

        Ok(finish(results, tier, fallback_reason, plan.filters, started))
    }

    /// Job recommendations for a seeker, built from their own profile.
    ///
    /// Jobs the seeker already applied to are never returned.
    ///
    /// # Errors
    /// Returns [`MatchError::NotFound`] for an unknown seeker, or a store error when no tier
    /// can run.
    pub async fn recommend(
        &self,
        user_id: UserId,
        limit: Option<usize>,
    ) -> MatchResult<SearchOutcome<JobRecord>> {
        let started = Instant::now();
        let limit = self.retrieval.clamp_limit(limit);
        let deadline = self.retrieval.store_timeout();

        let profile = within("seeker profile", deadline, self.store.seeker_profile(user_id))
            .await?
            .ok_or(MatchError::NotFound {
                kind: "job seeker",
                id: user_id.get(),
            })?;
        let applied = within("applied jobs", deadline, self.store.applied_job_ids(user_id)).await?;

        let mut filters = SearchFilters::new()
            .with_skills(profile.skills.iter().cloned())
            .with_min_experience(profile.years_experience);
        if let Some(location) = &profile.location {
            filters = filters.with_location(location.as_str());
        }

        let plan = SearchPlan {
            text: format!("Jobs for {}", profile.skills.join(", ")),
            filters,
            exclude: applied.iter().map(|id| id.get()).collect(),
            limit,
        };

        let reason = match self.vector_tier::<JobRecord>(&plan).await {
            Ok(results) => {
                return Ok(finish(results, RetrievalTier::Vector, None, plan.filters, started));
            }
            Err(reason) => reason,
        };
        info!(user_id = %user_id, ?reason, "recommendations leaving vector tier");

        let results = self.sql_tier::<JobRecord>(&plan).await?;
        if !results.is_empty() {
            return Ok(finish(results, RetrievalTier::SqlOnly, Some(reason), plan.filters, started));
        }

        info!(user_id = %user_id, "no SQL rows, falling back to skill overlap");
        let results = self.skill_tier(&plan, &profile.skills).await?;
        Ok(finish(
            results,
            RetrievalTier::SkillBased,
            Some(FallbackReason::NoSqlRows),
            plan.filters,
            started,
        ))
    }

    async fn load_vocabulary(&self) -> SkillVocabulary {
        let deadline = self.retrieval.store_timeout();
        match within("skill vocabulary", deadline, self.store.skill_vocabulary()).await {
            Ok(names) if !names.is_empty() => SkillVocabulary::new(names),
            Ok(_) => SkillVocabulary::builtin(),
            Err(err) => {
                warn!(error = %err, "skill vocabulary unavailable, using built-in list");
                SkillVocabulary::builtin()
            }
        }
    }

    const fn scorer(&self, profile: ScoringProfile) -> &MatchScorer {
        match profile {
            ScoringProfile::Candidate => &self.candidate_scorer,
            ScoringProfile::Job => &self.job_scorer,
        }
    }

    fn rank<R: Searchable>(
        &self,
        records: Vec<R>,
        filters: &SearchFilters,
        similarity: &HashMap<i64, f64>,
        limit: usize,
    ) -> Vec<ScoredResult<R>> {
        let scorer = self.scorer(R::PROFILE);
        let mut results: Vec<ScoredResult<R>> = records
            .into_iter()
            .map(|record| ScoredResult {
                match_score: scorer.score(&record, filters),
                similarity_score: similarity.get(&record.record_id()).copied(),
                record,
            })
            .collect();
        sort_scored(&mut results);
        results.truncate(limit);
        results
    }

    /// Tier 1. Any failure comes back as the reason to fall through.
    async fn vector_tier<R: Searchable>(
        &self,
        plan: &SearchPlan,
    ) -> Result<Vec<ScoredResult<R>>, FallbackReason> {
        let embedding = match self.embedder.embed(&plan.text).await {
            Embedded::Vector(vector) => vector,
            Embedded::Unavailable(reason) => {
                return Err(FallbackReason::EmbeddingUnavailable(reason));
            }
        };

        let k = plan
            .limit
            .saturating_mul(self.retrieval.vector_overfetch.max(1))
            .saturating_add(plan.exclude.len());
        let search = self
            .index
            .search(R::COLLECTION, embedding, k, R::vector_filter());
        let hits = within("vector search", self.retrieval.vector_timeout(), search)
            .await
            .map_err(|err| FallbackReason::VectorIndexFailed(err.to_string()))?;

        let similarity: HashMap<i64, f64> = hits
            .iter()
            .filter(|hit| !plan.exclude.contains(&hit.id))
            .map(|hit| (hit.id, hit.similarity()))
            .collect();
        if similarity.is_empty() {
            return Err(FallbackReason::NoVectorHits);
        }
        debug!(collection = %R::COLLECTION, hits = similarity.len(), "vector hits");

        let query = RecordQuery {
            filters: plan.filters.clone(),
            restrict_to: Some(similarity.keys().copied().collect()),
            exclude: plan.exclude.clone(),
            limit: similarity.len(),
        };
        let rows = within(
            "vector intersection",
            self.retrieval.store_timeout(),
            R::fetch(self.store.as_ref(), query),
        )
        .await
        .map_err(|err| FallbackReason::IntersectionFailed(err.to_string()))?;
        if rows.is_empty() {
            return Err(FallbackReason::EmptyIntersection);
        }

        Ok(self.rank(rows, &plan.filters, &similarity, plan.limit))
    }

    /// Tier 2. Store errors here are fatal.
    async fn sql_tier<R: Searchable>(&self, plan: &SearchPlan) -> MatchResult<Vec<ScoredResult<R>>> {
        let query = RecordQuery {
            filters: plan.filters.clone(),
            restrict_to: None,
            exclude: plan.exclude.clone(),
            limit: plan.limit.saturating_mul(self.retrieval.vector_overfetch.max(1)),
        };
        let rows = within(
            "filtered search",
            self.retrieval.store_timeout(),
            R::fetch(self.store.as_ref(), query),
        )
        .await?;
        Ok(self.rank(rows, &plan.filters, &HashMap::new(), plan.limit))
    }

    /// Tier 3: location-constrained overlap first, then unconstrained.
    async fn skill_tier(
        &self,
        plan: &SearchPlan,
        skills: &[String],
    ) -> MatchResult<Vec<ScoredResult<JobRecord>>> {
        let mut attempts = Vec::with_capacity(2);
        if let Some(location) = plan.filters.location() {
            attempts.push(Some(location.to_string()));
        }
        attempts.push(None);

        for location in attempts {
            let constrained = location.is_some();
            let query = OverlapQuery {
                skills: skills.to_vec(),
                location,
                exclude: plan.exclude.clone(),
                limit: plan.limit,
            };
            let hits = within(
                "skill overlap",
                self.retrieval.store_timeout(),
                self.store.jobs_by_skill_overlap(query),
            )
            .await?;
            if hits.is_empty() && constrained {
                info!("no skill-overlap jobs near the seeker, retrying without location");
                continue;
            }

            let mut results: Vec<ScoredResult<JobRecord>> = hits
                .into_iter()
                .map(|hit| ScoredResult {
                    match_score: self
                        .job_scorer
                        .overlap_score(hit.matching_skills, hit.total_required),
                    similarity_score: None,
                    record: hit.job,
                })
                .collect();
            sort_scored(&mut results);
            return Ok(results);
        }
        Ok(Vec::new())
    }
}

/// Run a store call under a deadline.
async fn within<T>(
    operation: &'static str,
    deadline: Duration,
    call: impl Future<Output = MatchResult<T>>,
) -> MatchResult<T> {
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| MatchError::timeout(operation, deadline))?
}

fn finish<R>(
    results: Vec<ScoredResult<R>>,
    tier_used: RetrievalTier,
    fallback_reason: Option<FallbackReason>,
    filters_applied: SearchFilters,
    started: Instant,
) -> SearchOutcome<R> {
    info!(tier = ?tier_used, results = results.len(), "search finished");
    SearchOutcome {
        total_results: results.len(),
        results,
        execution_time: started.elapsed().as_secs_f64(),
        tier_used,
        fallback_reason,
        filters_applied,
    }
}
