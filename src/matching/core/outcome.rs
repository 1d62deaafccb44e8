//! Scored results and search outcomes.

use std::cmp::Ordering;

use serde::Serialize;

use crate::matching::core::filters::SearchFilters;
use crate::matching::core::records::Rankable;

/// Fallback tier that produced a result set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalTier {
    /// Vector hits intersected with SQL filters.
    Vector,
    /// SQL filters only.
    SqlOnly,
    /// Skill-overlap join (recommendations).
    SkillBased,
}

/// Why the retriever left the vector tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// The embedding provider reported it is unavailable.
    EmbeddingUnavailable(String),
    /// The vector index call failed or timed out.
    VectorIndexFailed(String),
    /// The vector index returned no hits.
    NoVectorHits,
    /// Vector hits did not survive the SQL filters.
    EmptyIntersection,
    /// The SQL intersection query failed.
    IntersectionFailed(String),
    /// The SQL-only tier returned nothing (skill overlap follows).
    NoSqlRows,
}

/// A record with its compatibility score.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredResult<R> {
    /// The ranked record.
    #[serde(flatten)]
    pub record: R,
    /// Compatibility score in `[0, 100]`.
    pub match_score: f64,
    /// Vector similarity in `(0, 1]`, when the vector tier produced the record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

/// Result of one search or recommendation call.
#[derive(Clone, Debug, Serialize)]
pub struct SearchOutcome<R> {
    /// Results ordered by `match_score` desc, then recency desc.
    pub results: Vec<ScoredResult<R>>,
    /// Number of results returned.
    pub total_results: usize,
    /// Wall time in seconds.
    pub execution_time: f64,
    /// Tier that produced `results`.
    pub tier_used: RetrievalTier,
    /// Why the vector tier was abandoned, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Effective filters after interpretation and caller overrides.
    pub filters_applied: SearchFilters,
}

/// Sort by score desc, then recency desc, then id asc for a total order.
pub fn sort_scored<R: Rankable>(results: &mut [ScoredResult<R>]) {
    results.sort_by(|a, b| {
        b.match_score
            .total_cmp(&a.match_score)
            .then_with(|| b.record.recency().cmp(&a.record.recency()))
            .then_with(|| compare_ids(&a.record, &b.record))
    });
}

fn compare_ids<R: Rankable>(a: &R, b: &R) -> Ordering {
    a.record_id().cmp(&b.record_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::core::records::fixtures::job;

    #[test]
    fn test_sort_breaks_ties_by_recency() {
        let mut results = vec![
            ScoredResult {
                record: job(1, "Old", &[]),
                match_score: 80.0,
                similarity_score: None,
            },
            ScoredResult {
                record: job(2, "New", &[]),
                match_score: 80.0,
                similarity_score: None,
            },
            ScoredResult {
                record: job(3, "Best", &[]),
                match_score: 95.0,
                similarity_score: None,
            },
        ];
        sort_scored(&mut results);
        let ids: Vec<i64> = results.iter().map(|r| r.record.record_id()).collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn test_tier_serializes_snake_case() {
        let json = serde_json::to_string(&RetrievalTier::SqlOnly).unwrap();
        assert_eq!(json, "\"sql_only\"");
    }
}
