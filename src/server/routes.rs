//! HTTP route handlers for the matching API.

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matching::core::errors::MatchError;
use crate::matching::core::filters::SearchFilters;
use crate::matching::core::ids::{JobId, UserId};
use crate::matching::core::outcome::SearchOutcome;
use crate::matching::core::records::{CandidateRecord, JobRecord};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/search/candidates", post(search_candidates))
        .route("/api/search/jobs", post(search_jobs))
        .route("/api/recommendations/{user_id}", get(recommendations))
        .route("/api/index/jobs/{job_id}", post(index_job).delete(remove_job))
        .route(
            "/api/index/candidates/{user_id}",
            post(index_candidate).delete(remove_candidate),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "hirematch",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Error body returned by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// A [`MatchError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(MatchError);

impl From<MatchError> for ApiError {
    fn from(err: MatchError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MatchError::NotFound { .. } => StatusCode::NOT_FOUND,
            MatchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            MatchError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MatchError::InvalidRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, %status, "request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Search request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query.
    #[serde(default)]
    pub query: String,
    /// Optional explicit filters; ill-typed values are dropped.
    #[serde(default)]
    pub filters: Value,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Recommendation query string.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Indexing acknowledgement.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Record id.
    pub id: i64,
    /// Whether the record is now indexed.
    pub indexed: bool,
}

/// Run a handler body under the request deadline.
async fn with_deadline<T>(
    state: &AppState,
    work: impl Future<Output = Result<T, MatchError>>,
) -> Result<T, ApiError> {
    let deadline = state.request_timeout;
    tokio::time::timeout(deadline, work)
        .await
        .map_err(|_| MatchError::timeout("request", deadline))?
        .map_err(ApiError::from)
}

fn caller_filters(request: &SearchRequest) -> Option<SearchFilters> {
    if request.filters.is_null() {
        None
    } else {
        Some(SearchFilters::from_caller_json(&request.filters))
    }
}

async fn search_candidates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome<CandidateRecord>>, ApiError> {
    let filters = caller_filters(&request);
    let outcome = with_deadline(
        &state,
        state
            .retriever
            .search_candidates(&request.query, filters.as_ref(), request.limit),
    )
    .await?;
    Ok(Json(outcome))
}

async fn search_jobs(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchOutcome<JobRecord>>, ApiError> {
    let filters = caller_filters(&request);
    let outcome = with_deadline(
        &state,
        state
            .retriever
            .search_jobs(&request.query, filters.as_ref(), request.limit),
    )
    .await?;
    Ok(Json(outcome))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
    Query(params): Query<LimitParams>,
) -> Result<Json<SearchOutcome<JobRecord>>, ApiError> {
    let outcome = with_deadline(&state, state.retriever.recommend(user_id, params.limit)).await?;
    Ok(Json(outcome))
}

async fn index_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<IndexResponse>, ApiError> {
    with_deadline(&state, state.indexer.index_job(job_id)).await?;
    Ok(Json(IndexResponse {
        id: job_id.get(),
        indexed: true,
    }))
}

async fn remove_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<IndexResponse>, ApiError> {
    with_deadline(&state, state.indexer.remove_job(job_id)).await?;
    Ok(Json(IndexResponse {
        id: job_id.get(),
        indexed: false,
    }))
}

async fn index_candidate(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<IndexResponse>, ApiError> {
    with_deadline(&state, state.indexer.index_candidate(user_id)).await?;
    Ok(Json(IndexResponse {
        id: user_id.get(),
        indexed: true,
    }))
}

async fn remove_candidate(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<IndexResponse>, ApiError> {
    with_deadline(&state, state.indexer.remove_candidate(user_id)).await?;
    Ok(Json(IndexResponse {
        id: user_id.get(),
        indexed: false,
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::matching::core::config::MatchConfig;
    use crate::matching::embedding::embedder::EmbeddingProvider;
    use crate::matching::interpret::rule_based::RuleBasedInterpreter;
    use crate::matching::retrieval::hybrid_retriever::HybridRetriever;
    use crate::matching::retrieval::hybrid_retriever::fakes::{
        CannedIndex, DownEmbedder, FixedEmbedder,
    };
    use crate::matching::retrieval::indexer::VectorIndexer;
    use crate::matching::storage::job_board_store::JobBoardStore;
    use crate::matching::storage::job_board_store::fixtures::demo_store;
    use crate::matching::storage::vector_index::VectorIndex;

    async fn app(embedder: Arc<dyn EmbeddingProvider>) -> Router {
        let config = MatchConfig::default();
        let store: Arc<dyn JobBoardStore> = Arc::new(demo_store().await);
        let index: Arc<dyn VectorIndex> = Arc::new(CannedIndex::default());
        let interpreter =
            Arc::new(RuleBasedInterpreter::new(&config.interpreter, &config.fuzzy).unwrap());
        let retriever = HybridRetriever::new(
            &config,
            Arc::clone(&store),
            Arc::clone(&index),
            Arc::clone(&embedder),
            interpreter,
        )
        .unwrap();
        let state = Arc::new(AppState {
            retriever,
            indexer: VectorIndexer::new(store, index, embedder),
            request_timeout: Duration::from_secs(5),
        });
        create_router(state)
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_job_search_drops_invalid_filters() {
        let request = post_json(
            "/api/search/jobs",
            &serde_json::json!({
                "query": "pyhton develpr",
                "filters": {"min_experience": "plenty", "location": "Denver"},
                "limit": 5
            }),
        );
        let (status, body) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier_used"], "sql_only");
        assert_eq!(body["total_results"], 1);
        assert_eq!(body["results"][0]["id"], 11);
        assert_eq!(body["filters_applied"]["location"], "Denver");
        assert!(body["filters_applied"]["min_experience"].is_null());
    }

    #[tokio::test]
    async fn test_candidate_search() {
        let request = post_json(
            "/api/search/candidates",
            &serde_json::json!({"query": "rust engineer in Austin"}),
        );
        let (status, body) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["id"], 4);
        assert!(body["results"][0]["match_score"].as_f64().unwrap() > 50.0);
    }

    #[tokio::test]
    async fn test_recommendations_and_unknown_user() {
        let request = Request::builder()
            .uri("/api/recommendations/5?limit=1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tier_used"], "skill_based");
        assert_eq!(body["results"].as_array().unwrap().len(), 1);

        let request = Request::builder()
            .uri("/api/recommendations/404")
            .body(Body::empty())
            .unwrap();
        let (status, _) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_indexing_routes() {
        let request = post_json("/api/index/jobs/10", &Value::Null);
        let (status, body) = call(app(Arc::new(FixedEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexed"], true);

        let request = post_json("/api/index/candidates/2", &Value::Null);
        let (status, _) = call(app(Arc::new(DownEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/index/jobs/10")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(app(Arc::new(FixedEmbedder)).await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indexed"], false);
    }
}
