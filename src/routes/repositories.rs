//! Repository import and summary endpoints.
//!
//! - POST /api/v1/repositories { name, description, languages }
//!   Imports the upstream repository `name` for the bearer-token actor.
//!   201 with no body on success; error bodies per `AppError`.
//!
//! - GET /api/v1/users/{owner}/repositories/{name}
//!   Entity counts for an imported repository.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};

use crate::error::Result;
use crate::ingest::IngestionEngine;
use crate::models::{RepoData, RepositorySummary};

pub fn routes(engine: IngestionEngine) -> Router {
    Router::new()
        .route("/api/v1/repositories", post(create_repository))
        .route(
            "/api/v1/users/{owner}/repositories/{name}",
            get(repository_summary),
        )
        .with_state(engine)
}

/// Missing or malformed headers yield an empty token, which the validation
/// gate rejects as an `actor` failure.
fn bearer_token(headers: &HeaderMap) -> String {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

async fn create_repository(
    State(engine): State<IngestionEngine>,
    headers: HeaderMap,
    Json(request): Json<RepoData>,
) -> Result<StatusCode> {
    engine
        .create_repository(request, bearer_token(&headers))
        .await?;
    Ok(StatusCode::CREATED)
}

async fn repository_summary(
    State(engine): State<IngestionEngine>,
    Path((owner, name)): Path<(String, String)>,
) -> Result<Json<RepositorySummary>> {
    Ok(Json(engine.repository_summary(owner, name).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MetadataSource;
    use crate::language::LanguageTable;
    use crate::models::{ExtractedCommit, ExtractionResult};
    use crate::store::SqliteStore;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct OneRepo;

    impl MetadataSource for OneRepo {
        fn exists(&self, name: &str) -> Result<bool> {
            Ok(name == "demo")
        }

        fn extract(&self, _name: &str) -> Result<ExtractionResult> {
            Ok(ExtractionResult {
                commits: vec![ExtractedCommit {
                    title: "Initial".to_string(),
                    content: String::new(),
                    hash: "abc".to_string(),
                    author: "alice".to_string(),
                    created_at: chrono::DateTime::from_timestamp(0, 0).unwrap(),
                    branches: Vec::new(),
                }],
                contributors: vec!["alice".to_string()],
                ..Default::default()
            })
        }
    }

    fn engine() -> IngestionEngine {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_user("alice", "tok").unwrap();
        let languages = LanguageTable::load(&store).unwrap();
        IngestionEngine::new(store.into_shared(), Arc::new(OneRepo), Arc::new(languages))
    }

    fn app() -> Router {
        routes(engine())
    }

    fn get_summary(name: &str) -> Request<Body> {
        Request::builder()
            .uri(format!("/api/v1/users/alice/repositories/{}", name))
            .body(Body::empty())
            .unwrap()
    }

    fn post_demo(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/repositories")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
            .body(Body::from(r#"{"name":"demo","description":"d","languages":[]}"#))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), "");
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), "abc");
        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), "");
    }

    #[tokio::test]
    async fn test_create_then_conflict_then_summary() {
        let app = app();

        let response = app.clone().oneshot(post_demo(Some("tok"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.clone().oneshot(post_demo(Some("tok"))).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["kind"], "CONFLICT");

        let response = app.oneshot(get_summary("demo")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["commits"], 1);
        assert_eq!(body["contributors"], 1);
    }

    #[tokio::test]
    async fn test_missing_token_names_actor() {
        let response = app().oneshot(post_demo(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["field"], "actor");
    }

    #[tokio::test]
    async fn test_unknown_summary_is_404() {
        let response = app().oneshot(get_summary("none")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_summary_waits_off_the_runtime_while_store_is_locked() {
        let engine = engine();
        let app = routes(engine.clone());

        // Single-threaded runtime: a handler blocking on the lock here would
        // stall the sleep below forever.
        let guard = engine.store().lock().unwrap();
        let pending = tokio::spawn(app.oneshot(get_summary("none")));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!pending.is_finished());
        drop(guard);

        let response = pending.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
