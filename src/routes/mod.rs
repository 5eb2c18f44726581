//! API route handlers.
//!
//! - `repositories`: repository import (POST /api/v1/repositories) and the
//!   per-repository summary (GET /api/v1/users/{owner}/repositories/{name})

pub mod repositories;

use axum::Router;

use crate::ingest::IngestionEngine;

pub fn create_router(engine: IngestionEngine) -> Router {
    Router::new().merge(repositories::routes(engine))
}
