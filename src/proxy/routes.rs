use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::error::ProxyError;
use super::upstream::{HeadlineParams, UpstreamClient};

#[derive(Debug, Clone)]
pub struct ProxyState {
    upstream: Arc<UpstreamClient>,
}

impl ProxyState {
    pub fn new(upstream: UpstreamClient) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}

/// `/health` and `/api/news/top-headlines`, with permissive CORS and
/// request tracing.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/news/top-headlines", get(top_headlines))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "NewsHub backend is running" }))
}

async fn top_headlines(
    State(state): State<ProxyState>,
    params: Result<Query<HeadlineParams>, QueryRejection>,
) -> Result<Response, ProxyError> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "Rejected headline query");
        ProxyError::InvalidQuery(e.body_text())
    })?;
    match state.upstream.top_headlines(&params).await {
        Ok(body) => Ok(([(CONTENT_TYPE, "application/json")], body).into_response()),
        Err(e) => {
            if matches!(e, ProxyError::Server(_)) {
                tracing::error!(error = %e, "News fetch error");
            }
            Err(e)
        }
    }
}
