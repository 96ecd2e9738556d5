use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::QueryRejection,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::{self, AppServices};

const DEFAULT_LIMIT: usize = 50;

pub fn router() -> Router {
    Router::new()
        .route("/", get(recent_activity))
        .route("/stream", get(stream_activity))
}

/// GET /activity?limit=50, newest first.
pub async fn recent_activity(
    Extension(services): Extension<Arc<AppServices>>,
    params: Result<Query<dto::ActivityQuery>, QueryRejection>,
) -> Reply {
    let params = common::query(params)?;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let items = services.activity.recent(limit);
    Ok((StatusCode::OK, Json(json!({ "items": items }))).into_response())
}

/// GET /activity/stream: committed events as server-sent events.
pub async fn stream_activity(
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    services::activity_sse_stream(services)
}
