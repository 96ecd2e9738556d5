use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::projects::ProjectFilter;
use tradeerp_projects::ProjectId;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route("/:id", get(get_project))
        .route("/:id/complete", post(complete_project))
        .route("/:id/cancel", post(cancel_project))
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateProjectRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    let input = body.into_new(&services.config.default_currency);
    common::created(services.projects.create_project(input), "project created")
}

pub async fn complete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: ProjectId = common::parse_id(&id)?;
    common::done(services.projects.complete_project(id), "project completed")
}

pub async fn cancel_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: ProjectId = common::parse_id(&id)?;
    common::done(services.projects.cancel_project(id), "project canceled")
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: ProjectId = common::parse_id(&id)?;
    common::view(services.queries.project(id))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<ProjectFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.projects(&filter, page))
}
