use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_admin::CompanyId;
use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::admin::CompanyFilter;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_company).get(list_companies))
        .route("/:id", get(get_company))
        .route("/:id/update", post(update_company))
        .route("/:id/deactivate", post(deactivate_company))
        .route("/:id/reactivate", post(reactivate_company))
}

pub async fn register_company(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RegisterCompanyRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    common::created(
        services.admin.register_company(body.into()),
        "company registered",
    )
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateCompanyRequest>, JsonRejection>,
) -> Reply {
    let id: CompanyId = common::parse_id(&id)?;
    let body = common::body(payload)?;
    common::done(
        services.admin.update_company(id, body.name, body.contact),
        "company updated",
    )
}

pub async fn deactivate_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: CompanyId = common::parse_id(&id)?;
    common::done(services.admin.deactivate_company(id), "company deactivated")
}

pub async fn reactivate_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: CompanyId = common::parse_id(&id)?;
    common::done(services.admin.reactivate_company(id), "company reactivated")
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: CompanyId = common::parse_id(&id)?;
    common::view(services.queries.company(id))
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<CompanyFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.companies(&filter, page))
}
