use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::sales::QuotationFilter;
use tradeerp_sales::QuotationId;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_quotation).get(list_quotations))
        .route("/:id", get(get_quotation))
        .route("/:id/lines", post(add_line))
        .route("/:id/send", post(send_quotation))
        .route("/:id/accept", post(accept_quotation))
        .route("/:id/reject", post(reject_quotation))
}

pub async fn create_quotation(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateQuotationRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    common::created(services.sales.create_quotation(body.into()), "quotation created")
}

pub async fn add_line(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::QuotationLineRequest>, JsonRejection>,
) -> Reply {
    let id: QuotationId = common::parse_id(&id)?;
    let body = common::body(payload)?;
    common::done(services.sales.add_line(id, body.into()), "line added")
}

pub async fn send_quotation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: QuotationId = common::parse_id(&id)?;
    common::done(services.sales.send_quotation(id), "quotation sent")
}

/// Accepting awards the project contract in the same write.
pub async fn accept_quotation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: QuotationId = common::parse_id(&id)?;
    common::done(services.sales.accept_quotation(id), "quotation accepted")
}

pub async fn reject_quotation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: QuotationId = common::parse_id(&id)?;
    common::done(services.sales.reject_quotation(id), "quotation rejected")
}

pub async fn get_quotation(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: QuotationId = common::parse_id(&id)?;
    common::view(services.queries.quotation(id))
}

pub async fn list_quotations(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<QuotationFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.quotations(&filter, page))
}
