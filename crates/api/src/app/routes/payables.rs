use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_accounting::AccountsPayableId;
use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::payables::PayableFilter;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

/// Payables are opened by PO confirmation; there is no create endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/", get(list_payables))
        .route("/:id", get(get_payable))
        .route("/:id/payments", post(record_payment))
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::PaymentRequest>, JsonRejection>,
) -> Reply {
    let id: AccountsPayableId = common::parse_id(&id)?;
    let body = common::body(payload)?;
    common::created(
        services.payables.record_payment(id, body.into()),
        "vendor payment recorded",
    )
}

pub async fn get_payable(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: AccountsPayableId = common::parse_id(&id)?;
    common::view(services.queries.payable(id))
}

pub async fn list_payables(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<PayableFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.payables(&filter, page))
}
