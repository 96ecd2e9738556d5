use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::invoicing::TaxInvoiceFilter;
use tradeerp_invoicing::TaxInvoiceId;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(draft_invoice).get(list_invoices))
        .route("/:id", get(get_invoice))
        .route("/:id/issue", post(issue_invoice))
        .route("/:id/cancel", post(cancel_invoice))
        .route("/:id/payments", post(record_payment))
}

pub async fn draft_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::DraftInvoiceRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    let input = body.into_new(&services.config.default_currency);
    common::created(services.invoicing.draft_invoice(input), "tax invoice drafted")
}

pub async fn issue_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: TaxInvoiceId = common::parse_id(&id)?;
    common::done(services.invoicing.issue_invoice(id), "tax invoice issued")
}

pub async fn cancel_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: TaxInvoiceId = common::parse_id(&id)?;
    common::done(services.invoicing.cancel_invoice(id), "tax invoice canceled")
}

pub async fn record_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::PaymentRequest>, JsonRejection>,
) -> Reply {
    let id: TaxInvoiceId = common::parse_id(&id)?;
    let body = common::body(payload)?;
    common::created(
        services.invoicing.record_payment(id, body.into()),
        "payment recorded",
    )
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: TaxInvoiceId = common::parse_id(&id)?;
    common::view(services.queries.tax_invoice(id))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<TaxInvoiceFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.tax_invoices(&filter, page))
}
