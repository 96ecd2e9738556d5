use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::purchasing::PurchaseOrderFilter;
use tradeerp_purchasing::PurchaseOrderId;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id/send", post(send_order))
        .route("/:id/confirm", post(confirm_order))
        .route("/:id/receive", post(receive_order))
        .route("/:id/cancel", post(cancel_order))
}

/// Raise a DRAFT order from the request's selected RFQ item.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreatePurchaseOrderRequest>, JsonRejection>,
) -> Reply {
    let body = common::plain_body(payload)?;
    common::created(
        services
            .purchasing
            .create_order(body.purchase_request_id, body.rfq_item_id),
        "purchase order created",
    )
}

pub async fn send_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseOrderId = common::parse_id(&id)?;
    common::done(services.purchasing.send_order(id), "purchase order sent")
}

/// Confirming opens the order's accounts payable.
pub async fn confirm_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseOrderId = common::parse_id(&id)?;
    common::done(services.purchasing.confirm_order(id), "purchase order confirmed")
}

pub async fn receive_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseOrderId = common::parse_id(&id)?;
    common::done(services.purchasing.receive_order(id), "purchase order received")
}

/// The body is optional: `{"reason": "..."}`.
pub async fn cancel_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Option<Json<dto::CancelOrderRequest>>,
) -> Reply {
    let id: PurchaseOrderId = common::parse_id(&id)?;
    let reason = payload.and_then(|Json(body)| body.reason);
    common::done(
        services.purchasing.cancel_order(id, reason),
        "purchase order canceled",
    )
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseOrderId = common::parse_id(&id)?;
    common::view(services.queries.purchase_order(id))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<PurchaseOrderFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.purchase_orders(&filter, page))
}
