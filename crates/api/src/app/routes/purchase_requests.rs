use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::purchasing::PurchaseRequestFilter;
use tradeerp_purchasing::{PurchaseRequestId, RfqItemId};

use super::common::{self, Reply};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_request).get(list_requests))
        .route("/:id", get(get_request))
        .route("/:id/rfq", post(send_rfq))
        .route("/:id/cancel", post(cancel_request))
        .route("/:id/items/:item_id/reply", post(record_reply))
        .route("/:id/items/:item_id/no-response", post(mark_no_response))
        .route("/:id/items/:item_id/select", post(select_vendor))
}

fn ids(id: &str, item_id: &str) -> Result<(PurchaseRequestId, RfqItemId), axum::response::Response> {
    Ok((common::parse_id(id)?, common::parse_id(item_id)?))
}

pub async fn create_request(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreatePurchaseRequestRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    let input = body.into_new(&services.config.default_currency);
    common::created(
        services.purchasing.create_request(input),
        "purchase request created",
    )
}

/// Sends one RFQ per vendor; the response lists the new item ids.
pub async fn send_rfq(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::SendRfqRequest>, JsonRejection>,
) -> Reply {
    let id: PurchaseRequestId = common::parse_id(&id)?;
    let body = common::body(payload)?;
    match services.purchasing.send_rfq(id, body.vendor_ids) {
        Ok(items) => Ok((
            StatusCode::OK,
            Json(json!({
                "id": id.to_string(),
                "message": "rfq sent",
                "rfq_item_ids": items.iter().map(|i| i.to_string()).collect::<Vec<_>>(),
            })),
        )
            .into_response()),
        Err(e) => Err(errors::service_error_to_response(e)),
    }
}

pub async fn record_reply(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, item_id)): Path<(String, String)>,
    payload: Result<Json<dto::RecordReplyRequest>, JsonRejection>,
) -> Reply {
    let (id, item_id) = ids(&id, &item_id)?;
    let body = common::body(payload)?;
    common::done(
        services
            .purchasing
            .record_reply(id, item_id, body.amount, body.lead_time_days),
        "reply recorded",
    )
}

pub async fn mark_no_response(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, item_id)): Path<(String, String)>,
) -> Reply {
    let (id, item_id) = ids(&id, &item_id)?;
    common::done(
        services.purchasing.mark_no_response(id, item_id),
        "rfq item marked as no response",
    )
}

/// Selecting one vendor rejects every other replied vendor.
pub async fn select_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, item_id)): Path<(String, String)>,
) -> Reply {
    let (id, item_id) = ids(&id, &item_id)?;
    common::done(services.purchasing.select_vendor(id, item_id), "vendor selected")
}

pub async fn cancel_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseRequestId = common::parse_id(&id)?;
    common::done(
        services.purchasing.cancel_request(id),
        "purchase request canceled",
    )
}

pub async fn get_request(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: PurchaseRequestId = common::parse_id(&id)?;
    common::view(services.queries.purchase_request(id))
}

pub async fn list_requests(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<PurchaseRequestFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.purchase_requests(&filter, page))
}
