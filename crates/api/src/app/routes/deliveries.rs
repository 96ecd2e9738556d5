use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::projects::DeliveryFilter;
use tradeerp_projects::DeliveryId;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(schedule_delivery).get(list_deliveries))
        .route("/:id", get(get_delivery))
        .route("/:id/ship", post(ship_delivery))
        .route("/:id/complete", post(complete_delivery))
        .route("/:id/cancel", post(cancel_delivery))
}

pub async fn schedule_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::ScheduleDeliveryRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    common::created(
        services.projects.schedule_delivery(body.into()),
        "delivery scheduled",
    )
}

pub async fn ship_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: DeliveryId = common::parse_id(&id)?;
    common::done(services.projects.ship_delivery(id), "delivery shipped")
}

/// Completing a delivery also drafts its tax invoice.
pub async fn complete_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: DeliveryId = common::parse_id(&id)?;
    common::done(services.projects.complete_delivery(id), "delivery completed")
}

pub async fn cancel_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: DeliveryId = common::parse_id(&id)?;
    common::done(services.projects.cancel_delivery(id), "delivery canceled")
}

pub async fn get_delivery(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: DeliveryId = common::parse_id(&id)?;
    common::view(services.queries.delivery(id))
}

pub async fn list_deliveries(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<DeliveryFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.deliveries(&filter, page))
}
