use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};

use tradeerp_admin::UserId;
use tradeerp_infra::PageRequest;
use tradeerp_infra::queries::admin::UserFilter;

use super::common::{self, Reply};
use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id", get(get_user))
        .route("/:id/role", post(change_role))
        .route("/:id/deactivate", post(deactivate_user))
        .route("/:id/reactivate", post(reactivate_user))
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> Reply {
    let body = common::body(payload)?;
    common::created(services.admin.create_user(body.into()), "user created")
}

pub async fn change_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<dto::ChangeRoleRequest>, JsonRejection>,
) -> Reply {
    let id: UserId = common::parse_id(&id)?;
    let body = common::plain_body(payload)?;
    common::done(services.admin.change_user_role(id, body.role), "role changed")
}

pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: UserId = common::parse_id(&id)?;
    common::done(services.admin.deactivate_user(id), "user deactivated")
}

pub async fn reactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: UserId = common::parse_id(&id)?;
    common::done(services.admin.reactivate_user(id), "user reactivated")
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Reply {
    let id: UserId = common::parse_id(&id)?;
    common::view(services.queries.user(id))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    page: Result<Query<PageRequest>, QueryRejection>,
    filter: Result<Query<UserFilter>, QueryRejection>,
) -> Reply {
    let page = common::query(page)?;
    let filter = common::query(filter)?;
    common::page(services.queries.users(&filter, page))
}
