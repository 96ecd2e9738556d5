use core::fmt::Display;
use core::str::FromStr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use tradeerp_core::{DomainError, DomainResult};
use tradeerp_infra::{Page, ServiceResult};

use crate::app::dto::Validate;
use crate::app::errors;

/// Handlers answer with a response either way; `Err` short-circuits with `?`.
pub type Reply = Result<axum::response::Response, axum::response::Response>;

pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse()
        .map_err(|e: DomainError| errors::domain_error_to_response(&e))
}

/// Decode and shape-check a JSON body.
pub fn body<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    let Json(body) = payload.map_err(errors::json_rejection)?;
    body.validate()?;
    Ok(body)
}

/// Decode a JSON body that has no field rules.
pub fn plain_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload.map(|Json(b)| b).map_err(errors::json_rejection)
}

pub fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, axum::response::Response> {
    params.map(|Query(q)| q).map_err(errors::query_rejection)
}

/// `{id, message}` for a command that went through.
pub fn command<T: Display>(status: StatusCode, result: ServiceResult<T>, message: &str) -> Reply {
    match result {
        Ok(id) => Ok((
            status,
            Json(json!({ "id": id.to_string(), "message": message })),
        )
            .into_response()),
        Err(e) => Err(errors::service_error_to_response(e)),
    }
}

pub fn created<T: Display>(result: ServiceResult<T>, message: &str) -> Reply {
    command(StatusCode::CREATED, result, message)
}

pub fn done<T: Display>(result: ServiceResult<T>, message: &str) -> Reply {
    command(StatusCode::OK, result, message)
}

pub fn view<T: Serialize>(result: DomainResult<T>) -> Reply {
    match result {
        Ok(v) => Ok((StatusCode::OK, Json(v)).into_response()),
        Err(e) => Err(errors::domain_error_to_response(&e)),
    }
}

pub fn page<T: Serialize>(page: Page<T>) -> Reply {
    Ok((StatusCode::OK, Json(page)).into_response())
}
