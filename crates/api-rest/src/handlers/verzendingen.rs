//! Handlers for `/api/v1/verzendingen`.

use crate::dto::VerzendingRes;
use crate::error::ApiResult;
use crate::extract::{ApiJson, Caller};
use crate::state::AppState;
use api_shared::{Problem, Scope};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use drc_core::model::VerzendingInput;
use drc_core::WriteMode;

#[utoipa::path(
    get,
    path = "/api/v1/verzendingen",
    responses(
        (status = 200, description = "All Verzendingen", body = [VerzendingRes]),
        (status = 401, description = "Not authenticated", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn list_verzendingen(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<VerzendingRes>>> {
    caller.require(Scope::Read)?;
    let verzendingen = state
        .verzendingen
        .list()
        .into_iter()
        .map(|v| VerzendingRes::new(&state.cfg, v))
        .collect();
    Ok(Json(verzendingen))
}

#[utoipa::path(
    post,
    path = "/api/v1/verzendingen",
    request_body = VerzendingInput,
    responses(
        (status = 201, description = "Verzending created", body = VerzendingRes),
        (status = 400, description = "Validation failed, e.g. `invalid-address`", body = Problem)
    )
)]
/// Creates a Verzending. Exactly one of the six address slots must be populated.
#[axum::debug_handler]
pub async fn create_verzending(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<VerzendingInput>,
) -> ApiResult<(StatusCode, Json<VerzendingRes>)> {
    caller.require(Scope::Create)?;
    let verzending = state.verzendingen.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(VerzendingRes::new(&state.cfg, verzending)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/verzendingen/{uuid}",
    params(("uuid" = String, Path, description = "Verzending UUID")),
    responses(
        (status = 200, description = "Verzending", body = VerzendingRes),
        (status = 404, description = "Unknown Verzending", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn get_verzending(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<Json<VerzendingRes>> {
    caller.require(Scope::Read)?;
    let verzending = state.verzendingen.get(&uuid)?;
    Ok(Json(VerzendingRes::new(&state.cfg, verzending)))
}

#[utoipa::path(
    put,
    path = "/api/v1/verzendingen/{uuid}",
    params(("uuid" = String, Path, description = "Verzending UUID")),
    request_body = VerzendingInput,
    responses(
        (status = 200, description = "Verzending replaced", body = VerzendingRes),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 404, description = "Unknown Verzending", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn update_verzending(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    ApiJson(input): ApiJson<VerzendingInput>,
) -> ApiResult<Json<VerzendingRes>> {
    caller.require(Scope::Update)?;
    let verzending = state
        .verzendingen
        .update(&uuid, input, WriteMode::Update)
        .await?;
    Ok(Json(VerzendingRes::new(&state.cfg, verzending)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/verzendingen/{uuid}",
    params(("uuid" = String, Path, description = "Verzending UUID")),
    request_body = VerzendingInput,
    responses(
        (status = 200, description = "Verzending updated", body = VerzendingRes),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 404, description = "Unknown Verzending", body = Problem)
    )
)]
/// Partial update. An address slot sent as `null` is cleared; slots left out are kept.
#[axum::debug_handler]
pub async fn patch_verzending(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    ApiJson(input): ApiJson<VerzendingInput>,
) -> ApiResult<Json<VerzendingRes>> {
    caller.require(Scope::Update)?;
    let verzending = state
        .verzendingen
        .update(&uuid, input, WriteMode::PartialUpdate)
        .await?;
    Ok(Json(VerzendingRes::new(&state.cfg, verzending)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/verzendingen/{uuid}",
    params(("uuid" = String, Path, description = "Verzending UUID")),
    responses(
        (status = 204, description = "Verzending deleted"),
        (status = 404, description = "Unknown Verzending", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn delete_verzending(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Scope::Delete)?;
    state.verzendingen.delete(&uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
