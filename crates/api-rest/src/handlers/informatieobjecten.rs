//! Handlers for `/api/v1/enkelvoudiginformatieobjecten`.

use crate::dto::{InformatieObjectRes, LockRes, UnlockReq};
use crate::error::ApiResult;
use crate::extract::{parse_json, versie_param, ApiJson, Caller};
use crate::state::AppState;
use api_shared::{Problem, Scope};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use drc_core::model::InformatieObjectInput;
use drc_core::WriteMode;
use std::collections::HashMap;

const OCTET_STREAM: &str = "application/octet-stream";

#[utoipa::path(
    get,
    path = "/api/v1/enkelvoudiginformatieobjecten",
    responses(
        (status = 200, description = "Latest version of every document", body = [InformatieObjectRes]),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 403, description = "Missing scope", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn list_informatieobjecten(
    State(state): State<AppState>,
    caller: Caller,
) -> ApiResult<Json<Vec<InformatieObjectRes>>> {
    caller.require(Scope::Read)?;
    let docs = state
        .documents
        .list()
        .into_iter()
        .map(|doc| InformatieObjectRes::new(&state.cfg, doc))
        .collect();
    Ok(Json(docs))
}

#[utoipa::path(
    post,
    path = "/api/v1/enkelvoudiginformatieobjecten",
    request_body = InformatieObjectInput,
    responses(
        (status = 201, description = "Document created", body = InformatieObjectRes),
        (status = 400, description = "Validation failed", body = Problem),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 403, description = "Missing scope", body = Problem)
    )
)]
/// Registers a document with its first version.
///
/// `inhoud` is base64; `informatieobjecttype` must point to a published type.
#[axum::debug_handler]
pub async fn create_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<InformatieObjectInput>,
) -> ApiResult<(StatusCode, Json<InformatieObjectRes>)> {
    caller.require(Scope::Create)?;
    let doc = state.documents.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(InformatieObjectRes::new(&state.cfg, doc)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}",
    params(
        ("uuid" = String, Path, description = "Document UUID"),
        ("versie" = Option<u32>, Query, description = "Version to read; defaults to the latest")
    ),
    responses(
        (status = 200, description = "Document version", body = InformatieObjectRes),
        (status = 404, description = "Unknown document or version", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn get_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<InformatieObjectRes>> {
    caller.require(Scope::Read)?;
    let doc = state.documents.get(&uuid, versie_param(&query)?)?;
    Ok(Json(InformatieObjectRes::new(&state.cfg, doc)))
}

#[utoipa::path(
    get,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}/download",
    params(
        ("uuid" = String, Path, description = "Document UUID"),
        ("versie" = Option<u32>, Query, description = "Version to download; defaults to the latest")
    ),
    responses(
        (status = 200, description = "Raw document content"),
        (status = 404, description = "Unknown document, version or no content", body = Problem)
    )
)]
/// Returns the decoded content of a document version.
#[axum::debug_handler]
pub async fn download_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Response> {
    caller.require(Scope::Read)?;
    let download = state.documents.download(&uuid, versie_param(&query)?)?;

    let content_type = download
        .media_type
        .as_deref()
        .and_then(|m| HeaderValue::from_str(m).ok())
        .unwrap_or(HeaderValue::from_static(OCTET_STREAM));
    let filename = download.bestandsnaam.as_deref().unwrap_or(&uuid);
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        filename.replace('"', "")
    ))
    .unwrap_or(HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}",
    params(("uuid" = String, Path, description = "Document UUID")),
    request_body = InformatieObjectInput,
    responses(
        (status = 200, description = "New version written", body = InformatieObjectRes),
        (status = 400, description = "Validation, lock or definitive-status failure", body = Problem),
        (status = 404, description = "Unknown document", body = Problem)
    )
)]
/// Full update. Requires the lock token of the checked-out document.
#[axum::debug_handler]
pub async fn update_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    ApiJson(input): ApiJson<InformatieObjectInput>,
) -> ApiResult<Json<InformatieObjectRes>> {
    write(state, caller, uuid, input, WriteMode::Update).await
}

#[utoipa::path(
    patch,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}",
    params(("uuid" = String, Path, description = "Document UUID")),
    request_body = InformatieObjectInput,
    responses(
        (status = 200, description = "New version written", body = InformatieObjectRes),
        (status = 400, description = "Validation, lock or definitive-status failure", body = Problem),
        (status = 404, description = "Unknown document", body = Problem)
    )
)]
/// Partial update. Fields left out keep their stored value.
#[axum::debug_handler]
pub async fn patch_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    ApiJson(input): ApiJson<InformatieObjectInput>,
) -> ApiResult<Json<InformatieObjectRes>> {
    write(state, caller, uuid, input, WriteMode::PartialUpdate).await
}

async fn write(
    state: AppState,
    caller: Caller,
    uuid: String,
    input: InformatieObjectInput,
    mode: WriteMode,
) -> ApiResult<Json<InformatieObjectRes>> {
    caller.require(Scope::Update)?;
    let doc = state
        .documents
        .update(&uuid, input, mode, caller.scopes())
        .await?;
    Ok(Json(InformatieObjectRes::new(&state.cfg, doc)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}",
    params(("uuid" = String, Path, description = "Document UUID")),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 400, description = "Relations still exist", body = Problem),
        (status = 404, description = "Unknown document", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn delete_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Scope::Delete)?;
    state.documents.delete(&uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}/lock",
    params(("uuid" = String, Path, description = "Document UUID")),
    responses(
        (status = 200, description = "Document checked out", body = LockRes),
        (status = 400, description = "Already locked", body = Problem),
        (status = 404, description = "Unknown document", body = Problem)
    )
)]
/// Checks a document out for editing.
#[axum::debug_handler]
pub async fn lock_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<Json<LockRes>> {
    caller.require(Scope::Lock)?;
    let lock = state.documents.lock(&uuid).await?;
    Ok(Json(LockRes { lock }))
}

#[utoipa::path(
    post,
    path = "/api/v1/enkelvoudiginformatieobjecten/{uuid}/unlock",
    params(("uuid" = String, Path, description = "Document UUID")),
    request_body(content = UnlockReq, description = "Lock token; may be omitted with the force-unlock scope"),
    responses(
        (status = 204, description = "Lock released"),
        (status = 400, description = "Token does not match", body = Problem),
        (status = 404, description = "Unknown document", body = Problem)
    )
)]
/// Releases the lock. An empty body is accepted.
#[axum::debug_handler]
pub async fn unlock_informatieobject(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    caller.require(Scope::Lock)?;
    let req: UnlockReq = if body.iter().all(u8::is_ascii_whitespace) {
        UnlockReq::default()
    } else {
        parse_json(&body)?
    };

    state
        .documents
        .unlock(&uuid, req.lock.as_deref(), caller.scopes())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
