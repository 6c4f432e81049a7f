//! Handlers for `/api/v1/objectinformatieobjecten`.

use crate::dto::RelationRes;
use crate::error::ApiResult;
use crate::extract::{ApiJson, Caller};
use crate::state::AppState;
use api_shared::{Problem, Scope};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use drc_core::model::{RelationFilter, RelationInput};
use std::collections::HashMap;

#[utoipa::path(
    get,
    path = "/api/v1/objectinformatieobjecten",
    params(
        ("object" = Option<String>, Query, description = "URL of the related zaak or besluit"),
        ("informatieobject" = Option<String>, Query, description = "URL of the document")
    ),
    responses(
        (status = 200, description = "Matching relations", body = [RelationRes]),
        (status = 400, description = "Unknown or invalid query parameter", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn list_relations(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<RelationRes>>> {
    caller.require(Scope::Read)?;
    let filter = RelationFilter::from_query(&query)?;
    let relations = state
        .relations
        .list(&filter)
        .into_iter()
        .map(|r| RelationRes::new(&state.cfg, r))
        .collect();
    Ok(Json(relations))
}

#[utoipa::path(
    post,
    path = "/api/v1/objectinformatieobjecten",
    request_body = RelationInput,
    responses(
        (status = 201, description = "Relation created", body = RelationRes),
        (status = 400, description = "Validation failed", body = Problem)
    )
)]
/// Relates a document to a zaak or besluit. The remote registry is notified afterwards.
#[axum::debug_handler]
pub async fn create_relation(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(input): ApiJson<RelationInput>,
) -> ApiResult<(StatusCode, Json<RelationRes>)> {
    caller.require(Scope::Create)?;
    let relation = state.relations.create(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(RelationRes::new(&state.cfg, relation)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/objectinformatieobjecten/{uuid}",
    params(("uuid" = String, Path, description = "Relation UUID")),
    responses(
        (status = 200, description = "Relation", body = RelationRes),
        (status = 404, description = "Unknown relation", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn get_relation(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<Json<RelationRes>> {
    caller.require(Scope::Read)?;
    let relation = state.relations.get(&uuid)?;
    Ok(Json(RelationRes::new(&state.cfg, relation)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/objectinformatieobjecten/{uuid}",
    params(("uuid" = String, Path, description = "Relation UUID")),
    responses(
        (status = 204, description = "Relation deleted"),
        (status = 404, description = "Unknown relation", body = Problem)
    )
)]
#[axum::debug_handler]
pub async fn delete_relation(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> ApiResult<StatusCode> {
    caller.require(Scope::Delete)?;
    state.relations.delete(&uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}
