//! # API REST
//!
//! REST API implementation for the DRC.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - API-key authentication and scope checks (`X-Api-Key`)
//! - Problem-details error responses with `invalidParams`
//! - OpenAPI/Swagger documentation
//!
//! Business rules live in `drc-core`; this crate only translates between HTTP and the services.

#![warn(rust_2018_idioms)]

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use handlers::{health, informatieobjecten, relations, verzendingen};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        informatieobjecten::list_informatieobjecten,
        informatieobjecten::create_informatieobject,
        informatieobjecten::get_informatieobject,
        informatieobjecten::download_informatieobject,
        informatieobjecten::update_informatieobject,
        informatieobjecten::patch_informatieobject,
        informatieobjecten::delete_informatieobject,
        informatieobjecten::lock_informatieobject,
        informatieobjecten::unlock_informatieobject,
        verzendingen::list_verzendingen,
        verzendingen::create_verzending,
        verzendingen::get_verzending,
        verzendingen::update_verzending,
        verzendingen::patch_verzending,
        verzendingen::delete_verzending,
        relations::list_relations,
        relations::create_relation,
        relations::get_relation,
        relations::delete_relation,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::Problem,
        api_shared::InvalidParam,
        dto::InformatieObjectRes,
        dto::LockRes,
        dto::UnlockReq,
        dto::VerzendingRes,
        dto::BinnenlandsAdresRes,
        dto::BuitenlandsAdresRes,
        dto::PostadresRes,
        dto::RelationRes,
        drc_core::model::informatieobject::InformatieObjectInput,
        drc_core::model::informatieobject::OndertekeningInput,
        drc_core::model::informatieobject::IntegriteitInput,
        drc_core::model::informatieobject::Ondertekening,
        drc_core::model::informatieobject::Integriteit,
        drc_core::model::informatieobject::OndertekeningSoort,
        drc_core::model::informatieobject::ChecksumAlgoritme,
        drc_core::model::informatieobject::Status,
        drc_core::model::informatieobject::Vertrouwelijkheidaanduiding,
        drc_core::model::verzending::VerzendingInput,
        drc_core::model::verzending::BinnenlandsAdresInput,
        drc_core::model::verzending::BuitenlandsAdresInput,
        drc_core::model::verzending::PostadresInput,
        drc_core::model::verzending::AardRelatie,
        drc_core::model::verzending::PostadresType,
        drc_core::model::relation::RelationInput,
        drc_core::model::relation::ObjectType,
    ))
)]
pub struct ApiDoc;

/// Builds the full router: API routes, Swagger UI, request tracing and permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let documents = "/api/v1/enkelvoudiginformatieobjecten";
    let relations_path = "/api/v1/objectinformatieobjecten";
    let verzendingen_path = "/api/v1/verzendingen";

    Router::new()
        .route("/health", get(health::health))
        .route(
            documents,
            get(informatieobjecten::list_informatieobjecten)
                .post(informatieobjecten::create_informatieobject),
        )
        .route(
            &format!("{documents}/:uuid"),
            get(informatieobjecten::get_informatieobject)
                .put(informatieobjecten::update_informatieobject)
                .patch(informatieobjecten::patch_informatieobject)
                .delete(informatieobjecten::delete_informatieobject),
        )
        .route(
            &format!("{documents}/:uuid/download"),
            get(informatieobjecten::download_informatieobject),
        )
        .route(
            &format!("{documents}/:uuid/lock"),
            post(informatieobjecten::lock_informatieobject),
        )
        .route(
            &format!("{documents}/:uuid/unlock"),
            post(informatieobjecten::unlock_informatieobject),
        )
        .route(
            relations_path,
            get(relations::list_relations).post(relations::create_relation),
        )
        .route(
            &format!("{relations_path}/:uuid"),
            get(relations::get_relation).delete(relations::delete_relation),
        )
        .route(
            verzendingen_path,
            get(verzendingen::list_verzendingen).post(verzendingen::create_verzending),
        )
        .route(
            &format!("{verzendingen_path}/:uuid"),
            get(verzendingen::get_verzending)
                .put(verzendingen::update_verzending)
                .patch(verzendingen::patch_verzending)
                .delete(verzendingen::delete_verzending),
        )
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
