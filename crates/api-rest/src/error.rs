//! API error type.
//!
//! Every failure leaving a handler is an [`ApiError`]; its [`IntoResponse`] impl renders the
//! problem body shared by all endpoints.

use api_shared::{AuthError, InvalidParam, Problem, Scope};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use drc_core::{DrcError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("malformed request body: {0}")]
    Parse(String),
    #[error("authentication credentials were not provided or are invalid")]
    NotAuthenticated,
    #[error("missing scope {0}")]
    PermissionDenied(Scope),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Parse(_) => StatusCode::BAD_REQUEST,
            ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "invalid",
            ApiError::Parse(_) => "parse_error",
            ApiError::NotAuthenticated => "not_authenticated",
            ApiError::PermissionDenied(_) => "permission_denied",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Internal(_) => "error",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Invalid input.",
            ApiError::Parse(_) => "Malformed request.",
            ApiError::NotAuthenticated => "Authentication credentials were not provided.",
            ApiError::PermissionDenied(_) => {
                "You do not have permission to perform this action."
            }
            ApiError::NotFound { .. } => "Not found.",
            ApiError::Internal(_) => "A server error occurred.",
        }
    }

    /// Builds the response body. Internal errors carry no detail.
    pub fn to_problem(&self) -> Problem {
        let problem = Problem::new(self.status_code().as_u16(), self.error_code(), self.title());

        match self {
            ApiError::Validation(errors) => problem.with_invalid_params(
                errors
                    .iter()
                    .map(|e| InvalidParam {
                        name: e.name.clone(),
                        code: e.code.clone(),
                        reason: e.reason.clone(),
                    })
                    .collect(),
            ),
            ApiError::Parse(detail) => problem.with_detail(detail.clone()),
            ApiError::PermissionDenied(scope) => {
                problem.with_detail(format!("Missing scope: {scope}"))
            }
            ApiError::NotFound { kind, .. } => {
                problem.with_detail(format!("No {kind} matches the given query."))
            }
            ApiError::NotAuthenticated | ApiError::Internal(_) => problem,
        }
    }
}

impl From<DrcError> for ApiError {
    fn from(err: DrcError) -> Self {
        match err {
            DrcError::Validation(errors) => ApiError::Validation(errors),
            DrcError::NotFound { kind, id } => ApiError::NotFound { kind, id },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingKey | AuthError::UnknownKey => ApiError::NotAuthenticated,
            AuthError::MissingScope(scope) => ApiError::PermissionDenied(scope),
            AuthError::InvalidConfig(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::Internal(msg) => tracing::error!("request failed: {msg}"),
            ApiError::Validation(errors) => tracing::debug!("validation failed: {errors}"),
            _ => {}
        }

        (status, Json(self.to_problem())).into_response()
    }
}
