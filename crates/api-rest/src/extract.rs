//! Request extractors that reject with [`ApiError`].

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use api_shared::{Scope, ScopeSet, API_KEY_HEADER};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use drc_core::constants::NON_FIELD_ERRORS;
use drc_core::ValidationErrors;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::collections::HashMap;

/// The authenticated client and its scopes.
#[derive(Debug, Clone)]
pub struct Caller(ScopeSet);

impl Caller {
    pub fn require(&self, scope: Scope) -> ApiResult<()> {
        Ok(self.0.require(scope)?)
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        let scopes = state.clients.authenticate(key)?;
        Ok(Caller(scopes.clone()))
    }
}

/// JSON body whose deserialisation errors are reported by field path.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Parse(e.body_text()))?;
        parse_json(&bytes).map(ApiJson)
    }
}

/// Deserialises `bytes`. A value of the wrong type yields an `invalid` error named by its JSON
/// path; anything else is a parse error.
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        match inner.classify() {
            Category::Data => {
                let name = if path == "." {
                    NON_FIELD_ERRORS.to_string()
                } else {
                    path
                };
                ApiError::Validation(ValidationErrors::single(name, "invalid", inner.to_string()))
            }
            Category::Io | Category::Syntax | Category::Eof => ApiError::Parse(inner.to_string()),
        }
    })
}

/// Reads the optional `versie` query parameter.
pub fn versie_param(query: &HashMap<String, String>) -> ApiResult<Option<u32>> {
    match query.get("versie").map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<u32>().map(Some).map_err(|_| {
            ApiError::Validation(ValidationErrors::single(
                "versie",
                "invalid",
                "A valid integer is required.",
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Body {
        titel: String,
        adres: Adres,
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Adres {
        huisnummer: u32,
    }

    #[test]
    fn type_errors_are_named_by_path() {
        let err = parse_json::<Body>(br#"{"titel": "x", "adres": {"huisnummer": "twelve"}}"#)
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                let error = errors.iter().next().unwrap();
                assert_eq!(error.name, "adres.huisnummer");
                assert_eq!(error.code, "invalid");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_json::<Body>(b"{\"titel\": ").unwrap_err();
        assert_eq!(err.error_code(), "parse_error");
    }

    #[test]
    fn versie_must_be_numeric() {
        let query = HashMap::from([("versie".to_string(), "2".to_string())]);
        assert_eq!(versie_param(&query).unwrap(), Some(2));
        assert_eq!(versie_param(&HashMap::new()).unwrap(), None);

        let query = HashMap::from([("versie".to_string(), "latest".to_string())]);
        assert!(matches!(versie_param(&query), Err(ApiError::Validation(_))));
    }
}
