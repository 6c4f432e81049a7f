//! Validation of references to resources held by other registries.
//!
//! A reference is valid when its URL can be fetched, the representation has the shape of the
//! expected resource type and (for catalogue types) it is not a concept. Fetching and the shape
//! check are injected as [`Fetcher`] and [`ShapeChecker`] so deployments and tests can swap them.

use crate::validation::{is_http_url, FieldError};
use crate::{DrcError, DrcResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Failure to obtain a remote representation.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("response is not JSON: {0}")]
    Decode(String),
}

/// Fetches the JSON representation behind a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Resource types this component refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    InformatieObjectType,
    Zaak,
    Besluit,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::InformatieObjectType => "informatieobjecttype",
            ResourceType::Zaak => "zaak",
            ResourceType::Besluit => "besluit",
        }
    }
}

/// Decides whether a representation looks like the expected resource type.
pub trait ShapeChecker: Send + Sync {
    fn has_shape(&self, resource: &Value, expected: ResourceType) -> bool;
}

/// [`Fetcher`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> DrcResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DrcError::HttpClient(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// [`ShapeChecker`] that requires the attributes every instance of a type carries.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequiredKeysShapeChecker;

impl RequiredKeysShapeChecker {
    fn required_keys(expected: ResourceType) -> &'static [&'static str] {
        match expected {
            ResourceType::InformatieObjectType => {
                &["url", "catalogus", "omschrijving", "vertrouwelijkheidaanduiding"]
            }
            ResourceType::Zaak => &["url", "identificatie", "bronorganisatie", "zaaktype"],
            ResourceType::Besluit => &[
                "url",
                "identificatie",
                "verantwoordelijkeOrganisatie",
                "besluittype",
            ],
        }
    }
}

impl ShapeChecker for RequiredKeysShapeChecker {
    fn has_shape(&self, resource: &Value, expected: ResourceType) -> bool {
        let Some(object) = resource.as_object() else {
            return false;
        };
        Self::required_keys(expected)
            .iter()
            .all(|key| object.contains_key(*key))
    }
}

/// Validates reference URLs with the injected capabilities.
#[derive(Clone)]
pub struct ReferenceValidator {
    fetcher: Arc<dyn Fetcher>,
    shapes: Arc<dyn ShapeChecker>,
}

impl ReferenceValidator {
    pub fn new(fetcher: Arc<dyn Fetcher>, shapes: Arc<dyn ShapeChecker>) -> Self {
        Self { fetcher, shapes }
    }

    /// Fetches `url` and checks it is a (published) `expected` resource.
    ///
    /// Returns the fetched representation. Every failure, including network failures, is
    /// reported as a [`FieldError`] on `name`:
    /// - `invalid`: malformed or unreachable URL
    /// - `invalid-resource`: wrong shape
    /// - `not-published`: a concept, when `require_published` is set
    pub async fn validate(
        &self,
        name: &str,
        url: &str,
        expected: ResourceType,
        require_published: bool,
    ) -> Result<Value, FieldError> {
        if !is_http_url(url) {
            return Err(FieldError::new(name, "invalid", "Enter a valid URL."));
        }

        let resource = self.fetcher.fetch(url).await.map_err(|e| {
            tracing::debug!(%url, "reference fetch failed: {e}");
            FieldError::new(
                name,
                "invalid",
                format!("The URL {url} could not be fetched."),
            )
        })?;

        if !self.shapes.has_shape(&resource, expected) {
            return Err(FieldError::new(
                name,
                "invalid-resource",
                format!("The URL {url} does not point to a valid {}.", expected.as_str()),
            ));
        }

        if require_published && resource.get("concept").and_then(Value::as_bool) == Some(true) {
            return Err(FieldError::new(
                name,
                "not-published",
                format!("The {} is not yet published.", expected.as_str()),
            ));
        }

        Ok(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticFetcher;
    use serde_json::json;
    use std::collections::HashMap;

    struct FixedShape(bool);

    impl ShapeChecker for FixedShape {
        fn has_shape(&self, _: &Value, _: ResourceType) -> bool {
            self.0
        }
    }

    const IOTYPE: &str = "https://example.com/informatieobjecttype/foo";

    fn validator(resource: Value, shape: bool) -> ReferenceValidator {
        let fetcher = StaticFetcher(HashMap::from([(IOTYPE.to_string(), resource)]));
        ReferenceValidator::new(Arc::new(fetcher), Arc::new(FixedShape(shape)))
    }

    #[tokio::test]
    async fn unreachable_url_is_invalid() {
        let v = validator(json!({}), true);
        let err = v
            .validate("informatieobjecttype", "http://invalid-host/foo", ResourceType::InformatieObjectType, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, "invalid");
        assert_eq!(err.name, "informatieobjecttype");
    }

    #[tokio::test]
    async fn malformed_url_is_invalid() {
        let v = validator(json!({}), true);
        let err = v
            .validate("object", "123", ResourceType::Zaak, false)
            .await
            .unwrap_err();
        assert_eq!(err.code, "invalid");
    }

    #[tokio::test]
    async fn wrong_shape_is_invalid_resource() {
        let v = validator(json!({"some": "incorrect property"}), false);
        let err = v
            .validate("informatieobjecttype", IOTYPE, ResourceType::InformatieObjectType, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, "invalid-resource");
    }

    #[tokio::test]
    async fn concept_is_not_published() {
        let v = validator(json!({"url": IOTYPE, "concept": true}), true);
        let err = v
            .validate("informatieobjecttype", IOTYPE, ResourceType::InformatieObjectType, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, "not-published");

        assert!(v
            .validate("informatieobjecttype", IOTYPE, ResourceType::InformatieObjectType, false)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn published_resource_is_returned() {
        let v = validator(json!({"url": IOTYPE, "concept": false}), true);
        let resource = v
            .validate("informatieobjecttype", IOTYPE, ResourceType::InformatieObjectType, true)
            .await
            .expect("valid");
        assert_eq!(resource["url"], IOTYPE);
    }

    #[test]
    fn required_keys_shape_checker() {
        let checker = RequiredKeysShapeChecker;
        let zaak = json!({
            "url": "https://zrc.nl/api/v1/zaken/1234",
            "identificatie": "Z1",
            "bronorganisatie": "517439943",
            "zaaktype": "https://ztc.nl/zaaktypen/1",
        });
        assert!(checker.has_shape(&zaak, ResourceType::Zaak));
        assert!(!checker.has_shape(&zaak, ResourceType::Besluit));
        assert!(!checker.has_shape(&json!([]), ResourceType::Zaak));
    }
}
