//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services as
//! `Arc<CoreConfig>`. Nothing in this crate reads environment variables while handling a request.

use crate::constants::{
    API_PREFIX, DOCUMENTEN_DIR_NAME, INFORMATIEOBJECT_COLLECTION, RELATIONS_DIR_NAME,
    RELATION_COLLECTION, VERZENDINGEN_DIR_NAME, VERZENDING_COLLECTION,
    DEFAULT_FETCH_TIMEOUT_SECS,
};
use crate::{DrcError, DrcResult};
use drc_uuid::ShardableUuid;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    base_url: String,
    fetch_timeout: Duration,
    sync_enabled: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `base_url` is the public origin of this component (e.g. `https://drc.example.nl`); a
    /// trailing slash is dropped.
    ///
    /// # Errors
    ///
    /// Returns `DrcError::InvalidInput` if `base_url` is not an absolute http(s) URL.
    pub fn new(
        data_dir: PathBuf,
        base_url: impl Into<String>,
        fetch_timeout: Duration,
        sync_enabled: bool,
    ) -> DrcResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();

        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| DrcError::InvalidInput(format!("base URL '{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(DrcError::InvalidInput(format!(
                "base URL must be an absolute http(s) URL, got '{base_url}'"
            )));
        }

        Ok(Self {
            data_dir,
            base_url,
            fetch_timeout,
            sync_enabled,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn documenten_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTEN_DIR_NAME)
    }

    pub fn verzendingen_dir(&self) -> PathBuf {
        self.data_dir.join(VERZENDINGEN_DIR_NAME)
    }

    pub fn relations_dir(&self) -> PathBuf {
        self.data_dir.join(RELATIONS_DIR_NAME)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    /// Canonical URL of a document family.
    pub fn informatieobject_url(&self, uuid: &ShardableUuid) -> String {
        format!(
            "{}{API_PREFIX}/{INFORMATIEOBJECT_COLLECTION}/{uuid}",
            self.base_url
        )
    }

    /// Download URL of a document's content, pinned to a version.
    pub fn download_url(&self, uuid: &ShardableUuid, versie: u32) -> String {
        format!(
            "{}/download?versie={versie}",
            self.informatieobject_url(uuid)
        )
    }

    pub fn verzending_url(&self, uuid: &ShardableUuid) -> String {
        format!("{}{API_PREFIX}/{VERZENDING_COLLECTION}/{uuid}", self.base_url)
    }

    pub fn relation_url(&self, uuid: &ShardableUuid) -> String {
        format!("{}{API_PREFIX}/{RELATION_COLLECTION}/{uuid}", self.base_url)
    }
}

/// Parse the fetch timeout (whole seconds) from an optional string value.
///
/// `None` or an empty value yields the default of ten seconds.
pub fn fetch_timeout_from_env_value(value: Option<String>) -> DrcResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let secs = match value {
        Some(v) => v
            .parse::<u64>()
            .map_err(|e| DrcError::InvalidInput(format!("fetch timeout '{v}': {e}")))?,
        None => DEFAULT_FETCH_TIMEOUT_SECS,
    };

    if secs == 0 {
        return Err(DrcError::InvalidInput(
            "fetch timeout must be at least one second".into(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`), defaulting to `default`.
pub fn flag_from_env_value(value: Option<String>, default: bool) -> DrcResult<bool> {
    let Some(value) = value.map(|v| v.trim().to_ascii_lowercase()) else {
        return Ok(default);
    };

    match value.as_str() {
        "" => Ok(default),
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(DrcError::InvalidInput(format!(
            "expected a boolean flag, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base: &str) -> DrcResult<CoreConfig> {
        CoreConfig::new(PathBuf::from("/tmp/drc"), base, Duration::from_secs(1), false)
    }

    #[test]
    fn builds_resource_urls_from_base() {
        let cfg = cfg("http://testserver/").expect("valid base");
        let id = ShardableUuid::parse("550e8400e29b41d4a716446655440000").unwrap();

        assert_eq!(
            cfg.informatieobject_url(&id),
            "http://testserver/api/v1/enkelvoudiginformatieobjecten/550e8400e29b41d4a716446655440000"
        );
        assert_eq!(
            cfg.download_url(&id, 2),
            "http://testserver/api/v1/enkelvoudiginformatieobjecten/550e8400e29b41d4a716446655440000/download?versie=2"
        );
        assert!(cfg.verzending_url(&id).contains("/api/v1/verzendingen/"));
        assert!(cfg.relation_url(&id).contains("/api/v1/objectinformatieobjecten/"));
    }

    #[test]
    fn rejects_relative_or_non_http_base() {
        assert!(cfg("drc.local").is_err());
        assert!(cfg("ftp://drc.local").is_err());
    }

    #[test]
    fn fetch_timeout_defaults_and_parses() {
        assert_eq!(
            fetch_timeout_from_env_value(None).unwrap(),
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
        );
        assert_eq!(
            fetch_timeout_from_env_value(Some(" 3 ".into())).unwrap(),
            Duration::from_secs(3)
        );
        assert!(fetch_timeout_from_env_value(Some("0".into())).is_err());
        assert!(fetch_timeout_from_env_value(Some("soon".into())).is_err());
    }

    #[test]
    fn flag_parsing() {
        assert!(flag_from_env_value(None, true).unwrap());
        assert!(!flag_from_env_value(Some("false".into()), true).unwrap());
        assert!(flag_from_env_value(Some("YES".into()), false).unwrap());
        assert!(flag_from_env_value(Some("maybe".into()), false).is_err());
    }
}
