//! Problem-details error bodies.
//!
//! Every non-2xx response of the API carries a [`Problem`]. Validation failures list one
//! [`InvalidParam`] per failing field path, e.g. `correspondentiePostadres.postadresPostcode`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvalidParam {
    /// Field path, or `nonFieldErrors` for object-level rules.
    pub name: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable explanation.
    pub reason: String,
}

/// RFC 7807 style error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_: String,
    pub code: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_params: Vec<InvalidParam>,
}

impl Problem {
    pub fn new(status: u16, code: impl Into<String>, title: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            type_: format!("urn:drc:error:{code}"),
            code,
            title: title.into(),
            status,
            detail: String::new(),
            instance: String::new(),
            invalid_params: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = instance.into();
        self
    }

    pub fn with_invalid_params(mut self, params: Vec<InvalidParam>) -> Self {
        self.invalid_params = params;
        self
    }
}
