//! ObjectInformatieObject: a link between a document and a zaak or besluit held elsewhere.

use crate::constants::NON_FIELD_ERRORS;
use crate::validation::{is_http_url, Field, ValidationErrors};
use crate::validators::ResourceType;
use chrono::{DateTime, Utc};
use drc_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Zaak,
    Besluit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Zaak => "zaak",
            ObjectType::Besluit => "besluit",
        }
    }

    /// The remote resource type an `object` URL of this kind must point to.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ObjectType::Zaak => ResourceType::Zaak,
            ObjectType::Besluit => ResourceType::Besluit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInformatieObject {
    pub uuid: ShardableUuid,
    pub informatieobject: ShardableUuid,
    /// URL of the remote zaak or besluit.
    pub object: String,
    pub object_type: ObjectType,
    pub registratiedatum: DateTime<Utc>,
}

/// Request body for creating a relation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationInput {
    /// URL of a document in this component.
    #[schema(value_type = Option<String>)]
    pub informatieobject: Field<String>,
    #[schema(value_type = Option<String>)]
    pub object: Field<String>,
    #[schema(value_type = Option<ObjectType>)]
    pub object_type: Field<String>,
}

/// Query filters of the relation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationFilter {
    pub object: Option<String>,
    pub informatieobject: Option<String>,
}

impl RelationFilter {
    const PARAMETERS: [&'static str; 2] = ["object", "informatieobject"];

    /// Builds a filter from raw query parameters.
    pub fn from_query(query: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut unknown: Vec<&str> = query
            .keys()
            .map(String::as_str)
            .filter(|key| !Self::PARAMETERS.contains(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            errors.push(
                NON_FIELD_ERRORS,
                "unknown-parameters",
                format!("Unknown query parameters: {}.", unknown.join(", ")),
            );
        }

        let mut filter_url = |name: &str| -> Option<String> {
            let value = query.get(name)?;
            if is_http_url(value) {
                Some(value.clone())
            } else {
                errors.push(name, "invalid", "Enter a valid URL.");
                None
            }
        };
        let object = filter_url("object");
        let informatieobject = filter_url("informatieobject");

        errors.finish()?;
        Ok(Self {
            object,
            informatieobject,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_none() && self.informatieobject.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn accepts_known_url_filters() {
        let filter = RelationFilter::from_query(&query(&[(
            "object",
            "https://zrc.nl/api/v1/zaken/1234",
        )]))
        .expect("valid filter");
        assert_eq!(filter.object.as_deref(), Some("https://zrc.nl/api/v1/zaken/1234"));
        assert!(filter.informatieobject.is_none());
        assert!(RelationFilter::from_query(&HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_parameters() {
        let errors = RelationFilter::from_query(&query(&[("someparam", "somevalue")]))
            .unwrap_err();
        let error = errors.get(NON_FIELD_ERRORS).expect("non-field error");
        assert_eq!(error.code, "unknown-parameters");
    }

    #[test]
    fn filter_values_must_be_urls() {
        let errors = RelationFilter::from_query(&query(&[("object", "123")])).unwrap_err();
        assert_eq!(errors.get("object").unwrap().code, "invalid");
    }

    #[test]
    fn object_type_wire_values() {
        let parsed: ObjectType = serde_json::from_str("\"besluit\"").unwrap();
        assert_eq!(parsed, ObjectType::Besluit);
        assert_eq!(parsed.resource_type(), ResourceType::Besluit);
    }
}
