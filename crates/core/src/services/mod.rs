//! Operations on documents, Verzendingen and relations.
//!
//! Each service owns an `Arc<Store>` and runs its writes inside one store transaction:
//! remote references are checked first, then the stored state is loaded, the request is
//! validated against it and only a fully valid request is written.

pub mod informatieobjecten;
pub mod relations;
pub mod verzendingen;

pub use informatieobjecten::{Download, InformatieObjectService, StoredDocument};
pub use relations::RelationService;
pub use verzendingen::VerzendingService;

use crate::constants::INFORMATIEOBJECT_COLLECTION;
use crate::model::InformatieObjectRecord;
use crate::store::Store;
use crate::validation::{is_http_url, FieldError};
use crate::{DrcError, DrcResult};
use drc_uuid::ShardableUuid;

/// Parses the `{uuid}` of a request path; anything non-canonical cannot exist.
pub fn parse_path_uuid(kind: &'static str, id: &str) -> DrcResult<ShardableUuid> {
    ShardableUuid::parse(id).map_err(|_| DrcError::not_found(kind, id))
}

/// Extracts the family UUID from a document URL (absolute, or a bare path).
///
/// Only the path is considered: it must end in `/enkelvoudiginformatieobjecten/<uuid>`.
pub fn informatieobject_uuid_from_url(url: &str) -> Option<ShardableUuid> {
    let path = if is_http_url(url) {
        reqwest::Url::parse(url).ok()?.path().to_string()
    } else if url.starts_with('/') {
        url.to_string()
    } else {
        return None;
    };

    let mut segments = path.trim_end_matches('/').rsplit('/');
    let id = segments.next()?;
    if segments.next()? != INFORMATIEOBJECT_COLLECTION {
        return None;
    }
    ShardableUuid::parse(id).ok()
}

/// Resolves a document URL supplied in field `name` to a stored family.
pub(crate) fn resolve_local_informatieobject(
    store: &Store,
    name: &str,
    url: &str,
) -> Result<ShardableUuid, FieldError> {
    let Some(uuid) = informatieobject_uuid_from_url(url) else {
        return Err(FieldError::new(
            name,
            "no_match",
            "Invalid hyperlink - No URL match.",
        ));
    };

    match store.load::<InformatieObjectRecord>(&uuid) {
        Ok(Some(_)) => Ok(uuid),
        Ok(None) => Err(FieldError::new(
            name,
            "does_not_exist",
            "Invalid hyperlink - Object does not exist.",
        )),
        Err(e) => {
            tracing::error!("failed to load informatieobject {uuid}: {e}");
            Err(FieldError::new(
                name,
                "does_not_exist",
                "Invalid hyperlink - Object does not exist.",
            ))
        }
    }
}
