//! Fixtures shared by the unit tests of this crate.

use crate::config::CoreConfig;
use crate::model::informatieobject::{InformatieObjectVersion, Vertrouwelijkheidaanduiding};
use crate::model::verzending::{AardRelatie, CorrespondenceAddress, Verzending};
use crate::store::Store;
use crate::validators::{FetchError, Fetcher, ReferenceValidator, RequiredKeysShapeChecker};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use drc_types::Rsin;
use drc_uuid::ShardableUuid;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const BASE_URL: &str = "http://testserver";
pub(crate) const IOTYPE: &str = "https://example.com/ztc/api/v1/informatieobjecttypen/1";
pub(crate) const CONCEPT_IOTYPE: &str = "https://example.com/ztc/api/v1/informatieobjecttypen/2";
pub(crate) const ZAAK: &str = "https://example.com/zrc/api/v1/zaken/1";
pub(crate) const BESLUIT: &str = "https://example.com/brc/api/v1/besluiten/1";

pub(crate) fn config(dir: &Path) -> Arc<CoreConfig> {
    Arc::new(
        CoreConfig::new(dir.to_path_buf(), BASE_URL, Duration::from_secs(1), false)
            .expect("valid test config"),
    )
}

pub(crate) fn store(dir: &Path) -> Store {
    Store::new(config(dir)).expect("store opens")
}

pub(crate) fn version(identificatie: &str) -> InformatieObjectVersion {
    InformatieObjectVersion {
        versie: 1,
        begin_registratie: Utc::now(),
        identificatie: identificatie.to_string(),
        bronorganisatie: Rsin::new("159351741").expect("valid rsin"),
        creatiedatum: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
        titel: "detailed summary".into(),
        vertrouwelijkheidaanduiding: Vertrouwelijkheidaanduiding::Openbaar,
        auteur: "test_auteur".into(),
        status: None,
        formaat: None,
        taal: "eng".into(),
        bestandsnaam: None,
        bestandsomvang: None,
        content: None,
        link: None,
        beschrijving: None,
        ontvangstdatum: None,
        verzenddatum: None,
        indicatie_gebruiksrecht: None,
        ondertekening: None,
        integriteit: None,
        informatieobjecttype: IOTYPE.into(),
        trefwoorden: Vec::new(),
    }
}

pub(crate) fn verzending(informatieobject: &ShardableUuid) -> Verzending {
    Verzending {
        uuid: ShardableUuid::new(),
        betrokkene: "https://example.com/brp/api/v1/ingeschrevenpersonen/1".into(),
        informatieobject: informatieobject.clone(),
        aard_relatie: AardRelatie::Geadresseerde,
        toelichting: None,
        ontvangstdatum: None,
        verzenddatum: None,
        contact_persoon: None,
        contactpersoonnaam: None,
        correspondentie: CorrespondenceAddress::Email("test@gmail.com".into()),
    }
}

/// Serves canned representations; every other URL is unreachable.
pub(crate) struct StaticFetcher(pub HashMap<String, Value>);

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.0
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport(format!("no route to {url}")))
    }
}

pub(crate) fn remote_resources() -> HashMap<String, Value> {
    HashMap::from([
        (
            IOTYPE.to_string(),
            json!({
                "url": IOTYPE,
                "catalogus": "https://example.com/ztc/api/v1/catalogussen/1",
                "omschrijving": "Brief",
                "vertrouwelijkheidaanduiding": "zaakvertrouwelijk",
                "concept": false,
            }),
        ),
        (
            CONCEPT_IOTYPE.to_string(),
            json!({
                "url": CONCEPT_IOTYPE,
                "catalogus": "https://example.com/ztc/api/v1/catalogussen/1",
                "omschrijving": "Concept",
                "vertrouwelijkheidaanduiding": "openbaar",
                "concept": true,
            }),
        ),
        (
            ZAAK.to_string(),
            json!({
                "url": ZAAK,
                "identificatie": "ZAAK-1",
                "bronorganisatie": "517439943",
                "zaaktype": "https://example.com/ztc/api/v1/zaaktypen/1",
            }),
        ),
        (
            BESLUIT.to_string(),
            json!({
                "url": BESLUIT,
                "identificatie": "BESLUIT-1",
                "verantwoordelijkeOrganisatie": "517439943",
                "besluittype": "https://example.com/ztc/api/v1/besluittypen/1",
            }),
        ),
    ])
}

pub(crate) fn references() -> Arc<ReferenceValidator> {
    Arc::new(ReferenceValidator::new(
        Arc::new(StaticFetcher(remote_resources())),
        Arc::new(RequiredKeysShapeChecker),
    ))
}
