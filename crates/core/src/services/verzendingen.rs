//! Verzending operations.

use super::{parse_path_uuid, resolve_local_informatieobject};
use crate::model::verzending::{AardRelatie, Verzending, VerzendingInput};
use crate::store::Store;
use crate::validation::{
    choice, optional_text, required_text, url, ValidationErrors, WriteMode,
};
use crate::validators::{resolve_correspondence, AddressInput};
use crate::DrcResult;
use drc_uuid::ShardableUuid;
use std::sync::Arc;

const KIND: &str = "verzending";

#[derive(Clone)]
pub struct VerzendingService {
    store: Arc<Store>,
}

impl VerzendingService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, input: VerzendingInput) -> DrcResult<Verzending> {
        let tx = self.store.transaction().await;
        let verzending = resolve(&tx, ShardableUuid::new(), input, None, WriteMode::Create)?;
        tx.insert(&verzending)?;

        tracing::info!(uuid = %verzending.uuid, "verzending created");
        Ok(verzending)
    }

    pub fn get(&self, uuid: &str) -> DrcResult<Verzending> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        self.store.get(&uuid)
    }

    pub fn list(&self) -> Vec<Verzending> {
        self.store.list()
    }

    /// Full (`WriteMode::Update`) or partial update. The address rule is checked on the merged
    /// state.
    pub async fn update(
        &self,
        uuid: &str,
        input: VerzendingInput,
        mode: WriteMode,
    ) -> DrcResult<Verzending> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        let stored: Verzending = tx.get(&uuid)?;

        let verzending = resolve(&tx, uuid, input, Some(&stored), mode)?;
        tx.save(&verzending)?;

        tracing::info!(uuid = %verzending.uuid, "verzending updated");
        Ok(verzending)
    }

    pub async fn delete(&self, uuid: &str) -> DrcResult<()> {
        let uuid = parse_path_uuid(KIND, uuid)?;
        let tx = self.store.transaction().await;
        tx.remove::<Verzending>(&uuid)?;

        tracing::info!(uuid = %uuid, "verzending deleted");
        Ok(())
    }
}

fn resolve(
    store: &Store,
    uuid: ShardableUuid,
    input: VerzendingInput,
    stored: Option<&Verzending>,
    mode: WriteMode,
) -> Result<Verzending, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let s = stored;

    let correspondentie = resolve_correspondence(
        s.map(|v| &v.correspondentie),
        AddressInput {
            binnenlands: input.binnenlands_correspondentieadres,
            buitenlands: input.buitenlands_correspondentieadres,
            postadres: input.correspondentie_postadres,
            email: input.emailadres,
            fax: input.faxnummer,
            mijn_overheid: input.mijn_overheid,
        },
        mode,
        &mut errors,
    );

    let betrokkene = required_text(
        &mut errors,
        "betrokkene",
        input.betrokkene,
        s.map(|v| v.betrokkene.clone()),
        mode,
        1000,
    )
    .and_then(|raw| url(&mut errors, "betrokkene", raw));

    let informatieobject = required_text(
        &mut errors,
        "informatieobject",
        input.informatieobject,
        s.map(|v| store.cfg().informatieobject_url(&v.informatieobject)),
        mode,
        1000,
    )
    .and_then(
        |raw| match resolve_local_informatieobject(store, "informatieobject", &raw) {
            Ok(family) => Some(family),
            Err(e) => {
                errors.add(e);
                None
            }
        },
    );

    let aard_relatie = required_text(
        &mut errors,
        "aardRelatie",
        input.aard_relatie,
        s.map(|v| v.aard_relatie.as_str().to_string()),
        mode,
        32,
    )
    .and_then(|raw| choice::<AardRelatie>(&mut errors, "aardRelatie", raw));

    let toelichting = optional_text(
        &mut errors,
        "toelichting",
        input.toelichting,
        s.and_then(|v| v.toelichting.clone()),
        mode,
        200,
    );
    let contact_persoon = optional_text(
        &mut errors,
        "contactPersoon",
        input.contact_persoon,
        s.and_then(|v| v.contact_persoon.clone()),
        mode,
        1000,
    )
    .and_then(|raw| url(&mut errors, "contactPersoon", raw));
    let contactpersoonnaam = optional_text(
        &mut errors,
        "contactpersoonnaam",
        input.contactpersoonnaam,
        s.and_then(|v| v.contactpersoonnaam.clone()),
        mode,
        40,
    );

    let ontvangstdatum = input
        .ontvangstdatum
        .merge(s.and_then(|v| v.ontvangstdatum), mode);
    let verzenddatum = input
        .verzenddatum
        .merge(s.and_then(|v| v.verzenddatum), mode);

    match (betrokkene, informatieobject, aard_relatie, correspondentie) {
        (Some(betrokkene), Some(informatieobject), Some(aard_relatie), Some(correspondentie))
            if errors.is_empty() =>
        {
            Ok(Verzending {
                uuid,
                betrokkene,
                informatieobject,
                aard_relatie,
                toelichting,
                ontvangstdatum,
                verzenddatum,
                contact_persoon,
                contactpersoonnaam,
                correspondentie,
            })
        }
        _ => Err(errors),
    }
}
