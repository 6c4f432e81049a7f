//! Response bodies.
//!
//! Stored records are rendered with absolute resource URLs built from [`CoreConfig`]. Request
//! bodies are the `*Input` types of `drc-core`.

use chrono::{DateTime, NaiveDate, Utc};
use drc_core::model::informatieobject::{Integriteit, Ondertekening};
use drc_core::model::verzending::{
    AardRelatie, BinnenlandsAdres, BuitenlandsAdres, Postadres, PostadresType,
};
use drc_core::model::{
    CorrespondenceAddress, ObjectInformatieObject, ObjectType, Status, Verzending,
    Vertrouwelijkheidaanduiding,
};
use drc_core::{CoreConfig, StoredDocument};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InformatieObjectRes {
    pub url: String,
    pub identificatie: String,
    pub bronorganisatie: String,
    #[schema(value_type = String, format = Date)]
    pub creatiedatum: NaiveDate,
    pub titel: String,
    pub vertrouwelijkheidaanduiding: Vertrouwelijkheidaanduiding,
    pub auteur: String,
    pub status: Option<Status>,
    pub formaat: Option<String>,
    pub taal: String,
    pub versie: u32,
    pub begin_registratie: DateTime<Utc>,
    pub bestandsnaam: Option<String>,
    /// Download URL of the content of this version.
    pub inhoud: Option<String>,
    pub bestandsomvang: Option<u64>,
    pub link: Option<String>,
    pub beschrijving: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ontvangstdatum: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub verzenddatum: Option<NaiveDate>,
    pub indicatie_gebruiksrecht: Option<bool>,
    pub ondertekening: Option<Ondertekening>,
    pub integriteit: Option<Integriteit>,
    pub informatieobjecttype: String,
    pub trefwoorden: Vec<String>,
    pub locked: bool,
}

impl InformatieObjectRes {
    pub fn new(cfg: &CoreConfig, doc: StoredDocument) -> Self {
        let v = doc.version;
        Self {
            url: cfg.informatieobject_url(&doc.uuid),
            inhoud: v
                .content
                .as_ref()
                .map(|_| cfg.download_url(&doc.uuid, v.versie)),
            identificatie: v.identificatie,
            bronorganisatie: v.bronorganisatie.to_string(),
            creatiedatum: v.creatiedatum,
            titel: v.titel,
            vertrouwelijkheidaanduiding: v.vertrouwelijkheidaanduiding,
            auteur: v.auteur,
            status: v.status,
            formaat: v.formaat,
            taal: v.taal,
            versie: v.versie,
            begin_registratie: v.begin_registratie,
            bestandsnaam: v.bestandsnaam,
            bestandsomvang: v.bestandsomvang,
            link: v.link,
            beschrijving: v.beschrijving,
            ontvangstdatum: v.ontvangstdatum,
            verzenddatum: v.verzenddatum,
            indicatie_gebruiksrecht: v.indicatie_gebruiksrecht,
            ondertekening: v.ondertekening,
            integriteit: v.integriteit,
            informatieobjecttype: v.informatieobjecttype,
            trefwoorden: v.trefwoorden,
            locked: doc.locked,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockRes {
    pub lock: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UnlockReq {
    #[serde(default)]
    pub lock: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BinnenlandsAdresRes {
    pub huisletter: Option<String>,
    pub huisnummer: u32,
    pub huisnummer_toevoeging: Option<String>,
    pub naam_openbare_ruimte: String,
    pub postcode: Option<String>,
    pub woonplaatsnaam: String,
}

impl From<BinnenlandsAdres> for BinnenlandsAdresRes {
    fn from(a: BinnenlandsAdres) -> Self {
        Self {
            huisletter: a.huisletter,
            huisnummer: a.huisnummer,
            huisnummer_toevoeging: a.huisnummer_toevoeging,
            naam_openbare_ruimte: a.naam_openbare_ruimte,
            postcode: a.postcode.map(|p| p.to_string()),
            woonplaatsnaam: a.woonplaatsnaam,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BuitenlandsAdresRes {
    #[serde(rename = "adresBuitenland_1")]
    pub adres_buitenland_1: String,
    #[serde(rename = "adresBuitenland_2")]
    pub adres_buitenland_2: Option<String>,
    #[serde(rename = "adresBuitenland_3")]
    pub adres_buitenland_3: Option<String>,
    #[serde(rename = "landPostadres")]
    pub land_postadres: String,
}

impl From<BuitenlandsAdres> for BuitenlandsAdresRes {
    fn from(a: BuitenlandsAdres) -> Self {
        Self {
            adres_buitenland_1: a.adres_buitenland_1,
            adres_buitenland_2: a.adres_buitenland_2,
            adres_buitenland_3: a.adres_buitenland_3,
            land_postadres: a.land_postadres,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostadresRes {
    pub post_bus_of_antwoordnummer: u32,
    pub postadres_postcode: String,
    pub postadres_type: PostadresType,
    pub woonplaatsnaam: String,
}

impl From<Postadres> for PostadresRes {
    fn from(a: Postadres) -> Self {
        Self {
            post_bus_of_antwoordnummer: a.post_bus_of_antwoordnummer,
            postadres_postcode: a.postadres_postcode.to_string(),
            postadres_type: a.postadres_type,
            woonplaatsnaam: a.woonplaatsnaam,
        }
    }
}

/// A Verzending with its address spread back over the six wire slots; exactly one is set.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerzendingRes {
    pub url: String,
    pub betrokkene: String,
    pub informatieobject: String,
    pub aard_relatie: AardRelatie,
    pub toelichting: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ontvangstdatum: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub verzenddatum: Option<NaiveDate>,
    pub contact_persoon: Option<String>,
    pub contactpersoonnaam: Option<String>,
    pub binnenlands_correspondentieadres: Option<BinnenlandsAdresRes>,
    pub buitenlands_correspondentieadres: Option<BuitenlandsAdresRes>,
    pub correspondentie_postadres: Option<PostadresRes>,
    pub emailadres: Option<String>,
    pub faxnummer: Option<String>,
    pub mijn_overheid: bool,
}

impl VerzendingRes {
    pub fn new(cfg: &CoreConfig, v: Verzending) -> Self {
        let mut res = Self {
            url: cfg.verzending_url(&v.uuid),
            betrokkene: v.betrokkene,
            informatieobject: cfg.informatieobject_url(&v.informatieobject),
            aard_relatie: v.aard_relatie,
            toelichting: v.toelichting,
            ontvangstdatum: v.ontvangstdatum,
            verzenddatum: v.verzenddatum,
            contact_persoon: v.contact_persoon,
            contactpersoonnaam: v.contactpersoonnaam,
            binnenlands_correspondentieadres: None,
            buitenlands_correspondentieadres: None,
            correspondentie_postadres: None,
            emailadres: None,
            faxnummer: None,
            mijn_overheid: false,
        };

        match v.correspondentie {
            CorrespondenceAddress::Binnenlands(a) => {
                res.binnenlands_correspondentieadres = Some(a.into())
            }
            CorrespondenceAddress::Buitenlands(a) => {
                res.buitenlands_correspondentieadres = Some(a.into())
            }
            CorrespondenceAddress::Postadres(a) => res.correspondentie_postadres = Some(a.into()),
            CorrespondenceAddress::Email(email) => res.emailadres = Some(email),
            CorrespondenceAddress::Fax(fax) => res.faxnummer = Some(fax),
            CorrespondenceAddress::MijnOverheid => res.mijn_overheid = true,
        }
        res
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelationRes {
    pub url: String,
    pub informatieobject: String,
    pub object: String,
    pub object_type: ObjectType,
    pub registratiedatum: DateTime<Utc>,
}

impl RelationRes {
    pub fn new(cfg: &CoreConfig, r: ObjectInformatieObject) -> Self {
        Self {
            url: cfg.relation_url(&r.uuid),
            informatieobject: cfg.informatieobject_url(&r.informatieobject),
            object: r.object,
            object_type: r.object_type,
            registratiedatum: r.registratiedatum,
        }
    }
}
