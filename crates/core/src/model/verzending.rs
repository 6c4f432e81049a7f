//! Verzendingen: records of a document being sent to or received from a party.
//!
//! A Verzending carries exactly one correspondence address, stored as [`CorrespondenceAddress`].
//! Requests still speak in the six wire-level slots; the address validator turns those into the
//! variant.

use crate::validation::Field;
use chrono::NaiveDate;
use drc_types::PostalCode;
use drc_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AardRelatie {
    Afzender,
    Geadresseerde,
}

impl AardRelatie {
    pub fn as_str(&self) -> &'static str {
        match self {
            AardRelatie::Afzender => "afzender",
            AardRelatie::Geadresseerde => "geadresseerde",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostadresType {
    Antwoordnummer,
    Postbusnummer,
}

/// Domestic address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinnenlandsAdres {
    pub huisletter: Option<String>,
    pub huisnummer: u32,
    pub huisnummer_toevoeging: Option<String>,
    pub naam_openbare_ruimte: String,
    pub postcode: Option<PostalCode>,
    pub woonplaatsnaam: String,
}

/// Foreign address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuitenlandsAdres {
    pub adres_buitenland_1: String,
    pub adres_buitenland_2: Option<String>,
    pub adres_buitenland_3: Option<String>,
    pub land_postadres: String,
}

/// PO box or reply-number address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Postadres {
    pub post_bus_of_antwoordnummer: u32,
    pub postadres_postcode: PostalCode,
    pub postadres_type: PostadresType,
    pub woonplaatsnaam: String,
}

/// The single address a Verzending is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "soort", content = "adres", rename_all = "snake_case")]
pub enum CorrespondenceAddress {
    Binnenlands(BinnenlandsAdres),
    Buitenlands(BuitenlandsAdres),
    Postadres(Postadres),
    Email(String),
    Fax(String),
    /// Delivered through the national citizen portal.
    MijnOverheid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verzending {
    pub uuid: ShardableUuid,
    pub betrokkene: String,
    /// Family identifier of the document that was sent.
    pub informatieobject: ShardableUuid,
    pub aard_relatie: AardRelatie,
    pub toelichting: Option<String>,
    pub ontvangstdatum: Option<NaiveDate>,
    pub verzenddatum: Option<NaiveDate>,
    pub contact_persoon: Option<String>,
    pub contactpersoonnaam: Option<String>,
    pub correspondentie: CorrespondenceAddress,
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BinnenlandsAdresInput {
    #[schema(value_type = Option<String>)]
    pub huisletter: Field<String>,
    #[schema(value_type = Option<u32>)]
    pub huisnummer: Field<u32>,
    #[schema(value_type = Option<String>)]
    pub huisnummer_toevoeging: Field<String>,
    #[schema(value_type = Option<String>)]
    pub naam_openbare_ruimte: Field<String>,
    #[schema(value_type = Option<String>, example = "1800XY")]
    pub postcode: Field<String>,
    #[schema(value_type = Option<String>)]
    pub woonplaatsnaam: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BuitenlandsAdresInput {
    #[serde(rename = "adresBuitenland_1")]
    #[schema(value_type = Option<String>)]
    pub adres_buitenland_1: Field<String>,
    #[serde(rename = "adresBuitenland_2")]
    #[schema(value_type = Option<String>)]
    pub adres_buitenland_2: Field<String>,
    #[serde(rename = "adresBuitenland_3")]
    #[schema(value_type = Option<String>)]
    pub adres_buitenland_3: Field<String>,
    #[serde(rename = "landPostadres")]
    #[schema(value_type = Option<String>)]
    pub land_postadres: Field<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PostadresInput {
    #[schema(value_type = Option<u32>)]
    pub post_bus_of_antwoordnummer: Field<u32>,
    #[schema(value_type = Option<String>)]
    pub postadres_postcode: Field<String>,
    #[schema(value_type = Option<PostadresType>)]
    pub postadres_type: Field<String>,
    #[schema(value_type = Option<String>)]
    pub woonplaatsnaam: Field<String>,
}

/// Request body for creating or updating a Verzending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct VerzendingInput {
    #[schema(value_type = Option<String>)]
    pub betrokkene: Field<String>,
    /// URL of a document in this component.
    #[schema(value_type = Option<String>)]
    pub informatieobject: Field<String>,
    #[schema(value_type = Option<AardRelatie>)]
    pub aard_relatie: Field<String>,
    #[schema(value_type = Option<String>)]
    pub toelichting: Field<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ontvangstdatum: Field<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub verzenddatum: Field<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub contact_persoon: Field<String>,
    #[schema(value_type = Option<String>)]
    pub contactpersoonnaam: Field<String>,
    #[schema(value_type = Option<BinnenlandsAdresInput>)]
    pub binnenlands_correspondentieadres: Field<BinnenlandsAdresInput>,
    #[schema(value_type = Option<BuitenlandsAdresInput>)]
    pub buitenlands_correspondentieadres: Field<BuitenlandsAdresInput>,
    #[schema(value_type = Option<PostadresInput>)]
    pub correspondentie_postadres: Field<PostadresInput>,
    #[schema(value_type = Option<String>)]
    pub emailadres: Field<String>,
    #[schema(value_type = Option<String>)]
    pub faxnummer: Field<String>,
    #[schema(value_type = Option<bool>)]
    pub mijn_overheid: Field<bool>,
}
