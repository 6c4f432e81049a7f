//! Documents (enkelvoudige informatieobjecten).
//!
//! A document family is stored as one [`InformatieObjectRecord`]: the family identifier, the
//! current lock token and every version ever written. Each PUT/PATCH appends a version; the
//! newest one is [`InformatieObjectRecord::latest`].

use crate::validation::{
    choice, nested, optional_text, required, required_text, url, Field, ValidationErrors,
    WriteMode,
};
use chrono::{DateTime, NaiveDate, Utc};
use drc_files::FileMetadata;
use drc_types::Rsin;
use drc_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// CHOICES
// ============================================================================

/// Lifecycle status of a document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// In progress.
    InBewerking,
    /// Ready for review.
    TerVaststelling,
    /// Approved for publication.
    TerPublicatie,
    /// Definitive. Further edits need the override scope.
    Definitief,
    Gearchiveerd,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::InBewerking => "in_bewerking",
            Status::TerVaststelling => "ter_vaststelling",
            Status::TerPublicatie => "ter_publicatie",
            Status::Definitief => "definitief",
            Status::Gearchiveerd => "gearchiveerd",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Vertrouwelijkheidaanduiding {
    Openbaar,
    BeperktOpenbaar,
    Intern,
    Zaakvertrouwelijk,
    Vertrouwelijk,
    Confidentieel,
    Geheim,
    ZeerGeheim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OndertekeningSoort {
    Analoog,
    Digitaal,
    Pki,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ChecksumAlgoritme {
    #[serde(rename = "crc_16")]
    Crc16,
    #[serde(rename = "crc_32")]
    Crc32,
    #[serde(rename = "crc_64")]
    Crc64,
    #[serde(rename = "fletcher_4")]
    Fletcher4,
    #[serde(rename = "fletcher_8")]
    Fletcher8,
    #[serde(rename = "fletcher_16")]
    Fletcher16,
    #[serde(rename = "fletcher_32")]
    Fletcher32,
    #[serde(rename = "hmac")]
    Hmac,
    #[serde(rename = "md5")]
    Md5,
    #[serde(rename = "sha_1")]
    Sha1,
    #[serde(rename = "sha_256")]
    Sha256,
    #[serde(rename = "sha_512")]
    Sha512,
    #[serde(rename = "sha_3")]
    Sha3,
}

// ============================================================================
// STORED MODEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ondertekening {
    pub soort: OndertekeningSoort,
    pub datum: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Integriteit {
    pub algoritme: ChecksumAlgoritme,
    pub waarde: String,
    pub datum: NaiveDate,
}

/// One version of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformatieObjectVersion {
    pub versie: u32,
    pub begin_registratie: DateTime<Utc>,
    pub identificatie: String,
    pub bronorganisatie: Rsin,
    pub creatiedatum: NaiveDate,
    pub titel: String,
    pub vertrouwelijkheidaanduiding: Vertrouwelijkheidaanduiding,
    pub auteur: String,
    pub status: Option<Status>,
    pub formaat: Option<String>,
    pub taal: String,
    pub bestandsnaam: Option<String>,
    pub bestandsomvang: Option<u64>,
    /// Stored decoded content.
    pub content: Option<FileMetadata>,
    pub link: Option<String>,
    pub beschrijving: Option<String>,
    pub ontvangstdatum: Option<NaiveDate>,
    pub verzenddatum: Option<NaiveDate>,
    pub indicatie_gebruiksrecht: Option<bool>,
    pub ondertekening: Option<Ondertekening>,
    pub integriteit: Option<Integriteit>,
    pub informatieobjecttype: String,
    #[serde(default)]
    pub trefwoorden: Vec<String>,
}

/// A document family with all of its versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformatieObjectRecord {
    pub uuid: ShardableUuid,
    /// Lock token; present while the document is checked out.
    pub lock: Option<String>,
    latest: InformatieObjectVersion,
    #[serde(default)]
    history: Vec<InformatieObjectVersion>,
}

impl InformatieObjectRecord {
    pub fn new(uuid: ShardableUuid, first: InformatieObjectVersion) -> Self {
        Self {
            uuid,
            lock: None,
            latest: first,
            history: Vec::new(),
        }
    }

    pub fn latest(&self) -> &InformatieObjectVersion {
        &self.latest
    }

    pub(crate) fn latest_mut(&mut self) -> &mut InformatieObjectVersion {
        &mut self.latest
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// Looks up a version by number; `None` selects the latest.
    pub fn version(&self, versie: Option<u32>) -> Option<&InformatieObjectVersion> {
        match versie {
            None => Some(&self.latest),
            Some(n) if n == self.latest.versie => Some(&self.latest),
            Some(n) => self.history.iter().find(|v| v.versie == n),
        }
    }

    pub fn versions(&self) -> impl Iterator<Item = &InformatieObjectVersion> {
        self.history.iter().chain(std::iter::once(&self.latest))
    }

    /// Makes `next` the latest version, numbering it after the current one.
    pub fn push_version(&mut self, mut next: InformatieObjectVersion) {
        next.versie = self.latest.versie + 1;
        let previous = std::mem::replace(&mut self.latest, next);
        self.history.push(previous);
    }
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct OndertekeningInput {
    #[schema(value_type = Option<OndertekeningSoort>)]
    pub soort: Field<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub datum: Field<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct IntegriteitInput {
    #[schema(value_type = Option<ChecksumAlgoritme>)]
    pub algoritme: Field<String>,
    #[schema(value_type = Option<String>)]
    pub waarde: Field<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub datum: Field<NaiveDate>,
}

/// Request body for creating or updating a document.
///
/// Read-only keys (`url`, `versie`, `beginRegistratie`, `locked`) are accepted and ignored so a
/// client can send back what it read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InformatieObjectInput {
    #[schema(value_type = Option<String>)]
    pub identificatie: Field<String>,
    #[schema(value_type = Option<String>, example = "319582462")]
    pub bronorganisatie: Field<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub creatiedatum: Field<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub titel: Field<String>,
    #[schema(value_type = Option<Vertrouwelijkheidaanduiding>)]
    pub vertrouwelijkheidaanduiding: Field<String>,
    #[schema(value_type = Option<String>)]
    pub auteur: Field<String>,
    #[schema(value_type = Option<Status>)]
    pub status: Field<String>,
    #[schema(value_type = Option<String>)]
    pub formaat: Field<String>,
    #[schema(value_type = Option<String>, example = "nld")]
    pub taal: Field<String>,
    #[schema(value_type = Option<String>)]
    pub bestandsnaam: Field<String>,
    /// Base64 encoded content.
    #[schema(value_type = Option<String>, format = Byte)]
    pub inhoud: Field<String>,
    #[schema(value_type = Option<u64>)]
    pub bestandsomvang: Field<u64>,
    #[schema(value_type = Option<String>)]
    pub link: Field<String>,
    #[schema(value_type = Option<String>)]
    pub beschrijving: Field<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub ontvangstdatum: Field<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub verzenddatum: Field<NaiveDate>,
    #[schema(value_type = Option<bool>)]
    pub indicatie_gebruiksrecht: Field<bool>,
    #[schema(value_type = Option<OndertekeningInput>)]
    pub ondertekening: Field<OndertekeningInput>,
    #[schema(value_type = Option<IntegriteitInput>)]
    pub integriteit: Field<IntegriteitInput>,
    #[schema(value_type = Option<String>)]
    pub informatieobjecttype: Field<String>,
    #[schema(value_type = Option<Vec<String>>)]
    pub trefwoorden: Field<Vec<String>>,
    /// Lock token; required on updates.
    #[schema(value_type = Option<String>)]
    pub lock: Field<String>,
}

/// Length of an ISO 639-2/B language code.
const TAAL_LENGTH: usize = 3;

impl InformatieObjectInput {
    /// Validates every metadata field and merges it with `stored` according to `mode`.
    ///
    /// Content (`inhoud`) and the lock token are left to the caller. The returned version keeps
    /// the stored content reference; `versie` and `begin_registratie` are placeholders. Returns
    /// `None` if any error was pushed for a field needed to build the version.
    pub(crate) fn resolve(
        self,
        stored: Option<&InformatieObjectVersion>,
        mode: WriteMode,
        default_vertrouwelijkheid: Option<Vertrouwelijkheidaanduiding>,
        errors: &mut ValidationErrors,
    ) -> Option<InformatieObjectVersion> {
        let s = stored;

        let identificatie = optional_text(
            errors,
            "identificatie",
            self.identificatie,
            s.map(|v| v.identificatie.clone()),
            mode,
            40,
        );

        let bronorganisatie = required_text(
            errors,
            "bronorganisatie",
            self.bronorganisatie,
            s.map(|v| v.bronorganisatie.to_string()),
            mode,
            usize::MAX,
        )
        .and_then(|raw| match Rsin::new(&raw) {
            Ok(rsin) => Some(rsin),
            Err(e) => {
                errors.push("bronorganisatie", e.code(), e.to_string());
                None
            }
        });

        let creatiedatum = required(
            errors,
            "creatiedatum",
            self.creatiedatum,
            s.map(|v| v.creatiedatum),
            mode,
        );
        let titel = required_text(
            errors,
            "titel",
            self.titel,
            s.map(|v| v.titel.clone()),
            mode,
            200,
        );
        let auteur = required_text(
            errors,
            "auteur",
            self.auteur,
            s.map(|v| v.auteur.clone()),
            mode,
            200,
        );

        let taal = required_text(
            errors,
            "taal",
            self.taal,
            s.map(|v| v.taal.clone()),
            mode,
            TAAL_LENGTH,
        )
        .and_then(|taal| {
            if taal.chars().count() == TAAL_LENGTH {
                Some(taal)
            } else {
                errors.push(
                    "taal",
                    "invalid-length",
                    "Language must be a 3 letter ISO 639-2/B code.",
                );
                None
            }
        });

        let vertrouwelijkheidaanduiding = match self
            .vertrouwelijkheidaanduiding
            .merge(
                s.map(|v| v.vertrouwelijkheidaanduiding_wire()),
                mode,
            )
            .filter(|v| !v.is_empty())
        {
            Some(raw) => choice(errors, "vertrouwelijkheidaanduiding", raw),
            None => default_vertrouwelijkheid.or_else(|| {
                errors.push(
                    "vertrouwelijkheidaanduiding",
                    "required",
                    "This field is required.",
                );
                None
            }),
        };

        let status = self
            .status
            .merge(s.and_then(|v| v.status.map(|st| st.as_str().to_string())), mode)
            .filter(|v| !v.is_empty())
            .and_then(|raw| choice::<Status>(errors, "status", raw));

        let formaat = optional_text(
            errors,
            "formaat",
            self.formaat,
            s.and_then(|v| v.formaat.clone()),
            mode,
            255,
        );
        let bestandsnaam = optional_text(
            errors,
            "bestandsnaam",
            self.bestandsnaam,
            s.and_then(|v| v.bestandsnaam.clone()),
            mode,
            255,
        );
        let link = optional_text(
            errors,
            "link",
            self.link,
            s.and_then(|v| v.link.clone()),
            mode,
            200,
        )
        .and_then(|raw| url(errors, "link", raw));
        let beschrijving = optional_text(
            errors,
            "beschrijving",
            self.beschrijving,
            s.and_then(|v| v.beschrijving.clone()),
            mode,
            1000,
        );

        let informatieobjecttype = required_text(
            errors,
            "informatieobjecttype",
            self.informatieobjecttype,
            s.map(|v| v.informatieobjecttype.clone()),
            mode,
            200,
        )
        .and_then(|raw| url(errors, "informatieobjecttype", raw));

        let ondertekening = group(
            self.ondertekening,
            s.and_then(|v| v.ondertekening.clone()),
            mode,
            |input| resolve_ondertekening(input, errors),
        );
        let integriteit = group(
            self.integriteit,
            s.and_then(|v| v.integriteit.clone()),
            mode,
            |input| resolve_integriteit(input, errors),
        );

        let version = InformatieObjectVersion {
            versie: s.map(|v| v.versie).unwrap_or(1),
            begin_registratie: Utc::now(),
            identificatie: identificatie.unwrap_or_default(),
            bronorganisatie: bronorganisatie?,
            creatiedatum: creatiedatum?,
            titel: titel?,
            vertrouwelijkheidaanduiding: vertrouwelijkheidaanduiding?,
            auteur: auteur?,
            status,
            formaat,
            taal: taal?,
            bestandsnaam,
            bestandsomvang: self
                .bestandsomvang
                .merge(s.and_then(|v| v.bestandsomvang), mode),
            content: s.and_then(|v| v.content.clone()),
            link,
            beschrijving,
            ontvangstdatum: self
                .ontvangstdatum
                .merge(s.and_then(|v| v.ontvangstdatum), mode),
            verzenddatum: self
                .verzenddatum
                .merge(s.and_then(|v| v.verzenddatum), mode),
            indicatie_gebruiksrecht: self
                .indicatie_gebruiksrecht
                .merge(s.and_then(|v| v.indicatie_gebruiksrecht), mode),
            ondertekening,
            integriteit,
            informatieobjecttype: informatieobjecttype?,
            trefwoorden: self
                .trefwoorden
                .merge(s.map(|v| v.trefwoorden.clone()), mode)
                .unwrap_or_default(),
        };

        Some(version)
    }
}

impl InformatieObjectVersion {
    fn vertrouwelijkheidaanduiding_wire(&self) -> String {
        serde_json::to_value(self.vertrouwelijkheidaanduiding)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_default()
    }
}

/// Merges a field group. A supplied group is always validated as a whole.
fn group<I, T>(
    field: Field<I>,
    stored: Option<T>,
    mode: WriteMode,
    build: impl FnOnce(I) -> Option<T>,
) -> Option<T> {
    match field {
        Field::Value(input) => build(input),
        Field::Null => None,
        Field::Absent if mode.is_partial() => stored,
        Field::Absent => None,
    }
}

fn resolve_ondertekening(
    input: OndertekeningInput,
    errors: &mut ValidationErrors,
) -> Option<Ondertekening> {
    let soort_name = nested("ondertekening", "soort");
    let soort = required(errors, &soort_name, input.soort, None, WriteMode::Create)
        .and_then(|raw| choice::<OndertekeningSoort>(errors, &soort_name, raw));
    let datum = required(
        errors,
        &nested("ondertekening", "datum"),
        input.datum,
        None,
        WriteMode::Create,
    );

    Some(Ondertekening {
        soort: soort?,
        datum: datum?,
    })
}

fn resolve_integriteit(
    input: IntegriteitInput,
    errors: &mut ValidationErrors,
) -> Option<Integriteit> {
    let algoritme_name = nested("integriteit", "algoritme");
    let algoritme = required(errors, &algoritme_name, input.algoritme, None, WriteMode::Create)
        .and_then(|raw| choice::<ChecksumAlgoritme>(errors, &algoritme_name, raw));
    let waarde = required_text(
        errors,
        &nested("integriteit", "waarde"),
        input.waarde,
        None,
        WriteMode::Create,
        128,
    );
    let datum = required(
        errors,
        &nested("integriteit", "datum"),
        input.datum,
        None,
        WriteMode::Create,
    );

    Some(Integriteit {
        algoritme: algoritme?,
        waarde: waarde?,
        datum: datum?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: serde_json::Value) -> InformatieObjectInput {
        serde_json::from_value(value).expect("deserialise input")
    }

    fn complete() -> serde_json::Value {
        json!({
            "bronorganisatie": "159351741",
            "creatiedatum": "2018-06-27",
            "titel": "detailed summary",
            "auteur": "test_auteur",
            "taal": "eng",
            "informatieobjecttype": "https://example.com/informatieobjecttype/foo",
            "vertrouwelijkheidaanduiding": "openbaar",
        })
    }

    #[test]
    fn resolves_complete_create() {
        let mut errors = ValidationErrors::new();
        let version = input(complete())
            .resolve(None, WriteMode::Create, None, &mut errors)
            .expect("valid");

        assert!(errors.is_empty(), "{errors}");
        assert_eq!(version.versie, 1);
        assert_eq!(version.taal, "eng");
        assert_eq!(
            version.vertrouwelijkheidaanduiding,
            Vertrouwelijkheidaanduiding::Openbaar
        );
        assert!(version.status.is_none());
    }

    #[test]
    fn reports_every_missing_required_field() {
        let mut errors = ValidationErrors::new();
        let version = input(json!({})).resolve(None, WriteMode::Create, None, &mut errors);

        assert!(version.is_none());
        for name in [
            "bronorganisatie",
            "creatiedatum",
            "titel",
            "auteur",
            "taal",
            "informatieobjecttype",
            "vertrouwelijkheidaanduiding",
        ] {
            assert_eq!(errors.get(name).map(|e| e.code.as_str()), Some("required"), "{name}");
        }
    }

    #[test]
    fn vertrouwelijkheid_falls_back_to_type_default() {
        let mut body = complete();
        body.as_object_mut().unwrap().remove("vertrouwelijkheidaanduiding");

        let mut errors = ValidationErrors::new();
        let version = input(body)
            .resolve(
                None,
                WriteMode::Create,
                Some(Vertrouwelijkheidaanduiding::Zaakvertrouwelijk),
                &mut errors,
            )
            .unwrap();
        assert_eq!(
            version.vertrouwelijkheidaanduiding,
            Vertrouwelijkheidaanduiding::Zaakvertrouwelijk
        );
    }

    #[test]
    fn integriteit_subfields_are_required() {
        for key in ["algoritme", "waarde", "datum"] {
            let mut group = json!({"algoritme": "md5", "waarde": "foobarbaz", "datum": "2018-12-13"});
            group.as_object_mut().unwrap().remove(key);

            let mut errors = ValidationErrors::new();
            input(json!({ "integriteit": group })).resolve(
                None,
                WriteMode::Create,
                None,
                &mut errors,
            );

            let error = errors.get(&format!("integriteit.{key}")).expect(key);
            assert_eq!(error.code, "required");
        }
    }

    #[test]
    fn integriteit_bad_values() {
        let cases = [
            ("algoritme", json!(""), "invalid_choice"),
            ("waarde", json!(""), "blank"),
            ("datum", json!(null), "null"),
        ];
        for (key, value, code) in cases {
            let mut group = json!({"algoritme": "md5", "waarde": "foobarbaz", "datum": "2018-12-13"});
            group[key] = value;

            let mut errors = ValidationErrors::new();
            input(json!({ "integriteit": group })).resolve(
                None,
                WriteMode::Create,
                None,
                &mut errors,
            );

            assert_eq!(errors.get(&format!("integriteit.{key}")).unwrap().code, code);
        }
    }

    #[test]
    fn ondertekening_bad_values() {
        let mut errors = ValidationErrors::new();
        input(json!({"ondertekening": {"soort": "", "datum": null}})).resolve(
            None,
            WriteMode::Create,
            None,
            &mut errors,
        );
        assert_eq!(errors.get("ondertekening.soort").unwrap().code, "invalid_choice");
        assert_eq!(errors.get("ondertekening.datum").unwrap().code, "null");
    }

    #[test]
    fn invalid_rsin_uses_rsin_code() {
        let mut body = complete();
        body["bronorganisatie"] = json!("123456789");

        let mut errors = ValidationErrors::new();
        input(body).resolve(None, WriteMode::Create, None, &mut errors);
        assert_eq!(errors.get("bronorganisatie").unwrap().code, "invalid");
    }

    #[test]
    fn partial_update_keeps_stored_fields() {
        let mut errors = ValidationErrors::new();
        let stored = input(complete())
            .resolve(None, WriteMode::Create, None, &mut errors)
            .unwrap();

        let updated = input(json!({"beschrijving": "beschrijving2"}))
            .resolve(Some(&stored), WriteMode::PartialUpdate, None, &mut errors)
            .unwrap();

        assert!(errors.is_empty());
        assert_eq!(updated.titel, stored.titel);
        assert_eq!(updated.beschrijving.as_deref(), Some("beschrijving2"));
    }

    #[test]
    fn record_keeps_history_in_order() {
        let mut errors = ValidationErrors::new();
        let first = input(complete())
            .resolve(None, WriteMode::Create, None, &mut errors)
            .unwrap();
        let mut record = InformatieObjectRecord::new(ShardableUuid::new(), first.clone());

        let mut second = first.clone();
        second.status = Some(Status::Definitief);
        record.push_version(second);

        assert_eq!(record.latest().versie, 2);
        assert_eq!(record.version(Some(1)).unwrap().status, None);
        assert!(record.version(Some(3)).is_none());
        assert_eq!(record.versions().map(|v| v.versie).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn input_schemas_build() {
        let (name, _) = InformatieObjectInput::schema();
        assert_eq!(name, "InformatieObjectInput");
        let (name, _) = OndertekeningInput::schema();
        assert_eq!(name, "OndertekeningInput");
        let (name, _) = IntegriteitInput::schema();
        assert_eq!(name, "IntegriteitInput");
    }
}
