//! Correspondence address validation for Verzendingen.
//!
//! On the wire a Verzending has six address slots. After a write exactly one of them may be
//! populated. The check runs on the *effective* state:
//!
//! - create and full update start from empty slots and apply the request;
//! - partial update starts from the stored address; a slot sent as `null` (or an empty string)
//!   is cleared, a slot left out keeps its stored value.
//!
//! Every populated group is then validated on its own (required sub-fields, postal code
//! length) and the single survivor becomes the stored [`CorrespondenceAddress`].

use crate::constants::NON_FIELD_ERRORS;
use crate::model::verzending::{
    BinnenlandsAdres, BinnenlandsAdresInput, BuitenlandsAdres, BuitenlandsAdresInput,
    CorrespondenceAddress, Postadres, PostadresInput, PostadresType,
};
use crate::validation::{
    choice, nested, optional_text, required, required_text, url, Field, ValidationErrors,
    WriteMode,
};
use drc_types::PostalCode;

pub const BINNENLANDS: &str = "binnenlandsCorrespondentieadres";
pub const BUITENLANDS: &str = "buitenlandsCorrespondentieadres";
pub const POSTADRES: &str = "correspondentiePostadres";
pub const EMAIL: &str = "emailadres";
pub const FAX: &str = "faxnummer";
pub const MIJN_OVERHEID: &str = "mijnOverheid";

/// The address-related part of a Verzending request.
#[derive(Debug, Clone, Default)]
pub struct AddressInput {
    pub binnenlands: Field<BinnenlandsAdresInput>,
    pub buitenlands: Field<BuitenlandsAdresInput>,
    pub postadres: Field<PostadresInput>,
    pub email: Field<String>,
    pub fax: Field<String>,
    pub mijn_overheid: Field<bool>,
}

/// The six slots after merging a request with the stored state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressSlots {
    pub binnenlands: Option<BinnenlandsAdresInput>,
    pub buitenlands: Option<BuitenlandsAdresInput>,
    pub postadres: Option<PostadresInput>,
    pub email: Option<String>,
    pub fax: Option<String>,
    pub mijn_overheid: bool,
}

impl AddressSlots {
    /// Expands a stored address into its slot.
    pub fn from_stored(address: &CorrespondenceAddress) -> Self {
        let mut slots = Self::default();
        match address {
            CorrespondenceAddress::Binnenlands(a) => {
                slots.binnenlands = Some(BinnenlandsAdresInput {
                    huisletter: a.huisletter.clone().into(),
                    huisnummer: Field::Value(a.huisnummer),
                    huisnummer_toevoeging: a.huisnummer_toevoeging.clone().into(),
                    naam_openbare_ruimte: Field::Value(a.naam_openbare_ruimte.clone()),
                    postcode: a.postcode.as_ref().map(|p| p.as_str().to_string()).into(),
                    woonplaatsnaam: Field::Value(a.woonplaatsnaam.clone()),
                })
            }
            CorrespondenceAddress::Buitenlands(a) => {
                slots.buitenlands = Some(BuitenlandsAdresInput {
                    adres_buitenland_1: Field::Value(a.adres_buitenland_1.clone()),
                    adres_buitenland_2: a.adres_buitenland_2.clone().into(),
                    adres_buitenland_3: a.adres_buitenland_3.clone().into(),
                    land_postadres: Field::Value(a.land_postadres.clone()),
                })
            }
            CorrespondenceAddress::Postadres(a) => {
                slots.postadres = Some(PostadresInput {
                    post_bus_of_antwoordnummer: Field::Value(a.post_bus_of_antwoordnummer),
                    postadres_postcode: Field::Value(a.postadres_postcode.as_str().to_string()),
                    postadres_type: Field::Value(postadres_type_wire(a.postadres_type).into()),
                    woonplaatsnaam: Field::Value(a.woonplaatsnaam.clone()),
                })
            }
            CorrespondenceAddress::Email(email) => slots.email = Some(email.clone()),
            CorrespondenceAddress::Fax(fax) => slots.fax = Some(fax.clone()),
            CorrespondenceAddress::MijnOverheid => slots.mijn_overheid = true,
        }
        slots
    }

    /// Applies the request on top of these slots.
    ///
    /// A group sent for a slot that already holds that group only replaces the sub-fields it
    /// names.
    pub fn overlay(mut self, input: AddressInput) -> Self {
        fn apply<T>(slot: &mut Option<T>, field: Field<T>) {
            match field {
                Field::Value(v) => *slot = Some(v),
                Field::Null => *slot = None,
                Field::Absent => {}
            }
        }

        let binnenlands = input
            .binnenlands
            .map(|a| a.merged_onto(self.binnenlands.as_ref()));
        let buitenlands = input
            .buitenlands
            .map(|a| a.merged_onto(self.buitenlands.as_ref()));
        let postadres = input
            .postadres
            .map(|a| a.merged_onto(self.postadres.as_ref()));

        apply(&mut self.binnenlands, binnenlands);
        apply(&mut self.buitenlands, buitenlands);
        apply(&mut self.postadres, postadres);
        apply(&mut self.email, input.email);
        apply(&mut self.fax, input.fax);
        match input.mijn_overheid {
            Field::Value(flag) => self.mijn_overheid = flag,
            Field::Null => self.mijn_overheid = false,
            Field::Absent => {}
        }
        self
    }

    /// Wire names of the populated slots, in declaration order.
    pub fn populated(&self) -> Vec<&'static str> {
        let mut kinds = Vec::new();
        if self.binnenlands.as_ref().is_some_and(binnenlands_populated) {
            kinds.push(BINNENLANDS);
        }
        if self.buitenlands.as_ref().is_some_and(buitenlands_populated) {
            kinds.push(BUITENLANDS);
        }
        if self.postadres.as_ref().is_some_and(postadres_populated) {
            kinds.push(POSTADRES);
        }
        if self.email.as_deref().is_some_and(filled) {
            kinds.push(EMAIL);
        }
        if self.fax.as_deref().is_some_and(filled) {
            kinds.push(FAX);
        }
        if self.mijn_overheid {
            kinds.push(MIJN_OVERHEID);
        }
        kinds
    }
}

fn filled(text: &str) -> bool {
    !text.trim().is_empty()
}

fn text_set(field: &Field<String>) -> bool {
    field.value().is_some_and(|v| filled(v))
}

/// Keeps `stored` where `sent` was left out.
fn keep<T: Clone>(sent: Field<T>, stored: &Field<T>) -> Field<T> {
    match sent {
        Field::Absent => stored.clone(),
        other => other,
    }
}

impl BinnenlandsAdresInput {
    fn merged_onto(self, stored: Option<&Self>) -> Self {
        let Some(stored) = stored else { return self };
        Self {
            huisletter: keep(self.huisletter, &stored.huisletter),
            huisnummer: keep(self.huisnummer, &stored.huisnummer),
            huisnummer_toevoeging: keep(self.huisnummer_toevoeging, &stored.huisnummer_toevoeging),
            naam_openbare_ruimte: keep(self.naam_openbare_ruimte, &stored.naam_openbare_ruimte),
            postcode: keep(self.postcode, &stored.postcode),
            woonplaatsnaam: keep(self.woonplaatsnaam, &stored.woonplaatsnaam),
        }
    }
}

impl BuitenlandsAdresInput {
    fn merged_onto(self, stored: Option<&Self>) -> Self {
        let Some(stored) = stored else { return self };
        Self {
            adres_buitenland_1: keep(self.adres_buitenland_1, &stored.adres_buitenland_1),
            adres_buitenland_2: keep(self.adres_buitenland_2, &stored.adres_buitenland_2),
            adres_buitenland_3: keep(self.adres_buitenland_3, &stored.adres_buitenland_3),
            land_postadres: keep(self.land_postadres, &stored.land_postadres),
        }
    }
}

impl PostadresInput {
    fn merged_onto(self, stored: Option<&Self>) -> Self {
        let Some(stored) = stored else { return self };
        Self {
            post_bus_of_antwoordnummer: keep(
                self.post_bus_of_antwoordnummer,
                &stored.post_bus_of_antwoordnummer,
            ),
            postadres_postcode: keep(self.postadres_postcode, &stored.postadres_postcode),
            postadres_type: keep(self.postadres_type, &stored.postadres_type),
            woonplaatsnaam: keep(self.woonplaatsnaam, &stored.woonplaatsnaam),
        }
    }
}

fn binnenlands_populated(a: &BinnenlandsAdresInput) -> bool {
    a.huisnummer.value().is_some()
        || text_set(&a.naam_openbare_ruimte)
        || text_set(&a.woonplaatsnaam)
}

fn buitenlands_populated(a: &BuitenlandsAdresInput) -> bool {
    text_set(&a.adres_buitenland_1) || text_set(&a.land_postadres)
}

fn postadres_populated(a: &PostadresInput) -> bool {
    a.post_bus_of_antwoordnummer.value().is_some()
        || text_set(&a.postadres_postcode)
        || text_set(&a.postadres_type)
        || text_set(&a.woonplaatsnaam)
}

fn postadres_type_wire(kind: PostadresType) -> &'static str {
    match kind {
        PostadresType::Antwoordnummer => "antwoordnummer",
        PostadresType::Postbusnummer => "postbusnummer",
    }
}

/// Resolves the effective correspondence address of a write.
///
/// Pushes `invalid-address` on `nonFieldErrors` unless exactly one slot ends up populated, and
/// sub-field errors for every populated group.
pub fn resolve_correspondence(
    stored: Option<&CorrespondenceAddress>,
    input: AddressInput,
    mode: WriteMode,
    errors: &mut ValidationErrors,
) -> Option<CorrespondenceAddress> {
    let base = match (mode, stored) {
        (WriteMode::PartialUpdate, Some(address)) => AddressSlots::from_stored(address),
        _ => AddressSlots::default(),
    };
    let slots = base.overlay(input);
    let populated = slots.populated();

    if populated.len() != 1 {
        errors.push(
            NON_FIELD_ERRORS,
            "invalid-address",
            format!(
                "Exactly one correspondence address is required, found {}.",
                if populated.is_empty() {
                    "none".to_string()
                } else {
                    populated.join(", ")
                }
            ),
        );
    }

    let mut resolved = Vec::with_capacity(populated.len());
    for kind in &populated {
        let address = match *kind {
            BINNENLANDS => slots
                .binnenlands
                .clone()
                .and_then(|a| validate_binnenlands(a, errors))
                .map(CorrespondenceAddress::Binnenlands),
            BUITENLANDS => slots
                .buitenlands
                .clone()
                .and_then(|a| validate_buitenlands(a, errors))
                .map(CorrespondenceAddress::Buitenlands),
            POSTADRES => slots
                .postadres
                .clone()
                .and_then(|a| validate_postadres(a, errors))
                .map(CorrespondenceAddress::Postadres),
            EMAIL => slots
                .email
                .clone()
                .and_then(|e| validate_email(e, errors))
                .map(CorrespondenceAddress::Email),
            FAX => slots
                .fax
                .clone()
                .and_then(|f| {
                    optional_text(errors, FAX, Field::Value(f), None, WriteMode::Create, 15)
                })
                .map(CorrespondenceAddress::Fax),
            _ => Some(CorrespondenceAddress::MijnOverheid),
        };
        resolved.extend(address);
    }

    if populated.len() == 1 {
        resolved.pop()
    } else {
        None
    }
}

fn postal_code(errors: &mut ValidationErrors, name: &str, raw: String) -> Option<PostalCode> {
    match PostalCode::new(&raw) {
        Ok(code) => Some(code),
        Err(e) => {
            errors.push(name, "invalid-length", e.to_string());
            None
        }
    }
}

fn validate_binnenlands(
    input: BinnenlandsAdresInput,
    errors: &mut ValidationErrors,
) -> Option<BinnenlandsAdres> {
    let create = WriteMode::Create;
    let huisnummer = required(
        errors,
        &nested(BINNENLANDS, "huisnummer"),
        input.huisnummer,
        None,
        create,
    );
    let naam_openbare_ruimte = required_text(
        errors,
        &nested(BINNENLANDS, "naamOpenbareRuimte"),
        input.naam_openbare_ruimte,
        None,
        create,
        80,
    );
    let woonplaatsnaam = required_text(
        errors,
        &nested(BINNENLANDS, "woonplaatsnaam"),
        input.woonplaatsnaam,
        None,
        create,
        80,
    );
    let huisletter = optional_text(
        errors,
        &nested(BINNENLANDS, "huisletter"),
        input.huisletter,
        None,
        create,
        1,
    );
    let huisnummer_toevoeging = optional_text(
        errors,
        &nested(BINNENLANDS, "huisnummerToevoeging"),
        input.huisnummer_toevoeging,
        None,
        create,
        4,
    );

    let postcode_name = nested(BINNENLANDS, "postcode");
    let postcode = match input.postcode.merge(None, create).filter(|p| !p.is_empty()) {
        Some(raw) => Some(postal_code(errors, &postcode_name, raw)?),
        None => None,
    };

    Some(BinnenlandsAdres {
        huisletter,
        huisnummer: huisnummer?,
        huisnummer_toevoeging,
        naam_openbare_ruimte: naam_openbare_ruimte?,
        postcode,
        woonplaatsnaam: woonplaatsnaam?,
    })
}

fn validate_buitenlands(
    input: BuitenlandsAdresInput,
    errors: &mut ValidationErrors,
) -> Option<BuitenlandsAdres> {
    let create = WriteMode::Create;
    let adres_buitenland_1 = required_text(
        errors,
        &nested(BUITENLANDS, "adresBuitenland_1"),
        input.adres_buitenland_1,
        None,
        create,
        35,
    );
    let adres_buitenland_2 = optional_text(
        errors,
        &nested(BUITENLANDS, "adresBuitenland_2"),
        input.adres_buitenland_2,
        None,
        create,
        35,
    );
    let adres_buitenland_3 = optional_text(
        errors,
        &nested(BUITENLANDS, "adresBuitenland_3"),
        input.adres_buitenland_3,
        None,
        create,
        35,
    );
    let land_name = nested(BUITENLANDS, "landPostadres");
    let land_postadres = required_text(errors, &land_name, input.land_postadres, None, create, 200)
        .and_then(|raw| url(errors, &land_name, raw));

    Some(BuitenlandsAdres {
        adres_buitenland_1: adres_buitenland_1?,
        adres_buitenland_2,
        adres_buitenland_3,
        land_postadres: land_postadres?,
    })
}

fn validate_postadres(input: PostadresInput, errors: &mut ValidationErrors) -> Option<Postadres> {
    let create = WriteMode::Create;
    let nummer = required(
        errors,
        &nested(POSTADRES, "postBusOfAntwoordnummer"),
        input.post_bus_of_antwoordnummer,
        None,
        create,
    );

    let postcode_name = nested(POSTADRES, "postadresPostcode");
    let postcode = required_text(
        errors,
        &postcode_name,
        input.postadres_postcode,
        None,
        create,
        usize::MAX,
    )
    .and_then(|raw| postal_code(errors, &postcode_name, raw));

    let type_name = nested(POSTADRES, "postadresType");
    let postadres_type = required_text(errors, &type_name, input.postadres_type, None, create, 32)
        .and_then(|raw| choice::<PostadresType>(errors, &type_name, raw));

    let woonplaatsnaam = required_text(
        errors,
        &nested(POSTADRES, "woonplaatsnaam"),
        input.woonplaatsnaam,
        None,
        create,
        80,
    );

    Some(Postadres {
        post_bus_of_antwoordnummer: nummer?,
        postadres_postcode: postcode?,
        postadres_type: postadres_type?,
        woonplaatsnaam: woonplaatsnaam?,
    })
}

fn validate_email(email: String, errors: &mut ValidationErrors) -> Option<String> {
    let email = optional_text(errors, EMAIL, Field::Value(email), None, WriteMode::Create, 100)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if valid {
        Some(email)
    } else {
        errors.push(EMAIL, "invalid", "Enter a valid email address.");
        None
    }
}
