//! Status rule for received documents.
//!
//! `in_bewerking` and `ter_vaststelling` do not apply to documents that were received from
//! outside (`ontvangstdatum` set). The rule is checked on the state a write would produce, so it
//! covers both setting such a status and setting a receipt date later.

use crate::model::informatieobject::Status;
use crate::validation::FieldError;
use chrono::NaiveDate;

impl Status {
    /// Statuses that are not allowed once a receipt date is recorded.
    pub fn invalid_for_received(self) -> bool {
        matches!(self, Status::InBewerking | Status::TerVaststelling)
    }
}

/// Checks the combination of `status` and `ontvangstdatum`.
pub fn check_status_for_received(
    status: Option<Status>,
    ontvangstdatum: Option<NaiveDate>,
) -> Result<(), FieldError> {
    match (status, ontvangstdatum) {
        (Some(status), Some(_)) if status.invalid_for_received() => Err(FieldError::new(
            "status",
            "invalid_for_received",
            format!(
                "The status '{}' is not allowed for received documents.",
                status.as_str()
            ),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Status; 5] = [
        Status::InBewerking,
        Status::TerVaststelling,
        Status::TerPublicatie,
        Status::Definitief,
        Status::Gearchiveerd,
    ];

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2018, 12, 24)
    }

    #[test]
    fn received_documents_reject_early_statuses() {
        for status in [Status::InBewerking, Status::TerVaststelling] {
            let err = check_status_for_received(Some(status), date()).unwrap_err();
            assert_eq!(err.name, "status");
            assert_eq!(err.code, "invalid_for_received");
        }
    }

    #[test]
    fn other_statuses_are_allowed_when_received() {
        for status in [Status::TerPublicatie, Status::Definitief, Status::Gearchiveerd] {
            assert!(check_status_for_received(Some(status), date()).is_ok());
        }
        assert!(check_status_for_received(None, date()).is_ok());
    }

    #[test]
    fn every_status_is_allowed_without_receipt_date() {
        for status in ALL {
            assert!(check_status_for_received(Some(status), None).is_ok());
        }
    }
}
