//! Lock and definitive-edit guards for documents.
//!
//! A document is checked out by `lock`, which stores an opaque token on the family. Updates
//! must present that token. Independently, once the latest version of a family is `definitief`
//! only callers holding [`Scope::ForceUpdate`] may write to it.

use crate::constants::NON_FIELD_ERRORS;
use crate::model::informatieobject::Status;
use crate::validation::{Field, FieldError};
use api_shared::{Scope, ScopeSet};

/// Returns a fresh opaque lock token.
pub fn new_lock_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Checks the `lock` supplied with an update against the stored token.
pub fn check_update_lock(stored: Option<&str>, supplied: &Field<String>) -> Result<(), FieldError> {
    let Some(stored) = stored else {
        return Err(FieldError::new(
            NON_FIELD_ERRORS,
            "unlocked",
            "Unlocked document can't be modified.",
        ));
    };

    match supplied.value() {
        None => Err(FieldError::new("lock", "required", "This field is required.")),
        Some(token) if token == stored => Ok(()),
        Some(_) => Err(incorrect_lock()),
    }
}

/// Checks that an unlocked document may be locked.
pub fn check_can_lock(stored: Option<&str>) -> Result<(), FieldError> {
    match stored {
        Some(_) => Err(FieldError::new(
            NON_FIELD_ERRORS,
            "existing-lock",
            "The document is already locked.",
        )),
        None => Ok(()),
    }
}

/// Checks an unlock request. [`Scope::ForceUnlock`] skips the token comparison.
pub fn check_unlock(
    stored: Option<&str>,
    supplied: Option<&str>,
    scopes: &ScopeSet,
) -> Result<(), FieldError> {
    if scopes.contains(Scope::ForceUnlock) {
        return Ok(());
    }
    match (stored, supplied) {
        (None, _) => Ok(()),
        (Some(stored), Some(token)) if stored == token => Ok(()),
        _ => Err(incorrect_lock()),
    }
}

/// Rejects writes to a family whose latest version is definitive, unless overridden.
pub fn check_definitive(latest_status: Option<Status>, scopes: &ScopeSet) -> Result<(), FieldError> {
    if latest_status == Some(Status::Definitief) && !scopes.contains(Scope::ForceUpdate) {
        return Err(FieldError::new(
            NON_FIELD_ERRORS,
            "modify-status-definitive",
            "The document is definitive and can no longer be changed.",
        ));
    }
    Ok(())
}

fn incorrect_lock() -> FieldError {
    FieldError::new(
        NON_FIELD_ERRORS,
        "incorrect-lock-id",
        "Lock id is not correct.",
    )
}
