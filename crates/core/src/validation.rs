//! Input validation utilities.
//!
//! Validation in this crate is *aggregating*: every check pushes a [`FieldError`] into a
//! [`ValidationErrors`] collection and the request fails with all violations at once.
//!
//! Request bodies use [`Field<T>`] to tell apart a key that was left out of the JSON from one
//! that was sent as `null`. Together with [`WriteMode`] this decides how a value is merged with
//! the stored state:
//!
//! | input      | create / full update | partial update |
//! |------------|----------------------|----------------|
//! | absent     | unset                | keep stored    |
//! | `null`     | unset                | unset          |
//! | value      | value                | value          |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub name: String,
    pub code: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            reason: reason.into(),
        }
    }
}

/// All violations found while validating one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(
        name: impl Into<String>,
        code: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self(vec![FieldError::new(name, code, reason)])
    }

    pub fn push(
        &mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.0.push(FieldError::new(name, code, reason));
    }

    pub fn add(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First error reported for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.name == name)
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} ({})", e.name, e.code))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

/// How a write relates to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: nothing is stored yet.
    Create,
    /// PUT: the request replaces every writable field.
    Update,
    /// PATCH: only supplied keys change.
    PartialUpdate,
}

impl WriteMode {
    pub fn is_partial(self) -> bool {
        matches!(self, WriteMode::PartialUpdate)
    }
}

/// A request value that remembers whether its key was present.
///
/// Use with `#[serde(default)]` so that missing keys become [`Field::Absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Value(value),
            None => Field::Null,
        })
    }
}

/// Absent and `null` both serialize as `null`.
impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value().serialize(serializer)
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Absent => Field::Absent,
            Field::Null => Field::Null,
            Field::Value(v) => Field::Value(f(v)),
        }
    }

    /// Merges this input with the stored value according to `mode`.
    pub fn merge(self, stored: Option<T>, mode: WriteMode) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            Field::Null => None,
            Field::Absent if mode.is_partial() => stored,
            Field::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Null,
        }
    }
}

// ============================================================================
// FIELD HELPERS
// ============================================================================

/// A value that must end up set after merging.
pub(crate) fn required<T>(
    errors: &mut ValidationErrors,
    name: &str,
    field: Field<T>,
    stored: Option<T>,
    mode: WriteMode,
) -> Option<T> {
    match field {
        Field::Value(v) => Some(v),
        Field::Null => {
            errors.push(name, "null", "This field may not be null.");
            None
        }
        Field::Absent if mode.is_partial() && stored.is_some() => stored,
        Field::Absent => {
            errors.push(name, "required", "This field is required.");
            None
        }
    }
}

/// A required, non-blank string of at most `max_length` characters.
pub(crate) fn required_text(
    errors: &mut ValidationErrors,
    name: &str,
    field: Field<String>,
    stored: Option<String>,
    mode: WriteMode,
    max_length: usize,
) -> Option<String> {
    let value = required(errors, name, field, stored, mode)?;
    if value.trim().is_empty() {
        errors.push(name, "blank", "This field may not be blank.");
        return None;
    }
    check_max_length(errors, name, value, max_length)
}

/// An optional string; blank input unsets it.
pub(crate) fn optional_text(
    errors: &mut ValidationErrors,
    name: &str,
    field: Field<String>,
    stored: Option<String>,
    mode: WriteMode,
    max_length: usize,
) -> Option<String> {
    let value = field.merge(stored, mode).filter(|v| !v.is_empty())?;
    check_max_length(errors, name, value, max_length)
}

fn check_max_length(
    errors: &mut ValidationErrors,
    name: &str,
    value: String,
    max_length: usize,
) -> Option<String> {
    if value.chars().count() > max_length {
        errors.push(
            name,
            "max_length",
            format!("Ensure this field has no more than {max_length} characters."),
        );
        return None;
    }
    Some(value)
}

/// Parses `value` as one of the wire values of the enum `T`.
pub(crate) fn choice<T: DeserializeOwned>(
    errors: &mut ValidationErrors,
    name: &str,
    value: String,
) -> Option<T> {
    match serde_json::from_value::<T>(serde_json::Value::String(value.clone())) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.push(
                name,
                "invalid_choice",
                format!("\"{value}\" is not a valid choice."),
            );
            None
        }
    }
}

/// Returns true if `value` is an absolute http(s) URL.
pub fn is_http_url(value: &str) -> bool {
    reqwest::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Checks that `value` is an absolute http(s) URL.
pub(crate) fn url(errors: &mut ValidationErrors, name: &str, value: String) -> Option<String> {
    if is_http_url(&value) {
        Some(value)
    } else {
        errors.push(name, "invalid", "Enter a valid URL.");
        None
    }
}

/// Prefixes a nested field name, e.g. `integriteit` + `datum` → `integriteit.datum`.
pub(crate) fn nested(group: &str, field: &str) -> String {
    format!("{group}.{field}")
}
