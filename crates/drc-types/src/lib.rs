//! Validated primitive types shared by the DRC crates.
//!
//! Each type guarantees its invariant once constructed, so code holding one never has to
//! re-check it:
//! - [`NonEmptyText`]: trimmed text with at least one non-whitespace character
//! - [`Rsin`]: a 9-digit Dutch organisation number that passes the eleven-test
//! - [`PostalCode`]: a postal code of exactly [`POSTAL_CODE_LENGTH`] characters

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// RSIN
// ============================================================================

/// Errors produced when validating an RSIN.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RsinError {
    #[error("RSIN must be exactly 9 characters")]
    InvalidLength,
    #[error("RSIN must contain only digits")]
    OnlyDigits,
    #[error("RSIN fails the eleven-test")]
    ElevenTest,
}

impl RsinError {
    /// Machine-readable code reported to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            RsinError::InvalidLength => "invalid-length",
            RsinError::OnlyDigits => "only-digits",
            RsinError::ElevenTest => "invalid",
        }
    }
}

/// Dutch "Rechtspersonen en Samenwerkingsverbanden Informatienummer".
///
/// The eleven-test weighs the first eight digits 9..=2 and the last digit -1; the sum must be
/// divisible by 11.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rsin(String);

impl Rsin {
    pub const LENGTH: usize = 9;

    pub fn new(input: impl AsRef<str>) -> Result<Self, RsinError> {
        let input = input.as_ref();
        if input.len() != Self::LENGTH {
            return Err(RsinError::InvalidLength);
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RsinError::OnlyDigits);
        }

        let total: i64 = input
            .bytes()
            .enumerate()
            .map(|(i, b)| {
                let digit = i64::from(b - b'0');
                let weight = if i == Self::LENGTH - 1 {
                    -1
                } else {
                    (Self::LENGTH - i) as i64
                };
                digit * weight
            })
            .sum();

        if total % 11 != 0 {
            return Err(RsinError::ElevenTest);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Rsin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Rsin {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Rsin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rsin::new(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Postal code
// ============================================================================

/// Required length of every postal code field.
pub const POSTAL_CODE_LENGTH: usize = 6;

/// Errors produced when validating a postal code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostalCodeError {
    #[error("Postal code must be exactly 6 characters.")]
    InvalidLength,
}

/// A Dutch-style postal code (`1234AB`), checked for length only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    pub fn new(input: impl AsRef<str>) -> Result<Self, PostalCodeError> {
        let input = input.as_ref();
        if input.chars().count() != POSTAL_CODE_LENGTH {
            return Err(PostalCodeError::InvalidLength);
        }
        Ok(Self(input.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for PostalCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PostalCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PostalCode::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  titel  ").expect("valid text");
        assert_eq!(text.as_str(), "titel");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn rsin_accepts_valid_numbers() {
        assert!(Rsin::new("159351741").is_ok());
        assert!(Rsin::new("319582462").is_ok());
    }

    #[test]
    fn rsin_rejects_wrong_length() {
        assert_eq!(Rsin::new("12345678"), Err(RsinError::InvalidLength));
        assert_eq!(RsinError::InvalidLength.code(), "invalid-length");
    }

    #[test]
    fn rsin_rejects_non_digits() {
        assert_eq!(Rsin::new("15935174a"), Err(RsinError::OnlyDigits));
    }

    #[test]
    fn rsin_rejects_failed_eleven_test() {
        assert_eq!(Rsin::new("159351742"), Err(RsinError::ElevenTest));
    }

    #[test]
    fn postal_code_requires_six_characters() {
        assert!(PostalCode::new("1800XY").is_ok());
        assert_eq!(
            PostalCode::new("18800RR"),
            Err(PostalCodeError::InvalidLength)
        );
        assert_eq!(
            PostalCodeError::InvalidLength.to_string(),
            "Postal code must be exactly 6 characters."
        );
    }

    #[test]
    fn postal_code_deserialize_validates() {
        let err = serde_json::from_str::<PostalCode>("\"123\"").expect_err("too short");
        assert!(err.to_string().contains("6 characters"));
    }
}
