//! Decoder for base64 document content (`inhoud`).

use crate::validation::FieldError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Decodes `encoded` and checks the result against the declared size, if any.
///
/// A `data:<mime>;base64,` prefix is dropped and ASCII whitespace (line-wrapped base64) is
/// ignored before decoding. Errors are reported on `inhoud` (`incorrect-base64-padding`,
/// `invalid`) or on `bestandsomvang` (`file-size`).
pub fn decode_inhoud(encoded: &str, declared_size: Option<u64>) -> Result<Vec<u8>, FieldError> {
    let payload = match encoded.split_once(";base64,") {
        Some((_header, data)) => data,
        None => encoded,
    };
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if compact.len() % 4 != 0 {
        return Err(FieldError::new(
            "inhoud",
            "incorrect-base64-padding",
            "The base64 content has incorrect padding.",
        ));
    }

    let bytes = STANDARD.decode(&compact).map_err(|e| {
        tracing::debug!("rejecting inhoud: {e}");
        FieldError::new("inhoud", "invalid", "The content is not valid base64.")
    })?;

    if let Some(expected) = declared_size {
        if expected != bytes.len() as u64 {
            return Err(FieldError::new(
                "bestandsomvang",
                "file-size",
                format!(
                    "The declared size ({expected} bytes) does not match the content ({} bytes).",
                    bytes.len()
                ),
            ));
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_correctly_padded_content() {
        let bytes = decode_inhoud("c29tZSBmaWxlIGNvbnRlbnQ=", Some(17)).expect("valid");
        assert_eq!(bytes, b"some file content");
    }

    #[test]
    fn missing_trailing_padding_is_rejected() {
        let err = decode_inhoud("c29tZSBmaWxlIGNvbnRlbnQ", Some(17)).unwrap_err();
        assert_eq!(err.name, "inhoud");
        assert_eq!(err.code, "incorrect-base64-padding");
    }

    #[test]
    fn line_wrapped_content_is_accepted() {
        assert_eq!(decode_inhoud("aGVs\nbG8=", Some(5)).unwrap(), b"hello");
        assert_eq!(decode_inhoud("aGVs\r\nbG8=\n", Some(5)).unwrap(), b"hello");
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        let bytes = decode_inhoud("data:text/plain;base64,aGVsbG8=", Some(5)).unwrap();
        assert_eq!(bytes, b"hello");

        let err = decode_inhoud("data:text/plain;base64,aGVsbG8", None).unwrap_err();
        assert_eq!(err.code, "incorrect-base64-padding");
    }

    #[test]
    fn malformed_alphabet_is_invalid() {
        let err = decode_inhoud("c29t!!!!", None).unwrap_err();
        assert_eq!(err.code, "invalid");
    }

    #[test]
    fn size_mismatch_is_reported_on_bestandsomvang() {
        let err = decode_inhoud("aGVsbG8gd29ybGQ=", Some(17)).unwrap_err();
        assert_eq!(err.name, "bestandsomvang");
        assert_eq!(err.code, "file-size");
    }

    #[test]
    fn size_is_optional() {
        assert_eq!(decode_inhoud("", None).unwrap(), Vec::<u8>::new());
        assert_eq!(decode_inhoud("YWFhYWE=", None).unwrap(), b"aaaaa");
    }
}
