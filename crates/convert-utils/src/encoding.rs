//! Character encoding detection and conversion for text-like inputs.

use encoding_rs::Encoding;

/// Detect encoding from a byte string and decode to UTF-8.
/// BOMs win; otherwise valid UTF-8 is taken as is and anything else is
/// read as Windows-1252.
pub fn decode_to_utf8(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (result, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (result.into_owned(), encoding.name());
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(_) => {
            let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (result.into_owned(), "windows-1252")
        }
    }
}

/// Decode bytes using a specific encoding label (e.g. "windows-1255").
pub fn decode_with_encoding(bytes: &[u8], encoding_name: &str) -> Option<String> {
    let encoding = Encoding::for_label(encoding_name.as_bytes())?;
    let (result, _, _) = encoding.decode(bytes);
    Some(result.into_owned())
}

/// Decode with a forced label when one is configured, falling back to
/// detection if the label is unknown.
pub fn decode_text(bytes: &[u8], forced: Option<&str>) -> String {
    if let Some(label) = forced {
        match decode_with_encoding(bytes, label) {
            Some(text) => return text,
            None => log::warn!("Unknown encoding '{}', detecting instead", label),
        }
    }
    let (text, detected) = decode_to_utf8(bytes);
    log::trace!("Decoded text input as {}", detected);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let (text, enc) = decode_to_utf8("שלום world".as_bytes());
        assert_eq!(text, "שלום world");
        assert_eq!(enc, "UTF-8");
    }

    #[test]
    fn test_decode_boms() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Hello");
        assert_eq!(decode_to_utf8(&bytes), ("Hello".to_string(), "UTF-8"));

        let utf16 = [0xFF, 0xFE, b'H', 0x00, b'i', 0x00];
        assert_eq!(decode_to_utf8(&utf16), ("Hi".to_string(), "UTF-16LE"));
    }

    #[test]
    fn test_decode_legacy_fallback() {
        // 0xE9 is 'é' in Windows-1252 and invalid as lone UTF-8
        let (text, enc) = decode_to_utf8(b"caf\xE9");
        assert_eq!(text, "café");
        assert_eq!(enc, "windows-1252");
    }

    #[test]
    fn test_decode_text_forced() {
        // 0xF9 0xEC 0xE5 0xED is "שלום" in Windows-1255
        assert_eq!(decode_text(b"\xF9\xEC\xE5\xED", Some("windows-1255")), "שלום");
        assert_eq!(decode_text(b"plain", Some("no-such-label")), "plain");
        assert_eq!(decode_with_encoding(b"Hello", "nonexistent"), None);
    }
}
