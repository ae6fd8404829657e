//! Byte to string decoding with charset detection.

use crate::core::mime::detect_encoding;
use encoding_rs::Encoding;

/// Decode `byte_data` as text.
///
/// An explicit `encoding` label wins when `encoding_rs` knows it. Otherwise the
/// encoding is detected (BOM, then UTF-8 validity, then `chardetng`). A BOM in
/// the data always takes precedence, and malformed sequences become U+FFFD.
pub fn safe_decode(byte_data: &[u8], encoding: Option<&str>) -> String {
    if byte_data.is_empty() {
        return String::new();
    }

    if let Some(label) = encoding
        && let Some(enc) = Encoding::for_label(label.trim().as_bytes())
    {
        let (decoded, _, _) = enc.decode(byte_data);
        return decoded.into_owned();
    }

    let (decoded, _, had_errors) = detect_encoding(byte_data).decode(byte_data);
    if had_errors {
        tracing::debug!("Replaced malformed sequences while decoding {} bytes", byte_data.len());
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_decode_empty() {
        assert_eq!(safe_decode(b"", None), "");
    }

    #[test]
    fn test_safe_decode_ascii() {
        assert_eq!(safe_decode(b"Hello, World!", None), "Hello, World!");
    }

    #[test]
    fn test_safe_decode_explicit_label() {
        assert_eq!(safe_decode(&[0x63, 0x61, 0x66, 0xE9], Some("latin1")), "caf\u{e9}");
        assert_eq!(safe_decode(&[0x63, 0x61, 0x66, 0xE9], Some(" ISO-8859-1 ")), "caf\u{e9}");
    }

    #[test]
    fn test_safe_decode_unknown_label_falls_back_to_detection() {
        assert_eq!(safe_decode("na\u{ef}ve".as_bytes(), Some("no-such-charset")), "na\u{ef}ve");
    }

    #[test]
    fn test_safe_decode_utf16_bom() {
        let bytes = [0xFF, 0xFE, b'h', 0x00, b'i', 0x00];
        assert_eq!(safe_decode(&bytes, None), "hi");
    }

    #[test]
    fn test_safe_decode_strips_utf8_bom() {
        assert_eq!(safe_decode(b"\xEF\xBB\xBFplain", None), "plain");
    }
}
