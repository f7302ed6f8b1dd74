//! PDF text string encoding.
//!
//! Text strings (field names, values) are UTF-16BE when they start with the `FE FF`
//! byte order mark, UTF-8 when they start with `EF BB BF` (PDF 2.0), and a
//! single-byte encoding otherwise. The single-byte case is read as Latin-1, which
//! agrees with PDFDocEncoding for every printable ASCII and most accented letters.

/// Decode the bytes of a PDF text string.
///
/// Invalid UTF-16 or UTF-8 sequences are replaced with U+FFFD. A trailing odd byte
/// in UTF-16 data is dropped.
///
/// ```
/// # use pdf_acroform::encoding::decode_text_string;
/// assert_eq!(decode_text_string(b"John"), "John");
/// assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x4A, 0x00, 0xE9]), "J\u{e9}");
/// assert_eq!(decode_text_string(b"\xEF\xBB\xBFna\xC3\xAFve"), "na\u{ef}ve");
/// ```
pub fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode text as UTF-16BE with a leading byte order mark.
///
/// ```
/// # use pdf_acroform::encoding::encode_text_string;
/// assert_eq!(encode_text_string("A"), vec![0xFE, 0xFF, 0x00, 0x41]);
/// assert_eq!(encode_text_string(""), vec![0xFE, 0xFF]);
/// ```
pub fn encode_text_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + text.len() * 2);
    out.extend_from_slice(&[0xFE, 0xFF]);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
