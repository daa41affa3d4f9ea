//! Plain text decoding

const UTF8_BOM: &str = "\u{FEFF}";

/// Decode bytes as UTF-8, replacing invalid sequences and dropping a leading BOM.
pub fn decode_text(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    text.strip_prefix(UTF8_BOM).unwrap_or(&text).to_string()
}
