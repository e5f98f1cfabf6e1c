//! Decoding of delimited-text input bytes

use encoding_rs::UTF_8;
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;

/// Decodes raw file bytes into text.
///
/// UTF-8 (with or without a byte-order mark) is decoded as-is. Anything that is
/// not valid UTF-8 is taken to be Windows-1252, which is what spreadsheet tools on
/// Windows emit when "CSV" is chosen without an explicit encoding.
pub(crate) fn decode(bytes: &[u8]) -> Cow<'_, str> {
    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(strip_bom(bytes)) {
        return text;
    }
    let (text, _, _) = WINDOWS_1252.decode(bytes);
    text
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

/// Longest prefix of `text` that is at most `limit` bytes and ends on a char boundary.
pub(crate) fn prefix(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
