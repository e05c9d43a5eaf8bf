// src/capture/decode.rs

use encoding_rs::Encoding;

use crate::capture::filter::LineFilter;

/// Decode raw bytes with the given encoding. Never fails; malformed input is
/// replaced with U+FFFD.
pub fn decode_bytes(raw: &[u8], encoding: &'static Encoding) -> String {
    // Chunks are single lines, so a leading BOM must not switch encodings.
    let (text, _had_errors) = encoding.decode_without_bom_handling(raw);
    text.into_owned()
}

/// Turn one raw output chunk into a filtered, right-trimmed line.
///
/// Filters see the line without its terminating `\n`, so `$` anchors at the
/// end of the text. Returns `None` when a filter pattern vetoes the line.
pub fn decode_line(raw: &[u8], encoding: &'static Encoding, filter: &LineFilter) -> Option<String> {
    let text = decode_bytes(raw, encoding);
    let line = text.strip_suffix('\n').unwrap_or(&text);
    filter.keep(line).map(|line| line.trim_end().to_string())
}
