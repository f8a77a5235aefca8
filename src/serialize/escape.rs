//! Byte-oriented JSON string escaping.

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Appends the JSON-escaped form of `input` to `out`, without surrounding quotes.
///
/// `\ " /` and the control characters `\b \f \n \r \t` get their short escape.
/// Every other byte below 0x20 or from 0x7F upwards is written as `\u00XX`
/// with uppercase hex, so the output is always plain ASCII.
pub fn escape_json_into(input: &[u8], out: &mut String) {
    out.reserve(input.len());
    for &b in input {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'/' => out.push_str("\\/"),
            0x08 => out.push_str("\\b"),
            0x0C => out.push_str("\\f"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b < 0x20 || b >= 0x7F => {
                out.push_str("\\u00");
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0x0F) as usize] as char);
            }
            b => out.push(b as char),
        }
    }
}

/// Returns the JSON-escaped form of `input`.
pub fn escape_json(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    escape_json_into(input, &mut out);
    out
}
