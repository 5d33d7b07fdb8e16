//! Text escaping shared by the reader and writer
//!
//! SpreadsheetML stores characters XML cannot carry (control characters, a
//! bare CR) as `_xHHHH_`. A literal underscore that would otherwise read as
//! such a sequence is itself stored as `_x005F_`.

/// Decode Excel's `_xHHHH_` escape sequences in strings.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('_') {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_escape(tail) {
            Some(decoded) => {
                result.push(decoded);
                rest = &tail[7..];
            }
            None => {
                result.push('_');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);

    result
}

/// Encode a string so that [`decode_excel_escapes`] returns it unchanged
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        match c {
            '_' if parse_escape(&s[i..]).is_some() => result.push_str("_x005F_"),
            '\t' | '\n' => result.push(c),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {
                result.push_str(&format!("_x{:04X}_", c as u32));
            }
            c => result.push(c),
        }
    }

    result
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    result
}

// `s` starts with '_'
fn parse_escape(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || bytes[1] != b'x' || bytes[6] != b'_' {
        return None;
    }
    if !bytes[2..6].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    u32::from_str_radix(&s[2..6], 16)
        .ok()
        .and_then(char::from_u32)
}
