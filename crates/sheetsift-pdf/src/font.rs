//! Standard 14 Helvetica fonts: glyph widths and WinAnsi encoding
//!
//! Reports use the two built-in Helvetica faces so no font program has to
//! be embedded. Text is encoded as WinAnsi (Windows-1252); widths come from
//! the Adobe font metrics, in thousandths of the font size.

/// Built-in fonts used by the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica
    Helvetica,
    /// Helvetica-Bold
    HelveticaBold,
}

/// Glyph widths for U+0020..=U+007E, Helvetica
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Glyph widths for U+0020..=U+007E, Helvetica-Bold
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Windows-1252 bytes 0x80..=0x9F and the characters they stand for
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Byte written for characters WinAnsi cannot represent
pub const REPLACEMENT: u8 = b'?';

impl Font {
    /// Resource name used in content streams
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// PostScript name of the standard font
    pub fn base_font(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of one character in thousandths of the font size
    ///
    /// Exact for ASCII. Other Latin characters are approximated by the
    /// width of a typical letter of the same case.
    pub fn char_width(self, c: char) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            c if c.is_uppercase() => 722,
            _ => match self {
                Font::Helvetica => 556,
                Font::HelveticaBold => 611,
            },
        }
    }

    /// Width of a string in points at the given size
    pub fn text_width(self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * size / 1000.0
    }
}

/// Encode a character as a WinAnsi byte
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => Some(c as u8),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|&(_, b)| b),
    }
}

/// Encode text as WinAnsi, substituting [`REPLACEMENT`] for anything else
///
/// Returns the bytes and how many characters were substituted.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(text.len());
    let mut substituted = 0;
    for c in text.chars() {
        match win_ansi_byte(c) {
            Some(b) => out.push(b),
            None if c == '\t' => out.push(b' '),
            None => {
                out.push(REPLACEMENT);
                substituted += 1;
            }
        }
    }
    (out, substituted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(Font::Helvetica.char_width(' '), 278);
        assert_eq!(Font::Helvetica.char_width('W'), 944);
        assert_eq!(Font::Helvetica.char_width('~'), 584);
        assert_eq!(Font::HelveticaBold.char_width('a'), 556);
        assert_eq!(Font::HelveticaBold.char_width('b'), 611);
    }

    #[test]
    fn test_text_width() {
        // "Hi" = 722 + 222 thousandths
        let w = Font::Helvetica.text_width("Hi", 10.0);
        assert!((w - 9.44).abs() < 1e-9);
        assert_eq!(Font::Helvetica.text_width("", 9.0), 0.0);
    }

    #[test]
    fn test_digits_are_tabular() {
        for font in [Font::Helvetica, Font::HelveticaBold] {
            for c in '0'..='9' {
                assert_eq!(font.char_width(c), 556, "{font:?} {c:?}");
            }
        }
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(win_ansi_byte('A'), Some(0x41));
        assert_eq!(win_ansi_byte('é'), Some(0xE9));
        assert_eq!(win_ansi_byte('€'), Some(0x80));
        assert_eq!(win_ansi_byte('—'), Some(0x97));
        assert_eq!(win_ansi_byte('✓'), None);
        assert_eq!(win_ansi_byte('\u{81}'), None);
    }

    #[test]
    fn test_encode_substitutes() {
        let (bytes, substituted) = encode_win_ansi("a✓b\tc");
        assert_eq!(bytes, b"a?b c".to_vec());
        assert_eq!(substituted, 1);
    }
}
