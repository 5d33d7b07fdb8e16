//! Greedy line breaking for cell text

use crate::font::Font;

/// Break `text` into lines no wider than `max_width` points
///
/// Embedded newlines (`\n`, `\r\n`, `\r`) always break. Within a paragraph
/// runs of whitespace collapse to one space and lines break between words;
/// a word wider than the line on its own is broken between characters.
/// Always returns at least one line.
pub fn wrap_text(text: &str, font: Font, size: f64, max_width: f64) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();

    for paragraph in normalized.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut lines);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(paragraph: &str, font: Font, size: f64, max_width: f64, lines: &mut Vec<String>) {
    let space = font.text_width(" ", size);
    let mut line = String::new();
    let mut line_width = 0.0;

    for word in paragraph.split_whitespace() {
        let word_width = font.text_width(word, size);

        if !line.is_empty() {
            if line_width + space + word_width <= max_width {
                line.push(' ');
                line.push_str(word);
                line_width += space + word_width;
                continue;
            }
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if word_width <= max_width {
            line.push_str(word);
            line_width = word_width;
        } else {
            // Long word: fill lines character by character, keep the rest open
            for c in word.chars() {
                let w = font.text_width(c.encode_utf8(&mut [0u8; 4]), size);
                if !line.is_empty() && line_width + w > max_width {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                line.push(c);
                line_width += w;
            }
        }
    }

    lines.push(line);
}
