use super::canvas::write_pixel_rgba_clipped;

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
pub const TEXT_SCALE: i32 = 3;
pub const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;

/// 3x5 bitmaps for ASCII 32..=126, five 3-bit rows packed top row first.
const FONT: [u16; 95] = [
    0x0000, 0x2482, 0x5A00, 0x5F7D, 0x7DDF, 0x52A5, 0x2AAB, 0x2400,
    0x1491, 0x4494, 0x0AA8, 0x05D0, 0x0014, 0x01C0, 0x0002, 0x12A4,
    0x7B6F, 0x2C97, 0x73E7, 0x73CF, 0x5BC9, 0x79CF, 0x79EF, 0x7292,
    0x7BEF, 0x7BCF, 0x0410, 0x0414, 0x1511, 0x0E38, 0x4454, 0x72C2,
    0x7BE7, 0x2BED, 0x6BAE, 0x7927, 0x6B6E, 0x79A7, 0x79A4, 0x796F,
    0x5BED, 0x7497, 0x726F, 0x5BAD, 0x4927, 0x5FED, 0x5FFD, 0x7B6F,
    0x6BA4, 0x7B79, 0x6BAD, 0x79CF, 0x7492, 0x5B6F, 0x5B6A, 0x5BFD,
    0x5AAD, 0x5A92, 0x72A7, 0x6926, 0x4889, 0x324B, 0x2A00, 0x0007,
    0x4400, 0x0E7F, 0x49AE, 0x0F27, 0x13EF, 0x0FA7, 0x39A4, 0x0F79,
    0x49AD, 0x2092, 0x106A, 0x4BAD, 0x4927, 0x0DED, 0x0D6D, 0x0F6F,
    0x0D74, 0x0F79, 0x0D64, 0x0F8F, 0x2E93, 0x0B6F, 0x0B6A, 0x0B7A,
    0x0A95, 0x0B79, 0x0E57, 0x3593, 0x2492, 0x64D6, 0x0780,
];

fn glyph_bits(ch: char) -> Option<u16> {
    let code = u32::from(ch);
    (32..=126)
        .contains(&code)
        .then(|| FONT[(code - 32) as usize])
}

pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

/// Characters without a glyph draw as blanks.
pub fn draw_text(frame: &mut [u8], width: u32, height: u32, mut x: i32, y: i32, text: &str, color: [u8; 4]) {
    for ch in text.chars() {
        if let Some(bits) = glyph_bits(ch) {
            draw_glyph(frame, width, height, x, y, bits, color);
        }
        x += GLYPH_ADVANCE;
    }
}

pub fn draw_text_centered(
    frame: &mut [u8],
    width: u32,
    height: u32,
    center_x: i32,
    center_y: i32,
    text: &str,
    color: [u8; 4],
) {
    let x = center_x - text_width(text) / 2;
    let y = center_y - GLYPH_HEIGHT * TEXT_SCALE / 2;
    draw_text(frame, width, height, x, y, text, color);
}

fn draw_glyph(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, bits: u16, color: [u8; 4]) {
    if width == 0 || height == 0 {
        return;
    }
    for row in 0..GLYPH_HEIGHT {
        let row_bits = (bits >> ((GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH)) & 0b111;
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..TEXT_SCALE {
                for sx in 0..TEXT_SCALE {
                    write_pixel_rgba_clipped(
                        frame,
                        width,
                        height,
                        x + col * TEXT_SCALE + sx,
                        y + row * TEXT_SCALE + sy,
                        color,
                    );
                }
            }
        }
    }
}

/// Greedy word wrap to at most `max_chars` per line. Over-long words are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let split_at = word
                .char_indices()
                .nth(max_chars)
                .map(|(index, _)| index)
                .unwrap_or(word.len());
            let rest = word.split_off(split_at);
            lines.push(word);
            word = rest;
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn chars_that_fit(pixel_width: i32) -> usize {
    (pixel_width / GLYPH_ADVANCE).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_printable_ascii_char_has_a_slot() {
        for code in 33u8..=126u8 {
            let ch = char::from(code);
            assert!(glyph_bits(ch).is_some(), "no glyph for '{ch}'");
        }
        assert_eq!(glyph_bits(' '), Some(0));
        assert_eq!(glyph_bits('\u{e9}'), None);
    }

    #[test]
    fn letters_and_digits_are_not_blank() {
        for ch in "ABCZabcz0123456789:".chars() {
            assert_ne!(glyph_bits(ch), Some(0), "blank glyph for '{ch}'");
        }
    }

    #[test]
    fn unknown_characters_draw_nothing() {
        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_text(&mut frame, 16, 16, 0, 0, "\u{1f642}", [255, 255, 255, 255]);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn clipped_text_is_safe_at_any_origin() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_text(&mut frame, 8, 8, -2, -2, "OPEN", [255, 0, 0, 255]);
        draw_text(&mut frame, 8, 8, 64, 64, "OPEN", [255, 0, 0, 255]);
        let mut empty = Vec::new();
        draw_text(&mut empty, 0, 0, 0, 0, "X", [255, 0, 0, 255]);
        assert_eq!(frame.len(), 8 * 8 * 4);
    }

    #[test]
    fn wrap_respects_width_and_keeps_words() {
        let lines = wrap_text("Do not trust the time. The clock stopped when she left.", 16);
        assert!(lines.iter().all(|line| line.chars().count() <= 16));
        assert_eq!(lines.join(" "), "Do not trust the time. The clock stopped when she left.");
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap_text("   ", 10).is_empty());
    }
}
