//! Built-in 8x8 debug font.
//!
//! Glyphs cover ASCII 32..=126; anything else draws as `?`. Each glyph is
//! eight bytes, one per row starting with the top row, MSB is the leftmost
//! pixel. Glyphs are drawn proportionally: blank columns on either side are
//! trimmed and one pixel of spacing follows.

use crate::pixel::{BlendMode, Pixel};
use crate::pixel_buffer::PixelBuffer;

pub const GLYPH_SIZE: i32 = 8;

/// Advance of the space character
const SPACE_ADVANCE: i32 = 4;

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 126;

static FONT_8X8: [u8; 95 * 8] = [
    // Space (32)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    // ! (33)
    0x18, 0x18, 0x18, 0x18, 0x18, 0x00, 0x18, 0x00,
    // " (34)
    0x6C, 0x6C, 0x24, 0x00, 0x00, 0x00, 0x00, 0x00,
    // # (35)
    0x6C, 0x6C, 0xFE, 0x6C, 0xFE, 0x6C, 0x6C, 0x00,
    // $ (36)
    0x18, 0x7E, 0xC0, 0x7C, 0x06, 0xFC, 0x18, 0x00,
    // % (37)
    0x00, 0xC6, 0xCC, 0x18, 0x30, 0x66, 0xC6, 0x00,
    // & (38)
    0x38, 0x6C, 0x38, 0x76, 0xDC, 0xCC, 0x76, 0x00,
    // ' (39)
    0x18, 0x18, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00,
    // ( (40)
    0x0C, 0x18, 0x30, 0x30, 0x30, 0x18, 0x0C, 0x00,
    // ) (41)
    0x30, 0x18, 0x0C, 0x0C, 0x0C, 0x18, 0x30, 0x00,
    // * (42)
    0x00, 0x66, 0x3C, 0xFF, 0x3C, 0x66, 0x00, 0x00,
    // + (43)
    0x00, 0x18, 0x18, 0x7E, 0x18, 0x18, 0x00, 0x00,
    // , (44)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30,
    // - (45)
    0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00,
    // . (46)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00,
    // / (47)
    0x06, 0x0C, 0x18, 0x30, 0x60, 0xC0, 0x80, 0x00,
    // 0 (48)
    0x7C, 0xCE, 0xDE, 0xF6, 0xE6, 0xC6, 0x7C, 0x00,
    // 1 (49)
    0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00,
    // 2 (50)
    0x7C, 0xC6, 0x06, 0x7C, 0xC0, 0xC0, 0xFE, 0x00,
    // 3 (51)
    0xFC, 0x06, 0x06, 0x3C, 0x06, 0x06, 0xFC, 0x00,
    // 4 (52)
    0x0C, 0xCC, 0xCC, 0xCC, 0xFE, 0x0C, 0x0C, 0x00,
    // 5 (53)
    0xFE, 0xC0, 0xFC, 0x06, 0x06, 0xC6, 0x7C, 0x00,
    // 6 (54)
    0x7C, 0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0x7C, 0x00,
    // 7 (55)
    0xFE, 0x06, 0x06, 0x0C, 0x18, 0x18, 0x18, 0x00,
    // 8 (56)
    0x7C, 0xC6, 0xC6, 0x7C, 0xC6, 0xC6, 0x7C, 0x00,
    // 9 (57)
    0x7C, 0xC6, 0xC6, 0x7E, 0x06, 0x06, 0x7C, 0x00,
    // : (58)
    0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x00,
    // ; (59)
    0x00, 0x18, 0x18, 0x00, 0x00, 0x18, 0x18, 0x30,
    // < (60)
    0x0C, 0x18, 0x30, 0x60, 0x30, 0x18, 0x0C, 0x00,
    // = (61)
    0x00, 0x00, 0x7E, 0x00, 0x7E, 0x00, 0x00, 0x00,
    // > (62)
    0x30, 0x18, 0x0C, 0x06, 0x0C, 0x18, 0x30, 0x00,
    // ? (63)
    0x3C, 0x66, 0x0C, 0x18, 0x18, 0x00, 0x18, 0x00,
    // @ (64)
    0x7C, 0xC6, 0xDE, 0xDE, 0xDE, 0xC0, 0x7E, 0x00,
    // A (65)
    0x38, 0x6C, 0xC6, 0xC6, 0xFE, 0xC6, 0xC6, 0x00,
    // B (66)
    0xFC, 0xC6, 0xC6, 0xFC, 0xC6, 0xC6, 0xFC, 0x00,
    // C (67)
    0x7C, 0xC6, 0xC0, 0xC0, 0xC0, 0xC6, 0x7C, 0x00,
    // D (68)
    0xF8, 0xCC, 0xC6, 0xC6, 0xC6, 0xCC, 0xF8, 0x00,
    // E (69)
    0xFE, 0xC0, 0xC0, 0xF8, 0xC0, 0xC0, 0xFE, 0x00,
    // F (70)
    0xFE, 0xC0, 0xC0, 0xF8, 0xC0, 0xC0, 0xC0, 0x00,
    // G (71)
    0x7C, 0xC6, 0xC0, 0xCE, 0xC6, 0xC6, 0x7C, 0x00,
    // H (72)
    0xC6, 0xC6, 0xC6, 0xFE, 0xC6, 0xC6, 0xC6, 0x00,
    // I (73)
    0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00,
    // J (74)
    0x06, 0x06, 0x06, 0x06, 0xC6, 0xC6, 0x7C, 0x00,
    // K (75)
    0xC6, 0xCC, 0xD8, 0xF0, 0xD8, 0xCC, 0xC6, 0x00,
    // L (76)
    0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xC0, 0xFE, 0x00,
    // M (77)
    0xC6, 0xEE, 0xFE, 0xD6, 0xC6, 0xC6, 0xC6, 0x00,
    // N (78)
    0xC6, 0xE6, 0xF6, 0xDE, 0xCE, 0xC6, 0xC6, 0x00,
    // O (79)
    0x7C, 0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0x7C, 0x00,
    // P (80)
    0xFC, 0xC6, 0xC6, 0xFC, 0xC0, 0xC0, 0xC0, 0x00,
    // Q (81)
    0x7C, 0xC6, 0xC6, 0xC6, 0xD6, 0xDE, 0x7C, 0x06,
    // R (82)
    0xFC, 0xC6, 0xC6, 0xFC, 0xD8, 0xCC, 0xC6, 0x00,
    // S (83)
    0x7C, 0xC6, 0xC0, 0x7C, 0x06, 0xC6, 0x7C, 0x00,
    // T (84)
    0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00,
    // U (85)
    0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0xC6, 0x7C, 0x00,
    // V (86)
    0xC6, 0xC6, 0xC6, 0xC6, 0x6C, 0x38, 0x10, 0x00,
    // W (87)
    0xC6, 0xC6, 0xC6, 0xD6, 0xFE, 0xEE, 0xC6, 0x00,
    // X (88)
    0xC6, 0xC6, 0x6C, 0x38, 0x6C, 0xC6, 0xC6, 0x00,
    // Y (89)
    0x66, 0x66, 0x66, 0x3C, 0x18, 0x18, 0x18, 0x00,
    // Z (90)
    0xFE, 0x06, 0x0C, 0x18, 0x30, 0x60, 0xFE, 0x00,
    // [ (91)
    0x3C, 0x30, 0x30, 0x30, 0x30, 0x30, 0x3C, 0x00,
    // \ (92)
    0xC0, 0x60, 0x30, 0x18, 0x0C, 0x06, 0x02, 0x00,
    // ] (93)
    0x3C, 0x0C, 0x0C, 0x0C, 0x0C, 0x0C, 0x3C, 0x00,
    // ^ (94)
    0x10, 0x38, 0x6C, 0xC6, 0x00, 0x00, 0x00, 0x00,
    // _ (95)
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFE,
    // ` (96)
    0x18, 0x18, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00,
    // a (97)
    0x00, 0x00, 0x7C, 0x06, 0x7E, 0xC6, 0x7E, 0x00,
    // b (98)
    0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0xC6, 0xFC, 0x00,
    // c (99)
    0x00, 0x00, 0x7C, 0xC6, 0xC0, 0xC6, 0x7C, 0x00,
    // d (100)
    0x06, 0x06, 0x7E, 0xC6, 0xC6, 0xC6, 0x7E, 0x00,
    // e (101)
    0x00, 0x00, 0x7C, 0xC6, 0xFE, 0xC0, 0x7C, 0x00,
    // f (102)
    0x1C, 0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x00,
    // g (103)
    0x00, 0x00, 0x7E, 0xC6, 0xC6, 0x7E, 0x06, 0x7C,
    // h (104)
    0xC0, 0xC0, 0xFC, 0xC6, 0xC6, 0xC6, 0xC6, 0x00,
    // i (105)
    0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x3C, 0x00,
    // j (106)
    0x18, 0x00, 0x38, 0x18, 0x18, 0x18, 0x18, 0x70,
    // k (107)
    0xC0, 0xC0, 0xC6, 0xCC, 0xF8, 0xCC, 0xC6, 0x00,
    // l (108)
    0x38, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00,
    // m (109)
    0x00, 0x00, 0xEC, 0xFE, 0xD6, 0xC6, 0xC6, 0x00,
    // n (110)
    0x00, 0x00, 0xFC, 0xC6, 0xC6, 0xC6, 0xC6, 0x00,
    // o (111)
    0x00, 0x00, 0x7C, 0xC6, 0xC6, 0xC6, 0x7C, 0x00,
    // p (112)
    0x00, 0x00, 0xFC, 0xC6, 0xC6, 0xFC, 0xC0, 0xC0,
    // q (113)
    0x00, 0x00, 0x7E, 0xC6, 0xC6, 0x7E, 0x06, 0x06,
    // r (114)
    0x00, 0x00, 0xDC, 0xE6, 0xC0, 0xC0, 0xC0, 0x00,
    // s (115)
    0x00, 0x00, 0x7E, 0xC0, 0x7C, 0x06, 0xFC, 0x00,
    // t (116)
    0x30, 0x30, 0x7C, 0x30, 0x30, 0x30, 0x1C, 0x00,
    // u (117)
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0xC6, 0x7E, 0x00,
    // v (118)
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0x6C, 0x38, 0x00,
    // w (119)
    0x00, 0x00, 0xC6, 0xC6, 0xD6, 0xFE, 0x6C, 0x00,
    // x (120)
    0x00, 0x00, 0xC6, 0x6C, 0x38, 0x6C, 0xC6, 0x00,
    // y (121)
    0x00, 0x00, 0xC6, 0xC6, 0xC6, 0x7E, 0x06, 0x7C,
    // z (122)
    0x00, 0x00, 0xFE, 0x0C, 0x38, 0x60, 0xFE, 0x00,
    // { (123)
    0x0E, 0x18, 0x18, 0x70, 0x18, 0x18, 0x0E, 0x00,
    // | (124)
    0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00,
    // } (125)
    0x70, 0x18, 0x18, 0x0E, 0x18, 0x18, 0x70, 0x00,
    // ~ (126)
    0x72, 0x9C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Row bitmaps for `c`, top row first
#[inline]
fn glyph(c: char) -> &'static [u8] {
    let code = match u8::try_from(c) {
        Ok(b) if (FIRST_CHAR..=LAST_CHAR).contains(&b) => b,
        _ => b'?',
    };
    let index = (code - FIRST_CHAR) as usize;
    &FONT_8X8[index * 8..(index + 1) * 8]
}

/// First inked column and inked width, or None for a blank glyph
fn inked_span(rows: &[u8]) -> Option<(u32, u32)> {
    let bits = rows.iter().fold(0u8, |acc, &r| acc | r);
    if bits == 0 {
        return None;
    }
    let left = bits.leading_zeros();
    let right = 7 - bits.trailing_zeros();
    Some((left, right - left + 1))
}

/// Horizontal advance of one character, spacing included
pub fn char_advance(c: char) -> i32 {
    match inked_span(glyph(c)) {
        Some((_, width)) => width as i32 + 1,
        None => SPACE_ADVANCE,
    }
}

pub fn string_width(text: &str) -> i32 {
    text.chars().map(char_advance).sum()
}

/// Draw one character with the bottom-left of its cell at `(x, y)`.
/// Returns the advance.
pub fn draw_char(
    target: &mut PixelBuffer,
    x: i32,
    y: i32,
    c: char,
    colour: Pixel,
    mode: BlendMode,
) -> i32 {
    let rows = glyph(c);
    let Some((left, width)) = inked_span(rows) else {
        return SPACE_ADVANCE;
    };
    for (row, &bits) in rows.iter().enumerate() {
        let py = y + GLYPH_SIZE - 1 - row as i32;
        for col in left..left + width {
            if (bits >> (7 - col)) & 1 != 0 {
                target.plot(x + (col - left) as i32, py, colour, mode);
            }
        }
    }
    width as i32 + 1
}

/// Draw a string from `(x, y)`, or centred on `x`. Returns the x position
/// after the last character.
pub fn draw_string(
    target: &mut PixelBuffer,
    x: i32,
    y: i32,
    text: &str,
    colour: Pixel,
    mode: BlendMode,
    centred: bool,
) -> i32 {
    let mut x = if centred { x - string_width(text) / 2 } else { x };
    for c in text.chars() {
        x += draw_char(target, x, y, c, colour, mode);
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(buf: &PixelBuffer) -> usize {
        buf.pixels().iter().filter(|p| p.a != 0).count()
    }

    #[test]
    fn test_space_and_unknown() {
        assert_eq!(char_advance(' '), SPACE_ADVANCE);
        assert_eq!(char_advance('\u{e9}'), char_advance('?'));
        assert_eq!(char_advance('\n'), char_advance('?'));
    }

    #[test]
    fn test_advance_is_proportional() {
        // '!' is two columns wide, 'W' uses most of the cell
        assert_eq!(char_advance('!'), 3);
        assert!(char_advance('W') > char_advance('i'));
        assert!(char_advance('W') <= GLYPH_SIZE + 1);
    }

    #[test]
    fn test_draw_char_matches_advance() {
        let mut buf = PixelBuffer::new(16, 8);
        let advance = draw_char(&mut buf, 0, 0, '!', Pixel::WHITE, BlendMode::Normal);
        assert_eq!(advance, char_advance('!'));
        // Bar of five rows plus the dot, two pixels wide, trimmed to the left edge
        assert_eq!(lit(&buf), 12);
        assert_eq!(buf.pixel(0, 7), Some(Pixel::WHITE));
        assert_eq!(buf.pixel(1, 1), Some(Pixel::WHITE));
        assert_eq!(buf.pixel(0, 0), Some(Pixel::TRANSPARENT));
        assert_eq!(buf.pixel(2, 7), Some(Pixel::TRANSPARENT));
    }

    #[test]
    fn test_string_returns_end_position() {
        let mut buf = PixelBuffer::new(64, 8);
        let end = draw_string(&mut buf, 5, 0, "Hi !", Pixel::WHITE, BlendMode::Normal, false);
        assert_eq!(end, 5 + string_width("Hi !"));
    }

    #[test]
    fn test_centred_string_shifts_left() {
        let mut a = PixelBuffer::new(64, 8);
        let mut b = PixelBuffer::new(64, 8);
        let w = string_width("AB");
        draw_string(&mut a, 30, 0, "AB", Pixel::RED, BlendMode::Normal, true);
        draw_string(&mut b, 30 - w / 2, 0, "AB", Pixel::RED, BlendMode::Normal, false);
        assert_eq!(a, b);
    }

    #[test]
    fn test_offscreen_text_is_clipped() {
        let mut buf = PixelBuffer::new(4, 4);
        draw_string(&mut buf, -100, -100, "clipped", Pixel::WHITE, BlendMode::Normal, false);
        assert_eq!(lit(&buf), 0);
    }
}
