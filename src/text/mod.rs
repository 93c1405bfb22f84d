//! Text rendering: the built-in debug font and sprite-sheet fonts.
//!
//! A sprite font is an ordinary sprite whose frame index is the character
//! code, so a 16x8 sheet covers ASCII. Text positions follow the sprite
//! origin like any other draw; with the default origin `pos` is the
//! bottom-left of the first glyph cell. Drawing functions return the x
//! position after the text.

pub mod debug_font;

use crate::compositor;
use crate::math2d::{Matrix2D, Point2f};
use crate::pixel::{BlendColour, BlendMode};
use crate::pixel_buffer::PixelBuffer;
use crate::sprite::Sprite;

/// Frame for `c`, or None when the sheet has no cell for it
#[inline]
fn glyph_frame(font: &Sprite, c: char) -> Option<u32> {
    let code = c as u32;
    (code < font.total_frames()).then_some(code)
}

/// Advance of one glyph: rightmost inked column plus one pixel of spacing.
/// Empty cells advance half the cell width; unmapped codes advance nothing.
pub fn char_width(font: &Sprite, c: char) -> i32 {
    let Some(frame) = glyph_frame(font, c) else {
        return 0;
    };
    let (fw, fh) = (font.frame_width() as i32, font.frame_height() as i32);
    let rightmost = (0..fw)
        .rev()
        .find(|&x| (0..fh).any(|y| font.frame_alpha(frame, x, y) > 0));
    match rightmost {
        Some(x) => x + 2,
        None => fw / 2,
    }
}

pub fn string_width(font: &Sprite, text: &str) -> i32 {
    text.chars().map(|c| char_width(font, c)).sum()
}

/// Draw one glyph at `pos`; returns the x position after it
pub fn draw_char(
    target: &mut PixelBuffer,
    font: &Sprite,
    pos: Point2f,
    c: char,
    multiply: &BlendColour,
    mode: BlendMode,
) -> i32 {
    let x = pos.x.round() as i32;
    let Some(frame) = glyph_frame(font, c) else {
        return x;
    };
    compositor::draw_transparent(target, font, frame, pos, multiply, mode);
    x + char_width(font, c)
}

/// Draw one glyph rotated about the font origin. Returns the scaled advance,
/// since the baseline is no longer horizontal.
pub fn draw_char_rotated(
    target: &mut PixelBuffer,
    font: &Sprite,
    pos: Point2f,
    angle: f32,
    scale: f32,
    c: char,
    multiply: &BlendColour,
    mode: BlendMode,
) -> i32 {
    let Some(frame) = glyph_frame(font, c) else {
        return 0;
    };
    let transform =
        Matrix2D::scale(scale, scale) * Matrix2D::rotation(angle) * Matrix2D::translation(pos.x, pos.y);
    compositor::draw_transformed(target, font, frame, &transform, multiply, mode);
    (char_width(font, c) as f32 * scale) as i32
}

pub fn draw_string(
    target: &mut PixelBuffer,
    font: &Sprite,
    pos: Point2f,
    text: &str,
    multiply: &BlendColour,
    mode: BlendMode,
) -> i32 {
    let mut x = pos.x.round() as i32;
    for c in text.chars() {
        x = draw_char(target, font, Point2f::new(x as f32, pos.y), c, multiply, mode);
    }
    x
}

/// `draw_string` shifted left by half the string width
pub fn draw_string_centred(
    target: &mut PixelBuffer,
    font: &Sprite,
    pos: Point2f,
    text: &str,
    multiply: &BlendColour,
    mode: BlendMode,
) -> i32 {
    let x = pos.x.round() as i32 - string_width(font, text) / 2;
    draw_string(target, font, Point2f::new(x as f32, pos.y), text, multiply, mode)
}
