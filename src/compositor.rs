//! Sprite compositor.
//!
//! Every entry point reads the sprite's premultiplied copy and funnels each
//! sample through [`composite`]. Callers make sure the copy is up to date
//! (see `SpriteStore::prepare`).

use crate::math2d::{Matrix2D, Point2f};
use crate::pixel::{BlendColour, BlendMode, Pixel};
use crate::pixel_buffer::PixelBuffer;
use crate::sprite::{PremultState, Sprite};

/// Blend one premultiplied sample onto a destination pixel
#[inline]
fn composite(dst: &mut Pixel, src: Pixel, multiply: Option<&BlendColour>, mode: BlendMode) {
    let src = match multiply {
        Some(m) => m.apply(src),
        None => src,
    };
    if src.a == 0 {
        return;
    }
    *dst = mode.blend(*dst, src);
}

/// Multiply colour to apply per sample, or None for the fast path
#[inline]
fn active_multiply(multiply: &BlendColour) -> Option<&BlendColour> {
    multiply.needs_multiply().then_some(multiply)
}

/// Rectangle copy from `src` (region at `src_x, src_y`, `w` x `h`) to the
/// target with its bottom-left at `(dst_x, dst_y)`, clipped to the target.
fn blit_region(
    target: &mut PixelBuffer,
    src: &PixelBuffer,
    src_x: u32,
    src_y: u32,
    w: u32,
    h: u32,
    dst_x: i32,
    dst_y: i32,
    premultiply: bool,
    multiply: Option<&BlendColour>,
    mode: BlendMode,
) {
    let start_x = dst_x.max(0);
    let end_x = (dst_x + w as i32).min(target.width() as i32);
    let start_y = dst_y.max(0);
    let end_y = (dst_y + h as i32).min(target.height() as i32);
    if start_x >= end_x || start_y >= end_y {
        return;
    }
    let len = (end_x - start_x) as usize;
    let skip = (start_x - dst_x) as u32;

    for y in start_y..end_y {
        let sy = src_y + (y - dst_y) as u32;
        let src_from = src.index(src_x + skip, sy);
        let dst_from = target.index(start_x as u32, y as u32);
        let src_row = &src.pixels()[src_from..src_from + len];
        let dst_row = &mut target.pixels_mut()[dst_from..dst_from + len];
        for (d, &s) in dst_row.iter_mut().zip(src_row) {
            let s = if premultiply { s.premultiplied() } else { s };
            composite(d, s, multiply, mode);
        }
    }
}

// ============================================================================
// Sprite entry points
// ============================================================================

/// Axis-aligned draw with the sprite origin at `pos` (rounded to whole pixels)
pub fn draw_transparent(
    target: &mut PixelBuffer,
    sprite: &Sprite,
    frame: u32,
    pos: Point2f,
    multiply: &BlendColour,
    mode: BlendMode,
) {
    sprite.check_frame(frame);
    debug_assert_eq!(sprite.premult_state(), PremultState::Clean);

    let (ox, oy) = sprite.origin_px();
    let (fx, fy) = sprite.frame_corner(frame);
    blit_region(
        target,
        sprite.premultiplied(),
        fx,
        fy,
        sprite.frame_width(),
        sprite.frame_height(),
        pos.x.round() as i32 - ox,
        pos.y.round() as i32 - oy,
        false,
        active_multiply(multiply),
        mode,
    );
}

/// Draw a frame through an arbitrary affine transform.
///
/// `transform` maps sprite-local coordinates, measured from the sprite
/// origin, into target coordinates. The destination area is the clipped
/// bounding box of the transformed frame; each destination pixel centre is
/// mapped back through the inverse (stepped along the row) and sampled
/// nearest-neighbour. A singular transform draws nothing.
pub fn draw_transformed(
    target: &mut PixelBuffer,
    sprite: &Sprite,
    frame: u32,
    transform: &Matrix2D,
    multiply: &BlendColour,
    mode: BlendMode,
) {
    sprite.check_frame(frame);
    debug_assert_eq!(sprite.premult_state(), PremultState::Clean);

    let Some(inverse) = transform.inverse() else {
        return;
    };
    let Some((min_x, min_y, max_x, max_y)) = transformed_bounds(sprite, transform)
        .and_then(|bounds| clip_bounds(bounds, target.width(), target.height()))
    else {
        return;
    };

    let multiply = active_multiply(multiply);
    let (ox, oy) = sprite.origin_px();
    let (ox, oy) = (ox as f32, oy as f32);
    let (fw, fh) = (sprite.frame_width() as i32, sprite.frame_height() as i32);
    let (fx, fy) = sprite.frame_corner(frame);
    let source = sprite.premultiplied();
    let width = target.width() as usize;

    for y in min_y..max_y {
        let start = inverse.transform_point(Point2f::new(min_x as f32 + 0.5, y as f32 + 0.5));
        let mut u = start.x + ox;
        let mut v = start.y + oy;

        let row_from = y as usize * width;
        let row = &mut target.pixels_mut()[row_from + min_x as usize..row_from + max_x as usize];
        for dst in row {
            let (sx, sy) = (u.floor() as i32, v.floor() as i32);
            if sx >= 0 && sy >= 0 && sx < fw && sy < fh {
                let src = source.pixels()[source.index(fx + sx as u32, fy + sy as u32)];
                composite(dst, src, multiply, mode);
            }
            u += inverse.a;
            v += inverse.b;
        }
    }
}

/// Blit a straight-alpha buffer with its bottom-left at `pos`, premultiplying
/// on the fly and applying an overall opacity.
pub fn draw_pixel_data(
    target: &mut PixelBuffer,
    data: &PixelBuffer,
    pos: Point2f,
    alpha: f32,
    mode: BlendMode,
) {
    let multiply = BlendColour::alpha(alpha);
    blit_region(
        target,
        data,
        0,
        0,
        data.width(),
        data.height(),
        pos.x.round() as i32,
        pos.y.round() as i32,
        true,
        active_multiply(&multiply),
        mode,
    );
}

// ============================================================================
// Bounds
// ============================================================================

/// Bounding box of a frame under `transform` as `(min_x, min_y, max_x, max_y)`
/// in whole pixels, max exclusive. None if the corners are not finite.
pub(crate) fn transformed_bounds(sprite: &Sprite, transform: &Matrix2D) -> Option<(i32, i32, i32, i32)> {
    let (ox, oy) = sprite.origin_px();
    let left = -ox as f32;
    let bottom = -oy as f32;
    let right = left + sprite.frame_width() as f32;
    let top = bottom + sprite.frame_height() as f32;

    let corners = [
        Point2f::new(left, bottom),
        Point2f::new(right, bottom),
        Point2f::new(left, top),
        Point2f::new(right, top),
    ]
    .map(|c| transform.transform_point(c));

    let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
    let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for c in &corners {
        x0 = x0.min(c.x);
        y0 = y0.min(c.y);
        x1 = x1.max(c.x);
        y1 = y1.max(c.y);
    }
    if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
        return None;
    }
    Some((
        x0.floor() as i32,
        y0.floor() as i32,
        x1.ceil() as i32,
        y1.ceil() as i32,
    ))
}

/// Clip a box to `0..width` x `0..height`; None if nothing is left
fn clip_bounds(
    (x0, y0, x1, y1): (i32, i32, i32, i32),
    width: u32,
    height: u32,
) -> Option<(i32, i32, i32, i32)> {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(width as i32);
    let y1 = y1.min(height as i32);
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math2d::Vector2f;
    use crate::sprite::SpriteId;
    use std::f32::consts::FRAC_PI_2;

    fn sprite_from(buf: PixelBuffer, h: u32, v: u32) -> Sprite {
        let mut s = Sprite::new(SpriteId(0), "test", buf, h, v);
        s.ensure_premultiplied();
        s
    }

    /// 3x1 strip: red, green, blue from left to right
    fn rgb_strip() -> Sprite {
        sprite_from(
            PixelBuffer::from_pixels(3, 1, vec![Pixel::RED, Pixel::GREEN, Pixel::BLUE]),
            1,
            1,
        )
    }

    fn checker(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                let c = if (x + y) % 2 == 0 {
                    Pixel::rgb(x as u8 * 10, y as u8 * 10, 77)
                } else {
                    Pixel::rgba(200, 100, 50, 128)
                };
                buf.set_pixel(x, y, c);
            }
        }
        buf
    }

    #[test]
    fn test_opaque_sprite_reproduced_exactly() {
        let mut src = PixelBuffer::new(4, 3);
        for (i, p) in src.pixels_mut().iter_mut().enumerate() {
            *p = Pixel::rgb(i as u8 * 20, 255 - i as u8, 9);
        }
        let sprite = sprite_from(src.clone(), 1, 1);
        let mut target = PixelBuffer::filled(10, 10, Pixel::BLACK);
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::new(2.0, 5.0),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(target.pixel(2 + x, 5 + y), src.pixel(x, y));
            }
        }
        assert_eq!(target.pixel(1, 5), Some(Pixel::BLACK));
    }

    #[test]
    fn test_origin_offsets_placement() {
        let mut sprite = rgb_strip();
        sprite.set_origin(Vector2f::new(1.0, 0.0), false);
        let mut target = PixelBuffer::new(8, 2);
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::new(4.0, 1.0),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
        assert_eq!(target.pixel(3, 1), Some(Pixel::RED));
        assert_eq!(target.pixel(4, 1), Some(Pixel::GREEN));
        assert_eq!(target.pixel(5, 1), Some(Pixel::BLUE));
    }

    #[test]
    fn test_frame_selection() {
        // 2x1 grid of 1x1 frames: frame 1 is the right cell
        let sprite = sprite_from(
            PixelBuffer::from_pixels(2, 1, vec![Pixel::RED, Pixel::BLUE]),
            2,
            1,
        );
        let mut target = PixelBuffer::new(2, 2);
        draw_transparent(
            &mut target,
            &sprite,
            1,
            Point2f::zero(),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
        assert_eq!(target.pixel(0, 0), Some(Pixel::BLUE));
    }

    #[test]
    fn test_partially_offscreen_is_clipped() {
        let sprite = sprite_from(PixelBuffer::filled(4, 4, Pixel::RED), 1, 1);
        let mut target = PixelBuffer::new(4, 4);
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::new(-2.0, 3.0),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
        let red = target.pixels().iter().filter(|&&p| p == Pixel::RED).count();
        assert_eq!(red, 2);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let sprite = rgb_strip();
        let mut target = PixelBuffer::new(10, 10);
        let m = Matrix2D::rotation(FRAC_PI_2) * Matrix2D::translation(5.0, 5.0);
        draw_transformed(&mut target, &sprite, 0, &m, &BlendColour::WHITE, BlendMode::Normal);
        assert_eq!(target.pixel(4, 5), Some(Pixel::RED));
        assert_eq!(target.pixel(4, 6), Some(Pixel::GREEN));
        assert_eq!(target.pixel(4, 7), Some(Pixel::BLUE));
        let drawn = target.pixels().iter().filter(|p| p.a != 0).count();
        assert_eq!(drawn, 3);
    }

    #[test]
    fn test_identity_transform_matches_transparent() {
        let sprite = sprite_from(checker(6, 5), 1, 1);
        let mut a = PixelBuffer::filled(12, 12, Pixel::rgb(30, 60, 90));
        let mut b = a.clone();
        draw_transparent(
            &mut a,
            &sprite,
            0,
            Point2f::new(3.0, 4.0),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
        let m = Matrix2D::scale(1.0, 1.0) * Matrix2D::rotation(0.0) * Matrix2D::translation(3.0, 4.0);
        draw_transformed(&mut b, &sprite, 0, &m, &BlendColour::WHITE, BlendMode::Normal);
        assert_eq!(a, b);
    }

    #[test]
    fn test_singular_transform_draws_nothing() {
        let sprite = rgb_strip();
        let mut target = PixelBuffer::new(8, 8);
        let before = target.clone();
        let m = Matrix2D::scale(0.0, 3.0) * Matrix2D::translation(4.0, 4.0);
        draw_transformed(&mut target, &sprite, 0, &m, &BlendColour::WHITE, BlendMode::Normal);
        assert_eq!(target, before);
    }

    #[test]
    fn test_scale_two_doubles_footprint() {
        let sprite = sprite_from(PixelBuffer::filled(2, 2, Pixel::GREEN), 1, 1);
        let mut target = PixelBuffer::new(10, 10);
        let m = Matrix2D::scale(2.0, 2.0) * Matrix2D::translation(1.0, 1.0);
        draw_transformed(&mut target, &sprite, 0, &m, &BlendColour::WHITE, BlendMode::Normal);
        let green = target.pixels().iter().filter(|&&p| p == Pixel::GREEN).count();
        assert_eq!(green, 16);
        assert_eq!(target.pixel(1, 1), Some(Pixel::GREEN));
        assert_eq!(target.pixel(4, 4), Some(Pixel::GREEN));
        assert_eq!(target.pixel(5, 5), Some(Pixel::TRANSPARENT));
    }

    #[test]
    fn test_transparent_samples_skipped() {
        let sprite = sprite_from(
            PixelBuffer::from_pixels(2, 1, vec![Pixel::TRANSPARENT, Pixel::WHITE]),
            1,
            1,
        );
        let mut target = PixelBuffer::filled(2, 1, Pixel::rgb(10, 20, 30));
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::zero(),
            &BlendColour::WHITE,
            BlendMode::Add,
        );
        assert_eq!(target.pixel(0, 0), Some(Pixel::rgb(10, 20, 30)));
        assert_eq!(target.pixel(1, 0), Some(Pixel::WHITE));
    }

    #[test]
    fn test_global_multiply_half_alpha() {
        let sprite = sprite_from(PixelBuffer::filled(1, 1, Pixel::WHITE), 1, 1);
        let mut target = PixelBuffer::filled(1, 1, Pixel::BLACK);
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::zero(),
            &BlendColour::alpha(0.5),
            BlendMode::Normal,
        );
        let p = target.pixel(0, 0).unwrap();
        assert_eq!(p.r, 127);
        assert_eq!(p.a, 255);
    }

    #[test]
    fn test_multiply_above_one_alone_is_ignored() {
        let sprite = sprite_from(PixelBuffer::filled(1, 1, Pixel::GREY), 1, 1);
        let mut target = PixelBuffer::new(1, 1);
        draw_transparent(
            &mut target,
            &sprite,
            0,
            Point2f::zero(),
            &BlendColour::new(2.0, 2.0, 2.0, 1.0),
            BlendMode::Normal,
        );
        assert_eq!(target.pixel(0, 0), Some(Pixel::GREY));
    }

    #[test]
    fn test_pixel_data_premultiplied_on_the_fly() {
        let data = PixelBuffer::filled(2, 2, Pixel::rgba(255, 0, 0, 128));
        let mut target = PixelBuffer::filled(4, 4, Pixel::BLACK);
        draw_pixel_data(&mut target, &data, Point2f::new(1.0, 1.0), 1.0, BlendMode::Normal);
        assert_eq!(target.pixel(1, 1), Some(Pixel::rgb(128, 0, 0)));
        assert_eq!(target.pixel(0, 0), Some(Pixel::BLACK));
        assert_eq!(target.pixel(3, 3), Some(Pixel::BLACK));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bad_frame_panics() {
        let sprite = rgb_strip();
        let mut target = PixelBuffer::new(4, 4);
        draw_transparent(
            &mut target,
            &sprite,
            1,
            Point2f::zero(),
            &BlendColour::WHITE,
            BlendMode::Normal,
        );
    }
}
