//! Pixel-exact overlap test for two transformed sprite frames

use crate::compositor::transformed_bounds;
use crate::math2d::{Matrix2D, Point2f};
use crate::sprite::Sprite;

/// True if some pixel inside both transformed frames is opaque in both.
///
/// Bounding boxes are compared first. Within their intersection each pixel
/// centre is mapped back into both frames and the canvas alpha sampled;
/// both alphas must be strictly greater than `alpha_threshold`. Cost is
/// O(overlap area). Singular transforms never collide.
pub fn sprites_collide(
    a: &Sprite,
    frame_a: u32,
    transform_a: &Matrix2D,
    b: &Sprite,
    frame_b: u32,
    transform_b: &Matrix2D,
    alpha_threshold: u8,
) -> bool {
    a.check_frame(frame_a);
    b.check_frame(frame_b);

    let (Some(box_a), Some(box_b)) = (
        transformed_bounds(a, transform_a),
        transformed_bounds(b, transform_b),
    ) else {
        return false;
    };
    let x0 = box_a.0.max(box_b.0);
    let y0 = box_a.1.max(box_b.1);
    let x1 = box_a.2.min(box_b.2);
    let y1 = box_a.3.min(box_b.3);
    if x0 >= x1 || y0 >= y1 {
        return false;
    }

    let (Some(inv_a), Some(inv_b)) = (transform_a.inverse(), transform_b.inverse()) else {
        return false;
    };
    let (oax, oay) = a.origin_px();
    let (obx, oby) = b.origin_px();

    for y in y0..y1 {
        for x in x0..x1 {
            let centre = Point2f::new(x as f32 + 0.5, y as f32 + 0.5);
            let la = inv_a.transform_point(centre);
            let alpha_a = a.frame_alpha(
                frame_a,
                (la.x + oax as f32).floor() as i32,
                (la.y + oay as f32).floor() as i32,
            );
            if alpha_a <= alpha_threshold {
                continue;
            }
            let lb = inv_b.transform_point(centre);
            let alpha_b = b.frame_alpha(
                frame_b,
                (lb.x + obx as f32).floor() as i32,
                (lb.y + oby as f32).floor() as i32,
            );
            if alpha_b > alpha_threshold {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Pixel;
    use crate::pixel_buffer::PixelBuffer;
    use crate::sprite::SpriteId;
    use std::f32::consts::FRAC_PI_4;

    const THRESHOLD: u8 = 16;

    fn solid(w: u32, h: u32) -> Sprite {
        Sprite::new(SpriteId(0), "solid", PixelBuffer::filled(w, h, Pixel::WHITE), 1, 1)
    }

    /// 4x4 frame opaque only in its bottom-left and top-right pixels
    fn corners() -> Sprite {
        let mut buf = PixelBuffer::new(4, 4);
        buf.set_pixel(0, 0, Pixel::WHITE);
        buf.set_pixel(3, 3, Pixel::WHITE);
        Sprite::new(SpriteId(1), "corners", buf, 1, 1)
    }

    #[test]
    fn test_same_sprite_same_place_collides() {
        let s = solid(8, 8);
        let m = Matrix2D::translation(10.0, 10.0);
        assert!(sprites_collide(&s, 0, &m, &s, 0, &m, THRESHOLD));
    }

    #[test]
    fn test_disjoint_boxes_never_collide() {
        let s = solid(8, 8);
        let a = Matrix2D::translation(0.0, 0.0);
        let b = Matrix2D::translation(8.0, 0.0);
        assert!(!sprites_collide(&s, 0, &a, &s, 0, &b, THRESHOLD));
    }

    #[test]
    fn test_transparent_frames_never_collide() {
        let empty = Sprite::new(SpriteId(0), "empty", PixelBuffer::new(8, 8), 1, 1);
        let s = solid(8, 8);
        let m = Matrix2D::identity();
        assert!(!sprites_collide(&empty, 0, &m, &s, 0, &m, THRESHOLD));
        assert!(!sprites_collide(&empty, 0, &m, &empty, 0, &m, THRESHOLD));
    }

    #[test]
    fn test_boxes_overlap_but_pixels_do_not() {
        let c = corners();
        let dot = solid(1, 1);
        // Inside the corners' box but on one of its empty pixels
        let a = Matrix2D::identity();
        let b = Matrix2D::translation(1.0, 2.0);
        assert!(!sprites_collide(&c, 0, &a, &dot, 0, &b, THRESHOLD));
        let b = Matrix2D::translation(3.0, 3.0);
        assert!(sprites_collide(&c, 0, &a, &dot, 0, &b, THRESHOLD));
    }

    #[test]
    fn test_alpha_threshold_is_strict() {
        let faint = Sprite::new(
            SpriteId(0),
            "faint",
            PixelBuffer::filled(2, 2, Pixel::rgba(255, 255, 255, THRESHOLD)),
            1,
            1,
        );
        let s = solid(2, 2);
        let m = Matrix2D::identity();
        assert!(!sprites_collide(&faint, 0, &m, &s, 0, &m, THRESHOLD));
        assert!(sprites_collide(&faint, 0, &m, &s, 0, &m, THRESHOLD - 1));
    }

    #[test]
    fn test_rotated_sprites() {
        let s = solid(10, 2);
        let mut centred = s.clone();
        centred.centre_origin();
        let a = Matrix2D::rotation(FRAC_PI_4) * Matrix2D::translation(20.0, 20.0);
        let b = Matrix2D::rotation(-FRAC_PI_4) * Matrix2D::translation(20.0, 20.0);
        assert!(sprites_collide(&centred, 0, &a, &centred, 0, &b, THRESHOLD));
        let far = Matrix2D::translation(60.0, 60.0);
        assert!(!sprites_collide(&centred, 0, &a, &centred, 0, &far, THRESHOLD));
    }

    #[test]
    fn test_singular_transform_never_collides() {
        let s = solid(4, 4);
        let flat = Matrix2D::scale(1.0, 0.0);
        assert!(!sprites_collide(&s, 0, &flat, &s, 0, &Matrix2D::identity(), THRESHOLD));
    }
}
