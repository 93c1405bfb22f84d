//! Sprite sheets and the store that owns them.
//!
//! A sprite is a sheet image cut into an `h_count` x `v_count` grid of equal
//! frames. Frames are numbered in row-major order starting at the top-left
//! cell of the image. Alongside the canvas each sprite keeps a copy
//! premultiplied by its own alpha (and its tint), rebuilt lazily.

mod store;

pub use store::SpriteStore;

use std::fmt;

use crate::math2d::Vector2f;
use crate::pixel::Pixel;
use crate::pixel_buffer::PixelBuffer;

/// Stable index of a sprite in its store. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteId(pub(crate) usize);

impl SpriteId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether the premultiplied copy matches the canvas and tint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PremultState {
    Clean,
    Dirty,
}

/// One sprite sheet
#[derive(Debug, Clone)]
pub struct Sprite {
    id: SpriteId,
    name: String,
    frame_width: u32,
    frame_height: u32,
    h_count: u32,
    v_count: u32,
    total_frames: u32,
    sheet_height: u32,
    origin_x: i32,
    origin_y: i32,
    canvas: PixelBuffer,
    premultiplied: PixelBuffer,
    premult_state: PremultState,
    premult_builds: u32,
    tint: Pixel,
}

impl Sprite {
    pub(crate) fn new(
        id: SpriteId,
        name: impl Into<String>,
        canvas: PixelBuffer,
        h_count: u32,
        v_count: u32,
    ) -> Self {
        let mut sprite = Self {
            id,
            name: name.into(),
            frame_width: 0,
            frame_height: 0,
            h_count: 0,
            v_count: 0,
            total_frames: 0,
            sheet_height: 0,
            origin_x: 0,
            origin_y: 0,
            canvas: PixelBuffer::default(),
            premultiplied: PixelBuffer::default(),
            premult_state: PremultState::Dirty,
            premult_builds: 0,
            tint: Pixel::WHITE,
        };
        sprite.set_canvas(canvas, h_count, v_count);
        sprite
    }

    /// Swap in a new sheet; id, name, origin and tint are kept
    pub(crate) fn set_canvas(&mut self, canvas: PixelBuffer, h_count: u32, v_count: u32) {
        assert!(
            h_count > 0 && v_count > 0,
            "sprite '{}': grid must be at least 1x1, got {}x{}",
            self.name,
            h_count,
            v_count
        );
        assert!(
            canvas.width() >= h_count && canvas.height() >= v_count,
            "sprite '{}': {}x{} canvas is too small for a {}x{} grid",
            self.name,
            canvas.width(),
            canvas.height(),
            h_count,
            v_count
        );
        self.frame_width = canvas.width() / h_count;
        self.frame_height = canvas.height() / v_count;
        self.h_count = h_count;
        self.v_count = v_count;
        self.total_frames = h_count * v_count;
        self.sheet_height = canvas.height();
        self.canvas = canvas;
        self.premult_state = PremultState::Dirty;
    }

    #[inline]
    pub fn id(&self) -> SpriteId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    #[inline]
    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    #[inline]
    pub fn h_count(&self) -> u32 {
        self.h_count
    }

    #[inline]
    pub fn v_count(&self) -> u32 {
        self.v_count
    }

    #[inline]
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Frame size in pixels
    pub fn size(&self) -> Vector2f {
        Vector2f::new(self.frame_width as f32, self.frame_height as f32)
    }

    /// Rotation/placement anchor, relative to a frame's bottom-left corner
    pub fn origin(&self) -> Vector2f {
        Vector2f::new(self.origin_x as f32, self.origin_y as f32)
    }

    #[inline]
    pub(crate) fn origin_px(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub(crate) fn set_origin(&mut self, origin: Vector2f, relative: bool) {
        let (x, y) = (origin.x.round() as i32, origin.y.round() as i32);
        if relative {
            self.origin_x += x;
            self.origin_y += y;
        } else {
            self.origin_x = x;
            self.origin_y = y;
        }
    }

    /// Convert a y-down origin to y-up
    pub(crate) fn flip_origin_vertically(&mut self) {
        self.origin_y = self.frame_height as i32 - self.origin_y;
    }

    pub(crate) fn centre_origin(&mut self) {
        self.origin_x = (self.frame_width / 2) as i32;
        self.origin_y = (self.frame_height / 2) as i32;
    }

    #[inline]
    pub fn canvas(&self) -> &PixelBuffer {
        &self.canvas
    }

    #[inline]
    pub fn premultiplied(&self) -> &PixelBuffer {
        &self.premultiplied
    }

    #[inline]
    pub fn premult_state(&self) -> PremultState {
        self.premult_state
    }

    /// How many times the premultiplied copy has been rebuilt
    #[inline]
    pub fn premult_builds(&self) -> u32 {
        self.premult_builds
    }

    #[inline]
    pub fn tint(&self) -> Pixel {
        self.tint
    }

    pub(crate) fn set_tint(&mut self, tint: Pixel) {
        let tint = Pixel { a: 255, ..tint };
        if tint != self.tint {
            self.tint = tint;
            self.premult_state = PremultState::Dirty;
        }
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.premult_state = PremultState::Dirty;
    }

    /// Rebuild the premultiplied copy if the canvas or tint changed
    pub(crate) fn ensure_premultiplied(&mut self) {
        if self.premult_state == PremultState::Clean {
            return;
        }
        assert!(
            !self.canvas.is_empty(),
            "sprite '{}': canvas is checked out as a render target",
            self.name
        );
        let tint = self.tint;
        let pixels = self
            .canvas
            .pixels()
            .iter()
            .map(|p| p.premultiplied().tinted(tint))
            .collect();
        self.premultiplied =
            PixelBuffer::from_pixels(self.canvas.width(), self.canvas.height(), pixels);
        self.premult_state = PremultState::Clean;
        self.premult_builds += 1;
        log::debug!(
            "premultiplied sprite {} '{}' (build {})",
            self.id,
            self.name,
            self.premult_builds
        );
    }

    /// Panic unless `frame` addresses a cell of this sheet
    #[inline]
    pub(crate) fn check_frame(&self, frame: u32) {
        assert!(
            frame < self.total_frames,
            "sprite '{}': frame {} out of range (sheet has {} frames)",
            self.name,
            frame,
            self.total_frames
        );
    }

    /// Bottom-left corner of a frame in sheet storage coordinates. Valid for
    /// both the canvas and the premultiplied copy, even while the canvas is
    /// checked out.
    #[inline]
    pub(crate) fn frame_corner(&self, frame: u32) -> (u32, u32) {
        let col = frame % self.h_count;
        let row_from_top = frame / self.h_count;
        (
            col * self.frame_width,
            self.sheet_height - (row_from_top + 1) * self.frame_height,
        )
    }

    /// Sheet alpha at frame-local (x, y); outside the frame is transparent.
    /// While the canvas is checked out the clean premultiplied copy is
    /// sampled instead, since premultiplying and tinting keep alpha.
    #[inline]
    pub(crate) fn frame_alpha(&self, frame: u32, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.frame_width as i32 || y >= self.frame_height as i32 {
            return 0;
        }
        let source = if !self.canvas.is_empty() {
            &self.canvas
        } else {
            assert!(
                self.premult_state == PremultState::Clean,
                "sprite '{}': canvas is checked out as a render target",
                self.name
            );
            &self.premultiplied
        };
        let (fx, fy) = self.frame_corner(frame);
        let idx = source.index(fx + x as u32, fy + y as u32);
        source.pixels()[idx].a
    }

    /// Lend the canvas out as a render target
    pub(crate) fn take_canvas(&mut self) -> PixelBuffer {
        std::mem::take(&mut self.canvas)
    }

    pub(crate) fn restore_canvas(&mut self, canvas: PixelBuffer) {
        assert!(
            self.canvas.is_empty(),
            "sprite '{}': canvas restored twice",
            self.name
        );
        assert!(
            canvas.width() / self.h_count == self.frame_width
                && canvas.height() / self.v_count == self.frame_height,
            "sprite '{}': restored canvas does not match the sheet",
            self.name
        );
        self.canvas = canvas;
        self.premult_state = PremultState::Dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h);
        for y in 0..h as i32 {
            for x in 0..w as i32 {
                buf.set_pixel(x, y, Pixel::rgba(x as u8, y as u8, 0, 255));
            }
        }
        buf
    }

    #[test]
    fn test_grid_metadata() {
        let s = Sprite::new(SpriteId(0), "tiles_10x10", PixelBuffer::new(200, 100), 10, 10);
        assert_eq!(s.frame_width(), 20);
        assert_eq!(s.frame_height(), 10);
        assert_eq!(s.total_frames(), 100);
        assert_eq!(s.premult_state(), PremultState::Dirty);
    }

    #[test]
    fn test_frames_start_top_left() {
        // 2x2 grid of 4x4 frames; frame 0 is the top-left cell
        let s = Sprite::new(SpriteId(0), "quad_2x2", sheet(8, 8), 2, 2);
        assert_eq!(s.frame_corner(0), (0, 4));
        assert_eq!(s.frame_corner(1), (4, 4));
        assert_eq!(s.frame_corner(2), (0, 0));
        assert_eq!(s.frame_corner(3), (4, 0));
    }

    #[test]
    fn test_frame_alpha_outside_is_transparent() {
        let s = Sprite::new(SpriteId(0), "solid", sheet(4, 4), 1, 1);
        assert_eq!(s.frame_alpha(0, 0, 0), 255);
        assert_eq!(s.frame_alpha(0, 4, 0), 0);
        assert_eq!(s.frame_alpha(0, -1, 2), 0);
    }

    #[test]
    fn test_premultiply_is_lazy_and_counted() {
        let mut s = Sprite::new(SpriteId(0), "s", sheet(4, 4), 1, 1);
        assert_eq!(s.premult_builds(), 0);
        s.ensure_premultiplied();
        s.ensure_premultiplied();
        assert_eq!(s.premult_builds(), 1);
        assert_eq!(s.premult_state(), PremultState::Clean);

        s.set_tint(Pixel::WHITE);
        assert_eq!(s.premult_state(), PremultState::Clean, "same tint keeps cache");
        s.set_tint(Pixel::RED);
        assert_eq!(s.premult_state(), PremultState::Dirty);
        s.ensure_premultiplied();
        assert_eq!(s.premult_builds(), 2);
        assert!(s.premultiplied().pixels().iter().all(|p| p.g == 0 && p.b == 0));
    }

    #[test]
    fn test_origin_helpers() {
        let mut s = Sprite::new(SpriteId(0), "s", PixelBuffer::new(10, 6), 1, 1);
        s.centre_origin();
        assert_eq!(s.origin(), Vector2f::new(5.0, 3.0));
        s.set_origin(Vector2f::new(1.0, -1.0), true);
        assert_eq!(s.origin(), Vector2f::new(6.0, 2.0));
        s.flip_origin_vertically();
        assert_eq!(s.origin(), Vector2f::new(6.0, 4.0));
        s.set_origin(Vector2f::new(-3.0, 20.0), false);
        assert_eq!(s.origin(), Vector2f::new(-3.0, 20.0));
    }

    #[test]
    fn test_frame_lookup_while_canvas_checked_out() {
        let mut s = Sprite::new(SpriteId(0), "quad_2x2", sheet(8, 8), 2, 2);
        s.ensure_premultiplied();
        let canvas = s.take_canvas();
        assert_eq!(s.frame_corner(0), (0, 4));
        assert_eq!(s.frame_corner(3), (4, 0));
        assert_eq!(s.frame_alpha(1, 2, 2), 255);
        s.restore_canvas(canvas);
        assert_eq!(s.premult_state(), PremultState::Dirty);
    }

    #[test]
    #[should_panic(expected = "checked out")]
    fn test_frame_alpha_on_dirty_checked_out_sprite_panics() {
        let mut s = Sprite::new(SpriteId(0), "s", sheet(4, 4), 1, 1);
        let _canvas = s.take_canvas();
        s.frame_alpha(0, 1, 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_bad_frame_panics() {
        let s = Sprite::new(SpriteId(0), "bat_4", PixelBuffer::new(16, 4), 4, 1);
        s.check_frame(4);
    }

    #[test]
    #[should_panic(expected = "at least 1x1")]
    fn test_zero_grid_panics() {
        let _ = Sprite::new(SpriteId(0), "bad", PixelBuffer::new(16, 4), 0, 1);
    }
}
