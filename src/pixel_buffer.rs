//! RGBA pixel buffer and primitive rasterizer.
//!
//! Coordinates are y-up: `(0, 0)` is the bottom-left pixel and row 0 of
//! storage is the bottom row. Adapters for top-down formats (PNG, SDL
//! textures) go through `to_rgba_bytes_top_down` / `from_rgba_bytes_top_down`.

use crate::pixel::{BlendMode, Pixel};

// ============================================================================
// PixelBuffer
// ============================================================================

/// Owned width x height array of pixels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<Pixel>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a buffer cleared to transparent black
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Pixel::TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, colour: Pixel) -> Self {
        Self {
            pixels: vec![colour; (width * height) as usize],
            width,
            height,
        }
    }

    /// Wrap existing bottom-up pixel data
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height) as usize,
            "PixelBuffer::from_pixels: {} pixels supplied for a {}x{} buffer",
            pixels.len(),
            width,
            height
        );
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Build from tightly packed RGBA bytes whose first row is the top row
    pub fn from_rgba_bytes_top_down(width: u32, height: u32, bytes: &[u8]) -> Self {
        assert_eq!(
            bytes.len(),
            (width * height * 4) as usize,
            "PixelBuffer::from_rgba_bytes_top_down: byte count does not match {}x{}",
            width,
            height
        );
        let mut pixels = Vec::with_capacity((width * height) as usize);
        if width > 0 {
            for row in bytes.chunks_exact(width as usize * 4).rev() {
                pixels.extend(
                    row.chunks_exact(4)
                        .map(|c| Pixel::rgba(c[0], c[1], c[2], c[3])),
                );
            }
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Tightly packed RGBA bytes, top row first
    pub fn to_rgba_bytes_top_down(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.rows_top_down() {
            for p in row {
                bytes.extend_from_slice(&[p.r, p.g, p.b, p.a]);
            }
        }
        bytes
    }

    /// Rows from the top of the image down
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width.max(1) as usize).rev()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Index of pixel (x, y); caller guarantees bounds
    #[inline]
    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Fill every pixel with one colour
    pub fn clear(&mut self, colour: Pixel) {
        self.pixels.fill(colour);
    }

    /// Read a pixel. Returns None if out of bounds
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Pixel> {
        if self.in_bounds(x, y) {
            Some(self.pixels[self.index(x as u32, y as u32)])
        } else {
            None
        }
    }

    /// Overwrite a pixel (bounds checked, no blending)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, colour: Pixel) {
        if self.in_bounds(x, y) {
            let idx = self.index(x as u32, y as u32);
            self.pixels[idx] = colour;
        }
    }

    /// Write one pixel through a blend mode. Out-of-bounds is a no-op
    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, colour: Pixel, mode: BlendMode) {
        if self.in_bounds(x, y) {
            let idx = self.index(x as u32, y as u32);
            self.pixels[idx] = mode.apply_opaque(self.pixels[idx], colour);
        }
    }

    /// Draw a horizontal span, clipped once up front
    pub fn hline(&mut self, x1: i32, x2: i32, y: i32, colour: Pixel, mode: BlendMode) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let from = self.index(start as u32, y as u32);
        let to = self.index(end as u32, y as u32);
        match mode {
            BlendMode::Normal => self.pixels[from..=to].fill(colour),
            _ => {
                for p in &mut self.pixels[from..=to] {
                    *p = mode.apply_opaque(*p, colour);
                }
            },
        }
    }

    /// Draw a vertical span, clipped once up front
    pub fn vline(&mut self, x: i32, y1: i32, y2: i32, colour: Pixel, mode: BlendMode) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let (y1, y2) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        let start = y1.max(0);
        let end = y2.min(self.height as i32 - 1);
        if start > end {
            return;
        }

        let stride = self.width as usize;
        let mut idx = self.index(x as u32, start as u32);
        for _ in start..=end {
            self.pixels[idx] = mode.apply_opaque(self.pixels[idx], colour);
            idx += stride;
        }
    }

    /// Draw a line using Bresenham's algorithm with Cohen-Sutherland clipping
    ///
    /// Clips to buffer bounds first, then draws without per-pixel bounds checks.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, colour: Pixel, mode: BlendMode) {
        let Some((cx0, cy0, cx1, cy1)) = self.clip_line(x0, y0, x1, y1) else {
            return;
        };

        let dx = (cx1 - cx0).abs();
        let dy = -((cy1 - cy0).abs());
        let sx = if cx0 < cx1 { 1i32 } else { -1i32 };
        let sy = if cy0 < cy1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = cx0;
        let mut y = cy0;

        loop {
            let idx = self.index(x as u32, y as u32);
            self.pixels[idx] = mode.apply_opaque(self.pixels[idx], colour);
            if x == cx1 && y == cy1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Cohen-Sutherland line clipping
    /// Returns the clipped endpoints, or None if the line misses the buffer
    fn clip_line(
        &self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
    ) -> Option<(i32, i32, i32, i32)> {
        const INSIDE: u8 = 0;
        const LEFT: u8 = 1;
        const RIGHT: u8 = 2;
        const BOTTOM: u8 = 4;
        const TOP: u8 = 8;
        // Converges in at most 4 iterations for valid input
        const MAX_ITERATIONS: u32 = 16;

        if self.width == 0 || self.height == 0 {
            return None;
        }
        let w = self.width as i64;
        let h = self.height as i64;

        let outcode = |x: i32, y: i32| -> u8 {
            let (x, y) = (x as i64, y as i64);
            let mut code = INSIDE;
            if x < 0 {
                code |= LEFT;
            } else if x >= w {
                code |= RIGHT;
            }
            if y < 0 {
                code |= BOTTOM;
            } else if y >= h {
                code |= TOP;
            }
            code
        };

        let mut code0 = outcode(x0, y0);
        let mut code1 = outcode(x1, y1);

        for _ in 0..MAX_ITERATIONS {
            if (code0 | code1) == 0 {
                return Some((x0, y0, x1, y1));
            }
            if (code0 & code1) != 0 {
                return None;
            }

            let code_out = if code0 != 0 { code0 } else { code1 };
            // i64 so long off-screen lines cannot overflow the products
            let (ax, ay) = (x0 as i64, y0 as i64);
            let dx = x1 as i64 - ax;
            let dy = y1 as i64 - ay;

            let (x, y) = if (code_out & TOP) != 0 {
                if dy == 0 {
                    return None;
                }
                (ax + dx * (h - 1 - ay) / dy, h - 1)
            } else if (code_out & BOTTOM) != 0 {
                if dy == 0 {
                    return None;
                }
                (ax + dx * (0 - ay) / dy, 0)
            } else if (code_out & RIGHT) != 0 {
                if dx == 0 {
                    return None;
                }
                (w - 1, ay + dy * (w - 1 - ax) / dx)
            } else {
                if dx == 0 {
                    return None;
                }
                (0, ay + dy * (0 - ax) / dx)
            };

            let (x, y) = (x as i32, y as i32);
            if code_out == code0 {
                x0 = x;
                y0 = y;
                code0 = outcode(x0, y0);
            } else {
                x1 = x;
                y1 = y;
                code1 = outcode(x1, y1);
            }
        }

        None
    }

    /// Rectangle between two corners (inclusive), outline or filled
    pub fn rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        colour: Pixel,
        mode: BlendMode,
        fill: bool,
    ) {
        let (left, right) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (bottom, top) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };

        if fill {
            let first = bottom.max(0);
            let last = top.min(self.height as i32 - 1);
            for y in first..=last {
                self.hline(left, right, y, colour, mode);
            }
            return;
        }

        self.hline(left, right, bottom, colour, mode);
        if top != bottom {
            self.hline(left, right, top, colour, mode);
        }
        // Sides skip the corners already drawn by the spans
        if top - bottom > 1 {
            self.vline(left, bottom + 1, top - 1, colour, mode);
            if right != left {
                self.vline(right, bottom + 1, top - 1, colour, mode);
            }
        }
    }

    /// Draw a circle outline (midpoint algorithm)
    pub fn circle(&mut self, cx: i32, cy: i32, radius: i32, colour: Pixel, mode: BlendMode) {
        if radius < 0 {
            return;
        }
        if radius == 0 {
            self.plot(cx, cy, colour, mode);
            return;
        }
        // Trivially rejected when the bounding box misses the buffer
        if cx + radius < 0
            || cy + radius < 0
            || cx - radius >= self.width as i32
            || cy - radius >= self.height as i32
        {
            return;
        }
        let inside = cx - radius >= 0
            && cy - radius >= 0
            && cx + radius < self.width as i32
            && cy + radius < self.height as i32;

        let mut x = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while x >= y {
            let octants = [
                (cx + x, cy + y),
                (cx + y, cy + x),
                (cx - y, cy + x),
                (cx - x, cy + y),
                (cx - x, cy - y),
                (cx - y, cy - x),
                (cx + y, cy - x),
                (cx + x, cy - y),
            ];
            for (i, &(px, py)) in octants.iter().enumerate() {
                // On the axes and diagonals two octants land on the same pixel
                if (y == 0 && i % 2 == 1) || (x == y && i % 2 == 1) {
                    continue;
                }
                if inside {
                    let idx = self.index(px as u32, py as u32);
                    self.pixels[idx] = mode.apply_opaque(self.pixels[idx], colour);
                } else {
                    self.plot(px, py, colour, mode);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    /// Copy another buffer onto this one with its bottom-left at (x, y)
    pub fn blit_from(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        let src_w = src.width as i32;
        let dst_w = self.width as i32;
        let start_x = x.max(0);
        let end_x = (x + src_w).min(dst_w);
        if start_x >= end_x {
            return;
        }

        for sy in 0..src.height as i32 {
            let dy = y + sy;
            if dy < 0 || dy >= self.height as i32 {
                continue;
            }
            let src_from = src.index((start_x - x) as u32, sy as u32);
            let dst_from = self.index(start_x as u32, dy as u32);
            let len = (end_x - start_x) as usize;
            self.pixels[dst_from..dst_from + len]
                .copy_from_slice(&src.pixels[src_from..src_from + len]);
        }
    }
}
