//! Pixel, global multiply colour and blend-mode arithmetic.
//!
//! Sprite sources arrive here already premultiplied by their own alpha, so
//! every blend mode works on `(premultiplied colour, alpha)` pairs.

use serde::{Deserialize, Serialize};

/// Divide by 255 using the shift approximation `(x + 1 + (x >> 8)) >> 8`.
/// Within one of `x / 255`, and exact for multiples of 255.
#[inline]
pub(crate) fn div255(x: u32) -> u32 {
    (x + 1 + (x >> 8)) >> 8
}

// ============================================================================
// Pixel
// ============================================================================

/// A single RGBA pixel with independent 8-bit channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel::rgba(0, 0, 0, 0);
    pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
    pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);
    pub const GREY: Pixel = Pixel::rgb(128, 128, 128);
    pub const RED: Pixel = Pixel::rgb(255, 0, 0);
    pub const GREEN: Pixel = Pixel::rgb(0, 255, 0);
    pub const BLUE: Pixel = Pixel::rgb(0, 0, 255);
    pub const YELLOW: Pixel = Pixel::rgb(255, 255, 0);
    pub const CYAN: Pixel = Pixel::rgb(0, 255, 255);
    pub const MAGENTA: Pixel = Pixel::rgb(255, 0, 255);
    pub const ORANGE: Pixel = Pixel::rgb(255, 165, 0);

    /// Opaque colour
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour from HSV.
    /// h: 0-360, s: 0-1, v: 0-1
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let c = v * s;
        let h_prime = h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
        let m = v - c;

        let (r1, g1, b1) = match h_prime as i32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        Self::rgb(
            ((r1 + m) * 255.0) as u8,
            ((g1 + m) * 255.0) as u8,
            ((b1 + m) * 255.0) as u8,
        )
    }

    /// Colour channels scaled by this pixel's own alpha
    #[inline]
    pub fn premultiplied(self) -> Self {
        let a = self.a as u32;
        Self {
            r: div255(self.r as u32 * a) as u8,
            g: div255(self.g as u32 * a) as u8,
            b: div255(self.b as u32 * a) as u8,
            a: self.a,
        }
    }

    /// Colour channels multiplied by `tint / 255`; alpha untouched
    #[inline]
    pub fn tinted(self, tint: Pixel) -> Self {
        Self {
            r: div255(self.r as u32 * tint.r as u32) as u8,
            g: div255(self.g as u32 * tint.g as u32) as u8,
            b: div255(self.b as u32 * tint.b as u32) as u8,
            a: self.a,
        }
    }
}

// ============================================================================
// Global multiply
// ============================================================================

/// Per-channel multiplier applied to a sprite as it is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendColour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl BlendColour {
    pub const WHITE: BlendColour = BlendColour::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// White with the given overall opacity
    pub const fn alpha(a: f32) -> Self {
        Self::new(1.0, 1.0, 1.0, a)
    }

    /// The multiply step only runs when some channel is below 1.0.
    /// Values above 1.0 alone never trigger it.
    #[inline]
    pub fn needs_multiply(&self) -> bool {
        self.r < 1.0 || self.g < 1.0 || self.b < 1.0 || self.a < 1.0
    }

    /// Scale a premultiplied source pixel: colour by `rgb * a`, alpha by `a`
    #[inline]
    pub(crate) fn apply(&self, src: Pixel) -> Pixel {
        let scale = |c: u8, m: f32| (c as f32 * m).clamp(0.0, 255.0) as u8;
        Pixel {
            r: scale(src.r, self.r * self.a),
            g: scale(src.g, self.g * self.a),
            b: scale(src.b, self.b * self.a),
            a: scale(src.a, self.a),
        }
    }
}

impl Default for BlendColour {
    fn default() -> Self {
        Self::WHITE
    }
}

// ============================================================================
// Blend Mode
// ============================================================================

/// How a source colour combines with the destination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    /// Premultiplied source-over
    #[default]
    Normal,
    /// dst + src, saturating
    Add,
    /// dst * src / 255, transparent source areas count as white
    Multiply,
    /// dst - src, saturating at zero
    Subtract,
}

impl BlendMode {
    /// Combine a premultiplied source with the destination.
    /// Fully transparent sources must be filtered by the caller.
    #[inline]
    pub fn blend(self, dst: Pixel, src: Pixel) -> Pixel {
        match self {
            BlendMode::Normal => {
                let inv = 255 - src.a as u32;
                let over = |s: u8, d: u8| (s as u32 + div255(d as u32 * inv)).min(255) as u8;
                Pixel {
                    r: over(src.r, dst.r),
                    g: over(src.g, dst.g),
                    b: over(src.b, dst.b),
                    a: over(src.a, dst.a),
                }
            },
            BlendMode::Add => Pixel {
                r: dst.r.saturating_add(src.r),
                g: dst.g.saturating_add(src.g),
                b: dst.b.saturating_add(src.b),
                a: dst.a,
            },
            BlendMode::Multiply => {
                let inv = 255 - src.a as u32;
                let mul = |s: u8, d: u8| div255(d as u32 * (s as u32 + inv).min(255)) as u8;
                Pixel {
                    r: mul(src.r, dst.r),
                    g: mul(src.g, dst.g),
                    b: mul(src.b, dst.b),
                    a: dst.a,
                }
            },
            BlendMode::Subtract => Pixel {
                r: dst.r.saturating_sub(src.r),
                g: dst.g.saturating_sub(src.g),
                b: dst.b.saturating_sub(src.b),
                a: dst.a,
            },
        }
    }

    /// Primitive colour write: Normal replaces the pixel outright, the other
    /// modes combine colour channels treating the source as opaque.
    #[inline]
    pub fn apply_opaque(self, dst: Pixel, colour: Pixel) -> Pixel {
        match self {
            BlendMode::Normal => colour,
            mode => mode.blend(dst, Pixel { a: 255, ..colour }),
        }
    }
}
