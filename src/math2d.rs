//! 2D math for sprite placement
//!
//! Points use a y-up coordinate system with the origin at the bottom-left
//! of the render target.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// 2D vector (positions, sizes and offsets)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

/// Positions are plain vectors
pub type Point2f = Vector2f;

impl Vector2f {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            *self
        }
    }

    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Approximate equality check for floating point comparison
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl From<(f32, f32)> for Vector2f {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Vector2f {
    fn from((x, y): (i32, i32)) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
        }
    }
}

impl Add for Vector2f {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vector2f {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector2f {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Vector2f {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Vector2f {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f32> for Vector2f {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Mul<Vector2f> for f32 {
    type Output = Vector2f;
    #[inline]
    fn mul(self, v: Vector2f) -> Vector2f {
        v * self
    }
}

// ============================================================================
// Matrix2D
// ============================================================================

/// 2x3 affine transform.
///
/// ```text
/// x' = a * x + c * y + tx
/// y' = b * x + d * y + ty
/// ```
///
/// `A * B` applies `A` first, then `B`, so `scale * rotate * translate`
/// reads in the order the operations happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

/// Determinants smaller than this are treated as singular
const SINGULAR_EPSILON: f32 = 1e-8;

impl Matrix2D {
    pub const IDENTITY: Matrix2D = Matrix2D {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    #[inline]
    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    #[inline]
    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            tx: x,
            ty: y,
            ..Self::IDENTITY
        }
    }

    /// Counter-clockwise rotation (radians) in y-up space
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Apply `self`, then `next`
    pub fn then(&self, next: &Matrix2D) -> Matrix2D {
        Matrix2D {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            tx: next.a * self.tx + next.c * self.ty + next.tx,
            ty: next.b * self.tx + next.d * self.ty + next.ty,
        }
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` when the matrix collapses area to zero
    pub fn inverse(&self) -> Option<Matrix2D> {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = self.d * inv_det;
        let b = -self.b * inv_det;
        let c = -self.c * inv_det;
        let d = self.a * inv_det;
        Some(Matrix2D {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    #[inline]
    pub fn transform_point(&self, p: Point2f) -> Point2f {
        Point2f {
            x: self.a * p.x + self.c * p.y + self.tx,
            y: self.b * p.x + self.d * p.y + self.ty,
        }
    }

    /// Transform a direction (translation ignored)
    #[inline]
    pub fn transform_vector(&self, v: Vector2f) -> Vector2f {
        Vector2f {
            x: self.a * v.x + self.c * v.y,
            y: self.b * v.x + self.d * v.y,
        }
    }

    /// Translation component
    #[inline]
    pub fn position(&self) -> Point2f {
        Point2f::new(self.tx, self.ty)
    }
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix2D {
    type Output = Matrix2D;
    #[inline]
    fn mul(self, rhs: Matrix2D) -> Matrix2D {
        self.then(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_rotation_quarter_turn() {
        let p = Matrix2D::rotation(FRAC_PI_2).transform_point(Point2f::new(1.0, 0.0));
        assert!(p.approx_eq(&Point2f::new(0.0, 1.0), EPS), "{:?}", p);
    }

    #[test]
    fn test_composition_order() {
        // Scale first, then translate
        let m = Matrix2D::scale(2.0, 2.0) * Matrix2D::translation(10.0, 5.0);
        let p = m.transform_point(Point2f::new(1.0, 1.0));
        assert!(p.approx_eq(&Point2f::new(12.0, 7.0), EPS), "{:?}", p);

        // Translate first, then scale
        let m = Matrix2D::translation(10.0, 5.0) * Matrix2D::scale(2.0, 2.0);
        let p = m.transform_point(Point2f::new(1.0, 1.0));
        assert!(p.approx_eq(&Point2f::new(22.0, 12.0), EPS), "{:?}", p);
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Matrix2D::scale(1.5, 0.5) * Matrix2D::rotation(0.7) * Matrix2D::translation(3.0, -4.0);
        let inv = m.inverse().unwrap();
        let p = Point2f::new(12.5, -3.25);
        let back = inv.transform_point(m.transform_point(p));
        assert!(back.approx_eq(&p, EPS), "{:?}", back);
        assert!((m * inv).transform_point(p).approx_eq(&p, EPS));
    }

    #[test]
    fn test_singular_has_no_inverse() {
        assert!(Matrix2D::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_vector_ops() {
        let mut v = Vector2f::new(3.0, 4.0);
        assert_eq!(v.length(), 5.0);
        v += Vector2f::new(1.0, 1.0);
        assert_eq!(v, Vector2f::new(4.0, 5.0));
        assert_eq!(-v * 2.0, Vector2f::new(-8.0, -10.0));
        assert_eq!(v.dot(&Vector2f::new(1.0, 0.0)), 4.0);
    }
}
