// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! Quads carry a quad-to-target transform. Overlay promotion only needs a few
//! questions answered about it: does it keep rects axis-aligned, does it stay
//! in the plane, is it a pure scale/translation, and where does it send a
//! rect. Those live here next to the constructors, without pulling in a full
//! linear-algebra crate.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect};

/// Tolerance for treating a matrix entry as zero.
const EPSILON: f64 = 1e-6;

#[inline]
fn near_zero(v: f64) -> bool {
    v.abs() <= EPSILON
}

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, matching the memory layout
/// used by GPU APIs and Core Animation's `CATransform3D`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Creates a transform from a column-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_cols_array_2d(cols: [[f64; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Returns the columns as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 4]; 4] {
        self.cols
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        #[cfg(feature = "std")]
        let (s, c) = radians.sin_cos();
        #[cfg(not(feature = "std"))]
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    ///
    /// Rotating a quad about X tilts it out of the plane, so the result is
    /// not [flat](Self::is_flat).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a 2-D affine transform from `kurbo`'s coefficient order
    /// `[a, b, c, d, e, f]` (`x' = a*x + c*y + e`, `y' = b*x + d*y + f`).
    #[inline]
    #[must_use]
    pub const fn from_affine(coeffs: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = coeffs;
        Self {
            cols: [
                [a, b, 0.0, 0.0],
                [c, d, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [e, f, 0.0, 1.0],
            ],
        }
    }

    /// Where the unit X axis points after transformation, `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn x_axis(&self) -> [f64; 3] {
        [self.cols[0][0], self.cols[0][1], self.cols[0][2]]
    }

    /// Where the unit Y axis points after transformation, `[x, y, z]`.
    #[inline]
    #[must_use]
    pub const fn y_axis(&self) -> [f64; 3] {
        [self.cols[1][0], self.cols[1][1], self.cols[1][2]]
    }

    fn has_xy_perspective(&self) -> bool {
        !near_zero(self.cols[0][3]) || !near_zero(self.cols[1][3])
    }

    /// Returns `true` if points with `z = 0` stay at `z = 0` and no
    /// perspective depends on x or y.
    ///
    /// A flat transform maps a quad to another planar quad on screen without
    /// any 3-D tilt.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        near_zero(self.cols[0][2]) && near_zero(self.cols[1][2]) && !self.has_xy_perspective()
    }

    /// Returns `true` if an axis-aligned rect stays axis-aligned after
    /// transformation and dropping z.
    ///
    /// Only scaling and swapping of the x and y axes keep rects aligned, so
    /// every row and column of the upper 2×2 block may hold at most one
    /// non-zero entry. Degenerate scales that collapse an axis count as
    /// aligned. X/Y-dependent perspective is treated as not aligned.
    #[must_use]
    pub fn preserves_2d_axis_alignment(&self) -> bool {
        if self.has_xy_perspective() {
            return false;
        }
        let m00 = !near_zero(self.cols[0][0]);
        let m10 = !near_zero(self.cols[0][1]);
        let m01 = !near_zero(self.cols[1][0]);
        let m11 = !near_zero(self.cols[1][1]);
        let row0 = u8::from(m00) + u8::from(m01);
        let row1 = u8::from(m10) + u8::from(m11);
        let col0 = u8::from(m00) + u8::from(m10);
        let col1 = u8::from(m01) + u8::from(m11);
        row0 <= 1 && row1 <= 1 && col0 <= 1 && col1 <= 1
    }

    /// Returns `true` if the transform only scales and translates.
    #[must_use]
    pub fn is_scale_or_translation(&self) -> bool {
        let c = &self.cols;
        near_zero(c[0][1])
            && near_zero(c[0][2])
            && near_zero(c[1][0])
            && near_zero(c[1][2])
            && near_zero(c[2][0])
            && near_zero(c[2][1])
            && near_zero(c[0][3])
            && near_zero(c[1][3])
            && near_zero(c[2][3])
            && c[3][3] == 1.0
    }

    /// Returns `true` if the transform is the identity or a translation by
    /// whole pixels.
    #[must_use]
    pub fn is_identity_or_integer_translation(&self) -> bool {
        let mut linear = *self;
        linear.cols[3] = [0.0, 0.0, 0.0, 1.0];
        if linear != Self::IDENTITY {
            return false;
        }
        let [x, y, z, _] = self.cols[3];
        x.round() == x && y.round() == y && z.round() == z
    }

    /// Maps a point in the `z = 0` plane and projects it back to 2-D.
    ///
    /// Points that land at or behind the eye (`w <= 0`) are returned without
    /// the perspective divide.
    #[must_use]
    pub fn map_point(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w > EPSILON && (w - 1.0).abs() > f64::EPSILON {
            Point::new(x / w, y / w)
        } else {
            Point::new(x, y)
        }
    }

    /// Maps a rect and returns the axis-aligned bounds of its four corners.
    #[must_use]
    pub fn map_rect(&self, rect: Rect) -> Rect {
        let p0 = self.map_point(Point::new(rect.x0, rect.y0));
        let p1 = self.map_point(Point::new(rect.x1, rect.y0));
        let p2 = self.map_point(Point::new(rect.x1, rect.y1));
        let p3 = self.map_point(Point::new(rect.x0, rect.y1));
        Rect::from_points(p0, p1).union_pt(p2).union_pt(p3)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_finite()
            && c[0][1].is_finite()
            && c[0][2].is_finite()
            && c[0][3].is_finite()
            && c[1][0].is_finite()
            && c[1][1].is_finite()
            && c[1][2].is_finite()
            && c[1][3].is_finite()
            && c[2][0].is_finite()
            && c[2][1].is_finite()
            && c[2][2].is_finite()
            && c[2][3].is_finite()
            && c[3][0].is_finite()
            && c[3][1].is_finite()
            && c[3][2].is_finite()
            && c[3][3].is_finite()
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub const fn is_nan(&self) -> bool {
        let c = &self.cols;
        c[0][0].is_nan()
            || c[0][1].is_nan()
            || c[0][2].is_nan()
            || c[0][3].is_nan()
            || c[1][0].is_nan()
            || c[1][1].is_nan()
            || c[1][2].is_nan()
            || c[1][3].is_nan()
            || c[2][0].is_nan()
            || c[2][1].is_nan()
            || c[2][2].is_nan()
            || c[2][3].is_nan()
            || c[3][0].is_nan()
            || c[3][1].is_nan()
            || c[3][2].is_nan()
            || c[3][3].is_nan()
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}
