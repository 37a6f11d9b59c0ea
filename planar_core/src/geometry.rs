// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer pixel geometry and float-rect helpers.
//!
//! Damage is tracked in whole pixels with [`IntRect`]. Its set operations
//! follow damage-rect conventions rather than plain bounding-box math:
//!
//! - [`union`](IntRect::union) ignores empty operands, so the empty rect is
//!   the identity no matter where its origin sits.
//! - [`intersect`](IntRect::intersect) collapses to [`IntRect::ZERO`] when the
//!   operands do not overlap.
//! - [`subtract`](IntRect::subtract) only shrinks the rect when the remainder
//!   is still a single rectangle. An overlap that would leave an L-shape or a
//!   hole leaves the rect untouched, which over-reports damage but never
//!   under-reports it.
//!
//! Float geometry uses [`kurbo::Rect`]. Conversions go through
//! [`IntRect::enclosing`] (outward rounding) and [`IntRect::enclosed`]
//! (inward rounding).

use core::fmt;

use kurbo::Rect;

/// A size in whole pixels.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntSize {
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl IntSize {
    /// Creates a size.
    #[inline]
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero or negative.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl fmt::Debug for IntSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An axis-aligned rectangle in whole pixels, stored as edges.
///
/// `x1` and `y1` are exclusive. A rect with `x1 <= x0` or `y1 <= y0` is
/// empty.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge (exclusive).
    pub x1: i32,
    /// Bottom edge (exclusive).
    pub y1: i32,
}

impl IntRect {
    /// The empty rect at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Creates a rect from its edges.
    #[inline]
    #[must_use]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a rect from an origin and a size.
    #[inline]
    #[must_use]
    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Creates a rect at the origin with the given size.
    #[inline]
    #[must_use]
    pub const fn from_size(size: IntSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Width in pixels (zero when inverted).
    #[inline]
    #[must_use]
    pub const fn width(self) -> i32 {
        if self.x1 > self.x0 { self.x1 - self.x0 } else { 0 }
    }

    /// Height in pixels (zero when inverted).
    #[inline]
    #[must_use]
    pub const fn height(self) -> i32 {
        if self.y1 > self.y0 { self.y1 - self.y0 } else { 0 }
    }

    /// Returns the size of this rect.
    #[inline]
    #[must_use]
    pub const fn size(self) -> IntSize {
        IntSize::new(self.width(), self.height())
    }

    /// Area in pixels.
    #[inline]
    #[must_use]
    pub const fn area(self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Returns `true` if the rect covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// An empty `other` is only contained by a non-empty rect.
    #[inline]
    #[must_use]
    pub const fn contains_rect(self, other: Self) -> bool {
        !self.is_empty()
            && other.x0 >= self.x0
            && other.y0 >= self.y0
            && other.x1 <= self.x1
            && other.y1 <= self.y1
    }

    /// Returns `true` if both rects are non-empty and share at least one
    /// pixel.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }

    /// Returns the overlap of the two rects, or [`IntRect::ZERO`].
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        if !self.intersects(other) {
            return Self::ZERO;
        }
        Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    /// Returns the bounding box of the two rects, ignoring empty operands.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Removes `other` from `self` when the remainder is a single rectangle.
    ///
    /// If `other` covers `self` the result is [`IntRect::ZERO`]. If `other`
    /// spans `self` completely along one axis and covers one side, that side
    /// is cut back. Any other overlap leaves `self` unchanged.
    #[must_use]
    pub fn subtract(self, other: Self) -> Self {
        if !self.intersects(other) {
            return self;
        }
        if other.contains_rect(self) {
            return Self::ZERO;
        }
        let mut out = self;
        if other.y0 <= self.y0 && other.y1 >= self.y1 {
            if other.x0 <= self.x0 {
                out.x0 = other.x1;
            } else if other.x1 >= self.x1 {
                out.x1 = other.x0;
            }
        } else if other.x0 <= self.x0 && other.x1 >= self.x1 {
            if other.y0 <= self.y0 {
                out.y0 = other.y1;
            } else if other.y1 >= self.y1 {
                out.y1 = other.y0;
            }
        }
        out
    }

    /// Smallest integer rect that contains `rect`.
    #[must_use]
    pub fn enclosing(rect: Rect) -> Self {
        Self::from_integral(rect.abs().expand())
    }

    /// Largest integer rect contained in `rect`.
    #[must_use]
    pub fn enclosed(rect: Rect) -> Self {
        let r = rect.abs().trunc();
        if r.width() <= 0.0 || r.height() <= 0.0 {
            return Self::ZERO;
        }
        Self::from_integral(r)
    }

    /// Rounds each edge to the nearest integer.
    #[must_use]
    pub fn rounded(rect: Rect) -> Self {
        Self::from_integral(rect.abs().round())
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "edges are already integral and compositor rects fit in i32"
    )]
    fn from_integral(r: Rect) -> Self {
        Self::new(r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32)
    }

    /// Converts to a float rect.
    #[inline]
    #[must_use]
    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

impl fmt::Debug for IntRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IntRect({},{} {}x{})",
            self.x0,
            self.y0,
            self.width(),
            self.height()
        )
    }
}

// ---------------------------------------------------------------------------
// Float rect helpers
// ---------------------------------------------------------------------------

/// Returns `true` if `rect` has no area.
#[inline]
#[must_use]
pub fn rect_is_empty(rect: Rect) -> bool {
    !(rect.width() > 0.0 && rect.height() > 0.0)
}

/// Returns the overlap of two float rects, or [`Rect::ZERO`].
#[must_use]
pub fn intersect_rect(a: Rect, b: Rect) -> Rect {
    let r = a.intersect(b);
    if rect_is_empty(r) { Rect::ZERO } else { r }
}

/// Returns `true` if the two float rects overlap with non-zero area.
#[inline]
#[must_use]
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    !rect_is_empty(a.intersect(b))
}

/// Bounding box of two float rects, ignoring empty operands.
#[must_use]
pub fn union_rect(a: Rect, b: Rect) -> Rect {
    if rect_is_empty(b) {
        a
    } else if rect_is_empty(a) {
        b
    } else {
        a.union(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_ignores_empty() {
        let a = IntRect::from_xywh(10, 10, 5, 5);
        let empty = IntRect::new(100, 100, 100, 100);
        assert_eq!(a.union(empty), a, "empty rhs must not grow the rect");
        assert_eq!(empty.union(a), a, "empty lhs must not grow the rect");
        assert_eq!(
            a.union(IntRect::from_xywh(0, 0, 1, 1)),
            IntRect::new(0, 0, 15, 15),
            "bounding box of both"
        );
    }

    #[test]
    fn intersect_disjoint_is_zero() {
        let a = IntRect::from_xywh(0, 0, 10, 10);
        let b = IntRect::from_xywh(20, 20, 10, 10);
        assert_eq!(a.intersect(b), IntRect::ZERO, "no overlap");
        assert!(!a.intersects(b), "disjoint rects do not intersect");
        // Touching edges share no pixels.
        let c = IntRect::from_xywh(10, 0, 10, 10);
        assert!(!a.intersects(c), "edge contact is not overlap");
    }

    #[test]
    fn subtract_full_cover_is_empty() {
        let a = IntRect::from_xywh(1, 1, 10, 10);
        assert!(
            a.subtract(IntRect::from_xywh(0, 0, 256, 256)).is_empty(),
            "covered rect vanishes"
        );
    }

    #[test]
    fn subtract_band_cuts_one_side() {
        let damage = IntRect::from_xywh(1, 1, 10, 10);
        let band = IntRect::from_xywh(0, 0, 100, 3);
        assert_eq!(
            damage.subtract(band),
            IntRect::from_xywh(1, 3, 10, 8),
            "top band removed"
        );
        let right = IntRect::from_xywh(6, 0, 100, 100);
        assert_eq!(
            damage.subtract(right),
            IntRect::from_xywh(1, 1, 5, 10),
            "right side removed"
        );
    }

    #[test]
    fn subtract_partial_corner_keeps_rect() {
        let a = IntRect::from_xywh(0, 0, 11, 11);
        let hole = IntRect::from_xywh(2, 2, 7, 7);
        assert_eq!(a.subtract(hole), a, "a hole is not representable");
        let corner = IntRect::from_xywh(5, 5, 20, 20);
        assert_eq!(a.subtract(corner), a, "an L-shape is not representable");
    }

    #[test]
    fn enclosing_rounds_outward() {
        let r = Rect::new(0.5, 0.5, 10.5, 10.5);
        assert_eq!(IntRect::enclosing(r), IntRect::new(0, 0, 11, 11), "outward");
        let r = Rect::new(0.5, 0.5, 255.5, 255.5);
        assert_eq!(
            IntRect::enclosing(r),
            IntRect::from_xywh(0, 0, 256, 256),
            "outward"
        );
    }

    #[test]
    fn enclosed_rounds_inward() {
        let r = Rect::new(1.5, 1.5, 9.5, 9.5);
        assert_eq!(IntRect::enclosed(r), IntRect::new(2, 2, 9, 9), "inward");
        let sliver = Rect::new(0.2, 0.2, 0.8, 10.0);
        assert!(IntRect::enclosed(sliver).is_empty(), "sub-pixel width");
    }

    #[test]
    fn float_union_ignores_empty() {
        let a = Rect::new(2.0, 2.0, 4.0, 4.0);
        assert_eq!(union_rect(Rect::ZERO, a), a, "empty lhs");
        assert_eq!(union_rect(a, Rect::ZERO), a, "empty rhs");
        assert!(
            rect_is_empty(intersect_rect(a, Rect::new(10.0, 10.0, 12.0, 12.0))),
            "disjoint"
        );
    }
}
