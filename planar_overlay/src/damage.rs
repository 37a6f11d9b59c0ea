// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-frame memory for shrinking damage under underlays.
//!
//! An underlay shows through a transparent hole in the primary surface.
//! The frame that first cuts the hole has to repaint it, so the rect is
//! added to the damage. If the next frame cuts the same hole, the primary
//! surface already holds transparent pixels there and the rect can be taken
//! out of the damage again. Only the parts covered by content drawn above
//! the underlay (this frame's or last frame's) have to be put back, since
//! that content may have changed.

use planar_core::geometry::IntRect;

/// Last frame's underlay geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DamageHistory {
    has_previous: bool,
    previous_rect: IntRect,
    previous_occluding_rect: IntRect,
}

impl DamageHistory {
    /// History with no previous underlay.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            has_previous: false,
            previous_rect: IntRect::ZERO,
            previous_occluding_rect: IntRect::ZERO,
        }
    }

    /// Whether last frame had an underlay.
    #[inline]
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.has_previous
    }

    /// Last frame's underlay rect, if any.
    #[inline]
    #[must_use]
    pub const fn previous_rect(&self) -> Option<IntRect> {
        if self.has_previous {
            Some(self.previous_rect)
        } else {
            None
        }
    }

    /// Folds this frame's underlay into `damage` and remembers it.
    ///
    /// `occluding` is the union of visible content above the underlay,
    /// restricted to `rect`. When `rect` matches last frame's rect and
    /// `subtractable` is set, `rect` is removed from `damage` except where
    /// this or last frame's occluding content overlapped it. Otherwise
    /// `rect` is added to `damage`.
    pub fn apply_underlay(
        &mut self,
        rect: IntRect,
        occluding: IntRect,
        subtractable: bool,
        damage: &mut IntRect,
    ) {
        if self.has_previous && self.previous_rect == rect && subtractable {
            let occluded_damage = damage
                .intersect(rect)
                .intersect(occluding.union(self.previous_occluding_rect));
            *damage = damage.subtract(rect).union(occluded_damage);
        } else {
            *damage = damage.union(rect);
        }
        self.has_previous = !rect.is_empty();
        self.previous_rect = rect;
        self.previous_occluding_rect = occluding;
    }

    /// Forgets last frame's underlay.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
