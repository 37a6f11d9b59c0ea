// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-quad promotion strategies for the root render pass.
//!
//! Each [`OverlayStrategy`] variant looks for one quad it can take off the
//! GPU path, proposes it to the validator and, if the platform accepts it,
//! edits the pass accordingly:
//!
//! | Strategy | Picks | Plane z | Pass edit |
//! |----------|-------|---------|-----------|
//! | [`Fullscreen`](OverlayStrategy::Fullscreen) | top visible quad covering the output | `0` | all quads removed |
//! | [`SingleOnTop`](OverlayStrategy::SingleOnTop) | largest unoccluded candidate | `1` | quad removed |
//! | [`Underlay`](OverlayStrategy::Underlay) | frontmost candidate | `-1` | quad replaced by a hole |
//! | [`UnderlayCast`](OverlayStrategy::UnderlayCast) | as `Underlay` | `-1` | as `Underlay`, plus content bounds |
//!
//! A strategy that fails leaves the pass and the candidate list exactly as
//! it found them.

mod fullscreen;
mod single_on_top;
mod underlay;
mod underlay_cast;

use alloc::vec::Vec;

use planar_core::geometry::IntRect;
use planar_core::render_pass::RenderPass;
use planar_core::resource::ResourceProvider;

use crate::candidate::OverlayCandidate;
use crate::validator::OverlayValidator;

/// One promotion algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayStrategy {
    /// Replace the primary plane with a quad that covers the whole output.
    Fullscreen,
    /// Put the largest unoccluded candidate on a plane above the primary.
    SingleOnTop,
    /// Put a candidate on a plane below the primary and cut a hole for it.
    Underlay,
    /// Like `Underlay`, and report where the primary surface has content.
    UnderlayCast,
}

impl OverlayStrategy {
    /// Short name, for logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Fullscreen => "fullscreen",
            Self::SingleOnTop => "single-on-top",
            Self::Underlay => "underlay",
            Self::UnderlayCast => "underlay-cast",
        }
    }

    /// Runs the strategy against the root pass.
    ///
    /// Returns `true` and updates `ctx.candidates` and `ctx.pass` when a quad
    /// was promoted.
    pub fn try_promote(self, ctx: &mut StrategyContext<'_>) -> bool {
        match self {
            Self::Fullscreen => fullscreen::try_promote(ctx),
            Self::SingleOnTop => single_on_top::try_promote(ctx),
            Self::Underlay => underlay::try_promote(ctx),
            Self::UnderlayCast => underlay_cast::try_promote(ctx),
        }
    }
}

/// Everything a strategy reads and may modify.
pub struct StrategyContext<'a> {
    /// Platform policy.
    pub validator: &'a mut dyn OverlayValidator,
    /// Resource sizes and eligibility.
    pub resources: &'a dyn ResourceProvider,
    /// The root pass.
    pub pass: &'a mut RenderPass,
    /// Planes proposed so far; may hold the primary plane.
    pub candidates: &'a mut Vec<OverlayCandidate>,
    /// Content bounds reported by [`OverlayStrategy::UnderlayCast`].
    pub content_bounds: &'a mut Vec<IntRect>,
}

impl core::fmt::Debug for StrategyContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StrategyContext")
            .field("pass", &self.pass.id)
            .field("candidates", &self.candidates.len())
            .finish_non_exhaustive()
    }
}

impl StrategyContext<'_> {
    /// Builds a candidate for the quad at `index`, if it is one.
    pub(crate) fn candidate_at(&self, index: usize) -> Option<OverlayCandidate> {
        let quad = self.pass.quads.get(index)?;
        let sqs = self.pass.shared_quad_state(quad.shared_quad_state);
        OverlayCandidate::from_draw_quad(self.resources, sqs, quad)
    }

    /// Returns `true` if the quad at `index` draws nothing visible.
    pub(crate) fn is_invisible_at(&self, index: usize) -> bool {
        let quad = &self.pass.quads.as_slice()[index];
        quad.is_invisible(self.pass.shared_quad_state(quad.shared_quad_state))
    }

    /// Appends `candidate` with the given z-order to a copy of the current
    /// list and asks the validator about it. Returns the copy when the
    /// platform accepted the new entry.
    pub(crate) fn propose_appended(
        &mut self,
        mut candidate: OverlayCandidate,
        plane_z_order: i32,
    ) -> Option<Vec<OverlayCandidate>> {
        candidate.plane_z_order = plane_z_order;
        let mut proposed = self.candidates.clone();
        proposed.push(candidate);
        self.validator.check_overlay_support(&mut proposed);
        proposed
            .last()
            .is_some_and(|c| c.overlay_handled)
            .then_some(proposed)
    }
}
