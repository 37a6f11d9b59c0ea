// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Promote a candidate to a plane below the primary and cut a hole for it.

use crate::candidate::is_occluded;

use super::StrategyContext;

pub(super) fn try_promote(ctx: &mut StrategyContext<'_>) -> bool {
    for index in 0..ctx.pass.quads.len() {
        let Some(mut candidate) = ctx.candidate_at(index) else {
            continue;
        };
        candidate.is_unoccluded = !is_occluded(ctx.pass, index, candidate.display_rect);
        let Some(list) = ctx.propose_appended(candidate, -1) else {
            continue;
        };
        // The quad stays in place so content above still blends over it.
        ctx.pass.quads.replace_with_transparent_hole(index);
        *ctx.candidates = list;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use planar_core::quad::{Color, Material};
    use planar_core::render_pass::RenderPass;
    use planar_core::resource::ResourceFormat;

    use crate::candidate::OverlayCandidate;
    use crate::strategy::{OverlayStrategy, StrategyContext};
    use crate::test_util::*;

    fn run(
        pass: &mut RenderPass,
        resources: &FakeResources,
        mut validator: TestValidator,
    ) -> (bool, Vec<OverlayCandidate>) {
        let mut candidates = alloc::vec![OverlayCandidate::primary_plane(
            pass.output_rect,
            ResourceFormat::Rgba8
        )];
        let mut bounds = Vec::new();
        let mut ctx = StrategyContext {
            validator: &mut validator,
            resources,
            pass,
            candidates: &mut candidates,
            content_bounds: &mut bounds,
        };
        let ok = OverlayStrategy::Underlay.try_promote(&mut ctx);
        (ok, candidates)
    }

    fn validator() -> TestValidator {
        TestValidator::with_strategies(&[OverlayStrategy::Underlay])
    }

    fn is_hole(pass: &RenderPass, index: usize) -> bool {
        matches!(
            pass.quads.get(index).map(|q| &q.material),
            Some(Material::SolidColor {
                color: Color::TRANSPARENT,
                ..
            })
        )
    }

    #[test]
    fn occluded_candidate_becomes_hole() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_opaque_quad(&mut pass, TOP_LEFT_RECT);
        let id = push_fullscreen_candidate(&mut pass, &mut resources);

        let (ok, candidates) = run(&mut pass, &resources, validator());
        assert!(ok, "underlay promoted");
        let underlay = candidates.last().unwrap();
        assert_eq!(underlay.resource_id, Some(id), "the texture");
        assert_eq!(underlay.plane_z_order, -1, "below the primary");
        assert!(!underlay.is_unoccluded, "content above");
        assert_eq!(pass.quads.len(), 2, "replacement, not removal");
        assert!(is_hole(&pass, 1), "hole where the texture was");
        assert!(!pass.quads.get(1).unwrap().needs_blending, "hole overwrites");
    }

    #[test]
    fn unoccluded_candidate_is_flagged() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_fullscreen_candidate(&mut pass, &mut resources);
        push_opaque_quad(&mut pass, OVERLAY_RECT);

        let (ok, candidates) = run(&mut pass, &resources, validator());
        assert!(ok, "underlay promoted");
        assert!(candidates.last().unwrap().is_unoccluded, "nothing above");
        assert!(is_hole(&pass, 0), "front quad replaced");
    }

    #[test]
    fn tries_later_candidates_after_refusal() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_candidate(&mut pass, &mut resources, TOP_LEFT_RECT);
        let id = push_fullscreen_candidate(&mut pass, &mut resources);

        let (ok, candidates) = run(&mut pass, &resources, validator());
        assert!(ok, "second candidate accepted");
        assert_eq!(candidates.last().unwrap().resource_id, Some(id), "fullscreen texture");
        assert!(!is_hole(&pass, 0), "refused quad untouched");
        assert!(is_hole(&pass, 1), "accepted quad replaced");
    }

    #[test]
    fn refusal_leaves_pass() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_candidate(&mut pass, &mut resources, TOP_LEFT_RECT);

        let (ok, candidates) = run(&mut pass, &resources, validator());
        assert!(!ok, "rect not expected");
        assert_eq!(candidates.len(), 1, "primary only");
        assert!(!is_hole(&pass, 0), "texture kept");
    }
}
