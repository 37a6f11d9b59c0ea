// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scan out one quad in place of the composited output.

use alloc::vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use planar_core::geometry::IntSize;

use super::StrategyContext;

pub(super) fn try_promote(ctx: &mut StrategyContext<'_>) -> bool {
    let Some(front) = (0..ctx.pass.quads.len()).find(|&i| !ctx.is_invisible_at(i)) else {
        return false;
    };
    let quad = &ctx.pass.quads.as_slice()[front];
    if quad.should_draw_with_blending(ctx.pass.shared_quad_state(quad.shared_quad_state)) {
        return false;
    }
    let Some(mut candidate) = ctx.candidate_at(front) else {
        return false;
    };

    let output = ctx.pass.output_rect;
    let r = candidate.display_rect;
    let rounded = IntSize::new(round_px(r.width()), round_px(r.height()));
    let at_origin = r.x0 == 0.0 && r.y0 == 0.0;
    if !at_origin || rounded != output.size() || candidate.resource_size != output.size() {
        return false;
    }

    candidate.plane_z_order = 0;
    let mut proposed = vec![candidate];
    ctx.validator.check_overlay_support(&mut proposed);
    if !proposed[0].overlay_handled {
        return false;
    }
    *ctx.candidates = proposed;
    // Everything else is hidden behind the plane.
    ctx.pass.quads.clear();
    true
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "rounded display extents fit in i32"
)]
fn round_px(v: f64) -> i32 {
    v.round() as i32
}
