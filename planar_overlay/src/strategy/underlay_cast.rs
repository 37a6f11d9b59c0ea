// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Underlay promotion that also reports where the primary surface has
//! content, so a compositor below can skip the rest.

use planar_core::geometry::IntRect;
use planar_core::quad::{Color, Material};

use crate::candidate::target_rect;

use super::{StrategyContext, underlay};

pub(super) fn try_promote(ctx: &mut StrategyContext<'_>) -> bool {
    let mut found_underlay = false;
    let mut content_rect = IntRect::ZERO;
    for index in (0..ctx.pass.quads.len()).rev() {
        if ctx.is_invisible_at(index) {
            continue;
        }
        let quad = &ctx.pass.quads.as_slice()[index];
        let rect = target_rect(ctx.pass, index);
        if !found_underlay {
            // Black letterboxing behind the video adds nothing.
            if matches!(
                quad.material,
                Material::SolidColor {
                    color: Color::BLACK,
                    ..
                }
            ) {
                continue;
            }
            if ctx.candidate_at(index).is_some() {
                found_underlay = true;
                content_rect = content_rect.subtract(IntRect::enclosed(rect));
                continue;
            }
        }
        content_rect = content_rect.union(IntRect::enclosing(rect));
    }

    if !underlay::try_promote(ctx) {
        return false;
    }
    ctx.content_bounds.push(content_rect);
    true
}
