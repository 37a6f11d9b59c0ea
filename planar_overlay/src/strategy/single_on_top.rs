// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Promote the largest unoccluded candidate to a plane above the primary.

use crate::candidate::{OverlayCandidate, is_occluded};

use super::StrategyContext;

pub(super) fn try_promote(ctx: &mut StrategyContext<'_>) -> bool {
    let mut best: Option<(usize, OverlayCandidate)> = None;
    for index in 0..ctx.pass.quads.len() {
        let Some(candidate) = ctx.candidate_at(index) else {
            continue;
        };
        if is_occluded(ctx.pass, index, candidate.display_rect) {
            continue;
        }
        let area = candidate.display_rect.area();
        if best
            .as_ref()
            .is_none_or(|(_, b)| area > b.display_rect.area())
        {
            best = Some((index, candidate));
        }
    }
    let Some((index, candidate)) = best else {
        return false;
    };
    let Some(list) = ctx.propose_appended(candidate, 1) else {
        return false;
    };
    ctx.pass.quads.remove(index);
    *ctx.candidates = list;
    true
}
