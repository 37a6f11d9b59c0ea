// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render passes: a destination rect plus the quads drawn into it.
//!
//! A frame is a list of passes ordered so that every pass comes after the
//! passes it references; the last pass is the root that targets the
//! display.

use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::filter::FilterOperation;
use crate::geometry::IntRect;
use crate::quad::{DrawQuad, QuadList, SharedQuadState, SharedQuadStateId};
use crate::transform::Transform3d;

/// Identifies a render pass within a frame.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderPassId(pub u64);

impl fmt::Debug for RenderPassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderPassId({})", self.0)
    }
}

/// Filter chains keyed by the pass they apply to.
pub type FilterMap = HashMap<RenderPassId, Vec<FilterOperation>>;

/// One render pass.
#[derive(Clone, Debug)]
pub struct RenderPass {
    /// Identity of this pass.
    pub id: RenderPassId,
    /// Bounds of the pass's target.
    pub output_rect: IntRect,
    /// Region of the target that changed this frame.
    pub damage_rect: IntRect,
    /// Maps this pass's target into the root target.
    pub transform_to_root_target: Transform3d,
    /// Effects applied to the pass's content when it is drawn.
    pub filters: Vec<FilterOperation>,
    /// Effects applied to whatever lies behind the pass.
    pub background_filters: Vec<FilterOperation>,
    /// Someone asked for a readback of this pass.
    pub has_copy_requests: bool,
    shared_quad_states: Vec<SharedQuadState>,
    /// Quads, front to back.
    pub quads: QuadList,
}

impl RenderPass {
    /// Creates an empty pass whose damage covers the whole output.
    #[must_use]
    pub fn new(id: RenderPassId, output_rect: IntRect) -> Self {
        Self {
            id,
            output_rect,
            damage_rect: output_rect,
            transform_to_root_target: Transform3d::IDENTITY,
            filters: Vec::new(),
            background_filters: Vec::new(),
            has_copy_requests: false,
            shared_quad_states: Vec::new(),
            quads: QuadList::new(),
        }
    }

    /// Adds a shared state and returns its handle.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "a pass never holds more than u32::MAX shared states"
    )]
    pub fn push_shared_quad_state(&mut self, sqs: SharedQuadState) -> SharedQuadStateId {
        let id = SharedQuadStateId(self.shared_quad_states.len() as u32);
        self.shared_quad_states.push(sqs);
        id
    }

    /// Appends a quad behind the existing quads.
    ///
    /// # Panics
    ///
    /// Panics if the quad refers to a shared state this pass does not own.
    pub fn push_quad(&mut self, quad: DrawQuad) {
        assert!(
            (quad.shared_quad_state.0 as usize) < self.shared_quad_states.len(),
            "quad refers to {:?}, which this pass does not own",
            quad.shared_quad_state
        );
        self.quads.push(quad);
    }

    /// Looks up a shared state.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by
    /// [`push_shared_quad_state`](Self::push_shared_quad_state) on this pass.
    #[inline]
    #[must_use]
    pub fn shared_quad_state(&self, id: SharedQuadStateId) -> &SharedQuadState {
        &self.shared_quad_states[id.0 as usize]
    }

    /// Shared state of the quad at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn shared_quad_state_of(&self, index: usize) -> &SharedQuadState {
        self.shared_quad_state(self.quads.as_slice()[index].shared_quad_state)
    }

    /// All shared states, in creation order.
    #[inline]
    #[must_use]
    pub fn shared_quad_states(&self) -> &[SharedQuadState] {
        &self.shared_quad_states
    }
}

/// Collects the filter and background-filter chains of every pass that has
/// one.
#[must_use]
pub fn collect_filters(passes: &[RenderPass]) -> (FilterMap, FilterMap) {
    let mut filters = FilterMap::new();
    let mut background_filters = FilterMap::new();
    for pass in passes {
        if !pass.filters.is_empty() {
            filters.insert(pass.id, pass.filters.clone());
        }
        if !pass.background_filters.is_empty() {
            background_filters.insert(pass.id, pass.background_filters.clone());
        }
    }
    (filters, background_filters)
}
