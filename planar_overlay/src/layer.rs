// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Platform layer records produced by the layer and video pipelines.
//!
//! A [`LayerRecord`] is one compositing object handed to the window
//! server. Records that came from quads with the same shared state point at
//! the same [`LayerSharedState`] through an [`Rc`], so the scheduler can
//! tell when the platform's current transform and clip can be kept.

use alloc::rc::Rc;
use alloc::vec::Vec;

use bitflags::bitflags;
use kurbo::Rect;

use planar_core::geometry::IntRect;
use planar_core::quad::Color;
use planar_core::render_pass::RenderPassId;
use planar_core::resource::{ColorSpace, ResourceId};
use planar_core::transform::Transform3d;

use crate::copy_pool::CopySurface;

bitflags! {
    /// Edges of a layer that are drawn anti-aliased.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EdgeAaMask: u8 {
        /// Left edge.
        const LEFT = 0x1;
        /// Right edge.
        const RIGHT = 0x2;
        /// Bottom edge.
        const BOTTOM = 0x4;
        /// Top edge.
        const TOP = 0x8;
    }
}

/// Texture filtering for a layer's contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LayerFilter {
    /// Bilinear.
    #[default]
    Linear,
    /// Nearest neighbour.
    Nearest,
}

/// Transform, clip and opacity shared by a run of layers.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSharedState {
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// Clip in target space.
    pub clip_rect: Rect,
    /// Opacity multiplier.
    pub opacity: f32,
    /// 3-D sorting context; zero means none.
    pub sorting_context_id: i32,
    /// Layer-to-target transform.
    pub transform: Transform3d,
}

/// What a layer shows.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerContents {
    /// A background colour only.
    None,
    /// A single backing resource.
    Resource(ResourceId),
    /// Planar video handed to the hardware as-is.
    Video {
        /// Plane resources, luma first.
        planes: Vec<ResourceId>,
        /// Colour space of the decoded frame.
        color_space: ColorSpace,
        /// The producer asked for an overlay regardless of cost.
        require_overlay: bool,
    },
    /// The output of a render pass, drawn into a copy surface.
    RenderPass {
        /// The pass to copy.
        render_pass_id: RenderPassId,
        /// Optional mask resource.
        mask: Option<ResourceId>,
        /// Pooled destination; assigned once the whole frame is accepted.
        copy: Option<CopySurface>,
    },
}

impl LayerContents {
    /// Resources that must stay locked while the layer is shown.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceId> {
        match self {
            Self::None => Vec::new(),
            Self::Resource(id) => alloc::vec![*id],
            Self::Video { planes, .. } => planes.clone(),
            Self::RenderPass { mask, .. } => mask.iter().copied().collect(),
        }
    }
}

/// One platform compositing layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerRecord {
    /// Shared transform, clip and opacity.
    pub shared_state: Rc<LayerSharedState>,
    /// What the layer draws.
    pub contents: LayerContents,
    /// Sampled region of the contents, normalized.
    pub contents_rect: Rect,
    /// Layer bounds in layer space.
    pub bounds_rect: Rect,
    /// Colour drawn behind (or instead of) the contents.
    pub background_color: Color,
    /// Edges drawn anti-aliased.
    pub edge_aa_mask: EdgeAaMask,
    /// Contents filtering.
    pub filter: LayerFilter,
    /// Stacking relative to the primary plane, for video layers.
    pub z_order: i32,
    /// Target-space rect the video covers, for video layers.
    pub quad_rect: IntRect,
}

impl LayerRecord {
    /// A record with no contents and a transparent background.
    #[must_use]
    pub fn new(shared_state: Rc<LayerSharedState>, bounds_rect: Rect) -> Self {
        Self {
            shared_state,
            contents: LayerContents::None,
            contents_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            bounds_rect,
            background_color: Color::TRANSPARENT,
            edge_aa_mask: EdgeAaMask::empty(),
            filter: LayerFilter::Linear,
            z_order: 0,
            quad_rect: IntRect::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_mask_bits() {
        let all = EdgeAaMask::LEFT | EdgeAaMask::RIGHT | EdgeAaMask::TOP | EdgeAaMask::BOTTOM;
        assert_eq!(all.bits(), 0xf, "four edges");
        assert_eq!(EdgeAaMask::BOTTOM.bits(), 4, "bottom bit");
    }

    #[test]
    fn contents_resources() {
        let video = LayerContents::Video {
            planes: alloc::vec![ResourceId(1), ResourceId(2)],
            color_space: ColorSpace::Rec709,
            require_overlay: false,
        };
        assert_eq!(video.resources(), [ResourceId(1), ResourceId(2)], "all planes");
        let pass = LayerContents::RenderPass {
            render_pass_id: RenderPassId(2),
            mask: None,
            copy: None,
        };
        assert!(pass.resources().is_empty(), "no mask");
    }
}
