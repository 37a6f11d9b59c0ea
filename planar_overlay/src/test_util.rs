// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixtures shared by the unit tests: a 256×256 display, a counting resource
//! provider, quad builders and a rect-matching validator.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

use planar_core::geometry::{IntRect, IntSize};
use planar_core::quad::{
    Color, DrawQuad, Material, SharedQuadState, SharedQuadStateId, TextureContent,
    YuvVideoContent,
};
use planar_core::render_pass::{RenderPass, RenderPassId};
use planar_core::resource::{
    ColorSpace, ResourceFormat, ResourceId, ResourceInfo, ResourceLock, ResourceProvider,
};
use planar_core::transform::Transform3d;

use crate::candidate::OverlayCandidate;
use crate::strategy::OverlayStrategy;
use crate::validator::OverlayValidator;

pub(crate) const OVERLAY_RECT: IntRect = IntRect::from_xywh(0, 0, 256, 256);
pub(crate) const TOP_LEFT_RECT: IntRect = IntRect::from_xywh(0, 0, 128, 128);
pub(crate) const BOTTOM_RIGHT_RECT: IntRect = IntRect::from_xywh(128, 128, 128, 128);
pub(crate) const CLIP_RECT: IntRect = IntRect::from_xywh(0, 0, 128, 128);
pub(crate) const UV_TOP_LEFT: Point = Point::new(0.1, 0.2);
pub(crate) const UV_BOTTOM_RIGHT: Point = Point::new(1.0, 1.0);

pub(crate) const NORMAL_UV_MATRIX: Transform3d =
    Transform3d::from_affine([0.9, 0.0, 0.0, 0.8, 0.1, 0.2]);
pub(crate) const X_MIRROR_UV_MATRIX: Transform3d =
    Transform3d::from_affine([-0.9, 0.0, 0.0, 0.8, 1.0, 0.2]);
pub(crate) const Y_MIRROR_UV_MATRIX: Transform3d =
    Transform3d::from_affine([0.9, 0.0, 0.0, -0.8, 0.1, 1.0]);
pub(crate) const BOTH_MIRROR_UV_MATRIX: Transform3d =
    Transform3d::from_affine([-0.9, 0.0, 0.0, -0.8, 1.0, 1.0]);
pub(crate) const SWAP_UV_MATRIX: Transform3d =
    Transform3d::from_affine([0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A provider that hands out ids and counts outstanding locks.
#[derive(Debug, Default)]
pub(crate) struct FakeResources {
    infos: HashMap<ResourceId, ResourceInfo>,
    locks: HashMap<ResourceId, u32>,
    next: u32,
}

impl FakeResources {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn create(&mut self, size: IntSize, overlay_candidate: bool) -> ResourceId {
        self.next += 1;
        let id = ResourceId(self.next);
        self.infos.insert(
            id,
            ResourceInfo {
                size,
                format: ResourceFormat::Rgba8,
                color_space: ColorSpace::Srgb,
                is_overlay_candidate: overlay_candidate,
            },
        );
        id
    }

    pub(crate) fn set_overlay_candidate(&mut self, id: ResourceId, eligible: bool) {
        if let Some(info) = self.infos.get_mut(&id) {
            info.is_overlay_candidate = eligible;
        }
    }

    pub(crate) fn lock_count(&self, id: ResourceId) -> u32 {
        self.locks.get(&id).copied().unwrap_or(0)
    }

    pub(crate) fn in_use(&self, id: ResourceId) -> bool {
        self.lock_count(id) > 0
    }
}

impl ResourceProvider for FakeResources {
    fn resource_info(&self, id: ResourceId) -> Option<ResourceInfo> {
        self.infos.get(&id).copied()
    }

    fn lock_for_overlay(&mut self, id: ResourceId) -> ResourceLock {
        *self.locks.entry(id).or_insert(0) += 1;
        ResourceLock::new(id)
    }

    fn unlock(&mut self, lock: ResourceLock) {
        let count = self
            .locks
            .get_mut(&lock.resource_id())
            .expect("unlock of a resource that was never locked");
        assert!(*count > 0, "lock count underflow for {lock:?}");
        *count -= 1;
    }
}

// ---------------------------------------------------------------------------
// Pass builders
// ---------------------------------------------------------------------------

pub(crate) fn default_state() -> SharedQuadState {
    SharedQuadState::new(Transform3d::IDENTITY, OVERLAY_RECT)
}

/// A root pass covering the display with one default shared state at id 0.
pub(crate) fn new_pass() -> RenderPass {
    let mut pass = RenderPass::new(RenderPassId(1), OVERLAY_RECT);
    pass.push_shared_quad_state(default_state());
    pass
}

pub(crate) const DEFAULT_SQS: SharedQuadStateId = SharedQuadStateId(0);

/// Pushes a texture candidate sized to `rect` behind the existing quads.
pub(crate) fn push_candidate(
    pass: &mut RenderPass,
    resources: &mut FakeResources,
    rect: IntRect,
) -> ResourceId {
    push_candidate_in(pass, resources, DEFAULT_SQS, rect)
}

pub(crate) fn push_candidate_in(
    pass: &mut RenderPass,
    resources: &mut FakeResources,
    sqs: SharedQuadStateId,
    rect: IntRect,
) -> ResourceId {
    let id = resources.create(rect.size(), true);
    let mut texture = TextureContent::new(id, rect.size());
    texture.uv_top_left = UV_TOP_LEFT;
    texture.uv_bottom_right = UV_BOTTOM_RIGHT;
    pass.push_quad(DrawQuad::new(sqs, rect, false, Material::Texture(texture)));
    id
}

/// Pushes a fullscreen texture candidate.
pub(crate) fn push_fullscreen_candidate(
    pass: &mut RenderPass,
    resources: &mut FakeResources,
) -> ResourceId {
    push_candidate(pass, resources, OVERLAY_RECT)
}

pub(crate) fn push_stream_video(
    pass: &mut RenderPass,
    resources: &mut FakeResources,
    rect: IntRect,
    matrix: Transform3d,
) -> ResourceId {
    let id = resources.create(rect.size(), true);
    pass.push_quad(DrawQuad::new(
        DEFAULT_SQS,
        rect,
        false,
        Material::StreamVideo {
            resource_id: id,
            resource_size: rect.size(),
            matrix,
        },
    ));
    id
}

pub(crate) fn push_yuv_video_in(
    pass: &mut RenderPass,
    resources: &mut FakeResources,
    sqs: SharedQuadStateId,
    rect: IntRect,
) -> Vec<ResourceId> {
    let y = resources.create(rect.size(), true);
    let uv = resources.create(IntSize::new(rect.width() / 2, rect.height() / 2), true);
    pass.push_quad(DrawQuad::new(
        sqs,
        rect,
        false,
        Material::YuvVideo(YuvVideoContent {
            y_plane: y,
            uv_planes: vec![uv],
            a_plane: None,
            ya_tex_coord_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            uv_tex_coord_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            color_space: ColorSpace::Rec709,
            require_overlay: false,
        }),
    ));
    vec![y, uv]
}

pub(crate) fn push_solid_in(
    pass: &mut RenderPass,
    sqs: SharedQuadStateId,
    rect: IntRect,
    color: Color,
) {
    pass.push_quad(DrawQuad::solid_color(sqs, rect, color));
}

pub(crate) fn push_opaque_quad(pass: &mut RenderPass, rect: IntRect) {
    push_solid_in(pass, DEFAULT_SQS, rect, Color::WHITE);
}

pub(crate) fn push_transparent_quad(pass: &mut RenderPass, rect: IntRect) {
    push_solid_in(pass, DEFAULT_SQS, rect, Color::TRANSPARENT);
}

pub(crate) fn push_black_quad(pass: &mut RenderPass, rect: IntRect) {
    push_solid_in(pass, DEFAULT_SQS, rect, Color::BLACK);
}

// ---------------------------------------------------------------------------
// Validator
// ---------------------------------------------------------------------------

/// Accepts the last candidate when its display rect matches one of the
/// expected rects (the full display by default).
#[derive(Debug)]
pub(crate) struct TestValidator {
    pub(crate) strategies: Vec<OverlayStrategy>,
    pub(crate) expected_rects: Vec<Rect>,
    pub(crate) ca_layers: bool,
    pub(crate) dc_layers: bool,
}

impl TestValidator {
    pub(crate) fn with_strategies(strategies: &[OverlayStrategy]) -> Self {
        Self {
            strategies: strategies.to_vec(),
            expected_rects: vec![OVERLAY_RECT.to_rect()],
            ca_layers: false,
            dc_layers: false,
        }
    }

    pub(crate) fn ca_layers() -> Self {
        Self {
            ca_layers: true,
            ..Self::with_strategies(&[])
        }
    }

    pub(crate) fn dc_layers() -> Self {
        Self {
            dc_layers: true,
            ..Self::with_strategies(&[])
        }
    }

    pub(crate) fn expect_rect(mut self, rect: IntRect) -> Self {
        self.expected_rects.push(rect.to_rect());
        self
    }

    pub(crate) fn boxed(self) -> Box<dyn OverlayValidator> {
        Box::new(self)
    }
}

impl OverlayValidator for TestValidator {
    fn strategies(&self) -> Vec<OverlayStrategy> {
        self.strategies.clone()
    }

    fn allow_ca_layer_overlays(&self) -> bool {
        self.ca_layers
    }

    fn allow_dc_layer_overlays(&self) -> bool {
        self.dc_layers
    }

    fn check_overlay_support(&mut self, candidates: &mut [OverlayCandidate]) {
        let Some(candidate) = candidates.last_mut() else {
            return;
        };
        assert!(!candidate.use_output_surface, "last entry must be a quad");
        const TOLERANCE: f64 = 0.01;
        let r = candidate.display_rect;
        let matches = self.expected_rects.iter().any(|e| {
            (e.x0 - r.x0).abs() <= TOLERANCE
                && (e.y0 - r.y0).abs() <= TOLERANCE
                && (e.width() - r.width()).abs() <= TOLERANCE
                && (e.height() - r.height()).abs() <= TOLERANCE
        });
        if matches {
            candidate.overlay_handled = true;
        }
    }
}
