// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay candidates and the geometry tests shared by the strategies.
//!
//! An [`OverlayCandidate`] describes one quad that could be scanned out as a
//! hardware plane: where it lands on screen, which part of its resource is
//! sampled, and how the plane must be flipped or rotated. Candidates are
//! built fresh each frame by [`OverlayCandidate::from_draw_quad`] and handed
//! to the [validator](crate::validator::OverlayValidator), which marks the
//! ones the platform can actually schedule.
//!
//! Only flat, axis-aligned placements are representable. The plane
//! transform is one of the six values of [`OverlayTransform`]; anything that
//! would need a skew, an arbitrary angle, a 3-D tilt, or an axis swap of the
//! texture coordinates is not a candidate.

use kurbo::{Point, Rect};

use planar_core::geometry::{IntRect, IntSize, intersect_rect, rects_intersect, union_rect};
use planar_core::quad::{BlendMode, DrawQuad, Material, SharedQuadState, TextureContent};
use planar_core::render_pass::RenderPass;
use planar_core::resource::{ResourceFormat, ResourceId, ResourceProvider};
use planar_core::transform::Transform3d;

/// Axis components smaller than this count as zero when classifying.
const AXIS_EPSILON: f64 = 1e-6;

/// How a hardware plane is oriented relative to its buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayTransform {
    /// Shown as stored.
    #[default]
    None,
    /// Mirrored left to right.
    FlipHorizontal,
    /// Mirrored top to bottom.
    FlipVertical,
    /// Rotated 90° clockwise.
    Rotate90,
    /// Rotated 180°.
    Rotate180,
    /// Rotated 270° clockwise.
    Rotate270,
}

impl OverlayTransform {
    /// Classifies a quad-to-target transform.
    ///
    /// `y_flipped` marks content stored bottom-up, which composes a vertical
    /// mirror before classification. Returns `None` for transforms no plane
    /// can express.
    #[must_use]
    pub fn classify(transform: &Transform3d, y_flipped: bool) -> Option<Self> {
        if !transform.is_flat() || !transform.preserves_2d_axis_alignment() {
            return None;
        }
        let [xx, xy, _] = transform.x_axis();
        let [mut yx, mut yy, _] = transform.y_axis();
        if y_flipped {
            yx = -yx;
            yy = -yy;
        }
        let pos = |v: f64| v > AXIS_EPSILON;
        let neg = |v: f64| v < -AXIS_EPSILON;
        if pos(xx) && pos(yy) {
            Some(Self::None)
        } else if neg(xx) && pos(yy) {
            Some(Self::FlipHorizontal)
        } else if pos(xx) && neg(yy) {
            Some(Self::FlipVertical)
        } else if pos(xy) && neg(yx) {
            Some(Self::Rotate90)
        } else if neg(xx) && neg(yy) {
            Some(Self::Rotate180)
        } else if neg(xy) && pos(yx) {
            Some(Self::Rotate270)
        } else {
            None
        }
    }

    /// Composes a left-right mirror of the source, if the result is still a
    /// plane transform.
    #[must_use]
    pub fn then_flip_horizontal(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::FlipHorizontal),
            Self::FlipHorizontal => Some(Self::None),
            Self::FlipVertical => Some(Self::Rotate180),
            Self::Rotate180 => Some(Self::FlipVertical),
            Self::Rotate90 | Self::Rotate270 => None,
        }
    }

    /// Composes a top-bottom mirror of the source, if the result is still a
    /// plane transform.
    #[must_use]
    pub fn then_flip_vertical(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::FlipVertical),
            Self::FlipVertical => Some(Self::None),
            Self::FlipHorizontal => Some(Self::Rotate180),
            Self::Rotate180 => Some(Self::FlipHorizontal),
            Self::Rotate90 | Self::Rotate270 => None,
        }
    }
}

/// One quad proposed for scan-out, or the primary plane.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayCandidate {
    /// Destination in target space.
    pub display_rect: Rect,
    /// Sampled region of the resource, normalized.
    pub uv_rect: Rect,
    /// Plane orientation.
    pub transform: OverlayTransform,
    /// Backing resource; `None` for the primary plane.
    pub resource_id: Option<ResourceId>,
    /// Size of the backing resource in pixels.
    pub resource_size: IntSize,
    /// Pixel format of the backing resource.
    pub format: ResourceFormat,
    /// The quad rect mapped into target space, rounded outward.
    pub quad_rect_in_target_space: IntRect,
    /// Clip in target space.
    pub clip_rect: IntRect,
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// The quad covers its rect without blending.
    pub is_opaque: bool,
    /// Nothing visible is drawn above the candidate (underlays only).
    pub is_unoccluded: bool,
    /// This entry stands for the composited output surface.
    pub use_output_surface: bool,
    /// Stacking relative to the primary plane: `0` replaces it, negative is
    /// below, positive is above.
    pub plane_z_order: i32,
    /// Set by the validator when the platform accepts the entry.
    pub overlay_handled: bool,
}

impl OverlayCandidate {
    /// The composited output surface as the z = 0 plane.
    #[must_use]
    pub fn primary_plane(output_rect: IntRect, format: ResourceFormat) -> Self {
        Self {
            display_rect: output_rect.to_rect(),
            uv_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            transform: OverlayTransform::None,
            resource_id: None,
            resource_size: output_rect.size(),
            format,
            quad_rect_in_target_space: output_rect,
            clip_rect: IntRect::ZERO,
            is_clipped: false,
            is_opaque: true,
            is_unoccluded: true,
            use_output_surface: true,
            plane_z_order: 0,
            overlay_handled: true,
        }
    }

    /// Builds a candidate from a texture or stream-video quad.
    ///
    /// The quad needs full opacity, source-over blending, an overlay-eligible
    /// resource and a transform [`OverlayTransform::classify`] accepts.
    #[must_use]
    pub fn from_draw_quad(
        resources: &dyn ResourceProvider,
        sqs: &SharedQuadState,
        quad: &DrawQuad,
    ) -> Option<Self> {
        if sqs.opacity != 1.0 || sqs.blend_mode != BlendMode::SourceOver {
            return None;
        }
        let transform = &sqs.quad_to_target_transform;
        let display_rect = transform.map_rect(quad.rect.to_rect());
        let base = Self {
            display_rect,
            uv_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            transform: OverlayTransform::None,
            resource_id: None,
            resource_size: IntSize::default(),
            format: ResourceFormat::default(),
            quad_rect_in_target_space: IntRect::enclosing(display_rect),
            clip_rect: sqs.clip_rect,
            is_clipped: sqs.is_clipped,
            is_opaque: !quad.should_draw_with_blending(sqs),
            is_unoccluded: false,
            use_output_surface: false,
            plane_z_order: 0,
            overlay_handled: false,
        };
        match &quad.material {
            Material::Texture(texture) => base.with_texture(resources, transform, texture),
            Material::StreamVideo {
                resource_id,
                resource_size,
                matrix,
            } => base.with_stream_video(resources, transform, *resource_id, *resource_size, matrix),
            _ => None,
        }
    }

    fn with_resource(
        mut self,
        resources: &dyn ResourceProvider,
        id: ResourceId,
        size: IntSize,
    ) -> Option<Self> {
        let info = resources.resource_info(id)?;
        if !info.is_overlay_candidate {
            return None;
        }
        self.resource_id = Some(id);
        self.resource_size = size;
        self.format = info.format;
        Some(self)
    }

    fn with_texture(
        self,
        resources: &dyn ResourceProvider,
        transform: &Transform3d,
        texture: &TextureContent,
    ) -> Option<Self> {
        if texture.background_color.a != 0 || texture.premultiplied_alpha {
            return None;
        }
        let plane = OverlayTransform::classify(transform, texture.y_flipped)?;
        let mut out = self.with_resource(resources, texture.resource_id, texture.resource_size)?;
        out.transform = plane;
        out.uv_rect = Rect::from_points(texture.uv_top_left, texture.uv_bottom_right);
        Some(out)
    }

    fn with_stream_video(
        self,
        resources: &dyn ResourceProvider,
        transform: &Transform3d,
        id: ResourceId,
        size: IntSize,
        matrix: &Transform3d,
    ) -> Option<Self> {
        let mut plane = OverlayTransform::classify(transform, false)?;
        // Texture coordinates may only be scaled and offset.
        if !matrix.is_scale_or_translation() {
            return None;
        }
        let mut uv0 = matrix.map_point(Point::ORIGIN);
        let mut uv1 = matrix.map_point(Point::new(1.0, 1.0));
        if uv1.x < uv0.x {
            plane = plane.then_flip_horizontal()?;
            core::mem::swap(&mut uv0.x, &mut uv1.x);
        }
        if uv1.y < uv0.y {
            plane = plane.then_flip_vertical()?;
            core::mem::swap(&mut uv0.y, &mut uv1.y);
        }
        let mut out = self.with_resource(resources, id, size)?;
        out.transform = plane;
        out.uv_rect = Rect::from_points(uv0, uv1);
        Some(out)
    }
}

// ---------------------------------------------------------------------------
// Occlusion
// ---------------------------------------------------------------------------

/// The rect of the quad at `index` mapped into target space.
#[must_use]
pub(crate) fn target_rect(pass: &RenderPass, index: usize) -> Rect {
    let quad = &pass.quads.as_slice()[index];
    pass.shared_quad_state(quad.shared_quad_state)
        .quad_to_target_transform
        .map_rect(quad.rect.to_rect())
}

/// Like [`target_rect`], intersected with the shared state's clip.
#[must_use]
pub(crate) fn clipped_target_rect(pass: &RenderPass, index: usize) -> Rect {
    let rect = target_rect(pass, index);
    let sqs = pass.shared_quad_state_of(index);
    if sqs.is_clipped {
        intersect_rect(rect, sqs.clip_rect.to_rect())
    } else {
        rect
    }
}

/// Returns `true` if any visible quad in front of `index` overlaps `rect`.
#[must_use]
pub fn is_occluded(pass: &RenderPass, index: usize, rect: Rect) -> bool {
    (0..index).any(|above| {
        let quad = &pass.quads.as_slice()[above];
        !quad.is_invisible(pass.shared_quad_state(quad.shared_quad_state))
            && rects_intersect(target_rect(pass, above), rect)
    })
}

/// Union of the parts of `rect` covered by visible quads in front of
/// `index`, with every quad's clip applied.
#[must_use]
pub fn occlusion_bounds(pass: &RenderPass, index: usize, rect: Rect) -> Rect {
    let mut bounds = Rect::ZERO;
    for above in 0..index {
        let quad = &pass.quads.as_slice()[above];
        if quad.is_invisible(pass.shared_quad_state(quad.shared_quad_state)) {
            continue;
        }
        let overlap = intersect_rect(clipped_target_rect(pass, above), rect);
        bounds = union_rect(bounds, overlap);
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;
    use planar_core::geometry::rect_is_empty;
    use planar_core::quad::Color;

    fn classify(t: Transform3d) -> Option<OverlayTransform> {
        OverlayTransform::classify(&t, false)
    }

    #[test]
    fn classify_mirrors_and_rotations() {
        assert_eq!(classify(Transform3d::IDENTITY), Some(OverlayTransform::None), "identity");
        assert_eq!(
            classify(Transform3d::from_scale(2.0, -1.0, 1.0)),
            Some(OverlayTransform::FlipVertical),
            "negative y scale"
        );
        assert_eq!(
            classify(Transform3d::from_scale(-1.0, 2.0, 1.0)),
            Some(OverlayTransform::FlipHorizontal),
            "negative x scale"
        );
        let quarter = core::f64::consts::FRAC_PI_2;
        assert_eq!(
            classify(Transform3d::from_rotation_z(quarter)),
            Some(OverlayTransform::Rotate90),
            "90"
        );
        assert_eq!(
            classify(Transform3d::from_rotation_z(2.0 * quarter)),
            Some(OverlayTransform::Rotate180),
            "180"
        );
        assert_eq!(
            classify(Transform3d::from_rotation_z(3.0 * quarter)),
            Some(OverlayTransform::Rotate270),
            "270"
        );
    }

    #[test]
    fn classify_rejects_skew_and_tilt() {
        assert_eq!(
            classify(Transform3d::from_rotation_z(core::f64::consts::FRAC_PI_4)),
            None,
            "45 degrees"
        );
        assert_eq!(
            classify(Transform3d::from_rotation_x(core::f64::consts::FRAC_PI_4)),
            None,
            "x tilt"
        );
        let skew = Transform3d::from_affine([1.0, 0.0, 0.5, 1.0, 0.0, 0.0]);
        assert_eq!(classify(skew), None, "skew");
    }

    #[test]
    fn y_flip_composes_vertical_mirror() {
        assert_eq!(
            OverlayTransform::classify(&Transform3d::IDENTITY, true),
            Some(OverlayTransform::FlipVertical),
            "bottom-up storage"
        );
    }

    #[test]
    fn flips_compose_to_rotation() {
        assert_eq!(
            OverlayTransform::FlipHorizontal.then_flip_vertical(),
            Some(OverlayTransform::Rotate180),
            "both mirrors"
        );
        assert_eq!(
            OverlayTransform::Rotate90.then_flip_horizontal(),
            None,
            "transposed mirror is not a plane transform"
        );
    }

    #[test]
    fn texture_candidate_fields() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_candidate(&mut pass, &mut resources, OVERLAY_RECT);
        let quad = pass.quads.get(0).unwrap();
        let c = OverlayCandidate::from_draw_quad(&resources, pass.shared_quad_state_of(0), quad)
            .expect("texture quad is a candidate");
        assert_eq!(c.display_rect, OVERLAY_RECT.to_rect(), "display rect");
        assert_eq!(c.uv_rect, Rect::new(0.1, 0.2, 1.0, 1.0), "uv rect");
        assert_eq!(c.resource_size, OVERLAY_RECT.size(), "resource size");
        assert!(c.is_opaque, "opaque texture");
        assert!(!c.overlay_handled, "validator has not run");
    }

    #[test]
    fn ineligible_resource_is_not_a_candidate() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        let id = push_candidate(&mut pass, &mut resources, OVERLAY_RECT);
        resources.set_overlay_candidate(id, false);
        let quad = pass.quads.get(0).unwrap();
        assert!(
            OverlayCandidate::from_draw_quad(&resources, pass.shared_quad_state_of(0), quad)
                .is_none(),
            "producer did not flag the resource"
        );
    }

    #[test]
    fn stream_video_mirrors_fold_into_transform() {
        let cases = [
            (NORMAL_UV_MATRIX, Some(OverlayTransform::None)),
            (X_MIRROR_UV_MATRIX, Some(OverlayTransform::FlipHorizontal)),
            (Y_MIRROR_UV_MATRIX, Some(OverlayTransform::FlipVertical)),
            (BOTH_MIRROR_UV_MATRIX, Some(OverlayTransform::Rotate180)),
            (SWAP_UV_MATRIX, None),
        ];
        for (matrix, expected) in cases {
            let mut resources = FakeResources::new();
            let mut pass = new_pass();
            push_stream_video(&mut pass, &mut resources, OVERLAY_RECT, matrix);
            let quad = pass.quads.get(0).unwrap();
            let c = OverlayCandidate::from_draw_quad(&resources, pass.shared_quad_state_of(0), quad);
            assert_eq!(c.as_ref().map(|c| c.transform), expected, "matrix {matrix:?}");
            if let Some(c) = c {
                let uv = c.uv_rect;
                assert!(
                    (uv.x0 - 0.1).abs() < 1e-6 && (uv.y0 - 0.2).abs() < 1e-6,
                    "uv normalized, got {uv:?}"
                );
            }
        }
    }

    #[test]
    fn blended_states_are_not_candidates() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        let half = pass.push_shared_quad_state(default_state().with_opacity(0.5));
        push_candidate_in(&mut pass, &mut resources, half, OVERLAY_RECT);
        let screen = pass.push_shared_quad_state(default_state().with_blend_mode(BlendMode::Screen));
        push_candidate_in(&mut pass, &mut resources, screen, OVERLAY_RECT);
        for index in 0..2 {
            let quad = pass.quads.get(index).unwrap();
            assert!(
                OverlayCandidate::from_draw_quad(&resources, pass.shared_quad_state_of(index), quad)
                    .is_none(),
                "quad {index} must be rejected"
            );
        }
    }

    #[test]
    fn occlusion_ignores_invisible_and_behind_quads() {
        let mut resources = FakeResources::new();
        let mut pass = new_pass();
        push_transparent_quad(&mut pass, OVERLAY_RECT);
        push_candidate(&mut pass, &mut resources, OVERLAY_RECT);
        push_opaque_quad(&mut pass, OVERLAY_RECT);
        assert!(
            !is_occluded(&pass, 1, OVERLAY_RECT.to_rect()),
            "transparent quads above and opaque quads behind do not occlude"
        );

        let mut pass = new_pass();
        push_opaque_quad(&mut pass, TOP_LEFT_RECT);
        push_candidate(&mut pass, &mut resources, BOTTOM_RIGHT_RECT);
        assert!(
            !is_occluded(&pass, 1, BOTTOM_RIGHT_RECT.to_rect()),
            "disjoint quad above"
        );
        assert!(
            is_occluded(&pass, 1, OVERLAY_RECT.to_rect()),
            "overlapping quad above"
        );
    }

    #[test]
    fn occlusion_bounds_respect_clip() {
        let mut pass = new_pass();
        let clipped = pass.push_shared_quad_state(
            default_state().with_clip(IntRect::from_xywh(0, 3, 100, 100)),
        );
        pass.push_quad(DrawQuad::solid_color(
            clipped,
            IntRect::from_xywh(0, 2, 100, 100),
            Color::WHITE,
        ));
        push_opaque_quad(&mut pass, OVERLAY_RECT);
        let band = Rect::new(0.0, 0.0, 100.0, 3.0);
        let bounds = occlusion_bounds(&pass, 1, band);
        assert!(rect_is_empty(bounds), "clipped occluder misses the band, got {bounds:?}");

        let bounds = occlusion_bounds(&pass, 1, OVERLAY_RECT.to_rect());
        assert_eq!(bounds, Rect::new(0.0, 3.0, 100.0, 102.0), "clipped occluder");
    }
}
