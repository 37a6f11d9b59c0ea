// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Draw quads and the state they share.
//!
//! A [`DrawQuad`] is one rectangular primitive. Its transform, opacity, clip
//! and blend mode live in a [`SharedQuadState`] that a run of consecutive
//! quads points at by [`SharedQuadStateId`]. Shared states are owned by the
//! render pass that created them and are read-only once quads reference
//! them.
//!
//! [`QuadList`] keeps quads in front-to-back order: index 0 is drawn last,
//! on top of everything else. Replacing a quad swaps its [`Material`] in
//! place and leaves every other index untouched; removing a quad is a real
//! erase that shifts the quads behind it forward.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect, Size};

use crate::geometry::{IntRect, IntSize};
use crate::render_pass::RenderPassId;
use crate::resource::{ColorSpace, ResourceId};
use crate::transform::Transform3d;

/// An 8-bit straight-alpha colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a colour from components.
    #[inline]
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a fraction in `0.0..=1.0`.
    #[inline]
    #[must_use]
    pub fn alpha_f32(self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

/// Blend mode used to composite a quad onto its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard source-over alpha compositing.
    #[default]
    SourceOver,
    /// Multiply blend.
    Multiply,
    /// Screen blend.
    Screen,
    /// Destination-out; punches holes.
    DestinationOut,
}

/// Index handle for a [`SharedQuadState`] inside its render pass.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SharedQuadStateId(pub u32);

impl fmt::Debug for SharedQuadStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedQuadStateId({})", self.0)
    }
}

/// Transform, opacity, clip and blend metadata shared by a run of quads.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedQuadState {
    /// Maps quad space into the render pass's target space.
    pub quad_to_target_transform: Transform3d,
    /// Bounds of the layer the quads were produced from, in quad space.
    pub quad_layer_rect: IntRect,
    /// Visible part of [`quad_layer_rect`](Self::quad_layer_rect).
    pub visible_quad_layer_rect: IntRect,
    /// Clip in target space, meaningful only when `is_clipped` is set.
    pub clip_rect: IntRect,
    /// Whether `clip_rect` applies.
    pub is_clipped: bool,
    /// Opacity multiplier for every quad in the run.
    pub opacity: f32,
    /// Blend mode for every quad in the run.
    pub blend_mode: BlendMode,
    /// 3-D sorting context; zero means "not in a 3-D context".
    pub sorting_context_id: i32,
}

impl SharedQuadState {
    /// Creates an unclipped, opaque, source-over state with the given
    /// transform and layer rect.
    #[must_use]
    pub fn new(transform: Transform3d, layer_rect: IntRect) -> Self {
        Self {
            quad_to_target_transform: transform,
            quad_layer_rect: layer_rect,
            visible_quad_layer_rect: layer_rect,
            clip_rect: IntRect::ZERO,
            is_clipped: false,
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            sorting_context_id: 0,
        }
    }

    /// Sets a clip rect.
    #[must_use]
    pub fn with_clip(mut self, clip_rect: IntRect) -> Self {
        self.clip_rect = clip_rect;
        self.is_clipped = true;
        self
    }

    /// Sets the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Sets the blend mode.
    #[must_use]
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Sets the sorting context.
    #[must_use]
    pub fn with_sorting_context(mut self, id: i32) -> Self {
        self.sorting_context_id = id;
        self
    }
}

/// Texture-backed content.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureContent {
    /// Backing resource.
    pub resource_id: ResourceId,
    /// Size of the backing resource in pixels.
    pub resource_size: IntSize,
    /// Whether colour channels are premultiplied by alpha.
    pub premultiplied_alpha: bool,
    /// Texture coordinate of the quad's top-left corner.
    pub uv_top_left: Point,
    /// Texture coordinate of the quad's bottom-right corner.
    pub uv_bottom_right: Point,
    /// Colour drawn behind the texture.
    pub background_color: Color,
    /// Per-corner opacity (top-left, bottom-left, bottom-right, top-right).
    pub vertex_opacity: [f32; 4],
    /// Whether the texture rows are stored bottom-up.
    pub y_flipped: bool,
    /// Sample with nearest-neighbour filtering.
    pub nearest_neighbor: bool,
}

impl TextureContent {
    /// Creates a content record sampling the whole resource.
    #[must_use]
    pub fn new(resource_id: ResourceId, resource_size: IntSize) -> Self {
        Self {
            resource_id,
            resource_size,
            premultiplied_alpha: false,
            uv_top_left: Point::ORIGIN,
            uv_bottom_right: Point::new(1.0, 1.0),
            background_color: Color::TRANSPARENT,
            vertex_opacity: [1.0; 4],
            y_flipped: false,
            nearest_neighbor: false,
        }
    }
}

/// Planar YUV video content.
#[derive(Clone, Debug, PartialEq)]
pub struct YuvVideoContent {
    /// Luma plane.
    pub y_plane: ResourceId,
    /// Chroma planes; a single entry for interleaved (NV12) chroma.
    pub uv_planes: Vec<ResourceId>,
    /// Optional alpha plane.
    pub a_plane: Option<ResourceId>,
    /// Sampled region of the Y/A planes, in normalized coordinates.
    pub ya_tex_coord_rect: Rect,
    /// Sampled region of the U/V planes, in normalized coordinates.
    pub uv_tex_coord_rect: Rect,
    /// Colour space of the decoded frame.
    pub color_space: ColorSpace,
    /// The producer asks for an overlay regardless of cost (protected
    /// content).
    pub require_overlay: bool,
}

impl YuvVideoContent {
    /// Every plane resource, luma first.
    pub fn planes(&self) -> impl Iterator<Item = ResourceId> + '_ {
        core::iter::once(self.y_plane)
            .chain(self.uv_planes.iter().copied())
            .chain(self.a_plane)
    }
}

/// What a quad draws.
#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    /// A flat colour.
    SolidColor {
        /// Fill colour.
        color: Color,
        /// Disable edge anti-aliasing.
        force_anti_aliasing_off: bool,
    },
    /// A texture.
    Texture(TextureContent),
    /// A single-plane video frame with a texture-coordinate matrix.
    StreamVideo {
        /// Backing resource.
        resource_id: ResourceId,
        /// Size of the backing resource in pixels.
        resource_size: IntSize,
        /// Maps unit-square texture coordinates to sampled coordinates.
        matrix: Transform3d,
    },
    /// A planar YUV video frame.
    YuvVideo(YuvVideoContent),
    /// The output of another render pass.
    RenderPass {
        /// Which pass to draw.
        render_pass_id: RenderPassId,
        /// Optional mask texture.
        mask_resource_id: Option<ResourceId>,
        /// Sampled region of the mask.
        mask_uv_rect: Rect,
        /// Scale applied to filter parameters.
        filters_scale: Size,
    },
    /// Content embedded from another compositor frame.
    SurfaceReference {
        /// Embedded surface.
        surface_id: u64,
    },
    /// One tile of a tiled layer.
    Tile {
        /// Backing resource.
        resource_id: ResourceId,
        /// Sampled texel rect.
        tex_coord_rect: Rect,
        /// Size of the tile texture in texels.
        texture_size: Size,
        /// Sample with nearest-neighbour filtering.
        nearest_neighbor: bool,
    },
    /// A debug outline.
    DebugBorder {
        /// Outline colour.
        color: Color,
        /// Outline width in pixels.
        width: i32,
    },
}

impl Material {
    /// Short name of the variant, for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::SolidColor { .. } => "solid-color",
            Self::Texture(_) => "texture",
            Self::StreamVideo { .. } => "stream-video",
            Self::YuvVideo(_) => "yuv-video",
            Self::RenderPass { .. } => "render-pass",
            Self::SurfaceReference { .. } => "surface",
            Self::Tile { .. } => "tile",
            Self::DebugBorder { .. } => "debug-border",
        }
    }
}

/// One rectangular drawing primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawQuad {
    /// Full rect in quad space.
    pub rect: IntRect,
    /// Part of `rect` that is not occluded or clipped away.
    pub visible_rect: IntRect,
    /// Part of `rect` known to be fully opaque. May be empty.
    pub opaque_rect: IntRect,
    /// Whether the content itself has alpha.
    pub needs_blending: bool,
    /// Shared metadata for this quad.
    pub shared_quad_state: SharedQuadStateId,
    /// What the quad draws.
    pub material: Material,
}

impl DrawQuad {
    /// Creates a quad whose visible rect is its full rect.
    ///
    /// The opaque rect is the full rect unless `needs_blending` is set.
    #[must_use]
    pub fn new(
        shared_quad_state: SharedQuadStateId,
        rect: IntRect,
        needs_blending: bool,
        material: Material,
    ) -> Self {
        Self {
            rect,
            visible_rect: rect,
            opaque_rect: if needs_blending { IntRect::ZERO } else { rect },
            needs_blending,
            shared_quad_state,
            material,
        }
    }

    /// Creates a solid-colour quad. Blending follows the colour's alpha.
    #[must_use]
    pub fn solid_color(shared_quad_state: SharedQuadStateId, rect: IntRect, color: Color) -> Self {
        Self::new(
            shared_quad_state,
            rect,
            color.a < 255,
            Material::SolidColor {
                color,
                force_anti_aliasing_off: false,
            },
        )
    }

    /// Returns `true` if drawing this quad must blend with what is below.
    #[must_use]
    pub fn should_draw_with_blending(&self, sqs: &SharedQuadState) -> bool {
        if self.needs_blending || sqs.opacity < 1.0 {
            return true;
        }
        if self.visible_rect.is_empty() {
            return false;
        }
        !self.opaque_rect.contains_rect(self.visible_rect)
    }

    /// Returns `true` if the quad contributes nothing visible.
    ///
    /// That is either a shared opacity of (almost) zero, or a blended solid
    /// colour whose effective alpha is (almost) zero.
    #[must_use]
    pub fn is_invisible(&self, sqs: &SharedQuadState) -> bool {
        if sqs.opacity < f32::EPSILON {
            return true;
        }
        if let Material::SolidColor { color, .. } = self.material {
            let alpha = color.alpha_f32() * sqs.opacity;
            return self.should_draw_with_blending(sqs) && alpha < f32::EPSILON;
        }
        false
    }

    /// Whether the left edge of the quad touches its layer's left edge.
    #[inline]
    #[must_use]
    pub fn is_left_edge(&self, sqs: &SharedQuadState) -> bool {
        self.rect.x0 == sqs.quad_layer_rect.x0
    }

    /// Whether the right edge of the quad touches its layer's right edge.
    #[inline]
    #[must_use]
    pub fn is_right_edge(&self, sqs: &SharedQuadState) -> bool {
        self.rect.x1 == sqs.quad_layer_rect.x1
    }

    /// Whether the top edge of the quad touches its layer's top edge.
    #[inline]
    #[must_use]
    pub fn is_top_edge(&self, sqs: &SharedQuadState) -> bool {
        self.rect.y0 == sqs.quad_layer_rect.y0
    }

    /// Whether the bottom edge of the quad touches its layer's bottom edge.
    #[inline]
    #[must_use]
    pub fn is_bottom_edge(&self, sqs: &SharedQuadState) -> bool {
        self.rect.y1 == sqs.quad_layer_rect.y1
    }

    /// Returns the resources this quad samples from, in a fixed order.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceId> {
        match &self.material {
            Material::Texture(t) => alloc::vec![t.resource_id],
            Material::StreamVideo { resource_id, .. } | Material::Tile { resource_id, .. } => {
                alloc::vec![*resource_id]
            }
            Material::YuvVideo(yuv) => yuv.planes().collect(),
            Material::RenderPass {
                mask_resource_id, ..
            } => mask_resource_id.iter().copied().collect(),
            Material::SolidColor { .. }
            | Material::SurfaceReference { .. }
            | Material::DebugBorder { .. } => Vec::new(),
        }
    }
}

/// Front-to-back sequence of quads in one render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuadList {
    quads: Vec<DrawQuad>,
}

impl QuadList {
    /// Creates an empty list.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quads.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// Returns `true` if there are no quads.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Appends a quad behind every quad already in the list.
    #[inline]
    pub fn push(&mut self, quad: DrawQuad) {
        self.quads.push(quad);
    }

    /// Returns the quad at `index` (0 is frontmost).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DrawQuad> {
        self.quads.get(index)
    }

    /// Returns the quad at `index` for editing.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DrawQuad> {
        self.quads.get_mut(index)
    }

    /// Front-to-back iteration.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, DrawQuad> {
        self.quads.iter()
    }

    /// The quads as a front-to-back slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[DrawQuad] {
        &self.quads
    }

    /// Erases the quad at `index`, shifting the quads behind it forward.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> DrawQuad {
        self.quads.remove(index)
    }

    /// Replaces the material of the quad at `index` with a transparent
    /// solid colour that overwrites rather than blends, leaving a hole that
    /// an underlay plane shows through.
    ///
    /// The quad keeps its position, rect and shared state.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace_with_transparent_hole(&mut self, index: usize) {
        let quad = &mut self.quads[index];
        quad.rect = quad.visible_rect;
        quad.opaque_rect = quad.visible_rect;
        quad.needs_blending = false;
        quad.material = Material::SolidColor {
            color: Color::TRANSPARENT,
            force_anti_aliasing_off: true,
        };
    }

    /// Removes every quad.
    #[inline]
    pub fn clear(&mut self) {
        self.quads.clear();
    }
}

impl<'a> IntoIterator for &'a QuadList {
    type Item = &'a DrawQuad;
    type IntoIter = core::slice::Iter<'a, DrawQuad>;

    fn into_iter(self) -> Self::IntoIter {
        self.quads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqs() -> SharedQuadState {
        SharedQuadState::new(Transform3d::IDENTITY, IntRect::from_xywh(0, 0, 256, 256))
    }

    #[test]
    fn opaque_solid_color_does_not_blend() {
        let q = DrawQuad::solid_color(SharedQuadStateId(0), IntRect::from_xywh(0, 0, 8, 8), Color::WHITE);
        assert!(!q.should_draw_with_blending(&sqs()), "opaque white");
        assert!(
            q.should_draw_with_blending(&sqs().with_opacity(0.5)),
            "shared opacity forces blending"
        );
    }

    #[test]
    fn partially_opaque_quad_blends() {
        let mut q = DrawQuad::solid_color(SharedQuadStateId(0), IntRect::from_xywh(0, 0, 8, 8), Color::WHITE);
        q.opaque_rect = IntRect::from_xywh(0, 0, 4, 8);
        assert!(q.should_draw_with_blending(&sqs()), "opaque rect too small");
    }

    #[test]
    fn invisible_quads() {
        let rect = IntRect::from_xywh(0, 0, 8, 8);
        let clear = DrawQuad::solid_color(SharedQuadStateId(0), rect, Color::TRANSPARENT);
        assert!(clear.is_invisible(&sqs()), "transparent solid colour");
        let white = DrawQuad::solid_color(SharedQuadStateId(0), rect, Color::WHITE);
        assert!(!white.is_invisible(&sqs()), "opaque solid colour");
        assert!(white.is_invisible(&sqs().with_opacity(0.0)), "zero opacity");

        // A transparent colour that overwrites instead of blending still
        // punches a hole, so it is not invisible.
        let mut hole = clear.clone();
        hole.needs_blending = false;
        hole.opaque_rect = rect;
        assert!(!hole.is_invisible(&sqs()), "opaque hole is visible");
    }

    #[test]
    fn hole_replacement_keeps_position() {
        let rect = IntRect::from_xywh(0, 0, 8, 8);
        let mut list = QuadList::new();
        list.push(DrawQuad::solid_color(SharedQuadStateId(0), rect, Color::WHITE));
        list.push(DrawQuad::new(
            SharedQuadStateId(0),
            rect,
            false,
            Material::Texture(TextureContent::new(ResourceId(3), IntSize::new(8, 8))),
        ));
        list.replace_with_transparent_hole(1);
        assert_eq!(list.len(), 2, "replacement does not change the count");
        let hole = list.get(1).unwrap();
        assert!(
            matches!(hole.material, Material::SolidColor { color: Color::TRANSPARENT, .. }),
            "material replaced"
        );
        assert!(!hole.needs_blending, "hole overwrites");
        assert_eq!(list.get(0).unwrap().rect, rect, "front quad untouched");
    }

    #[test]
    fn yuv_planes_in_order() {
        let yuv = YuvVideoContent {
            y_plane: ResourceId(1),
            uv_planes: alloc::vec![ResourceId(2), ResourceId(3)],
            a_plane: Some(ResourceId(4)),
            ya_tex_coord_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            uv_tex_coord_rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            color_space: ColorSpace::Rec709,
            require_overlay: false,
        };
        let planes: Vec<_> = yuv.planes().collect();
        assert_eq!(
            planes,
            [ResourceId(1), ResourceId(2), ResourceId(3), ResourceId(4)],
            "luma, chroma, alpha"
        );
    }
}
