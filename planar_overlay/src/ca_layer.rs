// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hand the whole root pass to the window server as layers.
//!
//! Platforms with a layer compositor (Core Animation) can draw most quads
//! themselves: solid colours, textures, tiles, video and even other render
//! passes, with arbitrary 2-D or 3-D transforms. [`process_for_ca_layers`]
//! walks the root pass back to front and turns every quad into a
//! [`LayerRecord`]. The conversion is all or nothing: a single quad the
//! platform cannot draw keeps the whole pass on the GPU path.
//!
//! Render-pass quads are accepted with a fixed set of filters and no
//! background filters, up to [`CaLayerConfig::max_render_pass_quads`] per
//! frame. Their output is later copied into a pooled surface by
//! [`assign_copy_surfaces`].

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};

use planar_core::filter::FilterOperation;
use planar_core::geometry::IntRect;
use planar_core::quad::{BlendMode, DrawQuad, Material, SharedQuadState, SharedQuadStateId};
use planar_core::render_pass::{FilterMap, RenderPass, RenderPassId};
use planar_core::resource::{ResourceId, ResourceProvider};
use planar_core::transform::Transform3d;

use crate::config::CaLayerConfig;
use crate::copy_pool::RenderPassCopyPool;
use crate::layer::{EdgeAaMask, LayerContents, LayerFilter, LayerRecord, LayerSharedState};

/// Why a pass could not be handed over as layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaLayerRejection {
    /// A quad uses a blend mode other than source-over.
    BlendMode,
    /// A texture's resource is not overlay eligible.
    TextureNotCandidate,
    /// A stream video's resource is not overlay eligible.
    StreamVideoNotCandidate,
    /// A stream video's texture matrix does more than scale and offset.
    StreamVideoTransform,
    /// A tile's resource is not overlay eligible.
    TileNotCandidate,
    /// A texture has different opacities at its corners.
    DifferentVertexOpacities,
    /// Debug borders are drawn by the GPU path.
    DebugBorder,
    /// Embedded surfaces have to be resolved first.
    SurfaceContent,
    /// Planar video has no layer representation.
    YuvVideoContent,
    /// A render pass samples the content behind it.
    RenderPassBackgroundFilters,
    /// A render pass uses a filter the platform cannot apply.
    RenderPassFilterOperationType,
    /// More render-pass quads than the frame allows.
    TooManyRenderPassQuads,
    /// Two quads in one 3-D sorting context are clipped differently.
    DifferentClipSettingsInSortingContext,
}

impl fmt::Display for CaLayerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::BlendMode => "unsupported blend mode",
            Self::TextureNotCandidate => "texture is not an overlay candidate",
            Self::StreamVideoNotCandidate => "stream video is not an overlay candidate",
            Self::StreamVideoTransform => "stream video texture matrix is not scale/translate",
            Self::TileNotCandidate => "tile is not an overlay candidate",
            Self::DifferentVertexOpacities => "texture vertex opacities differ",
            Self::DebugBorder => "debug border quad",
            Self::SurfaceContent => "surface reference quad",
            Self::YuvVideoContent => "YUV video quad",
            Self::RenderPassBackgroundFilters => "render pass has background filters",
            Self::RenderPassFilterOperationType => "render pass filter is not supported",
            Self::TooManyRenderPassQuads => "too many render pass quads",
            Self::DifferentClipSettingsInSortingContext => {
                "clip settings differ within a sorting context"
            }
        };
        f.write_str(what)
    }
}

impl core::error::Error for CaLayerRejection {}

/// Converts every quad of `pass` into a layer, back to front.
///
/// Fully transparent quads are skipped. Returns the records in drawing
/// order, or the first reason a quad could not be converted.
pub fn process_for_ca_layers(
    resources: &dyn ResourceProvider,
    pass: &RenderPass,
    filters: &FilterMap,
    background_filters: &FilterMap,
    config: &CaLayerConfig,
) -> Result<Vec<LayerRecord>, CaLayerRejection> {
    let mut builder = Builder {
        resources,
        filters,
        background_filters,
        config,
        render_pass_quads: 0,
        shared: None,
        previous_sqs: None,
    };
    let mut layers = Vec::new();
    for quad in pass.quads.iter().rev() {
        let sqs = pass.shared_quad_state(quad.shared_quad_state);
        if let Some(layer) = builder.layer_for(quad, sqs)? {
            layers.push(layer);
        }
    }
    Ok(layers)
}

/// Gives every render-pass layer a copy surface sized to its bounds in
/// target space.
pub fn assign_copy_surfaces(layers: &mut [LayerRecord], pool: &mut RenderPassCopyPool) {
    for layer in layers {
        if let LayerContents::RenderPass { copy, .. } = &mut layer.contents {
            let target = layer.shared_state.transform.map_rect(layer.bounds_rect);
            *copy = Some(pool.acquire(IntRect::enclosing(target).size()));
        }
    }
}

struct Builder<'a> {
    resources: &'a dyn ResourceProvider,
    filters: &'a FilterMap,
    background_filters: &'a FilterMap,
    config: &'a CaLayerConfig,
    render_pass_quads: usize,
    shared: Option<(SharedQuadStateId, Rc<LayerSharedState>)>,
    previous_sqs: Option<&'a SharedQuadState>,
}

impl<'a> Builder<'a> {
    fn layer_for(
        &mut self,
        quad: &DrawQuad,
        sqs: &'a SharedQuadState,
    ) -> Result<Option<LayerRecord>, CaLayerRejection> {
        if sqs.blend_mode != BlendMode::SourceOver {
            return Err(CaLayerRejection::BlendMode);
        }
        if sqs.opacity == 0.0 {
            return Ok(None);
        }
        self.check_sorting_context(sqs)?;
        self.previous_sqs = Some(sqs);

        let shared = self.shared_state(quad.shared_quad_state, sqs);
        let mut layer = LayerRecord::new(shared, quad.rect.to_rect());
        layer.edge_aa_mask = edge_aa_mask(quad, sqs);

        match &quad.material {
            Material::SolidColor { color, .. } => {
                if color.a == 0 {
                    return Ok(None);
                }
                layer.background_color = *color;
            }
            Material::Texture(texture) => {
                if !self.resources.is_overlay_candidate(texture.resource_id) {
                    return Err(CaLayerRejection::TextureNotCandidate);
                }
                let [first, rest @ ..] = texture.vertex_opacity;
                if rest.iter().any(|&o| o != first) {
                    return Err(CaLayerRejection::DifferentVertexOpacities);
                }
                if first != 1.0 || texture.y_flipped {
                    let mut state = (*layer.shared_state).clone();
                    state.opacity *= first;
                    if texture.y_flipped {
                        let r = quad.rect.to_rect();
                        state.transform = state.transform
                            * Transform3d::from_translation(0.0, r.y0 + r.y1, 0.0)
                            * Transform3d::from_scale(1.0, -1.0, 1.0);
                    }
                    layer.shared_state = Rc::new(state);
                }
                layer.contents = LayerContents::Resource(texture.resource_id);
                layer.contents_rect =
                    Rect::from_points(texture.uv_top_left, texture.uv_bottom_right);
                layer.background_color = texture.background_color;
                layer.filter = filter_for(texture.nearest_neighbor);
            }
            Material::Tile {
                resource_id,
                tex_coord_rect,
                texture_size,
                nearest_neighbor,
            } => {
                if !self.resources.is_overlay_candidate(*resource_id) {
                    return Err(CaLayerRejection::TileNotCandidate);
                }
                layer.contents = LayerContents::Resource(*resource_id);
                layer.contents_rect = Rect::new(
                    tex_coord_rect.x0 / texture_size.width,
                    tex_coord_rect.y0 / texture_size.height,
                    tex_coord_rect.x1 / texture_size.width,
                    tex_coord_rect.y1 / texture_size.height,
                );
                layer.filter = filter_for(*nearest_neighbor);
            }
            Material::StreamVideo {
                resource_id,
                matrix,
                ..
            } => {
                if !self.resources.is_overlay_candidate(*resource_id) {
                    return Err(CaLayerRejection::StreamVideoNotCandidate);
                }
                if !matrix.is_scale_or_translation() {
                    return Err(CaLayerRejection::StreamVideoTransform);
                }
                layer.contents = LayerContents::Resource(*resource_id);
                layer.contents_rect = Rect::from_points(
                    matrix.map_point(Point::ORIGIN),
                    matrix.map_point(Point::new(1.0, 1.0)),
                );
            }
            Material::RenderPass {
                render_pass_id,
                mask_resource_id,
                ..
            } => {
                self.check_render_pass(*render_pass_id)?;
                layer.contents = LayerContents::RenderPass {
                    render_pass_id: *render_pass_id,
                    mask: *mask_resource_id,
                    copy: None,
                };
            }
            Material::DebugBorder { .. } => return Err(CaLayerRejection::DebugBorder),
            Material::SurfaceReference { .. } => return Err(CaLayerRejection::SurfaceContent),
            Material::YuvVideo(_) => return Err(CaLayerRejection::YuvVideoContent),
        }
        Ok(Some(layer))
    }

    /// Quads of one sorting context are split into planes by the window
    /// server, which only works if they share a clip.
    fn check_sorting_context(&self, sqs: &SharedQuadState) -> Result<(), CaLayerRejection> {
        let Some(previous) = self.previous_sqs else {
            return Ok(());
        };
        if sqs.sorting_context_id == 0
            || core::ptr::eq(previous, sqs)
            || previous.sorting_context_id != sqs.sorting_context_id
        {
            return Ok(());
        }
        if previous.is_clipped != sqs.is_clipped
            || (sqs.is_clipped && previous.clip_rect != sqs.clip_rect)
        {
            return Err(CaLayerRejection::DifferentClipSettingsInSortingContext);
        }
        Ok(())
    }

    fn check_render_pass(&mut self, id: RenderPassId) -> Result<(), CaLayerRejection> {
        if self
            .background_filters
            .get(&id)
            .is_some_and(|ops| !ops.is_empty())
        {
            return Err(CaLayerRejection::RenderPassBackgroundFilters);
        }
        if let Some(ops) = self.filters.get(&id)
            && !ops.iter().all(is_supported_filter)
        {
            return Err(CaLayerRejection::RenderPassFilterOperationType);
        }
        self.render_pass_quads += 1;
        if self.render_pass_quads > self.config.max_render_pass_quads {
            return Err(CaLayerRejection::TooManyRenderPassQuads);
        }
        Ok(())
    }

    fn shared_state(&mut self, id: SharedQuadStateId, sqs: &SharedQuadState) -> Rc<LayerSharedState> {
        if let Some((cached, state)) = &self.shared
            && *cached == id
        {
            return Rc::clone(state);
        }
        let state = Rc::new(LayerSharedState {
            is_clipped: sqs.is_clipped,
            clip_rect: sqs.clip_rect.to_rect(),
            opacity: sqs.opacity,
            sorting_context_id: sqs.sorting_context_id,
            transform: sqs.quad_to_target_transform,
        });
        self.shared = Some((id, Rc::clone(&state)));
        state
    }
}

fn is_supported_filter(op: &FilterOperation) -> bool {
    matches!(
        op,
        FilterOperation::Grayscale(_)
            | FilterOperation::Sepia(_)
            | FilterOperation::Saturate(_)
            | FilterOperation::HueRotate(_)
            | FilterOperation::Invert(_)
            | FilterOperation::Brightness(_)
            | FilterOperation::Contrast(_)
            | FilterOperation::Opacity(_)
            | FilterOperation::Blur(_)
            | FilterOperation::DropShadow { .. }
    )
}

fn filter_for(nearest_neighbor: bool) -> LayerFilter {
    if nearest_neighbor {
        LayerFilter::Nearest
    } else {
        LayerFilter::Linear
    }
}

fn edge_aa_mask(quad: &DrawQuad, sqs: &SharedQuadState) -> EdgeAaMask {
    if let Material::SolidColor {
        force_anti_aliasing_off: true,
        ..
    } = quad.material
    {
        return EdgeAaMask::empty();
    }
    let mut mask = EdgeAaMask::empty();
    mask.set(EdgeAaMask::LEFT, quad.is_left_edge(sqs));
    mask.set(EdgeAaMask::RIGHT, quad.is_right_edge(sqs));
    mask.set(EdgeAaMask::BOTTOM, quad.is_bottom_edge(sqs));
    mask.set(EdgeAaMask::TOP, quad.is_top_edge(sqs));
    mask
}

/// Resources a set of layers keeps on screen.
pub(crate) fn layer_resources(layers: &[LayerRecord]) -> Vec<ResourceId> {
    layers.iter().flat_map(|l| l.contents.resources()).collect()
}
