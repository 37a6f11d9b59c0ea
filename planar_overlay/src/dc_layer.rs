// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Promote planar video to a hardware overlay layer.
//!
//! DirectComposition-style compositors can scan out YUV video directly. The
//! first eligible video quad in the root pass is taken off the GPU path:
//!
//! - If nothing visible is drawn above it, it goes on a layer above the
//!   primary plane (`z_order = 1`) and the quad is removed. The area under
//!   it no longer needs repainting once its position is stable.
//! - If something is drawn above it and the platform supports underlays, it
//!   goes below the primary plane (`z_order = -1`) and the quad is replaced
//!   by a transparent hole. Damage then follows the same cross-frame rules
//!   as the underlay strategies, tracked in a [`DamageHistory`] of its own.
//!
//! At most one video is promoted per frame.

use alloc::rc::Rc;
use core::fmt;

use kurbo::Rect;

use planar_core::geometry::IntRect;
use planar_core::quad::{BlendMode, DrawQuad, Material, SharedQuadState, YuvVideoContent};
use planar_core::render_pass::RenderPass;
use planar_core::resource::ResourceProvider;

use crate::candidate::{clipped_target_rect, occlusion_bounds};
use crate::config::DcLayerConfig;
use crate::damage::DamageHistory;
use crate::layer::{LayerContents, LayerRecord, LayerSharedState};

/// Why no video was promoted this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DcLayerRejection {
    /// The video uses a blend mode other than source-over.
    BlendMode,
    /// There is no planar video quad in the pass.
    UnsupportedQuad,
    /// A video plane is not overlay eligible.
    TextureNotCandidate,
    /// The video is rotated or skewed and the platform cannot do that.
    ComplexTransform,
    /// Content is drawn above the video and underlays are not available.
    Occluded,
}

impl fmt::Display for DcLayerRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::BlendMode => "unsupported blend mode",
            Self::UnsupportedQuad => "no planar video quad",
            Self::TextureNotCandidate => "video plane is not an overlay candidate",
            Self::ComplexTransform => "video transform is not axis aligned",
            Self::Occluded => "video is occluded and underlays are disabled",
        };
        f.write_str(what)
    }
}

impl core::error::Error for DcLayerRejection {}

/// Cross-frame state of the video pipeline.
#[derive(Clone, Debug, Default)]
pub struct DcLayerProcessor {
    config: DcLayerConfig,
    history: DamageHistory,
    previous_display_rect: Option<Rect>,
}

impl DcLayerProcessor {
    /// Creates a processor with no previous frame.
    #[must_use]
    pub fn new(config: DcLayerConfig) -> Self {
        Self {
            config,
            history: DamageHistory::new(),
            previous_display_rect: None,
        }
    }

    /// Promotes at most one video quad of `pass`.
    ///
    /// `damage` is shrunk or grown as described in the module docs and
    /// finally clipped to the pass's output rect; `overlay_damage` grows by
    /// the promoted video's rect.
    pub fn process(
        &mut self,
        resources: &dyn ResourceProvider,
        pass: &mut RenderPass,
        damage: &mut IntRect,
        overlay_damage: &mut IntRect,
    ) -> Result<LayerRecord, DcLayerRejection> {
        let display_rect = pass.output_rect.to_rect();
        let display_rect_changed = self.previous_display_rect != Some(display_rect);
        let mut had_underlay = false;
        let mut outcome = Err(DcLayerRejection::UnsupportedQuad);

        for index in 0..pass.quads.len() {
            let quad = &pass.quads.as_slice()[index];
            let sqs = pass.shared_quad_state(quad.shared_quad_state);
            let video = match video_content(resources, quad, sqs) {
                Ok(video) => video,
                Err(rejection) => {
                    if rejection != DcLayerRejection::UnsupportedQuad {
                        outcome = Err(rejection);
                    }
                    continue;
                }
            };
            let transform = sqs.quad_to_target_transform;
            let axis_aligned = transform.preserves_2d_axis_alignment();
            if !axis_aligned && !self.config.complex_transforms {
                outcome = Err(DcLayerRejection::ComplexTransform);
                continue;
            }

            let quad_rect = IntRect::enclosing(clipped_target_rect(pass, index));
            let occlusion = occlusion_bounds(pass, index, quad_rect.to_rect());
            let occluded = !IntRect::enclosing(occlusion).is_empty();
            if occluded && !self.config.underlays {
                outcome = Err(DcLayerRejection::Occluded);
                continue;
            }

            let mut layer = layer_for(quad, sqs, video);
            layer.quad_rect = quad_rect;
            let blends = quad.should_draw_with_blending(sqs);
            let opacity = sqs.opacity;

            if occluded {
                layer.z_order = -1;
                if transform.is_identity_or_integer_translation() {
                    self.history.apply_underlay(
                        quad_rect,
                        IntRect::enclosing(occlusion),
                        opacity == 1.0,
                        damage,
                    );
                    had_underlay = true;
                } else {
                    *damage = damage.union(quad_rect);
                }
                pass.quads.replace_with_transparent_hole(index);
            } else {
                layer.z_order = 1;
                if axis_aligned && !display_rect_changed && !blends {
                    *damage = damage.subtract(quad_rect);
                }
                pass.quads.remove(index);
            }
            *overlay_damage = overlay_damage.union(quad_rect);
            outcome = Ok(layer);
            break;
        }

        if !had_underlay {
            self.history.reset();
        }
        *damage = damage.intersect(IntRect::enclosing(display_rect));
        self.previous_display_rect = Some(display_rect);
        outcome
    }
}

fn video_content<'q>(
    resources: &dyn ResourceProvider,
    quad: &'q DrawQuad,
    sqs: &SharedQuadState,
) -> Result<&'q YuvVideoContent, DcLayerRejection> {
    let Material::YuvVideo(video) = &quad.material else {
        return Err(DcLayerRejection::UnsupportedQuad);
    };
    if sqs.blend_mode != BlendMode::SourceOver {
        return Err(DcLayerRejection::BlendMode);
    }
    if !video.planes().all(|id| resources.is_overlay_candidate(id)) {
        return Err(DcLayerRejection::TextureNotCandidate);
    }
    Ok(video)
}

fn layer_for(quad: &DrawQuad, sqs: &SharedQuadState, video: &YuvVideoContent) -> LayerRecord {
    let shared = Rc::new(LayerSharedState {
        is_clipped: sqs.is_clipped,
        clip_rect: sqs.clip_rect.to_rect(),
        opacity: sqs.opacity,
        sorting_context_id: sqs.sorting_context_id,
        transform: sqs.quad_to_target_transform,
    });
    let mut layer = LayerRecord::new(shared, quad.rect.to_rect());
    layer.contents = LayerContents::Video {
        planes: video.planes().collect(),
        color_space: video.color_space,
        require_overlay: video.require_overlay,
    };
    layer.contents_rect = video.ya_tex_coord_rect;
    layer
}
