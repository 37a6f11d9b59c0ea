// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-frame overlay orchestrator.
//!
//! [`OverlayProcessor::process_for_overlays`] is called once per frame,
//! before the GPU path draws the root pass. It tries the promotion paths in
//! a fixed order and stops at the first that handles the frame:
//!
//! 1. A root pass with copy requests is left alone. Someone wants its
//!    pixels, so nothing may be drawn elsewhere.
//! 2. The layer pipeline, if the validator allows it. On success every
//!    quad of the root pass becomes a platform layer and the pass draws
//!    nothing.
//! 3. The video pipeline, if the validator allows it. On success one video
//!    quad becomes a hardware overlay above or below the primary plane.
//! 4. The validator's strategies, in order. On success one quad becomes an
//!    overlay plane and the frame's damage is updated.
//!
//! A frame that nothing handles keeps its pass untouched and falls back to
//! GPU compositing.
//!
//! The processor keeps the cross-frame state the damage rules need (last
//! frame's underlay, last frame's video rect) and accumulates the area
//! covered by overlays until it is pulled with
//! [`get_and_reset_overlay_damage`](OverlayProcessor::get_and_reset_overlay_damage).
//!
//! Copy surfaces handed to layers stay checked out of the processor's pool
//! until the frame leaves the screen. Pass [`OverlayFrame::copy_surfaces`] to
//! an [`OverlayLockTracker`](crate::lock::OverlayLockTracker) along with the
//! frame's resources, and give it [`OverlayProcessor::copy_pool_mut`] when a
//! swap completes.

use alloc::boxed::Box;
use alloc::vec::Vec;

use planar_core::geometry::IntRect;
use planar_core::render_pass::{RenderPass, collect_filters};
use planar_core::resource::{ResourceId, ResourceProvider};

use crate::ca_layer::{assign_copy_surfaces, layer_resources, process_for_ca_layers};
use crate::candidate::OverlayCandidate;
use crate::config::OverlayConfig;
use crate::copy_pool::{CopySurface, RenderPassCopyPool};
use crate::damage::DamageHistory;
use crate::dc_layer::DcLayerProcessor;
use crate::layer::{LayerContents, LayerRecord};
use crate::strategy::{OverlayStrategy, StrategyContext};
use crate::trace::{CaLayerEvent, DamageEvent, DcLayerEvent, StrategyAttemptEvent, Tracer};
use crate::validator::OverlayValidator;

/// Which path handled a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverlayOutcome {
    /// Nothing was promoted.
    #[default]
    None,
    /// The root pass was handed over as platform layers.
    CaLayers,
    /// A video quad was promoted to a hardware overlay.
    DcLayer,
    /// A strategy promoted a quad to an overlay plane.
    Strategy(OverlayStrategy),
}

/// What one frame's processing produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayFrame {
    /// Planes to schedule, including the primary plane when one was passed
    /// in and not replaced.
    pub candidates: Vec<OverlayCandidate>,
    /// Platform layers, back to front.
    pub ca_layers: Vec<LayerRecord>,
    /// Hardware video layers; at most one.
    pub dc_layers: Vec<LayerRecord>,
    /// Where the primary surface still has content, for
    /// [`OverlayStrategy::UnderlayCast`].
    pub content_bounds: Vec<IntRect>,
    /// Which path handled the frame.
    pub outcome: OverlayOutcome,
}

impl OverlayFrame {
    /// Every resource the frame's overlays read; each must be locked until
    /// the frame leaves the screen.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceId> {
        let planes = self
            .candidates
            .iter()
            .filter(|c| c.overlay_handled && !c.use_output_surface)
            .filter_map(|c| c.resource_id);
        let mut ids: Vec<_> = planes.collect();
        ids.extend(layer_resources(&self.ca_layers));
        ids.extend(layer_resources(&self.dc_layers));
        ids
    }

    /// Copy surfaces assigned to the frame's render-pass layers.
    #[must_use]
    pub fn copy_surfaces(&self) -> Vec<CopySurface> {
        self.ca_layers
            .iter()
            .filter_map(|layer| match layer.contents {
                LayerContents::RenderPass { copy, .. } => copy,
                _ => None,
            })
            .collect()
    }
}

/// Runs overlay promotion frame after frame.
pub struct OverlayProcessor {
    validator: Option<Box<dyn OverlayValidator>>,
    strategies: Vec<OverlayStrategy>,
    config: OverlayConfig,
    history: DamageHistory,
    dc: DcLayerProcessor,
    copy_pool: RenderPassCopyPool,
    overlay_damage: IntRect,
    frame_index: u64,
}

impl core::fmt::Debug for OverlayProcessor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OverlayProcessor")
            .field("has_validator", &self.validator.is_some())
            .field("strategies", &self.strategies)
            .field("frame_index", &self.frame_index)
            .finish_non_exhaustive()
    }
}

impl OverlayProcessor {
    /// Creates a processor.
    ///
    /// The validator's strategy list is read once here. Without a
    /// validator the processor never promotes anything.
    #[must_use]
    pub fn new(validator: Option<Box<dyn OverlayValidator>>, config: OverlayConfig) -> Self {
        let strategies = validator.as_ref().map(|v| v.strategies()).unwrap_or_default();
        Self {
            validator,
            strategies,
            config,
            history: DamageHistory::new(),
            dc: DcLayerProcessor::new(config.dc_layer),
            copy_pool: RenderPassCopyPool::new(config.ca_layer.copy_size_granularity),
            overlay_damage: IntRect::ZERO,
            frame_index: 0,
        }
    }

    /// The configuration the processor was created with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Strategies tried each frame, in order.
    #[inline]
    #[must_use]
    pub fn strategies(&self) -> &[OverlayStrategy] {
        &self.strategies
    }

    /// Render-pass copy surfaces, including those still on screen.
    #[inline]
    #[must_use]
    pub fn copy_pool(&self) -> &RenderPassCopyPool {
        &self.copy_pool
    }

    /// The copy pool, for returning surfaces once their frame is off screen.
    #[inline]
    pub fn copy_pool_mut(&mut self) -> &mut RenderPassCopyPool {
        &mut self.copy_pool
    }

    /// Promotes what it can from the root pass, the last entry of `passes`.
    ///
    /// `candidates` seeds the plane list, usually with
    /// [`OverlayCandidate::primary_plane`]. `damage` is the root pass's
    /// damage and is shrunk or grown to match what the GPU path still has
    /// to draw.
    pub fn process_for_overlays(
        &mut self,
        resources: &dyn ResourceProvider,
        passes: &mut [RenderPass],
        candidates: Vec<OverlayCandidate>,
        damage: &mut IntRect,
        tracer: &mut Tracer<'_>,
    ) -> OverlayFrame {
        let frame_index = self.frame_index;
        self.frame_index += 1;

        let mut frame = OverlayFrame {
            candidates,
            ..OverlayFrame::default()
        };
        frame.outcome = self.process(resources, passes, &mut frame, damage, frame_index, tracer);
        self.copy_pool.end_frame();

        tracer.damage(&DamageEvent {
            frame_index,
            damage: *damage,
            overlay_damage: self.overlay_damage,
            outcome: frame.outcome,
        });
        frame
    }

    /// Returns the area covered by overlays since the last call and clears
    /// it.
    pub fn get_and_reset_overlay_damage(&mut self) -> IntRect {
        core::mem::replace(&mut self.overlay_damage, IntRect::ZERO)
    }

    fn process(
        &mut self,
        resources: &dyn ResourceProvider,
        passes: &mut [RenderPass],
        frame: &mut OverlayFrame,
        damage: &mut IntRect,
        frame_index: u64,
        tracer: &mut Tracer<'_>,
    ) -> OverlayOutcome {
        let (filters, background_filters) = collect_filters(passes);
        let Some(root) = passes.last_mut() else {
            return OverlayOutcome::None;
        };
        let Self {
            validator,
            strategies,
            config,
            history,
            dc,
            copy_pool,
            overlay_damage,
            ..
        } = self;

        if root.has_copy_requests {
            history.reset();
            *dc = DcLayerProcessor::new(config.dc_layer);
            return OverlayOutcome::None;
        }
        let Some(validator) = validator.as_deref_mut() else {
            history.reset();
            return OverlayOutcome::None;
        };

        if validator.allow_ca_layer_overlays() {
            let result = process_for_ca_layers(
                resources,
                root,
                &filters,
                &background_filters,
                &config.ca_layer,
            );
            tracer.ca_layers(&CaLayerEvent {
                frame_index,
                result: result.as_ref().map(Vec::len).map_err(|e| *e),
            });
            if let Ok(mut layers) = result {
                assign_copy_surfaces(&mut layers, copy_pool);
                frame.candidates.clear();
                frame.ca_layers = layers;
                root.quads.clear();
                *overlay_damage = overlay_damage.union(root.output_rect);
                *damage = IntRect::ZERO;
                history.reset();
                return OverlayOutcome::CaLayers;
            }
        }

        if validator.allow_dc_layer_overlays() {
            let result = dc.process(resources, root, damage, overlay_damage);
            tracer.dc_layer(&DcLayerEvent {
                frame_index,
                result: result.as_ref().map(|l| l.z_order).map_err(|e| *e),
            });
            if let Ok(layer) = result {
                frame.dc_layers.push(layer);
                history.reset();
                return OverlayOutcome::DcLayer;
            }
        }

        for &strategy in strategies.iter() {
            let mut ctx = StrategyContext {
                validator: &mut *validator,
                resources,
                pass: &mut *root,
                candidates: &mut frame.candidates,
                content_bounds: &mut frame.content_bounds,
            };
            let promoted = strategy.try_promote(&mut ctx);
            tracer.strategy_attempt(&StrategyAttemptEvent {
                frame_index,
                strategy,
                promoted,
            });
            if promoted {
                update_damage(history, overlay_damage, &frame.candidates, damage);
                return OverlayOutcome::Strategy(strategy);
            }
        }
        history.reset();
        OverlayOutcome::None
    }
}

/// Folds a strategy's accepted planes into the frame's damage.
///
/// Planes at or above the primary are covered by hardware: they add to the
/// overlay damage and, when opaque, leave the GPU path nothing to draw.
/// The first unoccluded underlay goes through the underlay history.
fn update_damage(
    history: &mut DamageHistory,
    overlay_damage: &mut IntRect,
    candidates: &[OverlayCandidate],
    damage: &mut IntRect,
) {
    let mut underlay = None;
    for c in candidates.iter().filter(|c| !c.use_output_surface) {
        let rect = IntRect::enclosed(c.display_rect);
        if c.plane_z_order >= 0 {
            *overlay_damage = overlay_damage.union(rect);
            if c.is_opaque {
                *damage = damage.subtract(rect);
            }
        } else if c.is_unoccluded && underlay.is_none() {
            underlay = Some(rect);
        }
    }
    match underlay {
        Some(rect) => history.apply_underlay(rect, IntRect::ZERO, true, damage),
        None => history.reset(),
    }
}
