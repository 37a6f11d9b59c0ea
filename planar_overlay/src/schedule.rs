// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handing the frame's overlays to the platform.
//!
//! The processor only decides what goes where. Submitting the decisions is
//! split into two small traits, one per output kind, that platform glue and
//! test doubles implement:
//!
//! - [`PlaneScheduler`] receives the accepted overlay planes.
//! - [`LayerSink`] receives platform layers, with shared state pushed only
//!   when it differs from the previous layer's.

use alloc::rc::Rc;

use kurbo::Rect;

use planar_core::geometry::IntRect;
use planar_core::resource::ResourceId;

use crate::candidate::{OverlayCandidate, OverlayTransform};
use crate::layer::{LayerRecord, LayerSharedState};

/// One hardware plane to scan out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledPlane {
    /// Stacking relative to the primary plane.
    pub z_order: i32,
    /// Orientation applied by the display controller.
    pub transform: OverlayTransform,
    /// Buffer to scan out.
    pub resource: ResourceId,
    /// Destination on the display, rounded to whole pixels.
    pub display_bounds: IntRect,
    /// Sampled region of the buffer, normalized.
    pub uv_rect: Rect,
}

/// Receives overlay planes.
pub trait PlaneScheduler {
    /// Queues one plane for the next swap.
    fn schedule_overlay_plane(&mut self, plane: &ScheduledPlane);
}

/// Receives platform layers.
pub trait LayerSink {
    /// Sets the transform, clip and opacity for the layers that follow.
    fn set_shared_state(&mut self, state: &LayerSharedState);

    /// Adds one layer using the most recently set shared state.
    fn push_layer(&mut self, layer: &LayerRecord);
}

/// Feeds every accepted candidate to `scheduler`.
///
/// The primary plane is skipped; it is presented by the output surface
/// itself. Returns the number of planes scheduled.
pub fn schedule_overlay_planes(
    candidates: &[OverlayCandidate],
    scheduler: &mut dyn PlaneScheduler,
) -> usize {
    let mut count = 0;
    for c in candidates.iter().filter(|c| c.overlay_handled && !c.use_output_surface) {
        let Some(resource) = c.resource_id else {
            continue;
        };
        scheduler.schedule_overlay_plane(&ScheduledPlane {
            z_order: c.plane_z_order,
            transform: c.transform,
            resource,
            display_bounds: IntRect::rounded(c.display_rect),
            uv_rect: c.uv_rect,
        });
        count += 1;
    }
    count
}

/// Feeds `layers` to `sink` in order, batching shared state.
pub fn schedule_layers(layers: &[LayerRecord], sink: &mut dyn LayerSink) {
    let mut current: Option<&Rc<LayerSharedState>> = None;
    for layer in layers {
        if !current.is_some_and(|s| Rc::ptr_eq(s, &layer.shared_state)) {
            sink.set_shared_state(&layer.shared_state);
            current = Some(&layer.shared_state);
        }
        sink.push_layer(layer);
    }
}
