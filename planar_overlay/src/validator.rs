// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The platform's overlay policy.
//!
//! A validator reports which promotion paths a platform offers and has the
//! final word on whether a proposed candidate list can be scheduled. It is
//! consulted by the [`OverlayProcessor`](crate::processor::OverlayProcessor)
//! and never allocates resources.

use alloc::vec::Vec;

use crate::candidate::OverlayCandidate;
use crate::strategy::OverlayStrategy;

/// Platform policy for overlay promotion.
pub trait OverlayValidator {
    /// The strategies to try, in order. Read once when the processor is
    /// created.
    fn strategies(&self) -> Vec<OverlayStrategy>;

    /// Whether the whole root pass may be handed over as platform layers.
    fn allow_ca_layer_overlays(&self) -> bool {
        false
    }

    /// Whether YUV video may be promoted to a hardware overlay layer.
    fn allow_dc_layer_overlays(&self) -> bool {
        false
    }

    /// Inspects the proposed planes and sets
    /// [`overlay_handled`](OverlayCandidate::overlay_handled) on the ones the
    /// platform can show. Entries left unhandled are rejected.
    fn check_overlay_support(&mut self, candidates: &mut [OverlayCandidate]);
}

/// A validator that offers no overlays at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOverlays;

impl OverlayValidator for NoOverlays {
    fn strategies(&self) -> Vec<OverlayStrategy> {
        Vec::new()
    }

    fn check_overlay_support(&mut self, candidates: &mut [OverlayCandidate]) {
        for c in candidates.iter_mut().filter(|c| !c.use_output_surface) {
            c.overlay_handled = false;
        }
    }
}

/// Accepts any candidate with a fixed strategy list and fixed pipeline
/// switches.
///
/// Useful for platforms whose display controller takes every plane the
/// strategies produce.
#[derive(Clone, Debug)]
pub struct AcceptAll {
    /// Strategies to run, in order.
    pub strategies: Vec<OverlayStrategy>,
    /// Allow the layer-compositing pipeline.
    pub ca_layers: bool,
    /// Allow the hardware-overlay pipeline.
    pub dc_layers: bool,
}

impl OverlayValidator for AcceptAll {
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
        for c in candidates {
            c.overlay_handled = true;
        }
    }
}
