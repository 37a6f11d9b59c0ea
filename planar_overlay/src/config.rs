// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-platform tuning for the overlay processor.
//!
//! The validator decides *whether* a pipeline may run; these knobs decide
//! how it runs once allowed. Each platform gets a `const` preset, and
//! [`OverlayConfig::DEFAULT`] matches a generic display controller.

/// When promoted resources may be handed back to their producer.
///
/// Passed to the [`OverlayLockTracker`](crate::lock::OverlayLockTracker) via
/// [`OverlayConfig::lock_release`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockReleaseMode {
    /// Release a frame's resources once the frame after it is on screen.
    #[default]
    SwapAck,
    /// Keep resources until the window server reports it stopped reading
    /// them.
    GpuQuery,
}

/// Limits for promoting a whole pass to platform layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaLayerConfig {
    /// Most render-pass quads one frame may turn into layers.
    pub max_render_pass_quads: usize,
    /// Copy surfaces for render-pass layers are rounded up to a multiple of
    /// this many pixels so they can be reused across frames.
    pub copy_size_granularity: i32,
}

/// Capabilities of the hardware-overlay pipeline for video.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DcLayerConfig {
    /// Occluded video may go below the primary plane.
    pub underlays: bool,
    /// Video with a non-axis-aligned transform may be promoted.
    pub complex_transforms: bool,
}

/// Configuration for the [`OverlayProcessor`](crate::processor::OverlayProcessor).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Layer-pipeline limits.
    pub ca_layer: CaLayerConfig,
    /// Video-pipeline capabilities.
    pub dc_layer: DcLayerConfig,
    /// Resource release policy.
    pub lock_release: LockReleaseMode,
}

impl OverlayConfig {
    /// Generic display controller: swap-acknowledged releases, no video
    /// underlays.
    pub const DEFAULT: Self = Self {
        ca_layer: CaLayerConfig {
            max_render_pass_quads: 30,
            copy_size_granularity: 64,
        },
        dc_layer: DcLayerConfig {
            underlays: false,
            complex_transforms: false,
        },
        lock_release: LockReleaseMode::SwapAck,
    };

    /// Core Animation: the window server reads layer contents
    /// asynchronously, so release waits for its in-use queries.
    #[must_use]
    pub const fn macos() -> Self {
        Self {
            lock_release: LockReleaseMode::GpuQuery,
            ..Self::DEFAULT
        }
    }

    /// DirectComposition: video may go below the primary plane and may be
    /// rotated.
    #[must_use]
    pub const fn windows() -> Self {
        Self {
            dc_layer: DcLayerConfig {
                underlays: true,
                complex_transforms: true,
            },
            ..Self::DEFAULT
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_only_where_documented() {
        let mac = OverlayConfig::macos();
        assert_eq!(mac.lock_release, LockReleaseMode::GpuQuery, "queried release");
        assert_eq!(mac.ca_layer, OverlayConfig::DEFAULT.ca_layer, "same layer limits");

        let win = OverlayConfig::windows();
        assert!(win.dc_layer.underlays && win.dc_layer.complex_transforms, "dc flags");
        assert_eq!(win.lock_release, LockReleaseMode::SwapAck, "swap release");
        assert_eq!(OverlayConfig::default(), OverlayConfig::DEFAULT, "default preset");
    }
}
