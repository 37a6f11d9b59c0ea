// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for overlay processing.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the [`OverlayProcessor`](crate::processor::OverlayProcessor) and the
//! [`OverlayLockTracker`](crate::lock::OverlayLockTracker) call as they
//! work. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use planar_core::geometry::IntRect;
use planar_core::resource::ResourceId;

use crate::ca_layer::CaLayerRejection;
use crate::dc_layer::DcLayerRejection;
use crate::processor::OverlayOutcome;
use crate::strategy::OverlayStrategy;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after each single-quad strategy runs.
#[derive(Clone, Copy, Debug)]
pub struct StrategyAttemptEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which strategy ran.
    pub strategy: OverlayStrategy,
    /// Whether it promoted a quad.
    pub promoted: bool,
}

/// Emitted after the layer pipeline runs.
#[derive(Clone, Copy, Debug)]
pub struct CaLayerEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Number of layers produced, or why the pass was kept.
    pub result: Result<usize, CaLayerRejection>,
}

/// Emitted after the video pipeline runs.
#[derive(Clone, Copy, Debug)]
pub struct DcLayerEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Z-order of the promoted video, or why nothing was promoted.
    pub result: Result<i32, DcLayerRejection>,
}

/// Emitted once per frame with the final damage.
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Damage left for the primary surface.
    pub damage: IntRect,
    /// Area covered by overlay planes this frame.
    pub overlay_damage: IntRect,
    /// Which path handled the frame.
    pub outcome: OverlayOutcome,
}

/// Why a resource lock was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReleaseReason {
    /// A newer frame replaced it on screen.
    SwapComplete,
    /// The window server reported it no longer reads the resource.
    NotInUse,
}

/// Emitted when an overlay lock is handed back to the producer.
#[derive(Clone, Copy, Debug)]
pub struct ResourceReleaseEvent {
    /// The released resource.
    pub resource: ResourceId,
    /// What triggered the release.
    pub reason: ReleaseReason,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from overlay processing.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a strategy ran.
    fn on_strategy_attempt(&mut self, e: &StrategyAttemptEvent) {
        _ = e;
    }

    /// Called after the layer pipeline ran.
    fn on_ca_layers(&mut self, e: &CaLayerEvent) {
        _ = e;
    }

    /// Called after the video pipeline ran.
    fn on_dc_layer(&mut self, e: &DcLayerEvent) {
        _ = e;
    }

    /// Called with the frame's final damage.
    fn on_damage(&mut self, e: &DamageEvent) {
        _ = e;
    }

    /// Called when a lock is released.
    fn on_resource_release(&mut self, e: &ResourceReleaseEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`StrategyAttemptEvent`].
    #[inline]
    pub fn strategy_attempt(&mut self, e: &StrategyAttemptEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_strategy_attempt(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CaLayerEvent`].
    #[inline]
    pub fn ca_layers(&mut self, e: &CaLayerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_ca_layers(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DcLayerEvent`].
    #[inline]
    pub fn dc_layer(&mut self, e: &DcLayerEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_dc_layer(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DamageEvent`].
    #[inline]
    pub fn damage(&mut self, e: &DamageEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_damage(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ResourceReleaseEvent`].
    #[inline]
    pub fn resource_release(&mut self, e: &ResourceReleaseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_resource_release(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
