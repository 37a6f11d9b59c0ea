// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use planar_overlay::processor::OverlayOutcome;
use planar_overlay::trace::{
    CaLayerEvent, DamageEvent, DcLayerEvent, ReleaseReason, ResourceReleaseEvent,
    StrategyAttemptEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn outcome_name(outcome: OverlayOutcome) -> &'static str {
    match outcome {
        OverlayOutcome::None => "none",
        OverlayOutcome::CaLayers => "ca-layers",
        OverlayOutcome::DcLayer => "dc-layer",
        OverlayOutcome::Strategy(s) => s.name(),
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_strategy_attempt(&mut self, e: &StrategyAttemptEvent) {
        let verdict = if e.promoted { "promoted" } else { "declined" };
        let _ = writeln!(
            self.writer,
            "[strategy] frame={} {} {verdict}",
            e.frame_index,
            e.strategy.name(),
        );
    }

    fn on_ca_layers(&mut self, e: &CaLayerEvent) {
        let _ = match e.result {
            Ok(count) => writeln!(self.writer, "[ca] frame={} layers={count}", e.frame_index),
            Err(r) => writeln!(self.writer, "[ca] frame={} rejected: {r}", e.frame_index),
        };
    }

    fn on_dc_layer(&mut self, e: &DcLayerEvent) {
        let _ = match e.result {
            Ok(z) => writeln!(self.writer, "[dc] frame={} z={z}", e.frame_index),
            Err(r) => writeln!(self.writer, "[dc] frame={} rejected: {r}", e.frame_index),
        };
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={} damage={:?} overlay={:?} via={}",
            e.frame_index,
            e.damage,
            e.overlay_damage,
            outcome_name(e.outcome),
        );
    }

    fn on_resource_release(&mut self, e: &ResourceReleaseEvent) {
        let reason = match e.reason {
            ReleaseReason::SwapComplete => "swap-complete",
            ReleaseReason::NotInUse => "not-in-use",
        };
        let _ = writeln!(
            self.writer,
            "[release] resource={} reason={reason}",
            e.resource.0,
        );
    }
}
