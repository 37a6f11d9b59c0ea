// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Rejection reasons are stored as their index in a fixed table, so a
//! recording stays readable as long as variants are only appended.

use planar_core::geometry::IntRect;
use planar_core::resource::ResourceId;
use planar_overlay::ca_layer::CaLayerRejection;
use planar_overlay::dc_layer::DcLayerRejection;
use planar_overlay::processor::OverlayOutcome;
use planar_overlay::strategy::OverlayStrategy;
use planar_overlay::trace::{
    CaLayerEvent, DamageEvent, DcLayerEvent, ReleaseReason, ResourceReleaseEvent,
    StrategyAttemptEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STRATEGY_ATTEMPT: u8 = 1;
const TAG_CA_LAYERS: u8 = 2;
const TAG_DC_LAYER: u8 = 3;
const TAG_DAMAGE: u8 = 4;
const TAG_RESOURCE_RELEASE: u8 = 5;

const STRATEGIES: [OverlayStrategy; 4] = [
    OverlayStrategy::Fullscreen,
    OverlayStrategy::SingleOnTop,
    OverlayStrategy::Underlay,
    OverlayStrategy::UnderlayCast,
];

const CA_REJECTIONS: [CaLayerRejection; 13] = [
    CaLayerRejection::BlendMode,
    CaLayerRejection::TextureNotCandidate,
    CaLayerRejection::StreamVideoNotCandidate,
    CaLayerRejection::StreamVideoTransform,
    CaLayerRejection::TileNotCandidate,
    CaLayerRejection::DifferentVertexOpacities,
    CaLayerRejection::DebugBorder,
    CaLayerRejection::SurfaceContent,
    CaLayerRejection::YuvVideoContent,
    CaLayerRejection::RenderPassBackgroundFilters,
    CaLayerRejection::RenderPassFilterOperationType,
    CaLayerRejection::TooManyRenderPassQuads,
    CaLayerRejection::DifferentClipSettingsInSortingContext,
];

const DC_REJECTIONS: [DcLayerRejection; 5] = [
    DcLayerRejection::BlendMode,
    DcLayerRejection::UnsupportedQuad,
    DcLayerRejection::TextureNotCandidate,
    DcLayerRejection::ComplexTransform,
    DcLayerRejection::Occluded,
];

#[expect(
    clippy::cast_possible_truncation,
    reason = "lookup tables are far shorter than u8::MAX"
)]
fn index_of<T: PartialEq>(table: &[T], value: &T) -> u8 {
    table.iter().position(|t| t == value).unwrap_or(0) as u8
}

fn lookup<T: Copy>(table: &[T], index: u32) -> Option<T> {
    table.get(usize::try_from(index).ok()?).copied()
}

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_rect(&mut self, r: IntRect) {
        for v in [r.x0, r.y0, r.x1, r.y1] {
            self.write_i32(v);
        }
    }

    /// Writes a success flag followed by a 4-byte payload.
    fn write_result(&mut self, ok: bool, payload: [u8; 4]) {
        self.write_u8(u8::from(ok));
        self.buf.extend_from_slice(&payload);
    }

    fn write_outcome(&mut self, outcome: OverlayOutcome) {
        let (kind, strategy) = match outcome {
            OverlayOutcome::None => (0, 0),
            OverlayOutcome::CaLayers => (1, 0),
            OverlayOutcome::DcLayer => (2, 0),
            OverlayOutcome::Strategy(s) => (3, index_of(&STRATEGIES, &s)),
        };
        self.write_u8(kind);
        self.write_u8(strategy);
    }
}

impl TraceSink for RecorderSink {
    fn on_strategy_attempt(&mut self, e: &StrategyAttemptEvent) {
        self.write_u8(TAG_STRATEGY_ATTEMPT);
        self.write_u64(e.frame_index);
        self.write_u8(index_of(&STRATEGIES, &e.strategy));
        self.write_u8(u8::from(e.promoted));
    }

    fn on_ca_layers(&mut self, e: &CaLayerEvent) {
        self.write_u8(TAG_CA_LAYERS);
        self.write_u64(e.frame_index);
        match e.result {
            Ok(count) => {
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                self.write_result(true, count.to_le_bytes());
            }
            Err(r) => {
                let code = u32::from(index_of(&CA_REJECTIONS, &r));
                self.write_result(false, code.to_le_bytes());
            }
        }
    }

    fn on_dc_layer(&mut self, e: &DcLayerEvent) {
        self.write_u8(TAG_DC_LAYER);
        self.write_u64(e.frame_index);
        match e.result {
            Ok(z) => self.write_result(true, z.to_le_bytes()),
            Err(r) => {
                let code = u32::from(index_of(&DC_REJECTIONS, &r));
                self.write_result(false, code.to_le_bytes());
            }
        }
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        self.write_u8(TAG_DAMAGE);
        self.write_u64(e.frame_index);
        self.write_rect(e.damage);
        self.write_rect(e.overlay_damage);
        self.write_outcome(e.outcome);
    }

    fn on_resource_release(&mut self, e: &ResourceReleaseEvent) {
        self.write_u8(TAG_RESOURCE_RELEASE);
        self.write_u32(e.resource.0);
        self.write_u8(match e.reason {
            ReleaseReason::SwapComplete => 0,
            ReleaseReason::NotInUse => 1,
        });
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`StrategyAttemptEvent`].
    StrategyAttempt(StrategyAttemptEvent),
    /// A [`CaLayerEvent`].
    CaLayers(CaLayerEvent),
    /// A [`DcLayerEvent`].
    DcLayer(DcLayerEvent),
    /// A [`DamageEvent`].
    Damage(DamageEvent),
    /// A [`ResourceReleaseEvent`].
    ResourceRelease(ResourceReleaseEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.read_array::<1>()?[0])
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    fn read_rect(&mut self) -> Option<IntRect> {
        Some(IntRect::new(
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
            self.read_i32()?,
        ))
    }

    fn read_strategy(&mut self) -> Option<OverlayStrategy> {
        lookup(&STRATEGIES, u32::from(self.read_u8()?))
    }

    fn decode_strategy_attempt(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StrategyAttempt(StrategyAttemptEvent {
            frame_index: self.read_u64()?,
            strategy: self.read_strategy()?,
            promoted: self.read_u8()? != 0,
        }))
    }

    fn decode_ca_layers(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let ok = self.read_u8()? != 0;
        let payload = self.read_u32()?;
        let result = if ok {
            Ok(usize::try_from(payload).ok()?)
        } else {
            Err(lookup(&CA_REJECTIONS, payload)?)
        };
        Some(RecordedEvent::CaLayers(CaLayerEvent {
            frame_index,
            result,
        }))
    }

    fn decode_dc_layer(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let ok = self.read_u8()? != 0;
        let payload = self.read_array::<4>()?;
        let result = if ok {
            Ok(i32::from_le_bytes(payload))
        } else {
            Err(lookup(&DC_REJECTIONS, u32::from_le_bytes(payload))?)
        };
        Some(RecordedEvent::DcLayer(DcLayerEvent {
            frame_index,
            result,
        }))
    }

    fn decode_damage(&mut self) -> Option<RecordedEvent> {
        let frame_index = self.read_u64()?;
        let damage = self.read_rect()?;
        let overlay_damage = self.read_rect()?;
        let kind = self.read_u8()?;
        let strategy = self.read_strategy()?;
        let outcome = match kind {
            0 => OverlayOutcome::None,
            1 => OverlayOutcome::CaLayers,
            2 => OverlayOutcome::DcLayer,
            _ => OverlayOutcome::Strategy(strategy),
        };
        Some(RecordedEvent::Damage(DamageEvent {
            frame_index,
            damage,
            overlay_damage,
            outcome,
        }))
    }

    fn decode_resource_release(&mut self) -> Option<RecordedEvent> {
        let resource = ResourceId(self.read_u32()?);
        let reason = match self.read_u8()? {
            0 => ReleaseReason::SwapComplete,
            _ => ReleaseReason::NotInUse,
        };
        Some(RecordedEvent::ResourceRelease(ResourceReleaseEvent {
            resource,
            reason,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STRATEGY_ATTEMPT => self.decode_strategy_attempt(),
            TAG_CA_LAYERS => self.decode_ca_layers(),
            TAG_DC_LAYER => self.decode_dc_layer(),
            TAG_DAMAGE => self.decode_damage(),
            TAG_RESOURCE_RELEASE => self.decode_resource_release(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
