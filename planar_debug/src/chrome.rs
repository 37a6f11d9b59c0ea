// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Overlay events carry frame indices rather than timestamps. Each frame is
//! placed at `frame_index * frame_interval_us`; resource releases, which
//! have no frame of their own, land on the most recent frame seen.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use planar_core::geometry::IntRect;
use planar_overlay::processor::OverlayOutcome;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Damage is exported as a counter track of pixel areas.
pub fn export(bytes: &[u8], frame_interval_us: f64, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut last_ts = 0.0;
    let ts = |frame_index: u64| frame_index as f64 * frame_interval_us;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::StrategyAttempt(e) => {
                last_ts = ts(e.frame_index);
                events.push(json!({
                    "ph": "i",
                    "name": e.strategy.name(),
                    "cat": "Strategy",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "frame_index": e.frame_index,
                        "promoted": e.promoted,
                    }
                }));
            }
            RecordedEvent::CaLayers(e) => {
                last_ts = ts(e.frame_index);
                let args = match e.result {
                    Ok(count) => json!({ "frame_index": e.frame_index, "layers": count }),
                    Err(r) => json!({ "frame_index": e.frame_index, "rejected": r.to_string() }),
                };
                events.push(json!({
                    "ph": "i",
                    "name": "CaLayers",
                    "cat": "Pipeline",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": args,
                }));
            }
            RecordedEvent::DcLayer(e) => {
                last_ts = ts(e.frame_index);
                let args = match e.result {
                    Ok(z) => json!({ "frame_index": e.frame_index, "z_order": z }),
                    Err(r) => json!({ "frame_index": e.frame_index, "rejected": r.to_string() }),
                };
                events.push(json!({
                    "ph": "i",
                    "name": "DcLayer",
                    "cat": "Pipeline",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": args,
                }));
            }
            RecordedEvent::Damage(e) => {
                last_ts = ts(e.frame_index);
                events.push(json!({
                    "ph": "C",
                    "name": "Damage",
                    "cat": "Damage",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "damage_px": area(e.damage),
                        "overlay_px": area(e.overlay_damage),
                    }
                }));
                events.push(json!({
                    "ph": "i",
                    "name": "Frame",
                    "cat": "Damage",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "g",
                    "args": {
                        "frame_index": e.frame_index,
                        "outcome": outcome_label(e.outcome),
                    }
                }));
            }
            RecordedEvent::ResourceRelease(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Release",
                    "cat": "Locks",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": 1,
                    "s": "t",
                    "args": {
                        "resource": e.resource.0,
                        "reason": format!("{:?}", e.reason),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn area(rect: IntRect) -> i64 {
    if rect.is_empty() { 0 } else { rect.area() }
}

fn outcome_label(outcome: OverlayOutcome) -> String {
    match outcome {
        OverlayOutcome::Strategy(s) => s.name().to_owned(),
        other => format!("{other:?}"),
    }
}
