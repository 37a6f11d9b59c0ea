// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay promotion and damage tracking for planar.
//!
//! Once per frame, before the GPU draws the root render pass, this crate
//! decides which quads can skip shader compositing and go straight to the
//! display hardware or the platform's layer compositor, and keeps the damage
//! rect as small as those decisions allow.
//!
//! # Architecture
//!
//! ```text
//!   OverlayProcessor::process_for_overlays
//!     ├── copy requests?        → nothing promoted
//!     ├── ca_layer              → whole root pass as LayerRecords
//!     ├── dc_layer              → one YUV video above/below the primary
//!     └── strategy (in order)   → one OverlayCandidate
//!           Fullscreen | SingleOnTop | Underlay | UnderlayCast
//! ```
//!
//! **[`processor`]**: The orchestrator. Owns the cross-frame damage state and
//! the render-pass copy pool.
//!
//! **[`validator`]**: The platform policy contract.
//!
//! **[`candidate`]**: Overlay plane records, transform classification and
//! occlusion queries.
//!
//! **[`strategy`]**: The four single-quad promotion strategies.
//!
//! **[`damage`]**: Underlay damage history.
//!
//! **[`ca_layer`]**, **[`dc_layer`]**, **[`layer`]**: The two platform
//! pipelines and the layer records they produce.
//!
//! **[`copy_pool`]**: Size-quantized surfaces for render-pass layers.
//!
//! **[`lock`]**: Holds resource locks until the display is done with them.
//!
//! **[`schedule`]**: Hands planes and layers to platform glue.
//!
//! **[`config`]**: Pipeline limits and platform presets.
//!
//! **[`trace`]**: Structured diagnostics.
//!
//! # Example
//!
//! ```rust
//! use planar_core::geometry::IntRect;
//! use planar_core::render_pass::{RenderPass, RenderPassId};
//! use planar_core::resource::{ResourceFormat, ResourceId, ResourceInfo, ResourceLock, ResourceProvider};
//! use planar_overlay::candidate::OverlayCandidate;
//! use planar_overlay::config::OverlayConfig;
//! use planar_overlay::processor::{OverlayOutcome, OverlayProcessor};
//! use planar_overlay::trace::Tracer;
//! use planar_overlay::validator::NoOverlays;
//!
//! struct NoResources;
//! impl ResourceProvider for NoResources {
//!     fn resource_info(&self, _: ResourceId) -> Option<ResourceInfo> { None }
//!     fn lock_for_overlay(&mut self, id: ResourceId) -> ResourceLock { ResourceLock::new(id) }
//!     fn unlock(&mut self, _: ResourceLock) {}
//! }
//!
//! let output = IntRect::from_xywh(0, 0, 640, 480);
//! let mut processor = OverlayProcessor::new(Some(Box::new(NoOverlays)), OverlayConfig::DEFAULT);
//! let mut passes = [RenderPass::new(RenderPassId(1), output)];
//! let mut damage = output;
//! let frame = processor.process_for_overlays(
//!     &NoResources,
//!     &mut passes,
//!     vec![OverlayCandidate::primary_plane(output, ResourceFormat::Rgba8)],
//!     &mut damage,
//!     &mut Tracer::none(),
//! );
//! assert_eq!(frame.outcome, OverlayOutcome::None);
//! assert_eq!(damage, output);
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables [`Tracer`](trace::Tracer)
//!   dispatch.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod ca_layer;
pub mod candidate;
pub mod config;
pub mod copy_pool;
pub mod damage;
pub mod dc_layer;
pub mod layer;
pub mod lock;
pub mod processor;
pub mod schedule;
pub mod strategy;
pub mod trace;
pub mod validator;

#[cfg(test)]
mod test_util;
