// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame data model for overlay-aware compositing.
//!
//! `planar_core` describes one composited frame the way a compositor hands it
//! to its output stage: a list of render passes, each holding front-to-back
//! quads that point at shared transform/opacity/clip state. It is `no_std`
//! compatible (with `alloc`) and uses index handles rather than pointers, so
//! passes can be mutated in place while quads keep referring to their
//! shared state.
//!
//! # Architecture
//!
//! ```text
//!   RenderPass (root is last)
//!     ├── SharedQuadState[]   transform, opacity, clip, blend, sorting id
//!     └── QuadList            front-to-back DrawQuads
//!           └── Material      SolidColor | Texture | StreamVideo | YuvVideo
//!                             | RenderPass | SurfaceReference | Tile
//!                             | DebugBorder
//! ```
//!
//! **[`quad`]**: Quads, materials, shared quad state and the index-stable
//! quad list.
//!
//! **[`render_pass`]**: Render passes and filter maps keyed by pass id.
//!
//! **[`filter`]**: Filter operations carried by passes.
//!
//! **[`resource`]**: Resource ids, the [`ResourceProvider`](resource::ResourceProvider)
//! contract and explicit [`ResourceLock`](resource::ResourceLock) tokens.
//!
//! **[`geometry`]**: Integer damage rects with damage-style set operations.
//!
//! **[`transform`]**: Column-major 4×4 transform with the axis-alignment
//! queries overlay promotion needs.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod filter;
pub mod geometry;
pub mod quad;
pub mod render_pass;
pub mod resource;
pub mod transform;
