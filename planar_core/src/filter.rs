// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filter effects attached to render passes.

use alloc::vec::Vec;

use kurbo::{Rect, Vec2};

use crate::quad::Color;

/// One filter effect in a render pass's filter chain.
#[derive(Clone, Debug, PartialEq)]
pub enum FilterOperation {
    /// Desaturate by `amount` (0 = none, 1 = full grayscale).
    Grayscale(f32),
    /// Sepia tone by `amount`.
    Sepia(f32),
    /// Saturation multiplier.
    Saturate(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    /// Colour inversion by `amount`.
    Invert(f32),
    /// Brightness multiplier.
    Brightness(f32),
    /// Contrast multiplier.
    Contrast(f32),
    /// Opacity multiplier.
    Opacity(f32),
    /// Gaussian blur with the given standard deviation in pixels.
    Blur(f32),
    /// Drop shadow.
    DropShadow {
        /// Shadow offset.
        offset: Vec2,
        /// Blur radius.
        radius: f32,
        /// Shadow colour.
        color: Color,
    },
    /// Magnifier zoom with an inset border.
    Zoom {
        /// Zoom factor.
        amount: f32,
        /// Width of the unzoomed border in pixels.
        inset: i32,
    },
    /// Brightness that saturates at white instead of scaling.
    SaturatingBrightness(f32),
    /// Alpha threshold against a set of shape rects.
    AlphaThreshold {
        /// Shapes outside of which alpha is zeroed.
        shape: Vec<Rect>,
        /// Inner threshold.
        inner: f32,
        /// Outer threshold.
        outer: f32,
    },
    /// Arbitrary 4×5 colour matrix, row-major.
    ColorMatrix([f32; 20]),
}
