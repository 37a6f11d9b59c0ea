// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen surfaces that render-pass layers are drawn into.
//!
//! Layers backed by a render pass need the pass's output in a texture of
//! their own. Sizes are rounded up to a fixed granularity so that a pass
//! that grows or shrinks a little keeps reusing the same surface.
//!
//! A surface stays checked out until it is
//! [released](RenderPassCopyPool::release), normally by
//! [`OverlayLockTracker`](crate::lock::OverlayLockTracker) once a newer
//! frame has replaced it on screen. [`end_frame`](RenderPassCopyPool::end_frame)
//! drops free surfaces that were not reused during the frame.

use alloc::vec::Vec;
use core::fmt;

use planar_core::geometry::IntSize;

/// Index handle for a pooled surface.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CopySurfaceId(pub u32);

impl fmt::Debug for CopySurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CopySurfaceId({})", self.0)
    }
}

/// A pooled surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CopySurface {
    /// Pool handle.
    pub id: CopySurfaceId,
    /// Allocated size, a multiple of the pool's granularity.
    pub size: IntSize,
}

/// Pool of render-pass copy surfaces.
#[derive(Debug)]
pub struct RenderPassCopyPool {
    granularity: i32,
    free: Vec<CopySurface>,
    in_use: Vec<CopySurface>,
    next_id: u32,
}

impl RenderPassCopyPool {
    /// Creates an empty pool.
    ///
    /// # Panics
    ///
    /// Panics if `granularity` is not positive.
    #[must_use]
    pub fn new(granularity: i32) -> Self {
        assert!(granularity > 0, "granularity must be positive, got {granularity}");
        Self {
            granularity,
            free: Vec::new(),
            in_use: Vec::new(),
            next_id: 0,
        }
    }

    /// Rounds `size` up to the pool's granularity. Empty extents become one
    /// granule; extents past the largest representable granule saturate to
    /// it.
    #[must_use]
    pub fn rounded_size(&self, size: IntSize) -> IntSize {
        let largest = i32::MAX / self.granularity * self.granularity;
        let g = i64::from(self.granularity);
        let round = |v: i32| {
            let up = (i64::from(v.max(1)) + g - 1) / g * g;
            i32::try_from(up).unwrap_or(largest)
        };
        IntSize::new(round(size.width), round(size.height))
    }

    /// Checks out a surface of at least `size`, reusing a free one of the
    /// same rounded size when possible.
    pub fn acquire(&mut self, size: IntSize) -> CopySurface {
        let size = self.rounded_size(size);
        let surface = match self.free.iter().position(|s| s.size == size) {
            Some(i) => self.free.swap_remove(i),
            None => {
                let id = CopySurfaceId(self.next_id);
                self.next_id += 1;
                CopySurface { id, size }
            }
        };
        self.in_use.push(surface);
        surface
    }

    /// Returns a surface to the free list once nothing displays it.
    ///
    /// Surfaces the pool does not have checked out are ignored.
    pub fn release(&mut self, surface: CopySurface) {
        if let Some(i) = self.in_use.iter().position(|s| s.id == surface.id) {
            self.free.push(self.in_use.swap_remove(i));
        }
    }

    /// Drops free surfaces nobody reused this frame.
    pub fn end_frame(&mut self) {
        self.free.clear();
    }

    /// Surfaces checked out and not yet released.
    #[must_use]
    pub fn in_use(&self) -> &[CopySurface] {
        &self.in_use
    }

    /// Number of surfaces waiting to be reused.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_round_up_to_granularity() {
        let pool = RenderPassCopyPool::new(64);
        assert_eq!(
            pool.rounded_size(IntSize::new(100, 64)),
            IntSize::new(128, 64),
            "round up, exact kept"
        );
        assert_eq!(pool.rounded_size(IntSize::new(0, 1)), IntSize::new(64, 64), "minimum one granule");
    }

    #[test]
    fn huge_extents_saturate() {
        let pool = RenderPassCopyPool::new(64);
        let largest = i32::MAX / 64 * 64;
        assert_eq!(
            pool.rounded_size(IntSize::new(i32::MAX, i32::MAX - 1)),
            IntSize::new(largest, largest),
            "no overflow near i32::MAX"
        );
        assert_eq!(
            pool.rounded_size(IntSize::new(largest, 1)),
            IntSize::new(largest, 64),
            "largest granule kept"
        );
    }

    #[test]
    fn checked_out_surfaces_survive_frames() {
        let mut pool = RenderPassCopyPool::new(64);
        let a = pool.acquire(IntSize::new(100, 100));
        pool.end_frame();
        let b = pool.acquire(IntSize::new(100, 100));
        assert_ne!(a.id, b.id, "a is still on screen");
        assert_eq!(pool.in_use().len(), 2, "both checked out");
    }

    #[test]
    fn released_surfaces_are_reused_next_frame() {
        let mut pool = RenderPassCopyPool::new(64);
        let a = pool.acquire(IntSize::new(100, 100));
        let b = pool.acquire(IntSize::new(100, 100));
        pool.end_frame();

        pool.release(a);
        pool.release(b);
        let c = pool.acquire(IntSize::new(120, 70));
        assert_eq!(c.size, IntSize::new(128, 128), "same granule size");
        assert!(c.id == a.id || c.id == b.id, "reused, got {c:?}");
        pool.end_frame();
        assert_eq!(pool.free_count(), 0, "unused surface dropped");
        assert_eq!(pool.in_use().len(), 1, "one checked out");
    }

    #[test]
    fn released_surface_is_reused_in_frame() {
        let mut pool = RenderPassCopyPool::new(64);
        let a = pool.acquire(IntSize::new(10, 10));
        pool.release(a);
        assert!(pool.in_use().is_empty(), "checked back in");
        let b = pool.acquire(IntSize::new(20, 20));
        assert_eq!(a.id, b.id, "same granule reused");
    }

    #[test]
    fn different_granule_allocates() {
        let mut pool = RenderPassCopyPool::new(64);
        let a = pool.acquire(IntSize::new(64, 64));
        pool.release(a);
        let b = pool.acquire(IntSize::new(65, 64));
        assert_ne!(a.id, b.id, "larger surface is new");
    }
}
