// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resource handles and the resource-lifecycle contract.
//!
//! Resources (textures, video planes) are owned by an external provider. The
//! overlay code never allocates or frees them; it asks the provider about a
//! resource's size and overlay eligibility and takes read locks through it.
//!
//! A [`ResourceLock`] is an explicit token: the provider mints it in
//! [`ResourceProvider::lock_for_overlay`] and takes it back in
//! [`ResourceProvider::unlock`]. Dropping a lock without returning it is a
//! leak of the provider's lock count, not a release.

use core::fmt;

use crate::geometry::IntSize;

/// An opaque handle to a provider-managed resource.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(pub u32);

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.0)
    }
}

/// Pixel layout of a resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceFormat {
    /// 8-bit RGBA.
    #[default]
    Rgba8,
    /// 8-bit BGRA.
    Bgra8,
    /// 8-bit RGB with an ignored alpha channel.
    Rgbx8,
    /// A single 8-bit plane (one plane of a YUV frame).
    R8,
    /// An interleaved two-channel 8-bit plane (NV12 UV plane).
    Rg8,
}

/// Colour space tag attached to a resource or video frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    /// sRGB.
    #[default]
    Srgb,
    /// BT.601 YCbCr.
    Rec601,
    /// BT.709 YCbCr.
    Rec709,
    /// BT.2020 YCbCr.
    Rec2020,
}

/// What the provider knows about one resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Size of the backing storage in pixels.
    pub size: IntSize,
    /// Pixel format.
    pub format: ResourceFormat,
    /// Colour space.
    pub color_space: ColorSpace,
    /// Set by the producer when the resource may be scanned out directly.
    pub is_overlay_candidate: bool,
}

/// A read lock on a resource held on behalf of a hardware plane or
/// platform layer.
///
/// Locks are not `Clone`: each one stands for one lock count inside the
/// provider and must be handed back through [`ResourceProvider::unlock`].
#[must_use = "a lock must be returned to its provider"]
#[derive(PartialEq, Eq)]
pub struct ResourceLock {
    id: ResourceId,
}

impl ResourceLock {
    /// Mints a lock token. Only providers should call this.
    #[inline]
    pub const fn new(id: ResourceId) -> Self {
        Self { id }
    }

    /// The locked resource.
    #[inline]
    #[must_use]
    pub const fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl fmt::Debug for ResourceLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceLock({})", self.id.0)
    }
}

/// The external resource-lifecycle collaborator.
pub trait ResourceProvider {
    /// Returns size, format and eligibility for `id`, or `None` if unknown.
    fn resource_info(&self, id: ResourceId) -> Option<ResourceInfo>;

    /// Returns `true` if the producer flagged `id` as overlay eligible.
    fn is_overlay_candidate(&self, id: ResourceId) -> bool {
        self.resource_info(id)
            .is_some_and(|info| info.is_overlay_candidate)
    }

    /// Takes a read lock that keeps `id` alive until it is unlocked.
    fn lock_for_overlay(&mut self, id: ResourceId) -> ResourceLock;

    /// Returns a lock taken with [`lock_for_overlay`](Self::lock_for_overlay).
    fn unlock(&mut self, lock: ResourceLock);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_reports_its_resource() {
        let lock = ResourceLock::new(ResourceId(7));
        assert_eq!(lock.resource_id(), ResourceId(7), "round trip");
        assert_eq!(alloc::format!("{lock:?}"), "ResourceLock(7)", "debug form");
    }

    struct OneResource;

    impl ResourceProvider for OneResource {
        fn resource_info(&self, id: ResourceId) -> Option<ResourceInfo> {
            (id == ResourceId(1)).then_some(ResourceInfo {
                size: IntSize::new(4, 4),
                format: ResourceFormat::Rgba8,
                color_space: ColorSpace::Srgb,
                is_overlay_candidate: true,
            })
        }

        fn lock_for_overlay(&mut self, id: ResourceId) -> ResourceLock {
            ResourceLock::new(id)
        }

        fn unlock(&mut self, lock: ResourceLock) {
            _ = lock;
        }
    }

    #[test]
    fn default_candidate_query_uses_info() {
        let p = OneResource;
        assert!(p.is_overlay_candidate(ResourceId(1)), "known and eligible");
        assert!(!p.is_overlay_candidate(ResourceId(2)), "unknown resource");
    }
}
