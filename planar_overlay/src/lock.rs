// Copyright 2026 the Subduction Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keeping promoted resources alive while the display controller reads them.
//!
//! A resource scanned out by an overlay plane or a platform layer is read by
//! the display hardware long after the frame was submitted. Its lock must be
//! held until a newer frame has replaced it on screen.
//!
//! The lifecycle per frame is:
//!
//! 1. [`lock_frame`](OverlayLockTracker::lock_frame) after processing takes one
//!    lock per promoted resource.
//! 2. [`swap_buffers`](OverlayLockTracker::swap_buffers) queues those locks
//!    behind earlier frames still in flight.
//! 3. [`swap_buffers_complete`](OverlayLockTracker::swap_buffers_complete)
//!    retires the oldest queued frame. What happens next depends on the
//!    [`LockReleaseMode`]:
//!    - [`SwapAck`](LockReleaseMode::SwapAck): the retired frame becomes the
//!      displayed one and the previously displayed frame's locks are
//!      released.
//!    - [`GpuQuery`](LockReleaseMode::GpuQuery): the retired frame's locks
//!      wait until the window server answers an in-use query with
//!      [`did_receive_in_use_response`](OverlayLockTracker::did_receive_in_use_response).
//!
//! Render-pass copy surfaces are held the same way through
//! [`hold_copy_surfaces`](OverlayLockTracker::hold_copy_surfaces). They are
//! owned by the compositor rather than the window server, so in either mode
//! a frame's surfaces go back to the [`RenderPassCopyPool`] when the next
//! swap completes.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use planar_core::resource::{ResourceId, ResourceLock, ResourceProvider};

use crate::config::LockReleaseMode;
use crate::copy_pool::{CopySurface, RenderPassCopyPool};
use crate::trace::{ReleaseReason, ResourceReleaseEvent, Tracer};

/// Lock lifetime bookkeeping for overlay resources.
#[derive(Debug)]
pub struct OverlayLockTracker {
    mode: LockReleaseMode,
    /// Held for the frame being drawn.
    current: FrameHold,
    /// Swapped frames whose completion has not been reported, oldest first.
    pending: VecDeque<FrameHold>,
    /// The frame on screen. Its locks are only kept in `SwapAck` mode.
    displayed: FrameHold,
    /// Locks waiting for an in-use answer, in `GpuQuery` mode.
    awaiting_query: Vec<ResourceLock>,
}

#[derive(Debug, Default)]
struct FrameHold {
    locks: Vec<ResourceLock>,
    copies: Vec<CopySurface>,
}

impl OverlayLockTracker {
    /// Creates a tracker holding no locks.
    #[must_use]
    pub fn new(mode: LockReleaseMode) -> Self {
        Self {
            mode,
            current: FrameHold::default(),
            pending: VecDeque::new(),
            displayed: FrameHold::default(),
            awaiting_query: Vec::new(),
        }
    }

    /// The release policy.
    #[inline]
    #[must_use]
    pub fn mode(&self) -> LockReleaseMode {
        self.mode
    }

    /// Takes one lock for each of `ids` on behalf of the current frame.
    pub fn lock_frame(&mut self, resources: &mut dyn ResourceProvider, ids: &[ResourceId]) {
        self.current
            .locks
            .extend(ids.iter().map(|&id| resources.lock_for_overlay(id)));
    }

    /// Keeps `surfaces` checked out of their pool until the current frame
    /// leaves the screen.
    pub fn hold_copy_surfaces(&mut self, surfaces: &[CopySurface]) {
        self.current.copies.extend_from_slice(surfaces);
    }

    /// Queues the current frame's locks and surfaces behind the frames
    /// already in flight.
    pub fn swap_buffers(&mut self) {
        let frame = core::mem::take(&mut self.current);
        self.pending.push_back(frame);
    }

    /// Retires the oldest swapped frame, returning the copy surfaces of the
    /// frame it replaced to `pool`.
    ///
    /// Does nothing when no swap is outstanding.
    pub fn swap_buffers_complete(
        &mut self,
        resources: &mut dyn ResourceProvider,
        pool: &mut RenderPassCopyPool,
        tracer: &mut Tracer<'_>,
    ) {
        let Some(mut frame) = self.pending.pop_front() else {
            return;
        };
        if self.mode == LockReleaseMode::GpuQuery {
            self.awaiting_query.append(&mut frame.locks);
        }
        let previous = core::mem::replace(&mut self.displayed, frame);
        release(resources, tracer, previous.locks, ReleaseReason::SwapComplete);
        for surface in previous.copies {
            pool.release(surface);
        }
    }

    /// Handles the window server's answer for `id`.
    ///
    /// When `in_use` is `false`, every lock on `id` awaiting an answer is
    /// released. Answers for resources not awaiting one are ignored.
    pub fn did_receive_in_use_response(
        &mut self,
        resources: &mut dyn ResourceProvider,
        id: ResourceId,
        in_use: bool,
        tracer: &mut Tracer<'_>,
    ) {
        if in_use {
            return;
        }
        let (done, keep): (Vec<_>, Vec<_>) = core::mem::take(&mut self.awaiting_query)
            .into_iter()
            .partition(|lock| lock.resource_id() == id);
        self.awaiting_query = keep;
        release(resources, tracer, done, ReleaseReason::NotInUse);
    }

    /// Resources whose in-use state the window server should be asked
    /// about.
    #[must_use]
    pub fn awaiting_query(&self) -> Vec<ResourceId> {
        let mut ids: Vec<_> = self.awaiting_query.iter().map(ResourceLock::resource_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Number of locks currently held, in any state.
    #[must_use]
    pub fn lock_count(&self) -> usize {
        self.frames().map(|f| f.locks.len()).sum::<usize>() + self.awaiting_query.len()
    }

    /// Number of copy surfaces currently held.
    #[must_use]
    pub fn copy_surface_count(&self) -> usize {
        self.frames().map(|f| f.copies.len()).sum()
    }

    /// Returns every held lock to `resources` and every held surface to
    /// `pool`, e.g. when the output surface is torn down.
    pub fn release_all(
        &mut self,
        resources: &mut dyn ResourceProvider,
        pool: &mut RenderPassCopyPool,
    ) {
        let mut frames: Vec<FrameHold> = self.pending.drain(..).collect();
        frames.push(core::mem::take(&mut self.current));
        frames.push(core::mem::take(&mut self.displayed));
        for frame in frames {
            for lock in frame.locks {
                resources.unlock(lock);
            }
            for surface in frame.copies {
                pool.release(surface);
            }
        }
        for lock in self.awaiting_query.drain(..) {
            resources.unlock(lock);
        }
    }

    fn frames(&self) -> impl Iterator<Item = &FrameHold> {
        core::iter::once(&self.current)
            .chain(&self.pending)
            .chain(core::iter::once(&self.displayed))
    }
}

fn release(
    resources: &mut dyn ResourceProvider,
    tracer: &mut Tracer<'_>,
    locks: Vec<ResourceLock>,
    reason: ReleaseReason,
) {
    for lock in locks {
        tracer.resource_release(&ResourceReleaseEvent {
            resource: lock.resource_id(),
            reason,
        });
        resources.unlock(lock);
    }
}
