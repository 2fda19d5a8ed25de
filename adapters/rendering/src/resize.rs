use glam::UVec2;
use labpyrinthe_core::ContainerEvent;
use labpyrinthe_skin::RasterBackend;

use crate::{pipeline::MapPublisher, SceneBackend};

/// Coalesces canvas size changes into one reflow per idle.
///
/// The first size change of a burst asks the container to show its resize
/// overlay; the reflow and the return to the previous state happen at the
/// next idle boundary, with whatever size the canvas has by then.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResizeCoordinator {
    last_size: Option<UVec2>,
    pending: bool,
}

impl ResizeCoordinator {
    /// Creates a coordinator that has not observed any size yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_size: None,
            pending: false,
        }
    }

    /// Whether a reflow waits for the next idle.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Last canvas size observed.
    #[must_use]
    pub const fn last_size(&self) -> Option<UVec2> {
        self.last_size
    }

    /// Records the canvas size seen this frame.
    ///
    /// Returns whether the size changed.
    pub fn observe<H, R>(
        &mut self,
        size: UVec2,
        publisher: &mut MapPublisher<H, R>,
        out: &mut Vec<ContainerEvent>,
    ) -> bool
    where
        H: Copy + Eq + std::hash::Hash + std::fmt::Debug,
        R: RasterBackend,
    {
        if self.last_size == Some(size) {
            return false;
        }
        self.last_size = Some(size);
        publisher.invalidate_geometry();
        if !self.pending {
            self.pending = true;
            tracing::debug!(width = size.x, height = size.y, "resize started");
            out.push(ContainerEvent::ResizeStart);
        }
        true
    }

    /// Runs the pending reflow, if any, and releases the container.
    pub fn on_idle<B, R>(
        &mut self,
        backend: &mut B,
        publisher: &mut MapPublisher<B::Handle, R>,
        out: &mut Vec<ContainerEvent>,
    ) where
        B: SceneBackend,
        R: RasterBackend,
    {
        if !self.pending {
            return;
        }
        self.pending = false;
        publisher.reflow(backend, out);
        let resume = publisher.game_phase();
        tracing::debug!(?resume, "resize finished");
        out.push(ContainerEvent::ResizeEnd { resume });
    }
}
