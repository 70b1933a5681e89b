//! Retained display-list backend.
//!
//! [`DisplayListSurface`] records operations and replays them onto its target
//! only on [`commit`](DrawingSurface::commit). Nothing becomes visible
//! mid-paint, which is how accelerated renderers avoid tearing, so paint
//! sessions draw on it directly without an off-screen buffer.

use tracing::{debug, warn};

use crate::image::Image;
use crate::surface::{DrawOp, DrawingSurface, SurfaceCapabilities};
use crate::types::Size;

/// A surface that defers drawing to its target until commit.
#[derive(Debug)]
pub struct DisplayListSurface<T: DrawingSurface> {
    target: T,
    list: Vec<DrawOp>,
    disposed: bool,
}

impl<T: DrawingSurface> DisplayListSurface<T> {
    /// Wrap a presentation target.
    pub fn new(target: T) -> Self {
        Self {
            target,
            list: Vec::new(),
            disposed: false,
        }
    }

    /// Operations recorded since the last commit.
    pub fn pending(&self) -> &[DrawOp] {
        &self.list
    }

    /// Borrow the presentation target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Unwrap the presentation target, dropping uncommitted operations.
    pub fn into_inner(self) -> T {
        self.target
    }
}

impl<T: DrawingSurface> DrawingSurface for DisplayListSurface<T> {
    fn size(&self) -> Size {
        self.target.size()
    }

    fn capabilities(&self) -> SurfaceCapabilities {
        SurfaceCapabilities {
            avoids_tearing: true,
            requires_background_probe: false,
        }
    }

    fn execute(&mut self, op: DrawOp) {
        if self.disposed {
            warn!(target: "horizon_arbor_render::display_list", ?op, "record on disposed surface ignored");
            return;
        }
        self.list.push(op);
    }

    fn copy_area(&self, target: &mut Image, x: i32, y: i32) {
        self.target.copy_area(target, x, y);
    }

    fn commit(&mut self) {
        if self.disposed {
            return;
        }
        debug!(
            target: "horizon_arbor_render::display_list",
            ops = self.list.len(),
            "replaying display list"
        );
        for op in self.list.drain(..) {
            self.target.execute(op);
        }
        self.target.commit();
    }

    fn dispose(&mut self) {
        if !self.list.is_empty() {
            warn!(
                target: "horizon_arbor_render::display_list",
                dropped = self.list.len(),
                "disposing with uncommitted operations"
            );
            self.list.clear();
        }
        self.disposed = true;
        self.target.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
