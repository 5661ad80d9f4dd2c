//! Render surfaces that receive draw commands.
//!
//! A surface owns one overlay per photo. The scheduler asks whether a target
//! is still attached right before drawing, so a grid rebuilt mid-animation
//! simply drops stale work.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use contactsheet_common::PhotoId;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use super::marks::DrawCommand;

/// Per-target drawable overlays.
pub trait RenderSurface: Send + Sync {
    /// Whether the target is still part of the live grid.
    fn is_attached(&self, photo_id: PhotoId) -> bool;

    /// Draw a mark on the target's overlay.
    fn draw(&self, command: &DrawCommand);

    /// Remove every drawn mark from every overlay.
    fn clear_overlays(&self);
}

/// Surface that records commands in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    drawn: Mutex<Vec<DrawCommand>>,
    detached: RwLock<HashSet<PhotoId>>,
    clears: Mutex<usize>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a target from the grid.
    pub fn detach(&self, photo_id: PhotoId) {
        self.detached.write().insert(photo_id);
    }

    pub fn attach(&self, photo_id: PhotoId) {
        self.detached.write().remove(&photo_id);
    }

    /// Every command drawn since the last clear, in draw order.
    pub fn drawn(&self) -> Vec<DrawCommand> {
        self.drawn.lock().clone()
    }

    pub fn drawn_ids(&self) -> Vec<PhotoId> {
        self.drawn.lock().iter().map(|c| c.photo_id).collect()
    }

    /// Number of times the overlays were wiped.
    pub fn clear_count(&self) -> usize {
        *self.clears.lock()
    }
}

impl RenderSurface for MemorySurface {
    fn is_attached(&self, photo_id: PhotoId) -> bool {
        !self.detached.read().contains(&photo_id)
    }

    fn draw(&self, command: &DrawCommand) {
        self.drawn.lock().push(command.clone());
    }

    fn clear_overlays(&self) {
        self.drawn.lock().clear();
        *self.clears.lock() += 1;
    }
}

/// Surface that writes each overlay to `frame-<id>.svg` in a directory.
pub struct SvgOverlaySurface {
    dir: PathBuf,
    targets: HashSet<PhotoId>,
    written: Mutex<Vec<PathBuf>>,
}

impl SvgOverlaySurface {
    /// Surface over the given targets. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>, targets: impl IntoIterator<Item = PhotoId>) -> Self {
        Self {
            dir: dir.into(),
            targets: targets.into_iter().collect(),
            written: Mutex::new(Vec::new()),
        }
    }

    pub fn overlay_path(&self, photo_id: PhotoId) -> PathBuf {
        overlay_path(&self.dir, photo_id)
    }

    /// Paths written since the last clear.
    pub fn written(&self) -> Vec<PathBuf> {
        self.written.lock().clone()
    }
}

fn overlay_path(dir: &Path, photo_id: PhotoId) -> PathBuf {
    dir.join(format!("frame-{}.svg", photo_id))
}

impl RenderSurface for SvgOverlaySurface {
    fn is_attached(&self, photo_id: PhotoId) -> bool {
        self.targets.contains(&photo_id)
    }

    fn draw(&self, command: &DrawCommand) {
        let path = self.overlay_path(command.photo_id);
        match std::fs::write(&path, command.to_svg_document()) {
            Ok(()) => {
                debug!(path = ?path, "Wrote overlay");
                self.written.lock().push(path);
            }
            Err(e) => warn!(path = ?path, error = %e, "Failed to write overlay"),
        }
    }

    fn clear_overlays(&self) {
        for path in self.written.lock().drain(..) {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = ?path, error = %e, "Failed to remove overlay");
            }
        }
    }
}
