//! Visibility watchers.
//!
//! A watcher holds one single-shot [`EligibilitySignal`] per target and fires
//! it the first time the target becomes eligible for a mark. All signals of a
//! scheduler feed one channel, so the scheduler sees eligibility in exactly
//! the order the signals fired. [`ManualVisibility`] fires on command;
//! [`ScrollViewport`] computes intersection ratios for a laid-out grid as a
//! simulated viewport scrolls over it.

use std::collections::HashMap;

use contactsheet_common::PhotoId;
use kurbo::Rect;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::trace;

use crate::config::{LayoutConfig, VisibilityOptions};

/// A target that became eligible, tagged with the selection it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibleTarget {
    pub photo_id: PhotoId,
    pub generation: u64,
}

/// Single-shot "became eligible" signal for one target.
#[derive(Debug)]
pub struct EligibilitySignal {
    target: EligibleTarget,
    tx: mpsc::UnboundedSender<EligibleTarget>,
}

impl EligibilitySignal {
    pub fn new(
        photo_id: PhotoId,
        generation: u64,
        tx: mpsc::UnboundedSender<EligibleTarget>,
    ) -> Self {
        Self {
            target: EligibleTarget {
                photo_id,
                generation,
            },
            tx,
        }
    }

    pub fn photo_id(&self) -> PhotoId {
        self.target.photo_id
    }

    /// Deliver the signal. Returns `false` if nobody is listening any more.
    pub fn fire(self) -> bool {
        self.tx.send(self.target).is_ok()
    }
}

/// Source of single-shot "became eligible" signals.
pub trait VisibilityWatcher: Send + Sync {
    /// Start watching the signal's target. The signal fires at most once,
    /// possibly right away if the target is already eligible.
    fn watch(&self, signal: EligibilitySignal, options: &VisibilityOptions);

    /// Drop every signal that has not fired yet.
    fn unwatch_all(&self);
}

/// Watcher driven explicitly by the caller.
#[derive(Debug, Default)]
pub struct ManualVisibility {
    pending: Mutex<HashMap<PhotoId, EligibilitySignal>>,
}

impl ManualVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the target's signal. Returns `false` if it was not being watched.
    pub fn fire(&self, photo_id: PhotoId) -> bool {
        let signal = self.pending.lock().remove(&photo_id);
        signal.is_some_and(EligibilitySignal::fire)
    }

    /// Targets currently watched, ascending.
    pub fn watched(&self) -> Vec<PhotoId> {
        let mut ids: Vec<PhotoId> = self.pending.lock().keys().copied().collect();
        ids.sort();
        ids
    }
}

impl VisibilityWatcher for ManualVisibility {
    fn watch(&self, signal: EligibilitySignal, _options: &VisibilityOptions) {
        self.pending.lock().insert(signal.photo_id(), signal);
    }

    fn unwatch_all(&self) {
        self.pending.lock().clear();
    }
}

/// Lay out targets left to right, top to bottom.
pub fn grid_layout(ids: &[PhotoId], layout: &LayoutConfig) -> Vec<(PhotoId, Rect)> {
    let per_row = layout.photos_per_row.max(1);
    ids.iter()
        .enumerate()
        .map(|(index, id)| {
            let col = (index % per_row) as f64;
            let row = (index / per_row) as f64;
            let x = layout.gap + col * (layout.frame_width + layout.gap);
            let y = layout.gap + row * (layout.frame_height + layout.gap);
            (
                *id,
                Rect::new(x, y, x + layout.frame_width, y + layout.frame_height),
            )
        })
        .collect()
}

/// Fraction of `target` inside `viewport`.
pub fn intersection_ratio(target: Rect, viewport: Rect) -> f64 {
    let area = target.area();
    if area <= 0.0 {
        return 0.0;
    }
    target.intersect(viewport).area() / area
}

fn is_eligible(target: Rect, viewport: Rect, options: &VisibilityOptions) -> bool {
    let margin = options.root_margin_px;
    let ratio = intersection_ratio(target, viewport.inflate(margin, margin));
    ratio > 0.0 && ratio >= options.threshold
}

struct Watch {
    signal: EligibilitySignal,
    options: VisibilityOptions,
}

/// Simulated scrolling viewport over a laid-out grid.
pub struct ScrollViewport {
    frames: HashMap<PhotoId, Rect>,
    width: f64,
    height: f64,
    offset: Mutex<f64>,
    pending: Mutex<HashMap<PhotoId, Watch>>,
}

impl ScrollViewport {
    pub fn new(frames: impl IntoIterator<Item = (PhotoId, Rect)>, width: f64, height: f64) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            width,
            height,
            offset: Mutex::new(0.0),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Viewport over a grid laid out with `layout`, scrolled to the top.
    pub fn from_layout(ids: &[PhotoId], layout: &LayoutConfig) -> Self {
        let per_row = layout.photos_per_row.max(1) as f64;
        let width = layout.gap + per_row * (layout.frame_width + layout.gap);
        Self::new(grid_layout(ids, layout), width, layout.viewport_height)
    }

    /// Height of the laid-out content, including the trailing gap.
    pub fn content_height(&self) -> f64 {
        let bottom = self.frames.values().map(|r| r.y1).fold(0.0, f64::max);
        let top_gap = self.frames.values().map(|r| r.y0).fold(f64::INFINITY, f64::min);
        if top_gap.is_finite() {
            bottom + top_gap
        } else {
            0.0
        }
    }

    pub fn viewport_height(&self) -> f64 {
        self.height
    }

    pub fn offset(&self) -> f64 {
        *self.offset.lock()
    }

    pub fn frame(&self, photo_id: PhotoId) -> Option<Rect> {
        self.frames.get(&photo_id).copied()
    }

    fn viewport_at(&self, offset: f64) -> Rect {
        Rect::new(0.0, offset, self.width, offset + self.height)
    }

    /// Scroll to `offset` and fire every watched target that became eligible.
    ///
    /// Returns the fired targets, ascending.
    pub fn scroll_to(&self, offset: f64) -> Vec<PhotoId> {
        *self.offset.lock() = offset;
        let viewport = self.viewport_at(offset);

        let mut pending = self.pending.lock();
        let mut fired: Vec<PhotoId> = pending
            .iter()
            .filter(|(id, watch)| {
                self.frames
                    .get(*id)
                    .is_some_and(|rect| is_eligible(*rect, viewport, &watch.options))
            })
            .map(|(id, _)| *id)
            .collect();
        fired.sort();

        // Targets crossing in the same step fire in grid order.
        for id in &fired {
            if let Some(watch) = pending.remove(id) {
                watch.signal.fire();
            }
        }

        if !fired.is_empty() {
            trace!(offset, count = fired.len(), "Targets became visible");
        }
        fired
    }
}

impl VisibilityWatcher for ScrollViewport {
    fn watch(&self, signal: EligibilitySignal, options: &VisibilityOptions) {
        let viewport = self.viewport_at(self.offset());
        let visible_now = self
            .frames
            .get(&signal.photo_id())
            .is_some_and(|rect| is_eligible(*rect, viewport, options));

        if visible_now {
            signal.fire();
        } else {
            self.pending.lock().insert(
                signal.photo_id(),
                Watch {
                    signal,
                    options: *options,
                },
            );
        }
    }

    fn unwatch_all(&self) {
        self.pending.lock().clear();
    }
}
