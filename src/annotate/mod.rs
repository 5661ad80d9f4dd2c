//! Scroll-triggered highlighter marks.
//!
//! - [`marks`] -- Jittered mark geometry and draw commands.
//! - [`render`] -- Surfaces that receive draw commands.
//! - [`visibility`] -- Single-shot visibility watchers.
//! - [`scheduler`] -- Selection, FIFO job queue and the single animation worker.

pub mod marks;
pub mod render;
pub mod scheduler;
pub mod visibility;

pub use marks::{DrawCommand, StrokeStyle};
pub use render::{MemorySurface, RenderSurface, SvgOverlaySurface};
pub use scheduler::{AnimationJob, AnnotationEvent, AnnotationScheduler, AnnotationTarget};
pub use visibility::{
    grid_layout, EligibilitySignal, EligibleTarget, ManualVisibility, ScrollViewport,
    VisibilityWatcher,
};
