//! Integration tests for scroll-triggered highlighter marks.
//!
//! These drive the scheduler through a simulated scrolling viewport with the
//! clock paused, so settle delays and draw durations elapse instantly.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use contactsheet::annotate::{
    AnnotationEvent, AnnotationScheduler, MemorySurface, ScrollViewport, SvgOverlaySurface,
};
use contactsheet::config::{AnnotationConfig, LayoutConfig};
use contactsheet_common::{MarkKind, PhotoId};
use tokio::sync::broadcast;

fn ids(n: u32) -> Vec<PhotoId> {
    (1..=n).map(PhotoId::new).collect()
}

/// Short viewport so only a few rows are visible at once.
fn layout() -> LayoutConfig {
    LayoutConfig {
        viewport_height: 300.0,
        ..LayoutConfig::default()
    }
}

/// Scroll from the top to the bottom in half-viewport steps.
async fn scroll_through(viewport: &ScrollViewport) {
    let max_offset = (viewport.content_height() - viewport.viewport_height()).max(0.0);
    let step = viewport.viewport_height() / 2.0;
    let mut offset = 0.0;
    loop {
        viewport.scroll_to(offset);
        tokio::task::yield_now().await;
        if offset >= max_offset {
            break;
        }
        offset = (offset + step).min(max_offset);
    }
}

/// Collect `count` finished jobs, ignoring other events.
async fn finished(
    events: &mut broadcast::Receiver<AnnotationEvent>,
    count: usize,
) -> Vec<AnnotationEvent> {
    let mut out = Vec::new();
    while out.len() < count {
        match events.recv().await.unwrap() {
            event @ (AnnotationEvent::Drawn { .. } | AnnotationEvent::Skipped { .. }) => {
                out.push(event)
            }
            _ => {}
        }
    }
    out
}

/// Wait for the next Drawn event, or `None` if nothing is drawn in time.
async fn next_drawn(events: &mut broadcast::Receiver<AnnotationEvent>) -> Option<PhotoId> {
    let wait = async {
        loop {
            if let Ok(AnnotationEvent::Drawn { photo_id, .. }) = events.recv().await {
                return photo_id;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(30), wait).await.ok()
}

#[tokio::test(start_paused = true)]
async fn scrolling_marks_every_selected_photo_once() {
    let all = ids(106);
    let viewport = Arc::new(ScrollViewport::from_layout(&all, &layout()));
    let surface = Arc::new(MemorySurface::new());
    let scheduler = AnnotationScheduler::seeded(
        AnnotationConfig::default(),
        surface.clone(),
        viewport.clone(),
        7,
    );
    let mut events = scheduler.subscribe();

    let selected = scheduler.initialize(&all, 0.30);
    assert_eq!(selected.len(), 31);

    scroll_through(&viewport).await;
    let done = finished(&mut events, selected.len()).await;

    let mut drawn = Vec::new();
    let mut kinds: Vec<MarkKind> = Vec::new();
    for event in done {
        match event {
            AnnotationEvent::Drawn {
                photo_id,
                mark_kind,
                duration,
            } => {
                assert!(duration >= Duration::from_millis(200));
                assert!(duration <= Duration::from_millis(500));
                drawn.push(photo_id);
                kinds.push(mark_kind);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    let unique: HashSet<PhotoId> = drawn.iter().copied().collect();
    assert_eq!(unique.len(), drawn.len());
    assert_eq!(unique, selected.iter().copied().collect());
    assert!(kinds.windows(2).all(|pair| pair[0] != pair[1]));
    assert_eq!(surface.drawn_ids(), drawn);
    assert!(scheduler
        .targets()
        .iter()
        .all(|t| t.has_been_marked == t.selected));

    // Scrolling back up does not replay anything.
    viewport.scroll_to(0.0);
    assert_eq!(next_drawn(&mut events).await, None);
    assert_eq!(surface.drawn().len(), 31);
}

#[tokio::test(start_paused = true)]
async fn photos_below_the_fold_wait_for_scroll() {
    let all = ids(60);
    let viewport = Arc::new(ScrollViewport::from_layout(&all, &layout()));
    let surface = Arc::new(MemorySurface::new());
    let scheduler =
        AnnotationScheduler::seeded(AnnotationConfig::default(), surface.clone(), viewport.clone(), 3);
    let mut events = scheduler.subscribe();

    let selected = scheduler.initialize(&all, 1.0);
    assert_eq!(selected.len(), 60);

    // Without scrolling only the first rows can ever be marked.
    let visible: Vec<PhotoId> = all
        .iter()
        .copied()
        .filter(|id| {
            viewport.frame(*id).is_some_and(|r| {
                let overlap = (r.y1.min(300.0) - r.y0.max(0.0)).max(0.0);
                overlap / r.height() >= 0.5
            })
        })
        .collect();
    assert!(!visible.is_empty());
    finished(&mut events, visible.len()).await;
    assert_eq!(next_drawn(&mut events).await, None);

    let drawn: HashSet<PhotoId> = surface.drawn_ids().into_iter().collect();
    assert_eq!(drawn, visible.iter().copied().collect());

    scroll_through(&viewport).await;
    finished(&mut events, 60 - visible.len()).await;
    assert_eq!(surface.drawn().len(), 60);
}

#[tokio::test(start_paused = true)]
async fn detached_target_is_skipped() {
    let all = ids(12);
    let viewport = Arc::new(ScrollViewport::from_layout(&all, &LayoutConfig::default()));
    let surface = Arc::new(MemorySurface::new());
    let scheduler =
        AnnotationScheduler::seeded(AnnotationConfig::default(), surface.clone(), viewport.clone(), 11);
    let mut events = scheduler.subscribe();

    let selected = scheduler.initialize(&all, 0.5);
    assert_eq!(selected.len(), 6);
    surface.detach(selected[0]);

    // Everything already fits in the default viewport.
    let done = finished(&mut events, selected.len()).await;
    assert!(done.contains(&AnnotationEvent::Skipped {
        photo_id: selected[0]
    }));
    assert!(!surface.drawn_ids().contains(&selected[0]));
    assert_eq!(surface.drawn().len(), 5);
    assert!(!scheduler.target(selected[0]).unwrap().has_been_marked);
}

#[tokio::test(start_paused = true)]
async fn reinitializing_clears_overlays_and_pending_work() {
    let dir = tempfile::tempdir().unwrap();
    let all = ids(30);
    let viewport = Arc::new(ScrollViewport::from_layout(&all, &layout()));
    let surface = Arc::new(SvgOverlaySurface::new(dir.path(), all.iter().copied()));
    let scheduler =
        AnnotationScheduler::seeded(AnnotationConfig::default(), surface.clone(), viewport.clone(), 5);
    let mut events = scheduler.subscribe();

    scheduler.initialize(&all, 0.5);
    scroll_through(&viewport).await;

    let first = next_drawn(&mut events).await.unwrap();
    let overlay = surface.overlay_path(first);
    let svg = std::fs::read_to_string(&overlay).unwrap();
    assert!(svg.contains("#FFFD77"));

    let selected = scheduler.initialize(&all, 0.0);
    assert!(selected.is_empty());
    assert!(!overlay.exists());
    assert!(surface.written().is_empty());

    // Jobs queued before the reset never draw.
    assert_eq!(next_drawn(&mut events).await, None);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
