//! Visibility-driven annotation scheduler.
//!
//! [`AnnotationScheduler::initialize`] picks a random subset of targets and
//! hands each a single-shot [`EligibilitySignal`]. Every signal feeds one
//! channel drained by a dispatcher task, so targets are handled in the order
//! their signals fired. When a selected target becomes eligible it is assigned
//! a mark kind and an [`AnimationJob`] is appended to a FIFO queue. One worker
//! task consumes the queue, so exactly one animation is in flight across the
//! whole grid:
//!
//! 1. dequeue the head job
//! 2. wait the settle delay
//! 3. skip the job if the grid was cleared or the target detached meanwhile
//! 4. draw the mark and wait out its duration
//!
//! Both tasks run until the scheduler is dropped. Surfaces are only called
//! with the state lock released.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use contactsheet_common::{MarkKind, PhotoId};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tokio::sync::{broadcast, mpsc, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::marks::DrawCommand;
use super::render::RenderSurface;
use super::visibility::{EligibilitySignal, EligibleTarget, VisibilityWatcher};
use crate::config::AnnotationConfig;

/// Capacity of the event broadcast channel.
const EVENT_CAPACITY: usize = 1024;

/// Per-photo annotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationTarget {
    pub photo_id: PhotoId,
    /// Decided once per `initialize`.
    pub selected: bool,
    /// Assigned when the target's job is queued.
    pub mark_kind: Option<MarkKind>,
    pub has_been_marked: bool,
}

impl AnnotationTarget {
    fn new(photo_id: PhotoId, selected: bool) -> Self {
        Self {
            photo_id,
            selected,
            mark_kind: None,
            has_been_marked: false,
        }
    }

    fn reset(&mut self) {
        self.selected = false;
        self.mark_kind = None;
        self.has_been_marked = false;
    }
}

/// A queued draw for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationJob {
    pub photo_id: PhotoId,
    pub mark_kind: MarkKind,
    generation: u64,
}

/// Progress notifications from the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEvent {
    Queued {
        photo_id: PhotoId,
        mark_kind: MarkKind,
    },
    /// The job was dropped because its target detached or the grid was cleared.
    Skipped { photo_id: PhotoId },
    Drawn {
        photo_id: PhotoId,
        mark_kind: MarkKind,
        duration: Duration,
    },
    Cleared,
}

struct SchedulerState {
    generation: u64,
    targets: Vec<AnnotationTarget>,
    index: HashMap<PhotoId, usize>,
    queue: VecDeque<AnimationJob>,
    last_kind: Option<MarkKind>,
    playing: Option<AnimationJob>,
    rng: StdRng,
}

struct Shared {
    config: AnnotationConfig,
    kinds: Vec<MarkKind>,
    surface: Arc<dyn RenderSurface>,
    watcher: Arc<dyn VisibilityWatcher>,
    state: Mutex<SchedulerState>,
    /// Orders draws against `clear_overlays`.
    render: Mutex<()>,
    eligible: mpsc::UnboundedSender<EligibleTarget>,
    wake: Notify,
    events: broadcast::Sender<AnnotationEvent>,
}

/// Serializes highlighter animations across a grid of targets.
pub struct AnnotationScheduler {
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl AnnotationScheduler {
    /// Create a scheduler and spawn its dispatcher and worker. Must be called
    /// inside a Tokio runtime.
    pub fn new(
        config: AnnotationConfig,
        surface: Arc<dyn RenderSurface>,
        watcher: Arc<dyn VisibilityWatcher>,
    ) -> Self {
        Self::with_rng(config, surface, watcher, StdRng::from_entropy())
    }

    /// Like [`new`](Self::new) with a reproducible random sequence.
    pub fn seeded(
        config: AnnotationConfig,
        surface: Arc<dyn RenderSurface>,
        watcher: Arc<dyn VisibilityWatcher>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, surface, watcher, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: AnnotationConfig,
        surface: Arc<dyn RenderSurface>,
        watcher: Arc<dyn VisibilityWatcher>,
        rng: StdRng,
    ) -> Self {
        let mut kinds = Vec::new();
        for kind in &config.mark_kinds {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        if kinds.is_empty() {
            kinds.extend(MarkKind::ALL);
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (eligible, eligible_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            config,
            kinds,
            surface,
            watcher,
            state: Mutex::new(SchedulerState {
                generation: 0,
                targets: Vec::new(),
                index: HashMap::new(),
                queue: VecDeque::new(),
                last_kind: None,
                playing: None,
                rng,
            }),
            render: Mutex::new(()),
            eligible,
            wake: Notify::new(),
            events,
        });

        let cancel = CancellationToken::new();
        tokio::spawn(run_dispatcher(
            Arc::clone(&shared),
            eligible_rx,
            cancel.clone(),
        ));
        tokio::spawn(run_worker(Arc::clone(&shared), cancel.clone()));

        Self { shared, cancel }
    }

    /// Select `floor(len * fraction)` targets at random and start watching them.
    ///
    /// The product gets a 1e-9 nudge before flooring so that fractions like
    /// 0.29 of 100 select 29 rather than 28 after float rounding.
    ///
    /// Prior state is cleared first. Returns the selected ids in grid order.
    pub fn initialize(&self, targets: &[PhotoId], fraction: f64) -> Vec<PhotoId> {
        self.clear();

        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let count = if self.shared.config.enabled {
            (((targets.len() as f64) * fraction + 1e-9).floor() as usize).min(targets.len())
        } else {
            debug!("Annotations disabled; selecting no targets");
            0
        };

        let (generation, selected) = {
            let mut state = self.shared.state.lock();

            let mut order: Vec<usize> = (0..targets.len()).collect();
            order.shuffle(&mut state.rng);
            let chosen: HashSet<usize> = order.into_iter().take(count).collect();

            state.targets = targets
                .iter()
                .enumerate()
                .map(|(i, id)| AnnotationTarget::new(*id, chosen.contains(&i)))
                .collect();
            state.index = targets.iter().enumerate().map(|(i, id)| (*id, i)).collect();

            let selected: Vec<PhotoId> = state
                .targets
                .iter()
                .filter(|t| t.selected)
                .map(|t| t.photo_id)
                .collect();
            (state.generation, selected)
        };

        let options = self.shared.config.visibility;
        for &photo_id in &selected {
            let signal =
                EligibilitySignal::new(photo_id, generation, self.shared.eligible.clone());
            self.shared.watcher.watch(signal, &options);
        }

        info!(
            total = targets.len(),
            selected = selected.len(),
            fraction,
            "Will mark random photos on scroll"
        );
        selected
    }

    /// Handle a target becoming eligible. Returns `true` if a job was queued.
    ///
    /// Unselected, already-queued and already-marked targets are ignored.
    pub fn on_eligible(&self, photo_id: PhotoId) -> bool {
        let generation = self.shared.state.lock().generation;
        self.shared.on_eligible(generation, photo_id)
    }

    /// Drop every pending job and subscription and reset all targets.
    ///
    /// An animation already past its settle delay runs to completion; one
    /// still settling is skipped.
    pub fn clear(&self) {
        {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            state.queue.clear();
            state.last_kind = None;
            for target in &mut state.targets {
                target.reset();
            }
        }

        self.shared.watcher.unwatch_all();
        {
            let _render = self.shared.render.lock();
            self.shared.surface.clear_overlays();
        }

        debug!("Cleared all markings");
        let _ = self.shared.events.send(AnnotationEvent::Cleared);
    }

    /// Receive scheduler events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AnnotationEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.state.lock().playing.is_some()
    }

    /// The job currently settling or animating.
    pub fn playing(&self) -> Option<AnimationJob> {
        self.shared.state.lock().playing
    }

    /// Jobs waiting behind the playing one, in play order.
    pub fn pending(&self) -> Vec<AnimationJob> {
        self.shared.state.lock().queue.iter().copied().collect()
    }

    pub fn targets(&self) -> Vec<AnnotationTarget> {
        self.shared.state.lock().targets.clone()
    }

    pub fn target(&self, photo_id: PhotoId) -> Option<AnnotationTarget> {
        let state = self.shared.state.lock();
        state.index.get(&photo_id).map(|&i| state.targets[i])
    }

    /// Selected targets in grid order.
    pub fn selected(&self) -> Vec<PhotoId> {
        self.shared
            .state
            .lock()
            .targets
            .iter()
            .filter(|t| t.selected)
            .map(|t| t.photo_id)
            .collect()
    }

    pub fn config(&self) -> &AnnotationConfig {
        &self.shared.config
    }
}

impl Drop for AnnotationScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Shared {
    fn on_eligible(&self, generation: u64, photo_id: PhotoId) -> bool {
        let mut state = self.state.lock();
        if state.generation != generation {
            return false;
        }

        let Some(&i) = state.index.get(&photo_id) else {
            return false;
        };
        let target = state.targets[i];
        if !target.selected || target.has_been_marked || target.mark_kind.is_some() {
            return false;
        }

        let mark_kind = self.pick_kind(&mut state);
        state.targets[i].mark_kind = Some(mark_kind);
        state.last_kind = Some(mark_kind);
        state.queue.push_back(AnimationJob {
            photo_id,
            mark_kind,
            generation,
        });
        drop(state);

        debug!(photo_id = %photo_id, mark = %mark_kind, "Queued mark");
        let _ = self.events.send(AnnotationEvent::Queued {
            photo_id,
            mark_kind,
        });
        self.wake.notify_one();
        true
    }

    /// Uniform pick, resampled while it repeats the previous job's kind.
    fn pick_kind(&self, state: &mut SchedulerState) -> MarkKind {
        loop {
            let kind = self.kinds[state.rng.gen_range(0..self.kinds.len())];
            if self.kinds.len() < 2 || state.last_kind != Some(kind) {
                return kind;
            }
        }
    }

    /// Draw unless the grid was cleared, then mark the target.
    ///
    /// The render lock keeps a concurrent `clear` from wiping overlays between
    /// the generation check and the draw.
    fn draw(&self, job: &AnimationJob, command: &DrawCommand) -> bool {
        let _render = self.render.lock();
        if self.state.lock().generation != job.generation {
            debug!(photo_id = %job.photo_id, "Dropping job from a cleared grid");
            return false;
        }

        self.surface.draw(command);

        let mut state = self.state.lock();
        if state.generation == job.generation {
            if let Some(&i) = state.index.get(&job.photo_id) {
                state.targets[i].has_been_marked = true;
            }
        }
        true
    }

    fn begin_next(&self) -> Option<AnimationJob> {
        let mut state = self.state.lock();
        let job = state.queue.pop_front()?;
        state.playing = Some(job);
        Some(job)
    }

    async fn play(&self, job: AnimationJob) {
        tokio::time::sleep(self.config.settle_delay()).await;

        let command = if self.state.lock().generation != job.generation {
            debug!(photo_id = %job.photo_id, "Dropping job from a cleared grid");
            None
        } else if !self.surface.is_attached(job.photo_id) {
            warn!(photo_id = %job.photo_id, "Target no longer attached; skipping mark");
            None
        } else {
            let mut state = self.state.lock();
            let min = self.config.draw_duration_min_ms;
            let max = self.config.draw_duration_max_ms.max(min);
            let duration = Duration::from_millis(state.rng.gen_range(min..=max));
            Some(DrawCommand::generate(
                job.photo_id,
                job.mark_kind,
                duration,
                &mut state.rng,
            ))
        };
        let drawn = command.filter(|c| self.draw(&job, c)).map(|c| c.duration);

        match drawn {
            Some(duration) => {
                info!(
                    photo_id = %job.photo_id,
                    mark = %job.mark_kind,
                    duration_ms = duration.as_millis() as u64,
                    "Drawing mark"
                );
                let _ = self.events.send(AnnotationEvent::Drawn {
                    photo_id: job.photo_id,
                    mark_kind: job.mark_kind,
                    duration,
                });
                tokio::time::sleep(duration).await;
            }
            None => {
                let _ = self.events.send(AnnotationEvent::Skipped {
                    photo_id: job.photo_id,
                });
            }
        }

        self.state.lock().playing = None;
    }
}

/// Single consumer of eligibility signals, in the order they fired.
async fn run_dispatcher(
    shared: Arc<Shared>,
    mut eligible: mpsc::UnboundedReceiver<EligibleTarget>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            target = eligible.recv() => match target {
                Some(target) => {
                    shared.on_eligible(target.generation, target.photo_id);
                }
                None => break,
            },
            _ = cancel.cancelled() => break,
        }
    }

    debug!("Eligibility dispatcher stopped");
}

/// Single consumer of the job queue.
async fn run_worker(shared: Arc<Shared>, cancel: CancellationToken) {
    debug!("Annotation worker started");

    loop {
        let job = match shared.begin_next() {
            Some(job) => job,
            None => {
                tokio::select! {
                    _ = shared.wake.notified() => {}
                    _ = cancel.cancelled() => break,
                }
                continue;
            }
        };

        tokio::select! {
            _ = shared.play(job) => {}
            _ = cancel.cancelled() => break,
        }
    }

    debug!("Annotation worker stopped");
}
