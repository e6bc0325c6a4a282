//! # Presentation Shell
//!
//! Decides what to show for an event and owns the player engine instance.
//!
//! A live event that has not started yet shows a placeholder with a
//! countdown, a live event that has ended shows an "ended" placeholder, and
//! everything else gets the player. Transitions between those happen on
//! their own: the shell schedules a timer for the next boundary and
//! re-evaluates when it fires.
//!
//! The engine slot holds at most one instance. Replacing or dropping it
//! never unloads an instance that is still loading; the unload waits for the
//! load to settle, and the next load waits for that unload.

use crate::config::{self, PlayerOptions};
use crate::engine::{EngineInstance, PlayerBackend};
use crate::event::Event;
use crate::media::{aspect_ratio, Manifest, ManifestBuilder};
use crate::time::{delay_till, parse_offset, Clock, SystemClock, TimeWindow};
use crate::timer::TransitionTimers;
use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

type Notifier = Arc<dyn Fn() + Send + Sync>;
type LoadFuture = Shared<BoxFuture<'static, Option<Arc<dyn EngineInstance>>>>;
type TeardownFuture = Shared<BoxFuture<'static, ()>>;

/// What the shell currently presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    /// Live event that has not started yet
    Pending,
    /// Recording, or a running live event
    PlayingOrVod,
    /// Live event that is over
    Ended,
}

impl ShellState {
    /// Maps a time window to the presentation state.
    pub fn from_window(is_live: bool, window: &TimeWindow) -> Self {
        if !is_live {
            ShellState::PlayingOrVod
        } else if window.has_started == Some(false) {
            ShellState::Pending
        } else if window.has_ended == Some(true) {
            ShellState::Ended
        } else {
            ShellState::PlayingOrVod
        }
    }
}

/// What to render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Placeholder with a countdown to the start
    Pending {
        /// Time left until the scheduled start
        starts_in: Duration,
    },
    /// Placeholder for a live event that is over
    Ended,
    /// The player
    Player {
        /// Manifest handed to the engine
        manifest: Manifest,
        /// Aspect ratio of the player area
        aspect_ratio: (u32, u32),
    },
}

/// Configures and mounts a [`PresentationShell`].
pub struct ShellBuilder {
    backend: Arc<dyn PlayerBackend>,
    clock: Arc<dyn Clock>,
    options: PlayerOptions,
    notifier: Option<Notifier>,
    start_offset: u64,
}

impl ShellBuilder {
    /// Uses `clock` instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Uses `options` instead of the process-wide options.
    pub fn with_options(mut self, options: PlayerOptions) -> Self {
        self.options = options;
        self
    }

    /// Called once per change between pending, playing and ended.
    pub fn with_notifier<F>(mut self, notifier: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Seeks the first loaded engine to this offset (`1h2m3s` syntax).
    pub fn with_start_offset(mut self, offset: &str) -> Self {
        self.start_offset = parse_offset(offset);
        self
    }

    /// Mounts the shell for `event`. Must be called within a Tokio runtime.
    ///
    /// Mounting never invokes the notifier.
    pub fn mount(self, event: Event) -> PresentationShell {
        let window = self.window_of(&event);
        let state = ShellState::from_window(event.is_live, &window);
        info!("Mounting player for {:?} in state {:?}", event.title, state);

        let inner = Arc::new(ShellInner {
            backend: self.backend,
            clock: self.clock,
            options: self.options,
            notifier: self.notifier,
            core: Mutex::new(ShellCore {
                event,
                state,
                timers: TransitionTimers::new(),
                engine: None,
                teardown: None,
                start_offset: Some(self.start_offset).filter(|&s| s > 0),
                mounted: true,
            }),
        });

        {
            let mut core = inner.core.lock();
            refresh(&inner, &mut core, true);
        }

        PresentationShell { inner }
    }

    fn window_of(&self, event: &Event) -> TimeWindow {
        TimeWindow::evaluate(
            event.is_live,
            event.start_time(),
            event.end_time(),
            self.clock.now(),
        )
    }
}

/// Chooses between the live placeholders and the player for one event.
pub struct PresentationShell {
    inner: Arc<ShellInner>,
}

struct ShellInner {
    backend: Arc<dyn PlayerBackend>,
    clock: Arc<dyn Clock>,
    options: PlayerOptions,
    notifier: Option<Notifier>,
    core: Mutex<ShellCore>,
}

struct ShellCore {
    event: Event,
    state: ShellState,
    timers: TransitionTimers,
    engine: Option<LoadFuture>,
    teardown: Option<TeardownFuture>,
    start_offset: Option<u64>,
    mounted: bool,
}

impl PresentationShell {
    /// Starts configuring a shell that renders through `backend`.
    pub fn builder(backend: Arc<dyn PlayerBackend>) -> ShellBuilder {
        ShellBuilder {
            backend,
            clock: Arc::new(SystemClock),
            options: config::options(),
            notifier: None,
            start_offset: 0,
        }
    }

    /// Current presentation state
    pub fn state(&self) -> ShellState {
        self.inner.core.lock().state
    }

    /// Time window of the current event, evaluated now.
    pub fn window(&self) -> TimeWindow {
        let core = self.inner.core.lock();
        self.inner.window(&core.event)
    }

    /// Number of transition timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.inner.core.lock().timers.pending()
    }

    /// Re-evaluates the time window, e.g. on a re-render of the host.
    pub fn evaluate(&self) {
        self.inner.evaluate();
    }

    /// Replaces the event. A running engine instance is superseded even if
    /// the state does not change.
    pub fn set_event(&self, event: Event) {
        let changed = {
            let mut core = self.inner.core.lock();
            debug!("Event replaced: {:?} -> {:?}", core.event.title, event.title);
            core.event = event;
            refresh(&self.inner, &mut core, true)
        };
        if changed {
            self.inner.notify();
        }
    }

    /// What to render right now.
    pub fn view(&self) -> View {
        let core = self.inner.core.lock();
        match core.state {
            ShellState::Pending => {
                let now = self.inner.clock.now();
                let starts_in = core
                    .event
                    .start_time()
                    .and_then(|start| (start - now).to_std().ok())
                    .unwrap_or_default();
                View::Pending { starts_in }
            }
            ShellState::Ended => View::Ended,
            ShellState::PlayingOrVod => View::Player {
                manifest: self.inner.manifest(&core.event),
                aspect_ratio: aspect_ratio(&core.event.synced_data.tracks),
            },
        }
    }

    /// The current engine instance, once it has loaded.
    pub async fn engine(&self) -> Option<Arc<dyn EngineInstance>> {
        let load = self.inner.core.lock().engine.clone();
        match load {
            Some(load) => load.await,
            None => None,
        }
    }

    /// Waits until pending loads and unloads have finished.
    pub async fn settled(&self) {
        let (engine, teardown) = {
            let core = self.inner.core.lock();
            (core.engine.clone(), core.teardown.clone())
        };
        if let Some(teardown) = teardown {
            teardown.await;
        }
        if let Some(engine) = engine {
            engine.await;
        }
    }

    /// Unmounts the shell: cancels timers and schedules the engine teardown.
    ///
    /// The teardown runs whether or not the returned future is awaited.
    pub fn unmount(self) -> impl Future<Output = ()> + Send {
        let teardown = {
            let mut core = self.inner.core.lock();
            info!("Unmounting player for {:?}", core.event.title);
            core.mounted = false;
            core.timers.cancel_all();
            teardown_engine(&mut core);
            core.teardown.clone()
        };
        async move {
            if let Some(teardown) = teardown {
                teardown.await;
            }
        }
    }
}

impl ShellInner {
    fn window(&self, event: &Event) -> TimeWindow {
        TimeWindow::evaluate(
            event.is_live,
            event.start_time(),
            event.end_time(),
            self.clock.now(),
        )
    }

    fn manifest(&self, event: &Event) -> Manifest {
        ManifestBuilder::from_event(event)
            .with_caption_label(&self.options.caption_label)
            .build()
    }

    fn evaluate(self: &Arc<Self>) {
        let changed = {
            let mut core = self.core.lock();
            if !core.mounted {
                return;
            }
            refresh(self, &mut core, false)
        };
        if changed {
            self.notify();
        }
    }

    fn notify(&self) {
        if let Some(notifier) = &self.notifier {
            notifier();
        }
    }
}

impl Drop for ShellInner {
    fn drop(&mut self) {
        let core = self.core.get_mut();
        core.timers.cancel_all();
        if core.engine.is_some() && tokio::runtime::Handle::try_current().is_ok() {
            teardown_engine(core);
        }
    }
}

/// Re-evaluates the window, swaps the engine if needed and reschedules the
/// transition timers. Returns whether the state changed.
fn refresh(inner: &Arc<ShellInner>, core: &mut ShellCore, reload: bool) -> bool {
    core.timers.cancel_all();

    let now = inner.clock.now();
    let window = TimeWindow::evaluate(
        core.event.is_live,
        core.event.start_time(),
        core.event.end_time(),
        now,
    );
    let next = ShellState::from_window(core.event.is_live, &window);
    let changed = next != core.state;
    if changed {
        info!("Player state {:?} -> {:?}", core.state, next);
    }
    core.state = next;

    match next {
        ShellState::PlayingOrVod if changed || reload => start_engine(inner, core),
        ShellState::PlayingOrVod => {}
        ShellState::Pending | ShellState::Ended => teardown_engine(core),
    }

    let grace = Duration::from_millis(inner.options.live_grace_ms);
    if let (true, Some(start)) = (window.awaits_start(), window.start_time) {
        let weak = Arc::downgrade(inner);
        core.timers
            .schedule_start(delay_till(start, now, grace), move || fire(weak));
    }
    if let (true, Some(end)) = (window.awaits_end(), window.end_time) {
        let weak = Arc::downgrade(inner);
        core.timers
            .schedule_end(delay_till(end, now, grace), move || fire(weak));
    }

    changed
}

fn fire(weak: Weak<ShellInner>) {
    if let Some(inner) = weak.upgrade() {
        debug!("Transition timer fired");
        inner.evaluate();
    }
}

fn start_engine(inner: &Arc<ShellInner>, core: &mut ShellCore) {
    teardown_engine(core);

    let manifest = inner.manifest(&core.event);
    let previous = core.teardown.clone();
    let backend = inner.backend.clone();
    let options = inner.options.clone();
    let offset = core.start_offset.take();
    let title = core.event.title.clone();

    let load = tokio::spawn(async move {
        if let Some(previous) = previous {
            previous.await;
        }
        debug!("Loading player for {:?}", title);
        match backend.render(&manifest, &options).await {
            Ok(instance) => {
                if let Some(offset) = offset {
                    if let Err(e) = instance.seek(offset).await {
                        warn!("Failed to seek to {}s: {}", offset, e);
                    }
                }
                info!("Player loaded for {:?}", title);
                Some(instance)
            }
            Err(e) => {
                error!("Player failed to load {:?}: {}", title, e);
                None
            }
        }
    });

    core.engine = Some(load.map(|r| r.ok().flatten()).boxed().shared());
}

fn teardown_engine(core: &mut ShellCore) {
    let Some(load) = core.engine.take() else {
        return;
    };

    let teardown = tokio::spawn(async move {
        if let Some(instance) = load.await {
            match instance.unload().await {
                Ok(()) => debug!("Player unloaded"),
                Err(e) => warn!("Failed to unload player: {}", e),
            }
        }
    });

    core.teardown = Some(teardown.map(|_| ()).boxed().shared());
}
