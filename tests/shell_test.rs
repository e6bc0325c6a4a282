use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use livecast::engine::{EngineInstance, PlayerBackend};
use livecast::error::{PlayerError, Result};
use livecast::event::{Caption, Event, SyncedData, Track};
use livecast::media::Manifest;
use livecast::shell::{PresentationShell, ShellState, View};
use livecast::time::ManualClock;
use livecast::PlayerOptions;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    log: Mutex<Vec<String>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
}

impl Recorder {
    fn push(&self, entry: String) {
        self.log.lock().push(entry);
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

struct RecordingBackend {
    recorder: Arc<Recorder>,
    load_delay: Duration,
    fail: bool,
}

impl RecordingBackend {
    fn new() -> (Arc<Self>, Arc<Recorder>) {
        Self::with(Duration::ZERO, false)
    }

    fn with(load_delay: Duration, fail: bool) -> (Arc<Self>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let backend = Arc::new(Self {
            recorder: recorder.clone(),
            load_delay,
            fail,
        });
        (backend, recorder)
    }
}

#[async_trait]
impl PlayerBackend for RecordingBackend {
    async fn render(
        &self,
        manifest: &Manifest,
        _options: &PlayerOptions,
    ) -> Result<Arc<dyn EngineInstance>> {
        let title = manifest.metadata.title.clone();
        self.recorder.push(format!("load {}", title));
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if self.fail {
            return Err(PlayerError::Engine("no engine".to_string()));
        }

        let live = self.recorder.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_live.fetch_max(live, Ordering::SeqCst);
        self.recorder.push(format!("loaded {}", title));
        Ok(Arc::new(RecordingInstance {
            title,
            recorder: self.recorder.clone(),
        }))
    }
}

struct RecordingInstance {
    title: String,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl EngineInstance for RecordingInstance {
    async fn seek(&self, seconds: u64) -> Result<()> {
        self.recorder.push(format!("seek {} {}", self.title, seconds));
        Ok(())
    }

    async fn unload(&self) -> Result<()> {
        self.recorder.live.fetch_sub(1, Ordering::SeqCst);
        self.recorder.push(format!("unload {}", self.title));
        Ok(())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
}

fn vod(title: &str) -> Event {
    Event {
        title: title.to_string(),
        created: start(),
        is_live: false,
        synced_data: SyncedData {
            updated: start(),
            start_time: None,
            end_time: None,
            duration: 120.0,
            tracks: vec![Track::new("https://cdn.example.com/p.mp4", "presenter/delivery")
                .with_mimetype("video/mp4")
                .with_resolution(1280, 720)],
            captions: vec![Caption::new("https://cdn.example.com/en.vtt", Some("en"))],
            thumbnail: None,
        },
    }
}

fn live(title: &str) -> Event {
    let mut event = vod(title);
    event.is_live = true;
    event.synced_data.start_time = Some(start());
    event.synced_data.end_time = Some(start() + TimeDelta::hours(1));
    event.synced_data.duration = 0.0;
    event.synced_data.tracks = vec![Track::new(
        "https://cdn.example.com/live/master.m3u8",
        "presenter/delivery",
    )
    .with_master(true)];
    event
}

fn options() -> PlayerOptions {
    PlayerOptions::default()
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = count.clone();
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

async fn advance(clock: &ManualClock, by: Duration) {
    clock.advance(TimeDelta::from_std(by).unwrap());
    tokio::time::advance(by).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn test_vod_mounts_player() {
    let (backend, recorder) = RecordingBackend::new();
    let (notified, notifier) = counter();
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_notifier(notifier)
        .mount(vod("Lecture"));

    assert_eq!(shell.state(), ShellState::PlayingOrVod);
    assert_eq!(shell.pending_timers(), 0);
    assert!(shell.engine().await.is_some());
    assert_eq!(recorder.log(), vec!["load Lecture", "loaded Lecture"]);

    match shell.view() {
        View::Player {
            manifest,
            aspect_ratio,
        } => {
            assert_eq!(manifest.metadata.duration, 120.0);
            assert_eq!(manifest.captions[0].text, "Captions (en)");
            assert_eq!(aspect_ratio, (1280, 720));
        }
        other => panic!("unexpected view {:?}", other),
    }

    shell.unmount().await;
    assert_eq!(recorder.log(), vec!["load Lecture", "loaded Lecture", "unload Lecture"]);
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_live_event_transitions() {
    let (backend, recorder) = RecordingBackend::new();
    let (notified, notifier) = counter();
    let clock = Arc::new(ManualClock::new(start() - TimeDelta::minutes(10)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock.clone())
        .with_notifier(notifier)
        .mount(live("Keynote"));

    assert_eq!(shell.state(), ShellState::Pending);
    assert_eq!(shell.pending_timers(), 2);
    assert_eq!(
        shell.view(),
        View::Pending {
            starts_in: Duration::from_secs(600)
        }
    );
    settle().await;
    assert!(recorder.log().is_empty());

    // Just before the start nothing happens
    advance(&clock, Duration::from_secs(599)).await;
    assert_eq!(shell.state(), ShellState::Pending);
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    // Start plus grace
    advance(&clock, Duration::from_millis(1500)).await;
    assert_eq!(shell.state(), ShellState::PlayingOrVod);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(shell.pending_timers(), 1);
    assert_eq!(recorder.log(), vec!["load Keynote", "loaded Keynote"]);

    match shell.view() {
        View::Player { manifest, .. } => {
            assert_eq!(manifest.metadata.duration, 3600.0);
            assert!(manifest.streams[0]
                .sources
                .contains_key(&livecast::media::SourceKind::SegmentedLive));
        }
        other => panic!("unexpected view {:?}", other),
    }

    // End plus grace
    advance(&clock, Duration::from_secs(3600)).await;
    assert_eq!(shell.state(), ShellState::Ended);
    assert_eq!(shell.view(), View::Ended);
    assert_eq!(notified.load(Ordering::SeqCst), 2);
    assert_eq!(shell.pending_timers(), 0);
    shell.settled().await;
    assert_eq!(
        recorder.log(),
        vec!["load Keynote", "loaded Keynote", "unload Keynote"]
    );

    // Nothing left to fire
    advance(&clock, Duration::from_secs(86_400)).await;
    assert_eq!(notified.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_evaluation_is_idempotent() {
    let (backend, _recorder) = RecordingBackend::new();
    let (notified, notifier) = counter();
    let clock = Arc::new(ManualClock::new(start() - TimeDelta::minutes(10)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock.clone())
        .with_notifier(notifier)
        .mount(live("Keynote"));

    let window = shell.window();
    shell.evaluate();
    shell.evaluate();
    assert_eq!(shell.window(), window);
    assert_eq!(shell.pending_timers(), 2);

    advance(&clock, Duration::from_secs(601)).await;
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_already_ended_event_schedules_nothing() {
    let (backend, recorder) = RecordingBackend::new();
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(2)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock)
        .mount(live("Keynote"));

    assert_eq!(shell.state(), ShellState::Ended);
    assert_eq!(shell.pending_timers(), 0);
    shell.settled().await;
    assert!(recorder.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_new_event_waits_for_previous_load() {
    let (backend, recorder) = RecordingBackend::with(Duration::from_secs(5), false);
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .mount(vod("First"));

    settle().await;
    assert_eq!(recorder.log(), vec!["load First"]);

    // Replace while the first engine is still loading
    shell.set_event(vod("Second"));
    shell.settled().await;

    assert_eq!(
        recorder.log(),
        vec![
            "load First",
            "loaded First",
            "unload First",
            "load Second",
            "loaded Second"
        ]
    );
    assert_eq!(recorder.max_live.load(Ordering::SeqCst), 1);

    shell.unmount().await;
    assert_eq!(recorder.live.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_set_event_notifies_on_state_change() {
    let (backend, _recorder) = RecordingBackend::new();
    let (notified, notifier) = counter();
    let clock = Arc::new(ManualClock::new(start() + TimeDelta::hours(2)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock)
        .with_notifier(notifier)
        .mount(vod("Recording"));

    shell.set_event(vod("Other recording"));
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    shell.set_event(live("Ended live"));
    assert_eq!(shell.state(), ShellState::Ended);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_offset_applies_to_first_load_only() {
    let (backend, recorder) = RecordingBackend::new();
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_start_offset("1m30s")
        .mount(vod("First"));
    shell.settled().await;

    shell.set_event(vod("Second"));
    shell.settled().await;

    assert_eq!(
        recorder.log(),
        vec![
            "load First",
            "loaded First",
            "seek First 90",
            "unload First",
            "load Second",
            "loaded Second"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_malformed_start_offset_is_ignored() {
    let (backend, recorder) = RecordingBackend::new();
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_start_offset("soon")
        .mount(vod("First"));
    shell.settled().await;

    assert_eq!(recorder.log(), vec!["load First", "loaded First"]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_leaves_no_engine() {
    let (backend, recorder) = RecordingBackend::with(Duration::ZERO, true);
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .mount(vod("Broken"));

    assert!(shell.engine().await.is_none());
    shell.unmount().await;
    assert_eq!(recorder.log(), vec!["load Broken"]);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_cancels_timers() {
    let (backend, recorder) = RecordingBackend::new();
    let (notified, notifier) = counter();
    let clock = Arc::new(ManualClock::new(start() - TimeDelta::minutes(1)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock.clone())
        .with_notifier(notifier)
        .mount(live("Keynote"));

    shell.unmount().await;
    advance(&clock, Duration::from_secs(7200)).await;

    assert_eq!(notified.load(Ordering::SeqCst), 0);
    assert!(recorder.log().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_waits_for_pending_load() {
    let (backend, recorder) = RecordingBackend::with(Duration::from_secs(5), false);
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .mount(vod("Lecture"));
    settle().await;

    let teardown = shell.unmount();
    settle().await;
    assert_eq!(recorder.log(), vec!["load Lecture"]);

    teardown.await;
    assert_eq!(
        recorder.log(),
        vec!["load Lecture", "loaded Lecture", "unload Lecture"]
    );
    assert_eq!(recorder.max_live.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.live.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_event_ending_during_load_unloads_after_load() {
    let (backend, recorder) = RecordingBackend::with(Duration::from_secs(5), false);
    let (notified, notifier) = counter();
    let end = start() + TimeDelta::hours(1);
    let clock = Arc::new(ManualClock::new(end - TimeDelta::seconds(2)));
    let shell = PresentationShell::builder(backend)
        .with_options(options())
        .with_clock(clock.clone())
        .with_notifier(notifier)
        .mount(live("Keynote"));
    assert_eq!(shell.state(), ShellState::PlayingOrVod);
    assert_eq!(shell.pending_timers(), 1);

    // End plus grace, while the engine is still loading
    advance(&clock, Duration::from_millis(2500)).await;
    assert_eq!(shell.state(), ShellState::Ended);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.log(), vec!["load Keynote"]);

    shell.settled().await;
    assert_eq!(
        recorder.log(),
        vec!["load Keynote", "loaded Keynote", "unload Keynote"]
    );
    assert_eq!(recorder.max_live.load(Ordering::SeqCst), 1);
    assert_eq!(recorder.live.load(Ordering::SeqCst), 0);
}
