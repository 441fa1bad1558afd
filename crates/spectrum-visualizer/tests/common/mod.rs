//! In-memory stand-ins for the browser pieces the controller drives
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use egui::{pos2, Color32, Rect, Vec2};
use spectrum_visualizer::{
    BackgroundLayer, ControllerParts, FrameCallback, FrameControl, FrameScheduler, GraphBackend,
    GraphError, MediaElement, MediaError, PlaybackController, ResourceHandle, ResourceReleaser,
    Surface, TrackId, VisualizerConfig,
};

pub struct FakeMedia {
    pub paused: Cell<bool>,
    pub ended: Cell<bool>,
    pub time: Cell<f64>,
    pub source: RefCell<Option<String>>,
    pub loads: Cell<u32>,
    pub plays: Cell<u32>,
    pub reject_play: Cell<bool>,
}

impl Default for FakeMedia {
    fn default() -> Self {
        Self {
            paused: Cell::new(true),
            ended: Cell::new(false),
            time: Cell::new(0.0),
            source: RefCell::new(None),
            loads: Cell::new(0),
            plays: Cell::new(0),
            reject_play: Cell::new(false),
        }
    }
}

impl FakeMedia {
    pub fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    /// What the element looks like once it runs out of data
    pub fn finish(&self) {
        self.paused.set(true);
        self.ended.set(true);
    }
}

impl MediaElement for FakeMedia {
    fn paused(&self) -> bool {
        self.paused.get()
    }

    fn ended(&self) -> bool {
        self.ended.get()
    }

    fn current_time(&self) -> f64 {
        self.time.get()
    }

    fn set_current_time(&self, seconds: f64) {
        self.time.set(seconds);
    }

    fn set_source(&self, url: &str) {
        *self.source.borrow_mut() = Some(url.to_owned());
        self.ended.set(false);
    }

    fn load(&self) {
        self.loads.set(self.loads.get() + 1);
    }

    fn play(&self) -> Result<(), MediaError> {
        if self.reject_play.get() {
            return Err(MediaError::PlayRejected("NotAllowedError".into()));
        }
        self.plays.set(self.plays.get() + 1);
        self.paused.set(false);
        self.ended.set(false);
        Ok(())
    }

    fn pause(&self) -> Result<(), MediaError> {
        self.paused.set(true);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBackend {
    pub analysers: u32,
    pub captures: u32,
    pub outputs: u32,
    pub fail_analyser: bool,
    pub fail_capture: bool,
    pub suspended: Cell<bool>,
    pub resumes: Cell<u32>,
    /// Value reported for every bin
    pub level: u8,
}

impl FakeBackend {
    pub fn with_level(level: u8) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

impl GraphBackend for FakeBackend {
    type Element = FakeMedia;

    fn create_analyser(&mut self, _fft_size: u32) -> Result<(), GraphError> {
        if self.fail_analyser {
            return Err(GraphError::Analyser("unsupported".into()));
        }
        self.analysers += 1;
        Ok(())
    }

    fn capture(&mut self, _element: &FakeMedia) -> Result<(), GraphError> {
        if self.fail_capture {
            return Err(GraphError::Capture("already captured".into()));
        }
        self.captures += 1;
        Ok(())
    }

    fn connect_output(&mut self) -> Result<(), GraphError> {
        self.outputs += 1;
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.suspended.get()
    }

    fn resume(&self, done: Box<dyn FnOnce(Result<(), GraphError>)>) {
        self.resumes.set(self.resumes.get() + 1);
        self.suspended.set(false);
        done(Ok(()));
    }

    fn bin_count(&self) -> usize {
        128
    }

    fn read_frequency_data(&self, buf: &mut [u8]) {
        buf.fill(self.level);
    }
}

#[derive(Default)]
struct SchedulerState {
    active: bool,
    delay: Option<Duration>,
    callback: Option<FrameCallback>,
    starts: u32,
}

/// Frames only happen when a test calls [`ManualScheduler::fire`]
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<SchedulerState>>,
}

impl ManualScheduler {
    pub fn fire(&self) -> Option<FrameControl> {
        let mut callback = {
            let mut s = self.inner.borrow_mut();
            if !s.active {
                return None;
            }
            s.callback.take()?
        };
        let control = callback(0.0);
        let mut s = self.inner.borrow_mut();
        match control {
            FrameControl::Continue if s.active => s.callback = Some(callback),
            _ => s.active = false,
        }
        Some(control)
    }

    pub fn starts(&self) -> u32 {
        self.inner.borrow().starts
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.inner.borrow().delay
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, delay: Duration, on_frame: FrameCallback) {
        let mut s = self.inner.borrow_mut();
        if s.active {
            return;
        }
        s.active = true;
        s.delay = Some(delay);
        s.callback = Some(on_frame);
        s.starts += 1;
    }

    fn cancel(&mut self) {
        let mut s = self.inner.borrow_mut();
        s.active = false;
        s.callback = None;
    }

    fn is_active(&self) -> bool {
        self.inner.borrow().active
    }
}

#[derive(Default)]
pub struct SurfaceLog {
    pub bars: Vec<(Rect, Color32)>,
    pub clears: u32,
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    pub log: Rc<RefCell<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn bar_count(&self) -> usize {
        self.log.borrow().bars.len()
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(256.0, 100.0))
    }

    fn clear(&mut self) {
        let mut log = self.log.borrow_mut();
        log.bars.clear();
        log.clears += 1;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.log.borrow_mut().bars.push((rect, color));
    }
}

#[derive(Clone, Default)]
pub struct RecordingBackground {
    pub offsets: Rc<RefCell<Vec<Vec2>>>,
}

impl RecordingBackground {
    pub fn last(&self) -> Option<Vec2> {
        self.offsets.borrow().last().copied()
    }
}

impl BackgroundLayer for RecordingBackground {
    fn set_offset(&mut self, offset: Vec2) {
        self.offsets.borrow_mut().push(offset);
    }
}

/// Records released URLs, and separately those released while the element
/// was still playing from them
#[derive(Clone)]
pub struct CountingReleaser {
    media: Rc<FakeMedia>,
    released: Rc<RefCell<Vec<String>>>,
    while_active: Rc<RefCell<Vec<String>>>,
}

impl CountingReleaser {
    pub fn new(media: Rc<FakeMedia>) -> Self {
        Self {
            media,
            released: Rc::default(),
            while_active: Rc::default(),
        }
    }

    pub fn released(&self) -> Vec<String> {
        self.released.borrow().clone()
    }

    pub fn released_while_active(&self) -> Vec<String> {
        self.while_active.borrow().clone()
    }
}

impl ResourceReleaser for CountingReleaser {
    fn release(&self, handle: ResourceHandle) {
        let url = handle.url().to_owned();
        if self.media.source().as_deref() == Some(url.as_str()) {
            self.while_active.borrow_mut().push(url.clone());
        }
        self.released.borrow_mut().push(url);
    }
}

pub type TestController = PlaybackController<FakeMedia, FakeBackend>;

/// A controller wired to fakes, plus handles on everything it touches
pub struct Harness {
    pub controller: TestController,
    pub media: Rc<FakeMedia>,
    pub scheduler: ManualScheduler,
    pub surface: RecordingSurface,
    pub background: RecordingBackground,
    pub releaser: CountingReleaser,
    pub config: VisualizerConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_backend(FakeBackend::with_level(200))
    }

    pub fn with_backend(backend: FakeBackend) -> Self {
        let media = Rc::new(FakeMedia::default());
        let scheduler = ManualScheduler::default();
        let surface = RecordingSurface::default();
        let background = RecordingBackground::default();
        let releaser = CountingReleaser::new(Rc::clone(&media));
        let config = VisualizerConfig::default();

        let parts = ControllerParts {
            media: Rc::clone(&media),
            backend,
            releaser: Box::new(releaser.clone()),
            scheduler: Box::new(scheduler.clone()),
            surface: Box::new(surface.clone()),
            background: Some(Box::new(background.clone())),
            seed: 7,
        };
        let controller = PlaybackController::new(parts, &config);

        Self {
            controller,
            media,
            scheduler,
            surface,
            background,
            releaser,
            config,
        }
    }

    /// Harness with `names` uploaded and the first one playing
    pub fn with_tracks(names: &[&str]) -> (Self, Vec<TrackId>) {
        let mut h = Self::new();
        let ids = names.iter().map(|name| h.upload(name)).collect();
        h.element_started();
        (h, ids)
    }

    pub fn upload(&mut self, name: &str) -> TrackId {
        self.controller
            .add_track(name, ResourceHandle::new(format!("blob:{name}")))
    }

    /// Deliver the `canplay` and `play` events the element sends after a load
    pub fn element_started(&mut self) {
        self.controller.on_can_play();
        self.controller.on_play();
    }

    /// Let the element reach the end of its data and deliver `ended`
    pub fn element_ended(&mut self) {
        self.media.finish();
        self.controller.on_ended();
    }

    pub fn frame(&self) -> Option<FrameControl> {
        self.scheduler.fire()
    }
}
