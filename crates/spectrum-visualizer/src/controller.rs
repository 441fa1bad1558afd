//! Playback controller: turns transport events and user commands into
//! playlist, media element, graph and render loop transitions.
//!
//! The host forwards media element events (`canplay`, `play`, `pause`,
//! `ended`) to the matching `on_*` method. Nothing here blocks; every wait is
//! an event the host delivers later.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::VisualizerConfig;
use crate::graph::{GraphBackend, SignalGraph};
use crate::error::MediaError;
use crate::media::{MediaElement, Playback};
use crate::playlist::{Playlist, ResourceHandle, ResourceReleaser, TrackId, TrackSummary};
use crate::render::{BackgroundLayer, RenderLoop, Surface};
use crate::scheduler::FrameScheduler;
use crate::settings::PlaybackSettings;
use crate::spectrum::FrequencySource;

/// What to do when a track finishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndedAction {
    /// Play the same index again from the start
    Restart(usize),
    Advance(usize),
    Stop,
}

/// End-of-track policy: loop track, then loop playlist, then next track, then stop
pub fn next_after_end(
    settings: PlaybackSettings,
    selected: Option<usize>,
    len: usize,
) -> EndedAction {
    if settings.loop_track() {
        if let Some(idx) = selected {
            return EndedAction::Restart(idx);
        }
    }
    if settings.loop_playlist() && len > 0 {
        return EndedAction::Advance(selected.map_or(0, |idx| (idx + 1) % len));
    }
    match selected {
        Some(idx) if idx + 1 < len => EndedAction::Advance(idx + 1),
        _ => EndedAction::Stop,
    }
}

/// Platform pieces the controller is assembled from
pub struct ControllerParts<M, B> {
    pub media: Rc<M>,
    pub backend: B,
    pub releaser: Box<dyn ResourceReleaser>,
    pub scheduler: Box<dyn FrameScheduler>,
    pub surface: Box<dyn Surface>,
    pub background: Option<Box<dyn BackgroundLayer>>,
    /// Seed for the vibration jitter
    pub seed: u64,
}

pub struct PlaybackController<M, B>
where
    M: MediaElement + 'static,
    B: GraphBackend<Element = M> + 'static,
{
    media: Rc<M>,
    graph: Rc<RefCell<SignalGraph<B>>>,
    playlist: Playlist,
    render: RenderLoop,
    settings: PlaybackSettings,
    phase: Playback,
    /// Track whose resource is the element's current source
    loaded: Option<TrackId>,
    grace: Duration,
}

impl<M, B> PlaybackController<M, B>
where
    M: MediaElement + 'static,
    B: GraphBackend<Element = M> + 'static,
{
    pub fn new(parts: ControllerParts<M, B>, config: &VisualizerConfig) -> Self {
        let graph = Rc::new(RefCell::new(SignalGraph::new(parts.backend, config.fft_size)));
        let source: Rc<RefCell<dyn FrequencySource>> = graph.clone();
        let media: Rc<dyn MediaElement> = parts.media.clone();
        let render = RenderLoop::new(
            parts.scheduler,
            media,
            source,
            parts.surface,
            parts.background,
            config,
            parts.seed,
        );
        Self {
            media: parts.media,
            graph,
            playlist: Playlist::new(parts.releaser),
            render,
            settings: PlaybackSettings::default(),
            phase: Playback::Stopped,
            loaded: None,
            grace: Duration::from_millis(u64::from(config.play_grace_ms)),
        }
    }

    pub fn phase(&self) -> Playback {
        self.phase
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.playlist.summaries()
    }

    /// Selected index, `None` when nothing is selected
    pub fn selected_index(&self) -> Option<usize> {
        self.playlist.selected_index()
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render
    }

    pub fn graph(&self) -> &Rc<RefCell<SignalGraph<B>>> {
        &self.graph
    }

    // ===== Commands =====

    /// Add an uploaded track; starts it when nothing else is queued up
    pub fn add_track(&mut self, name: impl Into<String>, resource: ResourceHandle) -> TrackId {
        let name = name.into();
        log::info!("Added track: {name}");
        let id = self.playlist.add(name, resource);
        if self.playlist.selected_index().is_none() && self.phase == Playback::Stopped {
            if let Some(index) = self.playlist.index_of(id) {
                self.load_and_play(index);
            }
        }
        id
    }

    pub fn select_track(&mut self, index: usize) {
        self.load_and_play(index);
    }

    /// Remove a track, stopping playback first if it is the one playing
    pub fn remove_track(&mut self, id: TrackId) {
        let Some(index) = self.playlist.index_of(id) else {
            log::debug!("Ignoring removal of unknown {id}");
            return;
        };
        let in_use = self.loaded == Some(id);
        if in_use || self.playlist.selected_index() == Some(index) {
            self.halt();
        }
        self.playlist.remove(id, in_use);
        if in_use {
            self.loaded = None;
        }
    }

    pub fn move_track(&mut self, from: usize, to: usize) {
        self.playlist.move_track(from, to);
    }

    pub fn toggle_loop_track(&mut self) {
        self.apply_settings(self.settings.toggle_loop_track());
    }

    pub fn toggle_loop_playlist(&mut self) {
        self.apply_settings(self.settings.toggle_loop_playlist());
    }

    pub fn toggle_vibration(&mut self) {
        self.apply_settings(self.settings.toggle_vibration());
    }

    /// Play when paused, pause when playing. Starts the selection, or the
    /// first track, when nothing is selected or loaded.
    pub fn toggle_playback(&mut self) {
        let selected = self.playlist.selected_index();
        if self.loaded.is_none() || selected.is_none() {
            self.load_and_play(selected.unwrap_or(0));
            return;
        }
        if self.media.paused() {
            self.graph.borrow().ensure_active();
            if let Err(e) = self.media.play() {
                self.on_play_rejected(&e);
            }
        } else if let Err(e) = self.media.pause() {
            log::warn!("{e}");
        }
    }

    pub fn next_track(&mut self) {
        if let Some(index) = self.playlist.next_index(true) {
            self.load_and_play(index);
        }
    }

    pub fn previous_track(&mut self) {
        if let Some(index) = self.playlist.previous_index(true) {
            self.load_and_play(index);
        }
    }

    /// Stop and rewind, keeping the selection
    pub fn stop(&mut self) {
        self.halt();
    }

    pub fn clear_playlist(&mut self) {
        self.halt();
        if let Some(id) = self.loaded.take() {
            self.playlist.remove(id, true);
        }
        self.playlist.clear();
    }

    /// Switch the element to track `index` and start loading it. Out-of-range
    /// indices are ignored; they can come from a stale UI after a removal.
    pub fn load_and_play(&mut self, index: usize) {
        if index >= self.playlist.len() {
            log::debug!("Ignoring selection of index {index} ({} tracks)", self.playlist.len());
            return;
        }

        self.render.stop();
        if let Err(e) = self.media.pause() {
            log::warn!("{e}");
        }
        self.media.set_current_time(0.0);
        self.playlist.select(index);

        if let Some(track) = self.playlist.get(index) {
            log::info!("Loading {}", track.name());
            self.media.set_source(track.resource().url());
            self.loaded = Some(track.id());
        }
        // parked resources are no longer the element's source
        self.playlist.release_parked();
        self.media.load();
        self.phase = Playback::Loading;
        self.graph.borrow().ensure_active();
    }

    // ===== Media element events =====

    /// The element has buffered enough of the new source to start
    pub fn on_can_play(&mut self) {
        if self.phase != Playback::Loading {
            return;
        }
        self.graph.borrow_mut().attach(&self.media);
        if let Err(e) = self.media.play() {
            self.on_play_rejected(&e);
        }
    }

    /// The element refused to start, e.g. autoplay without a user gesture.
    /// Only a pending start is affected; a later load or pause already moved on.
    pub fn on_play_rejected(&mut self, error: &MediaError) {
        if !matches!(self.phase, Playback::Loading | Playback::Ended) {
            log::debug!("Ignoring late rejection: {error}");
            return;
        }
        log::warn!("{error}; waiting for the user to press play");
        self.render.stop();
        self.phase = Playback::Paused;
    }

    pub fn on_play(&mut self) {
        // queued events can outlive the track that caused them
        if self.loaded.is_none() || self.media.paused() {
            log::debug!("Ignoring stale play event");
            return;
        }
        {
            let mut graph = self.graph.borrow_mut();
            graph.ensure_active();
            graph.attach(&self.media);
        }
        self.phase = Playback::Playing;
        self.render.start(self.grace);
    }

    pub fn on_pause(&mut self) {
        self.render.stop();
        if self.loaded.is_some() && self.phase == Playback::Playing {
            self.phase = Playback::Paused;
        }
    }

    pub fn on_ended(&mut self) {
        self.render.stop();
        self.phase = Playback::Ended;

        let action = next_after_end(
            self.settings,
            self.playlist.selected_index(),
            self.playlist.len(),
        );
        log::debug!("Track ended: {action:?}");
        match action {
            EndedAction::Restart(_) => {
                self.media.set_current_time(0.0);
                if let Err(e) = self.media.play() {
                    self.on_play_rejected(&e);
                }
            }
            EndedAction::Advance(index) => self.load_and_play(index),
            EndedAction::Stop => {
                self.playlist.clear_selection();
                self.phase = Playback::Stopped;
            }
        }
    }

    /// Duration reported by metadata for an uploaded track
    pub fn on_metadata(&mut self, id: TrackId, seconds: f64) {
        if !self.playlist.set_duration(id, seconds) {
            log::debug!("Ignoring duration {seconds} for {id}");
        }
    }

    fn apply_settings(&mut self, settings: PlaybackSettings) {
        self.settings = settings;
        self.render.set_settings(settings);
    }

    /// Pause, rewind and stop rendering before the loop can touch anything stale
    fn halt(&mut self) {
        self.render.stop();
        if let Err(e) = self.media.pause() {
            log::warn!("{e}");
        }
        self.media.set_current_time(0.0);
        self.phase = Playback::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping_track() -> PlaybackSettings {
        PlaybackSettings::default().toggle_loop_track()
    }

    fn looping_playlist() -> PlaybackSettings {
        PlaybackSettings::default().toggle_loop_playlist()
    }

    #[test]
    fn loop_track_restarts_same_index() {
        assert_eq!(next_after_end(looping_track(), Some(1), 3), EndedAction::Restart(1));
        assert_eq!(next_after_end(looping_track(), Some(2), 3), EndedAction::Restart(2));
    }

    #[test]
    fn loop_track_without_selection_falls_through() {
        assert_eq!(next_after_end(looping_track(), None, 3), EndedAction::Stop);
    }

    #[test]
    fn loop_playlist_wraps_to_start() {
        assert_eq!(next_after_end(looping_playlist(), Some(2), 3), EndedAction::Advance(0));
        assert_eq!(next_after_end(looping_playlist(), Some(0), 3), EndedAction::Advance(1));
        assert_eq!(next_after_end(looping_playlist(), None, 3), EndedAction::Advance(0));
        assert_eq!(next_after_end(looping_playlist(), None, 0), EndedAction::Stop);
    }

    #[test]
    fn no_loop_advances_then_stops() {
        let s = PlaybackSettings::default();
        assert_eq!(next_after_end(s, Some(0), 3), EndedAction::Advance(1));
        assert_eq!(next_after_end(s, Some(2), 3), EndedAction::Stop);
        assert_eq!(next_after_end(s, None, 3), EndedAction::Stop);
    }
}
