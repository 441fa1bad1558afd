use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{self, Color32};
use web_sys::{Document, EventTarget, Storage, Window};

use crate::config::VisualizerConfig;
use crate::controller::{ControllerParts, PlaybackController};
use crate::error::VisualizerError;
use crate::media::Playback;
use crate::playlist::{ResourceHandle, TrackId};
use crate::render::BackgroundLayer;
use crate::surface::ShapeSurface;

use super::audio::WebAudioGraph;
use super::background::CssBackground;
use super::events::EventSubscriptions;
use super::frame::AnimationFrameScheduler;
use super::media::{ObjectUrlReleaser, WebMedia};
use super::upload::{read_duration, DurationQueue, FilePicker, UploadQueue};

type WebController = PlaybackController<WebMedia, WebAudioGraph>;

enum PanelAction {
    Select(usize),
    Remove(TrackId),
    Move(usize, usize),
}

pub struct VisualizerApp {
    controller: Rc<RefCell<WebController>>,
    media: Rc<WebMedia>,
    surface: ShapeSurface,
    picker: FilePicker,
    uploads: UploadQueue,
    durations: DurationQueue,
    _media_events: EventSubscriptions,
}

impl VisualizerApp {
    pub fn new(
        window: &Window,
        document: &Document,
        storage: Option<&Storage>,
        config: &VisualizerConfig,
    ) -> Result<Self, VisualizerError> {
        let media = Rc::new(WebMedia::find_or_create(document)?);
        let surface = ShapeSurface::default();
        let background = CssBackground::from_storage(document, storage)
            .map(|b| Box::new(b) as Box<dyn BackgroundLayer>);

        let parts = ControllerParts {
            media: Rc::clone(&media),
            backend: WebAudioGraph::new()?,
            releaser: Box::new(ObjectUrlReleaser),
            scheduler: Box::new(AnimationFrameScheduler::new(window.clone())),
            surface: Box::new(surface.clone()),
            background,
            seed: js_sys::Date::now() as u64,
        };
        let controller = Rc::new(RefCell::new(PlaybackController::new(parts, config)));
        let media_events = subscribe_media_events(&media, &controller)?;

        let uploads = UploadQueue::default();
        let picker = FilePicker::new(document, Rc::clone(&uploads))?;

        Ok(Self {
            controller,
            media,
            surface,
            picker,
            uploads,
            durations: DurationQueue::default(),
            _media_events: media_events,
        })
    }

    fn process_pending(&mut self) {
        let uploads: Vec<_> = self.uploads.borrow_mut().drain(..).collect();
        let durations: Vec<_> = self.durations.borrow_mut().drain(..).collect();
        let rejections = self.media.take_rejections();
        if uploads.is_empty() && durations.is_empty() && rejections.is_empty() {
            return;
        }

        let mut controller = self.controller.borrow_mut();
        for error in &rejections {
            controller.on_play_rejected(error);
        }
        for upload in uploads {
            let id = controller.add_track(upload.name, ResourceHandle::new(upload.url.clone()));
            read_duration(&upload.url, id, Rc::clone(&self.durations));
        }
        for (id, seconds) in durations {
            controller.on_metadata(id, seconds);
        }
    }

    fn draw_panel(&mut self, ui: &mut egui::Ui) {
        let mut controller = self.controller.borrow_mut();

        ui.heading("🎵 Spectrum Visualizer");
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("➕ Add Music").clicked() {
                self.picker.open();
            }
            if ui.button("🗑 Clear").clicked() {
                controller.clear_playlist();
            }
        });
        ui.label("Supported: MP3, WAV, OGG, FLAC, AAC, M4A");
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            if ui.button("⏮").clicked() {
                controller.previous_track();
            }
            let play_pause = if controller.phase() == Playback::Playing { "⏸" } else { "▶" };
            if ui.button(play_pause).clicked() {
                controller.toggle_playback();
            }
            if ui.button("⏭").clicked() {
                controller.next_track();
            }
            if ui.button("⏹").clicked() {
                controller.stop();
            }
        });

        let settings = controller.settings();
        ui.horizontal(|ui| {
            if ui.selectable_label(settings.loop_track(), "🔂 Track").clicked() {
                controller.toggle_loop_track();
            }
            if ui.selectable_label(settings.loop_playlist(), "🔁 Playlist").clicked() {
                controller.toggle_loop_playlist();
            }
            if ui.selectable_label(settings.vibration(), "〰 Vibration").clicked() {
                controller.toggle_vibration();
            }
        });

        ui.add_space(8.0);
        let action = track_list(ui, &controller);
        match action {
            Some(PanelAction::Select(idx)) => controller.select_track(idx),
            Some(PanelAction::Remove(id)) => controller.remove_track(id),
            Some(PanelAction::Move(from, to)) => controller.move_track(from, to),
            None => {}
        }
    }
}

/// Playlist rows; clicks are returned and applied after the list is drawn
fn track_list(ui: &mut egui::Ui, controller: &WebController) -> Option<PanelAction> {
    let tracks = controller.summaries();
    if tracks.is_empty() {
        ui.colored_label(Color32::GRAY, "No tracks yet");
        return None;
    }

    ui.label(format!("Tracks ({}):", tracks.len()));
    let selected = controller.selected_index();
    let playing = controller.phase() == Playback::Playing;
    let last = tracks.len() - 1;
    let mut action = None;
    egui::ScrollArea::vertical().show(ui, |ui| {
        for (idx, track) in tracks.iter().enumerate() {
            let is_current = selected == Some(idx);
            let bg = if is_current {
                Color32::from_rgba_unmultiplied(100, 200, 255, 30)
            } else {
                Color32::TRANSPARENT
            };
            egui::Frame::group(ui.style()).fill(bg).inner_margin(4.0).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if is_current && playing {
                        ui.label("▶");
                    } else {
                        ui.label(format!("{}.", idx + 1));
                    }
                    let name = egui::Label::new(&track.name).sense(egui::Sense::click());
                    if ui.add(name).clicked() {
                        action = Some(PanelAction::Select(idx));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("✕").clicked() {
                            action = Some(PanelAction::Remove(track.id));
                        }
                        if idx < last && ui.small_button("⬇").clicked() {
                            action = Some(PanelAction::Move(idx, idx + 1));
                        }
                        if idx > 0 && ui.small_button("⬆").clicked() {
                            action = Some(PanelAction::Move(idx, idx - 1));
                        }
                        ui.label(&track.duration);
                    });
                });
            });
        }
    });
    action
}

impl eframe::App for VisualizerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_pending();

        // bars are produced on the render loop's own frames
        ctx.request_repaint();

        egui::SidePanel::left("playlist_panel")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_panel(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.surface.set_viewport(rect);
                self.surface.paint(ui.painter());
            });
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // let the page background show through
        [0.0, 0.0, 0.0, 0.0]
    }
}

fn subscribe_media_events(
    media: &WebMedia,
    controller: &Rc<RefCell<WebController>>,
) -> Result<EventSubscriptions, VisualizerError> {
    let target: EventTarget = media.element().clone().into();
    let mut subs = EventSubscriptions::new(target);

    let c = Rc::clone(controller);
    subs.subscribe("canplay", move |_| c.borrow_mut().on_can_play())?;
    let c = Rc::clone(controller);
    subs.subscribe("play", move |_| c.borrow_mut().on_play())?;
    let c = Rc::clone(controller);
    subs.subscribe("pause", move |_| c.borrow_mut().on_pause())?;
    let c = Rc::clone(controller);
    subs.subscribe("ended", move |_| c.borrow_mut().on_ended())?;

    Ok(subs)
}
