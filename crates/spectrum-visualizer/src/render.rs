//! Per-frame spectrum bars and background vibration

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use egui::{pos2, vec2, Color32, Rect, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::VisualizerConfig;
use crate::media::MediaElement;
use crate::scheduler::{FrameControl, FrameScheduler};
use crate::settings::PlaybackSettings;
use crate::spectrum::{average_magnitude, FrequencySource, SpectrumSampler};

/// Where the bars are drawn
pub trait Surface {
    fn viewport(&self) -> Rect;

    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, color: Color32);
}

/// A visual layer behind the bars that can be displaced
pub trait BackgroundLayer {
    fn set_offset(&mut self, offset: Vec2);
}

/// Bar layout and vibration tunables taken from [`VisualizerConfig`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarStyle {
    pub width_factor: f32,
    pub gap: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub max_vibration: f32,
}

impl From<&VisualizerConfig> for BarStyle {
    fn from(c: &VisualizerConfig) -> Self {
        Self {
            width_factor: c.bar_width_factor,
            gap: c.bar_gap,
            saturation: c.bar_saturation,
            lightness: c.bar_lightness,
            max_vibration: c.max_vibration,
        }
    }
}

pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color32 {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h * 6.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h * 6.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    Color32::from_rgb(
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Draw one bar per bin, left to right, growing up from the bottom edge.
///
/// Bars are `viewport width / bins * width_factor` wide, so with the default
/// factor the high bins run past the right edge and are clipped.
pub fn paint_bars(surface: &mut dyn Surface, bins: &[u8], style: &BarStyle) {
    surface.clear();
    let view = surface.viewport();
    let count = bins.len();
    if count == 0 {
        return;
    }
    let bar_width = view.width() / count as f32 * style.width_factor;
    let mut x = view.left();
    for (i, &magnitude) in bins.iter().enumerate() {
        let height = f32::from(magnitude) / 255.0 * view.height();
        let rect = Rect::from_min_max(
            pos2(x, view.bottom() - height),
            pos2(x + bar_width, view.bottom()),
        );
        let hue = i as f32 / count as f32;
        surface.fill_rect(rect, hsl_to_rgb(hue, style.saturation, style.lightness));
        x += bar_width + style.gap;
    }
}

/// Random displacement whose length never exceeds `max`.
///
/// Each axis jitters within +-`average * max`; the result is then clamped to
/// a circle of radius `max`.
pub fn vibration_offset(average: f32, max: f32, rng: &mut impl Rng) -> Vec2 {
    let magnitude = average.clamp(0.0, 1.0) * max;
    if magnitude.is_nan() || magnitude <= 0.0 {
        return Vec2::ZERO;
    }
    let offset = vec2(
        rng.random_range(-magnitude..=magnitude),
        rng.random_range(-magnitude..=magnitude),
    );
    let length = offset.length();
    if length > max {
        offset * (max / length)
    } else {
        offset
    }
}

struct FrameState {
    media: Rc<dyn MediaElement>,
    source: Rc<RefCell<dyn FrequencySource>>,
    sampler: SpectrumSampler,
    surface: Box<dyn Surface>,
    background: Option<Box<dyn BackgroundLayer>>,
    offset: Vec2,
    settings: PlaybackSettings,
    style: BarStyle,
    rng: SmallRng,
}

impl FrameState {
    fn tick(&mut self) -> FrameControl {
        if self.media.paused() || self.media.ended() {
            self.reset();
            return FrameControl::Stop;
        }

        {
            let source = self.source.borrow();
            let bins = self.sampler.sample(&*source);
            paint_bars(self.surface.as_mut(), bins, &self.style);
        }

        if self.settings.vibration() {
            let average = average_magnitude(self.sampler.bins());
            let offset = vibration_offset(average, self.style.max_vibration, &mut self.rng);
            self.move_background(offset);
        } else if self.offset != Vec2::ZERO {
            self.move_background(Vec2::ZERO);
        }
        FrameControl::Continue
    }

    fn move_background(&mut self, offset: Vec2) {
        if let Some(background) = self.background.as_mut() {
            background.set_offset(offset);
            self.offset = offset;
        }
    }

    fn reset(&mut self) {
        self.surface.clear();
        self.move_background(Vec2::ZERO);
    }
}

/// Idle/running loop that redraws the spectrum on every refresh while the
/// media element plays
pub struct RenderLoop {
    scheduler: Box<dyn FrameScheduler>,
    frame: Rc<RefCell<FrameState>>,
}

impl RenderLoop {
    pub fn new(
        scheduler: Box<dyn FrameScheduler>,
        media: Rc<dyn MediaElement>,
        source: Rc<RefCell<dyn FrequencySource>>,
        surface: Box<dyn Surface>,
        background: Option<Box<dyn BackgroundLayer>>,
        config: &VisualizerConfig,
        seed: u64,
    ) -> Self {
        let frame = FrameState {
            media,
            source,
            sampler: SpectrumSampler::new(config.bin_count()),
            surface,
            background,
            offset: Vec2::ZERO,
            settings: PlaybackSettings::default(),
            style: BarStyle::from(config),
            rng: SmallRng::seed_from_u64(seed),
        };
        Self {
            scheduler,
            frame: Rc::new(RefCell::new(frame)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Start redrawing after `delay`. No-op while already running.
    pub fn start(&mut self, delay: Duration) {
        if self.scheduler.is_active() {
            return;
        }
        let frame = Rc::clone(&self.frame);
        self.scheduler
            .start(delay, Box::new(move |_timestamp| frame.borrow_mut().tick()));
        log::debug!("Render loop started");
    }

    /// Cancel any pending frame and clear the visuals. Idempotent.
    pub fn stop(&mut self) {
        self.scheduler.cancel();
        self.frame.borrow_mut().reset();
    }

    pub fn set_settings(&mut self, settings: PlaybackSettings) {
        self.frame.borrow_mut().settings = settings;
    }

    /// Current background displacement
    pub fn offset(&self) -> Vec2 {
        self.frame.borrow().offset
    }
}
