//! Browser audio visualizer core.
//!
//! Plays tracks from an uploaded playlist through a Web Audio analyser and
//! draws the magnitude spectrum as hue-swept bars on every display refresh,
//! optionally shaking a background layer with the average loudness.
//!
//! All browser access sits behind the traits in [`media`], [`graph`],
//! [`scheduler`], [`render`] and [`playlist`]; the `web` module (wasm only)
//! implements them with `web-sys` and hosts the egui control panel.

pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod logging;
pub mod media;
pub mod playlist;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod spectrum;
pub mod surface;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::VisualizerConfig;
pub use controller::{next_after_end, ControllerParts, EndedAction, PlaybackController};
pub use error::{ConfigError, GraphError, MediaError, Result, VisualizerError};
pub use graph::{AttachOutcome, GraphBackend, GraphState, SignalGraph};
pub use media::{MediaElement, Playback};
pub use playlist::{
    format_time, Playlist, ResourceHandle, ResourceReleaser, Track, TrackId, TrackSummary,
};
pub use render::{BackgroundLayer, BarStyle, RenderLoop, Surface};
pub use scheduler::{FrameCallback, FrameControl, FrameScheduler};
pub use settings::PlaybackSettings;
pub use spectrum::{FrequencySource, SpectrumSampler};
pub use surface::ShapeSurface;
