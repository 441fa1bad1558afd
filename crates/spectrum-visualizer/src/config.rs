use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Local-storage key holding an optional JSON [`VisualizerConfig`]
pub const CONFIG_STORAGE_KEY: &str = "visualizer.config";

/// Local-storage key holding the persisted background image reference
pub const BACKGROUND_STORAGE_KEY: &str = "backgroundImage";

/// Tunables for analysis and rendering
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Analyser transform size in samples; half of it is the bin count
    pub fft_size: u32,
    /// Bar width as a multiple of `viewport width / bin count`
    pub bar_width_factor: f32,
    /// Horizontal gap between bars in pixels
    pub bar_gap: f32,
    pub bar_saturation: f32,
    pub bar_lightness: f32,
    /// Background displacement in pixels at a full-scale average magnitude
    pub max_vibration: f32,
    /// Delay between the play event and the first rendered frame
    pub play_grace_ms: u32,
    pub log_level: String,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            bar_width_factor: 2.5,
            bar_gap: 1.0,
            bar_saturation: 1.0,
            bar_lightness: 0.5,
            max_vibration: 12.0,
            play_grace_ms: 50,
            log_level: "info".to_string(),
        }
    }
}

impl VisualizerConfig {
    /// Number of frequency bins the analyser produces
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }

    /// Parse and validate a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and the
    /// [`VisualizerConfig::validate`] errors for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse `json` if present, falling back to defaults on any problem
    pub fn from_json_or_default(json: Option<&str>) -> Self {
        let Some(json) = json else {
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring stored config: {e}");
                Self::default()
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::FftSize`] unless the fft size is a power of two
    /// in 32..=32768, and [`ConfigError::Value`] for negative or non-finite
    /// style values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(ConfigError::FftSize(self.fft_size));
        }
        let checks = [
            ("bar_width_factor", self.bar_width_factor),
            ("bar_gap", self.bar_gap),
            ("bar_saturation", self.bar_saturation),
            ("bar_lightness", self.bar_lightness),
            ("max_vibration", self.max_vibration),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Value { field, value });
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
