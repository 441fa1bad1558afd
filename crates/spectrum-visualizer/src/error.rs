//! Error types for the visualizer core

use thiserror::Error;

/// Failures while building or driving the audio analysis graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The frequency analyser node could not be created
    #[error("Failed to create analyser: {0}")]
    Analyser(String),

    /// The media element could not be captured, usually because something
    /// else already owns a capture node for it
    #[error("Failed to capture media element: {0}")]
    Capture(String),

    /// Connecting two graph nodes failed
    #[error("Failed to connect graph nodes: {0}")]
    Connect(String),

    /// The audio context refused to resume
    #[error("Failed to resume audio context: {0}")]
    Resume(String),
}

/// Failures reported by the media element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// `play()` was rejected, typically because a user gesture is required
    #[error("Playback rejected: {0}")]
    PlayRejected(String),

    #[error("Pause failed: {0}")]
    Pause(String),
}

/// Invalid or unreadable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The transform size must be a power of two the analyser accepts
    #[error("Invalid fft size {0}: expected a power of two in 32..=32768")]
    FftSize(u32),

    #[error("Invalid value for {field}: {value}")]
    Value { field: &'static str, value: f32 },
}

/// Any error the visualizer can surface
#[derive(Debug, Error)]
pub enum VisualizerError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A browser API call failed outside the graph or media element
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Result type for visualizer operations
pub type Result<T> = std::result::Result<T, VisualizerError>;
