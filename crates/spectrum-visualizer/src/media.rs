use crate::error::MediaError;

/// The audio output element the controller drives.
///
/// Mirrors the subset of `HTMLMediaElement` the core needs. Methods take
/// `&self` because the element is shared between the controller and the
/// render loop.
pub trait MediaElement {
    fn paused(&self) -> bool;

    fn ended(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    fn set_source(&self, url: &str);

    /// Start fetching the current source; completion is reported through the
    /// controller's `on_can_play`
    fn load(&self);

    /// Begin playback.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::PlayRejected`] when the element refuses to start
    /// right away. Implementations that learn about a rejection later hand it
    /// to the controller's `on_play_rejected` through the host.
    fn play(&self) -> Result<(), MediaError>;

    /// # Errors
    ///
    /// Returns [`MediaError::Pause`] when the element cannot be paused.
    fn pause(&self) -> Result<(), MediaError>;
}

/// Lifecycle of the current track
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Stopped,
    Loading,
    Playing,
    Paused,
    Ended,
}
