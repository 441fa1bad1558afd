use std::time::Duration;

/// Returned by a frame callback to keep or end the loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Called once per display refresh with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnMut(f64) -> FrameControl>;

/// Cancellable per-refresh callback scheduling.
///
/// At most one callback is scheduled at a time. `start` while active is
/// ignored; `cancel` drops any pending delay or frame synchronously so no
/// further callback runs.
pub trait FrameScheduler {
    /// Run `on_frame` every refresh, beginning after `delay`, until it returns
    /// [`FrameControl::Stop`] or the scheduler is cancelled
    fn start(&mut self, delay: Duration, on_frame: FrameCallback);

    fn cancel(&mut self);

    /// True from `start` until the loop stops or is cancelled, including the
    /// initial delay
    fn is_active(&self) -> bool;
}
