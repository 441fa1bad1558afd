//! Audio analysis graph: media element -> analyser -> output.
//!
//! The graph is built once per page and attached to the media element at most
//! once. Switching tracks only changes the element's source; the nodes stay
//! connected.

use crate::error::GraphError;
use crate::spectrum::FrequencySource;

/// Platform audio graph primitives
pub trait GraphBackend {
    type Element: ?Sized;

    /// # Errors
    ///
    /// Returns [`GraphError::Analyser`] when the platform cannot create it.
    fn create_analyser(&mut self, fft_size: u32) -> Result<(), GraphError>;

    /// Create a capture node for `element` and connect it to the analyser.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Capture`] when the element cannot be captured and
    /// [`GraphError::Connect`] when the capture node cannot reach the analyser.
    /// In the latter case the element is already captured, so the capture node
    /// must be routed to the output instead.
    fn capture(&mut self, element: &Self::Element) -> Result<(), GraphError>;

    /// Connect the analyser to the output device
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Connect`] when the nodes cannot be connected.
    fn connect_output(&mut self) -> Result<(), GraphError>;

    fn is_suspended(&self) -> bool;

    /// Ask a suspended context to resume; `done` runs when the attempt settles
    fn resume(&self, done: Box<dyn FnOnce(Result<(), GraphError>)>);

    fn bin_count(&self) -> usize;

    fn read_frequency_data(&self, buf: &mut [u8]);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphState {
    Unattached,
    /// `captured` is false when the element could not be captured and the
    /// analyser is wired straight to the output instead
    Attached { captured: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// Audio still plays but there is nothing to visualize
    Degraded,
    AlreadyAttached,
}

pub struct SignalGraph<B: GraphBackend> {
    backend: B,
    fft_size: u32,
    state: GraphState,
    analyser_ready: bool,
}

impl<B: GraphBackend> SignalGraph<B> {
    pub fn new(backend: B, fft_size: u32) -> Self {
        Self {
            backend,
            fft_size,
            state: GraphState::Unattached,
            analyser_ready: false,
        }
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, GraphState::Attached { .. })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Build the graph and route `element` through it. Idempotent.
    pub fn attach(&mut self, element: &B::Element) -> AttachOutcome {
        if self.is_attached() {
            return AttachOutcome::AlreadyAttached;
        }

        if let Err(e) = self.backend.create_analyser(self.fft_size) {
            log::error!("{e}; continuing without visualization");
            self.state = GraphState::Attached { captured: false };
            return AttachOutcome::Degraded;
        }
        self.analyser_ready = true;

        let captured = match self.backend.capture(element) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}; routing analyser directly to output");
                false
            }
        };

        if let Err(e) = self.backend.connect_output() {
            log::error!("{e}");
        }

        self.state = GraphState::Attached { captured };
        log::info!("Signal graph attached (fft size {}, captured: {captured})", self.fft_size);
        if captured {
            AttachOutcome::Attached
        } else {
            AttachOutcome::Degraded
        }
    }

    /// Resume the audio context if the platform suspended it
    pub fn ensure_active(&self) {
        if !self.backend.is_suspended() {
            return;
        }
        log::debug!("Audio context suspended, resuming");
        self.backend.resume(Box::new(|result| {
            if let Err(e) = result {
                log::warn!("{e}");
            }
        }));
    }
}

impl<B: GraphBackend> FrequencySource for SignalGraph<B> {
    fn bin_count(&self) -> usize {
        if self.analyser_ready {
            self.backend.bin_count()
        } else {
            (self.fft_size / 2) as usize
        }
    }

    fn fill_frequency_data(&self, buf: &mut [u8]) {
        if self.analyser_ready {
            self.backend.read_frequency_data(buf);
        } else {
            buf.fill(0);
        }
    }
}
