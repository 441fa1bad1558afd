use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{AnalyserNode, AudioContext, AudioContextState, MediaElementAudioSourceNode};

use crate::error::{GraphError, VisualizerError};
use crate::graph::GraphBackend;

use super::js_message;
use super::media::WebMedia;

/// Web Audio nodes behind the signal graph.
///
/// The context is created with the page and may start suspended until the
/// first user gesture.
pub struct WebAudioGraph {
    context: AudioContext,
    analyser: Option<AnalyserNode>,
    // kept alive for the lifetime of the element
    source: Option<MediaElementAudioSourceNode>,
}

impl WebAudioGraph {
    pub fn new() -> Result<Self, VisualizerError> {
        let context =
            AudioContext::new().map_err(|e| VisualizerError::Platform(js_message(&e)))?;
        Ok(Self {
            context,
            analyser: None,
            source: None,
        })
    }
}

impl GraphBackend for WebAudioGraph {
    type Element = WebMedia;

    fn create_analyser(&mut self, fft_size: u32) -> Result<(), GraphError> {
        let analyser = self
            .context
            .create_analyser()
            .map_err(|e| GraphError::Analyser(js_message(&e)))?;
        analyser.set_fft_size(fft_size);
        self.analyser = Some(analyser);
        Ok(())
    }

    fn capture(&mut self, element: &WebMedia) -> Result<(), GraphError> {
        let analyser = self
            .analyser
            .as_ref()
            .ok_or_else(|| GraphError::Capture("analyser not created".into()))?;
        let source = self
            .context
            .create_media_element_source(element.element())
            .map_err(|e| GraphError::Capture(js_message(&e)))?;
        // the element is captured from here on; keep it audible either way
        let routed = source
            .connect_with_audio_node(analyser)
            .map_err(|e| GraphError::Connect(js_message(&e)));
        if routed.is_err() {
            if let Err(e) = source.connect_with_audio_node(&self.context.destination()) {
                log::error!("Captured element is silent: {}", js_message(&e));
            }
        }
        self.source = Some(source);
        routed
    }

    fn connect_output(&mut self) -> Result<(), GraphError> {
        let analyser = self
            .analyser
            .as_ref()
            .ok_or_else(|| GraphError::Connect("analyser not created".into()))?;
        analyser
            .connect_with_audio_node(&self.context.destination())
            .map_err(|e| GraphError::Connect(js_message(&e)))?;
        Ok(())
    }

    fn is_suspended(&self) -> bool {
        self.context.state() == AudioContextState::Suspended
    }

    fn resume(&self, done: Box<dyn FnOnce(Result<(), GraphError>)>) {
        match self.context.resume() {
            Ok(promise) => spawn_local(async move {
                let result = JsFuture::from(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| GraphError::Resume(js_message(&e)));
                done(result);
            }),
            Err(e) => done(Err(GraphError::Resume(js_message(&e)))),
        }
    }

    fn bin_count(&self) -> usize {
        self.analyser
            .as_ref()
            .map_or(0, |a| a.frequency_bin_count() as usize)
    }

    fn read_frequency_data(&self, buf: &mut [u8]) {
        if let Some(analyser) = &self.analyser {
            analyser.get_byte_frequency_data(buf);
        }
    }
}
