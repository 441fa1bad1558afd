use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlAudioElement};

use crate::error::{MediaError, VisualizerError};
use crate::media::MediaElement;
use crate::playlist::{ResourceHandle, ResourceReleaser};

use super::js_message;

const AUDIO_ID: &str = "visualizer_audio";

/// The page's single `<audio>` element.
///
/// `play()` settles through a promise, so rejections are queued here and the
/// host hands them to the controller. Each `load()` starts a new generation;
/// rejections from an older one are dropped.
pub struct WebMedia {
    element: HtmlAudioElement,
    generation: Rc<Cell<u64>>,
    rejections: Rc<RefCell<Vec<MediaError>>>,
}

impl WebMedia {
    /// Reuse `#visualizer_audio` if the page has one, otherwise append it
    pub fn find_or_create(document: &Document) -> Result<Self, VisualizerError> {
        if let Some(existing) = document
            .get_element_by_id(AUDIO_ID)
            .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok())
        {
            return Ok(Self::wrap(existing));
        }

        let platform = |e: wasm_bindgen::JsValue| VisualizerError::Platform(js_message(&e));
        let element = document
            .create_element("audio")
            .map_err(platform)?
            .dyn_into::<HtmlAudioElement>()
            .map_err(|_| VisualizerError::Platform("created element is not <audio>".into()))?;
        element.set_id(AUDIO_ID);
        element.set_cross_origin(Some("anonymous"));
        document
            .body()
            .ok_or_else(|| VisualizerError::Platform("No document body".into()))?
            .append_child(&element)
            .map_err(platform)?;
        Ok(Self::wrap(element))
    }

    fn wrap(element: HtmlAudioElement) -> Self {
        Self {
            element,
            generation: Rc::new(Cell::new(0)),
            rejections: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }

    /// Rejected `play()` promises since the last call
    pub fn take_rejections(&self) -> Vec<MediaError> {
        self.rejections.borrow_mut().drain(..).collect()
    }
}

impl MediaElement for WebMedia {
    fn paused(&self) -> bool {
        self.element.paused()
    }

    fn ended(&self) -> bool {
        self.element.ended()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_source(&self, url: &str) {
        self.element.set_src(url);
    }

    fn load(&self) {
        self.generation.set(self.generation.get() + 1);
        self.element.load();
    }

    fn play(&self) -> Result<(), MediaError> {
        let promise = self
            .element
            .play()
            .map_err(|e| MediaError::PlayRejected(js_message(&e)))?;
        let issued = self.generation.get();
        let generation = Rc::clone(&self.generation);
        let rejections = Rc::clone(&self.rejections);
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                let error = MediaError::PlayRejected(js_message(&e));
                if generation.get() == issued {
                    rejections.borrow_mut().push(error);
                } else {
                    log::debug!("Dropping rejection from an earlier load: {error}");
                }
            }
        });
        Ok(())
    }

    fn pause(&self) -> Result<(), MediaError> {
        self.element
            .pause()
            .map_err(|e| MediaError::Pause(js_message(&e)))
    }
}

/// Revokes object URLs created for uploads
pub struct ObjectUrlReleaser;

impl ResourceReleaser for ObjectUrlReleaser {
    fn release(&self, handle: ResourceHandle) {
        if let Err(e) = web_sys::Url::revoke_object_url(handle.url()) {
            log::warn!("Failed to revoke {}: {}", handle.url(), js_message(&e));
        }
    }
}
