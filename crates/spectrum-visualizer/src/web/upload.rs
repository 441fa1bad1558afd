use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlAudioElement, HtmlInputElement};

use crate::error::VisualizerError;
use crate::playlist::TrackId;

use super::js_message;

const INPUT_ID: &str = "music_file_input";

/// A file picked by the user, already turned into an object URL
pub struct PendingUpload {
    pub name: String,
    pub url: String,
}

pub type UploadQueue = Rc<RefCell<Vec<PendingUpload>>>;
pub type DurationQueue = Rc<RefCell<Vec<(TrackId, f64)>>>;

/// Hidden multi-file `<input>` that queues picked files for the UI loop
pub struct FilePicker {
    input: HtmlInputElement,
    _on_change: Closure<dyn FnMut(Event)>,
}

impl FilePicker {
    pub fn new(document: &Document, queue: UploadQueue) -> Result<Self, VisualizerError> {
        let platform = |e: JsValue| VisualizerError::Platform(js_message(&e));
        let input = match document
            .get_element_by_id(INPUT_ID)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            Some(input) => input,
            None => {
                let input = document
                    .create_element("input")
                    .map_err(platform)?
                    .dyn_into::<HtmlInputElement>()
                    .map_err(|_| VisualizerError::Platform("created element is not <input>".into()))?;
                input.set_type("file");
                input.set_id(INPUT_ID);
                input.set_accept("audio/*,.mp3,.wav,.ogg,.flac,.aac,.m4a");
                input.set_multiple(true);
                input.style().set_property("display", "none").map_err(platform)?;
                document
                    .body()
                    .ok_or_else(|| VisualizerError::Platform("No document body".into()))?
                    .append_child(&input)
                    .map_err(platform)?;
                input
            }
        };

        let on_change = Closure::wrap(Box::new(move |event: Event| {
            let Some(input) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
            else {
                return;
            };
            if let Some(files) = input.files() {
                for i in 0..files.length() {
                    let Some(file) = files.get(i) else {
                        continue;
                    };
                    match web_sys::Url::create_object_url_with_blob(&file) {
                        Ok(url) => queue.borrow_mut().push(PendingUpload {
                            name: file.name(),
                            url,
                        }),
                        Err(e) => log::warn!("Skipping {}: {}", file.name(), js_message(&e)),
                    }
                }
            }
            // allow picking the same file again
            input.set_value("");
        }) as Box<dyn FnMut(Event)>);
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));

        Ok(Self {
            input,
            _on_change: on_change,
        })
    }

    pub fn open(&self) {
        self.input.click();
    }
}

/// Load only the metadata of `url` in a detached element and queue its duration
pub fn read_duration(url: &str, id: TrackId, durations: DurationQueue) {
    let detached = match HtmlAudioElement::new_with_src(url) {
        Ok(detached) => detached,
        Err(e) => {
            log::warn!("Cannot read duration of {id}: {}", js_message(&e));
            return;
        }
    };
    detached.set_preload("metadata");
    let element = detached.clone();
    let on_metadata = Closure::once_into_js(move |_event: Event| {
        durations.borrow_mut().push((id, element.duration()));
    });
    if let Err(e) =
        detached.add_event_listener_with_callback("loadedmetadata", on_metadata.unchecked_ref())
    {
        log::warn!("Cannot read duration of {id}: {}", js_message(&e));
    }
}
