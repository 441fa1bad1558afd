//! Browser implementations of the platform traits and the wasm entry point

mod app;
mod audio;
mod background;
mod events;
mod frame;
mod media;
mod upload;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::config::{VisualizerConfig, CONFIG_STORAGE_KEY};
use crate::error::VisualizerError;
use crate::logging;

use self::app::VisualizerApp;

const CANVAS_ID: &str = "music_visualizer_canvas";

/// Readable text for a thrown JS value
pub(crate) fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

// WASM entry point
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);

    let window = web_sys::window().ok_or("No window")?;
    let storage = window.local_storage().ok().flatten();
    let stored = storage
        .as_ref()
        .and_then(|s| s.get_item(CONFIG_STORAGE_KEY).ok().flatten());
    let config = VisualizerConfig::from_json_or_default(stored.as_deref());
    logging::init(config.log_level());

    spawn_local(async move {
        if let Err(e) = run(window, storage, config).await {
            log::error!("Visualizer failed to start: {e}");
        }
    });
    Ok(())
}

async fn run(
    window: web_sys::Window,
    storage: Option<web_sys::Storage>,
    config: VisualizerConfig,
) -> Result<(), VisualizerError> {
    let document = window
        .document()
        .ok_or_else(|| VisualizerError::Platform("No document".into()))?;
    let canvas = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| VisualizerError::Platform(format!("No canvas with id '{CANVAS_ID}'")))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| VisualizerError::Platform(format!("'{CANVAS_ID}' is not a canvas")))?;

    let app = VisualizerApp::new(&window, &document, storage.as_ref(), &config)?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |_cc| Ok(Box::new(app))),
        )
        .await
        .map_err(|e| VisualizerError::Platform(js_message(&e)))
}
