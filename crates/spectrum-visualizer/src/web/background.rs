use egui::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Storage};

use crate::config::BACKGROUND_STORAGE_KEY;
use crate::render::BackgroundLayer;

use super::js_message;

const BACKGROUND_ID: &str = "visualizer_background";

/// Background element shaken via a CSS transform.
///
/// The image itself belongs to the page; this only moves the element.
pub struct CssBackground {
    element: HtmlElement,
}

impl CssBackground {
    /// A layer exists only when a background image was persisted and the page
    /// has the element to show it in
    pub fn from_storage(document: &Document, storage: Option<&Storage>) -> Option<Self> {
        let reference = storage?.get_item(BACKGROUND_STORAGE_KEY).ok().flatten()?;
        if reference.is_empty() {
            return None;
        }
        let element = document
            .get_element_by_id(BACKGROUND_ID)?
            .dyn_into::<HtmlElement>()
            .ok()?;
        log::debug!("Background layer found");
        Some(Self { element })
    }
}

impl BackgroundLayer for CssBackground {
    fn set_offset(&mut self, offset: Vec2) {
        let transform = format!("translate({:.2}px, {:.2}px)", offset.x, offset.y);
        if let Err(e) = self.element.style().set_property("transform", &transform) {
            log::warn!("Failed to move background: {}", js_message(&e));
        }
    }
}
