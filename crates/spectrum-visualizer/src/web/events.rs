use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use crate::error::VisualizerError;

use super::js_message;

/// DOM listeners registered on one target, removed again on drop
pub struct EventSubscriptions {
    target: EventTarget,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl EventSubscriptions {
    pub fn new(target: EventTarget) -> Self {
        Self {
            target,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(
        &mut self,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), VisualizerError> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| VisualizerError::Platform(js_message(&e)))?;
        self.listeners.push((event, closure));
        Ok(())
    }
}

impl Drop for EventSubscriptions {
    fn drop(&mut self) {
        for (event, closure) in &self.listeners {
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                log::warn!("Failed to unsubscribe {event}: {}", js_message(&e));
            }
        }
    }
}
