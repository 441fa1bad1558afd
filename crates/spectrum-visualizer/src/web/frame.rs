use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::scheduler::{FrameCallback, FrameControl, FrameScheduler};

use super::js_message;

#[derive(Default)]
struct State {
    active: bool,
    frame: Option<i32>,
    timeout: Option<i32>,
    // closures live until the next start so a running callback is never dropped
    tick: Option<Closure<dyn FnMut(f64)>>,
    kick: Option<Closure<dyn FnMut()>>,
}

/// `requestAnimationFrame` loop with an optional `setTimeout` lead-in
pub struct AnimationFrameScheduler {
    window: Window,
    state: Rc<RefCell<State>>,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            state: Rc::new(RefCell::new(State::default())),
        }
    }
}

fn request_frame(window: &Window, state: &Rc<RefCell<State>>) {
    let mut s = state.borrow_mut();
    let requested = match s.tick.as_ref() {
        Some(tick) => window.request_animation_frame(tick.as_ref().unchecked_ref()),
        None => return,
    };
    match requested {
        Ok(id) => s.frame = Some(id),
        Err(e) => {
            log::error!("requestAnimationFrame failed: {}", js_message(&e));
            s.active = false;
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn start(&mut self, delay: Duration, mut on_frame: FrameCallback) {
        if self.is_active() {
            return;
        }

        let weak = Rc::downgrade(&self.state);
        let window = self.window.clone();
        let tick = Closure::wrap(Box::new(move |timestamp: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            {
                let mut s = state.borrow_mut();
                s.frame = None;
                if !s.active {
                    return;
                }
            }
            match on_frame(timestamp) {
                FrameControl::Continue => request_frame(&window, &state),
                FrameControl::Stop => state.borrow_mut().active = false,
            }
        }) as Box<dyn FnMut(f64)>);

        {
            let mut s = self.state.borrow_mut();
            s.active = true;
            s.tick = Some(tick);
        }

        if delay.is_zero() {
            request_frame(&self.window, &self.state);
            return;
        }

        let weak = Rc::downgrade(&self.state);
        let window = self.window.clone();
        let kick = Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let active = {
                let mut s = state.borrow_mut();
                s.timeout = None;
                s.active
            };
            if active {
                request_frame(&window, &state);
            }
        }) as Box<dyn FnMut()>);

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let mut s = self.state.borrow_mut();
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(kick.as_ref().unchecked_ref(), millis)
        {
            Ok(id) => s.timeout = Some(id),
            Err(e) => {
                log::error!("setTimeout failed: {}", js_message(&e));
                s.active = false;
            }
        }
        s.kick = Some(kick);
    }

    fn cancel(&mut self) {
        let mut s = self.state.borrow_mut();
        s.active = false;
        if let Some(id) = s.frame.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {}", js_message(&e));
            }
        }
        if let Some(id) = s.timeout.take() {
            self.window.clear_timeout_with_handle(id);
        }
    }

    fn is_active(&self) -> bool {
        self.state.borrow().active
    }
}
