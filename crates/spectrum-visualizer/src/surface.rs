use std::cell::RefCell;
use std::rc::Rc;

use egui::{Color32, Rect, Shape};

use crate::render::Surface;

struct ShapeBuffer {
    viewport: Rect,
    shapes: Vec<Shape>,
}

impl Default for ShapeBuffer {
    fn default() -> Self {
        Self {
            viewport: Rect::ZERO,
            shapes: Vec::new(),
        }
    }
}

/// Bar buffer shared between the render loop and the UI.
///
/// The render loop writes shapes on its own refresh callback; the UI sets the
/// viewport and paints whatever the buffer holds each time egui repaints.
#[derive(Clone, Default)]
pub struct ShapeSurface {
    inner: Rc<RefCell<ShapeBuffer>>,
}

impl ShapeSurface {
    pub fn set_viewport(&self, rect: Rect) {
        self.inner.borrow_mut().viewport = rect;
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().shapes.is_empty()
    }

    pub fn paint(&self, painter: &egui::Painter) {
        painter.extend(self.inner.borrow().shapes.iter().cloned());
    }
}

impl Surface for ShapeSurface {
    fn viewport(&self) -> Rect {
        self.inner.borrow().viewport
    }

    fn clear(&mut self) {
        self.inner.borrow_mut().shapes.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.inner
            .borrow_mut()
            .shapes
            .push(Shape::rect_filled(rect, 0.0, color));
    }
}
