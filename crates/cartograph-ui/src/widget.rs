use cartograph_core::coords::{Rect, Vec2};

use crate::constraints::Constraints;
use crate::context::Context;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;

// ── Widget trait ──────────────────────────────────────────────────────────

/// The core trait every UI component implements.
///
/// Only [`measure`](Widget::measure) and [`paint`](Widget::paint) are
/// required. Widgets that own resources outside the tree override the
/// lifecycle hooks:
///
/// ```text
/// mount ─► ( measure ─► commit ─► paint ─► on_event )* ─► unmount
/// ```
///
/// Containers must forward every hook to their children.
pub trait Widget: 'static {
    /// Compute the size this widget wants given the available space.
    ///
    /// Must be deterministic; the parent may call `measure` multiple times.
    fn measure(&self, constraints: Constraints) -> Vec2;

    /// Draw this widget into `painter` within the bounds of `rect`.
    fn paint(&self, painter: &mut Painter, rect: Rect);

    /// Route an input event. Return [`EventResult::Consumed`] to stop propagation.
    fn on_event(&mut self, _event: &UiEvent, _rect: Rect) -> EventResult {
        EventResult::Ignored
    }

    /// Called once when the widget enters a mounted tree.
    ///
    /// `cx` exposes values provided by ancestors.
    fn mount(&mut self, _cx: &Context) {}

    /// Called every frame after layout is final and before paint.
    ///
    /// `rect` is the space the parent committed to this widget.
    fn commit(&mut self, _rect: Rect, _cx: &Context) {}

    /// Called once before the widget leaves the tree.
    ///
    /// Anything the widget attached to the outside world is released here,
    /// while the widget itself is still alive.
    fn unmount(&mut self) {}
}

// ── Element ───────────────────────────────────────────────────────────────

/// A type-erased widget: the universal child type for container widgets.
pub struct Element(Box<dyn Widget>);

impl Element {
    pub fn new<W: Widget>(w: W) -> Self {
        Self(Box::new(w))
    }

    #[inline]
    pub fn measure(&self, constraints: Constraints) -> Vec2 {
        self.0.measure(constraints)
    }

    #[inline]
    pub fn paint(&self, painter: &mut Painter, rect: Rect) {
        self.0.paint(painter, rect)
    }

    #[inline]
    pub fn on_event(&mut self, event: &UiEvent, rect: Rect) -> EventResult {
        self.0.on_event(event, rect)
    }

    #[inline]
    pub fn mount(&mut self, cx: &Context) {
        self.0.mount(cx)
    }

    #[inline]
    pub fn commit(&mut self, rect: Rect, cx: &Context) {
        self.0.commit(rect, cx)
    }

    #[inline]
    pub fn unmount(&mut self) {
        self.0.unmount()
    }
}

impl<W: Widget> From<W> for Element {
    fn from(w: W) -> Self {
        Self::new(w)
    }
}
