use cartograph_core::coords::{Rect, Vec2};
use cartograph_core::paint::Color;

use crate::constraints::{Constraints, Edges};
use crate::context::Context;
use crate::event::{EventResult, UiEvent};
use crate::painter::Painter;
use crate::widget::{Element, Widget};

/// A single-child widget that applies padding and/or a background.
///
/// An empty `Container` is a no-op.
///
/// # Example
/// ```rust,ignore
/// Container::new()
///     .padding_all(12.0)
///     .background(Color::from_straight(0.1, 0.1, 0.15, 1.0))
///     .child(map_view)
/// ```
pub struct Container {
    child: Option<Element>,
    padding: Edges,
    background: Option<Color>,
}

impl Container {
    pub fn new() -> Self {
        Self { child: None, padding: Edges::default(), background: None }
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.child = Some(child.into());
        self
    }

    pub fn padding(mut self, edges: Edges) -> Self {
        self.padding = edges;
        self
    }

    pub fn padding_all(mut self, v: f32) -> Self {
        self.padding = Edges::all(v);
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// The rect the child is laid out in.
    ///
    /// The child is placed at the top-left of the padded area with its
    /// measured size, so a child that fills its parent gets the whole area.
    fn child_rect(padding: Edges, child: &Element, rect: Rect) -> Rect {
        let inner = padding.inset(rect);
        let size = child.measure(Constraints::loose(inner.size));
        Rect::from_origin_size(inner.origin, size)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for Container {
    fn measure(&self, constraints: Constraints) -> Vec2 {
        let child_size = self
            .child
            .as_ref()
            .map(|c| c.measure(constraints.shrink(self.padding)))
            .unwrap_or(Vec2::zero());

        constraints.constrain(Vec2::new(
            child_size.x + self.padding.h(),
            child_size.y + self.padding.v(),
        ))
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        if let Some(bg) = self.background {
            painter.fill_rect(rect, bg);
        }
        if let Some(child) = &self.child {
            child.paint(painter, Self::child_rect(self.padding, child, rect));
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect) -> EventResult {
        let padding = self.padding;
        match &mut self.child {
            Some(child) => {
                let child_rect = Self::child_rect(padding, child, rect);
                child.on_event(event, child_rect)
            }
            None => EventResult::Ignored,
        }
    }

    fn mount(&mut self, cx: &Context) {
        if let Some(child) = &mut self.child {
            child.mount(cx);
        }
    }

    fn commit(&mut self, rect: Rect, cx: &Context) {
        let padding = self.padding;
        if let Some(child) = &mut self.child {
            let child_rect = Self::child_rect(padding, child, rect);
            child.commit(child_rect, cx);
        }
    }

    fn unmount(&mut self) {
        if let Some(child) = &mut self.child {
            child.unmount();
        }
    }
}
