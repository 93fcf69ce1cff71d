use cartograph_core::coords::Vec2;

/// Input events routed through the widget tree.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Primary mouse button pressed and released at `pos`.
    Click { pos: Vec2 },
    /// Mouse moved to `pos` (fired every frame).
    Hover { pos: Vec2 },
    /// Mouse wheel / trackpad scroll. `delta` > 0 scrolls down.
    ScrollWheel { pos: Vec2, delta: f32 },
}

impl UiEvent {
    /// Pointer position the event happened at.
    pub fn pos(&self) -> Vec2 {
        match *self {
            UiEvent::Click { pos }
            | UiEvent::Hover { pos }
            | UiEvent::ScrollWheel { pos, .. } => pos,
        }
    }
}

/// Result returned by [`Widget::on_event`](crate::widget::Widget::on_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was handled; stop routing.
    Consumed,
    /// Event was not handled; keep routing.
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        self == EventResult::Consumed
    }
}
