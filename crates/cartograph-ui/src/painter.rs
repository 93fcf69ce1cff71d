use cartograph_core::coords::{Rect, Vec2};
use cartograph_core::paint::Color;
use cartograph_core::scene::DrawList;

/// Drawing surface passed to [`Widget::paint`](crate::widget::Widget::paint).
///
/// Wraps the frame's `DrawList` together with the frame's pointer state.
pub struct Painter<'a> {
    draw_list: &'a mut DrawList,
    /// Current mouse position in logical pixels.
    pub mouse_pos: Vec2,
    /// True while the primary button is held down.
    pub mouse_pressed: bool,
}

impl<'a> Painter<'a> {
    pub fn new(draw_list: &'a mut DrawList, mouse_pos: Vec2, mouse_pressed: bool) -> Self {
        Self { draw_list, mouse_pos, mouse_pressed }
    }

    /// Solid axis-aligned rectangle. Fully transparent fills are skipped.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if !color.is_transparent() {
            self.draw_list.push_fill(rect, color);
        }
    }

    /// Reserve `rect` for an externally rendered surface.
    pub fn surface(&mut self, rect: Rect, id: Option<&str>) {
        self.draw_list.push_surface(rect, id.map(str::to_owned));
    }

    /// Begin a scissor region. Must be paired with [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }
}
