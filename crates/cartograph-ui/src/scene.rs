use std::rc::Rc;

use cartograph_core::coords::{Rect, Vec2};
use cartograph_core::scene::DrawList;

use crate::constraints::Constraints;
use crate::context::Context;
use crate::event::UiEvent;
use crate::painter::Painter;
use crate::widget::Element;

// ── UiInput ───────────────────────────────────────────────────────────────

/// Snapshot of input state for one UI frame.
#[derive(Debug, Clone, Default)]
pub struct UiInput {
    /// Current cursor position in logical pixels.
    pub mouse_pos: Vec2,
    /// `true` while the primary button is held down.
    pub mouse_pressed: bool,
    /// `true` for exactly one frame when the primary button is released.
    pub mouse_clicked: bool,
    /// Accumulated scroll wheel delta this frame (positive = scroll down).
    pub scroll_delta: f32,
}

// ── UiScene ───────────────────────────────────────────────────────────────

/// Drives a persistent widget tree through its lifecycle.
///
/// Owns the root [`Context`] (values every widget can see, e.g. app-wide
/// registries) and the `DrawList` populated by [`frame`](Self::frame).
///
/// # Example
///
/// ```rust,ignore
/// let mut ui = UiScene::new();
/// ui.provide(MyRegistry::default());
///
/// let mut root: Element = build_tree().into();
/// ui.mount(&mut root);
/// let draw_list = ui.frame(&mut root, viewport, &UiInput::default());
/// // ...
/// ui.unmount(&mut root);
/// ```
pub struct UiScene {
    /// Draw list populated by the most recent [`frame`](Self::frame) call.
    pub draw_list: DrawList,
    context: Context<'static>,
    mounted: bool,
}

impl UiScene {
    pub fn new() -> Self {
        Self { draw_list: DrawList::new(), context: Context::root(), mounted: false }
    }

    /// Provide `value` to every widget in the tree.
    ///
    /// Values provided after [`mount`](Self::mount) are only seen by widgets
    /// that look them up later (e.g. in `commit`).
    pub fn provide<T: 'static>(&mut self, value: T) -> &mut Self {
        self.context.provide(value);
        self
    }

    /// Like [`provide`](Self::provide), for a value the caller keeps a handle to.
    pub fn provide_rc<T: 'static>(&mut self, value: Rc<T>) -> &mut Self {
        self.context.provide_rc(value);
        self
    }

    #[inline]
    pub fn context(&self) -> &Context<'static> {
        &self.context
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Run `mount` on the whole tree. Ignored if already mounted.
    pub fn mount(&mut self, root: &mut Element) {
        if self.mounted {
            log::warn!("UiScene::mount called on an already mounted tree");
            return;
        }
        root.mount(&self.context);
        self.mounted = true;
        log::debug!("widget tree mounted");
    }

    /// Run `unmount` on the whole tree. Ignored if not mounted.
    ///
    /// The caller still owns `root`; it is dropped after every widget has
    /// released what it attached to the outside world.
    pub fn unmount(&mut self, root: &mut Element) {
        if !self.mounted {
            return;
        }
        root.unmount();
        self.mounted = false;
        self.draw_list.clear();
        log::debug!("widget tree unmounted");
    }

    /// Measure, commit, paint and route events for one frame.
    ///
    /// Mounts the tree first if [`mount`](Self::mount) was not called. The
    /// returned `&mut DrawList` is valid until the next call.
    #[must_use]
    pub fn frame(&mut self, root: &mut Element, viewport: Vec2, input: &UiInput) -> &mut DrawList {
        if !self.mounted {
            self.mount(root);
        }
        self.draw_list.clear();

        // ── measure ───────────────────────────────────────────────────────
        // The root always occupies the full viewport; its measured size is
        // only a pre-pass for its children.
        let _ = root.measure(Constraints::loose(viewport));
        let rect = Rect::new(0.0, 0.0, viewport.x, viewport.y);

        // ── commit ────────────────────────────────────────────────────────
        root.commit(rect, &self.context);

        // ── paint ─────────────────────────────────────────────────────────
        {
            let mut painter =
                Painter::new(&mut self.draw_list, input.mouse_pos, input.mouse_pressed);
            root.paint(&mut painter, rect);
        }

        // ── events ────────────────────────────────────────────────────────
        root.on_event(&UiEvent::Hover { pos: input.mouse_pos }, rect);
        if input.mouse_clicked {
            root.on_event(&UiEvent::Click { pos: input.mouse_pos }, rect);
        }
        if input.scroll_delta != 0.0 {
            let scroll = UiEvent::ScrollWheel { pos: input.mouse_pos, delta: input.scroll_delta };
            root.on_event(&scroll, rect);
        }

        &mut self.draw_list
    }
}

impl Default for UiScene {
    fn default() -> Self {
        Self::new()
    }
}
