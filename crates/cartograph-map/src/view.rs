use std::cell::RefCell;
use std::rc::Rc;

use cartograph_ui::prelude::*;

use crate::container::MapContainer;
use crate::context::MapContext;
use crate::controller::{LifecycleState, MapController};
use crate::error::{log_error, ErrorEvent, ErrorHandler};
use crate::handle::HandleSlot;
use crate::library::LibrarySource;
use crate::props::MapProps;
use crate::registry::MountedMapsContext;

// ── PropsHandle ───────────────────────────────────────────────────────────

/// Shared, writable props of one [`MapView`].
///
/// The view reads them at every commit, so writes take effect on the next
/// frame.
#[derive(Clone, Default)]
pub struct PropsHandle(Rc<RefCell<MapProps>>);

impl PropsHandle {
    pub fn new(props: MapProps) -> Self {
        Self(Rc::new(RefCell::new(props)))
    }

    pub fn get(&self) -> MapProps {
        self.0.borrow().clone()
    }

    pub fn set(&self, props: MapProps) {
        *self.0.borrow_mut() = props;
    }

    /// Edit the props in place.
    pub fn update(&self, f: impl FnOnce(&mut MapProps)) {
        f(&mut self.0.borrow_mut());
    }
}

// ── MapView ───────────────────────────────────────────────────────────────

/// A widget that hosts a map engine.
///
/// The engine is loaded when the view mounts and destroyed when it unmounts.
/// Until it is ready the view paints only its surface; children are mounted
/// on the first commit after that, inside a scope that provides the view's
/// [`MapContext`].
///
/// ```rust,ignore
/// let handle = HandleSlot::new();
/// let view = MapView::new(MapProps::default().projection(Projection::Globe))
///     .map_lib(library)
///     .id("main")
///     .handle(handle.clone())
///     .on_error(|event| eprintln!("{}", event.error))
///     .child(Legend::new());
/// ```
pub struct MapView {
    props: PropsHandle,
    source: Option<LibrarySource>,
    id: Option<String>,
    style: BoxStyle,
    on_error: ErrorHandler,
    handle: HandleSlot,
    children: Vec<Element>,
    children_mounted: bool,
    controller: Option<MapController>,
}

impl MapView {
    pub fn new(props: MapProps) -> Self {
        Self::with_props(PropsHandle::new(props))
    }

    /// A view whose props are owned by `props`.
    pub fn with_props(props: PropsHandle) -> Self {
        Self {
            props,
            source: None,
            id: None,
            style: BoxStyle::default(),
            on_error: Rc::new(log_error),
            handle: HandleSlot::new(),
            children: Vec::new(),
            children_mounted: false,
            controller: None,
        }
    }

    /// Use `source` instead of the thread's default loader.
    pub fn map_lib(mut self, source: impl Into<LibrarySource>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn style(mut self, style: BoxStyle) -> Self {
        self.style = style;
        self
    }

    pub fn on_error(mut self, f: impl Fn(&ErrorEvent) + 'static) -> Self {
        self.on_error = Rc::new(f);
        self
    }

    /// Publish the map's [`MapRef`](crate::handle::MapRef) into `slot`.
    pub fn handle(mut self, slot: HandleSlot) -> Self {
        self.handle = slot;
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn set_props(&mut self, props: MapProps) {
        self.props.set(props);
    }

    pub fn props(&self) -> MapProps {
        self.props.get()
    }

    pub fn props_handle(&self) -> PropsHandle {
        self.props.clone()
    }

    pub fn handle_slot(&self) -> &HandleSlot {
        &self.handle
    }

    pub fn state(&self) -> LifecycleState {
        self.controller.as_ref().map_or(LifecycleState::Unmounted, MapController::state)
    }

    pub fn context(&self) -> Option<&MapContext> {
        self.controller.as_ref().map(MapController::context)
    }

    /// Source for the next mount. A loaded module is reused on every mount; a
    /// deferred one is spent by its first mount, after which the thread's
    /// default loader applies.
    fn next_source(&mut self) -> Option<LibrarySource> {
        if let Some(LibrarySource::Module(module)) = &self.source {
            return Some(LibrarySource::Module(module.clone()));
        }
        self.source.take()
    }

    /// Children fill the map; each is placed at the top-left with its measured size.
    fn child_rect(child: &Element, rect: Rect) -> Rect {
        Rect::from_origin_size(rect.origin, child.measure(Constraints::loose(rect.size)))
    }
}

impl Widget for MapView {
    fn measure(&self, constraints: Constraints) -> Vec2 {
        self.style.measure(constraints)
    }

    fn paint(&self, painter: &mut Painter, rect: Rect) {
        if let Some(bg) = self.style.background {
            painter.fill_rect(rect, bg);
        }
        painter.surface(rect, self.id.as_deref());

        if self.children_mounted {
            painter.push_clip(rect);
            for child in &self.children {
                child.paint(painter, Self::child_rect(child, rect));
            }
            painter.pop_clip();
        }
    }

    fn on_event(&mut self, event: &UiEvent, rect: Rect) -> EventResult {
        if !self.children_mounted || !rect.contains(event.pos()) {
            return EventResult::Ignored;
        }
        for child in self.children.iter_mut().rev() {
            let child_rect = Self::child_rect(child, rect);
            if child.on_event(event, child_rect).is_consumed() {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }

    fn mount(&mut self, cx: &Context) {
        match self.state() {
            LifecycleState::Unmounted | LifecycleState::Destroyed | LifecycleState::Failed => {}
            LifecycleState::Loading | LifecycleState::Ready | LifecycleState::Destroying => {
                log::warn!("map `{}` is already mounted", self.id.as_deref().unwrap_or("-"));
                return;
            }
        }
        let registry = cx.get::<MountedMapsContext>().map(|ctx| ctx.0.clone());
        let container = MapContainer::new(self.id.as_deref());
        let mut controller =
            MapController::new(container, self.handle.clone(), self.on_error.clone());
        controller.mount(self.props.get(), self.next_source(), registry);
        self.controller = Some(controller);
    }

    fn commit(&mut self, rect: Rect, cx: &Context) {
        let Some(controller) = &self.controller else {
            return;
        };
        controller.container().commit(rect);
        controller.sync(&self.props.0.borrow());
        if !controller.is_ready() {
            return;
        }

        let mut scope = cx.child();
        scope.provide(controller.context().clone());

        if !self.children_mounted {
            for child in &mut self.children {
                child.mount(&scope);
            }
            self.children_mounted = true;
        }
        for child in &mut self.children {
            let child_rect = Self::child_rect(child, rect);
            child.commit(child_rect, &scope);
        }
    }

    fn unmount(&mut self) {
        if self.children_mounted {
            for child in &mut self.children {
                child.unmount();
            }
            self.children_mounted = false;
        }
        if let Some(controller) = &mut self.controller {
            controller.unmount();
        }
    }
}
