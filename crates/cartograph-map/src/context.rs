use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cartograph_ui::context::Context;

use crate::instance::MapInstance;
use crate::library::MapLibrary;

#[derive(Default)]
struct MapContextValue {
    map_lib: Option<Rc<dyn MapLibrary>>,
    map: Option<Rc<MapInstance>>,
}

/// The map a descendant widget lives inside.
///
/// One value exists per map view and keeps its identity for the view's whole
/// life: it is created empty, filled in place when the engine is ready, and
/// emptied when the engine is destroyed. Descendants only ever read it.
#[derive(Clone, Default)]
pub struct MapContext(Rc<RefCell<MapContextValue>>);

impl MapContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The live map instance, once ready.
    pub fn map(&self) -> Option<Rc<MapInstance>> {
        self.0.borrow().map.clone()
    }

    /// The library the map was built from, once ready.
    pub fn map_lib(&self) -> Option<Rc<dyn MapLibrary>> {
        self.0.borrow().map_lib.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.0.borrow().map.is_some()
    }

    /// `true` if both values are the same context.
    pub fn ptr_eq(&self, other: &MapContext) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn populate(&self, map_lib: Rc<dyn MapLibrary>, map: Rc<MapInstance>) {
        let mut value = self.0.borrow_mut();
        value.map_lib = Some(map_lib);
        value.map = Some(map);
    }

    pub(crate) fn clear(&self) {
        let mut value = self.0.borrow_mut();
        value.map_lib = None;
        value.map = None;
    }
}

impl fmt::Debug for MapContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContext").field("map", &self.0.borrow().map).finish_non_exhaustive()
    }
}

/// The [`MapContext`] of the nearest enclosing map view.
pub fn use_map_context(cx: &Context) -> Option<MapContext> {
    cx.get::<MapContext>().map(|value| MapContext::clone(&value))
}
