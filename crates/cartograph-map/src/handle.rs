use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::instance::MapInstance;
use crate::library::MapLibrary;
use crate::props::{CameraOptions, LngLat, ViewState};

/// Imperative handle to a mounted map.
///
/// Exposes camera operations on the engine without handing out the engine
/// itself. Clones share identity; compare with [`MapRef::ptr_eq`]. Once the
/// map is destroyed, getters return `None` and operations return `false`.
#[derive(Clone)]
pub struct MapRef {
    instance: Rc<MapInstance>,
    library: Rc<dyn MapLibrary>,
}

/// Derive the handle for the controller's current instance and library.
pub(crate) fn derive_handle(
    instance: Option<&Rc<MapInstance>>,
    library: Option<&Rc<dyn MapLibrary>>,
) -> Option<MapRef> {
    match (instance, library) {
        (Some(instance), Some(library)) => Some(MapRef {
            instance: instance.clone(),
            library: library.clone(),
        }),
        _ => None,
    }
}

impl MapRef {
    /// `true` if both handles refer to the same map instance.
    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Rc::ptr_eq(&self.instance, &other.instance)
    }

    /// The library the map was built from.
    pub fn library(&self) -> &Rc<dyn MapLibrary> {
        &self.library
    }

    pub fn container_id(&self) -> Option<&str> {
        self.instance.container().id()
    }

    pub fn is_alive(&self) -> bool {
        self.instance.is_alive()
    }

    pub fn view_state(&self) -> Option<ViewState> {
        self.instance.with_engine(|engine| engine.view_state())
    }

    pub fn center(&self) -> Option<LngLat> {
        self.view_state().map(|v| v.center())
    }

    pub fn zoom(&self) -> Option<f64> {
        self.view_state().map(|v| v.zoom)
    }

    pub fn bearing(&self) -> Option<f64> {
        self.view_state().map(|v| v.bearing)
    }

    pub fn pitch(&self) -> Option<f64> {
        self.view_state().map(|v| v.pitch)
    }

    pub fn is_style_loaded(&self) -> bool {
        self.instance.with_engine(|engine| engine.is_style_loaded()).unwrap_or(false)
    }

    pub fn jump_to(&self, camera: &CameraOptions) -> bool {
        self.instance.with_engine(|engine| engine.jump_to(camera)).is_some()
    }

    pub fn ease_to(&self, camera: &CameraOptions, duration: Duration) -> bool {
        self.instance.with_engine(|engine| engine.ease_to(camera, duration)).is_some()
    }

    pub fn fly_to(&self, camera: &CameraOptions, duration: Duration) -> bool {
        self.instance.with_engine(|engine| engine.fly_to(camera, duration)).is_some()
    }

    /// Re-read the container size and pass it to the engine.
    pub fn resize(&self) -> bool {
        let size = self.instance.container().size();
        self.instance.with_engine(|engine| engine.resize(size)).is_some()
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapRef")
            .field("container", &self.container_id())
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Where a map view publishes its [`MapRef`].
///
/// Hand a clone to [`MapView::handle`](crate::view::MapView::handle) and read
/// it from outside the tree. Holds `None` until the map is ready and again
/// after it is destroyed.
#[derive(Clone, Default)]
pub struct HandleSlot(Rc<RefCell<Option<MapRef>>>);

impl HandleSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<MapRef> {
        self.0.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub(crate) fn set(&self, handle: Option<MapRef>) {
        *self.0.borrow_mut() = handle;
    }
}

impl fmt::Debug for HandleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HandleSlot").field(&*self.0.borrow()).finish()
    }
}
