//! Contract between the map view and an externally supplied engine library.
//!
//! A library is anything that can tell whether the environment supports it
//! and exports a `Map` class. Libraries arrive as an [`EngineModule`], either
//! immediately or from a future ([`LibrarySource`]), mirroring how a dynamic
//! import hands back a module namespace whose useful exports may sit on the
//! namespace itself or on its `default` export.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use cartograph_core::coords::Vec2;
use serde_json::Value;

use crate::container::MapContainer;
use crate::error::MapError;
use crate::props::{CameraOptions, InteractionHandler, MapProps, Projection, ViewState};

// ── Engine ────────────────────────────────────────────────────────────────

/// A live map engine bound to one container.
///
/// Setters are only called when the corresponding prop actually changed.
pub trait MapEngine {
    fn set_min_zoom(&mut self, zoom: f64);
    fn set_max_zoom(&mut self, zoom: f64);
    fn set_min_pitch(&mut self, pitch: f64);
    fn set_max_pitch(&mut self, pitch: f64);
    fn set_render_world_copies(&mut self, enabled: bool);
    fn set_projection(&mut self, projection: Projection);
    /// Replace the style. With `diff` the engine may patch the current style
    /// in place instead of rebuilding it.
    fn set_style(&mut self, style: &Value, diff: bool);
    fn set_handler_enabled(&mut self, handler: InteractionHandler, enabled: bool);
    /// The container's committed size changed.
    fn resize(&mut self, size: Vec2);

    fn view_state(&self) -> ViewState;
    fn jump_to(&mut self, camera: &CameraOptions);
    fn ease_to(&mut self, camera: &CameraOptions, duration: Duration);
    fn fly_to(&mut self, camera: &CameraOptions, duration: Duration);
    fn is_style_loaded(&self) -> bool;

    /// Release every resource held by the engine. Called exactly once.
    fn remove(&mut self) -> anyhow::Result<()>;
}

/// Options handed to [`MapClass::construct`].
#[derive(Debug, Clone)]
pub struct MapOptions {
    pub container: MapContainer,
    pub props: MapProps,
}

/// The `Map` constructor exported by a library.
pub trait MapClass {
    fn construct(&self, options: MapOptions) -> anyhow::Result<Box<dyn MapEngine>>;
}

// ── Library ───────────────────────────────────────────────────────────────

/// Load state of the right-to-left text plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtlTextPluginStatus {
    Unavailable,
    Deferred,
    Loading,
    Loaded,
    Error,
}

/// Completion callback for [`MapLibrary::set_rtl_text_plugin`].
pub type PluginCallback = Box<dyn FnOnce(anyhow::Result<()>)>;

/// A map engine library.
///
/// Only [`map_class`](MapLibrary::map_class) and
/// [`supported`](MapLibrary::supported) are required; the process-wide
/// setting accessors default to "not available", in which case the
/// corresponding [`GlobalSettings`](crate::props::GlobalSettings) field is
/// skipped.
pub trait MapLibrary {
    /// The exported `Map` class, if this namespace has one.
    fn map_class(&self) -> Option<&dyn MapClass>;

    /// Whether this environment can host a map configured with `props`.
    fn supported(&self, props: &MapProps) -> bool;

    fn rtl_text_plugin_status(&self) -> Option<RtlTextPluginStatus> {
        None
    }

    fn set_rtl_text_plugin(&self, _url: &str, _callback: PluginCallback, _lazy: bool) {}

    fn max_parallel_image_requests(&self) -> Option<u32> {
        None
    }

    fn set_max_parallel_image_requests(&self, _count: u32) {}

    fn worker_count(&self) -> Option<u32> {
        None
    }

    fn set_worker_count(&self, _count: u32) {}

    fn worker_url(&self) -> Option<String> {
        None
    }

    fn set_worker_url(&self, _url: &str) {}
}

// ── Module ────────────────────────────────────────────────────────────────

/// A loaded library module: its namespace and, for modules that wrap their
/// exports, a `default` export.
#[derive(Clone, Default)]
pub struct EngineModule {
    namespace: Option<Rc<dyn MapLibrary>>,
    default: Option<Rc<dyn MapLibrary>>,
}

impl EngineModule {
    /// A module whose namespace is the library.
    pub fn new(library: Rc<dyn MapLibrary>) -> Self {
        Self { namespace: Some(library), default: None }
    }

    /// A module that only exposes the library through its `default` export.
    pub fn with_default(library: Rc<dyn MapLibrary>) -> Self {
        Self { namespace: None, default: Some(library) }
    }

    /// A module with no exports at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the namespace.
    pub fn namespace(mut self, library: Rc<dyn MapLibrary>) -> Self {
        self.namespace = Some(library);
        self
    }

    /// Replace the `default` export.
    pub fn default_export(mut self, library: Rc<dyn MapLibrary>) -> Self {
        self.default = Some(library);
        self
    }

    /// Pick the export that carries a `Map` class.
    ///
    /// The namespace wins when it has one; otherwise the `default` export is
    /// used, and it must have one.
    pub fn resolve(&self) -> Result<Rc<dyn MapLibrary>, MapError> {
        let namespace = self.namespace.as_ref().filter(|lib| lib.map_class().is_some());
        namespace
            .or(self.default.as_ref())
            .filter(|lib| lib.map_class().is_some())
            .cloned()
            .ok_or_else(|| {
                MapError::Configuration("no `Map` class on module or its default export".into())
            })
    }
}

impl From<Rc<dyn MapLibrary>> for EngineModule {
    fn from(library: Rc<dyn MapLibrary>) -> Self {
        Self::new(library)
    }
}

// ── Sources ───────────────────────────────────────────────────────────────

/// A module that will be available later.
pub type ModuleFuture = Pin<Box<dyn Future<Output = anyhow::Result<EngineModule>>>>;

/// Where a map view gets its library from.
pub enum LibrarySource {
    /// Already loaded.
    Module(EngineModule),
    /// Loaded asynchronously, e.g. by fetching and instantiating a bundle.
    Deferred(ModuleFuture),
}

impl LibrarySource {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<EngineModule>> + 'static,
    {
        LibrarySource::Deferred(Box::pin(future))
    }

    pub(crate) async fn resolve(self) -> anyhow::Result<EngineModule> {
        match self {
            LibrarySource::Module(module) => Ok(module),
            LibrarySource::Deferred(future) => future.await,
        }
    }
}

impl From<EngineModule> for LibrarySource {
    fn from(module: EngineModule) -> Self {
        LibrarySource::Module(module)
    }
}

impl From<Rc<dyn MapLibrary>> for LibrarySource {
    fn from(library: Rc<dyn MapLibrary>) -> Self {
        LibrarySource::Module(EngineModule::new(library))
    }
}

type Loader = Rc<dyn Fn() -> ModuleFuture>;

thread_local! {
    static DEFAULT_LOADER: RefCell<Option<Loader>> = const { RefCell::new(None) };
}

/// Register the loader used by map views that were not given a library.
///
/// Scoped to the calling thread, which is the UI thread maps live on.
pub fn set_default_loader<F>(loader: F)
where
    F: Fn() -> ModuleFuture + 'static,
{
    DEFAULT_LOADER.with(|slot| *slot.borrow_mut() = Some(Rc::new(loader)));
}

/// Remove the default loader registered on this thread.
pub fn clear_default_loader() {
    DEFAULT_LOADER.with(|slot| *slot.borrow_mut() = None);
}

/// A fresh source from the default loader, if one is registered.
pub(crate) fn default_source() -> Option<LibrarySource> {
    let loader = DEFAULT_LOADER.with(|slot| slot.borrow().clone())?;
    Some(LibrarySource::Deferred(loader()))
}
