//! Cartograph Map: hosts an externally supplied map engine inside a
//! `cartograph-ui` widget tree.
//!
//! The engine library is loaded asynchronously when a [`MapView`] mounts, so
//! the view has to reconcile three timings:
//!
//! - **loading** may finish after the view is gone; [`MapController`] drops
//!   such late results without side effects.
//! - **props** arrive every frame; the live [`MapInstance`] diffs them and
//!   only changed fields reach the engine, in the commit pass before paint.
//! - **registration** with a [`MountedMaps`] happens once the engine is
//!   ready and is undone before the engine is destroyed.
//!
//! Descendants of a ready view find its [`MapContext`] through
//! [`use_map_context`] or [`use_map`]; callers outside the tree get a
//! [`MapRef`] through a [`HandleSlot`].
//!
//! Map views must run inside a [`tokio::task::LocalSet`].

pub mod container;
pub mod context;
pub mod controller;
pub mod error;
mod globals;
pub mod handle;
pub mod instance;
pub mod library;
pub mod props;
pub mod registry;
pub mod view;

#[cfg(test)]
mod testing;

pub use container::MapContainer;
pub use context::{use_map_context, MapContext};
pub use controller::{LifecycleState, MapController};
pub use error::{log_error, ErrorEvent, ErrorHandler, MapError};
pub use handle::{HandleSlot, MapRef};
pub use instance::MapInstance;
pub use library::{
    clear_default_loader, set_default_loader, EngineModule, LibrarySource, MapClass, MapEngine,
    MapLibrary, MapOptions, ModuleFuture, PluginCallback, RtlTextPluginStatus,
};
pub use props::{
    CameraOptions, GlobalSettings, InteractionHandler, InteractionHandlers, LngLat, MapProps,
    Projection, ViewState,
};
pub use registry::{
    use_map, MapCollection, MapRegistry, MountedMaps, MountedMapsContext, RegistryError,
};
pub use view::{MapView, PropsHandle};
