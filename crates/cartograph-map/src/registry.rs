//! Tracking of mounted maps across the tree.
//!
//! A map view reports itself to the nearest [`MountedMaps`] when its engine
//! becomes ready and again right before the engine is destroyed. Without a
//! registry in the tree both notifications are skipped.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cartograph_ui::context::Context;
use cartograph_ui::scene::UiScene;
use thiserror::Error;

use crate::context::use_map_context;
use crate::handle::{derive_handle, MapRef};

/// Id used for maps mounted without one.
pub const DEFAULT_MAP_ID: &str = "default";

/// Id reserved for "the map enclosing the caller" in a [`MapCollection`].
pub const CURRENT_MAP_ID: &str = "current";

/// Receiver of map mount / unmount notifications.
pub trait MountedMaps {
    fn on_map_mount(&self, map: MapRef, id: Option<&str>);
    fn on_map_unmount(&self, id: Option<&str>);
}

/// How a [`MountedMaps`] is provided to the widget tree.
#[derive(Clone)]
pub struct MountedMapsContext(pub Rc<dyn MountedMaps>);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("map id `current` is reserved")]
    ReservedId,
    #[error("a map with id `{0}` is already mounted")]
    DuplicateId(String),
}

/// A [`MountedMaps`] that keeps every mounted map by id.
#[derive(Default)]
pub struct MapRegistry {
    maps: RefCell<BTreeMap<String, MapRef>>,
}

impl MapRegistry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Make this registry the tree's [`MountedMaps`] and visible to [`use_map`].
    pub fn provide_to(self: &Rc<Self>, scene: &mut UiScene) {
        scene.provide(MountedMapsContext(self.clone()));
        scene.provide_rc(self.clone());
    }

    pub fn register(&self, map: MapRef, id: Option<&str>) -> Result<(), RegistryError> {
        let id = id.unwrap_or(DEFAULT_MAP_ID);
        if id == CURRENT_MAP_ID {
            return Err(RegistryError::ReservedId);
        }
        let mut maps = self.maps.borrow_mut();
        if maps.contains_key(id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }
        maps.insert(id.to_string(), map);
        Ok(())
    }

    /// Forget the map registered under `id`. Returns it if there was one.
    pub fn deregister(&self, id: Option<&str>) -> Option<MapRef> {
        self.maps.borrow_mut().remove(id.unwrap_or(DEFAULT_MAP_ID))
    }

    pub fn get(&self, id: &str) -> Option<MapRef> {
        self.maps.borrow().get(id).cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        self.maps.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.maps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.borrow().is_empty()
    }

    fn snapshot(&self) -> BTreeMap<String, MapRef> {
        self.maps.borrow().clone()
    }
}

impl MountedMaps for MapRegistry {
    fn on_map_mount(&self, map: MapRef, id: Option<&str>) {
        match self.register(map, id) {
            Ok(()) => log::debug!("map `{}` registered", id.unwrap_or(DEFAULT_MAP_ID)),
            Err(err) => log::error!("{err}"),
        }
    }

    fn on_map_unmount(&self, id: Option<&str>) {
        self.deregister(id);
    }
}

/// Maps visible from one point in the tree.
#[derive(Debug, Clone, Default)]
pub struct MapCollection {
    /// The map enclosing the caller, if it is ready.
    pub current: Option<MapRef>,
    /// Every registered map, by id.
    pub maps: BTreeMap<String, MapRef>,
}

impl MapCollection {
    /// Look a map up by id; `"current"` is the enclosing map.
    pub fn get(&self, id: &str) -> Option<&MapRef> {
        if id == CURRENT_MAP_ID {
            self.current.as_ref()
        } else {
            self.maps.get(id)
        }
    }
}

/// Every map reachable from `cx`: the nearest enclosing one and, if a
/// [`MapRegistry`] was provided, all registered ones.
pub fn use_map(cx: &Context) -> MapCollection {
    let current = use_map_context(cx)
        .and_then(|ctx| derive_handle(ctx.map().as_ref(), ctx.map_lib().as_ref()));
    let maps = cx.get::<MapRegistry>().map(|registry| registry.snapshot()).unwrap_or_default();
    MapCollection { current, maps }
}
