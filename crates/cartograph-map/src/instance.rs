use std::cell::{Cell, RefCell};
use std::fmt;

use cartograph_core::coords::Vec2;

use crate::container::MapContainer;
use crate::error::MapError;
use crate::library::{MapClass, MapEngine, MapOptions};
use crate::props::{InteractionHandler, MapProps};

/// A constructed engine plus the props it currently reflects.
///
/// Created by the lifecycle controller once the library is resolved and
/// supported; destroyed by it exactly once. Descendants reach it through
/// [`MapContext`](crate::context::MapContext).
pub struct MapInstance {
    engine: RefCell<Option<Box<dyn MapEngine>>>,
    /// Last props pushed onto the engine.
    applied: RefCell<MapProps>,
    /// Last container size reported to the engine.
    size: Cell<Vec2>,
    container: MapContainer,
}

impl MapInstance {
    pub(crate) fn create(
        class: &dyn MapClass,
        props: MapProps,
        container: MapContainer,
    ) -> Result<Self, MapError> {
        let engine = class
            .construct(MapOptions { container: container.clone(), props: props.clone() })
            .map_err(MapError::Construction)?;

        Ok(Self {
            engine: RefCell::new(Some(engine)),
            applied: RefCell::new(props),
            size: Cell::new(container.size()),
            container,
        })
    }

    /// `false` once the engine has been destroyed.
    pub fn is_alive(&self) -> bool {
        self.engine.borrow().is_some()
    }

    pub fn container(&self) -> &MapContainer {
        &self.container
    }

    /// Props the engine currently reflects.
    pub fn applied_props(&self) -> MapProps {
        self.applied.borrow().clone()
    }

    /// Run `f` against the live engine. `None` after destroy.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut dyn MapEngine) -> R) -> Option<R> {
        let mut slot = self.engine.borrow_mut();
        match slot.as_deref_mut() {
            Some(engine) => Some(f(engine)),
            None => None,
        }
    }

    /// Push `next` onto the engine.
    ///
    /// Only fields that differ from the last applied props reach the engine,
    /// so calling this every frame with unchanged props costs a comparison and
    /// nothing else. Returns `true` if the engine was touched.
    pub(crate) fn set_props(&self, next: &MapProps) -> bool {
        let mut applied = self.applied.borrow_mut();
        if *applied == *next {
            return false;
        }

        let mut slot = self.engine.borrow_mut();
        let Some(engine) = slot.as_deref_mut() else {
            return false;
        };

        let prev = &*applied;
        let mut touched = 0usize;
        let mut touch = |changed: bool| {
            touched += usize::from(changed);
            changed
        };

        // Settings
        if touch(next.min_zoom != prev.min_zoom) {
            engine.set_min_zoom(next.min_zoom);
        }
        if touch(next.max_zoom != prev.max_zoom) {
            engine.set_max_zoom(next.max_zoom);
        }
        if touch(next.min_pitch != prev.min_pitch) {
            engine.set_min_pitch(next.min_pitch);
        }
        if touch(next.max_pitch != prev.max_pitch) {
            engine.set_max_pitch(next.max_pitch);
        }
        if touch(next.render_world_copies != prev.render_world_copies) {
            engine.set_render_world_copies(next.render_world_copies);
        }
        if touch(next.projection != prev.projection) {
            engine.set_projection(next.projection);
        }

        // Style
        if touch(next.map_style != prev.map_style) {
            engine.set_style(&next.map_style, next.style_diffing);
        }

        // Handlers
        for handler in InteractionHandler::ALL {
            let enabled = next.handlers.get(handler);
            if touch(enabled != prev.handlers.get(handler)) {
                engine.set_handler_enabled(handler, enabled);
            }
        }

        if touched > 0 {
            log::debug!("pushed {touched} changed prop(s) to map engine");
        }
        *applied = next.clone();
        touched > 0
    }

    /// Tell the engine about a new container size. Returns `true` on resize.
    pub(crate) fn sync_size(&self) -> bool {
        let size = self.container.size();
        if size == self.size.get() {
            return false;
        }
        let resized = self.with_engine(|engine| engine.resize(size)).is_some();
        if resized {
            self.size.set(size);
        }
        resized
    }

    /// Release the engine. Later calls are no-ops.
    ///
    /// A failing `remove` cannot be recovered from; it is logged and the
    /// engine is dropped regardless.
    pub(crate) fn destroy(&self) {
        let Some(mut engine) = self.engine.borrow_mut().take() else {
            return;
        };
        if let Err(err) = engine.remove() {
            log::error!("map engine failed to shut down cleanly: {err:#}");
        }
    }
}

impl fmt::Debug for MapInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapInstance")
            .field("alive", &self.is_alive())
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use cartograph_core::coords::Rect;
    use serde_json::json;

    use super::*;
    use crate::library::MapLibrary;
    use crate::props::Projection;
    use crate::testing::{Call, CallLog, ScriptedLibrary};

    fn instance(log: &CallLog, props: MapProps) -> MapInstance {
        let lib = ScriptedLibrary::new(log.clone());
        let class = lib.map_class().unwrap();
        let instance = MapInstance::create(class, props, MapContainer::new(Some("test"))).unwrap();
        log.clear();
        instance
    }

    #[test]
    fn unchanged_props_touch_nothing() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        assert!(!map.set_props(&MapProps::default()));
        assert!(!map.set_props(&MapProps::default()));
        assert!(log.calls().is_empty());
    }

    #[test]
    fn only_changed_fields_reach_the_engine() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        let next = MapProps::default()
            .zoom_bounds(2.0, 22.0)
            .handler(InteractionHandler::Keyboard, false);
        assert!(map.set_props(&next));
        assert_eq!(
            log.calls(),
            vec![Call::SetMinZoom(2.0), Call::SetHandler(InteractionHandler::Keyboard, false)]
        );
        assert_eq!(map.applied_props(), next);
    }

    #[test]
    fn style_change_honours_diffing_flag() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        let mut next = MapProps::default().map_style(json!({
            "version": 8,
            "sources": {},
            "layers": [{ "id": "bg" }],
        }));
        next.style_diffing = false;
        map.set_props(&next);

        assert_eq!(log.calls(), vec![Call::SetStyle { diff: false }]);
    }

    #[test]
    fn non_engine_fields_update_without_engine_calls() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        let mut next = MapProps::default();
        next.globals.worker_count = Some(3);
        assert!(!map.set_props(&next));
        assert!(log.calls().is_empty());
        assert_eq!(map.applied_props().globals.worker_count, Some(3));
    }

    #[test]
    fn resize_follows_container() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        map.container().commit(Rect::new(0.0, 0.0, 640.0, 480.0));
        assert!(map.sync_size());
        assert!(!map.sync_size());
        assert_eq!(log.calls(), vec![Call::Resize(Vec2::new(640.0, 480.0))]);
    }

    #[test]
    fn destroy_is_idempotent_and_detaches() {
        let log = CallLog::default();
        let map = instance(&log, MapProps::default());

        map.destroy();
        map.destroy();

        assert!(!map.is_alive());
        assert!(!map.set_props(&MapProps::default().projection(Projection::Globe)));
        assert_eq!(log.calls(), vec![Call::Remove]);
    }

    #[test]
    fn failing_remove_still_detaches() {
        let log = CallLog::default();
        let lib = ScriptedLibrary::new(log.clone()).failing_remove();
        let map = MapInstance::create(
            lib.map_class().unwrap(),
            MapProps::default(),
            MapContainer::new(None),
        )
        .unwrap();

        map.destroy();
        assert!(!map.is_alive());
    }
}
