//! An in-process map library that logs every call instead of rendering.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use cartograph_core::coords::Vec2;
use cartograph_map::{
    CameraOptions, InteractionHandler, MapClass, MapEngine, MapLibrary, MapOptions, MapProps,
    PluginCallback, Projection, RtlTextPluginStatus, ViewState,
};
use serde_json::Value;

pub struct ConsoleLibrary {
    class: ConsoleClass,
    rtl_status: Cell<RtlTextPluginStatus>,
    worker_count: Cell<u32>,
    max_parallel_image_requests: Cell<u32>,
    worker_url: RefCell<String>,
}

impl ConsoleLibrary {
    pub fn new() -> Self {
        Self {
            class: ConsoleClass,
            rtl_status: Cell::new(RtlTextPluginStatus::Unavailable),
            worker_count: Cell::new(2),
            max_parallel_image_requests: Cell::new(16),
            worker_url: RefCell::new(String::new()),
        }
    }
}

impl MapLibrary for ConsoleLibrary {
    fn map_class(&self) -> Option<&dyn MapClass> {
        Some(&self.class)
    }

    fn supported(&self, props: &MapProps) -> bool {
        props.max_zoom >= props.min_zoom && props.max_pitch >= props.min_pitch
    }

    fn rtl_text_plugin_status(&self) -> Option<RtlTextPluginStatus> {
        Some(self.rtl_status.get())
    }

    fn set_rtl_text_plugin(&self, url: &str, callback: PluginCallback, lazy: bool) {
        log::info!("[lib] RTL text plugin <- {url} (lazy: {lazy})");
        self.rtl_status.set(RtlTextPluginStatus::Loaded);
        callback(Ok(()));
    }

    fn max_parallel_image_requests(&self) -> Option<u32> {
        Some(self.max_parallel_image_requests.get())
    }

    fn set_max_parallel_image_requests(&self, count: u32) {
        log::info!("[lib] maxParallelImageRequests <- {count}");
        self.max_parallel_image_requests.set(count);
    }

    fn worker_count(&self) -> Option<u32> {
        Some(self.worker_count.get())
    }

    fn set_worker_count(&self, count: u32) {
        log::info!("[lib] workerCount <- {count}");
        self.worker_count.set(count);
    }

    fn worker_url(&self) -> Option<String> {
        Some(self.worker_url.borrow().clone())
    }

    fn set_worker_url(&self, url: &str) {
        log::info!("[lib] workerUrl <- {url}");
        *self.worker_url.borrow_mut() = url.to_string();
    }
}

struct ConsoleClass;

impl MapClass for ConsoleClass {
    fn construct(&self, options: MapOptions) -> anyhow::Result<Box<dyn MapEngine>> {
        let view = options.props.initial_view_state.unwrap_or_default();
        log::info!(
            "[map] new Map in `{}` ({}) at {:.3},{:.3} z{}",
            options.container.id().unwrap_or("-"),
            options.props.projection,
            view.longitude,
            view.latitude,
            view.zoom,
        );
        Ok(Box::new(ConsoleEngine { view }))
    }
}

struct ConsoleEngine {
    view: ViewState,
}

impl ConsoleEngine {
    fn apply(&mut self, camera: &CameraOptions) {
        if let Some(center) = camera.center {
            self.view.longitude = center.lng;
            self.view.latitude = center.lat;
        }
        self.view.zoom = camera.zoom.unwrap_or(self.view.zoom);
        self.view.bearing = camera.bearing.unwrap_or(self.view.bearing);
        self.view.pitch = camera.pitch.unwrap_or(self.view.pitch);
    }
}

impl MapEngine for ConsoleEngine {
    fn set_min_zoom(&mut self, zoom: f64) {
        log::info!("[map] minZoom <- {zoom}");
    }
    fn set_max_zoom(&mut self, zoom: f64) {
        log::info!("[map] maxZoom <- {zoom}");
    }
    fn set_min_pitch(&mut self, pitch: f64) {
        log::info!("[map] minPitch <- {pitch}");
    }
    fn set_max_pitch(&mut self, pitch: f64) {
        log::info!("[map] maxPitch <- {pitch}");
    }
    fn set_render_world_copies(&mut self, enabled: bool) {
        log::info!("[map] renderWorldCopies <- {enabled}");
    }
    fn set_projection(&mut self, projection: Projection) {
        log::info!("[map] projection <- {projection}");
    }
    fn set_style(&mut self, style: &Value, diff: bool) {
        let layers = style.get("layers").and_then(Value::as_array).map_or(0, Vec::len);
        log::info!("[map] style <- {layers} layer(s) (diff: {diff})");
    }
    fn set_handler_enabled(&mut self, handler: InteractionHandler, enabled: bool) {
        log::info!("[map] {handler:?} <- {enabled}");
    }
    fn resize(&mut self, size: Vec2) {
        log::info!("[map] resize {}x{}", size.x, size.y);
    }

    fn view_state(&self) -> ViewState {
        self.view
    }
    fn jump_to(&mut self, camera: &CameraOptions) {
        self.apply(camera);
        log::info!("[map] jumpTo -> {:?}", self.view);
    }
    fn ease_to(&mut self, camera: &CameraOptions, duration: Duration) {
        self.apply(camera);
        log::info!("[map] easeTo over {duration:?} -> {:?}", self.view);
    }
    fn fly_to(&mut self, camera: &CameraOptions, duration: Duration) {
        self.apply(camera);
        log::info!("[map] flyTo over {duration:?} -> {:?}", self.view);
    }
    fn is_style_loaded(&self) -> bool {
        true
    }

    fn remove(&mut self) -> anyhow::Result<()> {
        log::info!("[map] removed");
        Ok(())
    }
}
