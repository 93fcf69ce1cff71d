//! Scripted stand-ins for an engine library, used by the unit tests.
//!
//! Every call that reaches the outside world is appended to a shared
//! [`CallLog`], so tests can assert exact call sequences.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use cartograph_core::coords::Vec2;
use serde_json::Value;

use crate::handle::MapRef;
use crate::library::{
    MapClass, MapEngine, MapLibrary, MapOptions, PluginCallback, RtlTextPluginStatus,
};
use crate::props::{CameraOptions, InteractionHandler, MapProps, Projection, ViewState};
use crate::registry::MountedMaps;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Construct,
    SetMinZoom(f64),
    SetMaxZoom(f64),
    SetMinPitch(f64),
    SetMaxPitch(f64),
    SetRenderWorldCopies(bool),
    SetProjection(Projection),
    SetStyle { diff: bool },
    SetHandler(InteractionHandler, bool),
    Resize(Vec2),
    JumpTo,
    EaseTo,
    FlyTo,
    Remove,
    SetRtlTextPlugin(String),
    SetMaxParallelImageRequests(u32),
    SetWorkerCount(u32),
    SetWorkerUrl(String),
    RegistryMount(Option<String>),
    RegistryUnmount(Option<String>),
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }
}

// ── Library ───────────────────────────────────────────────────────────────

pub struct ScriptedLibrary {
    log: CallLog,
    class: Option<ScriptedClass>,
    supported: bool,
    globals: bool,
    rtl_status: Cell<RtlTextPluginStatus>,
    max_parallel_image_requests: Cell<u32>,
    worker_count: Cell<u32>,
    worker_url: RefCell<String>,
}

impl ScriptedLibrary {
    pub fn new(log: CallLog) -> Self {
        Self {
            class: Some(ScriptedClass {
                log: log.clone(),
                fail_construct: false,
                fail_remove: false,
            }),
            log,
            supported: true,
            globals: true,
            rtl_status: Cell::new(RtlTextPluginStatus::Unavailable),
            max_parallel_image_requests: Cell::new(16),
            worker_count: Cell::new(1),
            worker_url: RefCell::new(String::new()),
        }
    }

    pub fn without_map_class(mut self) -> Self {
        self.class = None;
        self
    }

    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    pub fn failing_construct(mut self) -> Self {
        if let Some(class) = &mut self.class {
            class.fail_construct = true;
        }
        self
    }

    pub fn failing_remove(mut self) -> Self {
        if let Some(class) = &mut self.class {
            class.fail_remove = true;
        }
        self
    }

    /// Report every process-wide setting as unavailable.
    pub fn without_globals(mut self) -> Self {
        self.globals = false;
        self
    }
}

impl MapLibrary for ScriptedLibrary {
    fn map_class(&self) -> Option<&dyn MapClass> {
        self.class.as_ref().map(|class| class as &dyn MapClass)
    }

    fn supported(&self, _props: &MapProps) -> bool {
        self.supported
    }

    fn rtl_text_plugin_status(&self) -> Option<RtlTextPluginStatus> {
        self.globals.then(|| self.rtl_status.get())
    }

    fn set_rtl_text_plugin(&self, url: &str, callback: PluginCallback, _lazy: bool) {
        self.log.push(Call::SetRtlTextPlugin(url.to_string()));
        self.rtl_status.set(RtlTextPluginStatus::Loaded);
        callback(Ok(()));
    }

    fn max_parallel_image_requests(&self) -> Option<u32> {
        self.globals.then(|| self.max_parallel_image_requests.get())
    }

    fn set_max_parallel_image_requests(&self, count: u32) {
        self.log.push(Call::SetMaxParallelImageRequests(count));
        self.max_parallel_image_requests.set(count);
    }

    fn worker_count(&self) -> Option<u32> {
        self.globals.then(|| self.worker_count.get())
    }

    fn set_worker_count(&self, count: u32) {
        self.log.push(Call::SetWorkerCount(count));
        self.worker_count.set(count);
    }

    fn worker_url(&self) -> Option<String> {
        self.globals.then(|| self.worker_url.borrow().clone())
    }

    fn set_worker_url(&self, url: &str) {
        self.log.push(Call::SetWorkerUrl(url.to_string()));
        *self.worker_url.borrow_mut() = url.to_string();
    }
}

// ── Class / engine ────────────────────────────────────────────────────────

pub struct ScriptedClass {
    log: CallLog,
    fail_construct: bool,
    fail_remove: bool,
}

impl MapClass for ScriptedClass {
    fn construct(&self, options: MapOptions) -> anyhow::Result<Box<dyn MapEngine>> {
        self.log.push(Call::Construct);
        if self.fail_construct {
            anyhow::bail!("no rendering context");
        }
        Ok(Box::new(ScriptedEngine {
            log: self.log.clone(),
            view: options.props.initial_view_state.unwrap_or_default(),
            fail_remove: self.fail_remove,
        }))
    }
}

pub struct ScriptedEngine {
    log: CallLog,
    view: ViewState,
    fail_remove: bool,
}

impl ScriptedEngine {
    fn move_camera(&mut self, camera: &CameraOptions) {
        if let Some(center) = camera.center {
            self.view.longitude = center.lng;
            self.view.latitude = center.lat;
        }
        if let Some(zoom) = camera.zoom {
            self.view.zoom = zoom;
        }
        if let Some(bearing) = camera.bearing {
            self.view.bearing = bearing;
        }
        if let Some(pitch) = camera.pitch {
            self.view.pitch = pitch;
        }
    }
}

impl MapEngine for ScriptedEngine {
    fn set_min_zoom(&mut self, zoom: f64) {
        self.log.push(Call::SetMinZoom(zoom));
    }
    fn set_max_zoom(&mut self, zoom: f64) {
        self.log.push(Call::SetMaxZoom(zoom));
    }
    fn set_min_pitch(&mut self, pitch: f64) {
        self.log.push(Call::SetMinPitch(pitch));
    }
    fn set_max_pitch(&mut self, pitch: f64) {
        self.log.push(Call::SetMaxPitch(pitch));
    }
    fn set_render_world_copies(&mut self, enabled: bool) {
        self.log.push(Call::SetRenderWorldCopies(enabled));
    }
    fn set_projection(&mut self, projection: Projection) {
        self.log.push(Call::SetProjection(projection));
    }
    fn set_style(&mut self, _style: &Value, diff: bool) {
        self.log.push(Call::SetStyle { diff });
    }
    fn set_handler_enabled(&mut self, handler: InteractionHandler, enabled: bool) {
        self.log.push(Call::SetHandler(handler, enabled));
    }
    fn resize(&mut self, size: Vec2) {
        self.log.push(Call::Resize(size));
    }

    fn view_state(&self) -> ViewState {
        self.view
    }
    fn jump_to(&mut self, camera: &CameraOptions) {
        self.log.push(Call::JumpTo);
        self.move_camera(camera);
    }
    fn ease_to(&mut self, camera: &CameraOptions, _duration: Duration) {
        self.log.push(Call::EaseTo);
        self.move_camera(camera);
    }
    fn fly_to(&mut self, camera: &CameraOptions, _duration: Duration) {
        self.log.push(Call::FlyTo);
        self.move_camera(camera);
    }
    fn is_style_loaded(&self) -> bool {
        true
    }

    fn remove(&mut self) -> anyhow::Result<()> {
        self.log.push(Call::Remove);
        if self.fail_remove {
            anyhow::bail!("context already released");
        }
        Ok(())
    }
}

// ── Registry ──────────────────────────────────────────────────────────────

/// Records registry notifications into the same log as the engine.
pub struct RecordingRegistry {
    log: CallLog,
    pub last_mounted: RefCell<Option<MapRef>>,
}

impl RecordingRegistry {
    pub fn new(log: CallLog) -> Rc<Self> {
        Rc::new(Self { log, last_mounted: RefCell::new(None) })
    }
}

impl MountedMaps for RecordingRegistry {
    fn on_map_mount(&self, map: MapRef, id: Option<&str>) {
        self.log.push(Call::RegistryMount(id.map(str::to_string)));
        *self.last_mounted.borrow_mut() = Some(map);
    }

    fn on_map_unmount(&self, id: Option<&str>) {
        self.log.push(Call::RegistryUnmount(id.map(str::to_string)));
    }
}

/// Let every ready `spawn_local` task run to its next suspension point.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
