//! Declarative map configuration.
//!
//! A fresh [`MapProps`] is handed to the map view on every render. Field
//! names serialize in camelCase so a props document reads the same as the
//! engine's own option names (`scrollZoom`, `RTLTextPlugin`, ...).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// URL of the right-to-left text shaping plugin loaded by default.
pub const DEFAULT_RTL_TEXT_PLUGIN: &str =
    "https://api.mapbox.com/mapbox-gl-js/plugins/mapbox-gl-rtl-text/v0.2.3/mapbox-gl-rtl-text.js";

/// An empty, valid style document.
pub fn empty_style() -> Value {
    json!({ "version": 8, "sources": {}, "layers": [] })
}

// ── Projection ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Projection {
    Albers,
    EqualEarth,
    Equirectangular,
    Globe,
    LambertConformalConic,
    #[default]
    Mercator,
    NaturalEarth,
    WinkelTripel,
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Projection::Albers => "albers",
            Projection::EqualEarth => "equalEarth",
            Projection::Equirectangular => "equirectangular",
            Projection::Globe => "globe",
            Projection::LambertConformalConic => "lambertConformalConic",
            Projection::Mercator => "mercator",
            Projection::NaturalEarth => "naturalEarth",
            Projection::WinkelTripel => "winkelTripel",
        };
        f.write_str(name)
    }
}

// ── Interaction handlers ──────────────────────────────────────────────────

/// User-interaction handlers the engine can toggle individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionHandler {
    ScrollZoom,
    BoxZoom,
    DragRotate,
    DragPan,
    Keyboard,
    DoubleClickZoom,
    TouchZoomRotate,
    TouchPitch,
}

impl InteractionHandler {
    pub const ALL: [InteractionHandler; 8] = [
        InteractionHandler::ScrollZoom,
        InteractionHandler::BoxZoom,
        InteractionHandler::DragRotate,
        InteractionHandler::DragPan,
        InteractionHandler::Keyboard,
        InteractionHandler::DoubleClickZoom,
        InteractionHandler::TouchZoomRotate,
        InteractionHandler::TouchPitch,
    ];
}

/// Enabled state of every [`InteractionHandler`]. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionHandlers {
    pub scroll_zoom: bool,
    pub box_zoom: bool,
    pub drag_rotate: bool,
    pub drag_pan: bool,
    pub keyboard: bool,
    pub double_click_zoom: bool,
    pub touch_zoom_rotate: bool,
    pub touch_pitch: bool,
}

impl Default for InteractionHandlers {
    fn default() -> Self {
        Self {
            scroll_zoom: true,
            box_zoom: true,
            drag_rotate: true,
            drag_pan: true,
            keyboard: true,
            double_click_zoom: true,
            touch_zoom_rotate: true,
            touch_pitch: true,
        }
    }
}

impl InteractionHandlers {
    pub fn get(&self, handler: InteractionHandler) -> bool {
        match handler {
            InteractionHandler::ScrollZoom => self.scroll_zoom,
            InteractionHandler::BoxZoom => self.box_zoom,
            InteractionHandler::DragRotate => self.drag_rotate,
            InteractionHandler::DragPan => self.drag_pan,
            InteractionHandler::Keyboard => self.keyboard,
            InteractionHandler::DoubleClickZoom => self.double_click_zoom,
            InteractionHandler::TouchZoomRotate => self.touch_zoom_rotate,
            InteractionHandler::TouchPitch => self.touch_pitch,
        }
    }

    pub fn set(&mut self, handler: InteractionHandler, enabled: bool) {
        let slot = match handler {
            InteractionHandler::ScrollZoom => &mut self.scroll_zoom,
            InteractionHandler::BoxZoom => &mut self.box_zoom,
            InteractionHandler::DragRotate => &mut self.drag_rotate,
            InteractionHandler::DragPan => &mut self.drag_pan,
            InteractionHandler::Keyboard => &mut self.keyboard,
            InteractionHandler::DoubleClickZoom => &mut self.double_click_zoom,
            InteractionHandler::TouchZoomRotate => &mut self.touch_zoom_rotate,
            InteractionHandler::TouchPitch => &mut self.touch_pitch,
        };
        *slot = enabled;
    }
}

// ── Camera ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Full camera description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl ViewState {
    pub fn center(&self) -> LngLat {
        LngLat::new(self.longitude, self.latitude)
    }
}

/// Partial camera update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraOptions {
    pub center: Option<LngLat>,
    pub zoom: Option<f64>,
    pub bearing: Option<f64>,
    pub pitch: Option<f64>,
}

// ── Global settings ───────────────────────────────────────────────────────

/// Settings that apply to the engine library as a whole rather than to a
/// single map. Applied once per library, before the first map is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    #[serde(rename = "RTLTextPlugin")]
    pub rtl_text_plugin: Option<String>,
    #[serde(rename = "maxParallelImageRequests")]
    pub max_parallel_image_requests: Option<u32>,
    #[serde(rename = "workerCount")]
    pub worker_count: Option<u32>,
    #[serde(rename = "workerUrl")]
    pub worker_url: Option<String>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            rtl_text_plugin: Some(DEFAULT_RTL_TEXT_PLUGIN.to_string()),
            max_parallel_image_requests: None,
            worker_count: None,
            worker_url: None,
        }
    }
}

// ── MapProps ──────────────────────────────────────────────────────────────

/// Everything the map view pushes onto the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapProps {
    // Constraints
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub min_pitch: f64,
    pub max_pitch: f64,

    #[serde(flatten)]
    pub handlers: InteractionHandlers,

    // Style
    pub map_style: Value,
    pub style_diffing: bool,
    pub projection: Projection,
    pub render_world_copies: bool,

    /// Camera used when the engine is constructed. Ignored afterwards.
    pub initial_view_state: Option<ViewState>,

    #[serde(flatten)]
    pub globals: GlobalSettings,
}

impl Default for MapProps {
    fn default() -> Self {
        Self {
            min_zoom: 0.0,
            max_zoom: 22.0,
            min_pitch: 0.0,
            max_pitch: 85.0,
            handlers: InteractionHandlers::default(),
            map_style: empty_style(),
            style_diffing: true,
            projection: Projection::Mercator,
            render_world_copies: true,
            initial_view_state: None,
            globals: GlobalSettings::default(),
        }
    }
}

impl MapProps {
    /// Parse a props document; missing fields take their defaults.
    pub fn from_json(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src)
    }

    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn zoom_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_zoom = min;
        self.max_zoom = max;
        self
    }

    pub fn pitch_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_pitch = min;
        self.max_pitch = max;
        self
    }

    pub fn map_style(mut self, style: Value) -> Self {
        self.map_style = style;
        self
    }

    pub fn handler(mut self, handler: InteractionHandler, enabled: bool) -> Self {
        self.handlers.set(handler, enabled);
        self
    }

    pub fn initial_view_state(mut self, view: ViewState) -> Self {
        self.initial_view_state = Some(view);
        self
    }
}
