use std::fmt::Write as _;
use std::rc::Rc;

use cartograph_ui::event::UiEvent;
use thiserror::Error;

use crate::handle::MapRef;

/// Everything that can stop a map from reaching the ready state.
#[derive(Debug, Error)]
pub enum MapError {
    /// The resolved module does not look like a map library.
    #[error("invalid map library: {0}")]
    Configuration(String),

    /// The library reports that this environment cannot host a map.
    #[error("map is not supported by this environment")]
    Environment,

    /// The library's `Map` constructor failed.
    #[error("failed to construct map engine")]
    Construction(#[source] anyhow::Error),

    /// A deferred library source resolved to an error.
    #[error("failed to load map library")]
    Load(#[source] anyhow::Error),
}

/// Payload delivered to the map view's error callback.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    /// Always `"error"`.
    pub event_type: &'static str,
    /// Load failures happen before any map exists, so this is always `None`.
    pub target: Option<MapRef>,
    /// Load failures are not caused by user input, so this is always `None`.
    pub original_event: Option<UiEvent>,
    pub error: Rc<MapError>,
}

impl ErrorEvent {
    pub fn new(error: MapError) -> Self {
        Self {
            event_type: "error",
            target: None,
            original_event: None,
            error: Rc::new(error),
        }
    }
}

/// Callback invoked with every [`ErrorEvent`].
pub type ErrorHandler = Rc<dyn Fn(&ErrorEvent)>;

/// The error handler used when the caller does not supply one: logs the
/// error and its sources.
pub fn log_error(event: &ErrorEvent) {
    let mut message = event.error.to_string();
    let mut source = std::error::Error::source(event.error.as_ref());
    while let Some(cause) = source {
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    log::error!("{message}");
}
