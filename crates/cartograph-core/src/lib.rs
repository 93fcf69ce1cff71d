//! Cartograph core crate.
//!
//! This crate owns the renderer-agnostic pieces used by higher layers:
//! geometry, color, the recorded draw stream, and logger setup.

pub mod coords;
pub mod logging;
pub mod paint;
pub mod scene;
