//! Scene (draw stream) types.
//!
//! Widgets record renderer-agnostic commands here; whoever owns the surface
//! decides how to present them.

mod list;

pub use list::{DrawCmd, DrawItem, DrawList};
