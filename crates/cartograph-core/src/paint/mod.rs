//! Paint model shared between widgets and whatever consumes the draw stream.

mod color;

pub use color::Color;
