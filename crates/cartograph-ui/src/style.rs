//! Box sizing for widgets that own a surface.

use cartograph_core::coords::Vec2;
use cartograph_core::paint::Color;

use crate::constraints::Constraints;

/// A length along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Fixed logical pixels.
    Px(f32),
    /// Percentage of the space offered by the parent.
    Percent(f32),
}

impl Length {
    /// Resolve against the parent's available extent.
    ///
    /// A percentage of unbounded space resolves to zero.
    #[inline]
    pub fn resolve(self, available: f32) -> f32 {
        match self {
            Length::Px(px) => px.max(0.0),
            Length::Percent(_) if !available.is_finite() => 0.0,
            Length::Percent(pct) => (available * pct / 100.0).max(0.0),
        }
    }
}

/// Size and background of a box.
///
/// The default fills its parent: `100%` × `100%`, no background.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub width: Length,
    pub height: Length,
    pub background: Option<Color>,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            width: Length::Percent(100.0),
            height: Length::Percent(100.0),
            background: None,
        }
    }
}

impl BoxStyle {
    pub fn width(mut self, width: Length) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: Length) -> Self {
        self.height = height;
        self
    }

    pub fn size(self, width: Length, height: Length) -> Self {
        self.width(width).height(height)
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// The size this box takes under `constraints`.
    pub fn measure(&self, constraints: Constraints) -> Vec2 {
        constraints.constrain(Vec2::new(
            self.width.resolve(constraints.max.x),
            self.height.resolve(constraints.max.y),
        ))
    }
}
