use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use cartograph_core::coords::{Rect, Vec2};

/// The surface a map engine is bound to.
///
/// Owned by the map view; the engine receives a clone at construction and
/// reads the committed layout through it.
#[derive(Clone)]
pub struct MapContainer {
    id: Option<Rc<str>>,
    rect: Rc<Cell<Rect>>,
}

impl MapContainer {
    pub fn new(id: Option<&str>) -> Self {
        Self { id: id.map(Rc::from), rect: Rc::new(Cell::new(Rect::default())) }
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Rect committed by the most recent layout.
    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect.get()
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.rect.get().size
    }

    /// Record a committed rect. Returns `true` if the size changed.
    pub(crate) fn commit(&self, rect: Rect) -> bool {
        let resized = self.rect.get().size != rect.size;
        self.rect.set(rect);
        resized
    }
}

impl fmt::Debug for MapContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapContainer")
            .field("id", &self.id())
            .field("rect", &self.rect())
            .finish()
    }
}
