//! Cartograph UI: retained widget tree on top of `cartograph-core`.
//!
//! Widgets are kept alive across frames. Each frame [`UiScene::frame`] runs
//! four passes over the tree:
//!
//! 1. **measure**: sizes flow up from [`Constraints`].
//! 2. **commit**: layout is final; widgets that drive external state
//!    (e.g. a map engine) synchronize it here, before anything is painted.
//! 3. **paint**: widgets record into the frame's `DrawList`.
//! 4. **events**: input is routed down the tree.
//!
//! [`Widget::mount`] and [`Widget::unmount`] bracket a widget's time in the
//! tree. Values an ancestor wants to share with descendants travel through
//! [`Context`].
//!
//! ```rust,ignore
//! use cartograph_ui::prelude::*;
//!
//! let mut scene = UiScene::new();
//! let mut root: Element = Container::new().padding_all(8.0).child(my_widget).into();
//!
//! scene.mount(&mut root);
//! loop {
//!     let draw_list = scene.frame(&mut root, viewport, &input);
//!     present(draw_list);
//! }
//! scene.unmount(&mut root);
//! ```

pub mod constraints;
pub mod context;
pub mod event;
pub mod painter;
pub mod scene;
pub mod style;
pub mod widget;
pub mod widgets;

/// Everything needed to build and extend UI; import this in widget files.
pub mod prelude {
    pub use crate::constraints::{Constraints, Edges};
    pub use crate::context::Context;
    pub use crate::event::{EventResult, UiEvent};
    pub use crate::painter::Painter;
    pub use crate::scene::{UiInput, UiScene};
    pub use crate::style::{BoxStyle, Length};
    pub use crate::widget::{Element, Widget};
    pub use crate::widgets::container::Container;

    pub use cartograph_core::coords::{Rect, Vec2};
    pub use cartograph_core::paint::Color;
    pub use cartograph_core::scene::{DrawCmd, DrawList};
}
