//! Interaction engine behind the photo viewer: zoom/pan geometry, gesture
//! classification, slide sequencing and the viewer state machine.
//!
//! Nothing in here touches the DOM. The host measures layout, feeds raw
//! pointer and key input in, and applies the returned [`ViewCommand`]s.

pub mod config;
pub mod controller;
pub mod fullscreen;
pub mod gallery;
pub mod geometry;
pub mod gesture;
pub mod sequencer;
pub mod session;

pub use config::ViewerConfig;
pub use controller::{
    navigate, Cursor, Key, Layout, Reaction, ScrollPosition, ViewCommand, ViewerController, ViewerHost,
    ViewerMode,
};
pub use fullscreen::{Fullscreen, FullscreenToggle};
pub use gallery::{Gallery, GalleryError, ImageDescriptor};
pub use geometry::{Rect, ZoomTransform};
pub use gesture::{Intent, PointerInput, PointerKind, PointerPhase};
pub use sequencer::{ArrowVisibility, Direction, PanelWindow, Slide, Transition};
pub use session::SessionState;
