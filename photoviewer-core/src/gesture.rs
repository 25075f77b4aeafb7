//! Turns raw pointer/touch samples into viewer intents.
//!
//! Unzoomed, a touch drag is a swipe candidate and a short release on the
//! image is a tap. Zoomed, any press (image or letterbox) starts a pan;
//! the release is a tap only if the pan never moved.

use crate::config::ViewerConfig;
use crate::session::SessionState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// One pointer sample in client coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    /// Whether the event target is the slide image (only meaningful on `Down`).
    pub on_image: bool,
}

impl PointerInput {
    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self { kind: PointerKind::Mouse, phase, x, y, on_image: false }
    }

    pub fn touch(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self { kind: PointerKind::Touch, phase, x, y, on_image: false }
    }

    pub fn on_image(mut self) -> Self {
        self.on_image = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    None,
    /// Release without movement, in client coordinates.
    Tap { x: f64, y: f64 },
    PanStart,
    /// Displacement since the pan started.
    PanMove { dx: f64, dy: f64 },
    PanEnd,
    /// Unzoomed touch drag in progress; signed fraction of the viewport width.
    SwipeDrag { fraction: f64 },
    /// Finger travelled left past the threshold: show the next slide.
    SwipeLeft,
    /// Finger travelled right past the threshold: show the previous slide.
    SwipeRight,
    /// Drag released short of the threshold.
    SnapBack,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Tracking {
    Idle,
    Pressed { kind: PointerKind, start_x: f64, start_y: f64, on_image: bool },
    Panning { kind: PointerKind, start_x: f64, start_y: f64 },
}

#[derive(Clone, Debug)]
pub struct GestureClassifier {
    tracking: Tracking,
    swipe_threshold: f64,
    tap_slop: f64,
}

impl GestureClassifier {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            tracking: Tracking::Idle,
            swipe_threshold: config.swipe_threshold,
            tap_slop: config.tap_slop_px,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking != Tracking::Idle
    }

    /// Drop any gesture in progress (viewer closed, slide changed).
    pub fn reset(&mut self) {
        self.tracking = Tracking::Idle;
    }

    pub fn classify(&mut self, input: PointerInput, session: &SessionState, viewport_width: f64) -> Intent {
        match input.phase {
            PointerPhase::Down => self.press(input, session),
            PointerPhase::Move => self.drag(input, session, viewport_width),
            PointerPhase::Up => self.release(input, session, viewport_width),
        }
    }

    fn press(&mut self, input: PointerInput, session: &SessionState) -> Intent {
        if session.is_zoomed {
            self.tracking = Tracking::Panning { kind: input.kind, start_x: input.x, start_y: input.y };
            Intent::PanStart
        } else {
            self.tracking = Tracking::Pressed {
                kind: input.kind,
                start_x: input.x,
                start_y: input.y,
                on_image: input.on_image,
            };
            Intent::None
        }
    }

    fn drag(&mut self, input: PointerInput, session: &SessionState, viewport_width: f64) -> Intent {
        match self.tracking {
            Tracking::Idle => Intent::None,
            Tracking::Panning { kind, start_x, start_y } => {
                if kind != input.kind || !session.is_zoomed {
                    return Intent::None;
                }
                Intent::PanMove { dx: input.x - start_x, dy: input.y - start_y }
            }
            Tracking::Pressed { kind, start_x, .. } => {
                if kind != PointerKind::Touch || input.kind != kind || session.is_zoomed || viewport_width <= 0.0 {
                    return Intent::None;
                }
                Intent::SwipeDrag { fraction: (input.x - start_x) / viewport_width }
            }
        }
    }

    fn release(&mut self, input: PointerInput, session: &SessionState, viewport_width: f64) -> Intent {
        let tracking = std::mem::replace(&mut self.tracking, Tracking::Idle);
        match tracking {
            Tracking::Idle => Intent::None,
            Tracking::Panning { kind, .. } => {
                if kind != input.kind {
                    self.tracking = tracking;
                    return Intent::None;
                }
                if session.has_panned {
                    Intent::PanEnd
                } else {
                    Intent::Tap { x: input.x, y: input.y }
                }
            }
            Tracking::Pressed { kind, start_x, start_y, on_image } => {
                if kind != input.kind {
                    self.tracking = tracking;
                    return Intent::None;
                }
                let dx = input.x - start_x;
                let dy = input.y - start_y;
                if on_image && dx.hypot(dy) <= self.tap_slop {
                    return Intent::Tap { x: input.x, y: input.y };
                }
                if kind == PointerKind::Mouse || session.is_zoomed {
                    return Intent::None;
                }
                let threshold = viewport_width * self.swipe_threshold;
                if dx < -threshold {
                    Intent::SwipeLeft
                } else if dx > threshold {
                    Intent::SwipeRight
                } else {
                    Intent::SnapBack
                }
            }
        }
    }
}
