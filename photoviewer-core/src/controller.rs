//! The viewer state machine.
//!
//! `Closed -> Unzoomed <-> Zoomed <-> Panning`, driven by intents from the
//! gesture classifier, keys, and explicit calls. Every operation updates
//! the session first and then returns the view commands the renderer has
//! to apply, so a renderer never observes a half-updated state.

use std::future::Future;
use std::time::Duration;
use crate::config::{ViewerConfig, STRIP_PANEL_PCT, STRIP_REST_PCT};
use crate::fullscreen::{Fullscreen, FullscreenToggle};
use crate::gallery::Gallery;
use crate::geometry::{compute_zoom_transform, GeometrySnapshot, Rect, ZoomTransform};
use crate::gesture::{GestureClassifier, Intent, PointerInput};
use crate::sequencer::{wait_for_transition, ArrowVisibility, Direction, PanelWindow, SlideSequencer, Transition};
use crate::session::SessionState;

/// Live layout measurements, taken on demand.
pub trait Layout {
    fn container_rect(&self) -> Option<Rect>;
    /// Layout box of the current slide image in client coordinates,
    /// ignoring the image's own zoom transform. Must not depend on how far
    /// a zoom animation has progressed.
    fn image_rect(&self) -> Option<Rect>;
    fn natural_width(&self) -> Option<f64>;
    fn viewport_width(&self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerMode {
    Closed,
    Unzoomed,
    Zoomed,
    Panning,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    ZoomIn,
    ZoomOut,
    Grabbing,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::ZoomIn => "zoom-in",
            Cursor::ZoomOut => "zoom-out",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Instructions for the renderer, applied in order.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewCommand {
    ShowViewer,
    HideViewer { restore_scroll: ScrollPosition },
    MoveStrip { offset_pct: f64, transition: Option<Duration> },
    LoadPanels(PanelWindow),
    TransformImage { transform: ZoomTransform, transition: Option<Duration> },
    SetCounter(String),
    SetArrows(ArrowVisibility),
    RevealArrows(bool),
    SetZoomed(bool),
    SetCursor(Cursor),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Next,
    Previous,
}

impl Key {
    /// Map a keyboard event's `code` / `key` pair.
    pub fn from_event(code: &str, key: &str) -> Option<Self> {
        if key == "Escape" {
            return Some(Key::Escape);
        }
        match code {
            "Space" | "ArrowRight" => Some(Key::Next),
            "Backspace" | "ArrowLeft" => Some(Key::Previous),
            _ => None,
        }
    }
}

/// Outcome of an input. Navigation is asynchronous, so it is handed back
/// to the caller to run through [`navigate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reaction {
    pub commands: Vec<ViewCommand>,
    pub navigate: Option<Direction>,
    /// The host should suppress the input's default action.
    pub consumed: bool,
}

impl Reaction {
    fn commands(commands: Vec<ViewCommand>) -> Self {
        Self { commands, navigate: None, consumed: true }
    }

    fn navigate(direction: Direction) -> Self {
        Self { commands: Vec::new(), navigate: Some(direction), consumed: true }
    }
}

#[derive(Debug)]
pub struct ViewerController {
    gallery: Gallery,
    config: ViewerConfig,
    sequencer: SlideSequencer,
    classifier: GestureClassifier,
    fullscreen: FullscreenToggle,
    session: Option<SessionState>,
    geometry: Option<GeometrySnapshot>,
    /// Translation at pan start; pan deltas are relative to it.
    pan_origin: (f64, f64),
    strip_offset_pct: f64,
    saved_scroll: ScrollPosition,
    reveal_generation: u64,
}

impl ViewerController {
    pub fn new(gallery: Gallery, config: ViewerConfig, fullscreen: Box<dyn Fullscreen>) -> Self {
        Self {
            sequencer: SlideSequencer::new(gallery.len()),
            classifier: GestureClassifier::new(&config),
            fullscreen: FullscreenToggle::new(fullscreen),
            gallery,
            config,
            session: None,
            geometry: None,
            pan_origin: (0.0, 0.0),
            strip_offset_pct: STRIP_REST_PCT,
            saved_scroll: ScrollPosition::default(),
            reveal_generation: 0,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_active()
    }

    pub fn is_transitioning(&self) -> bool {
        self.sequencer.in_flight().is_some()
    }

    pub fn mode(&self) -> ViewerMode {
        match &self.session {
            None => ViewerMode::Closed,
            Some(s) if s.is_panning => ViewerMode::Panning,
            Some(s) if s.is_zoomed => ViewerMode::Zoomed,
            Some(_) => ViewerMode::Unzoomed,
        }
    }

    pub fn transition_timeout(&self) -> Duration {
        self.config.transition_timeout()
    }

    // ── Open / close ──────────────────────────────────────────────────────────

    /// Open the viewer on the thumbnail at `index`, remembering where the
    /// page was scrolled.
    pub fn open(&mut self, index: usize, scroll: ScrollPosition) -> Vec<ViewCommand> {
        if self.session.is_some() {
            return Vec::new();
        }
        if !self.sequencer.jump_to(index) {
            log::warn!("Ignoring open at {index}: gallery has {} images", self.gallery.len());
            return Vec::new();
        }
        self.session = Some(SessionState::opened_at(index));
        self.saved_scroll = scroll;
        self.geometry = None;
        self.strip_offset_pct = STRIP_REST_PCT;
        self.classifier.reset();
        log::info!("Viewer opened at {}", self.sequencer.counter_text());

        vec![
            ViewCommand::ShowViewer,
            ViewCommand::MoveStrip { offset_pct: STRIP_REST_PCT, transition: None },
            ViewCommand::TransformImage { transform: ZoomTransform::IDENTITY, transition: None },
            ViewCommand::SetZoomed(false),
            ViewCommand::SetCursor(Cursor::ZoomIn),
            ViewCommand::LoadPanels(self.sequencer.window(&self.gallery)),
            ViewCommand::SetCounter(self.sequencer.counter_text()),
            ViewCommand::SetArrows(self.sequencer.arrows(false)),
        ]
    }

    /// Close from any open state. Leaves fullscreen and restores the
    /// scroll position saved at open.
    pub fn close(&mut self) -> Vec<ViewCommand> {
        if self.session.take().is_none() {
            return Vec::new();
        }
        if let Some(t) = self.sequencer.abandon() {
            log::debug!("Closing during transition {} -> {}", t.from, t.to);
        }
        self.geometry = None;
        self.strip_offset_pct = STRIP_REST_PCT;
        self.classifier.reset();
        self.reveal_generation += 1;
        self.fullscreen.leave();
        log::info!("Viewer closed");

        vec![
            ViewCommand::RevealArrows(false),
            ViewCommand::HideViewer { restore_scroll: self.saved_scroll },
        ]
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen.toggle();
    }

    pub fn sync_fullscreen(&mut self, active: bool) {
        self.fullscreen.sync(active);
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Classify a raw pointer sample and act on the resulting intent.
    pub fn pointer(&mut self, input: PointerInput, layout: &impl Layout) -> Reaction {
        let Some(session) = self.session.as_ref() else {
            return Reaction::default();
        };
        let intent = self.classifier.classify(input, session, layout.viewport_width());
        self.dispatch(intent, layout)
    }

    pub fn dispatch(&mut self, intent: Intent, layout: &impl Layout) -> Reaction {
        if self.session.is_none() {
            return Reaction::default();
        }
        match intent {
            Intent::None => Reaction::default(),
            Intent::Tap { x, y } => self.tap(x, y, layout),
            Intent::PanStart => self.pan_start(layout),
            Intent::PanMove { dx, dy } => self.pan_move(dx, dy),
            Intent::PanEnd => self.pan_end(),
            Intent::SwipeDrag { fraction } => self.swipe_drag(fraction),
            Intent::SwipeLeft => self.swipe(Direction::Next),
            Intent::SwipeRight => self.swipe(Direction::Previous),
            Intent::SnapBack => Reaction::commands(self.snap_back()),
        }
    }

    pub fn key(&mut self, key: Key) -> Reaction {
        let Some(zoomed) = self.session.as_ref().map(|s| s.is_zoomed) else {
            return Reaction::default();
        };
        match key {
            Key::Escape => Reaction::commands(self.close()),
            _ if zoomed => Reaction::default(),
            Key::Next => Reaction::navigate(Direction::Next),
            Key::Previous => Reaction::navigate(Direction::Previous),
        }
    }

    /// Mouse movement reveals the arrows. Returns the generation to hand
    /// back to [`Self::conceal_arrows`] once `arrow_reveal_ms` has passed.
    pub fn reveal_arrows(&mut self) -> Option<(Vec<ViewCommand>, u64)> {
        if !self.session.as_ref().is_some_and(|s| !s.is_zoomed) {
            return None;
        }
        self.reveal_generation += 1;
        Some((vec![ViewCommand::RevealArrows(true)], self.reveal_generation))
    }

    /// Stale generations (superseded by later movement) are ignored.
    pub fn conceal_arrows(&mut self, generation: u64) -> Vec<ViewCommand> {
        if generation != self.reveal_generation || self.session.is_none() {
            return Vec::new();
        }
        vec![ViewCommand::RevealArrows(false)]
    }

    // ── Zoom & pan ────────────────────────────────────────────────────────────

    fn tap(&mut self, x: f64, y: f64, layout: &impl Layout) -> Reaction {
        let Some(session) = self.session.as_mut() else {
            return Reaction::default();
        };
        if session.has_panned {
            // release of a drag, not a tap
            session.is_panning = false;
            session.has_panned = false;
            return Reaction::commands(Vec::new());
        }
        if self.sequencer.in_flight().is_some() {
            return Reaction::default();
        }
        if session.is_zoomed {
            Reaction::commands(self.zoom_out())
        } else {
            Reaction::commands(self.zoom_in(x, y, layout))
        }
    }

    fn zoom_in(&mut self, x: f64, y: f64, layout: &impl Layout) -> Vec<ViewCommand> {
        let mut commands = self.reset_strip_if_dragged();
        let (Some(image), Some(natural_width)) = (layout.image_rect(), layout.natural_width()) else {
            log::warn!("Zoom requested before the slide image was laid out");
            return commands;
        };
        if image.is_empty() {
            log::warn!("Zoom requested on an image with no size");
            return commands;
        }
        let container = layout.container_rect().unwrap_or(image);
        let t = compute_zoom_transform(x, y, image, natural_width);
        let geometry = GeometrySnapshot::at_zoom_start(container, image, t.scale);
        let (translate_x, translate_y) = geometry.clamp(t.translate_x, t.translate_y);
        let t = ZoomTransform { translate_x, translate_y, ..t };

        let Some(session) = self.session.as_mut() else {
            return commands;
        };
        session.zoom_to(t);
        self.geometry = Some(geometry);
        log::debug!("Zoom in at ({x}, {y}), scale {:.3}", t.scale);

        commands.extend([
            ViewCommand::TransformImage { transform: t, transition: Some(self.config.zoom_transition()) },
            ViewCommand::SetZoomed(true),
            ViewCommand::SetArrows(ArrowVisibility::HIDDEN),
            ViewCommand::SetCursor(Cursor::ZoomOut),
        ]);
        commands
    }

    fn zoom_out(&mut self) -> Vec<ViewCommand> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.reset_zoom();
        self.geometry = None;
        log::debug!("Zoom out");

        vec![
            ViewCommand::TransformImage {
                transform: ZoomTransform::IDENTITY,
                transition: Some(self.config.zoom_transition()),
            },
            ViewCommand::SetZoomed(false),
            ViewCommand::SetArrows(self.sequencer.arrows(false)),
            ViewCommand::SetCursor(Cursor::ZoomIn),
        ]
    }

    fn pan_start(&mut self, layout: &impl Layout) -> Reaction {
        let Some(session) = self.session.as_mut() else {
            return Reaction::default();
        };
        if !session.is_zoomed {
            return Reaction::default();
        }
        let current = session.transform();
        match (layout.container_rect(), layout.image_rect()) {
            (Some(container), Some(image)) if !image.is_empty() => {
                self.geometry = Some(GeometrySnapshot::at_pan_start(container, image, &current));
            }
            _ => log::warn!("Pan started without fresh layout; reusing last measurement"),
        }
        session.is_panning = true;
        session.has_panned = false;
        self.pan_origin = (current.translate_x, current.translate_y);
        Reaction::commands(vec![ViewCommand::SetCursor(Cursor::Grabbing)])
    }

    fn pan_move(&mut self, dx: f64, dy: f64) -> Reaction {
        let Some(session) = self.session.as_mut() else {
            return Reaction::default();
        };
        if !session.is_panning || !session.is_zoomed {
            return Reaction::default();
        }
        let Some(geometry) = self.geometry else {
            return Reaction::default();
        };
        let (x, y) = geometry.clamp(self.pan_origin.0 + dx, self.pan_origin.1 + dy);
        session.translate_x = x;
        session.translate_y = y;
        session.has_panned = true;
        Reaction::commands(vec![ViewCommand::TransformImage { transform: session.transform(), transition: None }])
    }

    fn pan_end(&mut self) -> Reaction {
        let Some(session) = self.session.as_mut() else {
            return Reaction::default();
        };
        if !session.is_panning {
            return Reaction::default();
        }
        session.is_panning = false;
        let cursor = if session.is_zoomed { Cursor::ZoomOut } else { Cursor::ZoomIn };
        Reaction::commands(vec![ViewCommand::SetCursor(cursor)])
    }

    // ── Swipe & navigation ────────────────────────────────────────────────────

    fn swipe_drag(&mut self, fraction: f64) -> Reaction {
        let zoomed = self.session.as_ref().is_some_and(|s| s.is_zoomed);
        if zoomed || self.sequencer.in_flight().is_some() {
            return Reaction::default();
        }
        self.strip_offset_pct = STRIP_REST_PCT + fraction * STRIP_PANEL_PCT;
        Reaction::commands(vec![ViewCommand::MoveStrip { offset_pct: self.strip_offset_pct, transition: None }])
    }

    fn swipe(&mut self, direction: Direction) -> Reaction {
        let zoomed = self.session.as_ref().is_some_and(|s| s.is_zoomed);
        if !zoomed && self.sequencer.in_flight().is_none() && self.sequencer.has_neighbour(direction) {
            Reaction::navigate(direction)
        } else {
            Reaction::commands(self.snap_back())
        }
    }

    fn snap_back(&mut self) -> Vec<ViewCommand> {
        if self.sequencer.in_flight().is_some() {
            return Vec::new();
        }
        self.strip_offset_pct = STRIP_REST_PCT;
        vec![ViewCommand::MoveStrip { offset_pct: STRIP_REST_PCT, transition: Some(self.config.transition()) }]
    }

    fn reset_strip_if_dragged(&mut self) -> Vec<ViewCommand> {
        if self.strip_offset_pct == STRIP_REST_PCT {
            return Vec::new();
        }
        self.snap_back()
    }

    /// First half of a slide change: reserve the transition and start the
    /// strip animation. `None` when the move is not allowed right now. The
    /// returned transition has to be handed back to [`Self::finish_navigation`].
    pub fn begin_navigation(&mut self, direction: Direction) -> Option<(Transition, Vec<ViewCommand>)> {
        let zoomed = self.session.as_ref()?.is_zoomed;
        let transition = self.sequencer.begin(direction, zoomed)?;
        self.strip_offset_pct = transition.direction.strip_target_pct();
        log::debug!("Slide transition {} -> {}", transition.from, transition.to);
        let commands = vec![ViewCommand::MoveStrip {
            offset_pct: self.strip_offset_pct,
            transition: Some(self.config.transition()),
        }];
        Some((transition, commands))
    }

    /// Second half: the animation is over. Snap the strip back to rest,
    /// rebuild the panels around the new index, refresh counter and arrows.
    /// A transition that is no longer in flight (closed meanwhile) is ignored.
    pub fn finish_navigation(&mut self, transition: Transition) -> Vec<ViewCommand> {
        if self.sequencer.finish(transition.id).is_none() {
            return Vec::new();
        }
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.current_index = self.sequencer.current();
        self.strip_offset_pct = STRIP_REST_PCT;
        self.classifier.reset();

        vec![
            ViewCommand::MoveStrip { offset_pct: STRIP_REST_PCT, transition: None },
            ViewCommand::LoadPanels(self.sequencer.window(&self.gallery)),
            ViewCommand::SetCounter(self.sequencer.counter_text()),
            ViewCommand::SetArrows(self.sequencer.arrows(session.is_zoomed)),
        ]
    }
}

/// Environment the navigation driver runs in: controller access, a
/// renderer, the strip's completion signal and a timer.
pub trait ViewerHost {
    type Signal: Future<Output = ()>;
    type Sleep: Future<Output = ()>;

    /// `None` once the controller has been dropped (viewer unmounted).
    fn with_controller<R>(&self, f: impl FnOnce(&mut ViewerController) -> R) -> Option<R>;
    fn apply(&self, commands: Vec<ViewCommand>);
    /// Armed before the strip starts moving.
    fn transition_end(&self) -> Self::Signal;
    fn sleep(&self, duration: Duration) -> Self::Sleep;
}

/// Animate to the neighbouring slide and settle there. Returns `false`
/// (and does nothing) at a boundary, while zoomed, or while another
/// transition is running.
pub async fn navigate<H: ViewerHost>(host: &H, direction: Direction) -> bool {
    let begun = host
        .with_controller(|c| c.begin_navigation(direction).map(|(t, cmds)| (t, cmds, c.transition_timeout())))
        .flatten();
    let Some((transition, commands, timeout)) = begun else {
        return false;
    };
    let signal = host.transition_end();
    host.apply(commands);
    wait_for_transition(signal, host.sleep(timeout)).await;
    let commands = host.with_controller(|c| c.finish_navigation(transition)).unwrap_or_default();
    host.apply(commands);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use futures::executor::block_on;
    use futures::future::{pending, ready, FutureExt, LocalBoxFuture};
    use crate::fullscreen::Unsupported;
    use crate::gallery::ImageDescriptor;
    use crate::gesture::PointerPhase;

    /// Fixed image layout box inside a 400x300 viewer.
    struct TestLayout {
        container: Rect,
        base: Rect,
        natural_width: f64,
    }

    impl TestLayout {
        fn new(base: Rect, natural_width: f64) -> Self {
            Self { container: Rect::new(0.0, 0.0, 400.0, 300.0), base, natural_width }
        }
    }

    impl Layout for TestLayout {
        fn container_rect(&self) -> Option<Rect> {
            Some(self.container)
        }
        fn image_rect(&self) -> Option<Rect> {
            Some(self.base)
        }
        fn natural_width(&self) -> Option<f64> {
            Some(self.natural_width)
        }
        fn viewport_width(&self) -> f64 {
            self.container.width
        }
    }

    struct NoLayout;

    impl Layout for NoLayout {
        fn container_rect(&self) -> Option<Rect> {
            None
        }
        fn image_rect(&self) -> Option<Rect> {
            None
        }
        fn natural_width(&self) -> Option<f64> {
            None
        }
        fn viewport_width(&self) -> f64 {
            400.0
        }
    }

    struct TestHost {
        controller: RefCell<ViewerController>,
        applied: RefCell<Vec<ViewCommand>>,
        signal_fires: bool,
    }

    impl TestHost {
        fn new(controller: ViewerController, signal_fires: bool) -> Self {
            Self { controller: RefCell::new(controller), applied: RefCell::new(Vec::new()), signal_fires }
        }
    }

    impl ViewerHost for TestHost {
        type Signal = LocalBoxFuture<'static, ()>;
        type Sleep = LocalBoxFuture<'static, ()>;

        fn with_controller<R>(&self, f: impl FnOnce(&mut ViewerController) -> R) -> Option<R> {
            Some(f(&mut self.controller.borrow_mut()))
        }
        fn apply(&self, commands: Vec<ViewCommand>) {
            self.applied.borrow_mut().extend(commands);
        }
        fn transition_end(&self) -> Self::Signal {
            if self.signal_fires { ready(()).boxed_local() } else { pending().boxed_local() }
        }
        fn sleep(&self, _duration: Duration) -> Self::Sleep {
            ready(()).boxed_local()
        }
    }

    fn gallery(n: usize) -> Gallery {
        let images = (0..n)
            .map(|i| ImageDescriptor::new(format!("images/{i}.jpg"), 200, 200))
            .collect();
        Gallery::new(Some("Test".into()), images).unwrap()
    }

    fn controller(n: usize) -> ViewerController {
        ViewerController::new(gallery(n), ViewerConfig::default(), Box::new(Unsupported))
    }

    fn arrows_in(commands: &[ViewCommand]) -> Option<ArrowVisibility> {
        commands.iter().rev().find_map(|c| match c {
            ViewCommand::SetArrows(a) => Some(*a),
            _ => None,
        })
    }

    fn zoomed_controller() -> (ViewerController, TestLayout) {
        let mut c = controller(3);
        c.open(0, ScrollPosition::default());
        let layout = TestLayout::new(Rect::new(100.0, 50.0, 100.0, 100.0), 200.0);
        c.dispatch(Intent::Tap { x: 150.0, y: 100.0 }, &layout);
        (c, layout)
    }

    #[test]
    fn test_three_image_walkthrough() {
        let mut c = controller(3);
        let opened = c.open(0, ScrollPosition::default());
        assert_eq!(arrows_in(&opened), Some(ArrowVisibility { previous: false, next: true }));
        assert_eq!(c.mode(), ViewerMode::Unzoomed);

        let host = TestHost::new(c, true);
        assert!(block_on(navigate(&host, Direction::Next)));
        assert_eq!(host.controller.borrow().session().unwrap().current_index, 1);
        assert_eq!(
            arrows_in(&host.applied.borrow()),
            Some(ArrowVisibility { previous: true, next: true })
        );

        assert!(block_on(navigate(&host, Direction::Next)));
        assert_eq!(host.controller.borrow().session().unwrap().current_index, 2);
        assert_eq!(
            arrows_in(&host.applied.borrow()),
            Some(ArrowVisibility { previous: true, next: false })
        );
        assert!(host.applied.borrow().contains(&ViewCommand::SetCounter("3 / 3".into())));
    }

    #[test]
    fn test_navigation_sequence_order() {
        let mut c = controller(3);
        c.open(1, ScrollPosition::default());
        let host = TestHost::new(c, true);
        assert!(block_on(navigate(&host, Direction::Previous)));
        let applied = host.applied.borrow();
        assert_eq!(
            applied[0],
            ViewCommand::MoveStrip { offset_pct: 0.0, transition: Some(Duration::from_millis(300)) }
        );
        assert_eq!(applied[1], ViewCommand::MoveStrip { offset_pct: -33.333, transition: None });
        assert!(matches!(&applied[2], ViewCommand::LoadPanels(w) if w.current.as_ref().unwrap().index == 0));
        assert_eq!(applied[3], ViewCommand::SetCounter("1 / 3".into()));
    }

    #[test]
    fn test_navigation_survives_missing_signal() {
        let mut c = controller(2);
        c.open(0, ScrollPosition::default());
        let host = TestHost::new(c, false);
        assert!(block_on(navigate(&host, Direction::Next)));
        assert_eq!(host.controller.borrow().session().unwrap().current_index, 1);
        assert!(!host.controller.borrow().is_transitioning());
    }

    #[test]
    fn test_boundary_navigation_fires_nothing() {
        let mut c = controller(3);
        c.open(2, ScrollPosition::default());
        let host = TestHost::new(c, true);
        assert!(!block_on(navigate(&host, Direction::Next)));
        assert!(host.applied.borrow().is_empty());
        assert_eq!(host.controller.borrow().session().unwrap().current_index, 2);

        let mut c = controller(3);
        c.open(0, ScrollPosition::default());
        let host = TestHost::new(c, true);
        assert!(!block_on(navigate(&host, Direction::Previous)));
        assert!(host.applied.borrow().is_empty());
    }

    #[test]
    fn test_reentrant_navigation_ignored() {
        let mut c = controller(5);
        c.open(0, ScrollPosition::default());
        let (t, _) = c.begin_navigation(Direction::Next).unwrap();
        assert!(c.begin_navigation(Direction::Next).is_none());
        c.finish_navigation(t);
        assert_eq!(c.session().unwrap().current_index, 1);
        assert!(c.finish_navigation(t).is_empty());
        assert_eq!(c.session().unwrap().current_index, 1);
    }

    #[test]
    fn test_zoom_round_trip_is_exact() {
        let (mut c, layout) = zoomed_controller();
        assert_eq!(c.mode(), ViewerMode::Zoomed);
        let s = c.session().unwrap();
        assert_eq!(s.scale, 2.0);
        assert_eq!((s.translate_x, s.translate_y), (-50.0, -50.0));

        let r = c.pointer(PointerInput::mouse(PointerPhase::Down, 150.0, 100.0).on_image(), &layout);
        assert!(r.commands.contains(&ViewCommand::SetCursor(Cursor::Grabbing)));
        let r = c.pointer(PointerInput::mouse(PointerPhase::Up, 150.0, 100.0), &layout);
        assert!(r.commands.contains(&ViewCommand::SetZoomed(false)));

        let s = c.session().unwrap();
        assert!(!s.is_zoomed);
        assert_eq!((s.scale, s.translate_x, s.translate_y), (1.0, 0.0, 0.0));
        assert_eq!(c.mode(), ViewerMode::Unzoomed);
        assert_eq!(arrows_in(&r.commands), Some(ArrowVisibility { previous: false, next: true }));
    }

    #[test]
    fn test_zoom_keeps_tapped_point_in_place() {
        let (c, layout) = zoomed_controller();
        let t = c.session().unwrap().transform();
        // image-local (50, 50) was at client (150, 100) before zoom
        let x = layout.base.left + t.translate_x + 50.0 * t.scale;
        let y = layout.base.top + t.translate_y + 50.0 * t.scale;
        assert!((x - 150.0).abs() < 1e-9 && (y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_hides_arrows_and_blocks_keys() {
        let (mut c, _layout) = zoomed_controller();
        assert!(c.begin_navigation(Direction::Next).is_none());
        assert_eq!(c.key(Key::Next), Reaction::default());
        assert!(c.reveal_arrows().is_none());
    }

    #[test]
    fn test_pan_is_clamped_live() {
        let (mut c, layout) = zoomed_controller();
        c.pointer(PointerInput::touch(PointerPhase::Down, 150.0, 100.0), &layout);
        assert_eq!(c.mode(), ViewerMode::Panning);

        c.pointer(PointerInput::touch(PointerPhase::Move, 170.0, 90.0), &layout);
        let s = c.session().unwrap();
        assert_eq!((s.translate_x, s.translate_y), (-30.0, -60.0));
        assert!(s.has_panned);

        // way past the edge: limited to [-100, 0]
        let r = c.pointer(PointerInput::touch(PointerPhase::Move, 900.0, -900.0), &layout);
        assert_eq!(
            r.commands,
            vec![ViewCommand::TransformImage {
                transform: ZoomTransform { scale: 2.0, translate_x: 0.0, translate_y: -100.0 },
                transition: None,
            }]
        );

        let r = c.pointer(PointerInput::touch(PointerPhase::Up, 900.0, -900.0), &layout);
        assert_eq!(r.commands, vec![ViewCommand::SetCursor(Cursor::ZoomOut)]);
        assert_eq!(c.mode(), ViewerMode::Zoomed);
    }

    #[test]
    fn test_tap_after_pan_does_not_toggle_zoom() {
        let (mut c, layout) = zoomed_controller();
        c.dispatch(Intent::PanStart, &layout);
        c.dispatch(Intent::PanMove { dx: 5.0, dy: 5.0 }, &layout);
        c.dispatch(Intent::PanEnd, &layout);
        let r = c.dispatch(Intent::Tap { x: 1.0, y: 1.0 }, &layout);
        assert!(r.commands.is_empty());
        let s = c.session().unwrap();
        assert!(s.is_zoomed);
        assert!(!s.has_panned);
    }

    #[test]
    fn test_pan_ignored_when_unzoomed() {
        let mut c = controller(2);
        c.open(0, ScrollPosition::default());
        let layout = TestLayout::new(Rect::new(0.0, 0.0, 100.0, 100.0), 400.0);
        assert_eq!(c.dispatch(Intent::PanStart, &layout), Reaction::default());
        assert_eq!(c.dispatch(Intent::PanMove { dx: 3.0, dy: 3.0 }, &layout), Reaction::default());
        assert_eq!(c.session().unwrap().transform(), ZoomTransform::IDENTITY);
    }

    #[test]
    fn test_zoom_without_layout_is_noop() {
        let mut c = controller(2);
        c.open(0, ScrollPosition::default());
        let r = c.dispatch(Intent::Tap { x: 10.0, y: 10.0 }, &NoLayout);
        assert!(r.commands.is_empty());
        assert_eq!(c.mode(), ViewerMode::Unzoomed);
    }

    #[test]
    fn test_swipe_follow_and_commit() {
        let mut c = controller(3);
        c.open(1, ScrollPosition::default());
        let layout = TestLayout::new(Rect::new(0.0, 0.0, 100.0, 100.0), 400.0);

        c.pointer(PointerInput::touch(PointerPhase::Down, 300.0, 10.0), &layout);
        let r = c.pointer(PointerInput::touch(PointerPhase::Move, 200.0, 10.0), &layout);
        match &r.commands[..] {
            [ViewCommand::MoveStrip { offset_pct, transition: None }] => {
                assert!((offset_pct - (-33.333 - 0.25 * 33.333)).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        let r = c.pointer(PointerInput::touch(PointerPhase::Up, 200.0, 10.0), &layout);
        assert_eq!(r.navigate, Some(Direction::Next));
    }

    #[test]
    fn test_short_swipe_snaps_back() {
        let mut c = controller(3);
        c.open(1, ScrollPosition::default());
        let layout = TestLayout::new(Rect::new(0.0, 0.0, 100.0, 100.0), 400.0);
        c.pointer(PointerInput::touch(PointerPhase::Down, 200.0, 10.0), &layout);
        c.pointer(PointerInput::touch(PointerPhase::Move, 260.0, 10.0), &layout);
        let r = c.pointer(PointerInput::touch(PointerPhase::Up, 260.0, 10.0), &layout);
        assert_eq!(r.navigate, None);
        assert_eq!(
            r.commands,
            vec![ViewCommand::MoveStrip { offset_pct: -33.333, transition: Some(Duration::from_millis(300)) }]
        );
    }

    #[test]
    fn test_swipe_past_last_snaps_back() {
        let mut c = controller(2);
        c.open(1, ScrollPosition::default());
        let r = c.dispatch(Intent::SwipeLeft, &NoLayout);
        assert_eq!(r.navigate, None);
        assert!(matches!(r.commands[..], [ViewCommand::MoveStrip { transition: Some(_), .. }]));
    }

    #[test]
    fn test_keys() {
        let mut c = controller(3);
        assert_eq!(c.key(Key::Next), Reaction::default());
        c.open(0, ScrollPosition::default());
        assert_eq!(c.key(Key::Next).navigate, Some(Direction::Next));
        assert_eq!(c.key(Key::Previous).navigate, Some(Direction::Previous));
        let r = c.key(Key::Escape);
        assert!(r.consumed);
        assert!(!c.is_open());
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_event("Space", " "), Some(Key::Next));
        assert_eq!(Key::from_event("ArrowLeft", "ArrowLeft"), Some(Key::Previous));
        assert_eq!(Key::from_event("Backspace", "Backspace"), Some(Key::Previous));
        assert_eq!(Key::from_event("Escape", "Escape"), Some(Key::Escape));
        assert_eq!(Key::from_event("KeyA", "a"), None);
    }

    #[test]
    fn test_close_restores_scroll_and_leaves_fullscreen() {
        struct Flag(Rc<Cell<bool>>);
        impl Fullscreen for Flag {
            fn is_supported(&self) -> bool {
                true
            }
            fn request(&self) {
                self.0.set(true);
            }
            fn exit(&self) {
                self.0.set(false);
            }
        }

        let fs = Rc::new(Cell::new(false));
        let mut c = ViewerController::new(gallery(3), ViewerConfig::default(), Box::new(Flag(fs.clone())));
        let scroll = ScrollPosition { x: 0.0, y: 1234.0 };
        c.open(2, scroll);
        c.toggle_fullscreen();
        assert!(fs.get());

        let (_, layout) = zoomed_controller();
        c.dispatch(Intent::Tap { x: 150.0, y: 100.0 }, &layout);
        assert_eq!(c.mode(), ViewerMode::Zoomed);

        let commands = c.close();
        assert!(commands.contains(&ViewCommand::HideViewer { restore_scroll: scroll }));
        assert!(!fs.get());
        assert!(!c.is_fullscreen());
        assert_eq!(c.mode(), ViewerMode::Closed);

        // reopening starts from a clean session
        c.open(1, ScrollPosition::default());
        assert_eq!(c.session(), Some(&SessionState::opened_at(1)));
    }

    #[test]
    fn test_close_during_transition() {
        let mut c = controller(3);
        c.open(0, ScrollPosition::default());
        let (t, _) = c.begin_navigation(Direction::Next).unwrap();
        c.close();
        assert!(c.finish_navigation(t).is_empty());
        c.open(0, ScrollPosition::default());
        assert_eq!(c.session().unwrap().current_index, 0);
        assert!(c.begin_navigation(Direction::Next).is_some());
    }

    #[test]
    fn test_late_finish_after_reopen_leaves_new_move_alone() {
        let mut c = controller(5);
        c.open(0, ScrollPosition::default());
        let (first, _) = c.begin_navigation(Direction::Next).unwrap();
        c.close();
        c.open(2, ScrollPosition::default());
        let (second, _) = c.begin_navigation(Direction::Next).unwrap();

        // the first move's timeout fires while the second is animating
        assert!(c.finish_navigation(first).is_empty());
        assert_eq!(c.session().unwrap().current_index, 2);
        assert!(c.is_transitioning());

        let commands = c.finish_navigation(second);
        assert!(commands.contains(&ViewCommand::SetCounter("4 / 5".into())));
        assert_eq!(c.session().unwrap().current_index, 3);
    }

    #[test]
    fn test_full_pan_range_right_after_zoom() {
        let (mut c, layout) = zoomed_controller();
        c.pointer(PointerInput::touch(PointerPhase::Down, 150.0, 100.0), &layout);
        c.pointer(PointerInput::touch(PointerPhase::Move, -1000.0, -1000.0), &layout);
        let s = c.session().unwrap();
        assert_eq!((s.translate_x, s.translate_y), (-100.0, -100.0));
        c.pointer(PointerInput::touch(PointerPhase::Move, 2000.0, 2000.0), &layout);
        let s = c.session().unwrap();
        assert_eq!((s.translate_x, s.translate_y), (0.0, 0.0));
    }

    #[test]
    fn test_mouse_press_off_image_zooms_out() {
        let (mut c, layout) = zoomed_controller();
        c.pointer(PointerInput::mouse(PointerPhase::Down, 5.0, 5.0), &layout);
        let r = c.pointer(PointerInput::mouse(PointerPhase::Up, 5.0, 5.0), &layout);
        assert!(r.commands.contains(&ViewCommand::SetZoomed(false)));
        assert_eq!(c.mode(), ViewerMode::Unzoomed);
    }

    #[test]
    fn test_open_out_of_range() {
        let mut c = controller(2);
        assert!(c.open(2, ScrollPosition::default()).is_empty());
        assert!(!c.is_open());
    }

    #[test]
    fn test_arrow_reveal_generations() {
        let mut c = controller(3);
        assert!(c.reveal_arrows().is_none());
        c.open(1, ScrollPosition::default());
        let (_, first) = c.reveal_arrows().unwrap();
        let (commands, second) = c.reveal_arrows().unwrap();
        assert_eq!(commands, vec![ViewCommand::RevealArrows(true)]);
        assert!(c.conceal_arrows(first).is_empty());
        assert_eq!(c.conceal_arrows(second), vec![ViewCommand::RevealArrows(false)]);
    }
}
