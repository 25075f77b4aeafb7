use std::cell::RefCell;
use std::time::Duration;
use futures::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use photoviewer_core::{
    navigate, ArrowVisibility, Cursor, Direction, Gallery, Key, PanelWindow, PointerInput, Reaction,
    ViewCommand, ViewerController, ViewerHost, ZoomTransform,
};
use photoviewer_core::config::STRIP_REST_PCT;
use crate::dom::{self, DocumentFullscreen, DomLayout};

thread_local! {
    /// Pending arrow-conceal timer; replacing it cancels the previous one.
    static ARROW_TIMER: RefCell<Option<Timeout>> = RefCell::new(None);
}

/// CSS `transition` value for a transform animation.
pub fn transition_css(transition: Option<Duration>) -> String {
    match transition {
        Some(d) => format!("transform {}s ease-out", d.as_secs_f64()),
        None => "none".to_string(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripStyle {
    pub offset_pct: f64,
    pub transition: Option<Duration>,
}

impl StripStyle {
    pub fn css(&self, cursor: Cursor) -> String {
        format!(
            "transform: translateX({}%); transition: {}; cursor: {};",
            self.offset_pct,
            transition_css(self.transition),
            cursor.css()
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageStyle {
    pub transform: ZoomTransform,
    pub transition: Option<Duration>,
}

impl ImageStyle {
    pub fn css(&self) -> String {
        format!(
            "transform-origin: 0 0; transform: {}; transition: {};",
            self.transform.to_css(),
            transition_css(self.transition)
        )
    }
}

/// Reactive mirror of what the controller last told the renderer, plus
/// the controller itself.
#[derive(Clone, Copy)]
pub struct ViewerState {
    pub controller: StoredValue<ViewerController, LocalStorage>,
    pub layout: DomLayout,
    /// The sliding three-panel strip; its own `transitionend` ends a slide change.
    pub strip_ref: NodeRef<leptos::html::Div>,
    pub title: StoredValue<Option<String>>,
    pub open: RwSignal<bool>,
    pub strip: RwSignal<StripStyle>,
    pub image: RwSignal<ImageStyle>,
    pub panels: RwSignal<PanelWindow>,
    pub counter: RwSignal<String>,
    pub arrows: RwSignal<ArrowVisibility>,
    pub arrows_revealed: RwSignal<bool>,
    pub zoomed: RwSignal<bool>,
    pub cursor: RwSignal<Cursor>,
}

impl ViewerState {
    pub fn new(controller: ViewerController) -> Self {
        let title = controller.gallery().name.clone();
        Self {
            controller: StoredValue::new_local(controller),
            layout: DomLayout::new(),
            strip_ref: NodeRef::new(),
            title: StoredValue::new(title),
            open: RwSignal::new(false),
            strip: RwSignal::new(StripStyle { offset_pct: STRIP_REST_PCT, transition: None }),
            image: RwSignal::new(ImageStyle { transform: ZoomTransform::IDENTITY, transition: None }),
            panels: RwSignal::new(PanelWindow::default()),
            counter: RwSignal::new(String::new()),
            arrows: RwSignal::new(ArrowVisibility::HIDDEN),
            arrows_revealed: RwSignal::new(false),
            zoomed: RwSignal::new(false),
            cursor: RwSignal::new(Cursor::ZoomIn),
        }
    }

    /// Build from the gallery data embedded in the page.
    pub fn from_page() -> Option<Self> {
        let Some(json) = dom::read_gallery_json() else {
            log::error!("No gallery data found on the page");
            return None;
        };
        let (gallery, config) = match Gallery::from_json(&json) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("Invalid gallery data: {e}");
                return None;
            }
        };
        let controller = ViewerController::new(gallery, config, Box::new(DocumentFullscreen));
        Some(Self::new(controller))
    }

    pub fn apply(&self, commands: Vec<ViewCommand>) {
        for command in commands {
            match command {
                ViewCommand::ShowViewer => self.open.set(true),
                ViewCommand::HideViewer { restore_scroll } => {
                    self.open.set(false);
                    // the grid has to be back in the layout before scrolling
                    request_animation_frame(move || dom::restore_scroll(restore_scroll));
                }
                ViewCommand::MoveStrip { offset_pct, transition } => {
                    self.strip.set(StripStyle { offset_pct, transition });
                }
                ViewCommand::LoadPanels(window) => self.panels.set(window),
                ViewCommand::TransformImage { transform, transition } => {
                    self.image.set(ImageStyle { transform, transition });
                }
                ViewCommand::SetCounter(text) => self.counter.set(text),
                ViewCommand::SetArrows(arrows) => self.arrows.set(arrows),
                ViewCommand::RevealArrows(revealed) => self.arrows_revealed.set(revealed),
                ViewCommand::SetZoomed(zoomed) => self.zoomed.set(zoomed),
                ViewCommand::SetCursor(cursor) => self.cursor.set(cursor),
            }
        }
    }

    /// Apply a reaction; returns whether the input's default should be suppressed.
    fn react(&self, reaction: Reaction) -> bool {
        let Reaction { commands, navigate, consumed } = reaction;
        self.apply(commands);
        if let Some(direction) = navigate {
            self.navigate(direction);
        }
        consumed
    }

    pub fn open_at(&self, index: usize) {
        let scroll = dom::scroll_position();
        let commands = self.controller.try_update_value(|c| c.open(index, scroll)).unwrap_or_default();
        self.apply(commands);
    }

    pub fn close(&self) {
        let commands = self.controller.try_update_value(|c| c.close()).unwrap_or_default();
        self.apply(commands);
    }

    pub fn toggle_fullscreen(&self) {
        self.controller.try_update_value(|c| c.toggle_fullscreen());
    }

    pub fn sync_fullscreen(&self, active: bool) {
        self.controller.try_update_value(|c| c.sync_fullscreen(active));
    }

    pub fn pointer(&self, input: PointerInput) -> bool {
        let layout = self.layout;
        match self.controller.try_update_value(|c| c.pointer(input, &layout)) {
            Some(reaction) => self.react(reaction),
            None => false,
        }
    }

    pub fn key(&self, key: Key) -> bool {
        match self.controller.try_update_value(|c| c.key(key)) {
            Some(reaction) => self.react(reaction),
            None => false,
        }
    }

    pub fn navigate(&self, direction: Direction) {
        let host = WebHost { state: *self };
        wasm_bindgen_futures::spawn_local(async move {
            navigate(&host, direction).await;
        });
    }

    /// Show the arrows and (re)arm the timer that hides them again.
    pub fn reveal_arrows(&self) {
        let Some(Some((commands, generation))) = self.controller.try_update_value(|c| c.reveal_arrows()) else {
            return;
        };
        self.apply(commands);
        let delay = self
            .controller
            .try_with_value(|c| c.config().arrow_reveal_ms)
            .unwrap_or_default();
        let state = *self;
        let timer = Timeout::new(delay.min(u32::MAX as u64) as u32, move || {
            let commands = state
                .controller
                .try_update_value(|c| c.conceal_arrows(generation))
                .unwrap_or_default();
            state.apply(commands);
        });
        ARROW_TIMER.with(|t| *t.borrow_mut() = Some(timer));
    }
}

/// Runs slide transitions against the live DOM.
struct WebHost {
    state: ViewerState,
}

impl ViewerHost for WebHost {
    type Signal = LocalBoxFuture<'static, ()>;
    type Sleep = TimeoutFuture;

    fn with_controller<R>(&self, f: impl FnOnce(&mut ViewerController) -> R) -> Option<R> {
        self.state.controller.try_update_value(f)
    }

    fn apply(&self, commands: Vec<ViewCommand>) {
        self.state.apply(commands);
    }

    fn transition_end(&self) -> Self::Signal {
        let strip = self.state.strip_ref.get_untracked().map(web_sys::HtmlElement::from);
        dom::transition_end(strip)
    }

    fn sleep(&self, duration: Duration) -> Self::Sleep {
        TimeoutFuture::new(duration.as_millis().min(u32::MAX as u128) as u32)
    }
}
