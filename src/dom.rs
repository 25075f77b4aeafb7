//! Browser adapters for the viewer core: layout measurement, fullscreen,
//! scroll position, the strip's `transitionend` signal, gallery data.

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use gloo_events::EventListener;
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions};
use photoviewer_core::{Fullscreen, Layout, Rect, ScrollPosition};

/// Id of the `<script type="application/json">` block holding the gallery.
const GALLERY_DATA_ID: &str = "gallery-data";
/// Global the static page generator assigns the gallery object to.
const GALLERY_DATA_GLOBAL: &str = "gallery_data";

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn root_element() -> Option<Element> {
    document()?.document_element()
}

fn to_rect(r: &web_sys::DomRect) -> Rect {
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

// ── Gallery data ──────────────────────────────────────────────────────────────

/// Raw gallery JSON from the page: the JSON script block if present,
/// otherwise the `gallery_data` global serialised back to JSON.
pub fn read_gallery_json() -> Option<String> {
    if let Some(el) = document()?.get_element_by_id(GALLERY_DATA_ID) {
        return el.text_content();
    }
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(GALLERY_DATA_GLOBAL)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    match js_sys::JSON::stringify(&value) {
        Ok(json) => Some(String::from(json)),
        Err(e) => {
            log::error!("Failed to serialise {GALLERY_DATA_GLOBAL}: {e:?}");
            None
        }
    }
}

pub fn set_document_title(title: &str) {
    if let Some(doc) = document() {
        doc.set_title(title);
    }
}

// ── Scroll ────────────────────────────────────────────────────────────────────

pub fn scroll_position() -> ScrollPosition {
    root_element()
        .map(|root| ScrollPosition { x: root.scroll_left() as f64, y: root.scroll_top() as f64 })
        .unwrap_or_default()
}

/// Jump back to a saved position, no smooth scrolling.
pub fn restore_scroll(pos: ScrollPosition) {
    let Some(root) = root_element() else { return };
    let opts = ScrollToOptions::new();
    opts.set_left(pos.x);
    opts.set_top(pos.y);
    opts.set_behavior(ScrollBehavior::Instant);
    root.scroll_to_with_scroll_to_options(&opts);
}

pub fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Measures the slide strip and the current slide image on demand.
#[derive(Clone, Copy)]
pub struct DomLayout {
    pub container: NodeRef<leptos::html::Div>,
    pub image: NodeRef<leptos::html::Img>,
}

impl DomLayout {
    pub fn new() -> Self {
        Self { container: NodeRef::new(), image: NodeRef::new() }
    }
}

impl Layout for DomLayout {
    fn container_rect(&self) -> Option<Rect> {
        self.container.get_untracked().map(|el| to_rect(&el.get_bounding_client_rect()))
    }

    /// Slide panel position plus the image's offset box. Offsets ignore CSS
    /// transforms, so a zoom animation in progress does not skew this.
    fn image_rect(&self) -> Option<Rect> {
        let img = self.image.get_untracked()?;
        let panel = img.parent_element()?.dyn_into::<HtmlElement>().ok()?;
        let panel_rect = panel.get_bounding_client_rect();
        Some(Rect::new(
            panel_rect.left() + (img.offset_left() - panel.offset_left()) as f64,
            panel_rect.top() + (img.offset_top() - panel.offset_top()) as f64,
            img.offset_width() as f64,
            img.offset_height() as f64,
        ))
    }

    fn natural_width(&self) -> Option<f64> {
        // 0 until the image has decoded
        self.image
            .get_untracked()
            .map(|img| img.natural_width() as f64)
            .filter(|w| *w > 0.0)
    }

    fn viewport_width(&self) -> f64 {
        viewport_width()
    }
}

// ── Fullscreen ────────────────────────────────────────────────────────────────

/// Standard Fullscreen API on the document element.
pub struct DocumentFullscreen;

impl Fullscreen for DocumentFullscreen {
    fn is_supported(&self) -> bool {
        document().is_some_and(|d| d.fullscreen_enabled())
    }

    fn request(&self) {
        let Some(root) = root_element() else { return };
        if let Err(e) = root.request_fullscreen() {
            log::warn!("requestFullscreen failed: {e:?}");
        }
    }

    fn exit(&self) {
        if let Some(doc) = document() {
            doc.exit_fullscreen();
        }
    }
}

pub fn is_fullscreen() -> bool {
    document().is_some_and(|d| d.fullscreen_element().is_some())
}

/// Report fullscreen changes made outside the viewer (browser UI, Esc).
/// The listener is removed when the returned handle is dropped.
pub fn on_fullscreen_change(mut callback: impl FnMut(bool) + 'static) -> Option<EventListener> {
    let doc = document()?;
    Some(EventListener::new(&doc, "fullscreenchange", move |_| callback(is_fullscreen())))
}

// ── Transition signal ─────────────────────────────────────────────────────────

/// Resolves on the next `transitionend` fired by `target` itself. Events
/// bubbling up from children (the zooming image) are ignored. With no
/// target it never resolves and the caller's timeout takes over.
pub fn transition_end(target: Option<HtmlElement>) -> LocalBoxFuture<'static, ()> {
    let Some(target) = target else {
        return futures::future::pending().boxed_local();
    };
    let (tx, rx) = oneshot::channel::<()>();
    let mut tx = Some(tx);
    let own: JsValue = target.clone().into();
    let listener = EventListener::new(&target, "transitionend", move |ev| {
        let from_self = ev.target().map(JsValue::from).is_some_and(|t| t == own);
        if from_self {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
        }
    });
    async move {
        let _listener = listener;
        let _ = rx.await;
    }
    .boxed_local()
}

/// Whether an event originated on a slide image.
pub fn targets_image(ev: &web_sys::Event) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlImageElement>().ok())
        .is_some()
}
