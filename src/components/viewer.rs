use leptos::ev;
use leptos::prelude::*;
use web_sys::{MouseEvent, Touch, TouchEvent};
use photoviewer_core::{Direction, Key, PointerInput, PointerPhase, Slide};
use crate::dom;
use crate::state::ViewerState;

fn mouse_input(phase: PointerPhase, ev: &MouseEvent) -> PointerInput {
    PointerInput::mouse(phase, ev.client_x() as f64, ev.client_y() as f64)
}

fn touch_input(phase: PointerPhase, touch: &Touch, ev: &TouchEvent) -> PointerInput {
    let input = PointerInput::touch(phase, touch.client_x() as f64, touch.client_y() as f64);
    if dom::targets_image(ev) { input.on_image() } else { input }
}

/// Buttons swallow their own presses so they never reach the gesture classifier.
fn stop(ev: web_sys::Event) {
    ev.stop_propagation();
}

fn display_if(visible: bool) -> &'static str {
    if visible { "" } else { "none" }
}

#[component]
fn SlideImage(slide: Slide) -> impl IntoView {
    view! {
        <img
            src=slide.src.clone()
            alt=slide.src
            width=slide.width.to_string()
            height=slide.height.to_string()
            draggable="false"
            on:dragstart=|ev: web_sys::DragEvent| ev.prevent_default()
        />
    }
}

/// Full-screen slide viewer: the three-panel strip, arrows, counter and
/// close/fullscreen controls.
#[component]
pub fn Viewer() -> impl IntoView {
    let state = expect_context::<ViewerState>();

    let keydown = window_event_listener(ev::keydown, move |ev| {
        let Some(key) = Key::from_event(&ev.code(), &ev.key()) else { return };
        if state.key(key) {
            ev.prevent_default();
        }
    });
    // Mouse pans continue outside the viewer, so move/up are tracked on the window
    let mousemove = window_event_listener(ev::mousemove, move |ev| {
        state.reveal_arrows();
        state.pointer(mouse_input(PointerPhase::Move, &ev));
    });
    let mouseup = window_event_listener(ev::mouseup, move |ev| {
        state.pointer(mouse_input(PointerPhase::Up, &ev));
    });
    let fullscreen_change = StoredValue::new_local(dom::on_fullscreen_change(move |active| {
        state.sync_fullscreen(active)
    }));
    on_cleanup(move || {
        keydown.remove();
        mousemove.remove();
        mouseup.remove();
        fullscreen_change.dispose();
    });

    let on_mousedown = move |ev: MouseEvent| {
        let mut input = mouse_input(PointerPhase::Down, &ev);
        if dom::targets_image(&ev) {
            input = input.on_image();
        }
        if state.pointer(input) {
            ev.prevent_default();
        }
    };
    let on_touchstart = move |ev: TouchEvent| {
        let Some(touch) = ev.touches().get(0) else { return };
        state.pointer(touch_input(PointerPhase::Down, &touch, &ev));
    };
    let on_touchmove = move |ev: TouchEvent| {
        let Some(touch) = ev.touches().get(0) else { return };
        if state.pointer(touch_input(PointerPhase::Move, &touch, &ev)) {
            ev.prevent_default();
        }
    };
    let on_touchend = move |ev: TouchEvent| {
        // no synthesized mouse events after a touch
        ev.prevent_default();
        let Some(touch) = ev.changed_touches().get(0) else { return };
        state.pointer(touch_input(PointerPhase::Up, &touch, &ev));
    };

    let arrows = move || state.arrows.get();
    let revealed = move || state.arrows_revealed.get();

    view! {
        <div
            class="viewer"
            node_ref=state.layout.container
            style:display=move || display_if(state.open.get())
            on:mousedown=on_mousedown
            on:touchstart=on_touchstart
            on:touchmove=on_touchmove
            on:touchend=on_touchend
        >
            <div
                class="strip"
                node_ref=state.strip_ref
                style=move || state.strip.get().css(state.cursor.get())
            >
                <div class="slide">
                    {move || state.panels.with(|w| w.previous.clone()).map(|slide| view! { <SlideImage slide=slide /> })}
                </div>
                <div class="slide">
                    {move || {
                        state.panels.with(|w| w.current.clone()).map(|slide| view! {
                            <img
                                node_ref=state.layout.image
                                src=slide.src.clone()
                                alt=slide.src
                                width=slide.width.to_string()
                                height=slide.height.to_string()
                                draggable="false"
                                class:zoomed=move || state.zoomed.get()
                                style=move || state.image.get().css()
                                on:dragstart=|ev: web_sys::DragEvent| ev.prevent_default()
                            />
                        })
                    }}
                </div>
                <div class="slide">
                    {move || state.panels.with(|w| w.next.clone()).map(|slide| view! { <SlideImage slide=slide /> })}
                </div>
            </div>

            <button
                class="arrow arrow-prev"
                class:visible=revealed
                style:display=move || display_if(arrows().previous)
                on:mousedown=|ev: MouseEvent| stop(ev.into())
                on:touchstart=|ev: TouchEvent| stop(ev.into())
                on:touchend=|ev: TouchEvent| stop(ev.into())
                on:click=move |_| state.navigate(Direction::Previous)
                title="Previous"
            >"\u{2039}"</button>
            <button
                class="arrow arrow-next"
                class:visible=revealed
                style:display=move || display_if(arrows().next)
                on:mousedown=|ev: MouseEvent| stop(ev.into())
                on:touchstart=|ev: TouchEvent| stop(ev.into())
                on:touchend=|ev: TouchEvent| stop(ev.into())
                on:click=move |_| state.navigate(Direction::Next)
                title="Next"
            >"\u{203a}"</button>

            <div class="counter">{move || state.counter.get()}</div>

            <div class="viewer-controls">
                <button
                    class="fullscreen-btn"
                    on:mousedown=|ev: MouseEvent| stop(ev.into())
                    on:touchstart=|ev: TouchEvent| stop(ev.into())
                    on:touchend=|ev: TouchEvent| stop(ev.into())
                    on:click=move |_| state.toggle_fullscreen()
                    title="Fullscreen"
                >"\u{26f6}"</button>
                <button
                    class="close-btn"
                    on:mousedown=|ev: MouseEvent| stop(ev.into())
                    on:touchstart=|ev: TouchEvent| stop(ev.into())
                    on:touchend=|ev: TouchEvent| stop(ev.into())
                    on:click=move |_| state.close()
                    title="Close"
                >"\u{00d7}"</button>
            </div>
        </div>
    }
}
