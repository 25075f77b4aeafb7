use leptos::prelude::*;
use crate::state::ViewerState;

#[derive(Clone)]
struct Thumb {
    index: usize,
    src: String,
    alt: String,
    box_vw: (f64, f64),
}

fn thumbs(state: &ViewerState) -> Vec<Thumb> {
    state
        .controller
        .try_with_value(|c| {
            c.gallery()
                .images()
                .iter()
                .enumerate()
                .map(|(index, img)| Thumb {
                    index,
                    src: img.thumbnail_path(),
                    alt: img.source_path.clone(),
                    box_vw: img.thumb_box_vw(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// One fixed-area box per image, in gallery order. Hidden while the viewer is open.
#[component]
pub fn ThumbnailGrid() -> impl IntoView {
    let state = expect_context::<ViewerState>();

    view! {
        <div
            class="thumbnails"
            style:display=move || if state.open.get() { "none" } else { "" }
        >
            {thumbs(&state)
                .into_iter()
                .map(|t| {
                    let (w, h) = t.box_vw;
                    let index = t.index;
                    view! {
                        <div
                            class="thumb"
                            style=format!("width: {w:.3}vw; height: {h:.3}vw;")
                            on:click=move |_| state.open_at(index)
                        >
                            <img src=t.src alt=t.alt loading="lazy" />
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
}
