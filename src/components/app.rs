use leptos::prelude::*;
use crate::components::thumbnail_grid::ThumbnailGrid;
use crate::components::viewer::Viewer;
use crate::dom;
use crate::state::ViewerState;

#[component]
pub fn App() -> impl IntoView {
    let Some(state) = ViewerState::from_page() else {
        return view! {
            <div class="empty-state">"No gallery to show"</div>
        }
        .into_any();
    };
    provide_context(state);
    if let Some(title) = state.title.get_value() {
        dom::set_document_title(&title);
    }

    view! {
        <div class="gallery">
            <GalleryHeading />
            <ThumbnailGrid />
            <Viewer />
        </div>
    }
    .into_any()
}

#[component]
fn GalleryHeading() -> impl IntoView {
    let state = expect_context::<ViewerState>();
    let title = state.title.get_value();

    view! {
        {move || {
            let title = title.clone()?;
            (!state.open.get()).then(|| view! { <h1 class="gallery-title">{title}</h1> })
        }}
    }
}
