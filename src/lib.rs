pub mod components;
pub mod dom;
pub mod state;

use wasm_bindgen::prelude::*;
use crate::components::app::App;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    // only fails if a logger is already installed
    let _ = console_log::init_with_level(level);
    leptos::mount::mount_to_body(App);
}
