//! zero-agent Web Frontend
//!
//! Leptos-based WASM frontend: the login/signup screen and the agent
//! dashboard. Screen logic lives in `zero-core`; this crate only binds it
//! to signals, the router and browser APIs.

mod app;
mod components;
mod context;
mod delay;
mod logging;
mod pages;
mod storage;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init();
    leptos::mount::mount_to_body(App);
}
