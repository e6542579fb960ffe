//! Routineo browser client.
//!
//! ARCHITECTURE
//! ============
//! A Leptos client-side app. `net` owns the auth gateway (HTTP to our own
//! server, which verifies against the external service), `cookie` is the
//! browser implementation of the shared cookie capability, `state` holds the
//! reactive presence hook, and `pages`/`components` render from it.
//!
//! Browser-only dependencies sit behind the `csr` feature; native builds
//! (used for unit tests) get inert stubs that resolve "absent".

pub mod app;
pub mod components;
pub mod cookie;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: mount the app into the document body.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(app::App);
}
