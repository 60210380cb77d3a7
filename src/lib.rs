//! Shopfront - storefront admin console
//!
//! Admin authentication and session lifecycle for a multi-tenant storefront:
//! JWT login/refresh on an Axum server, a session client for the Leptos
//! dashboard, and product attribute validation.

#![recursion_limit = "512"]

pub mod app;
pub mod core;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
