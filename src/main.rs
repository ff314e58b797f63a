//! Todo Admin Frontend Entry Point

mod api;
mod app;
mod components;
mod config;
mod context;
mod models;
mod session;
mod store;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

const LOG_LEVEL: LevelFilter = if cfg!(debug_assertions) { LevelFilter::Debug } else { LevelFilter::Info };

fn main() {
    console_error_panic_hook::set_once();
    let capacity = config::AppConfig::load().log_capacity;
    if let Err(err) = rolling_logger::init_logger("TodoAdmin", capacity, LOG_LEVEL) {
        web_sys::console::error_1(&format!("logger not installed: {}", err).into());
    }
    mount_to_body(App);
}
