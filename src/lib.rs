// ==================== Modules ====================
pub mod assets;
pub mod browser;
pub mod config;
pub mod engine;
pub mod event_bus;
pub mod logging;
pub mod sprite;
pub mod stage;
pub mod ui;
pub mod widget;

use anyhow::{Context, Result};
use config::UiOptions;
use engine::UiLoop;
use log::LevelFilter;
use ui::GolemUi;
use wasm_bindgen::prelude::*;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook and console logging
/// - fetches golem.json
/// - starts the ui loop
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    logging::init_logging(LevelFilter::Info);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = start().await {
            log::error!("Could not start golem ui : {:#}", err);
        }
    });

    Ok(())
}

async fn start() -> Result<()> {
    let options: UiOptions = browser::fetch_json(config::CONFIG_PATH)
        .await
        .with_context(|| format!("Failed to load options from : {}", config::CONFIG_PATH))?;
    options.validate()?;
    logging::set_level(options.level_filter());

    let canvas_id = options.canvas_id.clone();
    let fps = options.fps;
    UiLoop::start(GolemUi::new(options), &canvas_id, fps).await
}
