// ==================== Imports ====================
use wasm_bindgen::prelude::*;

#[macro_use]
mod browser;
mod character;
mod collision;
pub mod config;
mod enemy;
pub mod engine;
mod game;
mod projectile;
mod rooftop;
mod sprite;
#[cfg(test)]
mod testing;
mod world;

use config::GameConfig;
use engine::GameLoop;
use game::WebSlinger;

// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure                                 │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Code Directory    │          Role                                        │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ browser.rs        │ web-sys glue, log! / error!                          │
// │ engine/           │ Geometry, Canvas, loading, GameLoop, input, audio    │
// │ game.rs           │ Loading / Loaded, resource manifests                 │
// │ world.rs          │ Per frame pipeline, camera, score, pause             │
// │ sprite/           │ Player states, physics, animation                    │
// │ enemy.rs          │ Knife throwing thugs                                 │
// │ rooftop.rs        │ Procedural rooftop streaming                         │
// │ projectile.rs     │ Webs and knives                                      │
// │ collision.rs      │ Projectile vs character hits                         │
// └───────────────────┴──────────────────────────────────────────────────────┘

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - sizes the canvas
/// - starts the game loop once resources are loaded
#[wasm_bindgen]
pub fn main_js() -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let canvas = GameConfig::default().canvas;
    browser::resize_canvas(canvas.width as u32, canvas.height as u32)
        .map_err(|err| JsValue::from_str(&format!("{:#}", err)))?;

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(WebSlinger::new()).await {
            error!("Could not start the game : {:#?}", err);
        }
    });

    Ok(())
}
