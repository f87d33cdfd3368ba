/// Typewriter Web - WASM host for the birthday card
///
/// Plays the message sequencer into a DOM element using browser timers,
/// and wires up the language choice page around it.

use wasm_bindgen::prelude::*;

pub mod dom;
pub mod driver;
pub mod intro;

pub use dom::DomSink;
pub use driver::WebSequencer;
pub use intro::{install, Card};

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("logger already initialized"));
    }

    Ok(())
}
