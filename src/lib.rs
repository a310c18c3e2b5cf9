//! Browser shell for a precompiled WebAssembly game.
//!
//! The game module owns the simulation and an RGBA frame buffer; this crate loads it,
//! sizes a canvas from what it reports, polls it on a fixed interval, blits the frame
//! buffer when it changes, and forwards arrow and speed keys.

pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod input;
pub mod module;
pub mod shell;

#[cfg(test)]
mod testing;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    use crate::config::ShellConfig;
    use crate::error::ShellError;

    pub mod bridge;
    pub mod status;
    pub mod runner;
    pub mod surface;

    pub use runner::GameHandle;

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();
        // Fails only when a logger is already installed.
        let _ = console_log::init_with_level(log::Level::Info);
    }

    /// Loads the game module and starts the poll loop.
    ///
    /// `options` is a plain object matching [`ShellConfig`]; `undefined` uses defaults.
    #[wasm_bindgen]
    pub async fn boot(options: JsValue) -> Result<GameHandle, JsValue> {
        let config = parse_options(options)?;
        log::set_max_level(config.log_level);

        let status = status::StatusSink::new(config.status_element.as_deref());
        match runner::launch(&config, &status).await {
            Ok(handle) => {
                status.set("running");
                Ok(handle)
            }
            Err(err) => {
                status.set(&format!("failed: {err}"));
                Err(err.into())
            }
        }
    }

    fn parse_options(options: JsValue) -> Result<ShellConfig, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok(ShellConfig::default());
        }
        ShellConfig::parse(serde_wasm_bindgen::Deserializer::from(options)).map_err(|err| {
            log::error!("rejected boot options: {err}");
            ShellError::from(err).into()
        })
    }
}
