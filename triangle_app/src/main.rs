//! Triangle demo application
//!
//! Opens an 800x600 window and draws the engine's unlit triangle until the
//! window is closed or Escape is pressed.

use injector_engine::prelude::*;
use std::process::ExitCode;

const CONFIG_PATH: &str = "injector.toml";

fn run() -> Result<(), EngineError> {
    let config = EngineConfig::load_or_default(CONFIG_PATH)?;
    log::info!(
        "Starting {} ({}x{}, validation {})",
        config.window.title,
        config.window.width,
        config.window.height,
        if config.validation.enabled { "on" } else { "off" }
    );

    let mut engine = Engine::new(&config)?;
    engine.run()
}

fn main() -> ExitCode {
    logging::init(logging::default_level());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
