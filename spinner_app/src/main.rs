//! Spinning quad demo
//!
//! Opens an 800x600 window and spins a quad while the window is resized.
//! Escape closes it.

use render_handoff::config::HarnessConfig;
use render_handoff::foundation::logging;
use render_handoff::{Harness, HarnessError};
use std::process::ExitCode;

fn run() -> Result<(), HarnessError> {
    let config = HarnessConfig::load_or_default()?;
    let report = Harness::new(config)?.run()?;

    if report.control.render_stopped_early {
        log::warn!("Render thread stopped before shutdown was requested");
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    log::info!("Starting spinner");

    match run() {
        Ok(()) => {
            log::info!("Spinner exited cleanly");
            ExitCode::SUCCESS
        }
        Err(error) => {
            log::error!("Spinner failed: {error}");
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
