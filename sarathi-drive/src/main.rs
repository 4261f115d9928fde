//! SarathiDrive - drive a spherical toy robot from a gamepad
//!
//! ```bash
//! sarathi-drive SB-1A2B 0 1     # toy by name, first controller, player 1
//! sarathi-drive - 1 2           # nearest toy, second controller, player 2
//! ```
//!
//! Constants (deadzones, thresholds, button layout, simulated toys) are read
//! from `sarathi.toml` in the working directory when present.

use sarathi_drive::app::{self, USAGE};
use sarathi_drive::config::{CONFIG_FILE, Config};
use sarathi_drive::devices::{create_scanner, open_input};
use sarathi_drive::error::{Error, Result};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let launch = match app::parse_args(&args) {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&launch) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(launch: &app::LaunchArgs) -> Result<()> {
    let config = Config::load_or_default(CONFIG_FILE)?;

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut scanner = create_scanner(&config);
    app::run_session(&config, launch, scanner.as_mut(), open_input, &running)?;

    log::info!("SarathiDrive stopped");
    Ok(())
}
