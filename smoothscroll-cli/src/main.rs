//! Command-line host for the OpenSmoothScroll engine: loads settings,
//! starts the hook, and runs until interrupted.

use std::sync::mpsc;

use log::{error, info};
use smoothscroll_core::Engine;

mod cmdline;

fn main() {
    env_logger::init();

    let args = cmdline::Args::from_env_or_exit();
    let config_path = args.config.unwrap_or_else(smoothscroll_config::default_path);

    info!("loading settings from {config_path:?}");
    let settings = smoothscroll_config::load(&config_path);

    let engine = Engine::new(settings);
    engine.set_status_callback(|running| {
        if running {
            info!("engine running");
        } else {
            info!("engine stopped");
        }
    });

    if let Err(err) = engine.start() {
        error!("failed to start the engine: {err}");
        std::process::exit(1);
    }

    let (tx, rx) = mpsc::channel();
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = tx.send(());
    }) {
        error!("failed to install the Ctrl-C handler: {err}");
    }

    let _ = rx.recv();
    info!("received interrupt, shutting down");
    engine.stop();
}
