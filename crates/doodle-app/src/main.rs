//! Main application entry point.

use clap::Parser;
use doodle_app::{App, AppConfig, CliArgs};

fn main() {
    env_logger::init();
    log::info!("Starting Doodle");

    let config = AppConfig::from(CliArgs::parse());
    match pollster::block_on(App::new(config).run()) {
        Ok(summary) => println!("{}", summary.path.display()),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
