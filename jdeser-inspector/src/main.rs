#![forbid(unsafe_code)]

mod app;
mod exporters;

use std::process::ExitCode;

use tracing::Level;

use crate::app::{
    options::{get_command, Options},
    runtime::Config,
};

/// Map the number of `-v` flags to the most detailed level that gets logged
fn log_level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> ExitCode {
    // Get args from command line
    let command = get_command();
    let args = command.get_matches();

    let options = match Options::from_args(&args) {
        Ok(options) => options,
        Err(why) => {
            eprintln!("{why}");
            return ExitCode::FAILURE;
        }
    };

    // Logs share stderr with the progress bar, leaving stdout for rendered payloads
    tracing_subscriber::fmt()
        .with_max_level(log_level(options.verbosity))
        .with_writer(std::io::stderr)
        .init();

    match Config::new(options).and_then(|app| app.start()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            eprintln!("{why}");
            ExitCode::FAILURE
        }
    }
}
